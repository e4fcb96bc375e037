use crate::components::color::Color;
use crate::core::node::{Node, NodeKind, WorldTransform};
use crate::core::stage::Stage;
use crate::renderer::instance::{BatchKind, DrawList, SpriteInstance, TextDraw};

/// Build the frame's draw list from the stage.
/// Walks visible nodes back-to-front and records contiguous batches so the
/// renderer can interleave sprites, text and tessellated shapes in order.
pub fn build_draw_list(stage: &Stage, list: &mut DrawList) {
    list.clear();
    stage.walk_visible(|node, world| draw_node(node, world, list));
}

fn modulation(node: &Node, world: &WorldTransform) -> Color {
    let tint = node.tint.unwrap_or(Color::WHITE);
    tint.with_alpha(tint.a * world.alpha)
}

fn draw_node(node: &Node, world: &WorldTransform, list: &mut DrawList) {
    match &node.kind {
        NodeKind::Container => {}
        NodeKind::Image(image) => {
            let tint = node.tint.unwrap_or(Color::WHITE);
            let texture = list.texture_index(&image.texture) as f32;
            let start = list.sprites.len();
            list.sprites.push(SpriteInstance {
                x: world.pos.x,
                y: world.pos.y,
                rotation: world.rotation,
                size: image.size * world.scale.x.abs(),
                texture,
                alpha: world.alpha,
                blend: image.blend.as_f32(),
                tint_r: tint.r,
                tint_g: tint.g,
                tint_b: tint.b,
                _pad: [0.0; 2],
            });
            list.record(BatchKind::Sprite, start, 1);
        }
        NodeKind::Text(label) => {
            let color = label.color.modulate(modulation(node, world));
            let start = list.texts.len();
            list.texts.push(TextDraw {
                text: label.text.clone(),
                x: world.pos.x,
                y: world.pos.y,
                size: label.font_size * world.scale.x.abs(),
                color: [color.r, color.g, color.b, color.a],
                anchor: label.anchor,
                wrap: label.wrap_width,
            });
            list.record(BatchKind::Text, start, 1);
        }
        #[cfg(feature = "vectors")]
        kind => draw_vector(kind, node, world, list),
        #[cfg(not(feature = "vectors"))]
        _ => {}
    }
}

#[cfg(feature = "vectors")]
fn draw_vector(kind: &NodeKind, node: &Node, world: &WorldTransform, list: &mut DrawList) {
    let modulate = modulation(node, world);
    let start = list.vectors.vertex_count();
    match kind {
        NodeKind::Circle { radius, color } => {
            list.vectors.fill_circle(world.pos, radius * world.scale.x.abs(), color.modulate(modulate));
        }
        NodeKind::Graphics(graphics) => {
            for shape in graphics.shapes() {
                list.vectors.draw_shape(shape, world, modulate);
            }
        }
        NodeKind::Emitter(emitter) => {
            for p in emitter.particles() {
                let (scale, alpha) = emitter.ramp(p);
                let color = p.color.with_alpha(p.color.a * alpha).modulate(modulate);
                let radius = emitter.config.radius * scale * world.scale.x.abs();
                list.vectors.fill_circle(world.apply(p.pos), radius, color);
            }
        }
        _ => {}
    }
    let count = list.vectors.vertex_count() - start;
    list.record(BatchKind::Vector, start, count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use crate::components::sprite::{BlendMode, ImageSprite, TextLabel};

    #[test]
    fn images_become_sprites_with_world_transform() {
        let mut stage = Stage::new();
        let layer = stage.add(Node::container().with_pos(Vec2::new(10.0, 10.0)).with_alpha(0.5));
        stage.add_to(
            layer,
            Node::image(ImageSprite::new("planet", 64.0).with_blend(BlendMode::Additive))
                .with_pos(Vec2::new(5.0, 0.0))
                .with_scale(2.0),
        );
        let mut list = DrawList::new();
        build_draw_list(&stage, &mut list);

        assert_eq!(list.sprites.len(), 1);
        let s = list.sprites[0];
        assert_eq!((s.x, s.y), (15.0, 10.0));
        assert_eq!(s.size, 128.0);
        assert_eq!(s.alpha, 0.5);
        assert_eq!(s.blend, 1.0);
        assert_eq!(list.textures, vec!["planet".to_string()]);
    }

    #[test]
    fn text_batches_follow_depth() {
        let mut stage = Stage::new();
        stage.add(Node::text(TextLabel::new("top", 10.0)).with_depth(2.0));
        stage.add(Node::image(ImageSprite::new("bg", 10.0)).with_depth(0.0));
        let mut list = DrawList::new();
        build_draw_list(&stage, &mut list);
        assert_eq!(list.batches.len(), 2);
        assert_eq!(list.batches[0].kind(), BatchKind::Sprite);
        assert_eq!(list.batches[1].kind(), BatchKind::Text);
    }

    #[cfg(feature = "vectors")]
    #[test]
    fn circles_tessellate_into_vector_batch() {
        let mut stage = Stage::new();
        stage.add(Node::circle(10.0, Color::RED));
        let mut list = DrawList::new();
        build_draw_list(&stage, &mut list);
        assert!(list.vectors.vertex_count() > 0);
        assert_eq!(list.batches[0].kind(), BatchKind::Vector);
    }

    #[test]
    fn hidden_subtrees_are_skipped() {
        let mut stage = Stage::new();
        let layer = stage.add(Node::container().with_visible(false));
        stage.add_to(layer, Node::image(ImageSprite::new("x", 1.0)));
        let mut list = DrawList::new();
        build_draw_list(&stage, &mut list);
        assert!(list.sprites.is_empty());
    }
}
