use glam::Vec2;
use serde::Deserialize;
use starhop_engine::{BlendMode, Color, EngineContext, ImageSprite, Node, NodeId};
use crate::planet::PlanetBody;
use super::{PlanetEffect, SPRITE_DEPTH};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlowConfig {
    pub texture: String,
    /// Halo diameter relative to the planet diameter.
    pub scale: f32,
    pub alpha: f32,
    pub color: Option<Color>,
    /// Alpha pulse, radians per second; 0 keeps it steady.
    pub pulse_speed: f32,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self {
            texture: "glow".into(),
            scale: 1.6,
            alpha: 0.6,
            color: None,
            pulse_speed: 0.0,
        }
    }
}

/// Additive halo behind the planet sprite.
pub struct Glow {
    config: GlowConfig,
    node: Option<NodeId>,
    base_depth: f32,
}

impl Glow {
    pub fn new(ctx: &mut EngineContext, parent: NodeId, body: &PlanetBody, config: &GlowConfig) -> Self {
        let node = if ctx.textures.contains(&config.texture) {
            let sprite = ImageSprite::new(config.texture.clone(), body.radius * 2.0 * config.scale)
                .with_blend(BlendMode::Additive);
            let mut node = Node::image(sprite)
                .with_tag("glow")
                .with_pos(body.pos)
                .with_depth(SPRITE_DEPTH - 0.5)
                .with_alpha(config.alpha);
            if let Some(color) = config.color.or(body.tint) {
                node = node.with_tint(color);
            }
            Some(ctx.add_to(parent, node))
        } else {
            log::warn!("glow: texture '{}' missing, planet {} has no halo", config.texture, body.id);
            None
        };
        Self { config: config.clone(), node, base_depth: 0.0 }
    }
}

impl PlanetEffect for Glow {
    fn kind(&self) -> &'static str {
        "glow"
    }

    fn update(&mut self, ctx: &mut EngineContext, body: &PlanetBody, time: f32, _delta: f32) {
        let Some(node) = self.node else { return };
        if body.hidden {
            return;
        }
        ctx.stage.set_position(node, body.pos);
        if self.config.pulse_speed != 0.0 {
            let pulse = 0.8 + 0.2 * (time / 1000.0 * self.config.pulse_speed).sin();
            ctx.stage.set_alpha(node, self.config.alpha * pulse);
        }
    }

    fn set_visible(&mut self, ctx: &mut EngineContext, visible: bool) {
        if let Some(node) = self.node {
            ctx.stage.set_visible(node, visible);
        }
    }

    fn set_depth(&mut self, ctx: &mut EngineContext, depth: f32) {
        self.base_depth = depth;
        if let Some(node) = self.node {
            ctx.stage.set_depth(node, depth + SPRITE_DEPTH - 0.5);
        }
    }

    fn depth(&self) -> f32 {
        self.base_depth
    }

    fn visual_elements(&self) -> Vec<NodeId> {
        self.node.into_iter().collect()
    }

    fn destroy(&mut self, ctx: &mut EngineContext) {
        if let Some(node) = self.node.take() {
            ctx.destroy(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::planet_fixture;

    #[test]
    fn missing_texture_degrades_to_no_node() {
        let (mut ctx, layer, body) = planet_fixture();
        let before = ctx.stage.len();
        let mut fx = Glow::new(&mut ctx, layer, &body, &GlowConfig::default());
        assert!(fx.visual_elements().is_empty());
        assert_eq!(ctx.stage.len(), before);
        fx.update(&mut ctx, &body, 0.0, 16.0);
        fx.set_depth(&mut ctx, 3.0);
        fx.destroy(&mut ctx);
    }

    #[test]
    fn halo_sits_behind_sprite_and_follows_planet() {
        let (mut ctx, layer, mut body) = planet_fixture();
        ctx.textures.insert("glow", "glow.png");
        let mut fx = Glow::new(&mut ctx, layer, &body, &GlowConfig::default());
        let node = fx.visual_elements()[0];
        assert!(ctx.stage.depth(node).unwrap() < 1.0);
        body.pos = Vec2::new(1.0, 2.0);
        fx.update(&mut ctx, &body, 0.0, 16.0);
        assert_eq!(ctx.stage.position(node), Some(body.pos));
    }
}
