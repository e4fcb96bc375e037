//! Per-planet display objects: sprite, cross-fade overlay, fog emitter,
//! lock icon and the effect list, plus the per-frame cascade that keeps
//! them in step with the planet data.

use glam::Vec2;
use starhop_engine::{Color, EmitterConfig, EngineContext, ImageSprite, Node, NodeId, Signal, TextLabel};
use crate::container::Container;
use crate::effects::{create_effects, SPRITE_DEPTH};
use crate::planet::PlanetData;
use crate::progression::Progression;

/// Cross-fade overlay sits just above the sprite.
pub const OVERLAY_DEPTH: f32 = SPRITE_DEPTH + 0.01;
pub const EMITTER_DEPTH: f32 = 1.5;
pub const LOCK_DEPTH: f32 = 3.0;
/// How long a frame is held before fading to the next one.
pub const FRAME_HOLD: f32 = 4000.0;
pub const FRAME_FADE: f32 = 1000.0;
/// Hit radius as a multiple of the planet radius.
pub const HIT_SLOP: f32 = 1.2;

const LOCK_GLYPH: &str = "🔒";

fn lock_offset(radius: f32) -> Vec2 {
    Vec2::new(radius * 0.7, -radius * 0.7)
}

/// Tint applied to a planet sprite: desaturated and darkened while locked.
pub fn sprite_tint(planet: &PlanetData, locked: bool) -> Option<Color> {
    if locked {
        let base = planet.body.tint.unwrap_or(Color::WHITE);
        Some(base.desaturate(0.85).shade(0.6))
    } else {
        planet.body.tint
    }
}

fn fog_config(radius: f32) -> EmitterConfig {
    EmitterConfig::new()
        .with_colors(vec![Color::hex(0x8894b8).with_alpha(0.6), Color::hex(0x4a5478).with_alpha(0.5)])
        .with_lifespan(1800.0)
        .with_speed(4.0, 12.0)
        .with_scale(1.0, 2.5)
        .with_alpha(0.5, 0.0)
        .with_frequency(140.0)
        .with_spread(radius * 0.8)
        .with_radius(6.0)
}

fn sprite_node(ctx: &EngineContext, planet: &PlanetData) -> Node {
    let radius = planet.body.radius;
    let node = match (&planet.texture, planet.frames.first()) {
        (Some(texture), _) if ctx.textures.contains(texture) => Node::image(ImageSprite::new(texture.clone(), radius * 2.0)),
        (Some(texture), frame) => {
            log::warn!("visuals: texture '{}' for planet {} is not registered", texture, planet.id());
            match frame {
                Some(frame) => Node::text(TextLabel::new(frame.clone(), radius * 2.0)),
                None => Node::circle(radius, planet.body.tint.unwrap_or(Color::GRAY)),
            }
        }
        (None, Some(frame)) => Node::text(TextLabel::new(frame.clone(), radius * 2.0)),
        (None, None) => Node::circle(radius, planet.body.tint.unwrap_or(Color::GRAY)),
    };
    node.with_tag(format!("planet:{}", planet.id())).with_pos(planet.body.pos).with_depth(SPRITE_DEPTH)
}

fn build_planet(ctx: &mut EngineContext, layer: NodeId, planet: &mut PlanetData, victories: u32) {
    planet.destroy_visuals(ctx);
    planet.cycle = Default::default();

    let locked = planet.is_locked(victories);
    let node = sprite_node(ctx, planet);
    let sprite = ctx.add_to(layer, node);
    ctx.stage.set_tint(sprite, sprite_tint(planet, locked));
    planet.body.sprite = Some(sprite);

    if planet.texture.is_none() && planet.frames.len() > 1 {
        let overlay = ctx.add_to(
            layer,
            Node::text(TextLabel::new(planet.frames[1].clone(), planet.body.radius * 2.0))
                .with_tag(format!("planet:{}:overlay", planet.id()))
                .with_pos(planet.body.pos)
                .with_depth(OVERLAY_DEPTH)
                .with_alpha(0.0),
        );
        ctx.stage.set_tint(overlay, sprite_tint(planet, locked));
        planet.overlay_sprite = Some(overlay);
    }

    planet.effects = create_effects(ctx, layer, &planet.body, &planet.effect_entries);

    if planet.body.hidden {
        planet.emitter = Some(ctx.add_to(
            layer,
            Node::emitter(fog_config(planet.body.radius))
                .with_tag(format!("planet:{}:fog", planet.id()))
                .with_pos(planet.body.pos)
                .with_depth(EMITTER_DEPTH),
        ));
    }
    if locked {
        planet.lock_icon = Some(add_lock_icon(ctx, layer, planet));
    }
    apply_visibility(ctx, planet);
}

fn add_lock_icon(ctx: &mut EngineContext, layer: NodeId, planet: &PlanetData) -> NodeId {
    ctx.add_to(
        layer,
        Node::text(TextLabel::new(LOCK_GLYPH, planet.body.radius * 0.6))
            .with_tag(format!("planet:{}:lock", planet.id()))
            .with_pos(planet.body.pos + lock_offset(planet.body.radius))
            .with_depth(LOCK_DEPTH),
    )
}

/// Show or hide the sprite, overlay and effects for the current fog state.
fn apply_visibility(ctx: &mut EngineContext, planet: &mut PlanetData) {
    let shown = !planet.body.hidden;
    for id in [planet.body.sprite, planet.overlay_sprite, planet.lock_icon].into_iter().flatten() {
        ctx.stage.set_visible(id, shown);
    }
    for effect in &mut planet.effects {
        effect.set_visible(ctx, shown);
    }
}

/// Build every planet's display objects under the container layer.
/// Rebuilding replaces whatever a previous call created.
pub fn create_visuals(ctx: &mut EngineContext, container: &mut Container, progression: &Progression) {
    let Some(layer) = container.layer() else {
        log::warn!("visuals: container {} has no layer, call init first", container.id);
        return;
    };
    let victories = progression.victories(&container.id);
    for planet in container.get_all_mut() {
        build_planet(ctx, layer, planet, victories);
    }
}

/// Re-apply fog and lock state after progression changed.
pub fn update_visibility(ctx: &mut EngineContext, container: &mut Container, progression: &Progression) {
    let Some(layer) = container.layer() else { return };
    let victories = progression.victories(&container.id);
    for planet in container.get_all_mut() {
        refresh_planet(ctx, layer, planet, victories);
    }
}

/// Bring one planet's fog, lock icon and tint in line with its state.
pub fn refresh_planet(ctx: &mut EngineContext, layer: NodeId, planet: &mut PlanetData, victories: u32) {
    if !planet.body.hidden && planet.destroy_emitter(ctx) {
        log::debug!("visuals: fog lifted on {}", planet.id());
    }

    let locked = planet.is_locked(victories);
    match (locked, planet.lock_icon) {
        (true, None) => planet.lock_icon = Some(add_lock_icon(ctx, layer, planet)),
        (false, Some(icon)) => {
            ctx.destroy(icon);
            planet.lock_icon = None;
        }
        _ => {}
    }
    let tint = sprite_tint(planet, locked);
    for id in [planet.body.sprite, planet.overlay_sprite].into_iter().flatten() {
        ctx.stage.set_tint(id, tint);
    }

    if !planet.body.hijacked {
        apply_visibility(ctx, planet);
    }
}

/// Advance the frame cycle and the light phase it drives.
fn step_cycle(ctx: &mut EngineContext, planet: &mut PlanetData, delta: f32) {
    planet.cycle.elapsed += delta;
    let frames = planet.frames.len();

    if planet.cycle.elapsed >= FRAME_HOLD + FRAME_FADE {
        planet.cycle.elapsed -= FRAME_HOLD + FRAME_FADE;
        planet.body.light_phase = (planet.body.light_phase + 1) % 8;
        if frames > 1 {
            planet.cycle.index = (planet.cycle.index + 1) % frames;
            let current = planet.frames[planet.cycle.index].clone();
            let next = planet.frames[(planet.cycle.index + 1) % frames].clone();
            if let Some(label) = planet.body.sprite.and_then(|id| ctx.stage.text_mut(id)) {
                label.text = current;
            }
            if let Some(label) = planet.overlay_sprite.and_then(|id| ctx.stage.text_mut(id)) {
                label.text = next;
            }
        }
    }

    // A borrowed planet is shown fully opaque by the overlay.
    if planet.body.hijacked {
        return;
    }
    if let (Some(sprite), Some(overlay)) = (planet.body.sprite, planet.overlay_sprite) {
        let fade = ((planet.cycle.elapsed - FRAME_HOLD) / FRAME_FADE).clamp(0.0, 1.0);
        ctx.stage.set_alpha(sprite, 1.0 - fade);
        ctx.stage.set_alpha(overlay, fade);
    }
}

/// Per-frame cascade. `time` and `delta` are in milliseconds.
pub fn update(ctx: &mut EngineContext, container: &mut Container, time: f32, delta: f32) {
    for planet in container.get_all_mut() {
        step_cycle(ctx, planet, delta);

        if !planet.body.hijacked {
            let pos = planet.body.pos;
            for id in [planet.body.sprite, planet.overlay_sprite, planet.emitter].into_iter().flatten() {
                ctx.stage.set_position(id, pos);
            }
            if let Some(icon) = planet.lock_icon {
                ctx.stage.set_position(icon, pos + lock_offset(planet.body.radius));
            }
        }

        let PlanetData { body, effects, .. } = planet;
        for effect in effects.iter_mut() {
            effect.update(ctx, body, time, delta);
        }
    }
}

/// Planet under `point` (layer space), nearest first.
pub fn hit_test(container: &Container, point: Vec2) -> Option<String> {
    container
        .get_all()
        .iter()
        .filter_map(|p| {
            let distance = p.pos().distance(point);
            (distance <= p.body.radius * HIT_SLOP).then_some((p, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p.id().to_owned())
}

/// Offer a signal to every planet effect. Returns true if one owned it.
pub fn handle_signal(ctx: &mut EngineContext, container: &mut Container, signal: Signal) -> bool {
    container
        .get_all_mut()
        .iter_mut()
        .any(|planet| planet.effects.iter_mut().any(|effect| effect.handle_signal(ctx, signal)))
}
