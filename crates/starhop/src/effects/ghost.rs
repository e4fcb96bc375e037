use std::f32::consts::TAU;
use glam::Vec2;
use serde::Deserialize;
use starhop_engine::{BlendMode, Color, EngineContext, ImageSprite, Node, NodeId};
use crate::math::orbit_position;
use crate::planet::PlanetBody;
use super::{PlanetEffect, SPRITE_DEPTH};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GhostConfig {
    pub count: usize,
    /// Texture key; a plain circle when missing.
    pub texture: Option<String>,
    /// Shade size in px.
    pub size: f32,
    pub alpha: f32,
    /// Orbit radius relative to the planet radius.
    pub orbit_radius: f32,
    /// Radians per second.
    pub speed: f32,
    pub tilt: f32,
    /// Alpha pulse, radians per second.
    pub pulse_speed: f32,
    pub color: Color,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            count: 3,
            texture: None,
            size: 14.0,
            alpha: 0.5,
            orbit_radius: 1.5,
            speed: 0.6,
            tilt: 0.5,
            pulse_speed: 2.0,
            color: Color::new(0.7, 0.8, 1.0, 1.0),
        }
    }
}

struct Shade {
    node: NodeId,
    angle: f32,
    tilt: f32,
    rotation: f32,
    phase: f32,
    is_front: bool,
}

/// Translucent shades circling the planet on individually tilted paths.
pub struct GhostShade {
    config: GhostConfig,
    shades: Vec<Shade>,
    base_depth: f32,
}

impl GhostShade {
    pub fn new(ctx: &mut EngineContext, parent: NodeId, body: &PlanetBody, config: &GhostConfig) -> Self {
        let texture = config.texture.as_deref().filter(|t| ctx.textures.contains(t)).map(str::to_owned);
        let count = config.count.max(1);
        let shades = (0..count)
            .map(|i| {
                let node = match &texture {
                    Some(t) => Node::image(ImageSprite::new(t.clone(), config.size).with_blend(BlendMode::Additive))
                        .with_tint(config.color),
                    None => Node::circle(config.size * 0.5, config.color),
                };
                let node = ctx.add_to(parent, node.with_tag("ghost_shade").with_pos(body.pos).with_alpha(config.alpha));
                Shade {
                    node,
                    angle: i as f32 * TAU / count as f32,
                    tilt: config.tilt + ctx.rng.range(-0.3, 0.3),
                    rotation: ctx.rng.range(-0.6, 0.6),
                    phase: ctx.rng.range(0.0, TAU),
                    is_front: true,
                }
            })
            .collect();
        Self { config: config.clone(), shades, base_depth: 0.0 }
    }
}

impl PlanetEffect for GhostShade {
    fn kind(&self) -> &'static str {
        "ghost_shade"
    }

    fn update(&mut self, ctx: &mut EngineContext, body: &PlanetBody, time: f32, delta: f32) {
        if body.hidden {
            return;
        }
        let sprite_depth = body.sprite.and_then(|s| ctx.stage.depth(s)).unwrap_or(SPRITE_DEPTH);
        let radius = body.radius * self.config.orbit_radius;
        let step = self.config.speed * delta / 1000.0;
        for shade in &mut self.shades {
            shade.angle = (shade.angle + step) % TAU;
            let p = orbit_position(shade.angle, radius, shade.tilt, shade.rotation);
            let pulse = 0.6 + 0.4 * (time / 1000.0 * self.config.pulse_speed + shade.phase).sin();
            ctx.stage.set_position(shade.node, body.pos + p.pos);
            ctx.stage.set_scale(shade.node, Vec2::splat(0.7 + 0.5 * p.normalized_z));
            ctx.stage.set_alpha(shade.node, self.config.alpha * pulse * (0.5 + 0.5 * p.normalized_z));
            shade.is_front = p.is_front;
            if !body.hijacked {
                let offset = if p.is_front { 1.1 } else { -0.5 };
                ctx.stage.set_depth(shade.node, sprite_depth + offset);
            }
        }
    }

    fn set_visible(&mut self, ctx: &mut EngineContext, visible: bool) {
        for shade in &self.shades {
            ctx.stage.set_visible(shade.node, visible);
        }
    }

    fn set_depth(&mut self, ctx: &mut EngineContext, depth: f32) {
        self.base_depth = depth;
        for shade in &self.shades {
            let offset = if shade.is_front { 1.1 } else { -0.5 };
            ctx.stage.set_depth(shade.node, depth + SPRITE_DEPTH + offset);
        }
    }

    fn depth(&self) -> f32 {
        self.base_depth
    }

    fn visual_elements(&self) -> Vec<NodeId> {
        self.shades.iter().map(|s| s.node).collect()
    }

    fn destroy(&mut self, ctx: &mut EngineContext) {
        for shade in self.shades.drain(..) {
            ctx.destroy(shade.node);
        }
    }
}
