//! Bodies orbiting the planet on tilted paths: a single moon with a fading
//! trail, or a swarm of small satellites.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use glam::Vec2;
use serde::Deserialize;
use starhop_engine::{Color, EngineContext, Graphics, ImageSprite, Node, NodeId};
use crate::math::orbit_position;
use crate::planet::PlanetBody;
use super::{PlanetEffect, SPRITE_DEPTH};

/// Depth above the sprite while on the near side of the orbit.
pub const FRONT_DEPTH_OFFSET: f32 = 1.2;
/// Depth above the sprite while on the far side of the orbit.
pub const BACK_DEPTH_OFFSET: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitKind {
    MiniMoon,
    Satellites,
}

impl OrbitKind {
    fn tag(self) -> &'static str {
        match self {
            OrbitKind::MiniMoon => "mini_moon",
            OrbitKind::Satellites => "satellites",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Body count (satellites only; a moon is always one body).
    pub count: usize,
    /// Orbit radius relative to the planet radius.
    pub orbit_radius: f32,
    /// Radians per second.
    pub orbit_speed: f32,
    pub tilt: f32,
    pub rotation: f32,
    /// Body radius in px.
    pub size: f32,
    pub color: Color,
    /// Trail length in frames; 0 disables the trail.
    pub trail_length: usize,
    pub texture: Option<String>,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            count: 3,
            orbit_radius: 1.8,
            orbit_speed: 0.8,
            tilt: 0.4,
            rotation: 0.0,
            size: 5.0,
            color: Color::hex(0xc8c8d0),
            trail_length: 16,
            texture: None,
        }
    }
}

struct Orbiter {
    node: NodeId,
    angle: f32,
    /// Planet-relative positions, newest last.
    trail: VecDeque<Vec2>,
    is_front: bool,
}

pub struct OrbitEffect {
    kind: OrbitKind,
    config: OrbitConfig,
    bodies: Vec<Orbiter>,
    trail: Option<NodeId>,
    base_depth: f32,
    visible: bool,
}

impl OrbitEffect {
    pub fn new(ctx: &mut EngineContext, parent: NodeId, body: &PlanetBody, kind: OrbitKind, config: &OrbitConfig) -> Self {
        let count = match kind {
            OrbitKind::MiniMoon => 1,
            OrbitKind::Satellites => config.count.max(1),
        };
        let offset = ctx.rng.range(0.0, TAU);
        let texture = config.texture.as_deref().filter(|t| ctx.textures.contains(t)).map(str::to_owned);
        let bodies = (0..count)
            .map(|i| {
                let node = match &texture {
                    Some(t) => Node::image(ImageSprite::new(t.clone(), config.size * 2.0)),
                    None => Node::circle(config.size, config.color),
                };
                let node = ctx.add_to(parent, node.with_tag(kind.tag()).with_pos(body.pos));
                Orbiter {
                    node,
                    angle: offset + i as f32 * TAU / count as f32,
                    trail: VecDeque::with_capacity(config.trail_length),
                    is_front: true,
                }
            })
            .collect();
        let trail = (config.trail_length > 1).then(|| {
            ctx.add_to(
                parent,
                Node::graphics()
                    .with_tag(format!("{}:trail", kind.tag()))
                    .with_pos(body.pos)
                    .with_depth(SPRITE_DEPTH + BACK_DEPTH_OFFSET),
            )
        });
        Self { kind, config: config.clone(), bodies, trail, base_depth: 0.0, visible: true }
    }

    fn clear_trails(&mut self, ctx: &mut EngineContext) {
        for body in &mut self.bodies {
            body.trail.clear();
        }
        if let Some(g) = self.trail.and_then(|id| ctx.stage.graphics_mut(id)) {
            g.clear();
        }
    }

    fn draw_trails(&self, ctx: &mut EngineContext) {
        let Some(id) = self.trail else { return };
        let mut g = Graphics::new();
        for body in &self.bodies {
            let n = body.trail.len();
            for (i, (a, b)) in body.trail.iter().zip(body.trail.iter().skip(1)).enumerate() {
                let age = (i + 1) as f32 / n as f32;
                g.line(*a, *b, 0.5 + 1.5 * age, self.config.color.with_alpha(0.6 * age));
            }
        }
        if let Some(target) = ctx.stage.graphics_mut(id) {
            *target = g;
        }
    }

    #[cfg(test)]
    fn trail_len(&self) -> usize {
        self.bodies.iter().map(|b| b.trail.len()).sum()
    }
}

impl PlanetEffect for OrbitEffect {
    fn kind(&self) -> &'static str {
        self.kind.tag()
    }

    fn update(&mut self, ctx: &mut EngineContext, body: &PlanetBody, _time: f32, delta: f32) {
        if body.hidden || !self.visible {
            self.clear_trails(ctx);
            return;
        }
        let sprite_depth = body.sprite.and_then(|s| ctx.stage.depth(s)).unwrap_or(SPRITE_DEPTH);
        let radius = body.radius * self.config.orbit_radius;
        let step = self.config.orbit_speed * delta / 1000.0;

        for orbiter in &mut self.bodies {
            orbiter.angle = (orbiter.angle + step) % TAU;
            let p = orbit_position(orbiter.angle, radius, self.config.tilt, self.config.rotation);
            ctx.stage.set_position(orbiter.node, body.pos + p.pos);
            ctx.stage.set_scale(orbiter.node, Vec2::splat(0.8 + 0.4 * p.normalized_z));
            orbiter.is_front = p.is_front;
            if !body.hijacked {
                let offset = if p.is_front { FRONT_DEPTH_OFFSET } else { BACK_DEPTH_OFFSET };
                ctx.stage.set_depth(orbiter.node, sprite_depth + offset);
            }
            if self.config.trail_length > 1 {
                if orbiter.trail.len() == self.config.trail_length {
                    orbiter.trail.pop_front();
                }
                orbiter.trail.push_back(p.pos);
            }
        }

        if let Some(id) = self.trail {
            ctx.stage.set_position(id, body.pos);
        }
        self.draw_trails(ctx);
    }

    fn set_visible(&mut self, ctx: &mut EngineContext, visible: bool) {
        self.visible = visible;
        for id in self.visual_elements() {
            ctx.stage.set_visible(id, visible);
        }
        if !visible {
            self.clear_trails(ctx);
        }
    }

    fn set_depth(&mut self, ctx: &mut EngineContext, depth: f32) {
        self.base_depth = depth;
        for orbiter in &self.bodies {
            let offset = if orbiter.is_front { FRONT_DEPTH_OFFSET } else { BACK_DEPTH_OFFSET };
            ctx.stage.set_depth(orbiter.node, depth + SPRITE_DEPTH + offset);
        }
        if let Some(id) = self.trail {
            ctx.stage.set_depth(id, depth + SPRITE_DEPTH + BACK_DEPTH_OFFSET);
        }
    }

    fn depth(&self) -> f32 {
        self.base_depth
    }

    fn visual_elements(&self) -> Vec<NodeId> {
        self.bodies.iter().map(|b| b.node).chain(self.trail).collect()
    }

    fn destroy(&mut self, ctx: &mut EngineContext) {
        for orbiter in self.bodies.drain(..) {
            ctx.destroy(orbiter.node);
        }
        if let Some(id) = self.trail.take() {
            ctx.destroy(id);
        }
    }
}
