//! Rings and belts. Geometry is drawn once; per frame the bands are only
//! re-centred on the planet. The back half-ellipse (angles 0..π, the lower
//! screen half) sits behind the sprite, the front half (π..2π) above it.

use std::f32::consts::{PI, TAU};
use glam::Vec2;
use serde::Deserialize;
use starhop_engine::{Color, Easing, EngineContext, Graphics, NodeId, Tween, TweenId, TweenLoop};
use crate::planet::PlanetBody;
use super::{Layers, PlanetEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingKind {
    /// One solid band.
    Ring,
    /// Several thin translucent bands.
    GasBelt,
    /// Scattered rocks along the ellipse.
    AsteroidBelt,
}

impl RingKind {
    fn tag(self) -> &'static str {
        match self {
            RingKind::Ring => "ring",
            RingKind::GasBelt => "gas_belt",
            RingKind::AsteroidBelt => "asteroid_belt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Radii relative to the planet radius.
    pub inner: f32,
    pub outer: f32,
    /// Tilt in radians; the ellipse height is `radius * sin(tilt)`.
    pub tilt: f32,
    pub color: Color,
    pub secondary_color: Option<Color>,
    /// Band count for gas belts.
    pub bands: usize,
    /// Rock count for asteroid belts.
    pub count: usize,
    pub width: f32,
    /// Radians per second of in-plane rotation; 0 disables it.
    pub rotation_speed: f32,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            inner: 1.4,
            outer: 1.9,
            tilt: 0.35,
            color: Color::hex(0xd8c8a0),
            secondary_color: None,
            bands: 4,
            count: 60,
            width: 3.0,
            rotation_speed: 0.0,
        }
    }
}

const ARC_SEGMENTS: usize = 32;

pub struct RingEffect {
    kind: RingKind,
    layers: Layers,
    tweens: Vec<TweenId>,
}

impl RingEffect {
    pub fn new(ctx: &mut EngineContext, parent: NodeId, body: &PlanetBody, kind: RingKind, config: &RingConfig) -> Self {
        let layers = Layers::new(ctx, parent, body.pos, 0.0, kind.tag());
        let mut back = Graphics::new();
        let mut front = Graphics::new();
        let flatten = config.tilt.sin().abs().max(0.05);
        let band = |r: f32| Vec2::new(r, r * flatten) * body.radius;

        match kind {
            RingKind::Ring => {
                let r = (config.inner + config.outer) * 0.5;
                let width = ((config.outer - config.inner) * body.radius).max(config.width);
                back.stroke_arc(Vec2::ZERO, band(r), 0.0, PI, ARC_SEGMENTS, width, config.color.shade(0.7));
                front.stroke_arc(Vec2::ZERO, band(r), PI, TAU, ARC_SEGMENTS, width, config.color);
            }
            RingKind::GasBelt => {
                let secondary = config.secondary_color.unwrap_or(config.color);
                let bands = config.bands.max(1);
                for i in 0..bands {
                    let t = if bands == 1 { 0.5 } else { i as f32 / (bands - 1) as f32 };
                    let r = config.inner + (config.outer - config.inner) * t;
                    let color = config.color.mix(secondary, t).with_alpha(0.35 + 0.3 * (1.0 - t));
                    back.stroke_arc(Vec2::ZERO, band(r), 0.0, PI, ARC_SEGMENTS, config.width, color.shade(0.7));
                    front.stroke_arc(Vec2::ZERO, band(r), PI, TAU, ARC_SEGMENTS, config.width, color);
                }
            }
            RingKind::AsteroidBelt => {
                for _ in 0..config.count {
                    let angle = ctx.rng.range(0.0, TAU);
                    let r = ctx.rng.range(config.inner, config.outer.max(config.inner));
                    let size = ctx.rng.range(0.8, 2.2);
                    let p = band(r) * Vec2::new(angle.cos(), angle.sin());
                    if angle < PI {
                        back.fill_circle(p, size, config.color.shade(0.6));
                    } else {
                        front.fill_circle(p, size, config.color);
                    }
                }
            }
        }

        layers.redraw(ctx, |b, f| {
            *b = back;
            *f = front;
        });

        let mut tweens = Vec::new();
        if config.rotation_speed != 0.0 {
            let period = TAU / config.rotation_speed.abs() * 1000.0;
            let turn = TAU * config.rotation_speed.signum();
            for id in layers.nodes() {
                tweens.push(ctx.tween(id, Tween::rotation(0.0, turn, period, Easing::Linear).with_loop(TweenLoop::Loop)));
            }
        }

        Self { kind, layers, tweens }
    }
}

impl PlanetEffect for RingEffect {
    fn kind(&self) -> &'static str {
        self.kind.tag()
    }

    fn update(&mut self, ctx: &mut EngineContext, body: &PlanetBody, _time: f32, _delta: f32) {
        if body.hidden {
            return;
        }
        self.layers.place(ctx, body.pos);
    }

    fn set_visible(&mut self, ctx: &mut EngineContext, visible: bool) {
        self.layers.set_visible(ctx, visible);
    }

    fn set_depth(&mut self, ctx: &mut EngineContext, depth: f32) {
        self.layers.set_depth(ctx, depth);
    }

    fn depth(&self) -> f32 {
        self.layers.depth()
    }

    fn visual_elements(&self) -> Vec<NodeId> {
        self.layers.nodes()
    }

    fn destroy(&mut self, ctx: &mut EngineContext) {
        for id in self.tweens.drain(..) {
            ctx.tweens.remove(id);
        }
        self.layers.destroy(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starhop_engine::Shape;
    use crate::effects::testing::planet_fixture;

    #[test]
    fn back_half_below_front_half_above() {
        let (mut ctx, layer, body) = planet_fixture();
        let fx = RingEffect::new(&mut ctx, layer, &body, RingKind::Ring, &RingConfig::default());
        let ys = |id: Option<NodeId>| -> Vec<f32> {
            match id.and_then(|id| ctx.stage.graphics(id)).map(|g| g.shapes().to_vec()) {
                Some(shapes) => shapes
                    .into_iter()
                    .flat_map(|s| match s {
                        Shape::Stroke { points, .. } => points.into_iter().map(|p| p.y).collect(),
                        _ => Vec::new(),
                    })
                    .collect(),
                None => Vec::new(),
            }
        };
        assert!(ys(fx.layers.back()).iter().all(|&y| y >= -1e-3));
        assert!(ys(fx.layers.front()).iter().all(|&y| y <= 1e-3));
    }

    #[test]
    fn geometry_is_static_and_recentred() {
        let (mut ctx, layer, mut body) = planet_fixture();
        let mut fx = RingEffect::new(&mut ctx, layer, &body, RingKind::GasBelt, &RingConfig::default());
        let front = fx.layers.front().unwrap();
        let before = ctx.stage.graphics(front).cloned();
        body.pos = Vec2::new(50.0, 60.0);
        fx.update(&mut ctx, &body, 100.0, 16.0);
        assert_eq!(ctx.stage.graphics(front).cloned(), before);
        assert_eq!(ctx.stage.position(front), Some(Vec2::new(50.0, 60.0)));
    }

    #[test]
    fn rotation_tween_is_removed_on_destroy() {
        let (mut ctx, layer, body) = planet_fixture();
        let config = RingConfig { rotation_speed: 0.5, ..Default::default() };
        let mut fx = RingEffect::new(&mut ctx, layer, &body, RingKind::AsteroidBelt, &config);
        assert_eq!(ctx.tweens.len(), 2);
        ctx.advance(500.0);
        assert!(ctx.stage.rotation(fx.layers.back().unwrap()).unwrap() > 0.0);
        fx.destroy(&mut ctx);
        assert!(ctx.tweens.is_empty());
    }
}
