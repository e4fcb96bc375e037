use std::f32::consts::PI;
use glam::{Vec2, Vec3};
use serde::Deserialize;
use starhop_engine::{Color, EngineContext, Graphics, NodeId, Signal, TimerId};
use crate::math::{horizon_fade, random_unit_vector, rotate_about, tangent_basis};
use crate::planet::PlanetBody;
use super::{Layers, PlanetEffect};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlareConfig {
    /// Milliseconds between flare spawns.
    pub interval: f32,
    /// Milliseconds a flare lives.
    pub lifetime: f32,
    pub max_flares: usize,
    /// Peak arc height relative to the planet radius.
    pub height: f32,
    /// Angular distance between the two foot points, radians.
    pub span: f32,
    pub color: Color,
    pub line_width: f32,
    pub fade_start: f32,
    pub fade_end: f32,
}

impl Default for FlareConfig {
    fn default() -> Self {
        Self {
            interval: 1200.0,
            lifetime: 1500.0,
            max_flares: 6,
            height: 0.35,
            span: 0.6,
            color: Color::hex(0xffa040),
            line_width: 2.0,
            fade_start: 0.2,
            fade_end: -0.15,
        }
    }
}

const ARC_POINTS: usize = 12;

struct Flare {
    from: Vec3,
    axis: Vec3,
    age: f32,
}

impl Flare {
    /// Point `s` (0..1) along the arc, lifted above the surface.
    fn point(&self, s: f32, span: f32, lift: f32) -> Vec3 {
        rotate_about(self.from, self.axis, span * s) * (1.0 + lift * (PI * s).sin())
    }
}

/// Arcs rising from random surface points, spawned by a repeating timer.
pub struct SolarFlares {
    config: FlareConfig,
    flares: Vec<Flare>,
    pending: usize,
    signal: Signal,
    timer: Option<TimerId>,
    layers: Layers,
}

impl SolarFlares {
    pub fn new(ctx: &mut EngineContext, parent: NodeId, body: &PlanetBody, config: &FlareConfig) -> Self {
        let signal = ctx.next_signal();
        let timer = ctx.timers.repeating(config.interval.max(1.0), signal);
        let layers = Layers::new(ctx, parent, body.pos, 0.0, "solar_flares");
        Self { config: config.clone(), flares: Vec::new(), pending: 0, signal, timer: Some(timer), layers }
    }

    fn spawn(&mut self, ctx: &mut EngineContext) {
        let from = random_unit_vector(&mut ctx.rng);
        let (right, forward) = tangent_basis(from);
        let turn = ctx.rng.range(0.0, std::f32::consts::TAU);
        let direction = right * turn.cos() + forward * turn.sin();
        let axis = from.cross(direction).normalize_or(Vec3::Y);
        self.flares.push(Flare { from, axis, age: 0.0 });
    }

    fn draw(&self, back: &mut Graphics, front: &mut Graphics, radius: f32) {
        for flare in &self.flares {
            let t = (flare.age / self.config.lifetime).clamp(0.0, 1.0);
            let lift = self.config.height * (PI * t).sin();
            let mid = flare.point(0.5, self.config.span, 0.0);
            let fade = horizon_fade(mid.z, self.config.fade_start, self.config.fade_end);
            if fade <= 0.0 {
                continue;
            }
            let points: Vec<Vec2> = (0..=ARC_POINTS)
                .map(|i| {
                    let p = flare.point(i as f32 / ARC_POINTS as f32, self.config.span, lift) * radius;
                    Vec2::new(p.x, p.y)
                })
                .collect();
            let alpha = self.config.color.a * fade * (1.0 - t);
            let g = if mid.z >= 0.0 { &mut *front } else { &mut *back };
            g.stroke_polyline(&points, self.config.line_width, self.config.color.with_alpha(alpha));
        }
    }
}

impl PlanetEffect for SolarFlares {
    fn kind(&self) -> &'static str {
        "solar_flares"
    }

    fn update(&mut self, ctx: &mut EngineContext, body: &PlanetBody, _time: f32, delta: f32) {
        if body.hidden {
            self.pending = 0;
            return;
        }
        self.layers.place(ctx, body.pos);
        for flare in &mut self.flares {
            flare.age += delta;
        }
        let lifetime = self.config.lifetime;
        self.flares.retain(|f| f.age < lifetime);
        while self.pending > 0 {
            self.pending -= 1;
            if self.flares.len() < self.config.max_flares {
                self.spawn(ctx);
            }
        }
        let radius = body.radius;
        self.layers.redraw(ctx, |back, front| self.draw(back, front, radius));
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
        if let Some(timer) = self.timer.take() {
            ctx.timers.remove(timer);
        }
        self.flares.clear();
        self.layers.destroy(ctx);
    }

    fn handle_signal(&mut self, _ctx: &mut EngineContext, signal: Signal) -> bool {
        if signal != self.signal || self.timer.is_none() {
            return false;
        }
        self.pending += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::planet_fixture;

    fn pump(ctx: &mut EngineContext, fx: &mut SolarFlares, body: &PlanetBody, ms: f32) {
        ctx.advance(ms);
        for ev in ctx.drain_signals() {
            fx.handle_signal(ctx, ev.signal());
        }
        let time = ctx.time();
        fx.update(ctx, body, time, ms);
    }

    #[test]
    fn timer_spawns_and_lifetime_expires() {
        let (mut ctx, layer, body) = planet_fixture();
        let config = FlareConfig { interval: 100.0, lifetime: 150.0, max_flares: 10, ..Default::default() };
        let mut fx = SolarFlares::new(&mut ctx, layer, &body, &config);
        pump(&mut ctx, &mut fx, &body, 100.0);
        assert_eq!(fx.flares.len(), 1);
        pump(&mut ctx, &mut fx, &body, 100.0);
        pump(&mut ctx, &mut fx, &body, 100.0);
        assert_eq!(fx.flares.len(), 2);
        assert!(fx.flares.iter().all(|f| f.age < 150.0));
    }

    #[test]
    fn spawn_count_is_capped() {
        let (mut ctx, layer, body) = planet_fixture();
        let config = FlareConfig { interval: 10.0, lifetime: 10_000.0, max_flares: 3, ..Default::default() };
        let mut fx = SolarFlares::new(&mut ctx, layer, &body, &config);
        pump(&mut ctx, &mut fx, &body, 100.0);
        assert_eq!(fx.flares.len(), 3);
    }

    #[test]
    fn destroy_stops_timer() {
        let (mut ctx, layer, body) = planet_fixture();
        let mut fx = SolarFlares::new(&mut ctx, layer, &body, &FlareConfig::default());
        let signal = fx.signal;
        fx.destroy(&mut ctx);
        ctx.advance(5000.0);
        assert!(ctx.drain_signals().is_empty());
        assert!(!fx.handle_signal(&mut ctx, signal));
    }

    #[test]
    fn foreign_signals_are_declined() {
        let (mut ctx, layer, body) = planet_fixture();
        let mut fx = SolarFlares::new(&mut ctx, layer, &body, &FlareConfig::default());
        let other = ctx.next_signal();
        assert!(!fx.handle_signal(&mut ctx, other));
    }
}
