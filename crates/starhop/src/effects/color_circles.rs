use std::f32::consts::TAU;
use glam::{Vec2, Vec3};
use serde::Deserialize;
use starhop_engine::{Color, EngineContext, Graphics, NodeId};
use crate::math::{axis_rotation, horizon_fade, random_unit_vector, tangent_basis};
use crate::planet::PlanetBody;
use super::{Layers, PlanetEffect};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorCirclesConfig {
    pub sources: usize,
    /// One color per source, cycled.
    pub colors: Vec<Color>,
    /// Milliseconds between waves of one source.
    pub interval: f32,
    /// Milliseconds a wave lives.
    pub wave_lifetime: f32,
    /// Final wave radius on the unit sphere.
    pub max_radius: f32,
    /// Source drift, radians per second.
    pub speed: f32,
    pub segments: usize,
    pub line_width: f32,
    pub fade_start: f32,
    pub fade_end: f32,
}

impl Default for ColorCirclesConfig {
    fn default() -> Self {
        Self {
            sources: 3,
            colors: vec![Color::hex(0xff5fa0), Color::hex(0x5fd0ff), Color::hex(0xffe35f)],
            interval: 900.0,
            wave_lifetime: 2400.0,
            max_radius: 0.8,
            speed: 0.3,
            segments: 24,
            line_width: 1.5,
            fade_start: 0.2,
            fade_end: -0.05,
        }
    }
}

struct Source {
    pos: Vec3,
    axis: Vec3,
    color: Color,
    since_wave: f32,
}

struct Wave {
    centre: Vec3,
    color: Color,
    age: f32,
}

/// Wave sources wandering over the sphere, each emitting expanding rings.
pub struct ColorCircles {
    config: ColorCirclesConfig,
    sources: Vec<Source>,
    waves: Vec<Wave>,
    layers: Layers,
}

impl ColorCircles {
    pub fn new(ctx: &mut EngineContext, parent: NodeId, body: &PlanetBody, config: &ColorCirclesConfig) -> Self {
        let sources = (0..config.sources)
            .map(|i| {
                let pos = random_unit_vector(&mut ctx.rng);
                let axis = pos.cross(random_unit_vector(&mut ctx.rng)).normalize_or(Vec3::Y);
                let color = config.colors.get(i % config.colors.len().max(1)).copied().unwrap_or(Color::WHITE);
                let since_wave = ctx.rng.range(0.0, config.interval);
                Source { pos, axis, color, since_wave }
            })
            .collect();
        let layers = Layers::new(ctx, parent, body.pos, 0.0, "color_circles");
        Self { config: config.clone(), sources, waves: Vec::new(), layers }
    }

    /// Ring of a wave, lying on the sphere around its centre.
    fn ring_points(&self, wave: &Wave) -> Vec<Vec3> {
        let (right, forward) = tangent_basis(wave.centre);
        let r = self.config.max_radius * (wave.age / self.config.wave_lifetime).clamp(0.0, 1.0);
        let segments = self.config.segments.max(3);
        (0..=segments)
            .map(|i| {
                let a = i as f32 / segments as f32 * TAU;
                (wave.centre + (right * a.cos() + forward * a.sin()) * r).normalize_or(wave.centre)
            })
            .collect()
    }

    fn draw(&self, back: &mut Graphics, front: &mut Graphics, radius: f32) {
        for wave in &self.waves {
            let life = 1.0 - (wave.age / self.config.wave_lifetime).clamp(0.0, 1.0);
            let points = self.ring_points(wave);
            let g = if wave.centre.z >= 0.0 { &mut *front } else { &mut *back };
            for pair in points.windows(2) {
                let fade = horizon_fade(pair[0].z.min(pair[1].z), self.config.fade_start, self.config.fade_end);
                if fade <= 0.0 {
                    continue;
                }
                let a = pair[0] * radius;
                let b = pair[1] * radius;
                let color = wave.color.with_alpha(wave.color.a * life * fade);
                g.line(Vec2::new(a.x, a.y), Vec2::new(b.x, b.y), self.config.line_width, color);
            }
        }
    }
}

impl PlanetEffect for ColorCircles {
    fn kind(&self) -> &'static str {
        "color_circles"
    }

    fn update(&mut self, ctx: &mut EngineContext, body: &PlanetBody, _time: f32, delta: f32) {
        if body.hidden {
            return;
        }
        self.layers.place(ctx, body.pos);

        let step = self.config.speed * delta / 1000.0;
        for source in &mut self.sources {
            source.pos = (axis_rotation(source.axis, step) * source.pos).normalize_or(source.pos);
            source.since_wave += delta;
            if source.since_wave >= self.config.interval {
                source.since_wave = 0.0;
                self.waves.push(Wave { centre: source.pos, color: source.color, age: 0.0 });
            }
        }
        for wave in &mut self.waves {
            wave.age += delta;
        }
        let lifetime = self.config.wave_lifetime;
        self.waves.retain(|w| w.age < lifetime);

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
        self.waves.clear();
        self.layers.destroy(ctx);
    }
}
