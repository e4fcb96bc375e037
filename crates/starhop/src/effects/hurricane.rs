use std::f32::consts::TAU;
use glam::{Vec2, Vec3};
use serde::Deserialize;
use starhop_engine::{Color, EngineContext, Graphics, NodeId};
use crate::math::{axis_rotation, horizon_fade, random_unit_vector, tangent_basis};
use crate::planet::PlanetBody;
use super::{Layers, PlanetEffect};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HurricaneConfig {
    pub count: usize,
    /// Storm radius relative to the planet radius.
    pub size: f32,
    pub arms: usize,
    /// Radians of arm curl from eye to rim.
    pub twist: f32,
    /// Drift over the surface, radians per second.
    pub speed: f32,
    /// Spin of the arms, radians per second.
    pub spin_speed: f32,
    pub color: Color,
    pub line_width: f32,
    pub fade_start: f32,
    pub fade_end: f32,
}

impl Default for HurricaneConfig {
    fn default() -> Self {
        Self {
            count: 2,
            size: 0.35,
            arms: 3,
            twist: 4.0,
            speed: 0.4,
            spin_speed: 2.0,
            color: Color::new(1.0, 1.0, 1.0, 0.8),
            line_width: 1.5,
            fade_start: 0.3,
            fade_end: 0.0,
        }
    }
}

const ARM_POINTS: usize = 10;

struct Storm {
    centre: Vec3,
    axis: Vec3,
    spin: f32,
}

/// Spiral storms drifting over the sphere, each on its own orbit axis.
pub struct Hurricane {
    config: HurricaneConfig,
    storms: Vec<Storm>,
    layers: Layers,
}

impl Hurricane {
    pub fn new(ctx: &mut EngineContext, parent: NodeId, body: &PlanetBody, config: &HurricaneConfig) -> Self {
        let storms = (0..config.count)
            .map(|_| {
                let centre = random_unit_vector(&mut ctx.rng);
                let axis = centre.cross(random_unit_vector(&mut ctx.rng)).normalize_or(Vec3::Y);
                Storm { centre, axis, spin: ctx.rng.range(0.0, TAU) }
            })
            .collect();
        let layers = Layers::new(ctx, parent, body.pos, 0.0, "hurricane");
        Self { config: config.clone(), storms, layers }
    }

    fn draw_storm(&self, g: &mut Graphics, storm: &Storm, radius: f32, fade: f32) {
        let (right, forward) = tangent_basis(storm.centre);
        let arms = self.config.arms.max(1);
        let color = self.config.color.with_alpha(self.config.color.a * fade);
        for arm in 0..arms {
            let start = storm.spin + arm as f32 * TAU / arms as f32;
            let points: Vec<Vec2> = (0..=ARM_POINTS)
                .map(|i| {
                    let t = i as f32 / ARM_POINTS as f32;
                    let a = start + t * self.config.twist;
                    let offset = (right * a.cos() + forward * a.sin()) * t * self.config.size;
                    let p = (storm.centre + offset) * radius;
                    Vec2::new(p.x, p.y)
                })
                .collect();
            g.stroke_polyline(&points, self.config.line_width, color);
        }
        let eye = storm.centre * radius;
        g.fill_circle(Vec2::new(eye.x, eye.y), self.config.line_width, color);
    }
}

impl PlanetEffect for Hurricane {
    fn kind(&self) -> &'static str {
        "hurricane"
    }

    fn update(&mut self, ctx: &mut EngineContext, body: &PlanetBody, _time: f32, delta: f32) {
        if body.hidden {
            return;
        }
        self.layers.place(ctx, body.pos);
        let dt = delta / 1000.0;
        for storm in &mut self.storms {
            storm.centre = (axis_rotation(storm.axis, self.config.speed * dt) * storm.centre).normalize_or(storm.centre);
            storm.spin = (storm.spin + self.config.spin_speed * dt) % TAU;
        }

        let radius = body.radius;
        self.layers.redraw(ctx, |back, front| {
            for storm in &self.storms {
                let fade = horizon_fade(storm.centre.z, self.config.fade_start, self.config.fade_end);
                if fade <= 0.0 {
                    continue;
                }
                let g = if storm.centre.z >= 0.0 { &mut *front } else { &mut *back };
                self.draw_storm(g, storm, radius, fade);
            }
        });
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
        self.layers.destroy(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::planet_fixture;

    #[test]
    fn storms_stay_on_sphere_and_axis_is_perpendicular() {
        let (mut ctx, layer, body) = planet_fixture();
        let mut fx = Hurricane::new(&mut ctx, layer, &body, &HurricaneConfig { count: 5, ..Default::default() });
        for storm in &fx.storms {
            assert!(storm.axis.dot(storm.centre).abs() < 1e-3);
        }
        for _ in 0..60 {
            fx.update(&mut ctx, &body, 0.0, 16.0);
        }
        assert!(fx.storms.iter().all(|s| (s.centre.length() - 1.0).abs() < 1e-3));
    }

    #[test]
    fn far_side_storm_is_not_drawn() {
        let (mut ctx, layer, body) = planet_fixture();
        let config = HurricaneConfig { count: 1, speed: 0.0, ..Default::default() };
        let mut fx = Hurricane::new(&mut ctx, layer, &body, &config);
        fx.storms[0].centre = -Vec3::Z;
        fx.update(&mut ctx, &body, 0.0, 16.0);
        for id in fx.visual_elements() {
            assert!(ctx.stage.graphics(id).unwrap().is_empty());
        }

        fx.storms[0].centre = Vec3::Z;
        fx.update(&mut ctx, &body, 0.0, 16.0);
        let front = fx.layers.front().unwrap();
        assert_eq!(ctx.stage.graphics(front).unwrap().len(), 3 + 1);
    }
}
