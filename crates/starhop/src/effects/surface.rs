//! Structures attached to the planet surface: rectangles (buildings with
//! city lights), spikes and bubble foam.
//!
//! Items live on the unit sphere. Every frame they turn by one quaternion
//! step, are sorted by view depth and drawn into the front layer (z >= 0)
//! or the back layer. Items past the horizon fade band are not drawn at all.

use glam::{Vec2, Vec3};
use serde::Deserialize;
use starhop_engine::{Color, EngineContext, Graphics, NodeId};
use crate::math::{
    axis_rotation, fibonacci_sphere, horizon_fade, light_factor, light_vector, random_unit_vector,
    tangent_basis,
};
use crate::planet::PlanetBody;
use super::{Layers, PlanetEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Rectangles,
    Spikes,
    Bubbles,
}

impl SurfaceKind {
    fn tag(self) -> &'static str {
        match self {
            SurfaceKind::Rectangles => "rectangles",
            SurfaceKind::Spikes => "spikes",
            SurfaceKind::Bubbles => "bubbles",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub count: usize,
    /// Item size range in px.
    pub size_min: f32,
    pub size_max: f32,
    pub color: Color,
    /// City lights for rectangles, blend target for bubbles.
    pub secondary_color: Option<Color>,
    /// Spin axis; the sprite's own up vector when absent.
    pub rotation_axis: Option<[f32; 3]>,
    /// Radians per second.
    pub rotation_speed: f32,
    pub shading: bool,
    /// Sphere radius relative to the planet radius.
    pub radius_factor: f32,
    pub fade_start: f32,
    pub fade_end: f32,
    /// Rectangles below this lit factor show city lights.
    pub city_lights_threshold: f32,
    /// Stroke width of spikes.
    pub line_width: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            count: 24,
            size_min: 3.0,
            size_max: 8.0,
            color: Color::WHITE,
            secondary_color: None,
            rotation_axis: None,
            rotation_speed: 0.5,
            shading: true,
            radius_factor: 1.0,
            fade_start: 0.15,
            fade_end: -0.1,
            city_lights_threshold: 0.45,
            line_width: 1.5,
        }
    }
}

#[derive(Debug, Clone)]
struct SurfaceItem {
    pos: Vec3,
    size: f32,
    phase: f32,
    color: Color,
}

pub struct SurfaceEffect {
    kind: SurfaceKind,
    config: SurfaceConfig,
    items: Vec<SurfaceItem>,
    layers: Layers,
}

impl SurfaceEffect {
    pub fn new(
        ctx: &mut EngineContext,
        parent: NodeId,
        body: &PlanetBody,
        kind: SurfaceKind,
        config: &SurfaceConfig,
    ) -> Self {
        let positions = match kind {
            SurfaceKind::Bubbles => fibonacci_sphere(config.count),
            _ => (0..config.count).map(|_| random_unit_vector(&mut ctx.rng)).collect(),
        };
        let secondary = config.secondary_color.unwrap_or(config.color);
        let items = positions
            .into_iter()
            .map(|pos| {
                let size = ctx.rng.range(config.size_min, config.size_max.max(config.size_min));
                let phase = ctx.rng.range(0.0, std::f32::consts::TAU);
                let color = config.color.mix(secondary, ctx.rng.range(0.0, 0.25));
                SurfaceItem { pos, size, phase, color }
            })
            .collect();
        let layers = Layers::new(ctx, parent, body.pos, 0.0, kind.tag());
        Self { kind, config: config.clone(), items, layers }
    }

    fn spin_axis(&self, ctx: &EngineContext, body: &PlanetBody) -> Vec3 {
        if let Some([x, y, z]) = self.config.rotation_axis {
            return Vec3::new(x, y, z);
        }
        let angle = body.sprite.and_then(|s| ctx.stage.rotation(s)).unwrap_or(0.0);
        Vec3::new(angle.sin(), -angle.cos(), 0.0)
    }

    fn draw_item(&self, g: &mut Graphics, item: &SurfaceItem, radius: f32, lit: f32, fade: f32, time: f32) {
        let base = if self.config.shading { item.color.shade(lit) } else { item.color };
        let color = base.with_alpha(base.a * fade);
        let flat = |p: Vec3| Vec2::new(p.x, p.y);
        match self.kind {
            SurfaceKind::Spikes => {
                let height = item.size * (0.75 + 0.25 * (time * 0.004 + item.phase).sin());
                let root = item.pos * radius;
                let tip = item.pos * (radius + height);
                g.line(flat(root), flat(tip), self.config.line_width, color);
            }
            SurfaceKind::Rectangles => {
                let (right, forward) = tangent_basis(item.pos);
                let centre = item.pos * radius;
                let half_w = right * item.size * 0.5;
                let half_h = forward * item.size * 0.3;
                let corners = [
                    flat(centre - half_w - half_h),
                    flat(centre + half_w - half_h),
                    flat(centre + half_w + half_h),
                    flat(centre - half_w + half_h),
                ];
                g.fill_polygon(&corners, color);
                if lit < self.config.city_lights_threshold {
                    let lights = self.config.secondary_color.unwrap_or(Color::YELLOW);
                    g.fill_circle(flat(centre), (item.size * 0.12).max(0.8), lights.with_alpha(fade));
                }
            }
            SurfaceKind::Bubbles => {
                let secondary = self.config.secondary_color.unwrap_or(Color::WHITE);
                let blend = 0.5 + 0.5 * (time * 0.002 + item.phase).sin();
                let fill = color.mix(secondary.with_alpha(color.a), blend * 0.5);
                let centre = flat(item.pos * radius);
                let r = item.size * (0.6 + 0.4 * fade);
                g.fill_circle(centre, r, fill);
                g.fill_circle(centre - Vec2::splat(r * 0.3), r * 0.3, Color::WHITE.with_alpha(0.45 * fade));
            }
        }
    }
}

impl PlanetEffect for SurfaceEffect {
    fn kind(&self) -> &'static str {
        self.kind.tag()
    }

    fn update(&mut self, ctx: &mut EngineContext, body: &PlanetBody, time: f32, delta: f32) {
        if body.hidden {
            return;
        }
        self.layers.place(ctx, body.pos);

        let step = self.config.rotation_speed * delta / 1000.0;
        if step != 0.0 {
            let q = axis_rotation(self.spin_axis(ctx, body), step);
            for item in &mut self.items {
                item.pos = (q * item.pos).normalize_or(item.pos);
            }
        }

        let light = light_vector(body.light_phase);
        let radius = body.radius * self.config.radius_factor;
        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by(|&a, &b| self.items[a].pos.z.total_cmp(&self.items[b].pos.z));

        self.layers.redraw(ctx, |back, front| {
            for i in order {
                let item = &self.items[i];
                let fade = horizon_fade(item.pos.z, self.config.fade_start, self.config.fade_end);
                if fade <= 0.0 {
                    continue;
                }
                let lit = light_factor(item.pos, light);
                let g = if item.pos.z >= 0.0 { &mut *front } else { &mut *back };
                self.draw_item(g, item, radius, lit, fade, time);
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
