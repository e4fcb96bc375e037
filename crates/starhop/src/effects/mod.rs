// effects/mod.rs
//
// Procedural planet effects. Each effect owns its stage nodes, reads the
// planet body fresh every frame and never caches its position or flags.
//
// Depth contract for layered effects: the back layer sits at the base depth,
// the front layer at base + 2, the planet sprite conventionally at 1.

pub mod color_circles;
pub mod factory;
pub mod flares;
pub mod ghost;
pub mod glow;
pub mod hurricane;
pub mod orbit;
pub mod ring;
pub mod spin;
pub mod surface;

use glam::Vec2;
use serde::Deserialize;
use starhop_engine::{EngineContext, Graphics, Node, NodeId, Signal};
use crate::planet::PlanetBody;

pub use color_circles::{ColorCircles, ColorCirclesConfig};
pub use factory::{create_effect, create_effects};
pub use flares::{FlareConfig, SolarFlares};
pub use ghost::{GhostConfig, GhostShade};
pub use glow::{Glow, GlowConfig};
pub use hurricane::{Hurricane, HurricaneConfig};
pub use orbit::{OrbitConfig, OrbitEffect, OrbitKind};
pub use ring::{RingConfig, RingEffect, RingKind};
pub use spin::{Spin, SpinConfig};
pub use surface::{SurfaceConfig, SurfaceEffect, SurfaceKind};

/// Depth of the planet sprite inside its layer.
pub const SPRITE_DEPTH: f32 = 1.0;
/// Offset of the front layer above the back layer.
pub const FRONT_OFFSET: f32 = 2.0;

/// Every effect a planet can carry. Tagged by `"type"` in catalog data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectConfig {
    Ring(RingConfig),
    GasBelt(RingConfig),
    AsteroidBelt(RingConfig),
    MiniMoon(OrbitConfig),
    Satellites(OrbitConfig),
    Rectangles(SurfaceConfig),
    Spikes(SurfaceConfig),
    Bubbles(SurfaceConfig),
    Hurricane(HurricaneConfig),
    SolarFlares(FlareConfig),
    GhostShade(GhostConfig),
    ColorCircles(ColorCirclesConfig),
    Glow(GlowConfig),
    Spin(SpinConfig),
}

impl EffectConfig {
    /// Every tag the registry knows.
    pub const TAGS: [&'static str; 14] = [
        "ring",
        "gas_belt",
        "asteroid_belt",
        "mini_moon",
        "satellites",
        "rectangles",
        "spikes",
        "bubbles",
        "hurricane",
        "solar_flares",
        "ghost_shade",
        "color_circles",
        "glow",
        "spin",
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            EffectConfig::Ring(_) => "ring",
            EffectConfig::GasBelt(_) => "gas_belt",
            EffectConfig::AsteroidBelt(_) => "asteroid_belt",
            EffectConfig::MiniMoon(_) => "mini_moon",
            EffectConfig::Satellites(_) => "satellites",
            EffectConfig::Rectangles(_) => "rectangles",
            EffectConfig::Spikes(_) => "spikes",
            EffectConfig::Bubbles(_) => "bubbles",
            EffectConfig::Hurricane(_) => "hurricane",
            EffectConfig::SolarFlares(_) => "solar_flares",
            EffectConfig::GhostShade(_) => "ghost_shade",
            EffectConfig::ColorCircles(_) => "color_circles",
            EffectConfig::Glow(_) => "glow",
            EffectConfig::Spin(_) => "spin",
        }
    }
}

/// Runtime contract of an effect owned by one planet.
pub trait PlanetEffect {
    /// Registry tag of the effect.
    fn kind(&self) -> &'static str;

    /// Per-frame step. `time` and `delta` are in milliseconds.
    fn update(&mut self, ctx: &mut EngineContext, body: &PlanetBody, time: f32, delta: f32);

    fn set_visible(&mut self, ctx: &mut EngineContext, visible: bool);

    /// Move the effect's base depth; layered effects keep their offsets.
    fn set_depth(&mut self, ctx: &mut EngineContext, depth: f32);

    fn depth(&self) -> f32;

    /// Stage nodes an overlay has to borrow to show this effect.
    fn visual_elements(&self) -> Vec<NodeId>;

    /// Release every node, tween and timer. Safe to call twice.
    fn destroy(&mut self, ctx: &mut EngineContext);

    /// Offer a signal to the effect. Returns true if it owned it.
    fn handle_signal(&mut self, _ctx: &mut EngineContext, _signal: Signal) -> bool {
        false
    }
}

// ── Shared layers ───────────────────────────────────────────────────────

/// Back/front graphics pair positioned on the planet centre.
#[derive(Debug, Clone)]
pub(crate) struct Layers {
    back: Option<NodeId>,
    front: Option<NodeId>,
    base_depth: f32,
}

impl Layers {
    pub(crate) fn new(ctx: &mut EngineContext, parent: NodeId, pos: Vec2, base_depth: f32, tag: &str) -> Self {
        let back = ctx.add_to(
            parent,
            Node::graphics().with_tag(format!("{}:back", tag)).with_pos(pos).with_depth(base_depth),
        );
        let front = ctx.add_to(
            parent,
            Node::graphics()
                .with_tag(format!("{}:front", tag))
                .with_pos(pos)
                .with_depth(base_depth + FRONT_OFFSET),
        );
        Self { back: Some(back), front: Some(front), base_depth }
    }

    pub(crate) fn back(&self) -> Option<NodeId> {
        self.back
    }

    pub(crate) fn front(&self) -> Option<NodeId> {
        self.front
    }

    pub(crate) fn nodes(&self) -> Vec<NodeId> {
        self.back.into_iter().chain(self.front).collect()
    }

    pub(crate) fn place(&self, ctx: &mut EngineContext, pos: Vec2) {
        for id in self.nodes() {
            ctx.stage.set_position(id, pos);
        }
    }

    pub(crate) fn clear(&self, ctx: &mut EngineContext) {
        for id in self.nodes() {
            if let Some(g) = ctx.stage.graphics_mut(id) {
                g.clear();
            }
        }
    }

    /// Clear both layers and hand them to `draw` as `(back, front)`.
    pub(crate) fn redraw(&self, ctx: &mut EngineContext, draw: impl FnOnce(&mut Graphics, &mut Graphics)) {
        let mut back = Graphics::new();
        let mut front = Graphics::new();
        draw(&mut back, &mut front);
        if let Some(g) = self.back.and_then(|id| ctx.stage.graphics_mut(id)) {
            *g = back;
        }
        if let Some(g) = self.front.and_then(|id| ctx.stage.graphics_mut(id)) {
            *g = front;
        }
    }

    pub(crate) fn set_visible(&self, ctx: &mut EngineContext, visible: bool) {
        for id in self.nodes() {
            ctx.stage.set_visible(id, visible);
        }
    }

    pub(crate) fn set_depth(&mut self, ctx: &mut EngineContext, depth: f32) {
        self.base_depth = depth;
        if let Some(back) = self.back {
            ctx.stage.set_depth(back, depth);
        }
        if let Some(front) = self.front {
            ctx.stage.set_depth(front, depth + FRONT_OFFSET);
        }
    }

    pub(crate) fn depth(&self) -> f32 {
        self.base_depth
    }

    pub(crate) fn destroy(&mut self, ctx: &mut EngineContext) {
        for id in self.back.take().into_iter().chain(self.front.take()) {
            ctx.destroy(id);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use glam::Vec2;
    use starhop_engine::{EngineContext, Node, NodeId};
    use crate::planet::PlanetBody;

    /// Stage with one layer and a sprite, plus a body describing it.
    pub(crate) fn planet_fixture() -> (EngineContext, NodeId, PlanetBody) {
        let mut ctx = EngineContext::new();
        let layer = ctx.add(Node::container());
        let pos = Vec2::new(200.0, 150.0);
        let sprite = ctx.add_to(layer, Node::circle(32.0, starhop_engine::Color::WHITE).with_pos(pos).with_depth(1.0));
        let body = PlanetBody {
            id: "p".into(),
            pos,
            hidden: false,
            hijacked: false,
            visual_scale: 1.0,
            tint: None,
            sprite: Some(sprite),
            light_phase: 4,
            radius: 32.0,
        };
        (ctx, layer, body)
    }
}
