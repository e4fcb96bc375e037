use glam::Vec2;
use starhop_engine::{shortest_angle, Color, Easing, EngineContext, Node, NodeId, Signal, Tween};

/// Ship parks this far left of the planet centre.
pub const SHIP_OFFSET: f32 = 60.0;
/// Cruise speed in px per second.
pub const SHIP_SPEED: f32 = 320.0;
/// Shortest travel, so even a zero-length hop completes through a signal.
pub const MIN_TRAVEL_MS: f32 = 150.0;
pub const TURN_MS: f32 = 200.0;
pub const SHIP_DEPTH: f32 = 5.0;

/// Anchor point the ship parks at for a planet centred on `planet`.
pub fn anchor_for(planet: Vec2) -> Vec2 {
    planet - Vec2::new(SHIP_OFFSET, 0.0)
}

/// Owns the ship node and its travel tweens.
pub struct ShipController {
    node: Option<NodeId>,
}

impl ShipController {
    pub fn new() -> Self {
        Self { node: None }
    }

    /// Create the ship at `at` if it does not exist yet.
    pub fn spawn(&mut self, ctx: &mut EngineContext, at: Vec2) -> NodeId {
        if let Some(id) = self.node.filter(|&id| ctx.stage.contains(id)) {
            return id;
        }
        let id = ctx.add(Node::graphics().with_tag("ship").with_pos(at).with_depth(SHIP_DEPTH));
        if let Some(g) = ctx.stage.graphics_mut(id) {
            // Nose along +x so rotation 0 faces right.
            let hull = [Vec2::new(14.0, 0.0), Vec2::new(-10.0, -9.0), Vec2::new(-5.0, 0.0), Vec2::new(-10.0, 9.0)];
            g.fill_polygon(&hull, Color::hex(0xdfe6f0));
            g.stroke_polygon(&hull, 1.5, Color::CYAN);
        }
        self.node = Some(id);
        id
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn position(&self, ctx: &EngineContext) -> Option<Vec2> {
        self.node.and_then(|id| ctx.stage.position(id))
    }

    pub fn is_moving(&self, ctx: &EngineContext) -> bool {
        self.node.is_some_and(|id| ctx.tweens.is_tweening(id))
    }

    /// Jump to `at` with no animation, cancelling any travel in flight.
    pub fn place_at(&mut self, ctx: &mut EngineContext, at: Vec2) {
        let id = self.spawn(ctx, at);
        ctx.kill_tweens_of(id);
        ctx.stage.set_position(id, at);
    }

    /// Turn along the shortest arc and fly to `target`. The move tween
    /// carries `signal`; any travel already in flight is dropped along with
    /// its signal.
    pub fn rotate_and_move_to(&mut self, ctx: &mut EngineContext, target: Vec2, signal: Signal) {
        let from = self.position(ctx);
        let id = self.spawn(ctx, target);
        ctx.kill_tweens_of(id);
        let from = from.unwrap_or(target);

        let delta = target - from;
        let distance = delta.length();
        if distance > 0.5 {
            let current = ctx.stage.rotation(id).unwrap_or(0.0);
            let heading = delta.y.atan2(delta.x);
            let to = current + shortest_angle(current, heading);
            ctx.tween(id, Tween::rotation(current, to, TURN_MS, Easing::QuadOut));
        }

        let duration = (distance / SHIP_SPEED * 1000.0).max(MIN_TRAVEL_MS);
        ctx.tween(id, Tween::position(from, target, duration, Easing::SineInOut).with_signal(signal));
        log::debug!("ship: {:.0}px to {:?} in {:.0}ms", distance, target, duration);
    }

    pub fn destroy(&mut self, ctx: &mut EngineContext) {
        if let Some(id) = self.node.take() {
            ctx.destroy(id);
        }
    }
}

impl Default for ShipController {
    fn default() -> Self {
        Self::new()
    }
}
