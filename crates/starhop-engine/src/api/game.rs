use glam::Vec2;
use crate::api::types::{GameEvent, NodeId, Signal, SignalEvent};
use crate::assets::registry::TextureRegistry;
use crate::core::node::Node;
use crate::core::stage::Stage;
use crate::core::time::FrameClock;
use crate::extensions::timer::TimerState;
use crate::extensions::tween::{Tween, TweenId, TweenState};
use crate::input::queue::InputQueue;
use crate::systems::emitter::tick_emitters;
use crate::systems::rng::Rng;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in milliseconds (default: 1000/60).
    pub fixed_dt: f32,
    /// Initial viewport width in px.
    pub world_width: f32,
    /// Initial viewport height in px.
    pub world_height: f32,
    /// Maximum number of sprite instances per frame (default: 512).
    pub max_instances: usize,
    /// Maximum number of vector vertices per frame (default: 65536).
    pub max_vector_vertices: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
    /// Seed for the engine RNG.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1000.0 / 60.0,
            world_width: 800.0,
            world_height: 600.0,
            max_instances: 512,
            max_vector_vertices: 65536,
            max_events: 32,
            seed: 42,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Build the initial stage.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One fixed step. Tweens, timers and emitters have already advanced;
    /// their signals are waiting in `ctx.drain_signals()`.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);
}

/// Mutable access to engine state, passed to `Game::init` and `Game::update`.
///
/// This is the whole rendering/animation capability the game sees. It is
/// headless, so tests drive it directly with `advance`.
pub struct EngineContext {
    pub stage: Stage,
    pub tweens: TweenState,
    pub timers: TimerState,
    pub rng: Rng,
    pub textures: TextureRegistry,
    pub events: Vec<GameEvent>,
    pub clock: FrameClock,
    /// Current viewport size in px.
    pub viewport: Vec2,
    signals: Vec<SignalEvent>,
    next_signal: u32,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_config(&GameConfig::default())
    }

    pub fn with_config(config: &GameConfig) -> Self {
        Self {
            stage: Stage::new(),
            tweens: TweenState::new(),
            timers: TimerState::new(),
            rng: Rng::new(config.seed),
            textures: TextureRegistry::new(),
            events: Vec::with_capacity(config.max_events),
            clock: FrameClock::default(),
            viewport: Vec2::new(config.world_width, config.world_height),
            signals: Vec::new(),
            next_signal: 1,
        }
    }

    /// Allocate a fresh signal token.
    pub fn next_signal(&mut self) -> Signal {
        let s = Signal(self.next_signal);
        self.next_signal += 1;
        s
    }

    /// Advance the clock, tweens, timers and emitters by `dt_ms`.
    /// Tween signals are queued before timer signals.
    pub fn advance(&mut self, dt_ms: f32) {
        self.clock.advance(dt_ms);
        self.tweens.tick(dt_ms, &mut self.stage, &mut self.signals);
        self.timers.tick(dt_ms, &mut self.signals);
        tick_emitters(&mut self.stage, &mut self.rng, dt_ms);
    }

    /// Take every signal reported since the last drain, in delivery order.
    pub fn drain_signals(&mut self) -> Vec<SignalEvent> {
        std::mem::take(&mut self.signals)
    }

    pub fn has_pending_signals(&self) -> bool {
        !self.signals.is_empty()
    }

    pub fn time(&self) -> f32 {
        self.clock.time
    }

    pub fn delta(&self) -> f32 {
        self.clock.delta
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    // -- Stage shortcuts --

    pub fn add(&mut self, node: Node) -> NodeId {
        self.stage.add(node)
    }

    pub fn add_to(&mut self, parent: NodeId, node: Node) -> NodeId {
        self.stage.add_to(parent, node)
    }

    /// Destroy a node (and subtree) and stop tweens driving it.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        self.tweens.kill_tweens_of(id);
        self.stage.destroy(id)
    }

    pub fn tween(&mut self, node: NodeId, tween: Tween) -> TweenId {
        self.tweens.add(node, tween)
    }

    pub fn kill_tweens_of(&mut self, node: NodeId) {
        self.tweens.kill_tweens_of(node);
    }

    /// Emit a game event to be forwarded to TypeScript.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Clear per-frame transient data.
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}
