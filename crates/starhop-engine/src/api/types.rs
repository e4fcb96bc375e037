use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Unique identifier for a node on the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Caller-chosen token attached to a tween or timer.
///
/// The engine never interprets signals; it reports them back through
/// `EngineContext::drain_signals` so game code can run the next step of a
/// chained animation without holding closures inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signal(pub u32);

/// Something a tween or timer reported during the last `advance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalEvent {
    /// A value tween moved; carries the interpolated value.
    Progress { signal: Signal, value: Vec2 },
    /// A tween finished or a timer fired.
    Fired(Signal),
}

impl SignalEvent {
    pub fn signal(&self) -> Signal {
        match *self {
            SignalEvent::Progress { signal, .. } => signal,
            SignalEvent::Fired(signal) => signal,
        }
    }
}

/// A game event communicated from Rust to the browser.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: u32, a: f32, b: f32, c: f32) -> Self {
        Self { kind: kind as f32, a, b, c }
    }
}
