// extensions/mod.rs
//
// Animation scheduling layered over the stage. Decoupled from node
// internals: tweens write through `Stage` setters and report signals.

pub mod easing;
pub mod timer;
pub mod tween;

pub use easing::{Easing, lerp, lerp_vec2, ease, ease_vec2, shortest_angle};
pub use timer::{TimerState, TimerId};
pub use tween::{TweenState, Tween, TweenId, TweenTarget, TweenLoop};
