// extensions/tween.rs
//
// Tween scheduler. Animates stage node properties (or a free value) over
// time in milliseconds and reports progress/completion as signals, so game
// code chains animations through state enums instead of callbacks.
//
// Usage:
//   let id = tweens.add(node, Tween::position(from, to, 500.0, Easing::QuadOut).with_signal(sig));
//   tweens.tick(dt_ms, &mut stage, &mut signals);

use std::collections::BTreeMap;
use glam::Vec2;
use crate::api::types::{NodeId, Signal, SignalEvent};
use crate::core::stage::Stage;
use super::easing::{Easing, ease, ease_vec2};

/// What property a tween animates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenTarget {
    Position { from: Vec2, to: Vec2 },
    /// Radians.
    Rotation { from: f32, to: f32 },
    Scale { from: Vec2, to: Vec2 },
    Alpha { from: f32, to: f32 },
    /// Touches no node; the eased value is only reported through progress signals.
    Value { from: Vec2, to: Vec2 },
}

impl TweenTarget {
    /// Eased value at `t`, packed as a Vec2 (scalars in `x`).
    fn sample(&self, t: f32, easing: Easing) -> Vec2 {
        match *self {
            TweenTarget::Position { from, to }
            | TweenTarget::Scale { from, to }
            | TweenTarget::Value { from, to } => ease_vec2(from, to, t, easing),
            TweenTarget::Rotation { from, to } | TweenTarget::Alpha { from, to } => {
                Vec2::new(ease(from, to, t, easing), 0.0)
            }
        }
    }
}

/// What happens when a tween completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenLoop {
    /// Stop, fire the completion signal and remove the tween.
    #[default]
    Once,
    /// Restart from the beginning. Never completes.
    Loop,
    /// Reverse direction (ping-pong). Never completes.
    PingPong,
}

#[derive(Debug, Clone)]
pub struct Tween {
    pub target: TweenTarget,
    /// Duration in milliseconds.
    pub duration: f32,
    pub elapsed: f32,
    pub easing: Easing,
    pub loop_mode: TweenLoop,
    pub playing: bool,
    forward: bool,
    /// Signal reported on completion (and on every tick with `with_updates`).
    pub signal: Option<Signal>,
    /// Whether to report `SignalEvent::Progress` each tick.
    pub report_updates: bool,
}

impl Tween {
    pub fn new(target: TweenTarget, duration: f32, easing: Easing) -> Self {
        Self {
            target,
            duration,
            elapsed: 0.0,
            easing,
            loop_mode: TweenLoop::Once,
            playing: true,
            forward: true,
            signal: None,
            report_updates: false,
        }
    }

    pub fn position(from: Vec2, to: Vec2, duration: f32, easing: Easing) -> Self {
        Self::new(TweenTarget::Position { from, to }, duration, easing)
    }

    pub fn rotation(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self::new(TweenTarget::Rotation { from, to }, duration, easing)
    }

    pub fn scale_uniform(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self::new(
            TweenTarget::Scale { from: Vec2::splat(from), to: Vec2::splat(to) },
            duration,
            easing,
        )
    }

    pub fn alpha(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self::new(TweenTarget::Alpha { from, to }, duration, easing)
    }

    pub fn value(from: Vec2, to: Vec2, duration: f32, easing: Easing) -> Self {
        Self::new(TweenTarget::Value { from, to }, duration, easing)
    }

    // -- Builder methods --

    pub fn with_loop(mut self, mode: TweenLoop) -> Self {
        self.loop_mode = mode;
        self
    }

    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Report the eased value every tick (the `onUpdate` hook).
    pub fn with_updates(mut self) -> Self {
        self.report_updates = true;
        self
    }

    /// Normalized progress [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.loop_mode == TweenLoop::Once && self.elapsed >= self.duration
    }
}

/// Handle to a tween for later reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u32);

/// Manages all active tweens. Ticks in creation order.
#[derive(Debug, Default)]
pub struct TweenState {
    tweens: BTreeMap<TweenId, (Option<NodeId>, Tween)>,
    next_id: u32,
}

impl TweenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animate a stage node. Returns a handle for later control.
    pub fn add(&mut self, node: NodeId, tween: Tween) -> TweenId {
        self.insert(Some(node), tween)
    }

    /// Animate a free value (only observable through signals).
    pub fn add_free(&mut self, tween: Tween) -> TweenId {
        self.insert(None, tween)
    }

    fn insert(&mut self, node: Option<NodeId>, tween: Tween) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.tweens.insert(id, (node, tween));
        id
    }

    pub fn remove(&mut self, id: TweenId) -> bool {
        self.tweens.remove(&id).is_some()
    }

    /// Stop every tween driving `node` without firing their signals.
    pub fn kill_tweens_of(&mut self, node: NodeId) -> usize {
        let before = self.tweens.len();
        self.tweens.retain(|_, (n, _)| *n != Some(node));
        before - self.tweens.len()
    }

    pub fn is_tweening(&self, node: NodeId) -> bool {
        self.tweens.values().any(|(n, _)| *n == Some(node))
    }

    pub fn pause(&mut self, id: TweenId) {
        if let Some((_, tween)) = self.tweens.get_mut(&id) {
            tween.playing = false;
        }
    }

    pub fn resume(&mut self, id: TweenId) {
        if let Some((_, tween)) = self.tweens.get_mut(&id) {
            tween.playing = true;
        }
    }

    pub fn get(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.get(&id).map(|(_, t)| t)
    }

    /// Advance all tweens, write their values into the stage and append
    /// signal events to `out`. Tweens whose node has been destroyed are
    /// dropped silently. Returns the number of tweens that completed.
    pub fn tick(&mut self, dt: f32, stage: &mut Stage, out: &mut Vec<SignalEvent>) -> usize {
        let mut finished = Vec::new();

        for (&id, (node, tween)) in self.tweens.iter_mut() {
            if !tween.playing {
                continue;
            }
            if let Some(node) = node {
                if !stage.contains(*node) {
                    finished.push(id);
                    continue;
                }
            }

            tween.elapsed += dt;
            let raw_t = if tween.duration > 0.0 {
                tween.elapsed / tween.duration
            } else {
                1.0
            };
            let t = if tween.forward {
                raw_t.clamp(0.0, 1.0)
            } else {
                (1.0 - raw_t).clamp(0.0, 1.0)
            };

            let value = tween.target.sample(t, tween.easing);
            if let Some(node) = node {
                apply(stage, *node, &tween.target, value);
            }
            if tween.report_updates {
                if let Some(signal) = tween.signal {
                    out.push(SignalEvent::Progress { signal, value });
                }
            }

            if tween.elapsed >= tween.duration {
                match tween.loop_mode {
                    TweenLoop::Once => {
                        if let Some(signal) = tween.signal {
                            out.push(SignalEvent::Fired(signal));
                        }
                        finished.push(id);
                    }
                    TweenLoop::Loop => {
                        tween.elapsed = if tween.duration > 0.0 { tween.elapsed % tween.duration } else { 0.0 };
                    }
                    TweenLoop::PingPong => {
                        tween.elapsed = 0.0;
                        tween.forward = !tween.forward;
                    }
                }
            }
        }

        let count = finished.len();
        for id in finished {
            self.tweens.remove(&id);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tweens.clear();
    }
}

fn apply(stage: &mut Stage, node: NodeId, target: &TweenTarget, value: Vec2) {
    match target {
        TweenTarget::Position { .. } => stage.set_position(node, value),
        TweenTarget::Rotation { .. } => stage.set_rotation(node, value.x),
        TweenTarget::Scale { .. } => stage.set_scale(node, value),
        TweenTarget::Alpha { .. } => stage.set_alpha(node, value.x),
        TweenTarget::Value { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::Node;

    fn setup() -> (Stage, NodeId) {
        let mut stage = Stage::new();
        let id = stage.add(Node::container());
        (stage, id)
    }

    #[test]
    fn tween_position() {
        let (mut stage, id) = setup();
        let mut tweens = TweenState::new();
        let mut out = Vec::new();
        tweens.add(id, Tween::position(Vec2::ZERO, Vec2::new(100.0, 0.0), 1000.0, Easing::Linear));

        tweens.tick(500.0, &mut stage, &mut out);
        assert!((stage.position(id).unwrap().x - 50.0).abs() < 0.01);

        tweens.tick(500.0, &mut stage, &mut out);
        assert!((stage.position(id).unwrap().x - 100.0).abs() < 0.01);
        assert!(tweens.is_empty());
    }

    #[test]
    fn completion_fires_signal_once() {
        let (mut stage, id) = setup();
        let mut tweens = TweenState::new();
        let mut out = Vec::new();
        tweens.add(id, Tween::alpha(1.0, 0.0, 100.0, Easing::Linear).with_signal(Signal(7)));
        tweens.tick(150.0, &mut stage, &mut out);
        tweens.tick(150.0, &mut stage, &mut out);
        assert_eq!(out, vec![SignalEvent::Fired(Signal(7))]);
        assert_eq!(stage.get(id).unwrap().alpha, 0.0);
    }

    #[test]
    fn progress_precedes_completion() {
        let mut stage = Stage::new();
        let mut tweens = TweenState::new();
        let mut out = Vec::new();
        tweens.add_free(
            Tween::value(Vec2::ZERO, Vec2::new(10.0, 20.0), 100.0, Easing::Linear)
                .with_signal(Signal(1))
                .with_updates(),
        );
        tweens.tick(50.0, &mut stage, &mut out);
        tweens.tick(50.0, &mut stage, &mut out);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], SignalEvent::Progress { signal: Signal(1), value: Vec2::new(5.0, 10.0) });
        assert_eq!(out[1], SignalEvent::Progress { signal: Signal(1), value: Vec2::new(10.0, 20.0) });
        assert_eq!(out[2], SignalEvent::Fired(Signal(1)));
    }

    #[test]
    fn signals_delivered_in_creation_order() {
        let mut stage = Stage::new();
        let mut tweens = TweenState::new();
        let mut out = Vec::new();
        for s in [3, 1, 2] {
            tweens.add_free(Tween::value(Vec2::ZERO, Vec2::ONE, 10.0, Easing::Linear).with_signal(Signal(s)));
        }
        tweens.tick(10.0, &mut stage, &mut out);
        let order: Vec<u32> = out.iter().map(|e| e.signal().0).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn kill_is_silent() {
        let (mut stage, id) = setup();
        let mut tweens = TweenState::new();
        let mut out = Vec::new();
        tweens.add(id, Tween::rotation(0.0, 1.0, 100.0, Easing::Linear).with_signal(Signal(9)));
        assert!(tweens.is_tweening(id));
        assert_eq!(tweens.kill_tweens_of(id), 1);
        tweens.tick(200.0, &mut stage, &mut out);
        assert!(out.is_empty());
        assert_eq!(stage.rotation(id), Some(0.0));
    }

    #[test]
    fn loop_never_completes() {
        let (mut stage, id) = setup();
        let mut tweens = TweenState::new();
        let mut out = Vec::new();
        tweens.add(
            id,
            Tween::rotation(0.0, 10.0, 100.0, Easing::Linear)
                .with_loop(TweenLoop::Loop)
                .with_signal(Signal(2)),
        );
        tweens.tick(250.0, &mut stage, &mut out);
        assert!(out.is_empty());
        assert_eq!(tweens.len(), 1);
        let r = stage.rotation(id).unwrap();
        assert!((0.0..=10.0).contains(&r));
    }

    #[test]
    fn destroyed_node_drops_tween() {
        let (mut stage, id) = setup();
        let mut tweens = TweenState::new();
        let mut out = Vec::new();
        tweens.add(id, Tween::alpha(0.0, 1.0, 100.0, Easing::Linear).with_signal(Signal(4)));
        stage.destroy(id);
        tweens.tick(200.0, &mut stage, &mut out);
        assert!(tweens.is_empty());
        assert!(out.is_empty());
    }
}
