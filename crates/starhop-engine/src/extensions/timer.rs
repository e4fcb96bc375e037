use std::collections::BTreeMap;
use crate::api::types::{Signal, SignalEvent};

/// Cancellation handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u32);

#[derive(Debug, Clone)]
struct Timer {
    signal: Signal,
    delay: f32,
    elapsed: f32,
    repeat: bool,
}

/// Delayed and repeating calls, reported as `SignalEvent::Fired`.
#[derive(Debug, Default)]
pub struct TimerState {
    timers: BTreeMap<TimerId, Timer>,
    next_id: u32,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `signal` once after `delay_ms`.
    pub fn delayed_call(&mut self, delay_ms: f32, signal: Signal) -> TimerId {
        self.insert(delay_ms, signal, false)
    }

    /// Fire `signal` every `delay_ms` until removed.
    pub fn repeating(&mut self, delay_ms: f32, signal: Signal) -> TimerId {
        self.insert(delay_ms, signal, true)
    }

    fn insert(&mut self, delay: f32, signal: Signal, repeat: bool) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(id, Timer { signal, delay: delay.max(0.0), elapsed: 0.0, repeat });
        id
    }

    pub fn remove(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Advance all timers and append fired signals to `out`.
    /// A repeating timer fires as many times as whole periods elapsed.
    pub fn tick(&mut self, dt: f32, out: &mut Vec<SignalEvent>) {
        let mut done = Vec::new();
        for (&id, timer) in self.timers.iter_mut() {
            timer.elapsed += dt;
            if timer.elapsed < timer.delay {
                continue;
            }
            if !timer.repeat {
                out.push(SignalEvent::Fired(timer.signal));
                done.push(id);
            } else if timer.delay <= 0.0 {
                timer.elapsed = 0.0;
                out.push(SignalEvent::Fired(timer.signal));
            } else {
                while timer.elapsed >= timer.delay {
                    timer.elapsed -= timer.delay;
                    out.push(SignalEvent::Fired(timer.signal));
                }
            }
        }
        for id in done {
            self.timers.remove(&id);
        }
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delayed_call_fires_once() {
        let mut timers = TimerState::new();
        let mut out = Vec::new();
        timers.delayed_call(100.0, Signal(5));
        timers.tick(60.0, &mut out);
        assert!(out.is_empty());
        timers.tick(60.0, &mut out);
        timers.tick(500.0, &mut out);
        assert_eq!(out, vec![SignalEvent::Fired(Signal(5))]);
        assert!(timers.is_empty());
    }

    #[test]
    fn repeating_catches_up() {
        let mut timers = TimerState::new();
        let mut out = Vec::new();
        timers.repeating(100.0, Signal(1));
        timers.tick(350.0, &mut out);
        assert_eq!(out.len(), 3);
        timers.tick(50.0, &mut out);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn removed_timer_is_silent() {
        let mut timers = TimerState::new();
        let mut out = Vec::new();
        let id = timers.repeating(10.0, Signal(1));
        assert!(timers.remove(id));
        assert!(!timers.remove(id));
        timers.tick(100.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn fires_in_schedule_order() {
        let mut timers = TimerState::new();
        let mut out = Vec::new();
        timers.delayed_call(30.0, Signal(2));
        timers.delayed_call(10.0, Signal(1));
        timers.tick(50.0, &mut out);
        assert_eq!(out, vec![SignalEvent::Fired(Signal(2)), SignalEvent::Fired(Signal(1))]);
    }
}
