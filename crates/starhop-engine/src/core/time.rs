/// Fixed timestep accumulator, in milliseconds.
/// Ensures game logic runs at a consistent rate regardless of frame time.
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt_ms: f32) -> Self {
        Self {
            dt: dt_ms,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_ms: f32) -> u32 {
        self.accumulator += frame_ms;
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Game clock handed to every `update(time, delta)` call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    /// Milliseconds since the game started.
    pub time: f32,
    /// Milliseconds covered by the current step.
    pub delta: f32,
}

impl FrameClock {
    pub fn advance(&mut self, dt_ms: f32) {
        self.delta = dt_ms;
        self.time += dt_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f32 = 1000.0 / 60.0;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(STEP);
        assert_eq!(ts.accumulate(STEP), 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(STEP);
        assert_eq!(ts.accumulate(8.0), 0);
        assert_eq!(ts.accumulate(10.0), 1);
    }

    #[test]
    fn caps_at_ten_steps() {
        let mut ts = FixedTimestep::new(STEP);
        assert_eq!(ts.accumulate(1000.0), 10);
    }

    #[test]
    fn clock_tracks_time_and_delta() {
        let mut clock = FrameClock::default();
        clock.advance(16.0);
        clock.advance(20.0);
        assert_eq!(clock.time, 36.0);
        assert_eq!(clock.delta, 20.0);
    }
}
