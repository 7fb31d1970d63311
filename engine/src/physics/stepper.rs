//! Fixed Timestep Accumulator
//!
//! Converts variable frame deltas into a whole number of fixed physics steps.
//! Leftover time carries over to the next frame. Backlog beyond
//! `max_steps_per_frame` is dropped so a long stall cannot snowball.

/// Simulation playback state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimulationState {
    #[default]
    Stopped,
    Running,
    Paused,
}

#[derive(Clone, Copy, Debug)]
pub struct FixedStepper {
    step: f32,
    max_steps_per_frame: u32,
    accumulator: f32,
}

impl FixedStepper {
    pub const DEFAULT_STEP: f32 = 1.0 / 60.0;

    pub fn new(step: f32, max_steps_per_frame: u32) -> Self {
        Self {
            step: if step > 0.0 { step } else { Self::DEFAULT_STEP },
            max_steps_per_frame: max_steps_per_frame.max(1),
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Unconsumed time, always in `[0, step)` after [`advance`](Self::advance).
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Fraction of a step left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Adds `frame_dt` and returns how many fixed steps to run now.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps_per_frame {
            self.accumulator -= self.step;
            steps += 1;
        }

        if steps == self.max_steps_per_frame && self.accumulator >= self.step {
            self.accumulator %= self.step;
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_steps_and_carry() {
        let mut stepper = FixedStepper::new(0.1, 8);
        assert_eq!(stepper.advance(0.25), 2);
        assert!((stepper.accumulator() - 0.05).abs() < 1e-5);
        assert_eq!(stepper.advance(0.06), 1);
    }

    #[test]
    fn test_small_frames_accumulate() {
        let mut stepper = FixedStepper::new(0.1, 8);
        assert_eq!(stepper.advance(0.04), 0);
        assert_eq!(stepper.advance(0.04), 0);
        assert_eq!(stepper.advance(0.04), 1);
    }

    #[test]
    fn test_backlog_is_capped() {
        let mut stepper = FixedStepper::new(0.1, 3);
        assert_eq!(stepper.advance(10.0), 3);
        assert!(stepper.accumulator() < 0.1);
    }

    #[test]
    fn test_invalid_frames_are_ignored() {
        let mut stepper = FixedStepper::new(0.1, 3);
        assert_eq!(stepper.advance(-1.0), 0);
        assert_eq!(stepper.advance(f32::NAN), 0);
        assert_eq!(stepper.accumulator(), 0.0);
    }
}
