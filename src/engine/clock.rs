/// Logic clock and fixed timestep control
///
/// The logic clock advances in fixed steps driven by the host loop. During a
/// single logic step every system sees the same logic time, which may lag
/// behind or run ahead of the real-time source that stamps input records.
use std::time::Duration;

use crate::core::time::{self, Microseconds};

/// Maximum number of logic steps per frame to prevent spiral of death
const MAX_CATCH_UP_STEPS: u32 = 5;

/// Read-only view of a logic clock
pub trait LogicClock {
    /// Logic time of the current step
    fn logic_time(&self) -> Microseconds;

    /// Number of steps taken since the last resync
    fn tick_counter(&self) -> u64;
}

/// Game clock advanced by the host loop with fixed logic steps
#[derive(Debug, Clone)]
pub struct GameClock {
    /// Logic time, incremented by each step delta
    logic_time: Microseconds,

    /// Delta of the last step
    delta_time: Microseconds,

    /// Steps since the last resync
    tick_counter: u64,

    /// Real time of the last resync
    reset_time: Microseconds,
}

impl GameClock {
    /// Create a new clock synchronised with the real-time source
    pub fn new() -> Self {
        let mut clock = Self {
            logic_time: 0,
            delta_time: 0,
            tick_counter: 0,
            reset_time: 0,
        };
        clock.resync();
        clock
    }

    /// Reset logic time to the current real time
    ///
    /// Use at the start of the loop or after a long pause.
    pub fn resync(&mut self) {
        self.reset_time = time::real_time();
        self.logic_time = self.reset_time;
        self.delta_time = 0;
        self.tick_counter = 0;
    }

    /// Advance logic time by one step of `delta_time`
    pub fn tick(&mut self, delta_time: Microseconds) {
        self.logic_time += delta_time;
        self.delta_time = delta_time;
        self.tick_counter += 1;
    }

    /// Delta of the last step in microseconds
    pub fn delta_time(&self) -> Microseconds {
        self.delta_time
    }

    /// Delta of the last step in seconds
    pub fn delta_time_secs(&self) -> f32 {
        time::micros_to_seconds(self.delta_time)
    }

    /// Real time of the last resync
    pub fn reset_time(&self) -> Microseconds {
        self.reset_time
    }

    /// Current real time from the shared source
    pub fn real_time(&self) -> Microseconds {
        time::real_time()
    }
}

impl LogicClock for GameClock {
    fn logic_time(&self) -> Microseconds {
        self.logic_time
    }

    fn tick_counter(&self) -> u64 {
        self.tick_counter
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts elapsed real time into a bounded number of fixed logic steps
#[derive(Debug)]
pub struct FixedTimestep {
    /// Accumulated time not yet consumed by steps
    accumulator: Duration,

    /// Length of one step
    step: Duration,

    /// Whether stepping is paused
    paused: bool,

    /// Total steps handed out
    step_count: u64,
}

impl FixedTimestep {
    /// Create a stepper running at `frames` steps per second
    pub fn new(frames: u32) -> Self {
        Self {
            accumulator: Duration::ZERO,
            step: Duration::from_micros(time::delta_time(frames) as u64),
            paused: false,
            step_count: 0,
        }
    }

    /// Add elapsed real time, returns the number of logic steps to run
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.paused {
            return 0;
        }

        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < MAX_CATCH_UP_STEPS {
            self.accumulator -= self.step;
            steps += 1;
        }

        self.step_count += steps as u64;
        steps
    }

    /// Length of one step in microseconds
    pub fn step_micros(&self) -> Microseconds {
        self.step.as_micros() as Microseconds
    }

    /// Total steps handed out so far
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Check if stepping is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause stepping
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Logic stepping paused");
        }
    }

    /// Resume stepping
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent a step burst
            self.accumulator = Duration::ZERO;
            log::info!("Logic stepping resumed");
        }
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(time::FRAMES_60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::DELTA_TIME_60;
    use approx::assert_relative_eq;

    #[test]
    fn test_clock_creation() {
        let clock = GameClock::new();
        assert_eq!(clock.tick_counter(), 0);
        assert_eq!(clock.delta_time(), 0);
        assert_eq!(clock.logic_time(), clock.reset_time());
    }

    #[test]
    fn test_clock_tick() {
        let mut clock = GameClock::new();
        let base = clock.logic_time();

        clock.tick(DELTA_TIME_60);
        clock.tick(DELTA_TIME_60);

        assert_eq!(clock.tick_counter(), 2);
        assert_eq!(clock.logic_time(), base + 2 * DELTA_TIME_60);
        assert_eq!(clock.delta_time(), DELTA_TIME_60);
        assert_relative_eq!(clock.delta_time_secs(), 1.0 / 60.0, epsilon = 0.0001);
    }

    #[test]
    fn test_clock_resync() {
        let mut clock = GameClock::new();
        clock.tick(DELTA_TIME_60);
        std::thread::sleep(Duration::from_millis(2));

        clock.resync();
        assert_eq!(clock.tick_counter(), 0);
        assert_eq!(clock.delta_time(), 0);
        assert!(clock.logic_time() <= clock.real_time());
    }

    #[test]
    fn test_logic_time_can_run_ahead() {
        let mut clock = GameClock::new();
        for _ in 0..600 {
            clock.tick(DELTA_TIME_60);
        }
        assert!(clock.logic_time() > clock.real_time());
    }

    #[test]
    fn test_fixed_step_accumulation() {
        let mut stepper = FixedTimestep::new(60);
        assert_eq!(stepper.advance(Duration::from_millis(10)), 0);
        assert_eq!(stepper.advance(Duration::from_millis(10)), 1);
        assert_eq!(stepper.step_count(), 1);
    }

    #[test]
    fn test_max_catch_up_steps() {
        let mut stepper = FixedTimestep::new(60);
        // 300ms would allow 18 steps
        let steps = stepper.advance(Duration::from_millis(300));
        assert_eq!(steps, MAX_CATCH_UP_STEPS);
    }

    #[test]
    fn test_paused_no_steps() {
        let mut stepper = FixedTimestep::new(60);
        stepper.pause();
        assert!(stepper.is_paused());
        assert_eq!(stepper.advance(Duration::from_millis(50)), 0);

        stepper.resume();
        assert!(!stepper.is_paused());
        assert_eq!(stepper.advance(Duration::from_millis(20)), 1);
    }

    #[test]
    fn test_step_micros() {
        let stepper = FixedTimestep::default();
        assert_eq!(stepper.step_micros(), DELTA_TIME_60);
    }
}
