// Time units and the process-wide real-time source

use std::sync::OnceLock;
use std::time::Instant;

/// Time value expressed in microseconds
pub type Microseconds = i64;

/// Unit scale of one microsecond (in raw units)
pub const MICROSECOND_UNIT: i64 = 10;

/// Unit scale of one millisecond (in raw units)
pub const MILLISECOND_UNIT: i64 = 10_000;

/// Unit scale of one second (in raw units)
pub const SECOND_UNIT: i64 = 10_000_000;

pub const FRAMES_30: u32 = 30;
pub const FRAMES_60: u32 = 60;
pub const FRAMES_144: u32 = 144;

/// Duration of one 30Hz tick
pub const DELTA_TIME_30: Microseconds = delta_time(FRAMES_30);

/// Duration of one 60Hz tick
pub const DELTA_TIME_60: Microseconds = delta_time(FRAMES_60);

/// Duration of one 144Hz tick
pub const DELTA_TIME_144: Microseconds = delta_time(FRAMES_144);

/// Convert `value` from one unit scale to another
pub fn from_to(value: f64, from: i64, to: i64) -> f64 {
    (value * from as f64) / to as f64
}

/// Length of one tick at `frames` ticks per second
pub const fn delta_time(frames: u32) -> Microseconds {
    1_000_000 / frames as Microseconds
}

/// Convert seconds to microseconds
pub fn seconds_to_micros(seconds: f64) -> Microseconds {
    from_to(seconds, SECOND_UNIT, MICROSECOND_UNIT) as Microseconds
}

/// Convert microseconds to seconds
pub fn micros_to_seconds(micros: Microseconds) -> f32 {
    from_to(micros as f64, MICROSECOND_UNIT, SECOND_UNIT) as f32
}

/// Convert microseconds to whole milliseconds
pub fn micros_to_millis(micros: Microseconds) -> i64 {
    from_to(micros as f64, MICROSECOND_UNIT, MILLISECOND_UNIT) as i64
}

/// Monotonic real time in microseconds, measured from the first call in this process.
///
/// Input producers and the logic clock share this domain, so a record stamped
/// with `real_time()` can be compared directly with `GameClock::logic_time()`.
pub fn real_time() -> Microseconds {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_micros() as Microseconds
}
