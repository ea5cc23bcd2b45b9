// Input arbitration for a fixed-step game loop

pub mod core;
pub mod engine;

pub use engine::clock::{FixedTimestep, GameClock, LogicClock};
pub use engine::input::{BindingEntry, BindingError, InputDevice, InputFlags, InputSender};
pub use engine::metrics::{Channel, PerformancePolicy, Policy};
