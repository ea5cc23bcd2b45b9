// Engine modules: logic clock, metrics, input

pub mod clock;
pub mod input;
pub mod metrics;
