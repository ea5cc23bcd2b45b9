// Core utilities shared across the engine

pub mod time;
