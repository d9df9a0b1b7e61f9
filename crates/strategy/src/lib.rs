pub mod config;
pub mod indicators;

pub use config::{CrossoverParams, SignalFileConfig};
pub use indicators::{CrossoverSignal, SmaCrossover};
