pub mod crossover;

pub use crossover::{CrossoverSignal, SmaCrossover};
