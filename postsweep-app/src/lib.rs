pub mod cli;
pub mod sweep;

pub use sweep::{ActorInput, RunSummary, sweep};
