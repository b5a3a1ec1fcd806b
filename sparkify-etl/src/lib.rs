pub mod config;
pub mod runner;

pub use config::Config;
pub use runner::{process_data, run, DataKind, LoadSummary, RunSummary};
