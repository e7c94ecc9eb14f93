// src/lib.rs
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod dedup_log;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod mutator;
pub mod output;
pub mod probers;
pub mod resolver;
pub mod session;
pub mod types;
pub mod utils;

pub use cli::Args;
pub use engine::ScanEngine;
pub use mutator::{Candidate, MutationSpec, NameMutator};
pub use types::{BucketFinderError, ProbeOutcome, ScanConfig, ScanStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
