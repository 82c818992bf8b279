pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliArgs;

pub use crate::adapters::{bigtime::BigTimeClient, storage::LocalStorage};
pub use crate::config::AppConfig;
pub use crate::core::{engine::SynthesisEngine, scheduler::SubmissionScheduler};
pub use crate::utils::error::{Result, TimefillError};
