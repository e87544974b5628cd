pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

#[cfg(feature = "lambda")]
pub use config::lambda::{LambdaConfig, S3Storage};

pub use config::TrackerConfig;
pub use core::{engine::TrackerEngine, pipeline::TrackerPipeline};
pub use utils::error::{Result, TrackerError};
