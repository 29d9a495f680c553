// Library for tests to access modules

pub mod config;
pub mod error;
pub mod format;
pub mod history_repo;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod stats;
pub mod worker;

pub use error::PipelineError;

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");
