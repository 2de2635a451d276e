//! # admin-http: HTTP boundary for the admin relation engine
//!
//! Serves the relation actions of `admin-relations` over axum. Resources and
//! their relation descriptors come from a YAML catalog; configuration comes
//! from the environment.

pub mod config;
pub mod errors;
pub mod logging;
pub mod routing;
pub mod server;
pub mod state;

pub use config::{AdminConfig, AdminDefaults, AppConfigTrait, ConfigError, ConfigSource, Environment};
pub use errors::{HttpError, HttpResult};
pub use logging::{init_logging, log_shutdown_info, log_startup_info, LoggingConfig};
pub use routing::admin_router;
pub use server::AdminServer;
pub use state::{seed_repositories, AdminState};
