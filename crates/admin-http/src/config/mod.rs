pub mod admin_config;
pub mod defaults;
pub mod environment;
pub mod sources;
pub mod validation;

pub use admin_config::*;
pub use defaults::*;
pub use environment::*;
pub use sources::*;
pub use validation::*;
