//! Default configuration values

pub struct AdminDefaults;

impl AdminDefaults {
    pub const HOST: &'static str = "127.0.0.1";
    pub const PORT: u16 = 3000;
    pub const API_PREFIX: &'static str = "/api";
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const LOG_LEVEL: &'static str = "info";
    pub const HEALTH_CHECK_PATH: &'static str = "/health";
    pub const LOG_LEVELS: [&'static str; 5] = ["error", "warn", "info", "debug", "trace"];
}
