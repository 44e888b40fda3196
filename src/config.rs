use std::path::PathBuf;
use std::time::Duration;

/// Safe-mode, single-line jokes only.
pub const SAFE_API_URL: &str = "https://v2.jokeapi.dev/joke/Any?safe-mode&type=single";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_LOG_PATH: &str = "logs/session_log.csv";
pub const CHAOS_DELAY: Duration = Duration::from_millis(2200);
/// Chaos probability used when the D key switches chaos on.
pub const CHAOS_TOGGLE_ON: f64 = 0.2;

/// Settings shared by both shells. Defaults match the shipped game; the desktop
/// binary overrides them from CLI flags / environment.
#[derive(Clone, Debug)]
pub struct AdventureConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub log_path: PathBuf,
    pub chaos_delay: Duration,
}

impl Default for AdventureConfig {
    fn default() -> Self {
        Self {
            endpoint: SAFE_API_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            chaos_delay: CHAOS_DELAY,
        }
    }
}

impl AdventureConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Non-finite or negative values fall back to the default timeout.
    pub fn with_timeout_secs(mut self, secs: f64) -> Self {
        self.timeout = Duration::try_from_secs_f64(secs).unwrap_or(DEFAULT_TIMEOUT);
        self
    }
}
