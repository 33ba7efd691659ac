use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Connection settings for the text-generation endpoint.
///
/// Passed explicitly to every component that talks to the service; nothing in
/// the workspace reads these values from a global.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerativeConfig {
    /// Base URL without the `/api/generate` suffix, e.g. `http://localhost:11434`.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

/// Tuning for cross-source counterpart matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterpartConfig {
    /// Minimum blended score a counterpart must exceed.
    pub min_score: f64,
    /// Lowest accepted `candidate_price / target_price`.
    pub min_price_ratio: f64,
    /// Highest accepted `candidate_price / target_price`.
    pub max_price_ratio: f64,
}

impl Default for CounterpartConfig {
    fn default() -> Self {
        Self {
            min_score: 0.2,
            min_price_ratio: 0.4,
            max_price_ratio: 3.0,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// `None` disables persistence entirely.
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub generative: GenerativeConfig,
    pub match_threshold: f64,
    pub counterpart: CounterpartConfig,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl AppConfig {
    /// Returns the database URL or a `MissingEnvVar` error for commands that
    /// cannot run without storage.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `DATABASE_URL` was not set.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("generative", &self.generative)
            .field("match_threshold", &self.match_threshold)
            .field("counterpart", &self.counterpart)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
