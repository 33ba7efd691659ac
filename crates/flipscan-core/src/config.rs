use crate::app_config::{AppConfig, CounterpartConfig, Environment, GenerativeConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f32 = |var: &str, default: &str| -> Result<f32, ConfigError> {
        or_default(var, default)
            .parse::<f32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|s| !s.trim().is_empty());
    let env = parse_environment(&or_default("FLIPSCAN_ENV", "development"));
    let log_level = or_default("FLIPSCAN_LOG_LEVEL", "info");

    let defaults = GenerativeConfig::default();
    let generative = GenerativeConfig {
        base_url: or_default("FLIPSCAN_GENERATIVE_URL", &defaults.base_url)
            .trim_end_matches('/')
            .to_string(),
        model: or_default("FLIPSCAN_GENERATIVE_MODEL", &defaults.model),
        temperature: parse_f32("FLIPSCAN_GENERATIVE_TEMPERATURE", "0.7")?,
        timeout_secs: parse_u64("FLIPSCAN_GENERATIVE_TIMEOUT_SECS", "30")?,
    };

    let match_threshold = parse_f64("FLIPSCAN_MATCH_THRESHOLD", "0.5")?;
    if !(0.0..=1.0).contains(&match_threshold) {
        return Err(invalid(
            "FLIPSCAN_MATCH_THRESHOLD",
            format!("{match_threshold} is outside [0, 1]"),
        ));
    }

    let counterpart = CounterpartConfig {
        min_score: parse_f64("FLIPSCAN_COUNTERPART_MIN_SCORE", "0.2")?,
        min_price_ratio: parse_f64("FLIPSCAN_PRICE_MIN_RATIO", "0.4")?,
        max_price_ratio: parse_f64("FLIPSCAN_PRICE_MAX_RATIO", "3.0")?,
    };
    if counterpart.min_score.is_nan() || counterpart.min_score < 0.0 {
        return Err(invalid(
            "FLIPSCAN_COUNTERPART_MIN_SCORE",
            format!("{} must be non-negative", counterpart.min_score),
        ));
    }
    let window_ok = counterpart.min_price_ratio > 0.0
        && counterpart.max_price_ratio >= counterpart.min_price_ratio
        && counterpart.max_price_ratio.is_finite();
    if !window_ok {
        return Err(invalid(
            "FLIPSCAN_PRICE_MAX_RATIO",
            format!(
                "price ratio window [{}, {}] is empty or non-positive",
                counterpart.min_price_ratio, counterpart.max_price_ratio
            ),
        ));
    }

    let db_max_connections = parse_u32("FLIPSCAN_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("FLIPSCAN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("FLIPSCAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        generative,
        match_threshold,
        counterpart,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
