//! Shared domain types and configuration for the flipscan workspace.

pub mod app_config;
pub mod config;
pub mod listing;
pub mod score;

use thiserror::Error;

pub use app_config::{AppConfig, CounterpartConfig, Environment, GenerativeConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use listing::{
    listing_identifier, normalize_listing, parse_price, Listing, RawIdentifier, RawListing,
    RawPrice,
};
pub use score::{Recommendation, ScoreResult, ScoredListing};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid recommendation: {0}")]
    InvalidRecommendation(String),
}
