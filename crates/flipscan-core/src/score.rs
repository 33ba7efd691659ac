use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::Listing;
use crate::CoreError;

/// Resale recommendation for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Review,
    Avoid,
}

impl Recommendation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Review => "REVIEW",
            Recommendation::Avoid => "AVOID",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recommendation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Recommendation::Buy),
            "REVIEW" => Ok(Recommendation::Review),
            "AVOID" => Ok(Recommendation::Avoid),
            _ => Err(CoreError::InvalidRecommendation(s.to_string())),
        }
    }
}

/// Outcome of scoring one listing against a reference resale price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub recommendation: Recommendation,
    /// Generated analysis, or templated text when `using_fallback` is set.
    pub analysis_text: String,
    /// Reference price minus buy price minus fees. Negative for a loss.
    pub profit: f64,
    /// `profit / price * 100`, or `0.0` for a zero-priced listing.
    pub roi_percent: f64,
    pub observed_at: DateTime<Utc>,
    /// `true` when the text-generation service was unavailable or unusable
    /// and the ROI thresholds decided the recommendation.
    pub using_fallback: bool,
}

/// A listing paired with its score, as returned from batch scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredListing {
    pub listing: Listing,
    pub reference_price: f64,
    #[serde(flatten)]
    pub score: ScoreResult,
}
