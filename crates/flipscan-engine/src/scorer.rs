//! Resale profitability scoring.
//!
//! Profit and ROI are computed locally. The recommendation comes from the
//! text-generation service when it answers, and from fixed ROI thresholds
//! when it does not.

use std::collections::HashMap;

use chrono::Utc;

use flipscan_core::{Listing, Recommendation, ScoreResult, ScoredListing};

use crate::error::EngineError;
use crate::generative::GenerativeClient;

/// Flat per-sale estimate for marketplace fees plus shipping.
pub const FEE_ESTIMATE: f64 = 15.0;

/// Markup applied to the buy price when no reference price is known.
pub const PLACEHOLDER_MARKUP: f64 = 1.5;

/// ROI (percent) at or above which the fallback recommends buying.
pub const FALLBACK_BUY_ROI: f64 = 40.0;

/// ROI (percent) at or above which the fallback asks for review.
pub const FALLBACK_REVIEW_ROI: f64 = 25.0;

/// Returns `(profit, roi_percent)` for buying at `price` and reselling at
/// `reference_price`. ROI is `0.0` for a zero price.
#[must_use]
pub fn profit_and_roi(price: f64, reference_price: f64) -> (f64, f64) {
    let profit = reference_price - price - FEE_ESTIMATE;
    let roi = if price > 0.0 {
        profit / price * 100.0
    } else {
        0.0
    };
    (profit, roi)
}

/// Maps generated text to a recommendation by token search.
///
/// `BUY` is checked before `AVOID`, so text containing both resolves to
/// [`Recommendation::Buy`]. Text with neither is [`Recommendation::Review`].
#[must_use]
pub fn classify_response(text: &str) -> Recommendation {
    let upper = text.to_uppercase();
    if upper.contains("BUY") {
        Recommendation::Buy
    } else if upper.contains("AVOID") {
        Recommendation::Avoid
    } else {
        Recommendation::Review
    }
}

/// Threshold-based recommendation and templated analysis for `roi`.
#[must_use]
pub fn fallback_recommendation(roi: f64) -> (Recommendation, String) {
    if roi >= FALLBACK_BUY_ROI {
        (
            Recommendation::Buy,
            format!("High profit opportunity with {roi:.1}% ROI. Strong demand expected."),
        )
    } else if roi >= FALLBACK_REVIEW_ROI {
        (
            Recommendation::Review,
            format!("Moderate profit with {roi:.1}% ROI. Check competition first."),
        )
    } else {
        (
            Recommendation::Avoid,
            format!("Low profit margin ({roi:.1}% ROI). Not recommended."),
        )
    }
}

/// Builds the analysis prompt for one listing.
#[must_use]
pub fn analysis_prompt(listing: &Listing, reference_price: f64, profit: f64, roi: f64) -> String {
    let title = if listing.title.is_empty() {
        "Unknown"
    } else {
        &listing.title
    };
    let source = if listing.source_name.is_empty() {
        "UNKNOWN".to_string()
    } else {
        listing.source_name.to_uppercase()
    };

    format!(
        "Analyze this retail arbitrage opportunity:\n\n\
         Product: {title}\n\
         Retailer: {source}\n\
         Buy Price: ${price:.2}\n\
         Resale Price: ${reference_price:.2}\n\
         Est. Profit: ${profit:.2}\n\
         ROI: {roi:.1}%\n\n\
         Based on this data, provide a brief analysis (2-3 sentences) \
         and recommend BUY, AVOID, or REVIEW.\n\
         Format: \"Recommendation: [BUY/AVOID/REVIEW]. Analysis: ...\"",
        price = listing.price,
    )
}

/// Scores listings for resale against a reference price.
#[derive(Debug, Clone)]
pub struct ArbitrageScorer {
    client: GenerativeClient,
}

impl ArbitrageScorer {
    #[must_use]
    pub fn new(client: GenerativeClient) -> Self {
        Self { client }
    }

    /// Scores one listing.
    ///
    /// Never fails: when the service cannot be reached or its answer is
    /// unusable, the ROI thresholds decide and `using_fallback` is set.
    pub async fn score(&self, listing: &Listing, reference_price: f64) -> ScoreResult {
        let (profit, roi) = profit_and_roi(listing.price, reference_price);

        match self.try_analyze(listing, reference_price, profit, roi).await {
            Ok(text) => ScoreResult {
                recommendation: classify_response(&text),
                analysis_text: text.trim().to_string(),
                profit,
                roi_percent: roi,
                observed_at: Utc::now(),
                using_fallback: false,
            },
            Err(e) => {
                tracing::warn!(
                    identifier = %listing.identifier,
                    error = %e,
                    "generative analysis unavailable; using ROI thresholds"
                );
                let (recommendation, analysis_text) = fallback_recommendation(roi);
                ScoreResult {
                    recommendation,
                    analysis_text,
                    profit,
                    roi_percent: roi,
                    observed_at: Utc::now(),
                    using_fallback: true,
                }
            }
        }
    }

    /// Scores each listing in order.
    ///
    /// The reference price is looked up by identifier; listings without one
    /// use `price * 1.5` as a placeholder.
    pub async fn batch_score(
        &self,
        listings: &[Listing],
        reference_prices: &HashMap<String, f64>,
    ) -> Vec<ScoredListing> {
        let mut scored = Vec::with_capacity(listings.len());
        for listing in listings {
            let reference_price = resolve_reference_price(listing, reference_prices);
            let score = self.score(listing, reference_price).await;
            scored.push(ScoredListing {
                listing: listing.clone(),
                reference_price,
                score,
            });
        }
        scored
    }

    async fn try_analyze(
        &self,
        listing: &Listing,
        reference_price: f64,
        profit: f64,
        roi: f64,
    ) -> Result<String, EngineError> {
        let prompt = analysis_prompt(listing, reference_price, profit, roi);
        let text = self.client.generate(&prompt).await?;
        if text.trim().is_empty() {
            return Err(EngineError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Reference price for `listing`: the mapped value, or the placeholder markup.
#[must_use]
pub fn resolve_reference_price(listing: &Listing, reference_prices: &HashMap<String, f64>) -> f64 {
    reference_prices
        .get(&listing.identifier)
        .copied()
        .unwrap_or(listing.price * PLACEHOLDER_MARKUP)
}
