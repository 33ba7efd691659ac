//! Cross-source counterpart matching.
//!
//! Finds the listing on another source that sells the same product as a
//! target listing, so its price can stand in as the resale reference. Titles
//! are compared by token and bigram Jaccard overlap. Candidates priced outside
//! the configured ratio window are skipped, and product-type mismatches (a
//! game against a console bundle, an accessory against a console) are
//! penalized.

use std::collections::{HashMap, HashSet};

use flipscan_core::{CounterpartConfig, Listing};

/// Price score used when either side has no usable price.
const NEUTRAL_PRICE_SCORE: f64 = 0.5;

const TEXT_WEIGHT: f64 = 0.7;
const PRICE_WEIGHT: f64 = 0.3;
const TOKEN_WEIGHT: f64 = 0.7;
const BIGRAM_WEIGHT: f64 = 0.3;

const STOPWORDS: &[&str] = &[
    "the", "and", "or", "for", "with", "a", "an", "of", "to", "in", "on", "at", "by", "from",
    "edition", "standard", "deluxe", "ultimate", "bundle", "new", "sale",
];

const PLATFORM_KEYWORDS: &[&str] = &[
    "ps5",
    "playstation 5",
    "playstation5",
    "ps4",
    "playstation 4",
    "xbox",
    "xbox series",
    "nintendo switch",
    "switch",
];

const CONSOLE_KEYWORDS: &[&str] = &["console", "system", "digital edition", "disc edition"];

const ACCESSORY_KEYWORDS: &[&str] = &[
    "controller",
    "headset",
    "charging",
    "dock",
    "stand",
    "case",
    "cover",
    "skin",
    "cable",
    "adapter",
    "remote",
    "camera",
];

const SUBSCRIPTION_KEYWORDS: &[&str] = &[
    "subscription",
    "membership",
    "game pass",
    "playstation plus",
    "ps plus",
];

const GIFT_CARD_KEYWORDS: &[&str] = &["gift card", "giftcard", "digital code", "download code"];

/// The best counterpart found for a target listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterpartMatch<'a> {
    pub listing: &'a Listing,
    /// Blended text and price score after the product-type factor.
    pub score: f64,
}

/// Picks the candidate most likely to be the same product as `target`.
///
/// Each candidate scores `(0.7 * text + 0.3 * price) * type_factor`. When the
/// target has a positive price, candidates whose price ratio falls outside
/// `[min_price_ratio, max_price_ratio]` are skipped. Returns the first
/// candidate with the highest score strictly above `config.min_score`.
#[must_use]
pub fn best_counterpart<'a>(
    candidates: &'a [Listing],
    target: &Listing,
    config: &CounterpartConfig,
) -> Option<CounterpartMatch<'a>> {
    let target_price = (target.price > 0.0).then_some(target.price);
    let mut best: Option<CounterpartMatch<'a>> = None;
    let mut best_score = config.min_score;

    for candidate in candidates {
        let Some(price) = price_score(target_price, candidate.price, config) else {
            continue;
        };
        let text = text_similarity(&candidate.title, &target.title);
        let score = (text * TEXT_WEIGHT + price * PRICE_WEIGHT)
            * type_match_factor(&target.title, &candidate.title);

        if score > best_score {
            best_score = score;
            best = Some(CounterpartMatch {
                listing: candidate,
                score,
            });
        }
    }

    best
}

/// Maps each listing's identifier to the price of its best counterpart.
///
/// Listings without a counterpart, or whose counterpart has no positive price,
/// are left out.
#[must_use]
pub fn reference_prices_from_counterparts(
    listings: &[Listing],
    counterparts: &[Listing],
    config: &CounterpartConfig,
) -> HashMap<String, f64> {
    listings
        .iter()
        .filter_map(|listing| {
            let found = best_counterpart(counterparts, listing, config)?;
            if found.listing.price <= 0.0 {
                return None;
            }
            tracing::debug!(
                identifier = %listing.identifier,
                counterpart = %found.listing.identifier,
                score = found.score,
                "matched counterpart listing"
            );
            Some((listing.identifier.clone(), found.listing.price))
        })
        .collect()
}

/// Token Jaccard (weight 0.7) plus adjacent-token bigram Jaccard (weight 0.3).
#[must_use]
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = tokens(a);
    let tokens_b = tokens(b);

    let bigrams_a = bigrams(&tokens_a);
    let bigrams_b = bigrams(&tokens_b);

    jaccard(&tokens_a, &tokens_b) * TOKEN_WEIGHT + jaccard(&bigrams_a, &bigrams_b) * BIGRAM_WEIGHT
}

/// Multiplier that penalizes candidates of a different product type.
#[must_use]
pub fn type_match_factor(target_title: &str, candidate_title: &str) -> f64 {
    let target = TitleKind::classify(target_title);
    let candidate = TitleKind::classify(candidate_title);

    let mut factor = 1.0;
    if target.gift_card && !candidate.gift_card {
        factor *= 0.2;
    }
    if target.subscription && !candidate.subscription {
        factor *= 0.2;
    }

    if target.game && (candidate.console || candidate.bundle) {
        factor *= 0.3;
    }
    if target.console && candidate.game {
        factor *= 0.3;
    }
    if target.accessory && (candidate.console || candidate.bundle) {
        factor *= 0.3;
    }
    if target.accessory && candidate.game {
        factor *= 0.6;
    }

    if !target.bundle && candidate.bundle {
        factor *= 0.5;
    }
    if target.bundle && !candidate.bundle {
        factor *= 0.7;
    }

    let same_type = (target.console && candidate.console)
        || (target.game && candidate.game)
        || (target.accessory && candidate.accessory)
        || (target.gift_card && candidate.gift_card)
        || (target.subscription && candidate.subscription);
    if same_type {
        factor *= 1.1;
    }

    factor
}

/// `None` means the candidate is outside the price window and must be skipped.
fn price_score(target: Option<f64>, candidate: f64, config: &CounterpartConfig) -> Option<f64> {
    let Some(target) = target else {
        return Some(NEUTRAL_PRICE_SCORE);
    };
    if candidate <= 0.0 {
        return Some(NEUTRAL_PRICE_SCORE);
    }

    let ratio = candidate / target;
    if !ratio.is_finite() {
        return Some(0.0);
    }
    if ratio < config.min_price_ratio || ratio > config.max_price_ratio {
        return None;
    }

    let max_log = config.max_price_ratio.ln().abs();
    if max_log < f64::EPSILON {
        return Some(1.0);
    }
    Some((1.0 - ratio.ln().abs() / max_log).max(0.0))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
struct TitleKind {
    bundle: bool,
    console: bool,
    accessory: bool,
    gift_card: bool,
    subscription: bool,
    game: bool,
}

impl TitleKind {
    fn classify(title: &str) -> Self {
        let normalized = normalize_text(title);
        let has = |keywords: &[&str]| keywords.iter().any(|k| normalized.contains(k));

        let bundle = normalized.contains("bundle");
        let console = has(CONSOLE_KEYWORDS) || (bundle && has(PLATFORM_KEYWORDS));
        let accessory = has(ACCESSORY_KEYWORDS);
        let gift_card = has(GIFT_CARD_KEYWORDS);
        let subscription = has(SUBSCRIPTION_KEYWORDS);
        let game = !console
            && !accessory
            && !gift_card
            && !subscription
            && (normalized.contains("game")
                || normalized.contains("edition")
                || has(PLATFORM_KEYWORDS));

        Self {
            bundle,
            console,
            accessory,
            gift_card,
            subscription,
            game,
        }
    }
}

/// Lowercases, maps everything except ASCII letters and digits to a space,
/// and collapses runs of spaces.
fn normalize_text(text: &str) -> String {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Distinct non-stopword tokens in first-seen order.
fn tokens(text: &str) -> Vec<String> {
    let normalized = normalize_text(text);
    let mut seen = HashSet::new();
    normalized
        .split(' ')
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

fn bigrams(tokens: &[String]) -> Vec<String> {
    tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect()
}

/// Jaccard index of two lists of distinct items.
#[allow(clippy::cast_precision_loss)]
fn jaccard(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();
    let intersection = a.iter().filter(|item| set_b.contains(item.as_str())).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn listing(id: &str, title: &str, price: f64) -> Listing {
        Listing {
            identifier: id.to_string(),
            title: title.to_string(),
            source_name: "amazon".to_string(),
            price,
            original_price: price,
            url: String::new(),
            image_url: String::new(),
            stock_status: "In Stock".to_string(),
            observed_at: Utc::now(),
        }
    }

    fn config() -> CounterpartConfig {
        CounterpartConfig::default()
    }

    #[test]
    fn identical_titles_score_one() {
        let score = text_similarity("Wireless Headphones", "wireless headphones!");
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn stopwords_and_unrelated_titles_score_zero() {
        assert!(text_similarity("The Deluxe Edition", "Desk Lamp").abs() < f64::EPSILON);
        assert!(text_similarity("", "Desk Lamp").abs() < f64::EPSILON);
    }

    #[test]
    fn game_target_prefers_game_over_pricier_console_bundle() {
        let candidates = vec![
            listing(
                "BUNDLE123",
                "PlayStation 5 Console - Marvel's Spider-Man 2 Bundle",
                499.99,
            ),
            listing("GAME123", "Marvel's Spider-Man 2 - PlayStation 5", 69.99),
        ];
        let target = listing("W1", "Marvel's Spider-Man 2 - PlayStation 5", 69.99);

        let best = best_counterpart(&candidates, &target, &config()).unwrap();

        assert_eq!(best.listing.identifier, "GAME123");
    }

    #[test]
    fn unpriced_target_falls_back_to_text_and_type() {
        let candidates = vec![
            listing("CTRL123", "DualSense Wireless Controller for PlayStation 5", 69.99),
            listing("CONSOLE123", "PlayStation 5 Console", 499.99),
        ];
        let target = listing("T1", "DualSense Wireless Controller - PS5", 0.0);

        let best = best_counterpart(&candidates, &target, &config()).unwrap();

        assert_eq!(best.listing.identifier, "CTRL123");
    }

    #[test]
    fn candidate_outside_price_window_is_rejected() {
        let target = listing("T1", "Desk Lamp", 20.0);

        // 100 / 20 = 5x, above the 3x ceiling.
        let expensive = vec![listing("A1", "Desk Lamp", 100.0)];
        assert!(best_counterpart(&expensive, &target, &config()).is_none());

        // 5 / 20 = 0.25x, below the 0.4x floor.
        let cheap = vec![listing("A2", "Desk Lamp", 5.0)];
        assert!(best_counterpart(&cheap, &target, &config()).is_none());

        let in_window = vec![listing("A3", "Desk Lamp", 25.0)];
        let best = best_counterpart(&in_window, &target, &config()).unwrap();
        assert_eq!(best.listing.identifier, "A3");
    }

    #[test]
    fn narrower_window_rejects_more() {
        let target = listing("T1", "Desk Lamp", 20.0);
        let candidates = vec![listing("A1", "Desk Lamp", 35.0)];
        let tight = CounterpartConfig {
            max_price_ratio: 1.5,
            ..config()
        };

        assert!(best_counterpart(&candidates, &target, &config()).is_some());
        assert!(best_counterpart(&candidates, &target, &tight).is_none());
    }

    #[test]
    fn min_score_must_be_exceeded() {
        let target = listing("T1", "Desk Lamp", 0.0);
        let candidates = vec![listing("A1", "Bluetooth Speaker", 40.0)];

        // No shared tokens: 0.7 * 0 + 0.3 * 0.5 = 0.15.
        assert!(best_counterpart(&candidates, &target, &config()).is_none());
        let lenient = CounterpartConfig {
            min_score: 0.1,
            ..config()
        };
        let best = best_counterpart(&candidates, &target, &lenient).unwrap();
        assert!((best.score - 0.15).abs() < 1e-9);
    }

    #[test]
    fn gift_card_target_penalizes_non_gift_card() {
        let factor = type_match_factor("Xbox Gift Card", "Xbox Series X Console");
        assert!((factor - 0.2).abs() < 1e-9);
    }

    #[test]
    fn console_target_penalizes_game() {
        let factor = type_match_factor("PS5 Console", "Spider-Man 2 PS5");
        assert!((factor - 0.3).abs() < 1e-9);
    }

    #[test]
    fn accessory_target_penalizes_game() {
        let factor = type_match_factor("DualSense Controller", "Spider-Man 2 PS5");
        assert!((factor - 0.6).abs() < 1e-9);
    }

    #[test]
    fn bundle_mismatch_is_penalized_both_ways() {
        // Plain target against a bundle, then bundle target against a plain item.
        assert!((type_match_factor("Desk Lamp", "Desk Lamp Bundle") - 0.5).abs() < 1e-9);
        assert!((type_match_factor("Desk Lamp Bundle", "Desk Lamp") - 0.7).abs() < 1e-9);
    }

    #[test]
    fn same_type_gets_a_boost() {
        let factor = type_match_factor("Xbox Wireless Controller", "Xbox Controller Black");
        assert!((factor - 1.1).abs() < 1e-9);
    }

    #[test]
    fn reference_prices_use_matched_counterpart_price() {
        let listings = vec![
            listing("W1", "Wireless Headphones", 24.99),
            // Both counterparts are more than 3x its price.
            listing("W2", "Garden Hose", 5.0),
        ];
        let counterparts = vec![
            listing("AMZ1", "Wireless Headphones Black", 59.99),
            listing("AMZ2", "Desk Lamp", 20.0),
        ];

        let prices = reference_prices_from_counterparts(&listings, &counterparts, &config());

        assert_eq!(prices.len(), 1);
        assert!((prices["W1"] - 59.99).abs() < 1e-9);
    }
}
