//! `search`, `score`, and `history` command handlers.

use std::collections::HashMap;
use std::path::Path;

use flipscan_core::{AppConfig, CounterpartConfig, Listing};
use flipscan_engine::{
    reference_prices_from_counterparts, ArbitrageScorer, GenerativeClient, QueryExpander,
    SearchOrchestrator,
};

use crate::input::{filter_by_source, load_listings, load_reference_prices};

/// Runs the two-stage search over one source's listings and prints the
/// matches as JSON.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, or the
/// text-generation client cannot be built. Expansion and persistence failures
/// are logged and absorbed.
pub(crate) async fn run_search(
    config: &AppConfig,
    pool: Option<&sqlx::PgPool>,
    source: &str,
    query: &str,
    input: Option<&Path>,
    no_expand: bool,
) -> anyhow::Result<()> {
    let listings = filter_by_source(load_listings(input)?, source);
    tracing::debug!(source, count = listings.len(), "loaded listings for source");

    let client = GenerativeClient::new(&config.generative)?;
    let orchestrator =
        SearchOrchestrator::with_threshold(QueryExpander::new(client), config.match_threshold);

    let outcome = orchestrator
        .search_detailed(&listings, query, !no_expand)
        .await;

    println!("{}", serde_json::to_string_pretty(&outcome.listings)?);

    if let Some(pool) = pool {
        flipscan_db::record_listings(pool, &listings).await;
        flipscan_db::record_search(
            pool,
            query,
            Some(source),
            outcome.listings.len(),
            outcome.used_expansion(),
        )
        .await;
    }

    Ok(())
}

/// Scores every listing in `input` and prints the results as JSON.
///
/// Reference prices come from the best counterpart in `counterparts` when
/// given; entries in the `reference_prices` file take precedence over those.
///
/// # Errors
///
/// Returns an error if any input file cannot be read or parsed, or the
/// text-generation client cannot be built.
pub(crate) async fn run_score(
    config: &AppConfig,
    pool: Option<&sqlx::PgPool>,
    input: &Path,
    reference_prices: Option<&Path>,
    counterparts: Option<&Path>,
) -> anyhow::Result<()> {
    let listings = load_listings(Some(input))?;

    let counterparts = counterparts.map(|path| load_listings(Some(path))).transpose()?;
    let prices = merge_reference_prices(
        &listings,
        counterparts.as_deref(),
        load_reference_prices(reference_prices)?,
        &config.counterpart,
    );

    let scorer = ArbitrageScorer::new(GenerativeClient::new(&config.generative)?);
    let scored = scorer.batch_score(&listings, &prices).await;

    let fallback_count = scored.iter().filter(|s| s.score.using_fallback).count();
    if fallback_count > 0 {
        tracing::warn!(
            fallback_count,
            total = scored.len(),
            "text generation unavailable for some listings; used ROI thresholds"
        );
    }

    println!("{}", serde_json::to_string_pretty(&scored)?);

    if let Some(pool) = pool {
        flipscan_db::record_listings(pool, &listings).await;
        for item in &scored {
            flipscan_db::record_score(pool, &item.listing.identifier, &item.score).await;
        }
    }

    Ok(())
}

/// Combines counterpart-derived prices with explicit ones; explicit entries win.
pub(crate) fn merge_reference_prices(
    listings: &[Listing],
    counterparts: Option<&[Listing]>,
    explicit: HashMap<String, f64>,
    config: &CounterpartConfig,
) -> HashMap<String, f64> {
    let mut prices = match counterparts {
        Some(counterparts) => {
            let derived = reference_prices_from_counterparts(listings, counterparts, config);
            tracing::info!(
                matched = derived.len(),
                total = listings.len(),
                "derived reference prices from counterparts"
            );
            derived
        }
        None => HashMap::new(),
    };
    prices.extend(explicit);
    prices
}

/// Prints the stored snapshot and recent score history for one listing.
///
/// # Errors
///
/// Returns an error if the queries fail or a stored row cannot be decoded.
pub(crate) async fn run_history(
    pool: &sqlx::PgPool,
    identifier: &str,
    limit: u32,
) -> anyhow::Result<()> {
    let listing = match flipscan_db::get_listing(pool, identifier).await? {
        Some(row) => Some(row.into_listing()?),
        None => None,
    };

    let scores = flipscan_db::list_score_history(pool, identifier, limit)
        .await?
        .iter()
        .map(flipscan_db::ScoreHistoryRow::to_score_result)
        .collect::<Result<Vec<_>, _>>()?;

    if listing.is_none() && scores.is_empty() {
        anyhow::bail!("no stored listing or scores for '{identifier}'");
    }

    let report = serde_json::json!({
        "listing": listing,
        "scores": scores,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
