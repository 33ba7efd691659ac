//! Best-effort persistence.
//!
//! Search and scoring never fail because storage is down. These wrappers run
//! the fallible writes, log every discarded failure at `warn`, and return `()`.

use sqlx::PgPool;

use flipscan_core::{Listing, ScoreResult};

use crate::{insert_score_history, insert_search_history, upsert_listing};

/// Upserts each listing, skipping the ones that fail.
pub async fn record_listings(pool: &PgPool, listings: &[Listing]) {
    let mut stored = 0_usize;
    for listing in listings {
        match upsert_listing(pool, listing).await {
            Ok(_) => stored += 1,
            Err(e) => tracing::warn!(
                identifier = %listing.identifier,
                error = %e,
                "failed to persist listing"
            ),
        }
    }
    tracing::info!(stored, total = listings.len(), "recorded listings");
}

/// Appends one score to `score_history`.
pub async fn record_score(pool: &PgPool, identifier: &str, result: &ScoreResult) {
    match insert_score_history(pool, identifier, result).await {
        Ok(id) => tracing::info!(
            id,
            identifier,
            recommendation = %result.recommendation,
            "recorded score"
        ),
        Err(e) => tracing::warn!(identifier, error = %e, "failed to persist score"),
    }
}

/// Appends one search invocation to `search_history`.
pub async fn record_search(
    pool: &PgPool,
    query: &str,
    source_name: Option<&str>,
    results_count: usize,
    used_expansion: bool,
) {
    match insert_search_history(pool, query, source_name, results_count, used_expansion).await {
        Ok(id) => tracing::info!(id, query, results_count, "recorded search"),
        Err(e) => tracing::warn!(query, error = %e, "failed to persist search"),
    }
}
