//! Two-stage listing search: direct match first, query expansion only when
//! the direct match finds nothing.

use std::collections::HashSet;

use flipscan_core::Listing;

use crate::expander::{ExpansionResult, QueryExpander};
use crate::matcher::rank_and_filter;

/// Minimum similarity a listing needs to be returned by either stage.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;

/// Result of a search along with how it was produced.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub listings: Vec<Listing>,
    /// Set only when the direct match was empty and expansion ran.
    pub expansion: Option<ExpansionResult>,
}

impl SearchOutcome {
    #[must_use]
    pub fn used_expansion(&self) -> bool {
        self.expansion.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SearchOrchestrator {
    expander: QueryExpander,
    threshold: f64,
}

impl SearchOrchestrator {
    #[must_use]
    pub fn new(expander: QueryExpander) -> Self {
        Self::with_threshold(expander, DEFAULT_MATCH_THRESHOLD)
    }

    #[must_use]
    pub fn with_threshold(expander: QueryExpander, threshold: f64) -> Self {
        Self {
            expander,
            threshold,
        }
    }

    /// Returns listings matching `query`, best first.
    ///
    /// See [`SearchOrchestrator::search_detailed`].
    pub async fn search(
        &self,
        listings: &[Listing],
        query: &str,
        use_expansion: bool,
    ) -> Vec<Listing> {
        self.search_detailed(listings, query, use_expansion)
            .await
            .listings
    }

    /// Runs the direct match, falling back to expanded terms when it is empty.
    ///
    /// 1. Rank `listings` against `query`. Any hit is returned as-is and the
    ///    expander is not called, even when `use_expansion` is set.
    /// 2. Otherwise, if `use_expansion` is set, rank against every expanded
    ///    term in order and concatenate the per-term results. Results are not
    ///    re-sorted across terms. Later duplicates of an identifier are
    ///    dropped.
    pub async fn search_detailed(
        &self,
        listings: &[Listing],
        query: &str,
        use_expansion: bool,
    ) -> SearchOutcome {
        let direct = collect_ranked(listings, query, self.threshold);
        if !direct.is_empty() || !use_expansion {
            tracing::debug!(query, results = direct.len(), "direct match complete");
            return SearchOutcome {
                listings: direct,
                expansion: None,
            };
        }

        tracing::debug!(query, "direct match empty; expanding query");
        let expansion = self.expander.expand(query).await;

        let mut combined = Vec::new();
        for term in expansion.terms() {
            combined.extend(collect_ranked(listings, term, self.threshold));
        }
        let listings = dedup_by_identifier(combined);

        tracing::debug!(
            query,
            terms = expansion.len(),
            results = listings.len(),
            "expanded match complete"
        );

        SearchOutcome {
            listings,
            expansion: Some(expansion),
        }
    }
}

fn collect_ranked(listings: &[Listing], query: &str, threshold: f64) -> Vec<Listing> {
    rank_and_filter(listings, query, threshold)
        .into_iter()
        .map(|m| m.listing.clone())
        .collect()
}

/// Keeps the first listing seen for each identifier, preserving order.
fn dedup_by_identifier(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|l| seen.insert(l.identifier.clone()))
        .collect()
}
