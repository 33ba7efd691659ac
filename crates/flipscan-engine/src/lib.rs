//! Listing search and resale scoring for flipscan.
//!
//! Matches listings to a query by block-matching similarity, broadens
//! unproductive queries through a text-generation service, and scores resale
//! profitability with a threshold fallback when that service is unavailable.
//! Reference resale prices can be derived from counterpart listings on
//! another source.
//! Every public operation returns a usable, possibly degraded, result.

pub mod counterpart;
pub mod error;
pub mod expander;
pub mod generative;
pub mod matcher;
pub mod scorer;
pub mod search;

pub use counterpart::{best_counterpart, reference_prices_from_counterparts, CounterpartMatch};
pub use error::EngineError;
pub use expander::{ExpansionResult, QueryExpander};
pub use generative::GenerativeClient;
pub use matcher::{match_listing, rank_and_filter, similarity, MatchResult};
pub use scorer::{ArbitrageScorer, FEE_ESTIMATE};
pub use search::{SearchOrchestrator, SearchOutcome, DEFAULT_MATCH_THRESHOLD};
