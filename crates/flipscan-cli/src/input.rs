//! Reading listing and reference-price documents from files or stdin.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use flipscan_core::{normalize_listing, Listing, RawListing};

/// Reads a document from `path`, or from stdin when `path` is `None`.
fn read_document(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read listings from stdin")?;
            Ok(buf)
        }
    }
}

/// Parses a JSON array of raw listings and normalizes each one.
pub(crate) fn parse_listings(document: &str) -> anyhow::Result<Vec<Listing>> {
    let raw: Vec<RawListing> =
        serde_json::from_str(document).context("listings must be a JSON array of objects")?;
    Ok(raw.into_iter().map(normalize_listing).collect())
}

pub(crate) fn load_listings(path: Option<&Path>) -> anyhow::Result<Vec<Listing>> {
    parse_listings(&read_document(path)?)
}

/// Loads an `identifier -> reference price` JSON object.
///
/// Without a path the map is empty and every listing falls back to the
/// placeholder markup.
pub(crate) fn load_reference_prices(path: Option<&Path>) -> anyhow::Result<HashMap<String, f64>> {
    let Some(path) = path else {
        return Ok(HashMap::new());
    };
    let document = read_document(Some(path))?;
    serde_json::from_str(&document)
        .with_context(|| format!("{} must map identifiers to prices", path.display()))
}

/// Keeps listings whose source matches `source` case-insensitively.
pub(crate) fn filter_by_source(listings: Vec<Listing>, source: &str) -> Vec<Listing> {
    let source = source.trim();
    listings
        .into_iter()
        .filter(|l| l.source_name.eq_ignore_ascii_case(source))
        .collect()
}
