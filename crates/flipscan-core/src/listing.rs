//! Listing snapshots and normalization from loosely-shaped retriever output.
//!
//! Retrievers emit [`RawListing`] records whose fields may be missing, blank,
//! or carry prices as display strings (`"$1,299.99"`). [`normalize_listing`]
//! turns them into a [`Listing`] with every defaulting rule applied, so the
//! matching and scoring code never sees an absent field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stock status used when the retriever did not report one.
pub const UNKNOWN_STOCK: &str = "Unknown";

/// Number of digest bytes kept in a synthetic identifier (16 hex chars).
const IDENTIFIER_DIGEST_BYTES: usize = 8;

/// One observed product snapshot from a single source.
///
/// `identifier` is the storage and deduplication key: a later snapshot with
/// the same identifier replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Vendor identifier (e.g. an ASIN) or a stable content digest, see
    /// [`listing_identifier`].
    pub identifier: String,
    pub title: String,
    /// Source the listing was observed on, e.g. `"walmart"`.
    pub source_name: String,
    /// Current price; `0.0` when the source price could not be parsed.
    pub price: f64,
    /// Pre-sale price; equals `price` when the source did not report one.
    pub original_price: f64,
    pub url: String,
    pub image_url: String,
    pub stock_status: String,
    pub observed_at: DateTime<Utc>,
}

impl Listing {
    /// Returns `true` when the listing is discounted from its original price.
    #[must_use]
    pub fn is_clearance(&self) -> bool {
        self.original_price > self.price
    }
}

/// A price as a retriever reported it: either already numeric or display text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

/// A vendor identifier as a retriever reported it: text or a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawIdentifier {
    Text(String),
    Integer(i64),
}

impl RawIdentifier {
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            RawIdentifier::Text(text) => text,
            RawIdentifier::Integer(n) => n.to_string(),
        }
    }
}

impl From<&str> for RawIdentifier {
    fn from(value: &str) -> Self {
        RawIdentifier::Text(value.to_string())
    }
}

impl From<String> for RawIdentifier {
    fn from(value: String) -> Self {
        RawIdentifier::Text(value)
    }
}

/// Listing record as emitted by a retriever, before defaulting.
///
/// Field aliases accept the shapes produced by the per-source retrievers
/// (`asin`/`id`, `retailer`, `image`, `stock`, camelCase variants).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListing {
    #[serde(default, alias = "id", alias = "asin")]
    pub identifier: Option<RawIdentifier>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "retailer", alias = "sourceName")]
    pub source_name: Option<String>,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default, alias = "originalPrice")]
    pub original_price: Option<RawPrice>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "image", alias = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default, alias = "stock", alias = "stockStatus")]
    pub stock_status: Option<String>,
    #[serde(default, alias = "observedAt", alias = "timestamp")]
    pub observed_at: Option<DateTime<Utc>>,
}

/// Parses a retriever price into a non-negative finite number.
///
/// Text prices use only the first numeric token: the run of digits, `.` and
/// `,` starting at the first digit, with `,` separators dropped. Currency
/// symbols, leading labels, and anything after the token are ignored, so
/// `"2 for $5"` is `2.0` and `"$10 - $20"` is `10.0`. A `-` before the token
/// marks a negative price and yields `None`, as does text with no digits.
#[must_use]
pub fn parse_price(raw: &RawPrice) -> Option<f64> {
    match raw {
        RawPrice::Number(n) => (n.is_finite() && *n >= 0.0).then_some(*n),
        RawPrice::Text(text) => parse_price_text(text),
    }
}

fn parse_price_text(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let first_digit = bytes.iter().position(u8::is_ascii_digit)?;
    let start = if first_digit > 0 && bytes[first_digit - 1] == b'.' {
        first_digit - 1
    } else {
        first_digit
    };

    if text[..start].contains('-') {
        return None;
    }

    let token: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();

    token
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

/// Derives a stable identifier for a listing that has no vendor identifier.
///
/// The result is `"{SOURCE}_{digest}"` where `digest` is the first 16 hex
/// characters of SHA-256 over the normalized source name and title. Case,
/// punctuation, and whitespace differences do not change the identifier.
#[must_use]
pub fn listing_identifier(source_name: &str, title: &str) -> String {
    let source = normalize_text(source_name);
    let content = format!("{source}\n{}", normalize_text(title));
    let hash = Sha256::digest(content.as_bytes());
    let digest: String = hash[..IDENTIFIER_DIGEST_BYTES]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();

    let prefix = if source.is_empty() {
        "UNKNOWN".to_string()
    } else {
        source.replace(' ', "_").to_uppercase()
    };
    format!("{prefix}_{digest}")
}

/// Applies the listing defaulting rules to a raw retriever record.
///
/// `observed_at` falls back to the current time when the record has none.
#[must_use]
pub fn normalize_listing(raw: RawListing) -> Listing {
    let title = trimmed(raw.title);
    let source_name = trimmed(raw.source_name);

    let price = raw.price.as_ref().and_then(parse_price).unwrap_or(0.0);
    let original_price = raw
        .original_price
        .as_ref()
        .and_then(parse_price)
        .unwrap_or(price);

    let identifier = raw
        .identifier
        .map(|id| id.into_text().trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| listing_identifier(&source_name, &title));

    let stock_status = raw
        .stock_status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_STOCK.to_string());

    Listing {
        identifier,
        title,
        source_name,
        price,
        original_price,
        url: trimmed(raw.url),
        image_url: trimmed(raw.image_url),
        stock_status,
        observed_at: raw.observed_at.unwrap_or_else(Utc::now),
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Lowercases, maps non-alphanumerics to spaces, and collapses whitespace.
fn normalize_text(text: &str) -> String {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}
