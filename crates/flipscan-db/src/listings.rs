//! Database operations for the `listings` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use flipscan_core::Listing;

use crate::decimal::{to_decimal, to_f64};
use crate::DbError;

/// A row from the `listings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListingRow {
    pub id: i64,
    pub identifier: String,
    pub title: String,
    pub source_name: String,
    pub price: Decimal,
    pub original_price: Decimal,
    pub url: String,
    pub image_url: String,
    pub stock_status: String,
    pub observed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingRow {
    /// Rebuilds the domain [`Listing`] from the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] if a stored price does not fit in `f64`.
    pub fn into_listing(self) -> Result<Listing, DbError> {
        Ok(Listing {
            identifier: self.identifier,
            title: self.title,
            source_name: self.source_name,
            price: to_f64("price", self.price)?,
            original_price: to_f64("original_price", self.original_price)?,
            url: self.url,
            image_url: self.image_url,
            stock_status: self.stock_status,
            observed_at: self.observed_at,
        })
    }
}

/// Upserts a listing snapshot keyed by `identifier`.
///
/// A conflict overwrites every observed field with the new snapshot and bumps
/// `updated_at`. Returns the internal `id` of the row.
///
/// # Errors
///
/// Returns [`DbError::InvalidColumn`] for non-finite prices, or
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_listing(pool: &PgPool, listing: &Listing) -> Result<i64, DbError> {
    let price = to_decimal("price", listing.price, 2)?;
    let original_price = to_decimal("original_price", listing.original_price, 2)?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO listings \
             (identifier, title, source_name, price, original_price, url, image_url, \
              stock_status, observed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (identifier) DO UPDATE SET \
             title          = EXCLUDED.title, \
             source_name    = EXCLUDED.source_name, \
             price          = EXCLUDED.price, \
             original_price = EXCLUDED.original_price, \
             url            = EXCLUDED.url, \
             image_url      = EXCLUDED.image_url, \
             stock_status   = EXCLUDED.stock_status, \
             observed_at    = EXCLUDED.observed_at, \
             updated_at     = NOW() \
         RETURNING id",
    )
    .bind(&listing.identifier)
    .bind(&listing.title)
    .bind(&listing.source_name)
    .bind(price)
    .bind(original_price)
    .bind(&listing.url)
    .bind(&listing.image_url)
    .bind(&listing.stock_status)
    .bind(listing.observed_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Fetches the latest stored snapshot for `identifier`, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_listing(pool: &PgPool, identifier: &str) -> Result<Option<ListingRow>, DbError> {
    let row = sqlx::query_as::<_, ListingRow>(
        "SELECT id, identifier, title, source_name, price, original_price, url, image_url, \
                stock_status, observed_at, created_at, updated_at \
         FROM listings \
         WHERE identifier = $1",
    )
    .bind(identifier)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
