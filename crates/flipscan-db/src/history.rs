//! Append-only history tables: `score_history` and `search_history`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use flipscan_core::{Recommendation, ScoreResult};

use crate::decimal::{to_decimal, to_f64};
use crate::DbError;

/// A row from the `score_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoreHistoryRow {
    pub id: i64,
    pub identifier: String,
    /// One of `BUY`, `REVIEW`, `AVOID` (enforced by a CHECK constraint).
    pub recommendation: String,
    pub analysis: String,
    pub profit: Decimal,
    pub roi_percent: Decimal,
    pub using_fallback: bool,
    pub observed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ScoreHistoryRow {
    /// Rebuilds the [`ScoreResult`] that produced this row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidColumn`] if the stored recommendation is not
    /// recognised or a numeric column does not fit in `f64`.
    pub fn to_score_result(&self) -> Result<ScoreResult, DbError> {
        let recommendation = self
            .recommendation
            .parse::<Recommendation>()
            .map_err(|e| DbError::InvalidColumn {
                column: "recommendation",
                reason: e.to_string(),
            })?;

        Ok(ScoreResult {
            recommendation,
            analysis_text: self.analysis.clone(),
            profit: to_f64("profit", self.profit)?,
            roi_percent: to_f64("roi_percent", self.roi_percent)?,
            observed_at: self.observed_at,
            using_fallback: self.using_fallback,
        })
    }
}

/// A row from the `search_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchHistoryRow {
    pub id: i64,
    pub query: String,
    /// `NULL` when the search ran across every source.
    pub source_name: Option<String>,
    pub results_count: i32,
    pub used_expansion: bool,
    pub created_at: DateTime<Utc>,
}

/// Appends one scoring outcome for the listing `identifier`.
///
/// Returns the new row `id`.
///
/// # Errors
///
/// Returns [`DbError::InvalidColumn`] for non-finite profit or ROI values, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_score_history(
    pool: &PgPool,
    identifier: &str,
    result: &ScoreResult,
) -> Result<i64, DbError> {
    let profit = to_decimal("profit", result.profit, 2)?;
    let roi_percent = to_decimal("roi_percent", result.roi_percent, 4)?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO score_history \
             (identifier, recommendation, analysis, profit, roi_percent, using_fallback, \
              observed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(identifier)
    .bind(result.recommendation.as_str())
    .bind(&result.analysis_text)
    .bind(profit)
    .bind(roi_percent)
    .bind(result.using_fallback)
    .bind(result.observed_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Lists the most recent scores for `identifier`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_score_history(
    pool: &PgPool,
    identifier: &str,
    limit: u32,
) -> Result<Vec<ScoreHistoryRow>, DbError> {
    let rows = sqlx::query_as::<_, ScoreHistoryRow>(
        "SELECT id, identifier, recommendation, analysis, profit, roi_percent, \
                using_fallback, observed_at, created_at \
         FROM score_history \
         WHERE identifier = $1 \
         ORDER BY observed_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(identifier)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Appends one search invocation. Returns the new row `id`.
///
/// # Errors
///
/// Returns [`DbError::InvalidColumn`] if `results_count` overflows `INTEGER`,
/// or [`DbError::Sqlx`] if the insert fails.
pub async fn insert_search_history(
    pool: &PgPool,
    query: &str,
    source_name: Option<&str>,
    results_count: usize,
    used_expansion: bool,
) -> Result<i64, DbError> {
    let results_count = i32::try_from(results_count).map_err(|e| DbError::InvalidColumn {
        column: "results_count",
        reason: e.to_string(),
    })?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO search_history (query, source_name, results_count, used_expansion) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(query)
    .bind(source_name)
    .bind(results_count)
    .bind(used_expansion)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn row(recommendation: &str) -> ScoreHistoryRow {
        ScoreHistoryRow {
            id: 1,
            identifier: "TARGET_00000000deadbeef".to_string(),
            recommendation: recommendation.to_string(),
            analysis: "Moderate profit with 25.0% ROI. Check competition first.".to_string(),
            profit: Decimal::from_str("25.00").unwrap(),
            roi_percent: Decimal::from_str("25.0000").unwrap(),
            using_fallback: true,
            observed_at: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn score_row_rebuilds_result() {
        let result = row("REVIEW").to_score_result().unwrap();

        assert_eq!(result.recommendation, Recommendation::Review);
        assert!(result.using_fallback);
        assert!((result.profit - 25.0).abs() < 1e-9);
        assert!((result.roi_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn score_row_rejects_unknown_recommendation() {
        let err = row("MAYBE").to_score_result().unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidColumn {
                column: "recommendation",
                ..
            }
        ));
    }
}
