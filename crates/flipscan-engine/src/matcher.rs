//! Textual similarity between a search query and listing fields.
//!
//! The score is a block-matching ratio: the longest common contiguous run is
//! found, then the same search recurses into the unmatched text on either
//! side of it. With `M` the total length of all runs, the ratio is
//! `2 * M / (len(a) + len(b))`, measured in characters after lowercasing.

use flipscan_core::Listing;

/// Score returned when the query appears verbatim inside the listing title.
pub const SUBSTRING_SCORE: f64 = 0.95;

/// A listing paired with its similarity to the query that selected it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a> {
    pub listing: &'a Listing,
    /// In `[0.0, 1.0]`.
    pub similarity: f64,
}

/// Block-matching ratio of two strings, case-insensitive.
///
/// Two empty strings are identical and score `1.0`.
#[must_use]
pub fn similarity(query: &str, field: &str) -> f64 {
    let a: Vec<char> = query.to_lowercase().chars().collect();
    let b: Vec<char> = field.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matched_length(&a, &b);
    #[allow(clippy::cast_precision_loss)]
    let ratio = (2 * matched) as f64 / total as f64;
    ratio.clamp(0.0, 1.0)
}

/// Scores one listing against a query.
///
/// A case-insensitive substring hit on the title scores exactly
/// [`SUBSTRING_SCORE`]. Otherwise the better of the title and source-name
/// ratios is returned.
#[must_use]
pub fn match_listing(query: &str, listing: &Listing) -> f64 {
    let query_lower = query.to_lowercase();
    if listing.title.to_lowercase().contains(&query_lower) {
        return SUBSTRING_SCORE;
    }

    let title_score = similarity(&query_lower, &listing.title);
    let source_score = similarity(&query_lower, &listing.source_name);
    title_score.max(source_score)
}

/// Keeps listings scoring at least `threshold` and orders them by score,
/// highest first.
///
/// The sort is stable: listings with equal scores keep their input order.
#[must_use]
pub fn rank_and_filter<'a>(
    listings: &'a [Listing],
    query: &str,
    threshold: f64,
) -> Vec<MatchResult<'a>> {
    let mut matches: Vec<MatchResult<'a>> = listings
        .iter()
        .map(|listing| MatchResult {
            listing,
            similarity: match_listing(query, listing),
        })
        .filter(|m| m.similarity >= threshold)
        .collect();

    matches.sort_by(|x, y| y.similarity.total_cmp(&x.similarity));
    matches
}

/// Total length of the matching blocks between `a` and `b`.
fn matched_length(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    total
}

/// Longest common run of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
///
/// Among equally long runs the one starting earliest in `a` wins, then the
/// one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);
    // prev[jj + 1] is the length of the run ending at (i - 1, blo + jj).
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];

    for i in alo..ahi {
        for jj in 0..width {
            if a[i] == b[blo + jj] {
                let k = prev[jj] + 1;
                cur[jj + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, blo + jj + 1 - k, k);
                }
            } else {
                cur[jj + 1] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}
