//! Cross-venue market matching.
//!
//! The two venues describe the same real-world events with independently
//! written titles, so pairing is fuzzy: titles are normalized to word
//! token sets and scored with Jaccard similarity. Assignment is greedy
//! one-to-one — highest-scoring pairs claim their markets first — so one
//! popular market can never pair with several counterparties. Manual
//! overrides, keyed by venue-native market IDs, bypass scoring entirely.

use std::collections::{BTreeSet, HashSet};

use chrono::Duration;
use rust_decimal::Decimal;
use tracing::warn;

use crate::config::MatcherConfig;
use crate::domain::{Market, MatchedMarket};

/// Pairs markets across the two venue catalogs.
///
/// Deterministic given identical inputs; holds no state across calls.
#[derive(Debug, Clone)]
pub struct MarketMatcher {
    config: MatcherConfig,
}

impl MarketMatcher {
    /// Create a matcher with the given configuration.
    #[must_use]
    pub const fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Pair venue-A markets with venue-B markets.
    ///
    /// Returns an empty list if either catalog is empty. Pairing is
    /// O(|A|·|B|), which is fine at catalog scale (hundreds); callers
    /// bound the input via catalog fetch limits, and nothing is silently
    /// truncated here.
    #[must_use]
    pub fn match_markets(
        &self,
        catalog_a: &[Market],
        catalog_b: &[Market],
    ) -> Vec<MatchedMarket> {
        if catalog_a.is_empty() || catalog_b.is_empty() {
            return Vec::new();
        }

        let mut used_a = vec![false; catalog_a.len()];
        let mut used_b = vec![false; catalog_b.len()];
        let mut pairs = Vec::new();

        // Overrides first: they always win and consume both markets.
        for (idx_a, market_a) in catalog_a.iter().enumerate() {
            let Some(target_b) = self.config.overrides.get(market_a.market_id().as_str()) else {
                continue;
            };
            let Some(idx_b) = catalog_b
                .iter()
                .position(|m| m.market_id().as_str() == target_b)
            else {
                continue;
            };
            if used_b[idx_b] {
                continue;
            }
            used_a[idx_a] = true;
            used_b[idx_b] = true;
            self.push_pair(&mut pairs, market_a, &catalog_b[idx_b], Decimal::ONE);
        }

        // Score every remaining cross-catalog combination above threshold.
        let tokens_a: Vec<BTreeSet<String>> = catalog_a
            .iter()
            .map(|m| normalize_title(m.title()))
            .collect();
        let tokens_b: Vec<BTreeSet<String>> = catalog_b
            .iter()
            .map(|m| normalize_title(m.title()))
            .collect();

        let mut candidates: Vec<(Decimal, usize, usize)> = Vec::new();
        for (idx_a, market_a) in catalog_a.iter().enumerate() {
            if used_a[idx_a] {
                continue;
            }
            for (idx_b, market_b) in catalog_b.iter().enumerate() {
                if used_b[idx_b] {
                    continue;
                }
                if !self.within_expiry_gap(market_a, market_b) {
                    continue;
                }
                let score = jaccard(&tokens_a[idx_a], &tokens_b[idx_b]);
                if score >= self.config.similarity_threshold {
                    candidates.push((score, idx_a, idx_b));
                }
            }
        }

        // Highest-similarity pairs claim their markets first; index order
        // breaks ties so identical inputs always produce identical output.
        candidates.sort_by(|(score_x, a_x, b_x), (score_y, a_y, b_y)| {
            score_y
                .cmp(score_x)
                .then_with(|| a_x.cmp(a_y))
                .then_with(|| b_x.cmp(b_y))
        });

        for (score, idx_a, idx_b) in candidates {
            if used_a[idx_a] || used_b[idx_b] {
                continue;
            }
            used_a[idx_a] = true;
            used_b[idx_b] = true;
            self.push_pair(&mut pairs, &catalog_a[idx_a], &catalog_b[idx_b], score);
        }

        pairs
    }

    fn push_pair(
        &self,
        pairs: &mut Vec<MatchedMarket>,
        market_a: &Market,
        market_b: &Market,
        similarity: Decimal,
    ) {
        match MatchedMarket::try_new(market_a.clone(), market_b.clone(), similarity) {
            Ok(pair) => pairs.push(pair),
            Err(e) => warn!(
                market_a = %market_a.market_id(),
                market_b = %market_b.market_id(),
                error = %e,
                "skipping mislabeled catalog entry"
            ),
        }
    }

    /// End-date proximity gate. Applies only when both venues expose an
    /// end date; a zero gap configuration disables it.
    fn within_expiry_gap(&self, market_a: &Market, market_b: &Market) -> bool {
        if self.config.max_expiry_gap_days == 0 {
            return true;
        }
        match (market_a.end_date(), market_b.end_date()) {
            (Some(end_a), Some(end_b)) => {
                let gap = (end_a - end_b).abs();
                gap <= Duration::days(self.config.max_expiry_gap_days)
            }
            _ => true,
        }
    }
}

/// Normalize a market title into its word token set: lower-case, strip
/// punctuation and hyphens, collapse whitespace.
#[must_use]
pub fn normalize_title(title: &str) -> BTreeSet<String> {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Jaccard similarity of two token sets, exact in decimal.
#[must_use]
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Decimal {
    if a.is_empty() && b.is_empty() {
        return Decimal::ZERO;
    }
    let a_refs: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b_refs: HashSet<&str> = b.iter().map(String::as_str).collect();
    let intersection = a_refs.intersection(&b_refs).count();
    let union = a_refs.union(&b_refs).count();
    Decimal::from(intersection) / Decimal::from(union)
}
