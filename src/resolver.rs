//! Specificity ranking and de-duplication of candidate names.

use crate::heuristics::{ReservedPrefix, RE_PASCAL_STRUCTURED};
use indexmap::IndexSet;
use std::cmp::Ordering;

/// Orders candidates most-specific first and drops names subsumed by an
/// already accepted one.
#[derive(Debug, Clone)]
pub struct SpecificityResolver {
    prefix: ReservedPrefix,
}

impl SpecificityResolver {
    pub fn new(prefix: ReservedPrefix) -> Self {
        Self { prefix }
    }

    /// Rank and suppress.
    ///
    /// 1. trim, drop empties, exact de-dup
    /// 2. reserved-prefix names, then PascalCase-structured names, then by
    ///    length descending (stable for ties)
    /// 3. keep a name only if no kept name contains it (case-insensitive)
    pub fn resolve<I, S>(&self, candidates: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: IndexSet<String> = candidates
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        let mut ranked: Vec<String> = unique.into_iter().collect();
        ranked.sort_by(|a, b| self.compare(a, b));

        let mut kept: Vec<String> = Vec::with_capacity(ranked.len());
        let mut kept_lower: Vec<String> = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            let lower = candidate.to_lowercase();
            if kept_lower.iter().any(|k| k.contains(&lower)) {
                continue;
            }
            kept_lower.push(lower);
            kept.push(candidate);
        }
        kept
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        let prefixed = |s: &str| self.prefix.is_prefixed(s);
        let structured = |s: &str| RE_PASCAL_STRUCTURED.is_match(s);

        prefixed(b)
            .cmp(&prefixed(a))
            .then_with(|| structured(b).cmp(&structured(a)))
            .then_with(|| b.chars().count().cmp(&a.chars().count()))
    }
}

// ============================================================================
// Tests
// ============================================================================
