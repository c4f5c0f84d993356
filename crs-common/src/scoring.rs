//! Keyword-group relevance scoring
//!
//! **Algorithm:**
//! 1. Lower-case `title + " " + description` into one text blob
//! 2. For each group (registry order), for each entry: split on `,`, trim
//!    and lower-case the parts. Any non-empty part found as a substring marks
//!    the group hit and records the entry; every part with a nonzero
//!    non-overlapping count adds that count to the frequency accumulator
//! 3. Each hit group adds its weight once
//! 4. Each accumulated occurrence adds 0.5
//!
//! Matching is plain substring search, so `art` also hits inside `start`.
//! Frequencies accumulate across groups: a part listed under two hit groups
//! is counted once for each.

use crate::keywords::KeywordGroupRegistry;
use std::collections::{BTreeMap, BTreeSet};

/// Score contribution of each keyword occurrence
pub const FREQUENCY_BONUS: f64 = 0.5;

/// Outcome of scoring one record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreResult {
    /// Group-weight sum plus the frequency bonus; 0 iff nothing matched
    pub relevance_score: f64,
    /// Original entry strings that matched
    pub matched_keywords: BTreeSet<String>,
    /// Names of groups with at least one matching entry
    pub matched_groups: BTreeSet<String>,
    /// Matched part → occurrence count (always ≥ 1)
    pub keyword_frequencies: BTreeMap<String, u64>,
}

impl ScoreResult {
    pub fn is_match(&self) -> bool {
        !self.matched_groups.is_empty()
    }
}

/// Split an entry into its lower-cased, trimmed OR-parts
pub fn entry_parts(entry: &str) -> impl Iterator<Item = String> + '_ {
    entry.split(',').map(|p| p.trim().to_lowercase())
}

/// Score one record's title and description against the registry
pub fn score(title: &str, description: &str, registry: &KeywordGroupRegistry) -> ScoreResult {
    let text = format!("{} {}", title, description).to_lowercase();

    let mut result = ScoreResult::default();
    let mut score = 0.0;

    for group in registry.groups() {
        let mut hit = false;

        for entry in group.entries() {
            let parts: Vec<String> = entry_parts(entry).filter(|p| !p.is_empty()).collect();

            if !parts.iter().any(|p| text.contains(p.as_str())) {
                continue;
            }

            hit = true;
            result.matched_keywords.insert(entry.clone());

            for part in parts {
                let count = text.matches(part.as_str()).count() as u64;
                if count > 0 {
                    *result.keyword_frequencies.entry(part).or_insert(0) += count;
                }
            }
        }

        if hit {
            score += f64::from(group.weight());
            result.matched_groups.insert(group.name().to_string());
        }
    }

    for count in result.keyword_frequencies.values() {
        score += FREQUENCY_BONUS * *count as f64;
    }

    result.relevance_score = score;
    result
}
