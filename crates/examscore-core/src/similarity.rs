//! Lexical similarity between a reference answer and a candidate answer.
//!
//! The score is the Jaccard index of the two answers' word sets after
//! lowercasing and trimming. Two behaviours are switchable through
//! [`SimilarityPolicy`]: dropping very short tokens (articles, "is", "of")
//! before the overlap is computed, and awarding a flat [`SUBSTRING_BONUS`]
//! when one answer is contained in the other.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Score returned when one normalized answer contains the other.
pub const SUBSTRING_BONUS: f64 = 0.8;

/// Tokens of this many characters or fewer are dropped by the length filter.
pub const SHORT_TOKEN_MAX_CHARS: usize = 2;

/// Switches controlling how [`similarity`] scores two texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityPolicy {
    /// Drop tokens of [`SHORT_TOKEN_MAX_CHARS`] characters or fewer.
    pub filter_short_tokens: bool,
    /// Return [`SUBSTRING_BONUS`] when one text contains the other.
    pub substring_bonus: bool,
}

impl SimilarityPolicy {
    /// Canonical policy: short tokens filtered, no substring bonus.
    pub const STANDARD: Self = Self {
        filter_short_tokens: true,
        substring_bonus: false,
    };

    /// Every token counts, and a contained answer earns the substring bonus.
    pub const LENIENT: Self = Self {
        filter_short_tokens: false,
        substring_bonus: true,
    };
}

impl Default for SimilarityPolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Display for SimilarityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::STANDARD => write!(f, "standard"),
            Self::LENIENT => write!(f, "lenient"),
            Self {
                filter_short_tokens,
                substring_bonus,
            } => write!(
                f,
                "custom(filter_short_tokens={filter_short_tokens}, substring_bonus={substring_bonus})"
            ),
        }
    }
}

impl FromStr for SimilarityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::STANDARD),
            "lenient" => Ok(Self::LENIENT),
            other => Err(format!(
                "unknown similarity policy: {other} (expected 'standard' or 'lenient')"
            )),
        }
    }
}

/// Similarity of two texts in `[0, 1]`.
///
/// - Identical after normalization (including both empty): `1.0`.
/// - Exactly one empty: `0.0`.
/// - With the substring bonus on, one contained in the other: `0.8`.
/// - Otherwise the Jaccard index of the token sets, `0.0` when both sets
///   are empty after filtering.
///
/// Symmetric in its arguments.
pub fn similarity(a: &str, b: &str, policy: SimilarityPolicy) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if policy.substring_bonus && (a.contains(b.as_str()) || b.contains(a.as_str())) {
        return SUBSTRING_BONUS;
    }

    let left = tokens(&a, policy);
    let right = tokens(&b, policy);

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();

    (intersection as f64 / union as f64).clamp(0.0, 1.0)
}

fn normalize(text: &str) -> String {
    text.to_lowercase().trim().to_string()
}

fn tokens(text: &str, policy: SimilarityPolicy) -> HashSet<&str> {
    text.split_whitespace()
        .filter(|token| !policy.filter_short_tokens || token.chars().count() > SHORT_TOKEN_MAX_CHARS)
        .collect()
}
