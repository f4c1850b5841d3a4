//! Percentages, grade bands, and per-user aggregate statistics.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::submission::ExamResult;

/// Share of the available points, as a whole percentage.
///
/// Returns 0 when nothing was available to score.
pub fn percentage(total_score: u64, total_max_score: f64) -> u32 {
    if total_max_score <= 0.0 || !total_max_score.is_finite() {
        return 0;
    }
    (total_score as f64 / total_max_score * 100.0).round().max(0.0) as u32
}

/// Coarse band shown next to an exam result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// 80% and above.
    Excellent,
    /// 50% to 79%.
    Fair,
    /// Below 50%.
    Poor,
}

impl Grade {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => Grade::Excellent,
            50..=79 => Grade::Fair,
            _ => Grade::Poor,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Excellent => write!(f, "excellent"),
            Grade::Fair => write!(f, "fair"),
            Grade::Poor => write!(f, "poor"),
        }
    }
}

/// Aggregate statistics over one user's exam results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Number of distinct modules with at least one submitted exam.
    pub modules_completed: usize,
    pub total_exams: usize,
    /// Mean `total_score` across all results, rounded.
    pub average_score: u64,
}

impl UserStats {
    pub fn from_results(results: &[ExamResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let modules: HashSet<&str> = results.iter().map(|r| r.module_id.as_str()).collect();
        let sum: u64 = results.iter().map(|r| r.total_score).sum();
        let average = (sum as f64 / results.len() as f64).round() as u64;

        Self {
            modules_completed: modules.len(),
            total_exams: results.len(),
            average_score: average,
        }
    }
}
