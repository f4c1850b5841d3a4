//! The `examscore similarity` command.

use anyhow::Result;

use examscore_core::similarity::{similarity, SimilarityPolicy};

pub fn execute(reference: &str, candidate: &str, policy: SimilarityPolicy) -> Result<()> {
    println!("{:.4}", similarity(reference, candidate, policy));
    Ok(())
}
