//! Global affinity margin estimation.
//!
//! Each result file contributes the score found at its top-`P`% rank; the
//! margin is the mean of those per-file scores. Files with no records are
//! skipped with a warning and do not count towards the mean. Only when every
//! file is empty does estimation fail with [`VinyxError::EmptyInput`].

use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;
use vinyx_common::error::{Result, VinyxError};
use vinyx_common::record::{self, compare_scores, parse_score};

use crate::observer::CollectObserver;

/// Default share of best-scoring records kept by the collect job.
pub const DEFAULT_PERCENTAGE: u8 = 10;

/// Read every score in a result file, in file order.
pub fn read_scores(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path).map_err(|e| VinyxError::io(path, e))?;
    let mut reader = record::reader_builder().from_reader(file);
    let mut scores = Vec::new();
    for row in reader.records() {
        scores.push(parse_score(&row?, path)?);
    }
    Ok(scores)
}

/// Index of the top-`percentage`% record among `count` ascending scores.
///
/// `floor(count * percentage / 100)`, clamped to the last record so that
/// 100% selects the largest score. Must not be called with `count == 0`.
pub fn percentile_rank(count: usize, percentage: u8) -> usize {
    let rank = count * percentage as usize / 100;
    rank.min(count.saturating_sub(1))
}

/// Score at the top-`percentage`% rank, or `None` for an empty slice.
///
/// Reorders `scores` in place.
pub fn percentile_score(scores: &mut [f64], percentage: u8) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let rank = percentile_rank(scores.len(), percentage);
    let (_, score, _) = scores.select_nth_unstable_by(rank, |a, b| compare_scores(*a, *b));
    Some(*score)
}

/// Estimate the global margin across `files`.
pub fn estimate_margin(
    files: &[PathBuf],
    percentage: u8,
    observer: &dyn CollectObserver,
) -> Result<f64> {
    if percentage > 100 {
        return Err(VinyxError::Config(format!(
            "percentage must be between 0 and 100, got {}",
            percentage
        )));
    }
    let Some(first) = files.first() else {
        return Err(VinyxError::Config("no result files to estimate a margin from".to_string()));
    };

    let mut total = 0.0;
    let mut used = 0usize;
    for (i, path) in files.iter().enumerate() {
        let mut scores = read_scores(path)?;
        observer.file_read(i, path);
        match percentile_score(&mut scores, percentage) {
            Some(score) => {
                debug!("{}: {} records, top {}% at {}", path.display(), scores.len(), percentage, score);
                total += score;
                used += 1;
            }
            None => observer.empty_file_skipped(path),
        }
    }

    if used == 0 {
        return Err(VinyxError::EmptyInput { path: first.clone() });
    }
    let margin = total / used as f64;
    observer.margin_estimated(margin);
    Ok(margin)
}
