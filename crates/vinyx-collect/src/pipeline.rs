//! The collect job: discover → estimate margin → filter → merge.

use std::fs;
use std::path::PathBuf;
use tracing::info;
use vinyx_common::error::{Result, VinyxError};

use crate::discover::find_result_files;
use crate::filter::filter_all;
use crate::merge::merge_sorted_files;
use crate::observer::CollectObserver;
use crate::threshold::{estimate_margin, DEFAULT_PERCENTAGE};

/// Default location of the merged output.
pub const DEFAULT_OUTPUT: &str = "./out/collected_output.csv";

/// Parameters for one collect run.
#[derive(Debug, Clone)]
pub struct CollectJob {
    /// Directory searched recursively for `output.txt` files.
    pub input: PathBuf,
    /// Merged output; replaced if it already exists.
    pub output: PathBuf,
    /// Top percentage of each file used to estimate the margin.
    pub percentage: u8,
    /// Maximum number of merged records; `None` for no limit.
    pub limit: Option<usize>,
}

impl CollectJob {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            percentage: DEFAULT_PERCENTAGE,
            limit: None,
        }
    }
}

/// Summary of a collect run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectResult {
    pub files_found: usize,
    /// `None` when there was nothing to collect.
    pub margin: Option<f64>,
    pub records_written: u64,
    pub limit_reached: bool,
}

/// Run the whole collect job synchronously.
pub fn run_collect(job: &CollectJob, observer: &dyn CollectObserver) -> Result<CollectResult> {
    let files = find_result_files(&job.input)?;
    observer.files_found(files.len());
    if files.is_empty() {
        info!("No output files to collect results from found in {}", job.input.display());
        return Ok(CollectResult::default());
    }

    if job.output.exists() {
        fs::remove_file(&job.output).map_err(|e| VinyxError::io(&job.output, e))?;
    }

    let margin = estimate_margin(&files, job.percentage, observer)?;
    let filtered = filter_all(&files, margin, observer)?;
    let stats = merge_sorted_files(&filtered, &job.output, job.limit, observer)?;

    info!(
        "Collected {} results from {} files into {}",
        stats.emitted,
        files.len(),
        job.output.display()
    );
    Ok(CollectResult {
        files_found: files.len(),
        margin: Some(margin),
        records_written: stats.emitted,
        limit_reached: stats.limit_reached,
    })
}
