//! Streaming k-way merge of filtered result files.
//!
//! Each input is read sequentially through its own buffered cursor; only the
//! current record of every file is held in memory. A min-heap keyed by
//! `(score, file index)` picks the next record, so equal scores are emitted
//! in ascending file-index order and the output is reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use vinyx_common::error::{Result, VinyxError};
use vinyx_common::record::{self, compare_scores, line_of, parse_score};

use crate::observer::CollectObserver;

/// Outcome of a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    /// Records written to the output.
    pub emitted: u64,
    /// The limit stopped the merge while records were still pending.
    pub limit_reached: bool,
}

/// Read position within one filtered file.
struct MergeCursor {
    path: PathBuf,
    reader: csv::Reader<File>,
    row: csv::StringRecord,
    /// Score of `row`; `None` once the file is exhausted.
    score: Option<f64>,
}

impl MergeCursor {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| VinyxError::io(path, e))?;
        let mut cursor = Self {
            path: path.to_path_buf(),
            reader: record::reader_builder().from_reader(file),
            row: csv::StringRecord::new(),
            score: None,
        };
        cursor.advance()?;
        Ok(cursor)
    }

    /// Move to the next record, refreshing the cached score.
    fn advance(&mut self) -> Result<()> {
        let previous = self.score;
        if !self.reader.read_record(&mut self.row)? {
            self.score = None;
            return Ok(());
        }
        let score = parse_score(&self.row, &self.path)?;
        if previous.is_some_and(|p| score < p) {
            return Err(VinyxError::UnsortedInput {
                path: self.path.clone(),
                line: line_of(&self.row),
            });
        }
        self.score = Some(score);
        Ok(())
    }
}

/// Pending head of one cursor. Ordered so that `BinaryHeap` pops the lowest
/// score first, and the lowest file index among equal scores (`-0.0` and
/// `0.0` included).
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    score: f64,
    index: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_scores(other.score, self.score).then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

/// Merge ascending-sorted `inputs` into `writer`.
///
/// Stops when every input is exhausted or `limit` records have been written.
/// `Some(0)` writes nothing. Records are copied verbatim.
pub fn merge_into<W: Write>(
    inputs: &[PathBuf],
    writer: W,
    limit: Option<usize>,
    observer: &dyn CollectObserver,
) -> Result<MergeStats> {
    let mut cursors = inputs
        .iter()
        .map(|p| MergeCursor::open(p))
        .collect::<Result<Vec<_>>>()?;

    let mut heap: BinaryHeap<HeapEntry> = cursors
        .iter()
        .enumerate()
        .filter_map(|(index, c)| c.score.map(|score| HeapEntry { score, index }))
        .collect();
    debug!("Merging {} files, {} non-empty", cursors.len(), heap.len());

    let mut out = record::writer_builder().from_writer(writer);
    let mut stats = MergeStats::default();
    loop {
        if let Some(limit) = limit {
            if stats.emitted >= limit as u64 {
                if !heap.is_empty() {
                    stats.limit_reached = true;
                    observer.limit_reached(limit);
                }
                break;
            }
        }
        let Some(HeapEntry { index, .. }) = heap.pop() else {
            break;
        };

        let cursor = &mut cursors[index];
        out.write_record(&cursor.row)?;
        stats.emitted += 1;
        observer.records_merged(stats.emitted);

        cursor.advance()?;
        if let Some(score) = cursor.score {
            heap.push(HeapEntry { score, index });
        }
    }

    out.flush().map_err(csv::Error::from)?;
    Ok(stats)
}

/// Merge ascending-sorted `inputs` into a newly created file at `output`.
pub fn merge_sorted_files(
    inputs: &[PathBuf],
    output: &Path,
    limit: Option<usize>,
    observer: &dyn CollectObserver,
) -> Result<MergeStats> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| VinyxError::io(parent, e))?;
    }
    let file = File::create(output).map_err(|e| VinyxError::io(output, e))?;
    let stats = merge_into(inputs, file, limit, observer)?;
    debug!("Wrote {} records to {}", stats.emitted, output.display());
    Ok(stats)
}
