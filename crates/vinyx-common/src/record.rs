//! Result records and their comma-separated line format.
//!
//! Every line is `origin,item,derived_value,score` with no header and no
//! quoting. Records are read and written through the `csv` crate configured
//! so that field text passes through untouched.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use crate::error::{Result, VinyxError};

/// Number of fields on every result line.
pub const FIELD_COUNT: usize = 4;

/// One docking result: which collection it came from, the ligand file,
/// its SMILES string and the best affinity (kcal/mol, lower is better).
///
/// The score is kept as the text the docking program printed, so `-7.0`
/// is written back as `-7.0` rather than reformatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub origin: String,
    pub item: String,
    pub derived_value: String,
    pub score: String,
}

impl ResultRecord {
    pub fn new(
        origin: impl Into<String>,
        item: impl Into<String>,
        derived_value: impl Into<String>,
        score: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            item: item.into(),
            derived_value: derived_value.into(),
            score: score.into(),
        }
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.origin, self.item, self.derived_value, self.score
        )
    }
}

/// Reader settings for result files: no header, no quote handling, and
/// field count checked by [`parse_score`] so errors carry a line number.
pub fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).quoting(false).flexible(true);
    builder
}

/// Writer settings matching [`reader_builder`].
pub fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'));
    builder
}

/// 1-based line number of a row, or 0 when the reader did not track it.
pub fn line_of(row: &csv::StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

/// Extract the score (last field) of a raw row.
///
/// NaN is rejected: a record must always have a well-defined position in
/// the ascending order.
pub fn parse_score(row: &csv::StringRecord, path: &Path) -> Result<f64> {
    let line = line_of(row);
    if row.len() != FIELD_COUNT {
        return Err(VinyxError::parse(
            path,
            line,
            format!("expected {} fields, found {}", FIELD_COUNT, row.len()),
        ));
    }
    let text = row[FIELD_COUNT - 1].trim();
    let score: f64 = text
        .parse()
        .map_err(|_| VinyxError::parse(path, line, format!("invalid score '{}'", text)))?;
    if score.is_nan() {
        return Err(VinyxError::parse(path, line, "score is not a number"));
    }
    Ok(score)
}

/// Ascending score order. `-0.0` and `0.0` compare equal, so ties between
/// them fall through to whatever tie-break the caller applies.
///
/// Scores come from [`parse_score`], which never yields NaN.
pub fn compare_scores(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
