//! Per-file filter and sort.
//!
//! Keeps the records whose score is at or below the margin, sorts them
//! ascending (stable, so equal scores keep their input order) and writes them
//! out through a temporary file that is renamed into place only once fully
//! written. Readers never observe a partial filtered file.

use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use vinyx_common::error::{Result, VinyxError};
use vinyx_common::record::{self, compare_scores, parse_score};

use crate::discover::filtered_path_for;
use crate::observer::CollectObserver;

/// Filter `input` to records with `score <= margin`, sorted ascending, into `output`.
///
/// Returns the number of records kept. Rerunning with the same margin on an
/// unchanged input produces a byte-identical file.
pub fn filter_file(input: &Path, margin: f64, output: &Path) -> Result<usize> {
    let file = File::open(input).map_err(|e| VinyxError::io(input, e))?;
    let mut reader = record::reader_builder().from_reader(file);

    let mut kept = Vec::new();
    for row in reader.records() {
        let row = row?;
        let score = parse_score(&row, input)?;
        if score <= margin {
            kept.push((score, row));
        }
    }
    kept.sort_by(|a, b| compare_scores(a.0, b.0));

    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| VinyxError::io(dir, e))?;
    {
        let mut writer = record::writer_builder().from_writer(&mut tmp);
        for (_, row) in &kept {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| VinyxError::io(output, e))?;
    }
    tmp.persist(output).map_err(|e| VinyxError::io(output, e.error))?;

    debug!("{}: kept {} records at or below {}", input.display(), kept.len(), margin);
    Ok(kept.len())
}

/// Filter every result file, writing `output_top.csv` next to each one.
///
/// Returns the filtered paths in the same order as `files`.
pub fn filter_all(
    files: &[PathBuf],
    margin: f64,
    observer: &dyn CollectObserver,
) -> Result<Vec<PathBuf>> {
    let mut outputs = Vec::with_capacity(files.len());
    for (i, path) in files.iter().enumerate() {
        let output = filtered_path_for(path);
        filter_file(path, margin, &output)?;
        observer.file_read(i, path);
        outputs.push(output);
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;
    use std::fs;
    use tempfile::tempdir;

    const RESULTS: &str = "\
AA_xaaa,ZINC05.pdbqt,CCO,-5.0
AA_xaaa,ZINC01.pdbqt,CCN,-8.5
AA_xaaa,ZINC02.pdbqt,c1ccccc1,-6.0
AA_xaaa,ZINC03.pdbqt,CC(=O)O,-8.5
AA_xaaa,ZINC04.pdbqt,CCCl,-7.25
";

    #[test]
    fn test_keeps_at_or_below_margin_sorted() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("output.txt");
        let output = dir.path().join("output_top.csv");
        fs::write(&input, RESULTS).unwrap();

        let kept = filter_file(&input, -6.0, &output).unwrap();
        assert_eq!(kept, 4);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "\
AA_xaaa,ZINC01.pdbqt,CCN,-8.5
AA_xaaa,ZINC03.pdbqt,CC(=O)O,-8.5
AA_xaaa,ZINC04.pdbqt,CCCl,-7.25
AA_xaaa,ZINC02.pdbqt,c1ccccc1,-6.0
"
        );
    }

    #[test]
    fn test_signed_zeros_keep_input_order() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("output.txt");
        let output = dir.path().join("output_top.csv");
        fs::write(&input, "A,first,C,0.0\nA,second,C,-0.0\nA,third,C,-1.0\n").unwrap();

        assert_eq!(filter_file(&input, 1.0, &output).unwrap(), 3);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "A,third,C,-1.0\nA,first,C,0.0\nA,second,C,-0.0\n"
        );
    }

    #[test]
    fn test_idempotent() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("output.txt");
        let output = dir.path().join("output_top.csv");
        fs::write(&input, RESULTS).unwrap();

        filter_file(&input, -7.0, &output).unwrap();
        let first = fs::read(&output).unwrap();
        filter_file(&input, -7.0, &output).unwrap();
        let second = fs::read(&output).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_nothing_below_margin_gives_empty_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("output.txt");
        let output = dir.path().join("output_top.csv");
        fs::write(&input, RESULTS).unwrap();

        assert_eq!(filter_file(&input, -100.0, &output).unwrap(), 0);
        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }

    #[test]
    fn test_parse_error_leaves_no_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("output.txt");
        let output = dir.path().join("output_top.csv");
        fs::write(&input, "AA,a.pdbqt,C,-1.0\nAA,b.pdbqt,C,-2.0\nAA,c.pdbqt,C,n/a\n").unwrap();

        let err = filter_file(&input, 0.0, &output).unwrap_err();
        match err {
            VinyxError::Parse { path, line, .. } => {
                assert_eq!(path, input);
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!output.exists());
        // Only the input remains; the temporary file was cleaned up.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_filter_all_writes_siblings() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("output.txt"), RESULTS).unwrap();
        fs::write(b.join("output.txt"), "BB_x,z.pdbqt,C,-9.0\n").unwrap();

        let outputs = filter_all(
            &[a.join("output.txt"), b.join("output.txt")],
            -8.0,
            &RecordingObserver::new(),
        )
        .unwrap();
        assert_eq!(outputs, vec![a.join("output_top.csv"), b.join("output_top.csv")]);
        assert_eq!(fs::read_to_string(&outputs[1]).unwrap(), "BB_x,z.pdbqt,C,-9.0\n");
    }
}
