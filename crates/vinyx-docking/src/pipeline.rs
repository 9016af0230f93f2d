//! Orchestrator for analyzing one ligand collection.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{error, info};
use vinyx_common::error::{Result, VinyxError};
use vinyx_common::record::ResultRecord;

use crate::archive::{extract_tar_gz, find_ligands};
use crate::convert::OpenBabelRunner;
use crate::docking::{DockingTarget, VinaOptions, VinaRunner};
use crate::duration::DurationLogger;

/// Per-collection result file consumed by the collect job.
pub const RESULTS_FILE_NAME: &str = "output.txt";

/// Parameters for analyzing one `.tar.gz` collection.
#[derive(Debug, Clone)]
pub struct AnalyzeJob {
    /// The `.tar.gz` archive of ligands; its parent directory names the tranche.
    pub input: PathBuf,
    /// Root under which `<tranche>/<collection>/` is (re)created.
    pub output: PathBuf,
    pub vina: VinaOptions,
    /// Analyze at most this many ligands.
    pub limit: Option<usize>,
    pub vina_executable: PathBuf,
    pub obabel_executable: PathBuf,
}

/// Summary of an analyze run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeResult {
    pub collection_dir: PathBuf,
    pub results_file: PathBuf,
    pub ligands_found: usize,
    pub analyzed: usize,
    pub failed: usize,
}

/// `(tranche, collection)` for an archive such as `AA/xaaa.xaa.tar.gz` → `("AA", "xaaa")`.
pub fn collection_names(archive: &Path) -> Result<(String, String)> {
    let tranche = archive
        .parent()
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| {
            VinyxError::Config(format!("cannot derive a tranche name from {}", archive.display()))
        })?;
    let collection = archive
        .file_name()
        .map(|n| n.to_string_lossy())
        .and_then(|n| n.split('.').next().map(str::to_string))
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            VinyxError::Config(format!("cannot derive a collection name from {}", archive.display()))
        })?;
    Ok((tranche, collection))
}

/// Everything needed to dock the ligands of one collection.
struct Batch<'a> {
    options: &'a VinaOptions,
    vina: VinaRunner,
    obabel: OpenBabelRunner,
    collection_dir: PathBuf,
    results_file: PathBuf,
    origin: String,
    durations: DurationLogger,
}

impl Batch<'_> {
    /// Dock and convert one ligand, then append its result line.
    async fn analyze_ligand(&self, ligand: &Path) -> Result<ResultRecord> {
        let stem = ligand.file_stem().unwrap_or_default().to_string_lossy();
        let name = ligand.file_name().unwrap_or_default().to_string_lossy();
        let ligand_dir = self.collection_dir.join(&*stem);
        tokio::fs::create_dir_all(&ligand_dir)
            .await
            .map_err(|e| VinyxError::io(&ligand_dir, e))?;

        let target = DockingTarget {
            ligand: ligand.to_path_buf(),
            out: ligand_dir.join("output.pdbqt"),
            log: ligand_dir.join("vina-log.txt"),
        };
        let affinity = self.vina.run(self.options, &target).await?;
        let smiles = self.obabel.run(&target.out, &ligand_dir.join("output.smi")).await?;

        let record = ResultRecord::new(self.origin.as_str(), name.into_owned(), smiles, affinity);
        self.append(&record).await?;
        Ok(record)
    }

    async fn append(&self, record: &ResultRecord) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.results_file)
            .await
            .map_err(|e| VinyxError::io(&self.results_file, e))?;
        file.write_all(format!("{}\n", record).as_bytes())
            .await
            .map_err(|e| VinyxError::io(&self.results_file, e))?;
        file.flush().await.map_err(|e| VinyxError::io(&self.results_file, e))
    }

    /// Analyze every ligand; a failing ligand is logged and skipped.
    /// Returns `(analyzed, failed)`.
    async fn dock_all(&self, ligands: &[PathBuf]) -> (usize, usize) {
        let (mut analyzed, mut failed) = (0, 0);
        for ligand in ligands {
            let message = format!("Analyzed ligand {}", ligand.display());
            match self.durations.log_time(&message, self.analyze_ligand(ligand)).await {
                Ok(_) => analyzed += 1,
                Err(e) => {
                    error!("Failed to analyze {}: {}", ligand.display(), e);
                    failed += 1;
                }
            }
        }
        (analyzed, failed)
    }
}

/// Extract a collection archive and dock every ligand in it.
///
/// The collection directory is wiped first, so a rerun starts clean.
/// Per-ligand failures do not abort the batch; archive or filesystem
/// failures on the collection itself do.
pub async fn run_analyze(job: &AnalyzeJob) -> Result<AnalyzeResult> {
    let archive = tokio::fs::canonicalize(&job.input)
        .await
        .map_err(|e| VinyxError::io(&job.input, e))?;
    let (tranche, collection) = collection_names(&archive)?;

    let collection_dir = job.output.join(&tranche).join(&collection);
    if collection_dir.exists() {
        tokio::fs::remove_dir_all(&collection_dir)
            .await
            .map_err(|e| VinyxError::io(&collection_dir, e))?;
    }
    tokio::fs::create_dir_all(&collection_dir)
        .await
        .map_err(|e| VinyxError::io(&collection_dir, e))?;

    let durations = DurationLogger::new(collection_dir.join("durations.txt"));
    let ligands_dir = collection_dir.join("ligands");
    durations
        .log_time(
            &format!("Extracted archive {}", archive.display()),
            extract_tar_gz(&archive, &ligands_dir),
        )
        .await?;

    let mut ligands = find_ligands(&ligands_dir)?;
    let ligands_found = ligands.len();
    info!("{} ligands found.", ligands_found);
    if let Some(limit) = job.limit.filter(|&l| l < ligands_found) {
        info!("Only {} ligands will be analyzed.", limit);
        ligands.truncate(limit);
    }

    let batch = Batch {
        options: &job.vina,
        vina: VinaRunner::new(&job.vina_executable),
        obabel: OpenBabelRunner::new(&job.obabel_executable),
        results_file: collection_dir.join(RESULTS_FILE_NAME),
        origin: format!("{}_{}", tranche, collection),
        collection_dir: collection_dir.clone(),
        durations,
    };
    let (analyzed, failed) = batch
        .durations
        .log_time("Total duration", batch.dock_all(&ligands))
        .await;

    info!("{} ligands analyzed, {} failed.", analyzed, failed);
    Ok(AnalyzeResult {
        results_file: batch.results_file.clone(),
        collection_dir,
        ligands_found,
        analyzed,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        let (tranche, collection) =
            collection_names(Path::new("/data/AAAB/xaaa.xaa.tar.gz")).unwrap();
        assert_eq!(tranche, "AAAB");
        assert_eq!(collection, "xaaa");
    }

    #[test]
    fn test_collection_names_use_parent_stem() {
        let (tranche, _) = collection_names(Path::new("/data/H17P.v2/xaab.tar.gz")).unwrap();
        assert_eq!(tranche, "H17P");
    }

    #[test]
    fn test_collection_names_need_a_parent() {
        assert!(matches!(
            collection_names(Path::new("xaaa.tar.gz")),
            Err(VinyxError::Config(_))
        ));
    }
}
