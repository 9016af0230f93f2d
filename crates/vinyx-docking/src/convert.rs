//! Pose to SMILES conversion using Open Babel.

use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};
use vinyx_common::error::{Result, VinyxError};

/// Wrapper for `obabel` execution.
pub struct OpenBabelRunner {
    executable_path: PathBuf,
}

impl OpenBabelRunner {
    /// Create a new OpenBabelRunner.
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
        }
    }

    /// Convert a docked `.pdbqt` pose to SMILES, written to `output_path`.
    ///
    /// Returns the SMILES string of the first molecule in the output.
    pub async fn run(&self, input_path: &Path, output_path: &Path) -> Result<String> {
        info!("Running open babel on {:?}", input_path);

        let output = Command::new(&self.executable_path)
            .arg("-i")
            .arg("pdbqt")
            .arg(input_path)
            .arg("-o")
            .arg("smi")
            .arg("-O")
            .arg(output_path)
            .output()
            .await
            .map_err(|e| VinyxError::io(&self.executable_path, e))?;

        if !output.status.success() {
            return Err(VinyxError::ExternalProcess {
                program: "open babel".to_string(),
                input: format!("input: {}, output: {}", input_path.display(), output_path.display()),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let text = tokio::fs::read_to_string(output_path)
            .await
            .map_err(|e| VinyxError::io(output_path, e))?;
        let smiles = first_smiles(&text, output_path)?;
        debug!("open babel completed successfully. SMILES {}", smiles);
        Ok(smiles)
    }
}

/// First whitespace-separated token of the first line of a `.smi` file.
pub fn first_smiles(text: &str, path: &Path) -> Result<String> {
    text.lines()
        .next()
        .and_then(|l| l.split_whitespace().next())
        .map(str::to_string)
        .ok_or_else(|| VinyxError::parse(path, 1, "no SMILES in open babel output"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_smiles_drops_title() {
        let smi = "CC(=O)Oc1ccccc1C(=O)O\t/out/AA/xaaa/ZINC01/output.pdbqt\nCCO\tsecond\n";
        assert_eq!(
            first_smiles(smi, Path::new("output.smi")).unwrap(),
            "CC(=O)Oc1ccccc1C(=O)O"
        );
    }

    #[test]
    fn test_empty_output_is_error() {
        assert!(matches!(
            first_smiles("", Path::new("output.smi")),
            Err(VinyxError::Parse { line: 1, .. })
        ));
    }
}
