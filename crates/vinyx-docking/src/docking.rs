//! Molecular docking using AutoDock Vina.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};
use vinyx_common::error::{Result, VinyxError};

/// Receptor, search box and solver settings shared by every ligand of a run.
///
/// Optional settings are only passed to Vina when set, leaving Vina's own
/// defaults in place otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct VinaOptions {
    pub receptor: PathBuf,
    pub center_x: f64,
    pub center_y: f64,
    pub center_z: f64,
    pub size_x: f64,
    pub size_y: f64,
    pub size_z: f64,
    pub flex: Option<String>,
    pub cpu: Option<u32>,
    pub seed: Option<i64>,
    pub exhaustiveness: Option<u32>,
    pub num_modes: Option<u32>,
    pub energy_range: Option<u32>,
    pub weight_hydrogen: Option<f64>,
}

impl VinaOptions {
    /// `--name value` pairs for every configured setting, receptor first.
    pub fn to_args(&self) -> Vec<(&'static str, OsString)> {
        let mut args: Vec<(&'static str, OsString)> = vec![
            ("--receptor", self.receptor.clone().into_os_string()),
            ("--center_x", self.center_x.to_string().into()),
            ("--center_y", self.center_y.to_string().into()),
            ("--center_z", self.center_z.to_string().into()),
            ("--size_x", self.size_x.to_string().into()),
            ("--size_y", self.size_y.to_string().into()),
            ("--size_z", self.size_z.to_string().into()),
        ];
        if let Some(ref flex) = self.flex {
            args.push(("--flex", flex.into()));
        }
        if let Some(cpu) = self.cpu {
            args.push(("--cpu", cpu.to_string().into()));
        }
        if let Some(seed) = self.seed {
            args.push(("--seed", seed.to_string().into()));
        }
        if let Some(exhaustiveness) = self.exhaustiveness {
            args.push(("--exhaustiveness", exhaustiveness.to_string().into()));
        }
        if let Some(num_modes) = self.num_modes {
            args.push(("--num_modes", num_modes.to_string().into()));
        }
        if let Some(energy_range) = self.energy_range {
            args.push(("--energy_range", energy_range.to_string().into()));
        }
        if let Some(weight_hydrogen) = self.weight_hydrogen {
            args.push(("--weight_hydrogen", weight_hydrogen.to_string().into()));
        }
        args
    }
}

/// Files produced for one docked ligand.
#[derive(Debug, Clone)]
pub struct DockingTarget {
    pub ligand: PathBuf,
    /// Docked poses (`output.pdbqt`).
    pub out: PathBuf,
    /// Vina's log, holding the affinity table (`vina-log.txt`).
    pub log: PathBuf,
}

/// Wrapper for AutoDock Vina execution.
pub struct VinaRunner {
    executable_path: PathBuf,
}

impl VinaRunner {
    /// Create a new VinaRunner.
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
        }
    }

    /// Dock one ligand and return the best-mode affinity (kcal/mol) as Vina
    /// printed it.
    pub async fn run(&self, options: &VinaOptions, target: &DockingTarget) -> Result<String> {
        let mut args: Vec<(&'static str, OsString)> = vec![
            ("--out", target.out.clone().into_os_string()),
            ("--log", target.log.clone().into_os_string()),
            ("--ligand", target.ligand.clone().into_os_string()),
        ];
        args.extend(options.to_args());

        let mut message = String::from("Running vina with the following settings:");
        for (name, value) in &args {
            message.push_str(&format!("\n  {}: {}", name, value.to_string_lossy()));
        }
        info!("{}", message);

        let output = Command::new(&self.executable_path)
            .args(args.iter().flat_map(|(name, value)| [OsString::from(*name), value.clone()]))
            .output()
            .await
            .map_err(|e| VinyxError::io(&self.executable_path, e))?;

        if !output.status.success() {
            return Err(VinyxError::ExternalProcess {
                program: "vina".to_string(),
                input: format!(
                    "receptor: {}, ligand: {}",
                    options.receptor.display(),
                    target.ligand.display()
                ),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let log_text = tokio::fs::read_to_string(&target.log)
            .await
            .map_err(|e| VinyxError::io(&target.log, e))?;
        let affinity = parse_affinity(&log_text, &target.log)?;
        debug!("AutoDock Vina completed for {:?}: {} kcal/mol", target.ligand, affinity);
        Ok(affinity)
    }
}

/// Lines between the `affinity` header and the first mode row.
const FIRST_MODE_OFFSET: usize = 3;

/// Extract the best-mode affinity from a Vina log.
///
/// The result table starts at the first occurrence of `affinity`; the first
/// mode is three lines below it and its second column is the affinity. The
/// token is returned verbatim once it has been checked to be a number.
pub fn parse_affinity(log_text: &str, log_path: &Path) -> Result<String> {
    let Some(start) = log_text.find("affinity") else {
        return Err(VinyxError::parse(log_path, 0, "no affinity table in vina log"));
    };
    let line_no = log_text[..start].matches('\n').count() + FIRST_MODE_OFFSET + 1;

    let field = log_text[start..]
        .lines()
        .nth(FIRST_MODE_OFFSET)
        .and_then(|l| l.split_whitespace().nth(1))
        .ok_or_else(|| VinyxError::parse(log_path, line_no as u64, "missing first docking mode"))?;

    let affinity: f64 = field.parse().map_err(|_| {
        VinyxError::parse(log_path, line_no as u64, format!("invalid affinity '{}'", field))
    })?;
    if affinity.is_nan() {
        return Err(VinyxError::parse(log_path, line_no as u64, "affinity is not a number"));
    }
    Ok(field.to_string())
}
