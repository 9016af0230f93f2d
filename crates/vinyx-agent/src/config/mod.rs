//! Configuration loading for Vinyx.
//! Reads the TOML file given by `--config` or the VINYX_CONFIG env var.
//! Every value here can be overridden by a command-line flag or its env var.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub analyze: AnalyzeConfig,
    #[serde(default)]
    pub collect: CollectConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzeConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub receptor: Option<PathBuf>,
    pub center_x: Option<f64>,
    pub center_y: Option<f64>,
    pub center_z: Option<f64>,
    pub size_x: Option<f64>,
    pub size_y: Option<f64>,
    pub size_z: Option<f64>,
    pub flex: Option<String>,
    pub cpu: Option<u32>,
    pub seed: Option<i64>,
    pub exhaustiveness: Option<u32>,
    pub num_modes: Option<u32>,
    pub energy_range: Option<u32>,
    pub weight_hydrogen: Option<f64>,
    pub limit: Option<usize>,
    pub vina: Option<PathBuf>,
    pub obabel: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub limit: Option<usize>,
    pub percentage: Option<u8>,
}

pub fn default_analyze_output() -> PathBuf { PathBuf::from("./out") }
pub fn default_vina()           -> PathBuf { PathBuf::from("vina") }
pub fn default_obabel()         -> PathBuf { PathBuf::from("obabel") }

mod tests;

impl Config {
    /// Load configuration from `path`, or from VINYX_CONFIG when no path is given.
    /// With neither set, every section is empty and flags must supply the values.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match std::env::var_os("VINYX_CONFIG") {
                Some(p) => PathBuf::from(p),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
