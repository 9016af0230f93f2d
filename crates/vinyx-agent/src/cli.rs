//! Command-line interface: `vinyx analyze` and `vinyx collect`.
//!
//! Every flag also reads an upper-case environment variable of the same
//! name. Values missing from both fall back to the config file, then to
//! the built-in defaults.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vinyx_collect::pipeline::DEFAULT_OUTPUT;
use vinyx_collect::threshold::DEFAULT_PERCENTAGE;
use vinyx_collect::CollectJob;
use vinyx_docking::docking::VinaOptions;
use vinyx_docking::AnalyzeJob;

use crate::config::{self, AnalyzeConfig, CollectConfig};

const VINA_HELP: &str = "See vina --help";

#[derive(Debug, Parser)]
#[command(name = "vinyx", version, about = "Virtual screening with AutoDock Vina")]
pub struct Cli {
    /// TOML file supplying values for any flag not given
    #[arg(long, global = true, env = "VINYX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a receptor with a .tar.gz collection
    Analyze(AnalyzeArgs),
    /// Collect results from previous analysis runs
    Collect(CollectArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// The .tar.gz archive containing the ligands
    #[arg(long, env = "INPUT")]
    pub input: Option<PathBuf>,
    /// The path where output will be saved [default: ./out]
    #[arg(long, env = "OUTPUT")]
    pub output: Option<PathBuf>,
    #[arg(long, env = "RECEPTOR", help = VINA_HELP)]
    pub receptor: Option<PathBuf>,
    #[arg(long, alias = "center_x", env = "CENTER_X", allow_hyphen_values = true, help = VINA_HELP)]
    pub center_x: Option<f64>,
    #[arg(long, alias = "center_y", env = "CENTER_Y", allow_hyphen_values = true, help = VINA_HELP)]
    pub center_y: Option<f64>,
    #[arg(long, alias = "center_z", env = "CENTER_Z", allow_hyphen_values = true, help = VINA_HELP)]
    pub center_z: Option<f64>,
    #[arg(long, alias = "size_x", env = "SIZE_X", help = VINA_HELP)]
    pub size_x: Option<f64>,
    #[arg(long, alias = "size_y", env = "SIZE_Y", help = VINA_HELP)]
    pub size_y: Option<f64>,
    #[arg(long, alias = "size_z", env = "SIZE_Z", help = VINA_HELP)]
    pub size_z: Option<f64>,
    #[arg(long, env = "FLEX", help = VINA_HELP)]
    pub flex: Option<String>,
    #[arg(long, env = "CPU", help = VINA_HELP)]
    pub cpu: Option<u32>,
    #[arg(long, env = "SEED", allow_hyphen_values = true, help = VINA_HELP)]
    pub seed: Option<i64>,
    #[arg(long, env = "EXHAUSTIVENESS", help = VINA_HELP)]
    pub exhaustiveness: Option<u32>,
    #[arg(long, alias = "num_modes", env = "NUM_MODES", help = VINA_HELP)]
    pub num_modes: Option<u32>,
    #[arg(long, alias = "energy_range", env = "ENERGY_RANGE", help = VINA_HELP)]
    pub energy_range: Option<u32>,
    #[arg(long, alias = "weight_hydrogen", env = "WEIGHT_HYDROGEN", allow_hyphen_values = true, help = VINA_HELP)]
    pub weight_hydrogen: Option<f64>,
    /// Limit the number of ligands analysed. 0 or unset means no limit
    #[arg(long, env = "LIMIT")]
    pub limit: Option<usize>,
    /// AutoDock Vina executable [default: vina]
    #[arg(long, env = "VINA")]
    pub vina: Option<PathBuf>,
    /// Open Babel executable [default: obabel]
    #[arg(long, env = "OBABEL")]
    pub obabel: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// The input directory under which to search for analysis output
    #[arg(long, env = "INPUT")]
    pub input: Option<PathBuf>,
    /// The output file where collected results will be saved [default: ./out/collected_output.csv]
    #[arg(long, env = "OUTPUT")]
    pub output: Option<PathBuf>,
    /// A limit on the number of results to return, within the top percentage. 0 or unset means no limit
    #[arg(long, env = "LIMIT")]
    pub limit: Option<usize>,
    /// The top percentage of results to collect [default: 10]
    #[arg(long, env = "PERCENTAGE", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub percentage: Option<u8>,
}

/// Both the CLI and the config file use 0 for "no limit".
fn non_zero(limit: Option<usize>) -> Option<usize> {
    limit.filter(|&l| l > 0)
}

fn required<T>(value: Option<T>, flag: &str) -> anyhow::Result<T> {
    value.with_context(|| format!("missing required option --{} (flag, env var or config file)", flag))
}

impl AnalyzeArgs {
    /// Merge flags over the `[analyze]` config section.
    pub fn resolve(self, file: AnalyzeConfig) -> anyhow::Result<AnalyzeJob> {
        let vina = VinaOptions {
            receptor: required(self.receptor.or(file.receptor), "receptor")?,
            center_x: required(self.center_x.or(file.center_x), "center-x")?,
            center_y: required(self.center_y.or(file.center_y), "center-y")?,
            center_z: required(self.center_z.or(file.center_z), "center-z")?,
            size_x: required(self.size_x.or(file.size_x), "size-x")?,
            size_y: required(self.size_y.or(file.size_y), "size-y")?,
            size_z: required(self.size_z.or(file.size_z), "size-z")?,
            flex: self.flex.or(file.flex),
            cpu: self.cpu.or(file.cpu),
            seed: self.seed.or(file.seed),
            exhaustiveness: self.exhaustiveness.or(file.exhaustiveness),
            num_modes: self.num_modes.or(file.num_modes),
            energy_range: self.energy_range.or(file.energy_range),
            weight_hydrogen: self.weight_hydrogen.or(file.weight_hydrogen),
        };

        let input = required(self.input.or(file.input), "input")?;
        if !input.exists() {
            anyhow::bail!("Input archive not found: {}", input.display());
        }
        if !vina.receptor.exists() {
            anyhow::bail!("Receptor not found: {}", vina.receptor.display());
        }

        Ok(AnalyzeJob {
            input,
            output: self.output.or(file.output).unwrap_or_else(config::default_analyze_output),
            vina,
            limit: non_zero(self.limit.or(file.limit)),
            vina_executable: self.vina.or(file.vina).unwrap_or_else(config::default_vina),
            obabel_executable: self.obabel.or(file.obabel).unwrap_or_else(config::default_obabel),
        })
    }
}

impl CollectArgs {
    /// Merge flags over the `[collect]` config section.
    pub fn resolve(self, file: CollectConfig) -> anyhow::Result<CollectJob> {
        let input = required(self.input.or(file.input), "input")?;
        if !input.is_dir() {
            anyhow::bail!("Input directory not found: {}", input.display());
        }
        let percentage = self.percentage.or(file.percentage).unwrap_or(DEFAULT_PERCENTAGE);
        if percentage > 100 {
            anyhow::bail!("--percentage must be between 0 and 100, got {}", percentage);
        }

        Ok(CollectJob {
            input,
            output: self.output.or(file.output).unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            percentage,
            limit: non_zero(self.limit.or(file.limit)),
        })
    }
}
