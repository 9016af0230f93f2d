//! Vinyx Docking - Batch docking of a ligand collection.
//!
//! For one `.tar.gz` collection of ligands this crate:
//! 1. Extracts the archive
//! 2. Docks every ligand against the receptor (AutoDock Vina)
//! 3. Converts the best pose to SMILES (Open Babel)
//! 4. Appends one result line per ligand to the collection's `output.txt`

pub mod archive;
pub mod convert;
pub mod docking;
pub mod duration;
pub mod pipeline;

pub use pipeline::{run_analyze, AnalyzeJob, AnalyzeResult};
