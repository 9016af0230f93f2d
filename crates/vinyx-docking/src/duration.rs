//! Wall-clock timing of analysis steps.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Times async steps, logging each duration and appending it to a file
/// (`durations.txt` in the collection directory).
#[derive(Debug, Clone)]
pub struct DurationLogger {
    path: PathBuf,
}

impl DurationLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Await `step` and record how long it took under `message`.
    ///
    /// Failing to write the durations file is logged, never returned: timing
    /// must not change the outcome of the step.
    pub async fn log_time<F, T>(&self, message: &str, step: F) -> T
    where
        F: Future<Output = T>,
    {
        let start = Instant::now();
        let result = step.await;
        let line = format!("{}: {:.3}s.", message, start.elapsed().as_secs_f64());
        info!("{}", line);
        if let Err(e) = self.append(&line).await {
            warn!("Could not write duration to {:?}: {}", self.path, e);
        }
        result
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await
    }
}
