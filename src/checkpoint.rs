// src/checkpoint.rs
use crate::error::{ErrorContext, Result};
use crate::types::BucketFinderError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Position of a scan inside its candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    offset: usize,
    total: usize,
}

impl ScanProgress {
    pub fn new(offset: usize, total: usize) -> Result<Self> {
        if offset > total {
            return Err(BucketFinderError::CheckpointError(format!(
                "offset {} is beyond the {} candidates of this scan",
                offset, total
            )));
        }
        Ok(Self { offset, total })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.total - self.offset
    }
}

/// Progress file holding the number of candidates already completed, as
/// decimal ASCII. That count is also the index the next run starts from.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    path: PathBuf,
}

impl Checkpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the stored offset.
    pub async fn save(&self, offset: usize) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(&self.path, offset.to_string())
            .await
            .checkpoint_context(|| format!("Failed to write {}", self.path.display()))
    }

    /// Read the stored offset. An empty file means nothing was completed yet.
    pub async fn restore(&self) -> Result<usize> {
        let contents = fs::read_to_string(&self.path)
            .await
            .checkpoint_context(|| format!("Failed to read {}", self.path.display()))?;

        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed
            .parse::<usize>()
            .checkpoint_context(|| format!("Invalid offset {:?} in {}", trimmed, self.path.display()))
    }

    /// Truncate after the whole candidate set has been probed.
    pub async fn clear(&self) -> Result<()> {
        match fs::metadata(&self.path).await {
            Ok(_) => fs::write(&self.path, "")
                .await
                .checkpoint_context(|| format!("Failed to truncate {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
