use crate::checkpoint::Checkpoint;
use crate::dedup_log::DedupLog;
use crate::dispatcher::ProbeDispatcher;
use crate::error::Result;
use crate::mutator::{Candidate, MutationSpec, NameMutator};
use crate::output::OutputManager;
use crate::probers::{create_prober, Prober};
use crate::types::{ScanConfig, ScanStats};
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;

/// One scan from keywords to result logs.
pub struct ScanEngine {
    config: ScanConfig,
    spec: MutationSpec,
}

impl ScanEngine {
    pub fn new(config: ScanConfig, spec: MutationSpec) -> Self {
        Self { config, spec }
    }

    /// The deduplicated candidate set and the number of duplicates dropped.
    pub fn candidates(&self) -> (Vec<Candidate>, usize) {
        let (candidates, duplicates) = NameMutator::new(&self.spec).candidates();
        info!(
            "Generated {} candidates from {} keywords ({} duplicates removed)",
            candidates.len(),
            self.spec.keywords.len(),
            duplicates
        );
        (candidates, duplicates)
    }

    /// Index the scan starts from: an explicit skip wins over saved progress.
    pub async fn start_offset(&self, checkpoint: &Checkpoint, total: usize) -> Result<usize> {
        if let Some(skip) = self.config.skip {
            if skip > total {
                warn!("Skip index {} is past the last of {} candidates", skip, total);
            }
            return Ok(skip.min(total));
        }

        if self.config.resume {
            let offset = checkpoint.restore().await?;
            info!("Resuming from candidate {} of {}", offset, total);
            return Ok(offset);
        }

        Ok(0)
    }

    pub async fn run(&self) -> Result<ScanStats> {
        let prober = create_prober(&self.config)?;
        self.run_with(prober).await
    }

    /// Run the scan with an explicit probing strategy.
    pub async fn run_with(&self, prober: Arc<dyn Prober>) -> Result<ScanStats> {
        let started_at = chrono::Utc::now().to_rfc3339();
        let start_time = Instant::now();
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let (candidates, duplicates) = self.candidates();
        let generated = candidates.len() + duplicates;

        let checkpoint = Checkpoint::new(self.config.progress_path());
        let start = self.start_offset(&checkpoint, candidates.len()).await?;

        let log = DedupLog::new(self.config.output_dir.clone());
        let output = Arc::new(OutputManager::new(self.config.output.clone(), log));
        output.note(&format!(
            "Scanning {} candidates, results in {}",
            candidates.len(),
            self.config.output_dir.display()
        ));

        let dispatcher = ProbeDispatcher::new(prober, output, self.config.mode(), self.config.delay)
            .with_checkpoint(checkpoint);

        let mut stats = dispatcher.run(candidates, start).await?;
        stats.generated = generated;
        stats.duplicates = duplicates;
        stats.duration = start_time.elapsed();
        stats.started_at = started_at;

        self.write_stats(&stats).await;
        Ok(stats)
    }

    async fn write_stats(&self, stats: &ScanStats) {
        let path = self.config.stats_path();
        let json = match serde_json::to_string_pretty(stats) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize scan statistics: {}", e);
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&path, json).await {
            warn!("Failed to write {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BucketFinderError;

    fn engine(config: ScanConfig) -> ScanEngine {
        let spec = MutationSpec::new(vec!["acme".to_string()], vec!["dev".to_string()], vec![], vec![]);
        ScanEngine::new(config, spec)
    }

    #[test]
    fn test_candidates_are_unique() {
        let (candidates, duplicates) = engine(ScanConfig::default()).candidates();
        assert_eq!(candidates.len(), 7);
        assert_eq!(duplicates, 0);
        assert_eq!(candidates[0].as_str(), "acme");
    }

    #[tokio::test]
    async fn test_start_offset_prefers_skip() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = Checkpoint::new(dir.path().join("progress.txt"));
        checkpoint.save(2).await.unwrap();

        let config = ScanConfig {
            resume: true,
            skip: Some(5),
            ..ScanConfig::default()
        };
        assert_eq!(engine(config).start_offset(&checkpoint, 7).await.unwrap(), 5);

        let config = ScanConfig {
            skip: Some(50),
            ..ScanConfig::default()
        };
        assert_eq!(engine(config).start_offset(&checkpoint, 7).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_start_offset_from_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = Checkpoint::new(dir.path().join("progress.txt"));
        checkpoint.save(4).await.unwrap();

        let resumed = ScanConfig {
            resume: true,
            ..ScanConfig::default()
        };
        assert_eq!(engine(resumed).start_offset(&checkpoint, 7).await.unwrap(), 4);
        assert_eq!(engine(ScanConfig::default()).start_offset(&checkpoint, 7).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_resume_with_bad_checkpoint_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = Checkpoint::new(dir.path().join("progress.txt"));
        tokio::fs::write(checkpoint.path(), "four").await.unwrap();

        let resumed = ScanConfig {
            resume: true,
            ..ScanConfig::default()
        };
        assert!(matches!(
            engine(resumed).start_offset(&checkpoint, 7).await,
            Err(BucketFinderError::CheckpointError(_))
        ));
    }
}
