// src/types.rs
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Storage provider domain every candidate is probed under.
pub const STORAGE_DOMAIN: &str = "s3.amazonaws.com";

/// CNAME target the provider answers with for containers that do not exist.
pub const NOT_FOUND_SENTINEL: &str = "s3-1-w.amazonaws.com.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub workers: usize,
    pub delay: Duration,
    pub output_dir: PathBuf,
    pub resume: bool,
    pub skip: Option<usize>,
    pub dns_only: bool,
    pub enumerate: bool,
    pub http: HttpConfig,
    pub dns: DnsConfig,
    pub output: OutputConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            delay: Duration::from_millis(1000),
            output_dir: PathBuf::from("bucketfinder-out"),
            resume: false,
            skip: None,
            dns_only: false,
            enumerate: false,
            http: HttpConfig::default(),
            dns: DnsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ScanConfig {
    pub fn mode(&self) -> DispatchMode {
        if self.workers <= 1 {
            DispatchMode::Sequential
        } else {
            DispatchMode::Concurrent(self.workers)
        }
    }

    pub fn progress_path(&self) -> PathBuf {
        self.output_dir.join("progress.txt")
    }

    pub fn stats_path(&self) -> PathBuf {
        self.output_dir.join("stats.json")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchMode {
    Sequential,
    Concurrent(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub proxy: Option<String>,
    /// Host the candidates are addressed under.
    pub endpoint: String,
    pub addressing: AddressingStyle,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("BucketFinder/{}", env!("CARGO_PKG_VERSION")),
            proxy: None,
            endpoint: STORAGE_DOMAIN.to_string(),
            addressing: AddressingStyle::VirtualHost,
        }
    }
}

/// How a candidate is placed into the request URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressingStyle {
    /// `https://<candidate>.<endpoint>`
    VirtualHost,
    /// `<endpoint>/<candidate>`, endpoint carries its own scheme.
    Path,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    pub resolver: String,
    pub timeout: Duration,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            resolver: "8.8.8.8:53".to_string(),
            timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub silent: bool,
    pub color: bool,
    pub progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            silent: false,
            color: true,
            progress: true,
        }
    }
}

/// Which strategy produced an outcome; decides the log category of a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Http,
    Dns,
}

/// Result of a container listing fetched alongside an open probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Enumeration disabled, or the response was not a listing payload.
    Skipped,
    Keys(Vec<String>),
    Empty,
    /// The body claimed to be a listing but could not be read as one.
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open(Listing),
    Protected,
    NotFound,
    Inconclusive,
}

impl ProbeOutcome {
    /// Whether the outcome is recorded in the result logs.
    pub fn is_hit(&self) -> bool {
        matches!(self, ProbeOutcome::Open(_) | ProbeOutcome::Protected)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub generated: usize,
    pub duplicates: usize,
    pub total: usize,
    pub start_offset: usize,
    pub probed: usize,
    pub open: usize,
    pub protected: usize,
    pub not_found: usize,
    pub inconclusive: usize,
    pub duration: Duration,
    pub started_at: String,
}

impl ScanStats {
    pub fn record(&mut self, outcome: &ProbeOutcome) {
        self.probed += 1;
        match outcome {
            ProbeOutcome::Open(_) => self.open += 1,
            ProbeOutcome::Protected => self.protected += 1,
            ProbeOutcome::NotFound => self.not_found += 1,
            ProbeOutcome::Inconclusive => self.inconclusive += 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum BucketFinderError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Resolution error: {0}")]
    ResolutionError(String),

    #[error("Checkpoint error: {0}")]
    CheckpointError(String),

    #[error("Output error: {0}")]
    OutputError(String),
}
