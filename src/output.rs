// src/output.rs
use crate::dedup_log::DedupLog;
use crate::types::{Listing, OutputConfig, ProbeKind, ProbeOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

/// Result log categories, one file each under the output directory.
pub mod category {
    pub const OPEN: &str = "open";
    pub const PROTECTED: &str = "protected";
    pub const DNS_HIT: &str = "dns-hit";
    pub const EMPTY: &str = "empty";
    pub const OBJECTS: &str = "objects";
    /// Every hit, whatever the strategy.
    pub const FOUND: &str = "found";
}

#[derive(Debug, Clone, Copy)]
enum Color {
    Green,
    Yellow,
    Red,
    Cyan,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Green => "\x1b[1;32m",
            Color::Yellow => "\x1b[1;93m",
            Color::Red => "\x1b[1;31m",
            Color::Cyan => "\x1b[1;96m",
        }
    }
}

/// Routes probe outcomes to the result logs and the operator's terminal.
pub struct OutputManager {
    config: OutputConfig,
    log: DedupLog,
    progress: ProgressBar,
    show_progress: bool,
}

impl OutputManager {
    pub fn new(config: OutputConfig, log: DedupLog) -> Self {
        let show_progress = config.progress && !config.silent && atty::is(atty::Stream::Stderr);
        let progress = if show_progress {
            let bar = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({per_sec}, eta {eta}) {msg}",
            ) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        Self {
            config,
            log,
            progress,
            show_progress,
        }
    }

    pub fn log(&self) -> &DedupLog {
        &self.log
    }

    pub fn start(&self, total: usize, offset: usize) {
        self.progress.set_length(total as u64);
        self.progress.set_position(offset as u64);
    }

    pub fn advance(&self, candidate: &str) {
        self.progress.set_message(candidate.to_string());
        self.progress.inc(1);
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }

    /// Plain informational line, suppressed in silent mode.
    pub fn note(&self, text: &str) {
        if !self.config.silent {
            self.status(Color::Cyan, text);
        }
    }

    fn status(&self, color: Color, text: &str) {
        let line = if self.config.color {
            format!("{}{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        };

        if self.show_progress {
            self.progress.println(line);
        } else {
            println!("{}", line);
        }
    }

    async fn append(&self, category: &str, line: &str) {
        if let Err(e) = self.log.write(category, line).await {
            warn!("Could not write {:?} to the {} log: {}", line, category, e);
        }
    }

    /// Print and persist a hit. Misses and inconclusive probes leave no trace.
    pub async fn record(&self, kind: ProbeKind, target: &str, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Open(listing) => {
                match kind {
                    ProbeKind::Http => {
                        self.status(Color::Green, &format!("Open: {}", target));
                        self.append(category::OPEN, target).await;
                    }
                    ProbeKind::Dns => {
                        self.status(Color::Green, &format!("DNS hit: {}", target));
                        self.append(category::DNS_HIT, target).await;
                    }
                }
                self.record_listing(target, listing).await;
            }
            ProbeOutcome::Protected => {
                self.status(Color::Yellow, &format!("Protected: {}", target));
                self.append(category::PROTECTED, target).await;
            }
            ProbeOutcome::NotFound | ProbeOutcome::Inconclusive => {}
        }

        if outcome.is_hit() {
            self.append(category::FOUND, target).await;
        }
    }

    async fn record_listing(&self, target: &str, listing: &Listing) {
        match listing {
            Listing::Keys(keys) => {
                for key in keys {
                    let object = format!("{}/{}", target, key);
                    self.status(Color::Cyan, &object);
                    self.append(category::OBJECTS, &object).await;
                }
            }
            Listing::Empty => {
                self.status(Color::Red, &format!("Empty bucket: {}", target));
                self.append(category::EMPTY, target).await;
            }
            Listing::Skipped | Listing::Malformed(_) => {}
        }
    }
}
