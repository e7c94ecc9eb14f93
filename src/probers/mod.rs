// src/probers/mod.rs
use crate::error::Result;
use crate::mutator::Candidate;
use crate::types::{ProbeKind, ProbeOutcome, ScanConfig};
use async_trait::async_trait;
use std::sync::Arc;

mod dns;
mod http;
mod listing;

pub use dns::{classify_cname_answers, DnsProber};
pub use http::HttpProber;
pub use listing::ListingParser;

/// One strategy for deciding whether a candidate container exists.
#[async_trait]
pub trait Prober: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> ProbeKind;
    /// Address written to the result logs for a hit on `candidate`.
    fn target(&self, candidate: &Candidate) -> String;
    /// Exactly one network check, never retried.
    async fn probe(&self, candidate: &Candidate) -> ProbeOutcome;
}

/// Build the strategy selected by the configuration.
pub fn create_prober(config: &ScanConfig) -> Result<Arc<dyn Prober>> {
    if config.dns_only {
        Ok(Arc::new(DnsProber::new(&config.dns)?))
    } else {
        Ok(Arc::new(HttpProber::new(&config.http, config.enumerate)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_prober_selects_strategy() {
        let config = ScanConfig::default();
        let prober = create_prober(&config).expect("http prober");
        assert_eq!(prober.kind(), ProbeKind::Http);

        let config = ScanConfig {
            dns_only: true,
            ..ScanConfig::default()
        };
        let prober = create_prober(&config).expect("dns prober");
        assert_eq!(prober.kind(), ProbeKind::Dns);
        assert_eq!(prober.name(), "dns");
    }
}
