// src/probers/dns.rs
use crate::mutator::Candidate;
use crate::probers::Prober;
use crate::resolver::CnameResolver;
use crate::types::{BucketFinderError, DnsConfig, Listing, ProbeKind, ProbeOutcome, NOT_FOUND_SENTINEL, STORAGE_DOMAIN};
use async_trait::async_trait;
use log::debug;

/// Classifies a candidate from the CNAME of its host name alone.
/// Faster than the HTTP strategy, and less precise: any single CNAME
/// that is not the provider's "no such bucket" target counts as open.
pub struct DnsProber {
    resolver: CnameResolver,
}

impl DnsProber {
    pub fn new(config: &DnsConfig) -> Result<Self, BucketFinderError> {
        Ok(Self {
            resolver: CnameResolver::new(config)?,
        })
    }
}

/// Map the records of a CNAME answer to an outcome.
pub fn classify_cname_answers(answers: &[String]) -> ProbeOutcome {
    match answers {
        [target] if target.contains(NOT_FOUND_SENTINEL) => ProbeOutcome::NotFound,
        [_] => ProbeOutcome::Open(Listing::Skipped),
        _ => ProbeOutcome::Inconclusive,
    }
}

#[async_trait]
impl Prober for DnsProber {
    fn name(&self) -> &str {
        "dns"
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Dns
    }

    fn target(&self, candidate: &Candidate) -> String {
        candidate.host(STORAGE_DOMAIN)
    }

    async fn probe(&self, candidate: &Candidate) -> ProbeOutcome {
        let host = self.target(candidate);
        match self.resolver.lookup_cname(&host).await {
            Ok(answers) => classify_cname_answers(&answers),
            Err(e) => {
                debug!("{}", e);
                ProbeOutcome::Inconclusive
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sentinel_answer_is_not_found() {
        assert_eq!(
            classify_cname_answers(&answers(&["s3-1-w.amazonaws.com."])),
            ProbeOutcome::NotFound
        );
    }

    #[test]
    fn test_other_single_answer_is_open() {
        assert_eq!(
            classify_cname_answers(&answers(&["s3-us-west-2-w.amazonaws.com."])),
            ProbeOutcome::Open(Listing::Skipped)
        );
    }

    #[test]
    fn test_zero_or_many_answers_are_inconclusive() {
        assert_eq!(classify_cname_answers(&[]), ProbeOutcome::Inconclusive);
        assert_eq!(
            classify_cname_answers(&answers(&["a.example.com.", "s3-1-w.amazonaws.com."])),
            ProbeOutcome::Inconclusive
        );
    }

    #[tokio::test]
    async fn test_target_is_storage_host() {
        let prober = DnsProber::new(&DnsConfig::default()).unwrap();
        assert_eq!(prober.target(&Candidate::new("acme")), "acme.s3.amazonaws.com");
    }
}
