// src/resolver.rs
use crate::types::{BucketFinderError, DnsConfig};
use std::net::SocketAddr;
use std::str::FromStr;
use trust_dns_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use trust_dns_resolver::proto::rr::RecordType;
use trust_dns_resolver::TokioAsyncResolver;

/// CNAME lookups against one fixed nameserver.
pub struct CnameResolver {
    resolver: TokioAsyncResolver,
}

impl CnameResolver {
    pub fn new(config: &DnsConfig) -> Result<Self, BucketFinderError> {
        let socket_addr = SocketAddr::from_str(&config.resolver).map_err(|e| {
            BucketFinderError::ConfigError(format!("Invalid nameserver address {}: {}", config.resolver, e))
        })?;

        let mut resolver_config = ResolverConfig::new();
        resolver_config.add_name_server(NameServerConfig {
            socket_addr,
            protocol: Protocol::Udp,
            tls_dns_name: None,
            trust_negative_responses: false,
            bind_addr: None,
        });

        let mut opts = ResolverOpts::default();
        opts.timeout = config.timeout;
        opts.attempts = 1;
        opts.cache_size = 0;

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts),
        })
    }

    /// Every record in the answer to a CNAME query for `hostname`.
    /// CNAME targets are rendered as fully qualified names; other record
    /// types keep their textual form so they still count toward the answer size.
    pub async fn lookup_cname(&self, hostname: &str) -> Result<Vec<String>, BucketFinderError> {
        let lookup = self
            .resolver
            .lookup(hostname, RecordType::CNAME)
            .await
            .map_err(|e| BucketFinderError::ResolutionError(format!("Failed to resolve {}: {}", hostname, e)))?;

        Ok(lookup
            .iter()
            .map(|rdata| match rdata.as_cname() {
                Some(cname) => cname.0.to_string(),
                None => rdata.to_string(),
            })
            .collect())
    }
}
