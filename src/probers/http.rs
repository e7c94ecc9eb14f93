// src/probers/http.rs
use crate::mutator::Candidate;
use crate::probers::{ListingParser, Prober};
use crate::session::Session;
use crate::types::{AddressingStyle, BucketFinderError, HttpConfig, Listing, ProbeKind, ProbeOutcome};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use url::Url;

/// Classifies a candidate by the status of a single GET on its container URL.
pub struct HttpProber {
    session: Session,
    endpoint: String,
    addressing: AddressingStyle,
    enumerate: bool,
    parser: ListingParser,
}

impl HttpProber {
    pub fn new(config: &HttpConfig, enumerate: bool) -> Result<Self, BucketFinderError> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let base = match config.addressing {
            AddressingStyle::VirtualHost => format!("https://{}", endpoint),
            AddressingStyle::Path => endpoint.clone(),
        };
        let url = Url::parse(&base)
            .map_err(|e| BucketFinderError::ConfigError(format!("Invalid endpoint {}: {}", config.endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(BucketFinderError::ConfigError(format!(
                "Endpoint {} is not an http(s) URL",
                config.endpoint
            )));
        }

        Ok(Self {
            session: Session::new(config)?,
            endpoint,
            addressing: config.addressing,
            enumerate,
            parser: ListingParser::new()?,
        })
    }

    async fn read_listing(&self, url: &str, response: reqwest::Response) -> Listing {
        if !self.enumerate {
            return Listing::Skipped;
        }

        let is_xml = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("xml"))
            .unwrap_or(false);
        if !is_xml {
            return Listing::Skipped;
        }

        let listing = match response.text().await {
            Ok(body) => self.parser.parse(&body),
            Err(e) => Listing::Malformed(format!("failed to read body: {}", e)),
        };

        if let Listing::Malformed(reason) = &listing {
            warn!("{}: listing parse error: {}", url, reason);
        }
        listing
    }
}

#[async_trait]
impl Prober for HttpProber {
    fn name(&self) -> &str {
        "http"
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::Http
    }

    fn target(&self, candidate: &Candidate) -> String {
        match self.addressing {
            AddressingStyle::VirtualHost => format!("https://{}", candidate.host(&self.endpoint)),
            AddressingStyle::Path => format!("{}/{}", self.endpoint, candidate),
        }
    }

    async fn probe(&self, candidate: &Candidate) -> ProbeOutcome {
        let url = self.target(candidate);

        let response = match self.session.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                debug!("{}: request failed: {}", url, e);
                return ProbeOutcome::Inconclusive;
            }
        };

        match response.status() {
            StatusCode::OK => ProbeOutcome::Open(self.read_listing(&url, response).await),
            StatusCode::FORBIDDEN => ProbeOutcome::Protected,
            StatusCode::NOT_FOUND => ProbeOutcome::NotFound,
            status => {
                debug!("{}: unhandled status {}", url, status);
                ProbeOutcome::Inconclusive
            }
        }
    }
}
