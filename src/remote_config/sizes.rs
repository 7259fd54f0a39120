//! Asset size enrichment.
//!
//! # Responsibilities
//! - Issue one HEAD request per `(file, selector)` pair, concurrently
//! - Bound every request with its own timeout
//! - Collect a structured outcome per entry and apply the ones that succeeded
//!
//! # Design Decisions
//! - A failed lookup only leaves that entry's `size` unset; it never fails
//!   the refresh
//! - The size comes from the `Content-Length` header, not the body

use std::time::Duration;

use futures_util::future::join_all;
use reqwest::header::CONTENT_LENGTH;

use crate::observability::metrics;
use crate::remote_config::document::ConfigDocument;

/// Result of reading one variant's size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeOutcome {
    pub file: String,
    pub selector: String,
    pub url: String,
    pub result: Result<u64, String>,
}

/// Summary of an enrichment pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeReport {
    pub resolved: usize,
    pub missing: usize,
}

/// Reads asset sizes with HEAD requests.
#[derive(Clone)]
pub struct SizeFetcher {
    client: reqwest::Client,
}

impl SizeFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Look up every variant's size and write the results into `document`.
    pub async fn enrich(&self, document: &mut ConfigDocument) -> SizeReport {
        let outcomes = self.fetch_all(document).await;
        apply_outcomes(document, outcomes)
    }

    /// Look up every variant's size without touching the document.
    pub async fn fetch_all(&self, document: &ConfigDocument) -> Vec<SizeOutcome> {
        let requests = document.files.iter().flat_map(|file| {
            file.versions.iter().map(move |(selector, version)| {
                self.fetch_one(&file.name, selector, &version.location.url)
            })
        });

        join_all(requests).await
    }

    async fn fetch_one(&self, file: &str, selector: &str, url: &str) -> SizeOutcome {
        let result = self.head(url).await;
        SizeOutcome {
            file: file.to_string(),
            selector: selector.to_string(),
            url: url.to_string(),
            result,
        }
    }

    async fn head(&self, url: &str) -> Result<u64, String> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { "timed out".to_string() } else { e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("unexpected status {}", status));
        }

        // reqwest's content_length() reports the empty HEAD body, not the asset
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| "missing or invalid content-length".to_string())
    }
}

/// Write successful outcomes into `document`, log the failures.
pub fn apply_outcomes(document: &mut ConfigDocument, outcomes: Vec<SizeOutcome>) -> SizeReport {
    let mut report = SizeReport::default();

    for outcome in outcomes {
        let version = document
            .files
            .iter_mut()
            .find(|f| f.name == outcome.file)
            .and_then(|f| f.versions.get_mut(&outcome.selector));

        let Some(version) = version else {
            continue;
        };

        match outcome.result {
            Ok(size) => {
                version.size = Some(size);
                report.resolved += 1;
            }
            Err(error) => {
                version.size = None;
                report.missing += 1;
                metrics::record_size_failure(&outcome.file);
                tracing::warn!(
                    file = %outcome.file,
                    selector = %outcome.selector,
                    url = %outcome.url,
                    error = %error,
                    "Failed to retrieve asset size"
                );
            }
        }
    }

    report
}
