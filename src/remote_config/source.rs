//! Where candidate documents come from.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use serde_json::Value;

use crate::remote_config::error::RemoteConfigError;
use crate::resilience::{retry_with_backoff, RetryPolicy};

/// Result of asking a source for the document.
#[derive(Debug)]
pub enum Fetched {
    /// The source knows nothing changed since the marker it was given.
    Unmodified,

    /// A candidate document, plus the marker to remember if it is accepted.
    Document {
        body: Value,
        modified: Option<SystemTime>,
    },
}

/// A provider of raw candidate documents.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Human readable origin for logs and errors.
    fn describe(&self) -> String;

    /// Fetch the document. `last_modified` is the marker recorded at the
    /// last accepted refresh, if any.
    async fn fetch(&self, last_modified: Option<SystemTime>) -> Result<Fetched, RemoteConfigError>;
}

/// Fetches the document from the asset host over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    retry: RetryPolicy,
}

impl HttpSource {
    /// `timeout` bounds each attempt, connection included.
    pub fn new(url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            retry,
        })
    }

    async fn download(&self) -> Result<Vec<u8>, RemoteConfigError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.fetch_error(format!("unexpected status {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.fetch_error(e.to_string()))?;
        Ok(body.to_vec())
    }

    fn fetch_error(&self, detail: String) -> RemoteConfigError {
        RemoteConfigError::Fetch {
            target: self.url.clone(),
            detail,
        }
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self, _last_modified: Option<SystemTime>) -> Result<Fetched, RemoteConfigError> {
        let body = retry_with_backoff(self.retry, |attempt| {
            tracing::debug!(url = %self.url, attempt, "Fetching configuration document");
            self.download()
        })
        .await?;

        let body = parse(&self.url, &body)?;
        Ok(Fetched::Document { body, modified: None })
    }
}

/// Reads the document from a local file.
///
/// Reports [`Fetched::Unmodified`] while the file's modification time equals
/// the marker of the last accepted refresh.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn fetch_error(&self, detail: String) -> RemoteConfigError {
        RemoteConfigError::Fetch {
            target: self.describe(),
            detail,
        }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self, last_modified: Option<SystemTime>) -> Result<Fetched, RemoteConfigError> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| self.fetch_error(e.to_string()))?;
        let modified = metadata.modified().ok();

        if modified.is_some() && modified == last_modified {
            return Ok(Fetched::Unmodified);
        }

        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.fetch_error(e.to_string()))?;
        let body = parse(&self.describe(), &raw)?;
        Ok(Fetched::Document { body, modified })
    }
}

fn parse(target: &str, raw: &[u8]) -> Result<Value, RemoteConfigError> {
    serde_json::from_slice(raw).map_err(|e| RemoteConfigError::Parse {
        target: target.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_source_skips_unmodified() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"lastUpdatedAt": 1, "files": []}}"#).unwrap();
        let source = FileSource::new(file.path());

        let marker = match source.fetch(None).await.unwrap() {
            Fetched::Document { body, modified } => {
                assert_eq!(body["lastUpdatedAt"], 1);
                modified
            }
            Fetched::Unmodified => panic!("first read must return the document"),
        };
        assert!(marker.is_some());

        assert!(matches!(source.fetch(marker).await.unwrap(), Fetched::Unmodified));
    }

    #[tokio::test]
    async fn test_file_source_reports_missing_and_malformed() {
        let missing = FileSource::new("no/such/config.json");
        assert!(matches!(missing.fetch(None).await, Err(RemoteConfigError::Fetch { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let malformed = FileSource::new(file.path());
        assert!(matches!(malformed.fetch(None).await, Err(RemoteConfigError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_http_source_unreachable_host() {
        let source = HttpSource::new(
            "http://127.0.0.1:9/assets/config.json",
            Duration::from_millis(500),
            RetryPolicy::once(),
        )
        .unwrap();

        let err = source.fetch(None).await.unwrap_err();
        assert_eq!(err.kind(), "fetch");
    }
}
