//! The configuration store.
//!
//! Holds the one snapshot lookups are answered from and replaces it as a
//! whole when a refresh succeeds. Readers load the snapshot pointer without
//! locking; only refreshes serialize on the refresh ledger.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use arc_swap::ArcSwapOption;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::{ServerConfig, SourceConfig};
use crate::observability::metrics;
use crate::remote_config::document::{timestamp_of, ConfigDocument, ResolvedFiles};
use crate::remote_config::error::{RemoteConfigError, ValidationFailure};
use crate::remote_config::placeholder::Placeholder;
use crate::remote_config::schema::{DocumentSchema, SchemaError, SchemaLibrary};
use crate::remote_config::sizes::SizeFetcher;
use crate::remote_config::source::{DocumentSource, Fetched, FileSource, HttpSource};
use crate::remote_config::validation::ensure_unique_names;
use crate::resilience::RetryPolicy;

/// A fully validated, size-enriched document and when it was installed.
#[derive(Debug)]
pub struct Snapshot {
    pub document: ConfigDocument,
    /// Increments on every swap, starting at 1.
    pub generation: u64,
    pub loaded_at: SystemTime,
}

/// What a successful refresh did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was installed.
    Updated {
        last_updated_at: u64,
        files: usize,
        sizes_missing: usize,
    },
    /// The candidate was not newer than the current snapshot.
    Stale { current: u64, candidate: u64 },
    /// The source reported no change since the last accepted refresh.
    Unmodified,
}

impl RefreshOutcome {
    fn label(&self) -> &'static str {
        match self {
            RefreshOutcome::Updated { .. } => "updated",
            RefreshOutcome::Stale { .. } => "stale",
            RefreshOutcome::Unmodified => "unmodified",
        }
    }
}

/// Errors building a store from settings.
#[derive(Debug, Error)]
pub enum StoreInitError {
    #[error("failed to load document schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// State only touched while holding the refresh lock.
#[derive(Default)]
struct RefreshLedger {
    completed: u64,
    last: Option<Result<RefreshOutcome, RemoteConfigError>>,
    last_modified: Option<SystemTime>,
}

/// In-memory, versioned configuration table.
pub struct ConfigStore {
    current: ArcSwapOption<Snapshot>,
    source: Arc<dyn DocumentSource>,
    sizes: SizeFetcher,
    schema: DocumentSchema,
    placeholder: Placeholder,
    ledger: Mutex<RefreshLedger>,
    /// Mirror of `ledger.completed`, readable without the lock.
    completed: AtomicU64,
}

impl ConfigStore {
    /// Create an empty store. Lookups fail until the first refresh succeeds.
    pub fn new(
        source: Arc<dyn DocumentSource>,
        sizes: SizeFetcher,
        schema: DocumentSchema,
        placeholder: Placeholder,
    ) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            source,
            sizes,
            schema,
            placeholder,
            ledger: Mutex::new(RefreshLedger::default()),
            completed: AtomicU64::new(0),
        }
    }

    /// Build the store described by the server settings.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StoreInitError> {
        let schema = match &config.validation.document_schema {
            Some(path) => {
                let library = SchemaLibrary::load(&config.validation.base_schemas)?;
                DocumentSchema::from_path(path, &library)?
            }
            None => DocumentSchema::bundled()?,
        };

        let refresh = &config.refresh;
        let base_url = &config.file_server.base_url;
        let source: Arc<dyn DocumentSource> = match &config.source {
            SourceConfig::Http { path } => {
                let url = format!("{}{}", base_url.trim_end_matches('/'), path);
                let retry = RetryPolicy {
                    max_attempts: refresh.max_attempts,
                    base_delay_ms: refresh.base_delay_ms,
                    max_delay_ms: refresh.max_delay_ms,
                };
                Arc::new(HttpSource::new(
                    url,
                    Duration::from_secs(refresh.document_timeout_secs),
                    retry,
                )?)
            }
            SourceConfig::File { path } => Arc::new(FileSource::new(path.clone())),
        };

        let sizes = SizeFetcher::new(Duration::from_secs(refresh.size_timeout_secs))?;
        let placeholder = Placeholder::new(config.file_server.placeholder.clone(), base_url.clone());

        Ok(Self::new(source, sizes, schema, placeholder))
    }

    /// The current snapshot, if one was ever loaded.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    pub fn is_initialized(&self) -> bool {
        self.current.load().is_some()
    }

    /// Variants each file offers `app_version`, from the current snapshot.
    ///
    /// Never triggers a refresh.
    pub fn lookup(&self, app_version: &str) -> Result<ResolvedFiles, RemoteConfigError> {
        let snapshot = self.current.load_full().ok_or(RemoteConfigError::NotInitialized)?;
        let resolved = snapshot.document.resolve(app_version);
        metrics::record_lookup(resolved.len());
        Ok(resolved)
    }

    /// Reload the document from the source.
    ///
    /// Callers arriving while a refresh is in flight wait for it and receive
    /// its result. On any document-level failure the current snapshot is
    /// left as it was.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RemoteConfigError> {
        let ticket = self.completed.load(Ordering::Acquire);
        let mut ledger = self.ledger.lock().await;

        if ledger.completed != ticket {
            if let Some(last) = &ledger.last {
                tracing::debug!("Joined a refresh that completed while waiting");
                return last.clone();
            }
        }

        let source = self.source.describe();
        tracing::info!(source = %source, "Refreshing configuration");

        let started = Instant::now();
        let result = self.run_refresh(&mut ledger.last_modified).await;

        match &result {
            Ok(outcome) => {
                metrics::record_refresh(outcome.label(), started);
                tracing::info!(source = %source, outcome = ?outcome, "Configuration refresh finished");
            }
            Err(e) => {
                metrics::record_refresh(e.kind(), started);
                tracing::error!(
                    source = %source,
                    error = %e,
                    "Failed to update configuration, keeping previous snapshot"
                );
            }
        }

        ledger.completed += 1;
        self.completed.store(ledger.completed, Ordering::Release);
        ledger.last = Some(result.clone());
        result
    }

    async fn run_refresh(
        &self,
        last_modified: &mut Option<SystemTime>,
    ) -> Result<RefreshOutcome, RemoteConfigError> {
        let (mut body, modified) = match self.source.fetch(*last_modified).await? {
            Fetched::Unmodified => return Ok(RefreshOutcome::Unmodified),
            Fetched::Document { body, modified } => (body, modified),
        };

        let current = self.current.load_full();
        if let (Some(current), Some(candidate)) =
            (&current, body.get("lastUpdatedAt").and_then(timestamp_of))
        {
            let current = current.document.last_updated_at;
            if candidate <= current {
                *last_modified = modified;
                return Ok(RefreshOutcome::Stale { current, candidate });
            }
        }

        self.placeholder.apply(&mut body);
        self.schema.check(&body)?;
        let mut document = ConfigDocument::from_value(body)
            .map_err(|e| ValidationFailure::Shape(e.to_string()))?;
        ensure_unique_names(&document.files)?;

        let report = self.sizes.enrich(&mut document).await;

        let outcome = RefreshOutcome::Updated {
            last_updated_at: document.last_updated_at,
            files: document.files.len(),
            sizes_missing: report.missing,
        };

        metrics::record_document(document.last_updated_at);
        let generation = current.map_or(0, |s| s.generation) + 1;
        self.current.store(Some(Arc::new(Snapshot {
            document,
            generation,
            loaded_at: SystemTime::now(),
        })));
        *last_modified = modified;

        Ok(outcome)
    }
}
