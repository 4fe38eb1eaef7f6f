//! Bulk PDF export coordination.
//!
//! The [`BulkExporter`] walks a caller-supplied list of certificate ids
//! strictly one at a time, fetches the rendered PDF for each, retries failed
//! fetches on a linear backoff, saves successful artifacts through an
//! [`ArtifactSink`], and reports aggregate progress after every item. A
//! permanently failing certificate never aborts the run; its id ends up in the
//! summary's `failed_ids` so the caller can re-run exactly that subset.
//!
//! Items are deliberately processed sequentially with a fixed pause between
//! them. The backend renders each PDF on demand and a burst of concurrent
//! requests is what used to make it fall over.

mod sink;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use sink::{ArtifactSink, DirectorySink};

use crate::client::ApiClient;
use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::retry::{IsRetryable, RetrySchedule};
use crate::types::{CertificateId, Event, ItemOutcome, RunSummary};
use async_trait::async_trait;
use std::sync::Arc;

/// Source of artifact bytes for one certificate
///
/// The exporter only needs "give me the PDF bytes for this id"; the trait
/// keeps it independent of the HTTP client so tests can substitute scripted
/// fakes. Implementations must tolerate repeated calls for the same id.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Fetch the artifact bytes for a certificate
    async fn fetch_artifact(&self, id: &CertificateId) -> Result<Vec<u8>>;
}

#[async_trait]
impl ArtifactFetcher for ApiClient {
    async fn fetch_artifact(&self, id: &CertificateId) -> Result<Vec<u8>> {
        self.fetch_pdf(id).await
    }
}

/// Deterministic artifact filename for a certificate
pub fn artifact_filename(id: &CertificateId) -> String {
    format!("certificate_{id}.pdf")
}

/// Mutable bookkeeping for one run, reset at the start of each run
#[derive(Default)]
struct RunState {
    succeeded: usize,
    failed: usize,
    retried: u32,
    failed_ids: Vec<CertificateId>,
    outcomes: Vec<ItemOutcome>,
}

impl RunState {
    /// Rounded completion percentage over the given total
    fn percent(&self, total: usize) -> u8 {
        let processed = self.succeeded + self.failed;
        ((processed * 100) as f64 / total as f64).round() as u8
    }
}

/// Result of driving one certificate through its attempt budget
struct ItemAttempt {
    attempts: u32,
    retries: u32,
    error: Option<Error>,
}

/// Sequential bulk PDF exporter (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct BulkExporter {
    /// Where artifact bytes come from (normally the [`ApiClient`])
    fetcher: Arc<dyn ArtifactFetcher>,
    /// Where successful artifacts go (normally a [`DirectorySink`])
    sink: Arc<dyn ArtifactSink>,
    /// Retry, backoff and throttling settings
    config: ExportConfig,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl BulkExporter {
    /// Create an exporter from a fetcher, a sink and export settings
    ///
    /// Fails if the configuration allows zero attempts per certificate.
    pub fn new(
        fetcher: Arc<dyn ArtifactFetcher>,
        sink: Arc<dyn ArtifactSink>,
        config: ExportConfig,
    ) -> Result<Self> {
        if config.max_attempts == 0 {
            return Err(Error::Config {
                message: "export.max_attempts must be at least 1".to_string(),
                key: Some("export.max_attempts".to_string()),
            });
        }

        // Buffered so a slow subscriber does not stall the run; subscribers
        // that fall too far behind receive a Lagged error instead.
        let (event_tx, _rx) = tokio::sync::broadcast::channel(256);

        Ok(Self {
            fetcher,
            sink,
            config,
            event_tx,
        })
    }

    /// Create an exporter that fetches through an [`ApiClient`] and saves
    /// into the configured output directory
    pub fn for_client(client: ApiClient, config: ExportConfig) -> Result<Self> {
        let sink = Arc::new(DirectorySink::new(config.output_dir.clone()));
        Self::new(Arc::new(client), sink, config)
    }

    /// Subscribe to export events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. Progress is published after every processed
    /// certificate, so a UI never needs to poll.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers the event is silently dropped; the
    /// run itself never depends on anyone listening.
    fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Export the PDFs for the given certificates, one at a time
    ///
    /// Rejects an empty selection before any network activity. Otherwise
    /// processes every id in input order, retrying failed fetches up to the
    /// configured attempt budget, and pausing between items. The returned
    /// summary satisfies `succeeded + failed == ids.len()`; `failed_ids`
    /// holds exactly the ids whose every attempt failed, so a caller can pass
    /// that list straight back into `run` to retry the failed subset.
    pub async fn run(&self, ids: &[CertificateId]) -> Result<RunSummary> {
        if ids.is_empty() {
            return Err(Error::NothingSelected);
        }

        let total = ids.len();
        let schedule = RetrySchedule::new(self.config.max_attempts, self.config.retry_base_delay);
        let mut state = RunState::default();

        tracing::info!(total, "Bulk export started");
        self.emit(Event::ExportStarted { total });

        for (index, id) in ids.iter().enumerate() {
            let position = index + 1;
            self.emit(Event::ItemStarted {
                id: id.clone(),
                position,
                total,
            });

            let attempt = self.export_one(id, &schedule).await;
            state.retried += attempt.retries;
            let succeeded = attempt.error.is_none();

            match attempt.error {
                None => {
                    state.succeeded += 1;
                    self.emit(Event::ItemSucceeded {
                        id: id.clone(),
                        attempts: attempt.attempts,
                    });
                }
                Some(error) => {
                    state.failed += 1;
                    state.failed_ids.push(id.clone());
                    self.emit(Event::ItemFailed {
                        id: id.clone(),
                        attempts: attempt.attempts,
                        error: error.to_string(),
                    });
                }
            }

            state.outcomes.push(ItemOutcome {
                id: id.clone(),
                succeeded,
                attempts: attempt.attempts,
            });

            self.emit(Event::Progress {
                percent: state.percent(total),
                current_index: position,
                total,
            });

            // Throttle between items, but not after the last one
            if position < total {
                tokio::time::sleep(self.config.inter_item_delay).await;
            }
        }

        let summary = RunSummary {
            succeeded: state.succeeded,
            failed: state.failed,
            retried: state.retried,
            failed_ids: state.failed_ids,
            outcomes: state.outcomes,
        };

        if summary.failed == 0 {
            tracing::info!(
                succeeded = summary.succeeded,
                retried = summary.retried,
                "Bulk export finished"
            );
        } else {
            tracing::warn!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                retried = summary.retried,
                "Bulk export finished with failures; failed ids can be re-run"
            );
        }

        self.emit(Event::ExportFinished {
            succeeded: summary.succeeded,
            failed: summary.failed,
            retried: summary.retried,
            failed_ids: summary.failed_ids.clone(),
        });

        Ok(summary)
    }

    /// Drive one certificate through its attempt budget
    async fn export_one(&self, id: &CertificateId, schedule: &RetrySchedule) -> ItemAttempt {
        let mut attempt: u32 = 1;
        let mut retries: u32 = 0;

        loop {
            if let Some(delay) = schedule.delay_before(attempt) {
                self.emit(Event::ItemRetrying {
                    id: id.clone(),
                    attempt,
                    delay_ms: delay.as_millis() as u64,
                });
                tokio::time::sleep(delay).await;
            }

            match self.attempt_once(id).await {
                Ok(()) => {
                    if attempt > 1 {
                        tracing::info!(id = %id, attempts = attempt, "Artifact fetched after retry");
                    }
                    return ItemAttempt {
                        attempts: attempt,
                        retries,
                        error: None,
                    };
                }
                Err(e) if e.is_retryable() && schedule.allows_retry_after(attempt) => {
                    tracing::warn!(
                        id = %id,
                        error = %e,
                        attempt,
                        max_attempts = schedule.max_attempts,
                        "Artifact fetch failed, retrying"
                    );
                    retries += 1;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        id = %id,
                        error = %e,
                        attempts = attempt,
                        "Artifact export failed permanently"
                    );
                    return ItemAttempt {
                        attempts: attempt,
                        retries,
                        error: Some(e),
                    };
                }
            }
        }
    }

    /// One fetch-verify-save attempt
    async fn attempt_once(&self, id: &CertificateId) -> Result<()> {
        let bytes = self.fetcher.fetch_artifact(id).await?;

        // A 200 with an empty body is a failed render, not a success
        if bytes.is_empty() {
            return Err(Error::EmptyArtifact { id: id.clone() });
        }

        self.sink.save(&bytes, &artifact_filename(id)).await
    }
}
