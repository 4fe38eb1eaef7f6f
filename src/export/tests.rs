//! Tests for the bulk export coordinator.

use super::*;
use crate::config::ExportConfig;
use crate::types::Event;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

const PDF: &[u8] = b"%PDF-1.4 test artifact";

/// Sentinel for "every attempt fails"
const ALWAYS: u32 = u32::MAX;

/// Fetcher whose per-id behavior is scripted up front
struct ScriptedFetcher {
    /// Number of leading calls per id that fail (ALWAYS = never succeed)
    fail_first: HashMap<CertificateId, u32>,
    /// Payload returned by successful calls
    payload: Vec<u8>,
    /// Call count per id, for asserting attempt budgets
    calls: Mutex<HashMap<CertificateId, u32>>,
}

impl ScriptedFetcher {
    fn new() -> Self {
        Self {
            fail_first: HashMap::new(),
            payload: PDF.to_vec(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn with_empty_payload() -> Self {
        Self {
            payload: Vec::new(),
            ..Self::new()
        }
    }

    fn failing_first(mut self, id: &str, failures: u32) -> Self {
        self.fail_first.insert(CertificateId::new(id), failures);
        self
    }

    fn calls_for(&self, id: &str) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .get(&CertificateId::new(id))
            .copied()
            .unwrap_or(0)
    }

    fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ArtifactFetcher for ScriptedFetcher {
    async fn fetch_artifact(&self, id: &CertificateId) -> Result<Vec<u8>> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            let entry = calls.entry(id.clone()).or_insert(0);
            *entry += 1;
            *entry
        };

        let failures = self.fail_first.get(id).copied().unwrap_or(0);
        if call_number <= failures {
            Err(Error::Api {
                status: 502,
                message: format!("render failed for {id}"),
            })
        } else {
            Ok(self.payload.clone())
        }
    }
}

/// Sink that keeps saved artifacts in memory
#[derive(Default)]
struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    fn filenames(&self) -> Vec<String> {
        self.saved
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<()> {
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Sink that always fails with a local I/O error
struct FailingSink;

#[async_trait]
impl ArtifactSink for FailingSink {
    async fn save(&self, _bytes: &[u8], filename: &str) -> Result<()> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("cannot write {filename}"),
        )))
    }
}

/// Config with zeroed delays so non-timing tests run instantly
fn quick_config() -> ExportConfig {
    ExportConfig {
        max_attempts: 3,
        retry_base_delay: Duration::ZERO,
        inter_item_delay: Duration::ZERO,
        output_dir: PathBuf::from("./unused"),
    }
}

fn ids(raw: &[&str]) -> Vec<CertificateId> {
    raw.iter().map(|s| CertificateId::new(*s)).collect()
}

fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// -----------------------------------------------------------------------
// Invocation errors
// -----------------------------------------------------------------------

#[tokio::test]
async fn empty_selection_is_rejected_before_any_fetch() {
    let fetcher = std::sync::Arc::new(ScriptedFetcher::new());
    let exporter = BulkExporter::new(
        fetcher.clone(),
        std::sync::Arc::new(MemorySink::default()),
        quick_config(),
    )
    .unwrap();

    let result = exporter.run(&[]).await;

    assert!(matches!(result, Err(Error::NothingSelected)));
    assert_eq!(
        fetcher.total_calls(),
        0,
        "empty input must never hit the network"
    );
}

#[test]
fn zero_attempt_budget_is_rejected_at_construction() {
    let config = ExportConfig {
        max_attempts: 0,
        ..quick_config()
    };
    let result = BulkExporter::new(
        std::sync::Arc::new(ScriptedFetcher::new()),
        std::sync::Arc::new(MemorySink::default()),
        config,
    );

    assert!(matches!(result, Err(Error::Config { .. })));
}

// -----------------------------------------------------------------------
// Outcome accounting
// -----------------------------------------------------------------------

#[tokio::test]
async fn clean_run_exports_every_certificate_once() {
    let fetcher = std::sync::Arc::new(ScriptedFetcher::new());
    let sink = std::sync::Arc::new(MemorySink::default());
    let exporter = BulkExporter::new(fetcher.clone(), sink.clone(), quick_config()).unwrap();

    let summary = exporter.run(&ids(&["a", "b", "c"])).await.unwrap();

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.retried, 0);
    assert!(summary.failed_ids.is_empty());
    assert_eq!(fetcher.calls_for("a"), 1);
    assert_eq!(fetcher.calls_for("b"), 1);
    assert_eq!(fetcher.calls_for("c"), 1);
    assert_eq!(
        sink.filenames(),
        vec![
            "certificate_a.pdf",
            "certificate_b.pdf",
            "certificate_c.pdf"
        ],
        "artifacts are named deterministically and saved in input order"
    );
}

#[tokio::test]
async fn item_that_recovers_on_third_attempt_counts_two_retries() {
    // B fails on attempts 1 and 2, then succeeds; A and C succeed immediately
    let fetcher = std::sync::Arc::new(ScriptedFetcher::new().failing_first("b", 2));
    let exporter = BulkExporter::new(
        fetcher.clone(),
        std::sync::Arc::new(MemorySink::default()),
        quick_config(),
    )
    .unwrap();

    let summary = exporter.run(&ids(&["a", "b", "c"])).await.unwrap();

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.retried, 2);
    assert!(summary.failed_ids.is_empty());
    assert_eq!(fetcher.calls_for("b"), 3);

    let b_outcome = &summary.outcomes[1];
    assert!(b_outcome.succeeded);
    assert_eq!(b_outcome.attempts, 3);
}

#[tokio::test]
async fn item_that_fails_every_attempt_is_reported_with_two_retries() {
    let fetcher = std::sync::Arc::new(ScriptedFetcher::new().failing_first("x", ALWAYS));
    let exporter = BulkExporter::new(
        fetcher.clone(),
        std::sync::Arc::new(MemorySink::default()),
        quick_config(),
    )
    .unwrap();

    let summary = exporter.run(&ids(&["x"])).await.unwrap();

    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.retried, 2);
    assert_eq!(summary.failed_ids, ids(&["x"]));
    assert_eq!(
        fetcher.calls_for("x"),
        3,
        "attempt budget is max_attempts total calls"
    );
}

#[tokio::test]
async fn empty_artifact_is_a_failure_never_a_success() {
    let fetcher = std::sync::Arc::new(ScriptedFetcher::with_empty_payload());
    let sink = std::sync::Arc::new(MemorySink::default());
    let exporter = BulkExporter::new(fetcher.clone(), sink.clone(), quick_config()).unwrap();

    let summary = exporter.run(&ids(&["a"])).await.unwrap();

    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failed_ids, ids(&["a"]));
    assert_eq!(
        fetcher.calls_for("a"),
        3,
        "an empty payload is transient and consumes the full attempt budget"
    );
    assert!(sink.filenames().is_empty(), "nothing may be saved");
}

#[tokio::test]
async fn permanent_failure_does_not_abort_the_run() {
    let fetcher = std::sync::Arc::new(ScriptedFetcher::new().failing_first("bad", ALWAYS));
    let sink = std::sync::Arc::new(MemorySink::default());
    let exporter = BulkExporter::new(fetcher.clone(), sink.clone(), quick_config()).unwrap();

    let summary = exporter.run(&ids(&["bad", "good"])).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failed_ids, ids(&["bad"]));
    assert_eq!(
        sink.filenames(),
        vec!["certificate_good.pdf"],
        "the item after a permanent failure must still be processed"
    );
    assert_eq!(
        summary.succeeded + summary.failed,
        2,
        "every requested id is accounted for exactly once"
    );
}

#[tokio::test]
async fn save_failure_fails_the_item_without_retrying() {
    let fetcher = std::sync::Arc::new(ScriptedFetcher::new());
    let exporter = BulkExporter::new(
        fetcher.clone(),
        std::sync::Arc::new(FailingSink),
        quick_config(),
    )
    .unwrap();

    let summary = exporter.run(&ids(&["a"])).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(
        summary.retried, 0,
        "local disk errors are not transient; no retry may be taken"
    );
    assert_eq!(fetcher.calls_for("a"), 1);
    assert_eq!(summary.outcomes[0].attempts, 1);
}

#[tokio::test]
async fn failed_subset_can_be_rerun_directly_from_the_summary() {
    let fetcher = std::sync::Arc::new(
        ScriptedFetcher::new()
            .failing_first("p", ALWAYS)
            .failing_first("r", ALWAYS),
    );
    let exporter = BulkExporter::new(
        fetcher,
        std::sync::Arc::new(MemorySink::default()),
        quick_config(),
    )
    .unwrap();

    let summary = exporter.run(&ids(&["p", "q", "r"])).await.unwrap();
    assert_eq!(summary.failed_ids, ids(&["p", "r"]));

    // The backend recovered; re-run exactly the failed subset
    let retry_exporter = BulkExporter::new(
        std::sync::Arc::new(ScriptedFetcher::new()),
        std::sync::Arc::new(MemorySink::default()),
        quick_config(),
    )
    .unwrap();
    let retry_summary = retry_exporter.run(&summary.failed_ids).await.unwrap();

    assert_eq!(retry_summary.succeeded, 2);
    assert_eq!(retry_summary.failed, 0);
}

// -----------------------------------------------------------------------
// Progress and events
// -----------------------------------------------------------------------

#[tokio::test]
async fn progress_is_published_after_every_item_with_rounded_percent() {
    let exporter = BulkExporter::new(
        std::sync::Arc::new(ScriptedFetcher::new()),
        std::sync::Arc::new(MemorySink::default()),
        quick_config(),
    )
    .unwrap();
    let mut rx = exporter.subscribe();

    exporter.run(&ids(&["a", "b", "c"])).await.unwrap();

    let progress: Vec<(u8, usize, usize)> = drain_events(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            Event::Progress {
                percent,
                current_index,
                total,
            } => Some((percent, current_index, total)),
            _ => None,
        })
        .collect();

    assert_eq!(
        progress,
        vec![(33, 1, 3), (67, 2, 3), (100, 3, 3)],
        "percent is round(processed * 100 / total) after each item"
    );
}

#[tokio::test]
async fn events_cover_the_whole_run_lifecycle() {
    let exporter = BulkExporter::new(
        std::sync::Arc::new(ScriptedFetcher::new().failing_first("b", 1)),
        std::sync::Arc::new(MemorySink::default()),
        quick_config(),
    )
    .unwrap();
    let mut rx = exporter.subscribe();

    exporter.run(&ids(&["a", "b"])).await.unwrap();
    let events = drain_events(&mut rx);

    assert!(matches!(events.first(), Some(Event::ExportStarted { total: 2 })));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, Event::ItemRetrying { attempt: 2, .. })),
        "the retry of b must be announced before its backoff wait"
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, Event::ItemSucceeded { .. }))
            .count(),
        2
    );
    match events.last() {
        Some(Event::ExportFinished {
            succeeded,
            failed,
            retried,
            failed_ids,
        }) => {
            assert_eq!(*succeeded, 2);
            assert_eq!(*failed, 0);
            assert_eq!(*retried, 1);
            assert!(failed_ids.is_empty());
        }
        other => panic!("run must end with ExportFinished, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_item_event_carries_the_final_error() {
    let exporter = BulkExporter::new(
        std::sync::Arc::new(ScriptedFetcher::new().failing_first("x", ALWAYS)),
        std::sync::Arc::new(MemorySink::default()),
        quick_config(),
    )
    .unwrap();
    let mut rx = exporter.subscribe();

    exporter.run(&ids(&["x"])).await.unwrap();
    let events = drain_events(&mut rx);

    let failed = events
        .iter()
        .find_map(|e| match e {
            Event::ItemFailed {
                id,
                attempts,
                error,
            } => Some((id.clone(), *attempts, error.clone())),
            _ => None,
        })
        .expect("a permanently failed item must emit ItemFailed");

    assert_eq!(failed.0, CertificateId::new("x"));
    assert_eq!(failed.1, 3);
    assert!(failed.2.contains("502"), "error text: {}", failed.2);
}

// -----------------------------------------------------------------------
// Timing (virtual clock; sleeps auto-advance)
// -----------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn inter_item_delay_applies_between_items_but_not_after_the_last() {
    let config = ExportConfig {
        max_attempts: 3,
        retry_base_delay: Duration::from_secs(3),
        inter_item_delay: Duration::from_secs(3),
        output_dir: PathBuf::from("./unused"),
    };
    let exporter = BulkExporter::new(
        std::sync::Arc::new(ScriptedFetcher::new()),
        std::sync::Arc::new(MemorySink::default()),
        config,
    )
    .unwrap();

    let start = tokio::time::Instant::now();
    exporter.run(&ids(&["a", "b", "c"])).await.unwrap();
    let elapsed = start.elapsed();

    // Two gaps of 3s between three items, none after the last
    assert!(
        elapsed >= Duration::from_secs(6),
        "expected two inter-item waits, elapsed {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_secs(9),
        "no wait may follow the last item, elapsed {elapsed:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn backoff_scales_linearly_with_the_attempt_about_to_be_made() {
    let config = ExportConfig {
        max_attempts: 3,
        retry_base_delay: Duration::from_secs(3),
        inter_item_delay: Duration::from_secs(3),
        output_dir: PathBuf::from("./unused"),
    };
    let exporter = BulkExporter::new(
        std::sync::Arc::new(ScriptedFetcher::new().failing_first("a", 2)),
        std::sync::Arc::new(MemorySink::default()),
        config,
    )
    .unwrap();

    let start = tokio::time::Instant::now();
    let summary = exporter.run(&ids(&["a"])).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(summary.succeeded, 1);
    // Attempt 1 starts immediately, attempt 2 waits 2x3s, attempt 3 waits 3x3s
    assert!(
        elapsed >= Duration::from_secs(15),
        "expected 6s + 9s of backoff, elapsed {elapsed:?}"
    );
    assert!(
        elapsed < Duration::from_secs(16),
        "backoff must be linear, not exponential, elapsed {elapsed:?}"
    );
}
