//! Debounced, superseding validation runs.
//!
//! Every call to [`ValidationScheduler::schedule`] takes the next generation
//! number from a monotonic counter and spawns a run against the document
//! snapshot it was handed. A run waits out the debounce delay, drops out
//! early if a newer generation exists by then, evaluates the engine on the
//! blocking pool, and commits only if its generation is still the latest.
//! The check and the commit happen under the report channel's lock, so a
//! stale run can never overwrite the result of a newer one.
//!
//! Observers read the latest [`ValidationReport`] or subscribe to a
//! [`watch`] channel that yields every committed change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use apigraph::{Document, Issue};
use serde::Serialize;
use tokio::sync::watch;

/// A validation engine: document in, ordered issues out.
pub type Engine = Arc<dyn Fn(&Document) -> Vec<Issue> + Send + Sync>;

/// The state observers see.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Generation the `issues` belong to. `0` until the first run commits.
    pub generation: u64,
    pub issues: Vec<Issue>,
    /// `true` while a scheduled run has not yet committed or failed.
    pub validating: bool,
    /// RFC 3339 time of the last commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_at: Option<String>,
    /// Set when the latest run failed; `issues` are then from an older generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[derive(Clone)]
pub struct ValidationScheduler {
    latest: Arc<AtomicU64>,
    delay: Duration,
    engine: Engine,
    report: Arc<watch::Sender<ValidationReport>>,
}

impl ValidationScheduler {
    /// A scheduler running [`apigraph::validate`] after `delay`.
    pub fn new(delay: Duration) -> Self {
        Self::with_engine(delay, Arc::new(apigraph::validate))
    }

    pub fn with_engine(delay: Duration, engine: Engine) -> Self {
        let (tx, _rx) = watch::channel(ValidationReport::default());
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            delay,
            engine,
            report: Arc::new(tx),
        }
    }

    /// Schedule a run over `document` and return its generation. Any run
    /// scheduled earlier that has not committed yet is superseded.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, document: Document) -> u64 {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.report.send_modify(|r| r.validating = true);

        let latest = Arc::clone(&self.latest);
        let report = Arc::clone(&self.report);
        let engine = Arc::clone(&self.engine);
        let delay = self.delay;

        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if latest.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "validation run superseded before start");
                return;
            }

            let outcome = tokio::task::spawn_blocking(move || engine(&document)).await;

            let committed = report.send_if_modified(|r| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                r.validating = false;
                match &outcome {
                    Ok(issues) => {
                        r.generation = generation;
                        r.issues = issues.clone();
                        r.validated_at = Some(chrono::Utc::now().to_rfc3339());
                        r.last_error = None;
                    }
                    Err(e) => {
                        r.last_error = Some(format!("validation run {generation} failed: {e}"));
                    }
                }
                true
            });

            match (&outcome, committed) {
                (Ok(issues), true) => {
                    tracing::debug!(generation, issues = issues.len(), "validation committed")
                }
                (Err(e), true) => tracing::warn!(generation, "validation run failed: {e}"),
                (_, false) => {
                    tracing::debug!(generation, "validation run superseded; result discarded")
                }
            }
        });

        generation
    }

    /// Generation of the most recent schedule.
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// A snapshot of the current report.
    pub fn report(&self) -> ValidationReport {
        self.report.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ValidationReport> {
        self.report.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
