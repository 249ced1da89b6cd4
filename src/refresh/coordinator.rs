//! Refresh coordination registry.
//!
//! Independently mounted widgets register a refresh callback under an ID;
//! the host triggers [`RefreshCoordinator::refresh_all`] (pull-to-refresh)
//! without knowing who is registered. Each run snapshots the table, runs
//! every callback on its own task, and joins on all of them. One failing,
//! panicking or hanging callback never aborts its siblings, and the
//! aggregate call always completes.

use crate::core::{millis, now, Error, Result, Timestamp};
use futures::future::{join_all, BoxFuture};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Refresh callback.
pub type RefreshCallback = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Refresh configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Per-callback timeout in milliseconds; absent or zero disables it
    pub callback_timeout_ms: Option<u64>,
}

impl RefreshConfig {
    /// Per-callback timeout as a duration.
    pub fn callback_timeout(&self) -> Option<Duration> {
        millis(self.callback_timeout_ms)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            callback_timeout_ms: Some(30_000),
        }
    }
}

struct Registration {
    generation: u64,
    callback: RefreshCallback,
}

#[derive(Default)]
struct Table {
    callbacks: HashMap<String, Registration>,
    next_generation: u64,
}

type SharedTable = Mutex<Table>;

fn lock(table: &SharedTable) -> std::sync::MutexGuard<'_, Table> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Deregistration handle returned by [`RefreshCoordinator::register`].
///
/// Dropping the handle deregisters the callback. A handle whose
/// registration has since been replaced under the same ID leaves the
/// replacement alone.
#[must_use = "dropping the handle deregisters the callback"]
pub struct RefreshRegistration {
    id: String,
    generation: u64,
    table: Weak<SharedTable>,
}

impl RefreshRegistration {
    /// Registered ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Remove the callback now.
    pub fn deregister(self) {
        // Drop does the work.
    }

    fn remove(&self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        // Callbacks are dropped after the lock is released; they may own
        // registrations of their own.
        let removed = {
            let mut table = lock(&table);
            let current = table.callbacks.get(&self.id).map(|r| r.generation);
            if current == Some(self.generation) {
                table.callbacks.remove(&self.id)
            } else {
                None
            }
        };
        if removed.is_some() {
            debug!(id = %self.id, "refresh callback deregistered");
        }
    }
}

impl Drop for RefreshRegistration {
    fn drop(&mut self) {
        self.remove();
    }
}

impl fmt::Debug for RefreshRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRegistration")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .finish()
    }
}

/// How one callback settled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshOutcome {
    /// Completed successfully
    Completed,
    /// Returned an error
    Failed(String),
    /// Panicked
    Panicked(String),
    /// Exceeded the callback timeout
    TimedOut,
}

impl RefreshOutcome {
    /// Whether the callback completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Completed)
    }
}

/// Result of one `refresh_all` run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Run ID
    pub run: u64,
    /// Start time
    pub started_at: Timestamp,
    /// Finish time
    pub finished_at: Timestamp,
    /// Outcome per callback ID
    pub outcomes: HashMap<String, RefreshOutcome>,
}

impl RefreshReport {
    /// Number of callbacks that ran.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of callbacks that completed successfully.
    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }

    /// IDs of callbacks that did not complete successfully.
    pub fn failed_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .outcomes
            .iter()
            .filter(|(_, o)| !o.is_success())
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Whether every callback completed successfully.
    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.total()
    }
}

/// Refresh coordination registry. Cloning shares the same table.
#[derive(Clone)]
pub struct RefreshCoordinator {
    table: Arc<SharedTable>,
    config: RefreshConfig,
    runs: Arc<AtomicU64>,
}

impl RefreshCoordinator {
    /// Create a coordinator.
    pub fn new(config: RefreshConfig) -> Self {
        Self {
            table: Arc::new(Mutex::new(Table::default())),
            config,
            runs: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register a callback under `id`, replacing any previous one.
    pub fn register<F, Fut>(&self, id: &str, callback: F) -> RefreshRegistration
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let callback: RefreshCallback =
            Arc::new(move || -> BoxFuture<'static, Result<()>> { Box::pin(callback()) });

        let (generation, previous) = {
            let mut table = lock(&self.table);
            table.next_generation += 1;
            let generation = table.next_generation;
            let previous = table
                .callbacks
                .insert(id.to_string(), Registration { generation, callback });
            (generation, previous)
        };
        debug!(id, replaced = previous.is_some(), "refresh callback registered");
        drop(previous);

        RefreshRegistration {
            id: id.to_string(),
            generation,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Whether a callback is registered under `id`.
    pub fn is_registered(&self, id: &str) -> bool {
        lock(&self.table).callbacks.contains_key(id)
    }

    /// Registered IDs, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = lock(&self.table).callbacks.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        lock(&self.table).callbacks.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every currently registered callback concurrently and wait for
    /// all of them to settle.
    ///
    /// Callbacks registered while the run is in flight are not part of it.
    pub async fn refresh_all(&self) -> RefreshReport {
        let run = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        let started_at = now();

        let snapshot: Vec<(String, RefreshCallback)> = lock(&self.table)
            .callbacks
            .iter()
            .map(|(id, r)| (id.clone(), Arc::clone(&r.callback)))
            .collect();
        info!(run, callbacks = snapshot.len(), "refresh started");

        let timeout = self.config.callback_timeout();
        let tasks = snapshot.into_iter().map(|(id, callback)| {
            let task = tokio::spawn(run_callback(callback, timeout));
            async move { (id, task.await) }
        });

        let mut outcomes = HashMap::new();
        for (id, joined) in join_all(tasks).await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => RefreshOutcome::Panicked(panic_message(e.into_panic())),
                Err(e) => RefreshOutcome::Failed(e.to_string()),
            };
            if !outcome.is_success() {
                warn!(run, id = %id, outcome = ?outcome, "refresh callback failed");
            }
            outcomes.insert(id, outcome);
        }

        let report = RefreshReport {
            run,
            started_at,
            finished_at: now(),
            outcomes,
        };
        info!(
            run,
            total = report.total(),
            succeeded = report.succeeded(),
            "refresh finished"
        );
        report
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new(RefreshConfig::default())
    }
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("ids", &self.ids())
            .field("config", &self.config)
            .finish()
    }
}

async fn run_callback(callback: RefreshCallback, timeout: Option<Duration>) -> RefreshOutcome {
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, callback()).await {
            Ok(result) => result,
            Err(_) => return RefreshOutcome::TimedOut,
        },
        None => callback().await,
    };
    match result {
        Ok(()) => RefreshOutcome::Completed,
        Err(Error::CallbackFailure(msg)) => RefreshOutcome::Failed(msg),
        Err(e) => RefreshOutcome::Failed(e.to_string()),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "callback panicked".to_string()
    }
}
