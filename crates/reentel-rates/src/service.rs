//! # Rate Service
//!
//! Background task that keeps the latest [`RateSnapshot`] available to the
//! calculator.
//!
//! ## Service Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RateService Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                       refresh loop (1 task)                      │  │
//! │  │                                                                  │  │
//! │  │   tick (immediately, then every interval_secs)                   │  │
//! │  │     │                                                            │  │
//! │  │     ├── source.fetch() ── Ok  ──► publish snapshot               │  │
//! │  │     │                  └─ Err ──► publish fallback, keep timer   │  │
//! │  │     │                                                            │  │
//! │  │     └── shutdown / all handles dropped ──► cancel fetch, exit   │  │
//! │  └───────────────────────────────┬──────────────────────────────────┘  │
//! │                                  │ watch::Sender<RateStatus>            │
//! │         ┌────────────────────────┼────────────────────────┐            │
//! │         ▼                        ▼                        ▼             │
//! │  RateServiceHandle        RateServiceHandle        RateEventEmitter    │
//! │  (calculate command)      (get_rates command)      (stale indicator)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every publish swaps the whole [`RateStatus`] at once, so a reader never
//! sees a token price from one fetch paired with an EUR rate from another.

use chrono::{DateTime, Utc};
use reentel_core::{RateProvider, RateSnapshot};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::RatesConfig;
use crate::error::{RatesError, RatesResult};
use crate::source::{HttpRateSource, RateSource};

// =============================================================================
// Rate Status
// =============================================================================

/// Everything published after a fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateStatus {
    /// Snapshot to price with.
    pub snapshot: RateSnapshot,

    /// True until the first fetch attempt has finished.
    pub is_loading: bool,

    /// Message of the last failed fetch, cleared on success.
    pub last_error: Option<String>,

    /// When the last fully or partially successful fetch finished.
    pub last_success: Option<DateTime<Utc>>,
}

impl Default for RateStatus {
    fn default() -> Self {
        RateStatus {
            snapshot: RateSnapshot::loading(),
            is_loading: true,
            last_error: None,
            last_success: None,
        }
    }
}

impl RateStatus {
    pub fn is_stale(&self) -> bool {
        self.snapshot.is_stale()
    }
}

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Trait for surfacing rate changes to the frontend.
pub trait RateEventEmitter: Send + Sync {
    /// Emits the snapshot just published.
    fn emit_snapshot(&self, snapshot: &RateSnapshot);

    /// Emits a fetch failure.
    fn emit_error(&self, message: &str, retryable: bool);
}

/// No-op event emitter for testing.
pub struct NoOpEmitter;

impl RateEventEmitter for NoOpEmitter {
    fn emit_snapshot(&self, _snapshot: &RateSnapshot) {}
    fn emit_error(&self, _message: &str, _retryable: bool) {}
}

// =============================================================================
// Rate Service
// =============================================================================

/// Owns the refresh task.
///
/// ## Lifecycle
/// ```text
/// new() ──► start() ──► (running) ──► shutdown()
///              │                          ▲
///              └── RateServiceHandle ─────┘ dropping every handle also stops it
/// ```
pub struct RateService {
    config: Arc<RatesConfig>,
    source: Arc<dyn RateSource>,
    emitter: Arc<dyn RateEventEmitter>,
    status_tx: Arc<watch::Sender<RateStatus>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl RateService {
    /// Creates a service fetching from the configured HTTP endpoints.
    pub fn new(config: RatesConfig) -> RatesResult<Self> {
        RateServiceBuilder::new(config).build()
    }

    /// Creates a service with an explicit source and emitter.
    pub fn with_source(
        config: RatesConfig,
        source: Arc<dyn RateSource>,
        emitter: Arc<dyn RateEventEmitter>,
    ) -> Self {
        let (status_tx, _) = watch::channel(RateStatus::default());

        RateService {
            config: Arc::new(config),
            source,
            emitter,
            status_tx: Arc::new(status_tx),
            shutdown_tx: None,
            task: None,
        }
    }

    /// Returns the latest published status.
    pub fn status(&self) -> RateStatus {
        self.status_tx.borrow().clone()
    }

    /// True while the refresh task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Starts the refresh task and returns a handle for readers.
    ///
    /// The first fetch begins immediately. Calling `start` on a running
    /// service only hands out another handle.
    pub fn start(&mut self) -> RatesResult<RateServiceHandle> {
        let handle = RateServiceHandle::new(self.status_tx.subscribe());

        if self.is_running() {
            debug!("Rate service already running");
            return Ok(handle);
        }

        self.config.validate()?;
        let fallback = self.config.fallback.snapshot()?;
        let interval = self.config.refresh.interval();

        info!(
            source = %self.source.name(),
            interval_secs = self.config.refresh.interval_secs,
            "Starting rate service"
        );

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        self.task = Some(tokio::spawn(refresh_loop(
            self.source.clone(),
            self.emitter.clone(),
            self.status_tx.clone(),
            fallback,
            interval,
            shutdown_rx,
        )));

        Ok(handle)
    }

    /// Stops the refresh task and waits for it to exit.
    ///
    /// A fetch in flight is cancelled and its result discarded.
    pub async fn shutdown(&mut self) -> RatesResult<()> {
        info!("Shutting down rate service");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }

        if let Some(task) = self.task.take() {
            task.await.map_err(|e| RatesError::ChannelError(e.to_string()))?;
        }

        info!("Rate service stopped");
        Ok(())
    }
}

/// Main refresh loop.
async fn refresh_loop(
    source: Arc<dyn RateSource>,
    emitter: Arc<dyn RateEventEmitter>,
    status_tx: Arc<watch::Sender<RateStatus>>,
    fallback: RateSnapshot,
    interval: Duration,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = tokio::select! {
                    result = source.fetch() => result,
                    _ = shutdown_rx.recv() => {
                        debug!("Fetch cancelled by shutdown");
                        break;
                    }
                    _ = status_tx.closed() => {
                        debug!("Fetch cancelled, no readers left");
                        break;
                    }
                };

                publish(&status_tx, emitter.as_ref(), &fallback, result);
            }

            _ = shutdown_rx.recv() => {
                info!("Rate service received shutdown");
                break;
            }

            _ = status_tx.closed() => {
                info!("All rate handles dropped, stopping");
                break;
            }
        }
    }

    info!("Refresh loop stopped");
}

fn publish(
    status_tx: &watch::Sender<RateStatus>,
    emitter: &dyn RateEventEmitter,
    fallback: &RateSnapshot,
    result: RatesResult<RateSnapshot>,
) {
    let previous_success = status_tx.borrow().last_success;

    let status = match result {
        Ok(snapshot) => {
            if snapshot.is_stale() {
                warn!("Published partially stale rates");
            } else {
                debug!(
                    token_price = %snapshot.token_price_usdt(),
                    eur_rate = %snapshot.usdt_to_eur_rate(),
                    "Published live rates"
                );
            }
            RateStatus {
                last_success: snapshot.fetched_at().or(previous_success),
                snapshot,
                is_loading: false,
                last_error: None,
            }
        }
        Err(e) => {
            let retryable = e.is_retryable();
            warn!(error = %e, retryable, "Rate fetch failed, publishing fallback rates");
            emitter.emit_error(&e.to_string(), retryable);
            RateStatus {
                snapshot: fallback.clone(),
                is_loading: false,
                last_error: Some(e.to_string()),
                last_success: previous_success,
            }
        }
    };

    let snapshot = status.snapshot.clone();
    status_tx.send_replace(status);
    emitter.emit_snapshot(&snapshot);
}

// =============================================================================
// Service Handle (for readers)
// =============================================================================

/// Cheap, cloneable read access to the published rates.
#[derive(Clone)]
pub struct RateServiceHandle {
    status_rx: watch::Receiver<RateStatus>,
}

impl RateServiceHandle {
    pub(crate) fn new(status_rx: watch::Receiver<RateStatus>) -> Self {
        RateServiceHandle { status_rx }
    }

    /// Gets the latest status.
    pub fn status(&self) -> RateStatus {
        self.status_rx.borrow().clone()
    }

    /// Waits until a new status is published.
    pub async fn changed(&mut self) -> RatesResult<RateStatus> {
        self.status_rx
            .changed()
            .await
            .map_err(|_| RatesError::ShuttingDown)?;
        Ok(self.status_rx.borrow_and_update().clone())
    }
}

impl RateProvider for RateServiceHandle {
    fn current_snapshot(&self) -> RateSnapshot {
        self.status_rx.borrow().snapshot.clone()
    }

    fn is_loading(&self) -> bool {
        self.status_rx.borrow().is_loading
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for creating RateService with options.
pub struct RateServiceBuilder {
    config: RatesConfig,
    source: Option<Arc<dyn RateSource>>,
    emitter: Option<Arc<dyn RateEventEmitter>>,
}

impl RateServiceBuilder {
    pub fn new(config: RatesConfig) -> Self {
        RateServiceBuilder {
            config,
            source: None,
            emitter: None,
        }
    }

    /// Sets the rate source (defaults to [`HttpRateSource`]).
    pub fn with_source(mut self, source: Arc<dyn RateSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn RateEventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Builds the RateService.
    pub fn build(self) -> RatesResult<RateService> {
        self.config.validate()?;

        let source = match self.source {
            Some(source) => source,
            None => Arc::new(HttpRateSource::new(
                &self.config.source,
                &self.config.fallback,
            )?),
        };
        let emitter = self.emitter.unwrap_or_else(|| Arc::new(NoOpEmitter));

        Ok(RateService::with_source(self.config, source, emitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Source that replays scripted results, repeating the last one.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<RateSnapshot, String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<RateSnapshot, String>>) -> Arc<Self> {
            Arc::new(ScriptedSource {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateSource for ScriptedSource {
        async fn fetch(&self) -> RatesResult<RateSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            let next = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            };
            next.unwrap_or_else(|| Err("script exhausted".into()))
                .map_err(RatesError::RequestFailed)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Source whose fetch never completes.
    struct HangingSource {
        started: AtomicUsize,
    }

    #[async_trait]
    impl RateSource for HangingSource {
        async fn fetch(&self) -> RatesResult<RateSnapshot> {
            self.started.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "hanging"
        }
    }

    #[derive(Default)]
    struct RecordingEmitter {
        snapshots: Mutex<Vec<RateSnapshot>>,
        errors: Mutex<Vec<(String, bool)>>,
    }

    impl RateEventEmitter for RecordingEmitter {
        fn emit_snapshot(&self, snapshot: &RateSnapshot) {
            self.snapshots.lock().unwrap().push(snapshot.clone());
        }

        fn emit_error(&self, message: &str, retryable: bool) {
            self.errors.lock().unwrap().push((message.to_string(), retryable));
        }
    }

    fn live(price: rust_decimal::Decimal) -> RateSnapshot {
        RateSnapshot::live(price, dec!(0.94), Utc::now()).unwrap()
    }

    #[test]
    fn test_rate_status_default_is_loading() {
        let status = RateStatus::default();
        assert!(status.is_loading);
        assert!(status.snapshot.is_placeholder());
        assert!(status.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let source = ScriptedSource::new(vec![Ok(live(dec!(0.2)))]);
        let mut service = RateService::with_source(
            RatesConfig::default(),
            source.clone(),
            Arc::new(NoOpEmitter),
        );

        let mut handle = service.start().unwrap();
        assert!(handle.is_loading());

        let status = handle.changed().await.unwrap();
        assert!(!status.is_loading);
        assert!(!status.is_stale());
        assert_eq!(handle.current_snapshot().token_price_usdt(), dec!(0.2));
        assert_eq!(source.calls(), 1);

        service.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_publishes_fallback_and_keeps_refreshing() {
        let source = ScriptedSource::new(vec![
            Err("connection refused".into()),
            Ok(live(dec!(0.19))),
        ]);
        let emitter = Arc::new(RecordingEmitter::default());
        let mut service =
            RateService::with_source(RatesConfig::default(), source.clone(), emitter.clone());
        let mut handle = service.start().unwrap();

        let status = handle.changed().await.unwrap();
        assert_eq!(status.snapshot, RateSnapshot::fallback());
        assert_eq!(status.snapshot.token_price_usdt(), dec!(0.183));
        assert_eq!(status.snapshot.usdt_to_eur_rate(), dec!(0.94));
        assert!(status.is_stale());
        assert!(status.last_error.as_deref().unwrap_or_default().contains("connection refused"));
        assert!(!handle.is_loading());

        // Next tick, 30s later, recovers.
        let status = handle.changed().await.unwrap();
        assert!(!status.is_stale());
        assert_eq!(status.last_error, None);
        assert_eq!(source.calls(), 2);

        assert_eq!(emitter.errors.lock().unwrap().len(), 1);
        assert!(emitter.errors.lock().unwrap()[0].1);
        assert_eq!(emitter.snapshots.lock().unwrap().len(), 2);

        service.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_interval() {
        let source = ScriptedSource::new(vec![Ok(live(dec!(0.2)))]);
        let mut config = RatesConfig::default();
        config.refresh.interval_secs = 30;
        let mut service =
            RateService::with_source(config, source.clone(), Arc::new(NoOpEmitter));
        let mut handle = service.start().unwrap();

        let started = tokio::time::Instant::now();
        handle.changed().await.unwrap();
        handle.changed().await.unwrap();
        handle.changed().await.unwrap();

        assert_eq!(source.calls(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(60));

        service.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_in_flight_fetch() {
        let source = Arc::new(HangingSource {
            started: AtomicUsize::new(0),
        });
        let mut service = RateService::with_source(
            RatesConfig::default(),
            source.clone(),
            Arc::new(NoOpEmitter),
        );
        let handle = service.start().unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.started.load(Ordering::SeqCst), 1);

        service.shutdown().await.unwrap();
        assert!(!service.is_running());

        // Nothing was published.
        assert!(handle.is_loading());
        assert!(handle.current_snapshot().is_placeholder());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handles_stops_task() {
        let source = ScriptedSource::new(vec![Ok(live(dec!(0.2)))]);
        let mut service = RateService::with_source(
            RatesConfig::default(),
            source.clone(),
            Arc::new(NoOpEmitter),
        );
        let handle = service.start().unwrap();
        drop(handle);

        let task = service.task.take().unwrap();
        let finished = tokio::time::timeout(Duration::from_secs(120), task).await;
        assert!(finished.is_ok());
        assert!(source.calls() <= 1);
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_config() {
        let mut config = RatesConfig::default();
        config.refresh.interval_secs = 0;
        let mut service = RateService::with_source(
            config,
            ScriptedSource::new(vec![]),
            Arc::new(NoOpEmitter),
        );

        assert!(service.start().is_err());
        assert!(!service.is_running());
    }

    #[test]
    fn test_builder_validates_config() {
        let mut config = RatesConfig::default();
        config.source.fx_url = "ws://rates".into();
        assert!(RateServiceBuilder::new(config).build().is_err());
    }
}
