//! Watch session lifecycle coordination.
//!
//! A `WatchSession` owns the backlog scanner, the tree watcher, and the
//! background tasks that turn filesystem events into conversions. It is
//! single-use: construct, `start`, `stop`, discard.

use std::{fs::create_dir_all, path::PathBuf, sync::Arc, time::Duration};

use {
    async_channel::{Receiver, Sender, bounded},
    parking_lot::RwLock,
    tokio::{
        task::{JoinHandle, spawn_blocking},
        time::interval,
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, warn},
};

use crate::{
    config::WatchConfig,
    convert::{ConversionEvent, ConversionPipeline},
    error::domain::SessionError,
    watch::{file_watcher::TreeWatcher, scanner::BacklogScanner},
};

/// Lifecycle state of a watch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not running: before `start` or after `stop` completes.
    Idle,
    /// Backlog processed, live watcher active.
    Running,
    /// `stop` in progress: watcher released, loops winding down.
    Stopping,
}

/// Channel capacity for raw watcher paths.
const PATH_CHANNEL_CAPACITY: usize = 1000;
/// Channel capacity for conversion events delivered to observers.
const EVENT_CHANNEL_CAPACITY: usize = 1000;
/// Channel capacity for fatal session errors.
const ERROR_CHANNEL_CAPACITY: usize = 16;

/// Cancellable watch-and-convert session over one pair of tree roots.
///
/// Startup ordering guarantees at most one event per pre-existing file:
/// the backlog pass runs to completion before the live watcher subscribes,
/// so a file cannot be picked up by both.
pub struct WatchSession {
    /// Validated runtime configuration.
    config: WatchConfig,
    /// Current lifecycle state.
    state: Arc<RwLock<SessionState>>,
    /// Set on first `start`; a session is never restarted.
    consumed: bool,
    /// Cancellation signal shared with every background loop.
    cancel: CancellationToken,
    /// Conversion event stream (sender side).
    event_tx: Sender<ConversionEvent>,
    /// Conversion event stream (observer side).
    event_rx: Receiver<ConversionEvent>,
    /// Fatal error stream (sender side).
    error_tx: Sender<SessionError>,
    /// Fatal error stream (observer side).
    error_rx: Receiver<SessionError>,
    /// Live watcher, held while running.
    watcher: Option<TreeWatcher>,
    /// Task handles for the dispatch and heartbeat loops.
    tasks: Vec<JoinHandle<()>>,
}

impl WatchSession {
    /// Creates a new idle session for the given configuration.
    pub fn new(config: WatchConfig) -> Self {
        let (event_tx, event_rx) = bounded(EVENT_CHANNEL_CAPACITY);
        let (error_tx, error_rx) = bounded(ERROR_CHANNEL_CAPACITY);

        Self {
            config,
            state: Arc::new(RwLock::new(SessionState::Idle)),
            consumed: false,
            cancel: CancellationToken::new(),
            event_tx,
            event_rx,
            error_tx,
            error_rx,
            watcher: None,
            tasks: Vec::new(),
        }
    }

    /// Observer stream of per-file conversion outcomes.
    ///
    /// Events queued before subscription are retained, so observers may
    /// subscribe before or after `start`.
    pub fn events(&self) -> Receiver<ConversionEvent> {
        self.event_rx.clone()
    }

    /// Observer stream of fatal session errors, distinct from per-file
    /// failures: anything delivered here has terminated the session.
    pub fn fatal_errors(&self) -> Receiver<SessionError> {
        self.error_rx.clone()
    }

    /// Gets the current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Validates the configuration, processes the backlog, and activates
    /// the live watcher.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` for invalid roots,
    /// `SessionError::InvalidState` if the session was already started, or
    /// `SessionError::Watch` if the subscription fails.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if self.consumed {
            return Err(SessionError::InvalidState {
                reason: "session already started; construct a new one".to_string(),
            });
        }
        self.consumed = true;

        self.config.validate()?;
        create_dir_all(&self.config.target_root).map_err(|source| SessionError::RootIo {
            path: self.config.target_root.clone(),
            source,
        })?;

        let pipeline = ConversionPipeline::new(&self.config);

        // Backlog before watcher: see the struct docs
        let scanner = BacklogScanner::new(&self.config);
        for path in scanner.pending_files() {
            if let Some(event) = pipeline.process(&path) {
                let _ = self.event_tx.send(event).await;
            }
        }

        let (path_tx, path_rx) = bounded(PATH_CHANNEL_CAPACITY);
        let mut watcher = TreeWatcher::new(path_tx, self.error_tx.clone(), self.cancel.clone())?;
        watcher.watch(&self.config.source_root)?;
        self.watcher = Some(watcher);

        self.tasks.push(Self::spawn_dispatch(
            path_rx,
            pipeline,
            self.event_tx.clone(),
            self.cancel.clone(),
        ));
        self.tasks.push(Self::spawn_heartbeat(
            self.config.poll_interval_secs,
            self.cancel.clone(),
        ));

        *self.state.write() = SessionState::Running;
        debug!(
            source = %self.config.source_root.display(),
            target = %self.config.target_root.display(),
            "watch session running"
        );
        Ok(())
    }

    /// Spawns the loop that turns watcher paths into conversions.
    ///
    /// Each conversion runs on its own blocking task, so a hung filesystem
    /// call never stalls dispatch of subsequent events or `stop`.
    fn spawn_dispatch(
        path_rx: Receiver<PathBuf>,
        pipeline: ConversionPipeline,
        event_tx: Sender<ConversionEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = path_rx.recv() => {
                        let Ok(path) = received else { break };
                        let pipeline = pipeline.clone();
                        let event_tx = event_tx.clone();
                        tokio::spawn(async move {
                            match spawn_blocking(move || pipeline.process(&path)).await {
                                // Delivery after stop is best-effort
                                Ok(Some(event)) => {
                                    let _ = event_tx.send(event).await;
                                }
                                Ok(None) => {}
                                Err(e) => warn!("conversion task failed: {}", e),
                            }
                        });
                    }
                }
            }
            debug!("dispatch loop stopped");
        })
    }

    /// Spawns the liveness heartbeat.
    ///
    /// The interval is retained from configuration although event delivery
    /// is push-based; the tick has no conversion effect.
    fn spawn_heartbeat(poll_interval_secs: u64, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(poll_interval_secs));
            // The first tick completes immediately; consume it
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => debug!("watch session heartbeat"),
                }
            }
        })
    }

    /// Stops watching for new events.
    ///
    /// Idempotent and bounded: the watcher is unsubscribed immediately and
    /// only the session's own loops are awaited. An in-flight conversion is
    /// left to finish or fail on its own; its event is delivered
    /// best-effort.
    pub async fn stop(&mut self) {
        {
            let mut state = self.state.write();
            if *state != SessionState::Running {
                return;
            }
            *state = SessionState::Stopping;
        }

        self.cancel.cancel();

        if let Some(mut watcher) = self.watcher.take() {
            if let Err(e) = watcher.unwatch() {
                warn!("failed to release watch handles: {}", e);
            }
        }

        for task in self.tasks.drain(..) {
            let _ = task.await;
        }

        *self.state.write() = SessionState::Idle;
        debug!("watch session stopped");
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        // A dropped session must not leave loops running
        self.cancel.cancel();
    }
}
