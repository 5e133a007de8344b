//! File system change detection using the `notify` crate.
//!
//! This module watches the source tree recursively and forwards the paths
//! of newly created or renamed-in PNG files to the session's dispatch
//! channel. Recursive mode covers subdirectories created after the
//! subscription began, without re-subscription.

use std::path::{Path, PathBuf};

use {
    async_channel::Sender,
    notify::{
        Config, Error, Event, RecommendedWatcher,
        RecursiveMode::Recursive,
        Watcher,
        event::{CreateKind, EventKind, ModifyKind, RenameMode},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error},
};

use crate::{convert::is_source_image, error::domain::SessionError};

/// Lifecycle state of a tree watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// No subscription is held.
    Stopped,
    /// The source tree is being watched.
    Active,
}

/// Recursive watcher over the source tree.
///
/// The watcher owns the native subscription handles; `unwatch` (or drop)
/// releases them. Watch-level failures are fatal: they are forwarded on the
/// session's error channel and cancel the session token.
pub struct TreeWatcher {
    /// Internal notify watcher.
    watcher: RecommendedWatcher,
    /// Current lifecycle state.
    state: WatcherState,
    /// Root being watched while active.
    root: Option<PathBuf>,
}

impl TreeWatcher {
    /// Creates a watcher that forwards matching paths on `path_sender`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Watch` if the underlying watcher cannot be
    /// initialized.
    pub fn new(
        path_sender: Sender<PathBuf>,
        error_sender: Sender<SessionError>,
        cancel: CancellationToken,
    ) -> Result<Self, SessionError> {
        let watcher = RecommendedWatcher::new(
            move |res: Result<Event, Error>| {
                Self::handle_raw_event(res, &path_sender, &error_sender, &cancel);
            },
            Config::default(),
        )?;

        Ok(Self {
            watcher,
            state: WatcherState::Stopped,
            root: None,
        })
    }

    /// Handles raw events from the notify crate.
    ///
    /// Only file creations and rename/move completions trigger conversion;
    /// modifications, removals, and metadata changes are not conversion
    /// triggers. The handler runs on the notify delivery thread and must
    /// not block: it filters and forwards, nothing more.
    fn handle_raw_event(
        res: Result<Event, Error>,
        path_sender: &Sender<PathBuf>,
        error_sender: &Sender<SessionError>,
        cancel: &CancellationToken,
    ) {
        match res {
            Ok(event) => {
                let paths = match event.kind {
                    EventKind::Create(CreateKind::Folder) => return,
                    EventKind::Create(_) => event.paths,
                    EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths,
                    // A Both event carries (from, to); only the destination matters
                    EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                        event.paths.last().cloned().into_iter().collect()
                    }
                    _ => return,
                };

                for path in paths {
                    if is_source_image(&path) {
                        if path_sender.try_send(path).is_err() {
                            debug!("dispatch channel full or closed; dropping event");
                        }
                    } else {
                        debug!("ignoring non-source file: {:?}", path);
                    }
                }
            }
            Err(e) => {
                error!("file system watcher error: {}", e);
                let _ = error_sender.try_send(SessionError::Watch(e));
                cancel.cancel();
            }
        }
    }

    /// Starts watching `root` and all of its current and future
    /// subdirectories.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Watch` if the subscription fails.
    pub fn watch(&mut self, root: &Path) -> Result<(), SessionError> {
        self.watcher.watch(root, Recursive)?;
        self.root = Some(root.to_path_buf());
        self.state = WatcherState::Active;
        debug!("started watching source tree: {:?}", root);
        Ok(())
    }

    /// Releases the native watch handles. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Watch` if the subscription cannot be removed.
    pub fn unwatch(&mut self) -> Result<(), SessionError> {
        if let Some(root) = self.root.take() {
            self.watcher.unwatch(&root)?;
            debug!("stopped watching source tree: {:?}", root);
        }
        self.state = WatcherState::Stopped;
        Ok(())
    }

    /// Gets the current lifecycle state.
    pub fn state(&self) -> WatcherState {
        self.state
    }
}
