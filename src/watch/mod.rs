//! Watch session orchestration.
//!
//! This module combines the one-shot backlog scanner and the live tree
//! watcher under a single cancellable session lifecycle, and delivers
//! conversion events to observers over channels.

pub mod file_watcher;
pub mod scanner;
pub mod session;

pub use {
    file_watcher::{TreeWatcher, WatcherState},
    scanner::BacklogScanner,
    session::{SessionState, WatchSession},
};
