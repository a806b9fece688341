//! File-change subscription for a single template file.
//!
//! Watches the parent directory so editors that save by writing a temp file
//! and renaming it over the target are still seen. Bursts of events are
//! debounced into one [`WatchEvent`], classified by whether the file exists
//! once things go quiet.

use crate::error::{Result, SyncError};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Quiet period that ends a burst of events.
pub const DEBOUNCE_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    Modified,
    Removed,
}

/// Blocking iterator over debounced changes to one file. Ends if the
/// underlying watcher goes away.
pub struct FileSubscription {
    path: PathBuf,
    canonical: PathBuf,
    rx: Receiver<notify::Result<Event>>,
    debounce: Duration,
    _watcher: RecommendedWatcher,
}

impl FileSubscription {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let parent = match path.parent() {
            Some(p) if p.as_os_str().is_empty() => PathBuf::from("."),
            Some(p) => p.to_path_buf(),
            None => {
                return Err(SyncError::Watch(format!(
                    "{} has no parent directory",
                    path.display()
                )))
            }
        };
        let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());

        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_millis(DEBOUNCE_MS)),
        )?;
        watcher.watch(&parent, RecursiveMode::NonRecursive)?;

        info!(
            "Watching {} (via parent dir {})",
            path.display(),
            parent.display()
        );

        Ok(Self {
            path,
            canonical,
            rx,
            debounce: Duration::from_millis(DEBOUNCE_MS),
            _watcher: watcher,
        })
    }

    fn affects_target(&self, event: &Event) -> bool {
        if matches!(event.kind, EventKind::Access(_)) {
            return false;
        }
        event.paths.iter().any(|p| {
            if let Ok(canonical) = p.canonicalize() {
                if canonical == self.canonical {
                    return true;
                }
            }
            p.file_name() == self.path.file_name()
        })
    }

    /// Whether a message from the watcher touches the target. Watcher errors
    /// are logged and never count as a change.
    fn is_relevant(&self, message: &notify::Result<Event>) -> bool {
        match message {
            Ok(event) if self.affects_target(event) => {
                debug!("File event: {:?}", event.kind);
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("File watcher error: {}", e);
                false
            }
        }
    }

    /// Wait for the first event touching the target. `false` if the watcher
    /// is gone.
    fn wait_for_change(&self) -> bool {
        loop {
            match self.rx.recv() {
                Ok(message) if self.is_relevant(&message) => return true,
                Ok(_) => continue,
                Err(_) => return false,
            }
        }
    }

    /// Swallow follow-up events until the file has been quiet for the
    /// debounce period.
    fn settle(&self) {
        let mut deadline = Instant::now() + self.debounce;
        loop {
            let wait = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(wait) {
                Ok(message) if self.is_relevant(&message) => {
                    deadline = Instant::now() + self.debounce;
                }
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }
}

impl Iterator for FileSubscription {
    type Item = WatchEvent;

    fn next(&mut self) -> Option<WatchEvent> {
        if !self.wait_for_change() {
            return None;
        }
        self.settle();

        Some(if self.path.exists() {
            WatchEvent::Modified
        } else {
            WatchEvent::Removed
        })
    }
}
