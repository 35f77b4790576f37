use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirtyState {
    Clean,
    Dirty,
}

impl DirtyState {
    pub fn is_dirty(&self) -> bool {
        *self == Self::Dirty
    }
}

/// Shared "unsaved changes" flag. Written by the editing thread, read by the
/// watcher.
#[derive(Debug, Clone, Default)]
pub struct DirtyFlag(Arc<AtomicBool>);

impl DirtyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    // Only load and save completion may call this.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn state(&self) -> DirtyState {
        if self.is_dirty() {
            DirtyState::Dirty
        } else {
            DirtyState::Clean
        }
    }
}

/// Background sampler that reports flag edges.
///
/// The callback runs on the watcher thread: once for the state observed at
/// start, then only when a sample differs from the previous one.
#[derive(Debug)]
pub struct DirtyWatcher {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DirtyWatcher {
    pub fn spawn<F>(flag: DirtyFlag, interval: Duration, mut on_change: F) -> io::Result<Self>
    where
        F: FnMut(DirtyState) + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("dirty-watcher".to_string())
            .spawn(move || {
                let mut previous = None;
                loop {
                    let current = flag.state();
                    if previous != Some(current) {
                        trace!(?current, "dirty state changed");
                        on_change(current);
                        previous = Some(current);
                    }

                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("dirty watcher stopped");
            })?;

        debug!(interval_ms = interval.as_millis() as u64, "dirty watcher started");
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("dirty watcher thread panicked");
            }
        }
    }
}

impl Drop for DirtyWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
