//! Global processing state and the single-flight guard around service calls

use tokio::sync::watch;
use tracing::debug;

use crate::error::{AppError, Result};

/// Loading flag plus the status text shown while loading
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingState {
    pub is_loading: bool,
    pub status_message: String,
}

impl ProcessingState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            is_loading: true,
            status_message: message.into(),
        }
    }
}

/// Owner of the single global [`ProcessingState`].
///
/// At most one guarded operation runs at a time; observers follow the state
/// through a watch channel.
#[derive(Debug)]
pub struct ProcessingTracker {
    state: watch::Sender<ProcessingState>,
}

impl ProcessingTracker {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ProcessingState::idle());
        Self { state }
    }

    /// Current state snapshot
    pub fn current(&self) -> ProcessingState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<ProcessingState> {
        self.state.subscribe()
    }

    /// Enter the loading state, or fail with [`AppError::Busy`] when another
    /// operation already holds it. Dropping the guard returns to idle.
    pub fn begin(&self, message: impl Into<String>) -> Result<ProcessingGuard<'_>> {
        let message = message.into();
        let mut acquired = false;

        self.state.send_if_modified(|state| {
            if state.is_loading {
                return false;
            }
            *state = ProcessingState::loading(message.clone());
            acquired = true;
            true
        });

        if !acquired {
            let current = self.current().status_message;
            debug!(requested = %message, running = %current, "Rejected concurrent operation");
            return Err(AppError::Busy(current));
        }

        debug!(status = %message, "Processing started");
        Ok(ProcessingGuard { tracker: self })
    }
}

impl Default for ProcessingTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Token proving the holder owns the loading state
#[derive(Debug)]
pub struct ProcessingGuard<'a> {
    tracker: &'a ProcessingTracker,
}

impl ProcessingGuard<'_> {
    /// Update the status text (e.g. per-file progress)
    pub fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.tracker.state.send_modify(|state| {
            state.status_message = message;
        });
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.state.send_replace(ProcessingState::idle());
        debug!("Processing finished");
    }
}
