//! Collaborators shared by the capture use cases

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::capture::CaptureOutcome;

use super::ports::{MediaIndex, MediaStorage, PermissionAuthority};

/// Capacity of the outcome broadcast channel
const OUTCOME_CHANNEL_CAPACITY: usize = 32;

/// Shared flag cleared on teardown.
/// Every asynchronous completion checks it before touching session state.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn shut_down(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// External collaborators plus the outcome channel, cloned into every
/// component and background task of one capture pipeline.
#[derive(Clone)]
pub struct CaptureServices {
    pub storage: Arc<dyn MediaStorage>,
    pub permissions: Arc<dyn PermissionAuthority>,
    pub media_index: Arc<dyn MediaIndex>,
    pub liveness: Liveness,
    outcomes: broadcast::Sender<CaptureOutcome>,
}

impl CaptureServices {
    pub fn new(
        storage: Arc<dyn MediaStorage>,
        permissions: Arc<dyn PermissionAuthority>,
        media_index: Arc<dyn MediaIndex>,
    ) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            storage,
            permissions,
            media_index,
            liveness: Liveness::new(),
            outcomes,
        }
    }

    /// Subscribe to terminal capture outcomes
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureOutcome> {
        self.outcomes.subscribe()
    }

    /// Broadcast an outcome; having no subscribers is fine
    pub fn publish(&self, outcome: CaptureOutcome) {
        if self.outcomes.send(outcome).is_err() {
            debug!("No outcome subscribers");
        }
    }

    /// Hand a saved file to the media index without waiting for it.
    /// Failures are logged and never reach the capture outcome.
    pub fn register(&self, path: &Path) {
        let index = Arc::clone(&self.media_index);
        let path: PathBuf = path.to_path_buf();
        tokio::spawn(async move {
            match index.notify(&path).await {
                Ok(()) => debug!(path = %path.display(), "Media registered"),
                Err(e) => warn!(path = %path.display(), error = %e, "Media registration failed"),
            }
        });
    }
}
