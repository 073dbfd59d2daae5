//! Fixed-position location source

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::application::ports::{LocationError, LocationRequest, LocationSource};
use crate::domain::location::{Coordinates, LocationFix};

/// Location source that reports one known position.
///
/// Each subscription delivers a single fix stamped at subscription time and
/// then stays open without further updates until unsubscribed.
pub struct FixedLocationSource {
    position: Option<Coordinates>,
    sender: Mutex<Option<mpsc::Sender<LocationFix>>>,
}

impl FixedLocationSource {
    pub fn new(position: Coordinates) -> Self {
        Self {
            position: Some(position),
            sender: Mutex::new(None),
        }
    }

    /// A source with no position: subscriptions succeed but never deliver
    pub fn unknown() -> Self {
        Self {
            position: None,
            sender: Mutex::new(None),
        }
    }
}

#[async_trait]
impl LocationSource for FixedLocationSource {
    async fn subscribe(
        &self,
        request: LocationRequest,
    ) -> Result<mpsc::Receiver<LocationFix>, LocationError> {
        let (tx, rx) = mpsc::channel(1);
        if let Some(position) = self.position {
            tx.try_send(LocationFix::new(position, Utc::now()))
                .map_err(|e| LocationError::Unavailable(e.to_string()))?;
        }
        debug!(interval = %request.interval, "Fixed location subscribed");
        *self.sender.lock().await = Some(tx);
        Ok(rx)
    }

    async fn unsubscribe(&self) {
        self.sender.lock().await.take();
    }

    async fn last_known(&self) -> Option<LocationFix> {
        None
    }
}
