//! Location feed use case
//!
//! Keeps the latest fix together with its reverse-geocoded description.
//! A single background task owns all writes; readers get atomic snapshot
//! replacement through a watch channel.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info};

use crate::domain::interval::Interval;
use crate::domain::location::{LocationFix, LocationSnapshot, PlaceDescription};

use super::ports::{Geocoder, LocationError, LocationRequest, LocationSource};

/// Location feed use case
pub struct LocationFeed<S, G>
where
    S: LocationSource + 'static,
    G: Geocoder + 'static,
{
    source: Arc<S>,
    geocoder: Arc<G>,
    request: LocationRequest,
    snapshot: Arc<watch::Sender<Option<LocationSnapshot>>>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl<S, G> LocationFeed<S, G>
where
    S: LocationSource + 'static,
    G: Geocoder + 'static,
{
    /// Create a stopped feed
    pub fn new(source: Arc<S>, geocoder: Arc<G>, request: LocationRequest) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self {
            source,
            geocoder,
            request,
            snapshot: Arc::new(snapshot),
            pump: Mutex::new(None),
        }
    }

    /// Start the subscription. Calling while already started is a no-op.
    ///
    /// The snapshot is seeded from the source's last known fix, if any.
    pub async fn start(&self) -> Result<(), LocationError> {
        let mut pump = self.pump.lock().await;
        if pump.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Location feed already running");
            return Ok(());
        }

        let fixes = self.source.subscribe(self.request).await?;
        let seed = self.source.last_known().await;

        info!(
            interval = %self.request.interval,
            min_distance = self.request.min_distance,
            seeded = seed.is_some(),
            "Location feed started"
        );

        *pump = Some(tokio::spawn(run_pump(
            seed,
            fixes,
            Arc::clone(&self.geocoder),
            Arc::clone(&self.snapshot),
        )));
        Ok(())
    }

    /// Cancel the subscription. The last snapshot stays readable.
    pub async fn stop(&self) {
        let handle = self.pump.lock().await.take();
        if let Some(handle) = handle {
            handle.abort();
            self.source.unsubscribe().await;
            info!("Location feed stopped");
        }
    }

    /// Whether the subscription is active
    pub async fn is_running(&self) -> bool {
        self.pump
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Latest snapshot, or `None` if no fix was ever received
    pub fn current_snapshot(&self) -> Option<LocationSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Watch snapshot replacements
    pub fn subscribe(&self) -> watch::Receiver<Option<LocationSnapshot>> {
        self.snapshot.subscribe()
    }

    /// True if there is no snapshot or it is older than `max_age`
    pub fn is_stale(&self, max_age: Interval) -> bool {
        self.snapshot
            .borrow()
            .as_ref()
            .map_or(true, |snapshot| snapshot.is_stale(Utc::now(), max_age))
    }
}

/// Single writer of the snapshot.
///
/// Every fix is published at once with the prior description; its address is
/// resolved in a separate task and republished only if no newer fix arrived.
/// Lookups live in the pump's `JoinSet`, so aborting the pump cancels them.
async fn run_pump<G: Geocoder + 'static>(
    seed: Option<LocationFix>,
    mut fixes: mpsc::Receiver<LocationFix>,
    geocoder: Arc<G>,
    snapshot: Arc<watch::Sender<Option<LocationSnapshot>>>,
) {
    let mut lookups: JoinSet<(u64, PlaceDescription)> = JoinSet::new();
    let mut sequence: u64 = 0;

    if let Some(fix) = seed {
        sequence += 1;
        accept(fix, sequence, &snapshot, &geocoder, &mut lookups);
    }

    loop {
        tokio::select! {
            fix = fixes.recv() => match fix {
                Some(fix) => {
                    sequence += 1;
                    accept(fix, sequence, &snapshot, &geocoder, &mut lookups);
                }
                None => {
                    debug!("Location source closed");
                    break;
                }
            },
            Some(joined) = lookups.join_next() => {
                let (id, description) = match joined {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        debug!(error = %e, "Address lookup task ended early");
                        continue;
                    }
                };
                if id != sequence {
                    debug!(id, latest = sequence, "Discarding stale address");
                    continue;
                }
                snapshot.send_modify(|current| {
                    if let Some(current) = current.as_mut() {
                        *current = current.with_description(description);
                    }
                });
            }
        }
    }
}

/// Publish `fix` with the prior description and queue its address lookup
fn accept<G: Geocoder + 'static>(
    fix: LocationFix,
    sequence: u64,
    snapshot: &watch::Sender<Option<LocationSnapshot>>,
    geocoder: &Arc<G>,
    lookups: &mut JoinSet<(u64, PlaceDescription)>,
) {
    let description = snapshot
        .borrow()
        .as_ref()
        .map(|prior| prior.description().clone())
        .unwrap_or_default();
    snapshot.send_replace(Some(LocationSnapshot::from_fix(fix, description)));
    debug!(
        latitude = fix.coordinates.latitude(),
        longitude = fix.coordinates.longitude(),
        "Location fix"
    );

    let geocoder = Arc::clone(geocoder);
    lookups.spawn(async move { (sequence, resolve(geocoder.as_ref(), fix).await) });
}

async fn resolve<G: Geocoder + ?Sized>(geocoder: &G, fix: LocationFix) -> PlaceDescription {
    match geocoder
        .resolve(fix.coordinates.latitude(), fix.coordinates.longitude())
        .await
    {
        Ok(results) => PlaceDescription::from_components(&results),
        Err(e) => {
            debug!(error = %e, "Reverse geocoding failed");
            PlaceDescription::Unavailable
        }
    }
}
