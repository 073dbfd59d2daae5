//! Location port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::interval::Interval;
use crate::domain::location::{AddressComponents, LocationFix};

/// Location source errors
#[derive(Debug, Clone, Error)]
pub enum LocationError {
    #[error("Location permission not granted")]
    PermissionDenied,

    #[error("Location provider unavailable: {0}")]
    Unavailable(String),
}

/// Reverse-geocoding errors
#[derive(Debug, Clone, Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Request(String),

    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),
}

/// Subscription parameters for location updates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationRequest {
    /// Minimum time between fixes
    pub interval: Interval,
    /// Minimum distance in metres between fixes
    pub min_distance: f32,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            interval: Interval::default_update_interval(),
            min_distance: crate::domain::config::DEFAULT_MIN_DISTANCE_M,
        }
    }
}

/// Port for the platform location provider
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Start delivering fixes. The stream ends when the source unsubscribes.
    async fn subscribe(
        &self,
        request: LocationRequest,
    ) -> Result<mpsc::Receiver<LocationFix>, LocationError>;

    /// Stop delivering fixes.
    async fn unsubscribe(&self);

    /// Most recent fix known to the provider, if any.
    async fn last_known(&self) -> Option<LocationFix>;
}

/// Port for reverse geocoding
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve coordinates into ranked address candidates (best first).
    /// An empty list means nothing was found.
    async fn resolve(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<AddressComponents>, GeocodeError>;
}

/// Blanket implementation for boxed geocoder types
#[async_trait]
impl Geocoder for Box<dyn Geocoder> {
    async fn resolve(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<AddressComponents>, GeocodeError> {
        self.as_ref().resolve(latitude, longitude).await
    }
}
