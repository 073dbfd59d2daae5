//! Location snapshot value object

use chrono::{DateTime, Utc};

use super::{Coordinates, LocationFix, PlaceDescription};
use crate::domain::interval::Interval;

/// Immutable point-in-time location plus its resolved place description.
///
/// Snapshots are superseded, never mutated: a newer fix or a late address
/// resolution produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSnapshot {
    coordinates: Coordinates,
    description: PlaceDescription,
    captured_at: DateTime<Utc>,
}

impl LocationSnapshot {
    pub fn new(
        coordinates: Coordinates,
        description: PlaceDescription,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            coordinates,
            description,
            captured_at,
        }
    }

    /// Snapshot for a fresh fix carrying a previously known description
    pub fn from_fix(fix: LocationFix, description: PlaceDescription) -> Self {
        Self::new(fix.coordinates, description, fix.timestamp)
    }

    /// Copy of this snapshot with a different description
    pub fn with_description(&self, description: PlaceDescription) -> Self {
        Self {
            description,
            ..self.clone()
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.latitude()
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.longitude()
    }

    pub fn description(&self) -> &PlaceDescription {
        &self.description
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Age of the fix relative to `now` (zero for fixes from the future)
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.captured_at).max(chrono::Duration::zero())
    }

    /// Whether the fix is older than `max_age`
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Interval) -> bool {
        self.age(now) > max_age.as_chrono()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot_at(secs: i64) -> LocationSnapshot {
        LocationSnapshot::new(
            Coordinates::new(10.0, 20.0).unwrap(),
            PlaceDescription::Unavailable,
            Utc.timestamp_opt(secs, 0).unwrap(),
        )
    }

    #[test]
    fn with_description_keeps_position_and_time() {
        let original = snapshot_at(1_000);
        let resolved =
            original.with_description(PlaceDescription::Resolved("Somewhere".to_string()));

        assert_eq!(resolved.coordinates(), original.coordinates());
        assert_eq!(resolved.captured_at(), original.captured_at());
        assert!(resolved.description().is_available());
        assert!(!original.description().is_available());
    }

    #[test]
    fn staleness_threshold() {
        let snap = snapshot_at(1_000);
        let limit = Interval::from_secs(60);

        assert!(!snap.is_stale(Utc.timestamp_opt(1_060, 0).unwrap(), limit));
        assert!(snap.is_stale(Utc.timestamp_opt(1_061, 0).unwrap(), limit));
    }

    #[test]
    fn future_fix_has_zero_age() {
        let snap = snapshot_at(2_000);
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        assert_eq!(snap.age(now), chrono::Duration::zero());
    }
}
