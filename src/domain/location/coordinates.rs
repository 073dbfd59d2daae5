//! Coordinates and raw position fixes

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::error::InvalidCoordinates;

/// WGS84 position in signed degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Create validated coordinates
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinates> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !valid {
            return Err(InvalidCoordinates {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// `N` for latitude >= 0, `S` otherwise
    pub fn latitude_hemisphere(&self) -> char {
        if self.latitude >= 0.0 {
            'N'
        } else {
            'S'
        }
    }

    /// `E` for longitude >= 0, `W` otherwise
    pub fn longitude_hemisphere(&self) -> char {
        if self.longitude >= 0.0 {
            'E'
        } else {
            'W'
        }
    }

    /// Overlay coordinate line, e.g. `Lat 33.8688° S    Long 151.2093° E`
    pub fn overlay_line(&self) -> String {
        format!(
            "Lat {:.4}° {}    Long {:.4}° {}",
            self.latitude.abs(),
            self.latitude_hemisphere(),
            self.longitude.abs(),
            self.longitude_hemisphere()
        )
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Raw position fix delivered by a location source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    pub fn new(coordinates: Coordinates, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinates,
            timestamp,
        }
    }
}
