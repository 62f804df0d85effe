use std::fmt;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Millis;
use crate::geometry::haversine_distance;

/// Kind of signal that moves the walked distance forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorSource {
    StepDetection,
    Geolocation,
    Manual,
}

impl SensorSource {
    pub const ALL: [SensorSource; 3] = [
        SensorSource::StepDetection,
        SensorSource::Geolocation,
        SensorSource::Manual,
    ];
}

impl fmt::Display for SensorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorSource::StepDetection => "step detection",
            SensorSource::Geolocation => "geolocation",
            SensorSource::Manual => "manual trigger",
        };
        f.write_str(name)
    }
}

/// Outcome of the platform permission prompt for a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorPermission {
    Granted,
    Denied,
}

/// One accelerometer reading, gravity included
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp_ms: Millis,
}

impl AccelerationSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp_ms: Millis) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_ms,
        }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// One geolocation update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported accuracy radius in meters, if any
    #[serde(default)]
    pub accuracy: Option<f64>,
}

impl GeoFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Great-circle distance to another fix in meters
    pub fn distance_to(&self, other: &GeoFix) -> f64 {
        haversine_distance(self.point(), other.point())
    }
}
