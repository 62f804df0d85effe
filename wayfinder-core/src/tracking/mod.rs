//! Progress tracking along a loaded route
//!
//! Step detection, geolocation fixes and manual triggers are fused into a
//! single walked distance that only grows and never exceeds the route
//! length. [`NavigationSession`] owns the tracker together with the sensor
//! subscriptions and route request sequencing of one client.

mod config;
mod sensors;
mod session;
mod tracker;

pub use config::TrackerConfig;
pub use sensors::{AccelerationSample, GeoFix, SensorPermission, SensorSource};
pub use session::{NavigationSession, ProgressSink, RouteTicket, SessionError};
pub use tracker::{ProgressSnapshot, ProgressTracker, WalkPhase, WalkState};
