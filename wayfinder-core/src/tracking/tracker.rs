use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::config::TrackerConfig;
use super::sensors::{AccelerationSample, GeoFix, SensorSource};
use crate::{Meters, Millis, Polyline};

/// Lifecycle of the walk along one route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkPhase {
    /// No route loaded yet
    Unloaded,
    /// Route loaded, nothing walked yet
    Loaded,
    /// At least one increment accepted
    Walking,
    /// Walked distance reached the end of the route
    Completed,
}

/// Per-route walk counters and sensor memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkState {
    pub total_distance: Meters,
    pub walked: Meters,
    pub last_fix: Option<GeoFix>,
    pub last_step_at: Option<Millis>,
}

impl WalkState {
    fn new(total_distance: Meters) -> Self {
        Self {
            total_distance,
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> Meters {
        self.total_distance.saturating_sub(self.walked)
    }
}

/// Progress emitted to the renderer after every accepted update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub walked: Meters,
    pub remaining: Meters,
    pub total_distance: Meters,
    /// Current position as `[x, y]` in plan coordinates
    pub position: [f64; 2],
    pub completed_segments: usize,
    pub phase: WalkPhase,
    /// Source of the increment, `None` for the snapshot taken on load
    pub source: Option<SensorSource>,
}

/// Fuses sensor increments into a walked distance along the active polyline
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    config: TrackerConfig,
    route: Option<Polyline>,
    walk: WalkState,
    phase: WalkPhase,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl ProgressTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            route: None,
            walk: WalkState::default(),
            phase: WalkPhase::Unloaded,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn phase(&self) -> WalkPhase {
        self.phase
    }

    pub fn walk_state(&self) -> &WalkState {
        &self.walk
    }

    pub fn polyline(&self) -> Option<&Polyline> {
        self.route.as_ref()
    }

    /// Starts tracking a new route
    ///
    /// The walked distance goes back to zero and the previous fix and step
    /// time are forgotten, whatever state the old route was in.
    pub fn load(&mut self, polyline: Polyline) -> ProgressSnapshot {
        info!(
            "Tracking route of {} points, distance {}",
            polyline.points().len(),
            polyline.total_distance()
        );
        self.walk = WalkState::new(polyline.total_distance());
        self.phase = WalkPhase::Loaded;
        let snapshot = self.progress_on(&polyline, None);
        self.route = Some(polyline);
        snapshot
    }

    /// Drops the active route, back to [`WalkPhase::Unloaded`]
    pub fn unload(&mut self) {
        self.route = None;
        self.walk = WalkState::default();
        self.phase = WalkPhase::Unloaded;
    }

    /// Current progress, `None` when no route is loaded
    pub fn snapshot(&self) -> Option<ProgressSnapshot> {
        self.snapshot_for(None)
    }

    /// Adds `amount` to the walked distance, clamped to the route length
    ///
    /// This is the raw increment shared by all sources; debouncing and fix
    /// bookkeeping happen in the source specific methods.
    pub fn apply_increment(
        &mut self,
        source: SensorSource,
        amount: Meters,
    ) -> Option<ProgressSnapshot> {
        if self.route.is_none() {
            debug!("Ignoring {source} increment, no route loaded");
            return None;
        }

        self.walk.walked = self
            .walk
            .walked
            .saturating_add(amount)
            .min(self.walk.total_distance);

        self.phase = if self.walk.walked >= self.walk.total_distance {
            WalkPhase::Completed
        } else {
            WalkPhase::Walking
        };

        self.snapshot_for(Some(source))
    }

    /// Credits one step at `timestamp_ms` unless it falls inside the
    /// refractory window of the last accepted step
    ///
    /// A timestamp earlier than the last accepted step is taken as a sensor
    /// clock reset and starts a new window.
    pub fn apply_step(&mut self, timestamp_ms: Millis) -> Option<ProgressSnapshot> {
        if self.route.is_none() {
            return None;
        }

        if let Some(last) = self.walk.last_step_at {
            if timestamp_ms < last {
                debug!("Step clock went back from {last} to {timestamp_ms} ms");
            } else if timestamp_ms - last <= self.config.step_refractory_ms {
                return None;
            }
        }

        self.walk.last_step_at = Some(timestamp_ms);
        self.apply_increment(SensorSource::StepDetection, self.config.step_length)
    }

    /// Step detection from a raw accelerometer sample
    pub fn apply_acceleration(&mut self, sample: AccelerationSample) -> Option<ProgressSnapshot> {
        if sample.magnitude() <= self.config.step_threshold {
            return None;
        }
        self.apply_step(sample.timestamp_ms)
    }

    /// Credits the great-circle displacement since the previous fix
    ///
    /// The new fix always becomes the previous fix, even when its
    /// displacement is zero or below the noise floor. The first fix after a
    /// load only establishes the reference point.
    pub fn apply_fix(&mut self, fix: GeoFix) -> Option<ProgressSnapshot> {
        if self.route.is_none() {
            return None;
        }

        let Some(previous) = self.walk.last_fix.replace(fix) else {
            debug!("First fix at {}, {}", fix.latitude, fix.longitude);
            return None;
        };

        let mut delta = rounded_meters(previous.distance_to(&fix));
        if delta < self.config.fix_noise_floor {
            debug!("Fix displacement {delta} below noise floor");
            delta = 0;
        }

        self.apply_increment(SensorSource::Geolocation, delta)
    }

    /// Manual/test trigger, always accepted
    pub fn apply_manual(&mut self) -> Option<ProgressSnapshot> {
        self.apply_increment(SensorSource::Manual, self.config.manual_increment)
    }

    fn snapshot_for(&self, source: Option<SensorSource>) -> Option<ProgressSnapshot> {
        self.route
            .as_ref()
            .map(|route| self.progress_on(route, source))
    }

    fn progress_on(&self, route: &Polyline, source: Option<SensorSource>) -> ProgressSnapshot {
        let position = route.position_at(self.walk.walked);

        ProgressSnapshot {
            walked: self.walk.walked,
            remaining: self.walk.remaining(),
            total_distance: self.walk.total_distance,
            position: [position.point.x, position.point.y],
            completed_segments: position.completed_segments,
            phase: self.phase,
            source,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rounded_meters(distance: f64) -> Meters {
    distance.round() as Meters
}

#[cfg(test)]
mod tests {
    use geo::Coord;

    use super::*;

    fn abc() -> Polyline {
        Polyline::new(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 3.0, y: 0.0 },
            Coord { x: 3.0, y: 4.0 },
        ])
        .unwrap()
    }

    fn long_line(length: f64) -> Polyline {
        Polyline::new(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: length, y: 0.0 }]).unwrap()
    }

    fn strong(timestamp_ms: Millis) -> AccelerationSample {
        AccelerationSample::new(0.0, 0.0, 15.0, timestamp_ms)
    }

    #[test]
    fn unloaded_tracker_ignores_everything() {
        let mut tracker = ProgressTracker::default();
        assert_eq!(tracker.phase(), WalkPhase::Unloaded);
        assert!(tracker.apply_manual().is_none());
        assert!(tracker.apply_acceleration(strong(0)).is_none());
        assert!(tracker.apply_fix(GeoFix::new(1.0, 1.0)).is_none());
        assert!(tracker.walk_state().last_fix.is_none());
        assert!(tracker.snapshot().is_none());
    }

    #[test]
    fn load_starts_at_first_point() {
        let mut tracker = ProgressTracker::default();
        let snapshot = tracker.load(abc());

        assert_eq!(snapshot.walked, 0);
        assert_eq!(snapshot.remaining, 7);
        assert_eq!(snapshot.position, [0.0, 0.0]);
        assert_eq!(snapshot.phase, WalkPhase::Loaded);
        assert_eq!(snapshot.source, None);
    }

    #[test]
    fn steps_are_debounced() {
        let mut tracker = ProgressTracker::default();
        tracker.load(long_line(100.0));

        assert_eq!(tracker.apply_acceleration(strong(0)).unwrap().walked, 5);
        assert!(tracker.apply_acceleration(strong(300)).is_none());
        let second = tracker.apply_acceleration(strong(500)).unwrap();
        assert_eq!(second.walked, 10);
        assert_eq!(second.source, Some(SensorSource::StepDetection));
        // window counts from the last accepted step, not the rejected one
        assert!(tracker.apply_acceleration(strong(900)).is_none());
        assert!(tracker.apply_acceleration(strong(901)).is_some());
    }

    #[test]
    fn step_clock_reset_opens_new_window() {
        let mut tracker = ProgressTracker::default();
        tracker.load(long_line(100.0));

        assert_eq!(tracker.apply_step(10_000).unwrap().walked, 5);
        assert_eq!(tracker.apply_step(100).unwrap().walked, 10);
        assert_eq!(tracker.walk_state().last_step_at, Some(100));
        // debounce resumes from the reset clock
        assert!(tracker.apply_step(300).is_none());
        assert_eq!(tracker.apply_step(5_000).unwrap().walked, 15);
    }

    #[test]
    fn weak_samples_are_not_steps() {
        let mut tracker = ProgressTracker::default();
        tracker.load(long_line(100.0));

        // exactly at threshold does not count
        assert!(
            tracker
                .apply_acceleration(AccelerationSample::new(0.0, 0.0, 12.0, 0))
                .is_none()
        );
        assert!(
            tracker
                .apply_acceleration(AccelerationSample::new(0.0, 0.0, 9.81, 1000))
                .is_none()
        );
        assert_eq!(tracker.walk_state().last_step_at, None);
    }

    #[test]
    fn walked_is_clamped_and_completes() {
        let mut tracker = ProgressTracker::default();
        tracker.load(abc());

        let snapshot = tracker.apply_manual().unwrap();
        assert_eq!(snapshot.walked, 7);
        assert_eq!(snapshot.remaining, 0);
        assert_eq!(snapshot.position, [3.0, 4.0]);
        assert_eq!(snapshot.phase, WalkPhase::Completed);

        assert_eq!(tracker.apply_manual().unwrap().walked, 7);
        assert_eq!(tracker.phase(), WalkPhase::Completed);
    }

    #[test]
    fn walking_phase_after_first_increment() {
        let mut tracker = ProgressTracker::default();
        tracker.load(long_line(100.0));
        tracker.apply_increment(SensorSource::Manual, 3);
        assert_eq!(tracker.phase(), WalkPhase::Walking);
    }

    #[test]
    fn first_fix_only_sets_reference() {
        let mut tracker = ProgressTracker::default();
        tracker.load(long_line(1000.0));

        assert!(tracker.apply_fix(GeoFix::new(0.0, 0.0)).is_none());
        assert_eq!(tracker.walk_state().walked, 0);

        // ~111 m east
        let snapshot = tracker.apply_fix(GeoFix::new(0.0, 0.001)).unwrap();
        assert_eq!(snapshot.walked, 111);
        assert_eq!(snapshot.source, Some(SensorSource::Geolocation));
    }

    #[test]
    fn every_fix_replaces_the_previous_one() {
        let mut tracker = ProgressTracker::new(TrackerConfig {
            fix_noise_floor: 5,
            ..TrackerConfig::default()
        });
        tracker.load(long_line(1000.0));

        tracker.apply_fix(GeoFix::new(0.0, 0.0));
        // ~2 m jitter is credited as zero but still moves the reference
        let jitter = GeoFix::new(0.0, 0.00002);
        let snapshot = tracker.apply_fix(jitter).unwrap();
        assert_eq!(snapshot.walked, 0);
        assert_eq!(tracker.walk_state().last_fix, Some(jitter));

        let snapshot = tracker.apply_fix(GeoFix::new(0.0, 0.00102)).unwrap();
        assert_eq!(snapshot.walked, 111);
    }

    #[test]
    fn reload_resets_walk_and_sensor_memory() {
        let mut tracker = ProgressTracker::default();
        tracker.load(long_line(100.0));
        tracker.apply_acceleration(strong(1000));
        tracker.apply_fix(GeoFix::new(0.0, 0.0));
        tracker.apply_manual();

        let snapshot = tracker.load(abc());
        assert_eq!(snapshot.walked, 0);
        assert_eq!(snapshot.total_distance, 7);
        assert_eq!(tracker.phase(), WalkPhase::Loaded);
        assert_eq!(tracker.walk_state().last_fix, None);
        assert_eq!(tracker.walk_state().last_step_at, None);

        // a step right after the old one is accepted on the new route
        assert!(tracker.apply_acceleration(strong(1001)).is_some());
    }

    #[test]
    fn zero_length_route_completes_on_first_increment() {
        let mut tracker = ProgressTracker::default();
        let point = Polyline::new(vec![Coord { x: 1.0, y: 1.0 }]).unwrap();
        assert_eq!(tracker.load(point).phase, WalkPhase::Loaded);

        let snapshot = tracker.apply_manual().unwrap();
        assert_eq!(snapshot.walked, 0);
        assert_eq!(snapshot.phase, WalkPhase::Completed);
    }

    #[test]
    fn walked_stays_within_bounds_for_mixed_sources() {
        let mut tracker = ProgressTracker::default();
        tracker.load(long_line(57.0));

        let mut last_walked = 0;
        for i in 0..40_u32 {
            let snapshot = match i % 3 {
                0 => tracker.apply_acceleration(strong(u64::from(i) * 250)),
                1 => tracker.apply_fix(GeoFix::new(0.0, f64::from(i) * 0.00005)),
                _ => tracker.apply_manual(),
            };
            let state = tracker.walk_state();
            assert!(state.walked <= state.total_distance);
            assert!(state.walked >= last_walked);
            last_walked = state.walked;
            if let Some(snapshot) = snapshot {
                assert_eq!(snapshot.walked + snapshot.remaining, 57);
            }
        }
        assert_eq!(tracker.phase(), WalkPhase::Completed);
    }
}
