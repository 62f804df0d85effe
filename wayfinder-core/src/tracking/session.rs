use std::fmt;

use hashbrown::HashMap;
use log::{debug, info, warn};
use thiserror::Error;

use super::config::TrackerConfig;
use super::sensors::{AccelerationSample, GeoFix, SensorPermission, SensorSource};
use super::tracker::{ProgressSnapshot, ProgressTracker, WalkPhase};
use crate::routing::RouteError;
use crate::{Polyline, Route};

/// Rendering collaborator fed by a [`NavigationSession`]
pub trait ProgressSink {
    /// Called with every accepted progress update
    fn progress(&mut self, polyline: &Polyline, snapshot: &ProgressSnapshot);

    /// Called once when a new route replaces the active one
    fn route_loaded(&mut self, polyline: &Polyline, snapshot: &ProgressSnapshot) {
        self.progress(polyline, snapshot);
    }
}

/// Collects snapshots, handy for headless runs
impl ProgressSink for Vec<ProgressSnapshot> {
    fn progress(&mut self, _polyline: &Polyline, snapshot: &ProgressSnapshot) {
        self.push(*snapshot);
    }
}

/// Sequence number of a route request issued by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteTicket(u64);

impl fmt::Display for RouteTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0} already has an active subscription")]
    AlreadySubscribed(SensorSource),
    #[error("Permission for {0} was denied")]
    PermissionDenied(SensorSource),
    #[error("{0} is not subscribed")]
    NotSubscribed(SensorSource),
    #[error("Route response {ticket} is no longer awaited (latest request {latest})")]
    StaleResponse {
        ticket: RouteTicket,
        latest: RouteTicket,
    },
    #[error("Route request failed: {0}")]
    Route(#[from] RouteError),
}

#[derive(Debug, Clone, Copy, Default)]
struct Subscription {
    /// Set by a stream error, cleared by the next successful delivery
    halted: bool,
}

/// Client side controller for one user
///
/// Owns the progress tracker, the single subscription per sensor source and
/// the rendering sink. Sensor callbacks are expected one at a time, in any
/// order across sources.
pub struct NavigationSession<S: ProgressSink> {
    tracker: ProgressTracker,
    subscriptions: HashMap<SensorSource, Subscription>,
    issued: u64,
    /// Ticket still awaiting its response, consumed on completion
    pending: Option<u64>,
    sink: S,
}

impl<S: ProgressSink> NavigationSession<S> {
    pub fn new(config: TrackerConfig, sink: S) -> Self {
        Self {
            tracker: ProgressTracker::new(config),
            subscriptions: HashMap::with_capacity(SensorSource::ALL.len()),
            issued: 0,
            pending: None,
            sink,
        }
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn phase(&self) -> WalkPhase {
        self.tracker.phase()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Registers the only subscription for `source`
    ///
    /// # Errors
    ///
    /// [`SessionError::PermissionDenied`] when the platform refused access,
    /// [`SessionError::AlreadySubscribed`] when the source is already active
    pub fn subscribe(
        &mut self,
        source: SensorSource,
        permission: SensorPermission,
    ) -> Result<(), SessionError> {
        if permission == SensorPermission::Denied {
            warn!("Permission denied for {source}, tracking from it will not start");
            return Err(SessionError::PermissionDenied(source));
        }

        match self.subscriptions.entry(source) {
            hashbrown::hash_map::Entry::Occupied(_) => {
                Err(SessionError::AlreadySubscribed(source))
            }
            hashbrown::hash_map::Entry::Vacant(entry) => {
                entry.insert(Subscription::default());
                debug!("Subscribed to {source}");
                Ok(())
            }
        }
    }

    /// # Errors
    ///
    /// [`SessionError::NotSubscribed`] if `source` has no subscription
    pub fn unsubscribe(&mut self, source: SensorSource) -> Result<(), SessionError> {
        self.subscriptions
            .remove(&source)
            .map(|_| debug!("Unsubscribed from {source}"))
            .ok_or(SessionError::NotSubscribed(source))
    }

    pub fn is_subscribed(&self, source: SensorSource) -> bool {
        self.subscriptions.contains_key(&source)
    }

    /// Whether `source` is subscribed but stopped by a stream error
    pub fn is_halted(&self, source: SensorSource) -> bool {
        self.subscriptions
            .get(&source)
            .is_some_and(|subscription| subscription.halted)
    }

    /// Ends the session: drops every subscription, the active route and
    /// any route request still in flight
    pub fn teardown(&mut self) {
        if let Some(ticket) = self.pending.take() {
            debug!("Abandoning route request #{ticket} on teardown");
        }
        for source in SensorSource::ALL {
            if self.subscriptions.remove(&source).is_some() {
                debug!("Unsubscribed from {source} on teardown");
            }
        }
        self.tracker.unload();
    }

    /// Issues a ticket for a new route request. Only the response for the
    /// most recently issued ticket will be applied, and only once.
    pub fn begin_route_request(&mut self) -> RouteTicket {
        self.issued += 1;
        self.pending = Some(self.issued);
        RouteTicket(self.issued)
    }

    /// Applies the response of a route request
    ///
    /// A successful response for the latest ticket replaces the active route
    /// and resets the walk. A failed one leaves the active route untouched.
    /// Either way the ticket is used up.
    ///
    /// # Errors
    ///
    /// [`SessionError::StaleResponse`] when a newer request was issued since
    /// `ticket`, the ticket was already completed or the session was torn
    /// down; [`SessionError::Route`] when the request itself failed
    pub fn complete_route_request(
        &mut self,
        ticket: RouteTicket,
        response: Result<Route, RouteError>,
    ) -> Result<ProgressSnapshot, SessionError> {
        let latest = RouteTicket(self.issued);
        if self.pending != Some(ticket.0) {
            debug!("Discarding route response {ticket}, latest is {latest}");
            return Err(SessionError::StaleResponse { ticket, latest });
        }
        self.pending = None;

        let route = response?;
        info!("Loaded route {} -> {} ({ticket})", route.from, route.to);
        Ok(self.load_polyline(route.polyline))
    }

    /// Replaces the active route with `polyline` outside of the request
    /// sequencing, e.g. for a route computed locally
    pub fn load_polyline(&mut self, polyline: Polyline) -> ProgressSnapshot {
        let snapshot = self.tracker.load(polyline);
        if let Some(polyline) = self.tracker.polyline() {
            self.sink.route_loaded(polyline, &snapshot);
        }
        snapshot
    }

    pub fn on_acceleration(&mut self, sample: AccelerationSample) -> Option<ProgressSnapshot> {
        if !self.accepts(SensorSource::StepDetection) {
            return None;
        }
        let snapshot = self.tracker.apply_acceleration(sample);
        self.emit(snapshot)
    }

    pub fn on_fix(&mut self, fix: GeoFix) -> Option<ProgressSnapshot> {
        let subscription = self.subscriptions.get_mut(&SensorSource::Geolocation)?;
        if subscription.halted {
            info!("Geolocation resumed");
            subscription.halted = false;
        }
        let snapshot = self.tracker.apply_fix(fix);
        self.emit(snapshot)
    }

    /// Geolocation stream error; the source stays halted until the next fix
    pub fn on_fix_error(&mut self, message: &str) {
        if let Some(subscription) = self.subscriptions.get_mut(&SensorSource::Geolocation) {
            warn!("Geolocation error: {message}");
            subscription.halted = true;
        }
    }

    pub fn on_manual(&mut self) -> Option<ProgressSnapshot> {
        if !self.accepts(SensorSource::Manual) {
            return None;
        }
        let snapshot = self.tracker.apply_manual();
        self.emit(snapshot)
    }

    fn accepts(&self, source: SensorSource) -> bool {
        self.subscriptions
            .get(&source)
            .is_some_and(|subscription| !subscription.halted)
    }

    fn emit(&mut self, snapshot: Option<ProgressSnapshot>) -> Option<ProgressSnapshot> {
        let snapshot = snapshot?;
        if let Some(polyline) = self.tracker.polyline() {
            self.sink.progress(polyline, &snapshot);
        }
        Some(snapshot)
    }
}
