use std::io::{self, Write};

use serde::Serialize;
use wayfinder_core::prelude::{
    FacilityStore, NavigationSession, Polyline, ProgressSink, ProgressSnapshot, SensorPermission,
    SensorSource, TrackerConfig, WalkPhase,
};
use wayfinder_core::{Meters, RouteQuery, find_route};

use crate::error::CliError;
use crate::trace::SensorEvent;

/// Writes every snapshot it receives as one JSON line
pub struct JsonLines<W: Write> {
    out: W,
    written: usize,
    error: Option<io::Error>,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            written: 0,
            error: None,
        }
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        self.out.write_all(b"\n")
    }

    /// Returns the writer, or the first write error seen
    pub fn finish(mut self) -> io::Result<W> {
        match self.error.take() {
            Some(err) => Err(err),
            None => {
                self.out.flush()?;
                Ok(self.out)
            }
        }
    }
}

impl<W: Write> ProgressSink for JsonLines<W> {
    fn progress(&mut self, _polyline: &Polyline, snapshot: &ProgressSnapshot) {
        if self.error.is_some() {
            return;
        }
        match self.write_line(snapshot) {
            Ok(()) => self.written += 1,
            Err(err) => self.error = Some(err),
        }
    }
}

/// Last line of a replay
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReplaySummary {
    pub phase: WalkPhase,
    pub walked: Meters,
    pub remaining: Meters,
    pub events: usize,
    pub accepted: usize,
}

/// Loads the route through a session and feeds it the recorded events
pub fn replay<S, W>(
    store: &S,
    query: &RouteQuery,
    events: &[SensorEvent],
    config: TrackerConfig,
    out: W,
) -> Result<ReplaySummary, CliError>
where
    S: FacilityStore + ?Sized,
    W: Write,
{
    let mut session = NavigationSession::new(config, JsonLines::new(out));
    for source in SensorSource::ALL {
        session.subscribe(source, SensorPermission::Granted)?;
    }

    let ticket = session.begin_route_request();
    session.complete_route_request(ticket, find_route(store, query))?;

    let mut accepted = 0;
    for event in events {
        let update = match *event {
            SensorEvent::Acceleration(sample) => session.on_acceleration(sample),
            SensorEvent::Fix(fix) => session.on_fix(fix),
            SensorEvent::FixError { timestamp_ms } => {
                session.on_fix_error(&format!("recorded error at {timestamp_ms} ms"));
                None
            }
            SensorEvent::Manual { .. } => session.on_manual(),
        };
        if update.is_some() {
            accepted += 1;
        }
    }

    let walk = session.tracker().walk_state();
    let summary = ReplaySummary {
        phase: session.phase(),
        walked: walk.walked,
        remaining: walk.remaining(),
        events: events.len(),
        accepted,
    };
    tracing::info!(
        "Replayed {} events, {} accepted, final phase {:?}",
        summary.events,
        summary.accepted,
        summary.phase
    );

    session.teardown();
    let mut sink = JsonLines::new(session.into_sink().finish()?);
    sink.write_line(&summary)?;
    sink.finish()?;
    Ok(summary)
}
