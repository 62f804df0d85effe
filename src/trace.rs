use std::fmt;
use std::io::Read;

use serde::Deserialize;
use thiserror::Error;
use wayfinder_core::Millis;
use wayfinder_core::prelude::{AccelerationSample, GeoFix};

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace: {0}")]
    Csv(#[from] csv::Error),
    #[error("Trace line {line}: {kind} event is missing `{field}`")]
    MissingField {
        line: usize,
        kind: EventKind,
        field: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Accel,
    Fix,
    FixError,
    Manual,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Accel => "accel",
            Self::Fix => "fix",
            Self::FixError => "fix_error",
            Self::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// One row of a recorded trace; unused columns stay empty
#[derive(Debug, Deserialize)]
struct TraceRecord {
    timestamp_ms: Millis,
    kind: EventKind,
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
    lat: Option<f64>,
    lon: Option<f64>,
    accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    Acceleration(AccelerationSample),
    Fix(GeoFix),
    FixError { timestamp_ms: Millis },
    Manual { timestamp_ms: Millis },
}

impl TraceRecord {
    fn into_event(self, line: usize) -> Result<SensorEvent, TraceError> {
        let kind = self.kind;
        let require = |value: Option<f64>, field| {
            value.ok_or(TraceError::MissingField { line, kind, field })
        };

        Ok(match kind {
            EventKind::Accel => SensorEvent::Acceleration(AccelerationSample::new(
                require(self.x, "x")?,
                require(self.y, "y")?,
                require(self.z, "z")?,
                self.timestamp_ms,
            )),
            EventKind::Fix => SensorEvent::Fix(GeoFix {
                latitude: require(self.lat, "lat")?,
                longitude: require(self.lon, "lon")?,
                accuracy: self.accuracy,
            }),
            EventKind::FixError => SensorEvent::FixError {
                timestamp_ms: self.timestamp_ms,
            },
            EventKind::Manual => SensorEvent::Manual {
                timestamp_ms: self.timestamp_ms,
            },
        })
    }
}

/// Reads a sensor trace in file order
pub fn read_trace<R: Read>(reader: R) -> Result<Vec<SensorEvent>, TraceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .deserialize::<TraceRecord>()
        .enumerate()
        // line 1 is the header
        .map(|(index, record)| record?.into_event(index + 2))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "timestamp_ms,kind,x,y,z,lat,lon,accuracy\n";

    fn parse(rows: &str) -> Result<Vec<SensorEvent>, TraceError> {
        read_trace(format!("{HEADER}{rows}").as_bytes())
    }

    #[test]
    fn reads_every_kind() {
        let events = parse(
            "0,accel,2.0,3.0,13.0,,,\n\
             100,fix,,,,52.52,13.405,4.5\n\
             200,fix_error,,,,,,\n\
             300,manual,,,,,,\n",
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                SensorEvent::Acceleration(AccelerationSample::new(2.0, 3.0, 13.0, 0)),
                SensorEvent::Fix(GeoFix {
                    latitude: 52.52,
                    longitude: 13.405,
                    accuracy: Some(4.5),
                }),
                SensorEvent::FixError { timestamp_ms: 200 },
                SensorEvent::Manual { timestamp_ms: 300 },
            ]
        );
    }

    #[test]
    fn accuracy_is_optional() {
        let events = parse("5, fix ,,,,1.0,2.0,\n").unwrap();
        assert_eq!(events, vec![SensorEvent::Fix(GeoFix::new(1.0, 2.0))]);
    }

    #[test]
    fn missing_field_names_line() {
        let err = parse("0,manual,,,,,,\n10,accel,1.0,,3.0,,,\n").unwrap_err();
        assert!(matches!(
            err,
            TraceError::MissingField {
                line: 3,
                kind: EventKind::Accel,
                field: "y",
            }
        ));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(matches!(
            parse("0,teleport,,,,,,\n"),
            Err(TraceError::Csv(_))
        ));
    }
}
