use geo::{Coord, LineString};
use itertools::Itertools;

use crate::{Error, Meters};

/// Ordered route geometry with cached, rounded segment lengths
///
/// The total distance is the sum of the same rounded lengths that
/// [`Polyline::position_at`] walks, so the distance display and the
/// position on the map always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Coord<f64>>,
    segment_lengths: Vec<Meters>,
    total_distance: Meters,
}

/// Where a walked distance lands on a polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutePosition {
    pub point: Coord<f64>,
    /// Number of segments walked to their end
    pub completed_segments: usize,
}

impl Polyline {
    /// # Errors
    ///
    /// Returns [`Error::EmptyPolyline`] when `points` is empty
    pub fn new(points: Vec<Coord<f64>>) -> Result<Self, Error> {
        if points.is_empty() {
            return Err(Error::EmptyPolyline);
        }

        let segment_lengths: Vec<Meters> = points
            .iter()
            .tuple_windows()
            .map(|(start, end)| rounded_length(*start, *end))
            .collect();
        let total_distance = segment_lengths
            .iter()
            .fold(0, |total: Meters, length| total.saturating_add(*length));

        Ok(Self {
            points,
            segment_lengths,
            total_distance,
        })
    }

    pub fn points(&self) -> &[Coord<f64>] {
        &self.points
    }

    pub fn first(&self) -> Coord<f64> {
        self.points[0]
    }

    pub fn last(&self) -> Coord<f64> {
        self.points[self.points.len() - 1]
    }

    pub fn segment_lengths(&self) -> &[Meters] {
        &self.segment_lengths
    }

    pub fn segment_count(&self) -> usize {
        self.segment_lengths.len()
    }

    pub fn total_distance(&self) -> Meters {
        self.total_distance
    }

    /// Maps a walked distance onto the polyline
    ///
    /// Whole segments are consumed while the walked distance covers them,
    /// then the position is interpolated linearly inside the next one.
    pub fn position_at(&self, walked: Meters) -> RoutePosition {
        if walked == 0 {
            return RoutePosition {
                point: self.first(),
                completed_segments: 0,
            };
        }
        if walked >= self.total_distance {
            return RoutePosition {
                point: self.last(),
                completed_segments: self.segment_count(),
            };
        }

        let mut remaining = walked;
        for (idx, (&length, (start, end))) in self
            .segment_lengths
            .iter()
            .zip(self.points.iter().tuple_windows())
            .enumerate()
        {
            if remaining >= length {
                remaining -= length;
                continue;
            }

            // remaining < length, so length is never zero here
            let ratio = f64::from(remaining) / f64::from(length);
            return RoutePosition {
                point: *start + (*end - *start) * ratio,
                completed_segments: idx,
            };
        }

        RoutePosition {
            point: self.last(),
            completed_segments: self.segment_count(),
        }
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.points.clone())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rounded_length(start: Coord<f64>, end: Coord<f64>) -> Meters {
    (end.x - start.x).hypot(end.y - start.y).round() as Meters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    /// A(0,0) - B(3,0) - C(3,4): segments of 3 and 4
    fn abc() -> Polyline {
        Polyline::new(vec![coord(0.0, 0.0), coord(3.0, 0.0), coord(3.0, 4.0)]).unwrap()
    }

    #[test]
    fn empty_polyline_is_rejected() {
        assert!(matches!(Polyline::new(vec![]), Err(Error::EmptyPolyline)));
    }

    #[test]
    fn total_is_sum_of_rounded_segments() {
        let line = Polyline::new(vec![coord(0.0, 0.0), coord(1.4, 0.0), coord(1.4, 2.6)]).unwrap();
        assert_eq!(line.segment_lengths(), &[1, 3]);
        assert_eq!(line.total_distance(), 4);
        assert_eq!(abc().total_distance(), 7);
    }

    #[test]
    fn endpoints_are_exact() {
        let line = abc();
        assert_eq!(line.position_at(0).point, line.first());
        assert_eq!(line.position_at(7).point, line.last());
        assert_eq!(line.position_at(100).point, line.last());
        assert_eq!(line.position_at(7).completed_segments, 2);
    }

    #[test]
    fn lands_on_interior_vertex() {
        let position = abc().position_at(3);
        assert_eq!(position.point, coord(3.0, 0.0));
        assert_eq!(position.completed_segments, 1);
    }

    #[test]
    fn interpolates_within_segment() {
        let line = abc();
        assert_eq!(line.position_at(4).point, coord(3.0, 1.0));
        assert_eq!(line.position_at(5).point, coord(3.0, 2.0));

        let early = line.position_at(1);
        assert!((early.point.x - 1.0).abs() < 1e-9);
        assert_eq!(early.point.y, 0.0);
        assert_eq!(early.completed_segments, 0);
    }

    #[test]
    fn completed_segments_never_decrease() {
        let line = Polyline::new(vec![
            coord(0.0, 0.0),
            coord(10.0, 0.0),
            coord(10.0, 0.2),
            coord(10.0, 25.0),
            coord(-5.0, 25.0),
        ])
        .unwrap();

        let mut last = 0;
        for walked in 0..=line.total_distance() + 5 {
            let completed = line.position_at(walked).completed_segments;
            assert!(completed >= last, "walked {walked}: {completed} < {last}");
            last = completed;
        }
        assert_eq!(last, line.segment_count());
    }

    #[test]
    fn zero_length_segments_are_skipped() {
        let line = Polyline::new(vec![
            coord(0.0, 0.0),
            coord(0.0, 0.0),
            coord(4.0, 0.0),
        ])
        .unwrap();
        assert_eq!(line.total_distance(), 4);

        let position = line.position_at(2);
        assert_eq!(position.point, coord(2.0, 0.0));
        assert_eq!(position.completed_segments, 1);
    }

    #[test]
    fn single_point_polyline() {
        let line = Polyline::new(vec![coord(5.0, 5.0)]).unwrap();
        assert_eq!(line.total_distance(), 0);
        assert_eq!(line.segment_count(), 0);
        assert_eq!(line.position_at(0).point, coord(5.0, 5.0));
        assert_eq!(line.position_at(10).point, coord(5.0, 5.0));
    }
}
