use geo::Point;

/// Sphere radius used for fix-to-fix distances
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points given as
/// `Point::new(lon, lat)` in degrees
pub fn haversine_distance(from: Point<f64>, to: Point<f64>) -> f64 {
    let lat_from = from.y().to_radians();
    let lat_to = to.y().to_radians();
    let d_lat = (to.y() - from.y()).to_radians();
    let d_lon = (to.x() - from.x()).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat_from.cos() * lat_to.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}
