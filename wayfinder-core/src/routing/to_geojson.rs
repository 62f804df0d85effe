use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::Route;
use crate::Error;

impl Route {
    /// Converts the route to a `GeoJSON` `FeatureCollection` holding one
    /// `LineString` feature in plan coordinates.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let geometry = Geometry::new(GeoJsonValue::from(&self.polyline.to_line_string()));

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "from": self.from,
                "to": self.to,
                "nodes": self.nodes,
                "dropped_nodes": self.dropped_nodes,
                "distance": self.total_distance(),
                "segment_lengths": self.polyline.segment_lengths(),
            }
        });
        let feature =
            Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))?;

        Ok(FeatureCollection {
            features: vec![feature],
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}
