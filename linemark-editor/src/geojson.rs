//! GeoJSON export of rendered layouts
//!
//! Coordinates follow GeoJSON order, `[lng, lat]`.

use serde_json::{json, Value};

use crate::geo::LatLng;
use crate::layout::RenderedLayout;

fn position(point: &LatLng) -> Value {
    json!([point.lng, point.lat])
}

fn positions(points: &[LatLng]) -> Value {
    Value::Array(points.iter().map(position).collect())
}

impl RenderedLayout {
    /// Builds a `FeatureCollection` with the outline polygon first, then one
    /// `LineString` per marking
    pub fn to_geojson(&self) -> Value {
        let mut features = Vec::with_capacity(1 + self.markings.len());

        features.push(json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [positions(&self.outline)],
            },
            "properties": {
                "role": "outline",
                "stroke": self.color.as_str(),
            },
        }));

        for (index, line) in self.markings.iter().enumerate() {
            features.push(json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": positions(line),
                },
                "properties": {
                    "role": "marking",
                    "index": index,
                    "stroke": self.color.as_str(),
                },
            }));
        }

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::geo::LatLng;
    use crate::layout::{FieldLayout, LineColor};
    use crate::markings::presets;

    #[test]
    fn test_feature_collection_shape() {
        let layout = FieldLayout::new(
            LatLng::new(-33.8688, 151.2093),
            0.0,
            100.0,
            64.0,
            LineColor::default(),
        );
        let rendered = layout.render(&presets::rugby());
        let value = rendered.to_geojson();

        assert_eq!(value["type"], "FeatureCollection");
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 1 + rendered.markings.len());

        let outline = &features[0]["geometry"];
        assert_eq!(outline["type"], "Polygon");
        let ring = outline["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());

        // [lng, lat] order
        let first = ring[0].as_array().unwrap();
        assert!(first[0].as_f64().unwrap() > 151.0);
        assert!(first[1].as_f64().unwrap() < -33.0);

        assert_eq!(features[1]["geometry"]["type"], "LineString");
        assert_eq!(features[1]["properties"]["stroke"], "#ffffff");
    }
}
