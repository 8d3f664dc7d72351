use crate::core::geo::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// GeoJSON geometry types the overlay layers consume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: [f64; 2],
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
}

impl GeoJsonGeometry {
    /// Converts coordinates to LatLng points (GeoJSON is lng-first)
    pub fn to_lat_lng_points(&self) -> Vec<LatLng> {
        match self {
            GeoJsonGeometry::Point { coordinates } => {
                vec![LatLng::new(coordinates[1], coordinates[0])]
            }
            GeoJsonGeometry::MultiPoint { coordinates }
            | GeoJsonGeometry::LineString { coordinates } => coordinates
                .iter()
                .map(|c| LatLng::new(c[1], c[0]))
                .collect(),
            GeoJsonGeometry::Polygon { coordinates } => coordinates
                .first()
                .map(|exterior| exterior.iter().map(|c| LatLng::new(c[1], c[0])).collect())
                .unwrap_or_default(),
        }
    }
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub geometry: Option<GeoJsonGeometry>,
    pub properties: Option<HashMap<String, serde_json::Value>>,
}

impl GeoJsonFeature {
    fn string_property(&self, key: &str) -> Option<&str> {
        self.properties.as_ref()?.get(key)?.as_str()
    }

    /// Display name of the feature (the `naam` property)
    pub fn display_name(&self) -> Option<&str> {
        self.string_property("naam")
    }

    /// Variant label, present when the hosting view selected one
    pub fn selected_variant(&self) -> Option<&str> {
        self.string_property("selectedVariant")
    }

    /// Tooltip text: `"<name>"`, or `"<name> - <variant>"` with a variant
    pub fn tooltip_text(&self) -> String {
        let name = self.display_name().unwrap_or_default();
        match self.selected_variant() {
            Some(variant) => format!("{name} - {variant}"),
            None => name.to_string(),
        }
    }

    /// Anchor point for a point feature, `None` for other geometries
    pub fn point(&self) -> Option<LatLng> {
        match self.geometry.as_ref()? {
            GeoJsonGeometry::Point { coordinates } => {
                Some(LatLng::new(coordinates[1], coordinates[0]))
            }
            _ => None,
        }
    }
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection { features: Vec<GeoJsonFeature> },
}

impl GeoJson {
    pub fn from_str(geojson_str: &str) -> crate::Result<Self> {
        serde_json::from_str(geojson_str)
            .map_err(|e| crate::Error::ParseError(format!("Invalid GeoJSON: {e}")))
    }

    pub fn features(&self) -> &[GeoJsonFeature] {
        match self {
            GeoJson::Feature(feature) => std::slice::from_ref(feature),
            GeoJson::FeatureCollection { features } => features,
        }
    }

    /// Bounding box of every geometry in the collection
    pub fn bounds(&self) -> Option<LatLngBounds> {
        let mut bounds: Option<LatLngBounds> = None;
        for feature in self.features() {
            let Some(geometry) = &feature.geometry else {
                continue;
            };
            for point in geometry.to_lat_lng_points() {
                match bounds.as_mut() {
                    Some(b) => b.extend(&point),
                    None => bounds = Some(LatLngBounds::new(point, point)),
                }
            }
        }
        bounds
    }
}
