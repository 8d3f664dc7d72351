//! Declarative layer descriptors.
//!
//! A descriptor names a layer kind and carries only the payload that kind
//! needs, so invalid combinations are unrepresentable. Untagged input is
//! kept as an explicit legacy variant: historically a descriptor without a
//! kind was rendered as a WMS overlay unless `hideWms` suppressed it, and
//! configuration in the wild still relies on that.

use crate::data::geojson::GeoJson;
use serde::Deserialize;

fn default_opacity() -> f64 {
    1.0
}

/// A declarative layer description, one per overlay.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LayerDescriptor {
    Kind(KindDescriptor),
    Legacy(LegacyDescriptor),
}

/// Kind-tagged descriptor payloads.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KindDescriptor {
    /// Plain vector overlay; `json` is the historical tag for it
    #[serde(alias = "json")]
    Vector {
        #[serde(default, rename = "layerId")]
        id: Option<String>,
        geojson: GeoJson,
        #[serde(default)]
        style: Option<String>,
    },
    /// Clustered point overlay; `layer` is the breach category token
    Cluster {
        #[serde(default, rename = "layerId")]
        id: Option<String>,
        #[serde(default)]
        layer: Option<String>,
        geojson: GeoJson,
    },
    /// Raster tile overlay
    Tile {
        #[serde(default, rename = "layerId")]
        id: Option<String>,
        url: String,
        #[serde(default = "default_opacity")]
        opacity: f64,
    },
    Wms(WmsDescriptor),
}

/// Payload for a WMS-backed raster overlay.
#[derive(Debug, Clone, Deserialize)]
pub struct WmsDescriptor {
    #[serde(default, rename = "layerId")]
    pub id: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    pub layer: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

/// Untagged descriptor: defaults to WMS unless explicitly suppressed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyDescriptor {
    #[serde(default, rename = "layerId")]
    pub id: Option<String>,
    #[serde(default, rename = "hideWms")]
    pub hide_wms: bool,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub layer: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub opacity: Option<f64>,
}

impl LegacyDescriptor {
    /// Resolves the implicit default: a WMS payload, or `None` when the
    /// descriptor opted out with `hideWms`.
    pub fn resolve_wms(&self) -> Option<WmsDescriptor> {
        if self.hide_wms {
            return None;
        }
        Some(WmsDescriptor {
            id: self.id.clone(),
            namespace: self.namespace.clone(),
            layer: self.layer.clone().unwrap_or_default(),
            style: self.style.clone(),
            attribution: self.attribution.clone(),
            opacity: self.opacity.unwrap_or(1.0),
        })
    }
}

impl LayerDescriptor {
    /// Raster tile descriptor
    pub fn tile(url: impl Into<String>, opacity: f64) -> Self {
        Self::Kind(KindDescriptor::Tile {
            id: None,
            url: url.into(),
            opacity,
        })
    }

    /// Clustered point descriptor with a breach category token
    pub fn cluster(category: impl Into<String>, geojson: GeoJson) -> Self {
        Self::Kind(KindDescriptor::Cluster {
            id: None,
            layer: Some(category.into()),
            geojson,
        })
    }

    /// Plain vector descriptor with a class-name style selector
    pub fn vector(geojson: GeoJson, style: Option<String>) -> Self {
        Self::Kind(KindDescriptor::Vector {
            id: None,
            geojson,
            style,
        })
    }

    /// Explicitly suppressed legacy descriptor (renders nothing)
    pub fn suppressed() -> Self {
        Self::Legacy(LegacyDescriptor {
            hide_wms: true,
            ..LegacyDescriptor::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tile_descriptor() {
        let descriptor: LayerDescriptor = serde_json::from_str(
            r#"{ "type": "tile", "url": "https://x/{z}/{x}/{y}.png", "opacity": 0.8 }"#,
        )
        .unwrap();

        match descriptor {
            LayerDescriptor::Kind(KindDescriptor::Tile { url, opacity, .. }) => {
                assert_eq!(url, "https://x/{z}/{x}/{y}.png");
                assert_eq!(opacity, 0.8);
            }
            other => panic!("expected tile descriptor, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_json_alias_as_vector() {
        let descriptor: LayerDescriptor = serde_json::from_str(
            r#"{
                "type": "json",
                "style": "breach-lines",
                "geojson": { "type": "FeatureCollection", "features": [] }
            }"#,
        )
        .unwrap();

        assert!(matches!(
            descriptor,
            LayerDescriptor::Kind(KindDescriptor::Vector { .. })
        ));
    }

    #[test]
    fn test_parse_wms_descriptor() {
        let descriptor: LayerDescriptor = serde_json::from_str(
            r#"{
                "type": "wms",
                "namespace": "LIWO_Operationeel",
                "layer": "waterdiepte",
                "style": "liwo:waterdiepte"
            }"#,
        )
        .unwrap();

        match descriptor {
            LayerDescriptor::Kind(KindDescriptor::Wms(wms)) => {
                assert_eq!(wms.namespace.as_deref(), Some("LIWO_Operationeel"));
                assert_eq!(wms.layer, "waterdiepte");
                assert_eq!(wms.opacity, 1.0);
            }
            other => panic!("expected wms descriptor, got {other:?}"),
        }
    }

    #[test]
    fn test_untagged_input_is_legacy() {
        let descriptor: LayerDescriptor =
            serde_json::from_str(r#"{ "namespace": "LIWO_Basis", "layer": "dijkringen" }"#)
                .unwrap();

        match descriptor {
            LayerDescriptor::Legacy(legacy) => {
                let wms = legacy.resolve_wms().expect("defaults to wms");
                assert_eq!(wms.layer, "dijkringen");
            }
            other => panic!("expected legacy descriptor, got {other:?}"),
        }
    }

    #[test]
    fn test_hide_wms_suppresses_legacy() {
        let descriptor: LayerDescriptor =
            serde_json::from_str(r#"{ "hideWms": true }"#).unwrap();

        match descriptor {
            LayerDescriptor::Legacy(legacy) => assert!(legacy.resolve_wms().is_none()),
            other => panic!("expected legacy descriptor, got {other:?}"),
        }
    }
}
