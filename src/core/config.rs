//! Process-wide map defaults and the per-call map configuration.
//!
//! The defaults mirror what the persisted application configuration ships:
//! base-layer tile catalogues with one URL per CRS, attribution, per-CRS
//! zoom limits and the geoserver/webservice endpoints. A [`MapConfig`]
//! supplied by the hosting view overrides them field by field.

use crate::core::crs::Crs;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::prelude::HashMap;

/// One configured base-layer tile source, keyed by CRS URL variant.
#[derive(Debug, Clone)]
pub struct TileSourceDef {
    pub title: String,
    urls: HashMap<Crs, String>,
}

impl TileSourceDef {
    pub fn new(title: impl Into<String>, urls: impl IntoIterator<Item = (Crs, String)>) -> Self {
        Self {
            title: title.into(),
            urls: urls.into_iter().collect(),
        }
    }

    pub fn url_for(&self, crs: Crs) -> Option<&str> {
        self.urls.get(&crs).map(String::as_str)
    }
}

/// Remote service endpoints consulted by layers and the export call.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    /// Live geoserver backing the operational namespace
    pub dynamic_geoserver_url: String,
    /// Static geoserver for everything else
    pub static_geoserver_url: String,
    /// Export webservice base URL
    pub webservice_url: String,
}

/// Process-wide defaults, resolved once at startup.
#[derive(Debug, Clone)]
pub struct MapDefaults {
    pub attribution: String,
    pub zoom: f64,
    pub continuous_world: bool,
    pub tile_layers: Vec<TileSourceDef>,
    pub services: ServiceEndpoints,
    max_zoom: HashMap<Crs, f64>,
    min_zoom: HashMap<Crs, f64>,
}

impl MapDefaults {
    pub fn max_zoom(&self, crs: Crs) -> f64 {
        self.max_zoom.get(&crs).copied().unwrap_or(18.0)
    }

    pub fn min_zoom(&self, crs: Crs) -> f64 {
        self.min_zoom.get(&crs).copied().unwrap_or(0.0)
    }

    /// Title of the base layer the composer activates first.
    pub fn initial_base_layer(&self) -> Option<&str> {
        self.tile_layers.first().map(|l| l.title.as_str())
    }
}

static DEFAULTS: Lazy<MapDefaults> = Lazy::new(|| MapDefaults {
    attribution: "Kaartgegevens © Kadaster".to_string(),
    zoom: 3.0,
    continuous_world: true,
    tile_layers: vec![
        TileSourceDef::new(
            "Kaart",
            [
                (
                    Crs::Epsg28992,
                    "https://geodata.nationaalgeoregister.nl/tiles/service/wmts/brtachtergrondkaart/EPSG:28992/{z}/{x}/{y}.png".to_string(),
                ),
                (
                    Crs::Epsg3857,
                    "https://geodata.nationaalgeoregister.nl/tiles/service/wmts/brtachtergrondkaart/EPSG:3857/{z}/{x}/{y}.png".to_string(),
                ),
            ],
        ),
        TileSourceDef::new(
            "Luchtfoto",
            [
                (
                    Crs::Epsg28992,
                    "https://geodata.nationaalgeoregister.nl/luchtfoto/rgb/wmts/EPSG:28992/{z}/{x}/{y}.jpeg".to_string(),
                ),
                (
                    Crs::Epsg3857,
                    "https://geodata.nationaalgeoregister.nl/luchtfoto/rgb/wmts/EPSG:3857/{z}/{x}/{y}.jpeg".to_string(),
                ),
            ],
        ),
    ],
    services: ServiceEndpoints {
        dynamic_geoserver_url: "https://geoserver.lizard.net/wms".to_string(),
        static_geoserver_url: "https://geoserver-static.lizard.net/wms".to_string(),
        webservice_url: "https://basisinformatie-overstromingen.nl/liwo.ws".to_string(),
    },
    max_zoom: [(Crs::Epsg28992, 12.0), (Crs::Epsg3857, 19.0)]
        .into_iter()
        .collect(),
    min_zoom: [(Crs::Epsg28992, 2.0), (Crs::Epsg3857, 3.0)]
        .into_iter()
        .collect(),
});

/// Process-wide map defaults (attribution, zoom limits, tile catalogue,
/// service endpoints).
pub fn map_defaults() -> &'static MapDefaults {
    &DEFAULTS
}

/// Resolved options a canvas is constructed with.
#[derive(Debug, Clone)]
pub struct CanvasOptions {
    pub crs: Crs,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub attribution: String,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        let defaults = map_defaults();
        Self {
            crs: Crs::Epsg28992,
            zoom: defaults.zoom,
            min_zoom: defaults.min_zoom(Crs::Epsg28992),
            max_zoom: defaults.max_zoom(Crs::Epsg28992),
            attribution: defaults.attribution.clone(),
        }
    }
}

/// Base-layer options the hosting view can set per map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BaseLayerConfig {
    #[serde(default)]
    pub tms: bool,
}

/// Per-call map configuration supplied by the hosting view.
///
/// Every field except `projection` falls back to [`map_defaults`].
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    pub projection: Crs,
    #[serde(default)]
    pub zoom: Option<f64>,
    #[serde(default, rename = "maxZoom")]
    pub max_zoom: Option<f64>,
    #[serde(default, rename = "minZoom")]
    pub min_zoom: Option<f64>,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default, rename = "continuousWorld")]
    pub continuous_world: Option<bool>,
    #[serde(default, rename = "baseLayer")]
    pub base_layer: BaseLayerConfig,
}

impl MapConfig {
    pub fn new(projection: Crs) -> Self {
        Self {
            projection,
            zoom: None,
            max_zoom: None,
            min_zoom: None,
            attribution: None,
            continuous_world: None,
            base_layer: BaseLayerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_per_crs_zoom_limits() {
        let defaults = map_defaults();
        assert!(defaults.max_zoom(Crs::Epsg3857) > defaults.max_zoom(Crs::Epsg28992));
        assert!(defaults.min_zoom(Crs::Epsg28992) >= 0.0);
    }

    #[test]
    fn test_tile_sources_carry_both_crs_variants() {
        let defaults = map_defaults();
        for source in &defaults.tile_layers {
            assert!(source.url_for(Crs::Epsg3857).is_some(), "{}", source.title);
            assert!(source.url_for(Crs::Epsg28992).is_some(), "{}", source.title);
        }
    }

    #[test]
    fn test_initial_base_layer_is_first_title() {
        assert_eq!(map_defaults().initial_base_layer(), Some("Kaart"));
    }

    #[test]
    fn test_map_config_from_json() {
        let config: MapConfig = serde_json::from_str(
            r#"{ "projection": "EPSG:28992", "zoom": 5, "baseLayer": { "tms": true } }"#,
        )
        .unwrap();

        assert_eq!(config.projection, Crs::Epsg28992);
        assert_eq!(config.zoom, Some(5.0));
        assert!(config.base_layer.tms);
        assert!(config.attribution.is_none());
    }
}
