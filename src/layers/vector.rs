use crate::core::geo::LatLngBounds;
use crate::data::geojson::{GeoJson, GeoJsonFeature};

/// Plain vector overlay.
///
/// The only per-layer styling hook is a class-name selector; anything
/// fancier belongs to the rendering substrate's stylesheet.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    id: Option<String>,
    geojson: GeoJson,
    style_class: Option<String>,
}

impl VectorLayer {
    pub fn new(id: Option<String>, geojson: GeoJson, style_class: Option<String>) -> Self {
        Self {
            id,
            geojson,
            style_class,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn style_class(&self) -> Option<&str> {
        self.style_class.as_deref()
    }

    pub fn features(&self) -> &[GeoJsonFeature] {
        self.geojson.features()
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.geojson.bounds()
    }
}
