use crate::core::config::ServiceEndpoints;
use crate::core::crs::Crs;
use crate::core::geo::LatLngBounds;
use crate::layers::descriptor::WmsDescriptor;

/// Namespace served by the live geoserver; everything else is static.
pub const OPERATIONAL_NAMESPACE: &str = "LIWO_Operationeel";

/// Picks the backing service endpoint for a WMS namespace.
pub fn geoserver_url(services: &ServiceEndpoints, namespace: Option<&str>) -> String {
    if namespace == Some(OPERATIONAL_NAMESPACE) {
        services.dynamic_geoserver_url.clone()
    } else {
        services.static_geoserver_url.clone()
    }
}

/// WMS-backed raster overlay.
///
/// Format is always an alpha-capable PNG and transparency is always on, so
/// flood extents composite over the base map.
#[derive(Debug, Clone)]
pub struct WmsLayer {
    id: Option<String>,
    endpoint: String,
    layer: String,
    styles: Option<String>,
    attribution: Option<String>,
    opacity: f64,
}

impl WmsLayer {
    pub const FORMAT: &'static str = "image/png";
    pub const TRANSPARENT: bool = true;

    pub fn new(services: &ServiceEndpoints, descriptor: WmsDescriptor) -> Self {
        Self {
            endpoint: geoserver_url(services, descriptor.namespace.as_deref()),
            id: descriptor.id,
            layer: descriptor.layer,
            styles: descriptor.style,
            attribution: descriptor.attribution,
            opacity: descriptor.opacity,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn styles(&self) -> Option<&str> {
        self.styles.as_deref()
    }

    pub fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Builds a GetMap request URL for one rendered image.
    pub fn request_url(&self, crs: Crs, bounds: &LatLngBounds, width: u32, height: u32) -> String {
        format!(
            "{endpoint}?service=WMS&request=GetMap&version=1.1.1&layers={layers}&styles={styles}&format=image%2Fpng&transparent=true&srs={srs}&bbox={min_lng},{min_lat},{max_lng},{max_lat}&width={width}&height={height}",
            endpoint = self.endpoint,
            layers = self.layer,
            styles = self.styles.as_deref().unwrap_or_default(),
            srs = crs.code(),
            min_lng = bounds.south_west.lng,
            min_lat = bounds.south_west.lat,
            max_lng = bounds.north_east.lng,
            max_lat = bounds.north_east.lat,
        )
    }
}
