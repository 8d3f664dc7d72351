//! Clustered breach-point overlay.
//!
//! Markers are grid-clustered in canvas pixel space with a fixed 40 px
//! radius. The cluster icon is a pure function of child count and the
//! layer's category token. Cluster membership can be affected by state a
//! feature click mutates elsewhere (selection, variant choice), so the
//! layer exposes an explicit `refresh_clusters` the owner of the click
//! handler invokes afterwards; nothing refreshes automatically.

use crate::core::geo::{LatLng, LatLngBounds};
use crate::data::geojson::GeoJson;
use crate::icons::{IconDescriptor, IconRegistry};
use crate::layers::factory::{FeatureClick, SharedClickHandler};
use crate::{MapError, Result};

use log::debug;
use rstar::{RTree, RTreeObject, AABB};

use crate::prelude::HashMap;

/// Fixed clustering radius in canvas pixels.
pub const CLUSTER_RADIUS: f64 = 40.0;

/// Category token used when a cluster descriptor names none.
pub const DEFAULT_CLUSTER_CATEGORY: &str = "BREACH_PRIMARY";

/// HTML-flavored div icon for an aggregate marker.
#[derive(Debug, Clone, PartialEq)]
pub struct DivIcon {
    pub html: String,
    pub class_name: String,
    pub icon_size: (u32, u32),
}

/// Cluster icon markup: the child count inside a category-classed div.
pub fn cluster_icon(child_count: usize, category_token: &str) -> DivIcon {
    DivIcon {
        html: format!("<div><span>{child_count}</span></div>"),
        class_name: format!("cluster-icon cluster-icon__{category_token}"),
        icon_size: (45, 45),
    }
}

/// One point feature of the clustered sub-layer.
#[derive(Debug, Clone)]
pub struct Marker {
    id: String,
    lat_lng: LatLng,
    tooltip: String,
    tooltip_open: bool,
    icon: IconDescriptor,
}

impl Marker {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lat_lng(&self) -> LatLng {
        self.lat_lng
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    pub fn tooltip_open(&self) -> bool {
        self.tooltip_open
    }

    pub fn icon(&self) -> &IconDescriptor {
        &self.icon
    }
}

#[derive(Clone)]
struct IndexedMarker {
    id: String,
    lng: f64,
    lat: f64,
}

impl RTreeObject for IndexedMarker {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lng, self.lat])
    }
}

/// A rendered aggregate at one zoom level.
///
/// Singletons carry no div icon: the substrate renders the marker itself.
#[derive(Debug, Clone)]
pub struct ClusterView {
    pub marker_ids: Vec<String>,
    pub center: LatLng,
    pub icon: Option<DivIcon>,
}

impl ClusterView {
    pub fn count(&self) -> usize {
        self.marker_ids.len()
    }
}

/// Cluster container holding one clustered vector sub-layer.
pub struct ClusterLayer {
    layer_id: String,
    /// Id of the internal feature layer, the back-reference click events carry
    geojson_layer_id: String,
    category_token: String,
    markers: Vec<Marker>,
    index: RTree<IndexedMarker>,
    on_click: SharedClickHandler,
    cache: Option<ClusterCache>,
}

struct ClusterCache {
    zoom: f64,
    bounds: LatLngBounds,
    views: Vec<ClusterView>,
}

impl ClusterLayer {
    pub fn new(
        id: Option<String>,
        category_token: Option<String>,
        geojson: &GeoJson,
        icons: &IconRegistry,
        on_click: SharedClickHandler,
    ) -> Result<Self> {
        let category_token =
            category_token.unwrap_or_else(|| DEFAULT_CLUSTER_CATEGORY.to_string());
        let layer_id = id.unwrap_or_else(|| format!("cluster__{category_token}"));
        let geojson_layer_id = format!("{layer_id}__features");

        let mut markers = Vec::with_capacity(geojson.features().len());
        for (i, feature) in geojson.features().iter().enumerate() {
            let Some(lat_lng) = feature.point() else {
                return Err(MapError::Layer(format!(
                    "cluster layer {layer_id}: feature {i} is not a point"
                )));
            };
            let marker_id = feature
                .id
                .as_ref()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .unwrap_or_else(|| format!("{layer_id}__{i}"));
            markers.push(Marker {
                id: marker_id,
                lat_lng,
                tooltip: feature.tooltip_text(),
                tooltip_open: false,
                icon: icons.icon_for_token(&category_token).clone(),
            });
        }

        let index = RTree::bulk_load(
            markers
                .iter()
                .map(|m| IndexedMarker {
                    id: m.id.clone(),
                    lng: m.lat_lng.lng,
                    lat: m.lat_lng.lat,
                })
                .collect(),
        );

        debug!(
            "cluster layer {} holds {} markers ({})",
            layer_id,
            markers.len(),
            category_token
        );

        Ok(Self {
            layer_id,
            geojson_layer_id,
            category_token,
            markers,
            index,
            on_click,
            cache: None,
        })
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    pub fn geojson_layer_id(&self) -> &str {
        &self.geojson_layer_id
    }

    pub fn category_token(&self) -> &str {
        &self.category_token
    }

    pub fn child_count(&self) -> usize {
        self.markers.len()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, marker_id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == marker_id)
    }

    fn marker_mut(&mut self, marker_id: &str) -> Result<&mut Marker> {
        self.markers
            .iter_mut()
            .find(|m| m.id == marker_id)
            .ok_or_else(|| MapError::Layer(format!("unknown marker: {marker_id}")))
    }

    /// Markers inside the given viewport, via the spatial index.
    pub fn markers_within(&self, bounds: &LatLngBounds) -> Vec<&Marker> {
        let envelope = AABB::from_corners(
            [bounds.south_west.lng, bounds.south_west.lat],
            [bounds.north_east.lng, bounds.north_east.lat],
        );
        self.index
            .locate_in_envelope(&envelope)
            .filter_map(|item| self.marker(&item.id))
            .collect()
    }

    /// Aggregates the viewport's markers at the given zoom.
    ///
    /// Results are cached per (zoom, bounds) until the next refresh.
    pub fn clusters(&mut self, bounds: &LatLngBounds, zoom: f64) -> &[ClusterView] {
        let cache_valid = self
            .cache
            .as_ref()
            .is_some_and(|c| c.bounds == *bounds && (c.zoom - zoom).abs() < 0.01);

        if !cache_valid {
            let views = self.compute_clusters(bounds, zoom);
            self.cache = Some(ClusterCache {
                zoom,
                bounds: *bounds,
                views,
            });
        }

        // cache was just (re)filled above
        match &self.cache {
            Some(cache) => &cache.views,
            None => &[],
        }
    }

    fn compute_clusters(&self, bounds: &LatLngBounds, zoom: f64) -> Vec<ClusterView> {
        let mut grid: HashMap<(i64, i64), Vec<&Marker>> = HashMap::default();
        for marker in self.markers_within(bounds) {
            let pixel = marker.lat_lng.project(zoom);
            let cell = (
                (pixel.x / CLUSTER_RADIUS).floor() as i64,
                (pixel.y / CLUSTER_RADIUS).floor() as i64,
            );
            grid.entry(cell).or_default().push(marker);
        }

        let mut views = Vec::with_capacity(grid.len());
        for cell in grid.into_values() {
            let marker_ids: Vec<String> = cell.iter().map(|m| m.id.clone()).collect();
            let points: Vec<LatLng> = cell.iter().map(|m| m.lat_lng).collect();
            let center = LatLngBounds::from_points(&points)
                .map(|b| b.center())
                .unwrap_or_default();
            let icon = (cell.len() > 1).then(|| cluster_icon(cell.len(), &self.category_token));
            views.push(ClusterView {
                marker_ids,
                center,
                icon,
            });
        }
        views
    }

    /// Drops the cached aggregation so the next render rebuilds icons.
    ///
    /// The owner of the click-handling code calls this after any state
    /// mutation that could change cluster rendering.
    pub fn refresh_clusters(&mut self) {
        self.cache = None;
    }

    /// Dispatches a click on one marker to the registered handler.
    ///
    /// The event carries the originating feature-layer id and the owning
    /// cluster id so the caller can re-derive which sub-layer to refresh.
    pub fn click(&mut self, marker_id: &str) -> Result<()> {
        self.marker_mut(marker_id)?;
        let event = FeatureClick {
            marker_id: marker_id.to_string(),
            geojson_layer: self.geojson_layer_id.clone(),
            cluster_layer: Some(self.layer_id.clone()),
        };
        let handler = self.on_click.clone();
        let mut handler = handler
            .lock()
            .map_err(|_| MapError::Layer("click handler poisoned".to_string()))?;
        handler(event);
        Ok(())
    }

    /// Hover-in opens the marker's tooltip.
    pub fn hover_in(&mut self, marker_id: &str) -> Result<()> {
        self.marker_mut(marker_id)?.tooltip_open = true;
        Ok(())
    }

    /// Hover-out closes it again.
    pub fn hover_out(&mut self, marker_id: &str) -> Result<()> {
        self.marker_mut(marker_id)?.tooltip_open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn two_close_points() -> GeoJson {
        GeoJson::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {"naam": "Bres A"},
                        "geometry": {"type": "Point", "coordinates": [5.1, 51.9]}
                    },
                    {
                        "type": "Feature",
                        "properties": {"naam": "Bres B", "selectedVariant": "TP+1m"},
                        "geometry": {"type": "Point", "coordinates": [5.1001, 51.9001]}
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    fn noop_handler() -> SharedClickHandler {
        Arc::new(Mutex::new(|_event: FeatureClick| {}))
    }

    fn layer(category: &str) -> ClusterLayer {
        ClusterLayer::new(
            None,
            Some(category.to_string()),
            &two_close_points(),
            &IconRegistry::new(),
            noop_handler(),
        )
        .unwrap()
    }

    fn wide_bounds() -> LatLngBounds {
        LatLngBounds::new(LatLng::new(50.0, 3.0), LatLng::new(54.0, 8.0))
    }

    #[test]
    fn test_cluster_icon_contains_count_and_category() {
        let icon = cluster_icon(7, "BREACH_REGIONAL");
        assert_eq!(icon.html, "<div><span>7</span></div>");
        assert!(icon.class_name.contains("BREACH_REGIONAL"));
        assert_eq!(icon.icon_size, (45, 45));
    }

    #[test]
    fn test_two_nearby_points_form_one_cluster() {
        let mut layer = layer("BREACH_REGIONAL");
        let views = layer.clusters(&wide_bounds(), 3.0).to_vec();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].count(), 2);
        let icon = views[0].icon.as_ref().expect("aggregate has a div icon");
        assert_eq!(icon.html, "<div><span>2</span></div>");
        assert!(icon.class_name.contains("BREACH_REGIONAL"));
    }

    #[test]
    fn test_singletons_have_no_div_icon() {
        let mut layer = layer("BREACH_PRIMARY");
        // at zoom 22 the points project ~300px apart, in different 40px cells
        let views = layer.clusters(&wide_bounds(), 22.0).to_vec();
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.icon.is_none()));
    }

    #[test]
    fn test_tooltips_bound_per_feature() {
        let layer = layer("BREACH_PRIMARY");
        let tooltips: Vec<&str> = layer.markers().iter().map(|m| m.tooltip()).collect();
        assert!(tooltips.contains(&"Bres A"));
        assert!(tooltips.contains(&"Bres B - TP+1m"));
    }

    #[test]
    fn test_hover_opens_and_closes_tooltip() {
        let mut layer = layer("BREACH_PRIMARY");
        let id = layer.markers()[0].id().to_string();

        layer.hover_in(&id).unwrap();
        assert!(layer.marker(&id).unwrap().tooltip_open());
        layer.hover_out(&id).unwrap();
        assert!(!layer.marker(&id).unwrap().tooltip_open());
    }

    #[test]
    fn test_click_forwards_backreferences() {
        let seen: Arc<Mutex<Vec<FeatureClick>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: SharedClickHandler =
            Arc::new(Mutex::new(move |event: FeatureClick| {
                sink.lock().unwrap().push(event);
            }));

        let mut layer = ClusterLayer::new(
            Some("breaches".to_string()),
            None,
            &two_close_points(),
            &IconRegistry::new(),
            handler,
        )
        .unwrap();

        let id = layer.markers()[0].id().to_string();
        layer.click(&id).unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].marker_id, id);
        assert_eq!(events[0].geojson_layer, "breaches__features");
        assert_eq!(events[0].cluster_layer.as_deref(), Some("breaches"));
    }

    #[test]
    fn test_refresh_invalidates_cache() {
        let mut layer = layer("BREACH_PRIMARY");
        let before = layer.clusters(&wide_bounds(), 3.0).len();
        layer.refresh_clusters();
        assert!(layer.cache.is_none());
        let after = layer.clusters(&wide_bounds(), 3.0).len();
        assert_eq!(before, after);
    }

    #[test]
    fn test_non_point_feature_is_layer_error() {
        let geojson = GeoJson::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": {"naam": "Lijn"},
                    "geometry": {"type": "LineString", "coordinates": [[5.0, 51.0], [5.1, 51.1]]}
                }]
            }"#,
        )
        .unwrap();

        let result = ClusterLayer::new(None, None, &geojson, &IconRegistry::new(), noop_handler());
        assert!(matches!(result, Err(MapError::Layer(_))));
    }
}
