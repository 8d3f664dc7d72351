//! Layer factory: dispatches a declarative descriptor into the right
//! rendering strategy.

use crate::core::config::{map_defaults, ServiceEndpoints};
use crate::icons::IconRegistry;
use crate::layers::{
    cluster::ClusterLayer,
    descriptor::{KindDescriptor, LayerDescriptor},
    tile::TileLayer,
    vector::VectorLayer,
    wms::WmsLayer,
    LayerHandle,
};
use crate::Result;

use log::debug;
use std::sync::{Arc, Mutex};

/// Feature click event forwarded to the hosting view.
///
/// Carries the originating feature-layer reference and, for
/// cluster-dispatched clicks, the owning cluster handle.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureClick {
    pub marker_id: String,
    pub geojson_layer: String,
    pub cluster_layer: Option<String>,
}

/// Click handler shared between the factory-built layer and the caller.
pub type SharedClickHandler = Arc<Mutex<dyn FnMut(FeatureClick) + Send>>;

/// Builds renderable layer handles from descriptors.
///
/// Holds the icon registry and service endpoints as explicit read-only
/// state instead of reaching for ambient configuration.
pub struct LayerFactory {
    icons: IconRegistry,
    services: ServiceEndpoints,
}

impl LayerFactory {
    pub fn new(icons: IconRegistry, services: ServiceEndpoints) -> Self {
        Self { icons, services }
    }

    /// Factory wired to the process-wide service endpoints.
    pub fn with_defaults() -> Self {
        Self::new(IconRegistry::new(), map_defaults().services.clone())
    }

    /// Dispatches one descriptor into a renderable handle.
    ///
    /// `Ok(None)` means "no renderable; do not add to the canvas". That
    /// is the explicit suppression case, not an error.
    pub fn create(
        &self,
        descriptor: &LayerDescriptor,
        on_click: SharedClickHandler,
    ) -> Result<Option<LayerHandle>> {
        match descriptor {
            LayerDescriptor::Kind(KindDescriptor::Vector { id, geojson, style }) => {
                Ok(Some(LayerHandle::Vector(VectorLayer::new(
                    id.clone(),
                    geojson.clone(),
                    style.clone(),
                ))))
            }
            LayerDescriptor::Kind(KindDescriptor::Cluster { id, layer, geojson }) => {
                let cluster = ClusterLayer::new(
                    id.clone(),
                    layer.clone(),
                    geojson,
                    &self.icons,
                    on_click,
                )?;
                Ok(Some(LayerHandle::Cluster(cluster)))
            }
            LayerDescriptor::Kind(KindDescriptor::Tile { id, url, opacity }) => Ok(Some(
                LayerHandle::Tile(TileLayer::new(id.clone(), url.clone(), *opacity)),
            )),
            LayerDescriptor::Kind(KindDescriptor::Wms(wms)) => Ok(Some(LayerHandle::Wms(
                WmsLayer::new(&self.services, wms.clone()),
            ))),
            LayerDescriptor::Legacy(legacy) => match legacy.resolve_wms() {
                Some(wms) => Ok(Some(LayerHandle::Wms(WmsLayer::new(&self.services, wms)))),
                None => {
                    debug!("descriptor {:?} suppressed, no renderable", legacy.id);
                    Ok(None)
                }
            },
        }
    }
}
