pub mod cluster;
pub mod descriptor;
pub mod factory;
pub mod tile;
pub mod vector;
pub mod wms;

use crate::layers::{cluster::ClusterLayer, tile::TileLayer, vector::VectorLayer, wms::WmsLayer};

/// Opaque handle to a mounted overlay.
///
/// Owned by whichever component added it to the canvas; the cluster variant
/// keeps its internal feature layer reachable for refresh operations after
/// icon-affecting state changes.
pub enum LayerHandle {
    Vector(VectorLayer),
    Cluster(ClusterLayer),
    Tile(TileLayer),
    Wms(WmsLayer),
}

impl LayerHandle {
    pub fn id(&self) -> Option<&str> {
        match self {
            LayerHandle::Vector(layer) => layer.id(),
            LayerHandle::Cluster(layer) => Some(layer.layer_id()),
            LayerHandle::Tile(layer) => layer.id(),
            LayerHandle::Wms(layer) => layer.id(),
        }
    }

    pub fn as_cluster(&self) -> Option<&ClusterLayer> {
        match self {
            LayerHandle::Cluster(layer) => Some(layer),
            _ => None,
        }
    }

    pub fn as_cluster_mut(&mut self) -> Option<&mut ClusterLayer> {
        match self {
            LayerHandle::Cluster(layer) => Some(layer),
            _ => None,
        }
    }
}

impl std::fmt::Debug for LayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            LayerHandle::Vector(_) => "vector",
            LayerHandle::Cluster(_) => "cluster",
            LayerHandle::Tile(_) => "tile",
            LayerHandle::Wms(_) => "wms",
        };
        f.debug_struct("LayerHandle")
            .field("kind", &kind)
            .field("id", &self.id())
            .finish()
    }
}
