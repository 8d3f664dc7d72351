//! # Floodmap
//!
//! A flood-risk map composition engine in the Leaflet mold.
//!
//! The crate takes declarative layer descriptors (raster tiles, WMS
//! overlays, vector features, clustered breach markers) and composes them
//! onto a single map canvas together with interactive controls whose mount
//! timing is not otherwise observable. The canvas substrate is deliberately
//! small: pan/zoom/fit primitives, a render stack, control slots and an
//! event bus, which is everything a hosting view needs to drive the map
//! without caring how individual layers are built.

pub mod compose;
pub mod core;
pub mod data;
pub mod export;
pub mod icons;
pub mod layers;
pub mod plugins;
pub mod prelude;
pub mod ui;

// Re-export public API
pub use crate::core::{
    canvas::{CanvasEvent, MapCanvas, MapHandle},
    config::{map_defaults, MapConfig, MapDefaults},
    crs::Crs,
    geo::{LatLng, LatLngBounds, Point},
};

pub use crate::compose::{add_overlays, compose_map, HostEvent};

pub use crate::layers::{
    cluster::ClusterLayer, descriptor::LayerDescriptor, factory::LayerFactory, tile::TileLayer,
    vector::VectorLayer, wms::WmsLayer, LayerHandle,
};

pub use crate::icons::{BreachCategory, IconDescriptor, IconRegistry};

pub use crate::ui::{
    control::{Control, ControlPosition},
    element::Element,
    legend::{legend_control, LegendControl},
    readiness::{watch_for_mount, MountWatch},
};

pub use crate::plugins::print::{PrintJob, PrintPlugin, PrintSizeMode};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Control error: {0}")]
    Control(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;
