//! Prelude module for common floodmap types and traits
//!
//! Re-exports the most commonly used types for easy importing with
//! `use floodmap::prelude::*;`

pub use crate::core::{
    canvas::{CanvasEvent, MapCanvas, MapHandle},
    config::{map_defaults, CanvasOptions, MapConfig, MapDefaults, ServiceEndpoints, TileSourceDef},
    crs::Crs,
    geo::{LatLng, LatLngBounds, Point},
};

pub use crate::layers::{
    cluster::{cluster_icon, ClusterLayer, DivIcon},
    descriptor::{LayerDescriptor, LegacyDescriptor},
    factory::{FeatureClick, LayerFactory, SharedClickHandler},
    tile::{TileLayer, TileOptions},
    vector::VectorLayer,
    wms::{WmsLayer, OPERATIONAL_NAMESPACE},
    LayerHandle,
};

pub use crate::data::geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry};

pub use crate::icons::{BreachCategory, IconDescriptor, IconRegistry};

pub use crate::ui::{
    control::{Control, ControlPosition, Key, MountContext},
    controls::{
        FillWindowControl, GeocodeResult, GeocoderControl, GeocoderHandle, GeocoderOptions,
        ImageExportControl, LayersControl, LayersHandle, PrintControl, ZoomControl,
    },
    element::Element,
    legend::{legend_control, LegendControl},
    readiness::{watch_for_mount, MountWatch},
};

pub use crate::plugins::print::{PrintJob, PrintPlugin, PrintPluginOptions, PrintSizeMode};

pub use crate::compose::{add_overlays, compose_map, HostEvent};

pub use crate::export::{export_layers, DownloadSink, ExportRequest};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
