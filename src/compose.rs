//! Map composition.
//!
//! [`compose_map`] assembles a ready-to-use map from a host-supplied
//! configuration: base tile layers from the process defaults, the chrome
//! controls in their fixed order, the hidden print pipeline and the
//! accessibility wiring that needs mounted control roots. The hosting view
//! only receives the handle and a channel of host events.

use crate::core::canvas::{CanvasEvent, MapCanvas, MapHandle};
use crate::core::config::{map_defaults, CanvasOptions, MapConfig};
use crate::core::geo::LatLngBounds;
use crate::layers::descriptor::LayerDescriptor;
use crate::layers::factory::{LayerFactory, SharedClickHandler};
use crate::layers::tile::{TileLayer, TileOptions};
use crate::plugins::print::{PrintJob, PrintPlugin, PrintPluginOptions, PrintSizeMode};
use crate::ui::control::Key;
use crate::ui::controls::{
    wire_zoom, FillWindowControl, GeocoderControl, GeocoderOptions, ImageExportControl,
    LayersControl, PrintControl, ZoomControl, PRINT_TRIGGER_CLASS,
};
use crate::ui::element::Element;
use crate::ui::readiness::watch_for_mount;
use crate::{MapError, Result};

use crossbeam_channel::Sender;
use log::{info, warn};
use std::time::Duration;

/// Events the composed map surfaces to the hosting view.
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// A print run started; the host mirrors this to its own listeners.
    PrintStarted(PrintJob),
}

/// Delay before the post-mount size invalidation runs. Layout settles
/// after the surrounding view finishes mounting, not when we do.
const RESIZE_DELAY: Duration = Duration::from_millis(100);

/// Builds a map canvas inside `container` and wires the standard chrome.
pub fn compose_map(
    container: Element,
    host: Sender<HostEvent>,
    config: &MapConfig,
) -> Result<MapHandle> {
    let defaults = map_defaults();
    let crs = config.projection;

    let attribution = config
        .attribution
        .clone()
        .unwrap_or_else(|| defaults.attribution.clone());
    let tile_options = TileOptions {
        attribution: Some(attribution.clone()),
        max_zoom: config.max_zoom.unwrap_or_else(|| defaults.max_zoom(crs)),
        min_zoom: config.min_zoom.unwrap_or_else(|| defaults.min_zoom(crs)),
        // spherical-mercator sources are addressed top-down regardless of
        // what the configuration asks for
        tms: config.base_layer.tms && crs.honors_tms(),
        continuous_world: config
            .continuous_world
            .unwrap_or(defaults.continuous_world),
    };

    let map = MapHandle::new(MapCanvas::new(
        container,
        CanvasOptions {
            crs,
            zoom: config.zoom.unwrap_or(defaults.zoom),
            min_zoom: tile_options.min_zoom,
            max_zoom: tile_options.max_zoom,
            attribution,
        },
    ));

    // Whichever base layer becomes active drops below the overlays.
    map.on_event(|canvas, event| {
        if let CanvasEvent::BaseLayerChange { title } = event {
            canvas.bring_base_to_back(title);
        }
    });

    let mut titles = Vec::new();
    for source in &defaults.tile_layers {
        match source.url_for(crs) {
            Some(url) => {
                map.add_base_layer(
                    source.title.clone(),
                    TileLayer::with_options(url, tile_options.clone()),
                );
                titles.push(source.title.clone());
            }
            None => warn!("base layer {} has no {} URL", source.title, crs),
        }
    }
    let initial = defaults
        .initial_base_layer()
        .ok_or_else(|| MapError::Layer("no base layers configured".to_string()))?;
    map.set_base_layer(initial)?;

    install_controls(&map, titles)?;

    map.set_print_plugin(PrintPlugin::new(PrintPluginOptions::default()));
    let print_host = host;
    map.on_event(move |_canvas, event| {
        if let CanvasEvent::PrintStart(job) = event {
            if print_host.send(HostEvent::PrintStarted(job.clone())).is_err() {
                warn!("host dropped its event receiver; print event lost");
            }
        }
    });

    // Our mount races the surrounding view's; recompute the canvas size
    // once layout has settled.
    map.schedule(RESIZE_DELAY, |canvas| canvas.invalidate_size());

    info!("map composed: {} at zoom {}", crs, map.zoom());
    Ok(map)
}

/// Builds each declared overlay and mounts the renderables in order.
///
/// Suppressed descriptors produce nothing and are skipped; the returned
/// ids identify the overlays that actually reached the canvas.
pub fn add_overlays(
    map: &MapHandle,
    factory: &LayerFactory,
    descriptors: &[LayerDescriptor],
    on_click: SharedClickHandler,
) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if let Some(handle) = factory.create(descriptor, on_click.clone())? {
            ids.push(map.add_layer(handle));
        }
    }
    Ok(ids)
}

/// Mounts the chrome controls in their fixed visual order.
fn install_controls(map: &MapHandle, base_titles: Vec<String>) -> Result<()> {
    map.add_control(Box::new(FillWindowControl::new()))?;

    let geocoder = GeocoderControl::new(GeocoderOptions::default());
    let geocoder_handle = geocoder.handle();
    map.set_geocoder(geocoder_handle.clone());
    let fit_map = map.clone();
    geocoder_handle.on_geocode(move |result| {
        // walk the bbox corner ring SE, NE, NW, SW and fit to its bounds
        let bbox = &result.bbox;
        let ring = [
            bbox.south_east(),
            bbox.north_east,
            bbox.north_west(),
            bbox.south_west,
        ];
        if let Some(bounds) = LatLngBounds::from_points(&ring) {
            fit_map.fit_bounds(bounds);
        }
    });
    let expand_handle = geocoder_handle.clone();
    let focus_map = map.clone();
    map.add_control(Box::new(watch_for_mount(geocoder, move |ctx| {
        // Keyboard activation of the toggle does not expand the input on
        // its own, and Escape should land focus back on the toggle.
        let expand = expand_handle.clone();
        ctx.on_click("geocoder-toggle", move |_root| expand.expand());
        let enter_expand = expand_handle.clone();
        ctx.on_key(Key::Enter, move |_root| enter_expand.expand());
        let collapse = expand_handle.clone();
        let focus_map = focus_map.clone();
        ctx.on_key(Key::Escape, move |root| {
            collapse.collapse();
            if let Some(button) = root.find_by_class("geocoder-toggle") {
                focus_map.focus_node(button.node_id());
            }
        });
    })))?;

    let zoom_map = map.clone();
    map.add_control(Box::new(watch_for_mount(ZoomControl::new(), move |ctx| {
        wire_zoom(ctx, zoom_map.clone());
    })))?;

    let print_map = map.clone();
    map.add_control(Box::new(watch_for_mount(PrintControl::new(), move |ctx| {
        // The trigger ships without an href and is unreachable by
        // keyboard until one is set.
        if let Some(trigger) = ctx.root.find_by_class_mut(PRINT_TRIGGER_CLASS) {
            trigger.set_attr("href", "#");
        }
        let print_map = print_map.clone();
        ctx.on_click(PRINT_TRIGGER_CLASS, move |_root| {
            if let Err(err) = print_map.start_print(PrintSizeMode::Current) {
                warn!("print failed to start: {err}");
            }
        });
    })))?;

    map.add_control(Box::new(ImageExportControl::new()))?;

    let switcher = LayersControl::new(base_titles);
    let switcher_handle = switcher.handle();
    map.set_layer_switcher(switcher_handle.clone());
    map.add_control(Box::new(watch_for_mount(switcher, move |ctx| {
        let handle = switcher_handle.clone();
        ctx.on_key(Key::Escape, move |_root| handle.collapse());
    })))?;

    Ok(())
}
