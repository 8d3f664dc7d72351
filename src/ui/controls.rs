//! Concrete map controls.
//!
//! Each control builds a small element tree; behavior that needs the
//! mounted root (accessibility key handling, focusable print trigger) is
//! wired by the composer through the readiness watcher, because the canvas
//! itself never says when a control's DOM exists.

use crate::core::canvas::MapHandle;
use crate::core::geo::{LatLng, LatLngBounds};
use crate::ui::control::{Control, MountContext};
use crate::ui::element::Element;
use crate::Result;

use log::debug;
use std::sync::{Arc, Mutex};

// ----- geocoder / search --------------------------------------------------

#[derive(Debug, Clone)]
pub struct GeocoderOptions {
    pub placeholder: String,
    pub icon_label: String,
    /// When false the owner handles the result itself (the composer fits
    /// the view to the result's bounding polygon).
    pub default_mark_geocode: bool,
}

impl Default for GeocoderOptions {
    fn default() -> Self {
        Self {
            placeholder: "Zoeken".to_string(),
            icon_label: "Start een nieuwe zoekopdracht".to_string(),
            default_mark_geocode: false,
        }
    }
}

/// One geocode result as the remote geocoder reports it.
#[derive(Debug, Clone)]
pub struct GeocodeResult {
    pub name: String,
    pub center: LatLng,
    pub bbox: LatLngBounds,
}

type GeocodeCallback = Box<dyn FnMut(&GeocodeResult) + Send>;

struct GeocoderState {
    options: GeocoderOptions,
    expanded: bool,
    on_geocode: Option<GeocodeCallback>,
}

/// Search control with a collapsible input.
///
/// The control does not expand when its trigger is clicked
/// programmatically (keyboard activation), so the composer binds a click
/// listener that calls [`GeocoderHandle::expand`] once the root exists.
pub struct GeocoderControl {
    state: Arc<Mutex<GeocoderState>>,
}

impl GeocoderControl {
    pub fn new(options: GeocoderOptions) -> Self {
        Self {
            state: Arc::new(Mutex::new(GeocoderState {
                options,
                expanded: false,
                on_geocode: None,
            })),
        }
    }

    pub fn handle(&self) -> GeocoderHandle {
        GeocoderHandle {
            state: self.state.clone(),
        }
    }
}

/// Shared handle to the mounted geocoder.
#[derive(Clone)]
pub struct GeocoderHandle {
    state: Arc<Mutex<GeocoderState>>,
}

impl GeocoderHandle {
    fn lock(&self) -> std::sync::MutexGuard<'_, GeocoderState> {
        self.state.lock().expect("geocoder state poisoned")
    }

    pub fn expand(&self) {
        self.lock().expanded = true;
    }

    pub fn collapse(&self) {
        self.lock().expanded = false;
    }

    pub fn is_expanded(&self) -> bool {
        self.lock().expanded
    }

    /// Registers the result handler (composer-installed).
    pub fn on_geocode(&self, callback: impl FnMut(&GeocodeResult) + Send + 'static) {
        self.lock().on_geocode = Some(Box::new(callback));
    }

    /// Feeds a geocode result through the registered handler.
    pub fn mark_geocode(&self, result: &GeocodeResult) {
        let mut state = self.lock();
        if state.options.default_mark_geocode {
            debug!("geocode result {} marked by default handler", result.name);
            return;
        }
        if let Some(callback) = state.on_geocode.as_mut() {
            callback(result);
        }
    }
}

impl Control for GeocoderControl {
    fn build(&mut self, _map: &MapHandle) -> Result<Element> {
        let state = self.state.lock().expect("geocoder state poisoned");
        let mut button = Element::new("button").with_classes("geocoder-toggle");
        button.set_attr("aria-label", state.options.icon_label.clone());
        let mut input = Element::new("input").with_classes("geocoder-input");
        input.set_attr("placeholder", state.options.placeholder.clone());

        Ok(Element::div("leaflet-control-geocoder")
            .with_child(button)
            .with_child(input))
    }
}

// ----- print --------------------------------------------------------------

/// Trigger class emitted without a focusable attribute; the composer adds
/// `href="#"` once the root exists.
pub const PRINT_TRIGGER_CLASS: &str = "leaflet-browser-print";

pub struct PrintControl;

impl PrintControl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PrintControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Control for PrintControl {
    fn build(&mut self, _map: &MapHandle) -> Result<Element> {
        let trigger = Element::new("a")
            .with_classes(PRINT_TRIGGER_CLASS)
            .with_text("Print");
        Ok(Element::div("leaflet-control browser-print-control").with_child(trigger))
    }
}

// ----- base-layer switcher ------------------------------------------------

struct LayersState {
    collapsed: bool,
    map: Option<MapHandle>,
}

/// Base-layer switcher; expands on pointer use, collapses on Escape.
pub struct LayersControl {
    titles: Vec<String>,
    state: Arc<Mutex<LayersState>>,
}

impl LayersControl {
    pub fn new(titles: Vec<String>) -> Self {
        Self {
            titles,
            state: Arc::new(Mutex::new(LayersState {
                collapsed: true,
                map: None,
            })),
        }
    }

    pub fn handle(&self) -> LayersHandle {
        LayersHandle {
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct LayersHandle {
    state: Arc<Mutex<LayersState>>,
}

impl LayersHandle {
    fn lock(&self) -> std::sync::MutexGuard<'_, LayersState> {
        self.state.lock().expect("layers state poisoned")
    }

    pub fn expand(&self) {
        self.lock().collapsed = false;
    }

    pub fn collapse(&self) {
        self.lock().collapsed = true;
    }

    pub fn is_collapsed(&self) -> bool {
        self.lock().collapsed
    }

    /// Activates a base layer on the owning map.
    pub fn select(&self, title: &str) -> Result<()> {
        let map = self.lock().map.clone();
        match map {
            Some(map) => map.set_base_layer(title),
            None => Err(crate::MapError::Control(
                "layer switcher not mounted".to_string(),
            )),
        }
    }
}

impl Control for LayersControl {
    fn build(&mut self, map: &MapHandle) -> Result<Element> {
        self.state.lock().expect("layers state poisoned").map = Some(map.clone());

        let mut root = Element::div("leaflet-control-layers");
        for title in &self.titles {
            root.append_child(
                Element::new("label")
                    .with_classes("leaflet-control-layers-base")
                    .with_text(title.clone()),
            );
        }
        Ok(root)
    }
}

// ----- zoom ---------------------------------------------------------------

pub struct ZoomControl;

impl ZoomControl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ZoomControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Control for ZoomControl {
    fn build(&mut self, _map: &MapHandle) -> Result<Element> {
        Ok(Element::div("leaflet-control-zoom")
            .with_child(Element::new("a").with_classes("zoom-in").with_text("+"))
            .with_child(Element::new("a").with_classes("zoom-out").with_text("−")))
    }
}

/// Wires the zoom buttons. Separate from `build` so the composer can pass
/// the map handle the buttons act on.
pub fn wire_zoom(ctx: &mut MountContext<'_>, map: MapHandle) {
    let zoom_in = map.clone();
    ctx.on_click("zoom-in", move |_root| zoom_in.zoom_in());
    ctx.on_click("zoom-out", move |_root| map.zoom_out());
}

// ----- fill window & image export -----------------------------------------

/// Action a capability control runs against the map when activated; the
/// actual behavior (bounding-box fit, canvas serialization) comes from the
/// hosting UI framework.
pub type CapabilityAction = Box<dyn FnMut(&MapHandle) + Send>;

/// Mounts a small interactive view that fits the map to its window.
pub struct FillWindowControl {
    map: Option<MapHandle>,
    action: Option<CapabilityAction>,
}

impl FillWindowControl {
    pub fn new() -> Self {
        Self {
            map: None,
            action: None,
        }
    }

    pub fn with_action(mut self, action: impl FnMut(&MapHandle) + Send + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }
}

impl Default for FillWindowControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Control for FillWindowControl {
    fn build(&mut self, map: &MapHandle) -> Result<Element> {
        self.map = Some(map.clone());
        Ok(Element::div("map-fill-window")
            .with_child(Element::new("button").with_text("Passend in venster")))
    }

    fn container_assigned(&mut self, ctx: &mut MountContext<'_>) {
        let map = self.map.clone();
        let mut action = self.action.take();
        ctx.on_click("map-fill-window", move |_root| {
            let Some(map) = map.as_ref() else { return };
            match action.as_mut() {
                Some(action) => action(map),
                // layout changed under us either way
                None => map.invalidate_size(),
            }
        });
    }
}

/// Mounts a small interactive view that exports the canvas as an image.
pub struct ImageExportControl {
    map: Option<MapHandle>,
    action: Option<CapabilityAction>,
}

impl ImageExportControl {
    pub fn new() -> Self {
        Self {
            map: None,
            action: None,
        }
    }

    pub fn with_action(mut self, action: impl FnMut(&MapHandle) + Send + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }
}

impl Default for ImageExportControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Control for ImageExportControl {
    fn build(&mut self, map: &MapHandle) -> Result<Element> {
        self.map = Some(map.clone());
        Ok(Element::div("map-image")
            .with_child(Element::new("button").with_text("Afbeelding opslaan")))
    }

    fn container_assigned(&mut self, ctx: &mut MountContext<'_>) {
        let map = self.map.clone();
        let mut action = self.action.take();
        ctx.on_click("map-image", move |_root| {
            let (Some(map), Some(action)) = (map.as_ref(), action.as_mut()) else {
                debug!("image export activated without a serializer");
                return;
            };
            action(map);
        });
    }
}
