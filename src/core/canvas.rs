//! Map canvas substrate model.
//!
//! The canvas owns the layer render stack, the control slots, the event
//! bus and a single-threaded deferred-task queue. It is the surface the
//! composer orchestrates; individual layers and controls never reach
//! around it. Everything runs on one thread: events are dispatched
//! synchronously and deferred tasks only run when the embedding render
//! loop pumps them.

use crate::core::config::CanvasOptions;
use crate::core::crs::Crs;
use crate::core::geo::LatLngBounds;
use crate::layers::{tile::TileLayer, LayerHandle};
use crate::plugins::print::{PrintJob, PrintPlugin, PrintSizeMode};
use crate::ui::control::{Control, ControlPosition, EventBinding, Key, MountContext};
use crate::ui::controls::{GeocoderHandle, LayersHandle};
use crate::ui::element::Element;
use crate::{MapError, Result};

use log::{debug, warn};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::prelude::HashMap;

/// Canvas-level events, dispatched synchronously to registered listeners.
#[derive(Debug, Clone)]
pub enum CanvasEvent {
    BaseLayerChange { title: String },
    PrintStart(PrintJob),
}

type CanvasListener = Box<dyn FnMut(&mut MapCanvas, &CanvasEvent) + Send>;
type DeferredTask = Box<dyn FnOnce(&mut MapCanvas) + Send>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum StackEntry {
    Base(String),
    Overlay(String),
}

/// A mounted control: position, root element and its event bindings.
pub struct ControlSlot {
    pub id: usize,
    pub position: ControlPosition,
    pub root: Element,
    pub(crate) bindings: Vec<EventBinding>,
    #[allow(dead_code)]
    control: Box<dyn Control>,
}

pub struct MapCanvas {
    #[allow(dead_code)]
    container: Element,
    crs: Crs,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    attribution: String,
    view_bounds: Option<LatLngBounds>,

    base_layers: Vec<(String, TileLayer)>,
    active_base: Option<String>,
    overlays: HashMap<String, LayerHandle>,
    render_stack: Vec<StackEntry>,

    slots: HashMap<usize, Option<ControlSlot>>,
    slot_order: Vec<usize>,
    next_slot_id: usize,
    next_overlay_id: usize,

    listeners: Vec<CanvasListener>,
    tasks: Vec<(Instant, DeferredTask)>,

    print_plugin: Option<PrintPlugin>,
    geocoder: Option<GeocoderHandle>,
    layer_switcher: Option<LayersHandle>,

    focused: Option<u64>,
    size_invalidations: usize,
}

impl MapCanvas {
    pub fn new(container: Element, options: CanvasOptions) -> Self {
        Self {
            container,
            crs: options.crs,
            zoom: options.zoom,
            min_zoom: options.min_zoom,
            max_zoom: options.max_zoom,
            attribution: options.attribution,
            view_bounds: None,
            base_layers: Vec::new(),
            active_base: None,
            overlays: HashMap::default(),
            render_stack: Vec::new(),
            slots: HashMap::default(),
            slot_order: Vec::new(),
            next_slot_id: 0,
            next_overlay_id: 0,
            listeners: Vec::new(),
            tasks: Vec::new(),
            print_plugin: None,
            geocoder: None,
            layer_switcher: None,
            focused: None,
            size_invalidations: 0,
        }
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn attribution(&self) -> &str {
        &self.attribution
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    fn add_base_layer(&mut self, title: String, layer: TileLayer) {
        self.render_stack.push(StackEntry::Base(title.clone()));
        self.base_layers.push((title, layer));
    }

    fn set_base_layer(&mut self, title: &str) -> Result<()> {
        if !self.base_layers.iter().any(|(t, _)| t == title) {
            return Err(MapError::Layer(format!("unknown base layer: {title}")));
        }
        self.active_base = Some(title.to_string());
        self.emit(CanvasEvent::BaseLayerChange {
            title: title.to_string(),
        });
        Ok(())
    }

    /// Moves a base layer to the bottom of the render stack so overlays
    /// stay visually on top.
    pub fn bring_base_to_back(&mut self, title: &str) {
        let entry = StackEntry::Base(title.to_string());
        if let Some(pos) = self.render_stack.iter().position(|e| *e == entry) {
            let entry = self.render_stack.remove(pos);
            self.render_stack.insert(0, entry);
        }
    }

    fn add_layer(&mut self, handle: LayerHandle) -> String {
        let id = handle.id().map(str::to_string).unwrap_or_else(|| {
            self.next_overlay_id += 1;
            format!("overlay-{}", self.next_overlay_id)
        });
        self.render_stack.push(StackEntry::Overlay(id.clone()));
        self.overlays.insert(id.clone(), handle);
        id
    }

    fn remove_layer(&mut self, id: &str) -> Option<LayerHandle> {
        self.render_stack
            .retain(|e| *e != StackEntry::Overlay(id.to_string()));
        self.overlays.remove(id)
    }

    /// Overlay ids in render order, bottom first.
    pub fn overlay_ids(&self) -> Vec<String> {
        self.render_stack
            .iter()
            .filter_map(|e| match e {
                StackEntry::Overlay(id) => Some(id.clone()),
                StackEntry::Base(_) => None,
            })
            .collect()
    }

    /// Render-stack titles/ids bottom first, bases included.
    fn stack_ids(&self) -> Vec<String> {
        self.render_stack
            .iter()
            .map(|e| match e {
                StackEntry::Base(title) => format!("base:{title}"),
                StackEntry::Overlay(id) => id.clone(),
            })
            .collect()
    }

    fn emit(&mut self, event: CanvasEvent) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in listeners.iter_mut() {
            listener(self, &event);
        }
        // keep listeners registered during dispatch
        let added = std::mem::take(&mut self.listeners);
        self.listeners = listeners;
        self.listeners.extend(added);
    }

    fn start_print(&mut self, mode: PrintSizeMode) -> Result<()> {
        let plugin = self
            .print_plugin
            .as_ref()
            .ok_or_else(|| MapError::Control("no print plugin installed".to_string()))?;
        let job = plugin.start(mode)?;
        debug!("print started: {:?}", job);
        self.emit(CanvasEvent::PrintStart(job));
        Ok(())
    }

    fn run_due_tasks(&mut self, now: Instant) {
        let mut due = Vec::new();
        let mut remaining = Vec::new();
        for (at, task) in std::mem::take(&mut self.tasks) {
            if at <= now {
                due.push(task);
            } else {
                remaining.push((at, task));
            }
        }
        self.tasks = remaining;
        for task in due {
            task(self);
        }
    }

    pub fn invalidate_size(&mut self) {
        self.size_invalidations += 1;
    }
}

/// Shared handle to a composed map canvas.
///
/// The handle is what controls and the hosting view hold; all canvas
/// access goes through it. Control event dispatch temporarily lifts the
/// slot out of the canvas so handlers can call back into the map without
/// deadlocking.
#[derive(Clone)]
pub struct MapHandle(Arc<Mutex<MapCanvas>>);

impl MapHandle {
    pub fn new(canvas: MapCanvas) -> Self {
        Self(Arc::new(Mutex::new(canvas)))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MapCanvas> {
        // single UI thread, a poisoned canvas is unrecoverable anyway
        self.0.lock().expect("map canvas lock poisoned")
    }

    pub fn with<R>(&self, f: impl FnOnce(&MapCanvas) -> R) -> R {
        f(&self.lock())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut MapCanvas) -> R) -> R {
        f(&mut self.lock())
    }

    // ----- view state -------------------------------------------------

    pub fn zoom(&self) -> f64 {
        self.lock().zoom
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.lock().set_zoom(zoom);
    }

    pub fn zoom_in(&self) {
        let mut canvas = self.lock();
        let z = canvas.zoom + 1.0;
        canvas.set_zoom(z);
    }

    pub fn zoom_out(&self) {
        let mut canvas = self.lock();
        let z = canvas.zoom - 1.0;
        canvas.set_zoom(z);
    }

    pub fn fit_bounds(&self, bounds: LatLngBounds) {
        self.lock().view_bounds = Some(bounds);
    }

    pub fn view_bounds(&self) -> Option<LatLngBounds> {
        self.lock().view_bounds
    }

    pub fn invalidate_size(&self) {
        self.lock().invalidate_size();
    }

    pub fn size_invalidations(&self) -> usize {
        self.lock().size_invalidations
    }

    // ----- layers -----------------------------------------------------

    pub fn add_base_layer(&self, title: impl Into<String>, layer: TileLayer) {
        self.lock().add_base_layer(title.into(), layer);
    }

    pub fn base_layer_titles(&self) -> Vec<String> {
        self.lock()
            .base_layers
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }

    pub fn active_base_layer(&self) -> Option<String> {
        self.lock().active_base.clone()
    }

    pub fn set_base_layer(&self, title: &str) -> Result<()> {
        self.lock().set_base_layer(title)
    }

    pub fn add_layer(&self, handle: LayerHandle) -> String {
        self.lock().add_layer(handle)
    }

    pub fn remove_layer(&self, id: &str) -> Option<LayerHandle> {
        self.lock().remove_layer(id)
    }

    pub fn overlay_ids(&self) -> Vec<String> {
        self.lock().overlay_ids()
    }

    pub fn render_stack(&self) -> Vec<String> {
        self.lock().stack_ids()
    }

    pub fn with_layer_mut<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut LayerHandle) -> R,
    ) -> Option<R> {
        self.lock().overlays.get_mut(id).map(f)
    }

    // ----- controls ---------------------------------------------------

    /// Registers a control: builds its root, assigns it to a fresh slot
    /// and reports the assignment to the control (the readiness signal).
    pub fn add_control(&self, mut control: Box<dyn Control>) -> Result<usize> {
        let mut root = control.build(self)?;
        let position = control.position();

        let mut bindings: Vec<EventBinding> = Vec::new();
        {
            let mut ctx = MountContext::new(&mut root, &mut bindings);
            control.container_assigned(&mut ctx);
        }

        let mut canvas = self.lock();
        let id = canvas.next_slot_id;
        canvas.next_slot_id += 1;
        canvas.slots.insert(
            id,
            Some(ControlSlot {
                id,
                position,
                root,
                bindings,
                control,
            }),
        );
        canvas.slot_order.push(id);
        Ok(id)
    }

    pub fn control_order(&self) -> Vec<usize> {
        self.lock().slot_order.clone()
    }

    /// Snapshot of a mounted control's root element.
    pub fn control_root(&self, slot_id: usize) -> Option<Element> {
        self.lock()
            .slots
            .get(&slot_id)
            .and_then(|s| s.as_ref())
            .map(|s| s.root.deep_clone())
    }

    fn take_slot(&self, slot_id: usize) -> Result<ControlSlot> {
        self.lock()
            .slots
            .get_mut(&slot_id)
            .and_then(Option::take)
            .ok_or_else(|| MapError::Control(format!("no control in slot {slot_id}")))
    }

    fn restore_slot(&self, slot: ControlSlot) {
        self.lock().slots.insert(slot.id, Some(slot));
    }

    /// Dispatches a key event to one control's bindings.
    pub fn dispatch_key(&self, slot_id: usize, key: Key) -> Result<()> {
        let mut slot = self.take_slot(slot_id)?;
        let mut bindings = std::mem::take(&mut slot.bindings);
        for binding in bindings.iter_mut() {
            if let EventBinding::Key(bound, handler) = binding {
                if *bound == key {
                    handler(&mut slot.root);
                }
            }
        }
        slot.bindings = bindings;
        self.restore_slot(slot);
        Ok(())
    }

    /// Dispatches a click on a classed descendant of one control's root.
    pub fn dispatch_click(&self, slot_id: usize, class_name: &str) -> Result<()> {
        let mut slot = self.take_slot(slot_id)?;
        if slot.root.find_by_class(class_name).is_none() {
            warn!("click target .{class_name} not present in slot {slot_id}");
        }
        let mut bindings = std::mem::take(&mut slot.bindings);
        for binding in bindings.iter_mut() {
            if let EventBinding::Click(bound, handler) = binding {
                if bound == class_name {
                    handler(&mut slot.root);
                }
            }
        }
        slot.bindings = bindings;
        self.restore_slot(slot);
        Ok(())
    }

    // ----- focus ------------------------------------------------------

    pub fn focus_node(&self, node_id: u64) {
        self.lock().focused = Some(node_id);
    }

    pub fn focused_node(&self) -> Option<u64> {
        self.lock().focused
    }

    // ----- events, print, deferred work -------------------------------

    pub fn on_event(&self, listener: impl FnMut(&mut MapCanvas, &CanvasEvent) + Send + 'static) {
        self.lock().listeners.push(Box::new(listener));
    }

    pub fn set_print_plugin(&self, plugin: PrintPlugin) {
        self.lock().print_plugin = Some(plugin);
    }

    pub fn start_print(&self, mode: PrintSizeMode) -> Result<()> {
        self.lock().start_print(mode)
    }

    /// Queues a one-shot task; it runs when the embedding render loop
    /// pumps [`MapHandle::run_due_tasks`] past its due time.
    pub fn schedule(&self, delay: Duration, task: impl FnOnce(&mut MapCanvas) + Send + 'static) {
        self.lock().tasks.push((Instant::now() + delay, Box::new(task)));
    }

    pub fn run_due_tasks(&self, now: Instant) {
        self.lock().run_due_tasks(now);
    }

    // ----- composer-installed companions ------------------------------

    pub(crate) fn set_geocoder(&self, geocoder: GeocoderHandle) {
        self.lock().geocoder = Some(geocoder);
    }

    pub fn geocoder(&self) -> Option<GeocoderHandle> {
        self.lock().geocoder.clone()
    }

    pub(crate) fn set_layer_switcher(&self, switcher: LayersHandle) {
        self.lock().layer_switcher = Some(switcher);
    }

    pub fn layer_switcher(&self) -> Option<LayersHandle> {
        self.lock().layer_switcher.clone()
    }
}

pub mod test_support {
    //! Bare canvas for unit tests that only need a handle.

    use super::*;

    pub fn test_map() -> MapHandle {
        MapHandle::new(MapCanvas::new(
            Element::div("map"),
            CanvasOptions::default(),
        ))
    }
}
