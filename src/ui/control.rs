//! Control lifecycle: constructed, registered with the canvas, built, root
//! assigned, then live for the canvas's lifetime.

use crate::core::canvas::MapHandle;
use crate::ui::element::Element;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Keys the accessibility wiring cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
}

type BindingHandler = Box<dyn FnMut(&mut Element) + Send>;

pub(crate) enum EventBinding {
    Key(Key, BindingHandler),
    /// Click on any descendant carrying the class token
    Click(String, BindingHandler),
}

/// Handed to a control when the canvas assigns its DOM root.
///
/// The root can be mutated here (the mount is not visible yet) and event
/// bindings registered against it; bindings live in the control slot, not
/// in the element tree.
pub struct MountContext<'a> {
    pub root: &'a mut Element,
    bindings: &'a mut Vec<EventBinding>,
}

impl<'a> MountContext<'a> {
    pub(crate) fn new(root: &'a mut Element, bindings: &'a mut Vec<EventBinding>) -> Self {
        Self { root, bindings }
    }

    pub fn on_key(&mut self, key: Key, handler: impl FnMut(&mut Element) + Send + 'static) {
        self.bindings.push(EventBinding::Key(key, Box::new(handler)));
    }

    pub fn on_click(
        &mut self,
        class_name: &str,
        handler: impl FnMut(&mut Element) + Send + 'static,
    ) {
        self.bindings.push(EventBinding::Click(
            class_name.to_string(),
            Box::new(handler),
        ));
    }
}

/// A control factory object the canvas invokes while mounting.
///
/// The canvas calls `build` to produce the control's DOM root and then
/// assigns it via `container_assigned`. The assignment is the only mount
/// signal the control ever gets; there is no later callback.
pub trait Control: Send {
    fn position(&self) -> ControlPosition {
        ControlPosition::TopRight
    }

    /// Produces the control's DOM subtree (`onAdd` in Leaflet terms).
    fn build(&mut self, map: &MapHandle) -> Result<Element>;

    /// Invoked when the canvas assigns the built root to the control slot.
    fn container_assigned(&mut self, _ctx: &mut MountContext<'_>) {}
}
