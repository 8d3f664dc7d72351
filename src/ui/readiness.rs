//! Mount readiness: observe the first DOM-root assignment of a control.
//!
//! The canvas control API has no "this control's DOM subtree now exists"
//! hook, so DOM-dependent wiring (accessibility key handling, making the
//! print trigger focusable) would otherwise race control construction. The
//! watcher wraps any control; the canvas cannot tell the difference, and
//! the callback runs exactly once, synchronously, inside whatever call
//! assigns the root. Reassignments never re-fire it.

use crate::core::canvas::MapHandle;
use crate::ui::control::{Control, ControlPosition, MountContext};
use crate::ui::element::Element;
use crate::Result;

type MountCallback = Box<dyn FnMut(&mut MountContext<'_>) + Send>;

/// A control instrumented to report its first root assignment.
pub struct MountWatch<C: Control> {
    inner: C,
    on_mounted: Option<MountCallback>,
}

impl<C: Control> MountWatch<C> {
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

/// Wraps a control factory so `on_mounted` fires exactly once when the
/// canvas assigns the control's DOM root; every other behavior is
/// delegated unchanged.
pub fn watch_for_mount<C: Control>(
    control: C,
    on_mounted: impl FnMut(&mut MountContext<'_>) + Send + 'static,
) -> MountWatch<C> {
    MountWatch {
        inner: control,
        on_mounted: Some(Box::new(on_mounted)),
    }
}

impl<C: Control> Control for MountWatch<C> {
    fn position(&self) -> ControlPosition {
        self.inner.position()
    }

    fn build(&mut self, map: &MapHandle) -> Result<Element> {
        self.inner.build(map)
    }

    fn container_assigned(&mut self, ctx: &mut MountContext<'_>) {
        // Fire once on the first assignment, then assignment proceeds as
        // if the watcher were not there.
        if let Some(mut callback) = self.on_mounted.take() {
            callback(ctx);
        }
        self.inner.container_assigned(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::control::EventBinding;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    struct PlainControl {
        assignments: usize,
    }

    impl Control for PlainControl {
        fn build(&mut self, _map: &MapHandle) -> Result<Element> {
            Ok(Element::div("plain-control"))
        }

        fn container_assigned(&mut self, _ctx: &mut MountContext<'_>) {
            self.assignments += 1;
        }
    }

    fn assign(control: &mut dyn Control, root: &mut Element) {
        let mut bindings: Vec<EventBinding> = Vec::new();
        let mut ctx = MountContext::new(root, &mut bindings);
        control.container_assigned(&mut ctx);
    }

    #[test]
    fn test_callback_fires_exactly_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let mut watched = watch_for_mount(PlainControl { assignments: 0 }, move |_ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut root = Element::div("plain-control");
        assign(&mut watched, &mut root);
        assign(&mut watched, &mut root);
        assign(&mut watched, &mut root);

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        // while every assignment still reached the wrapped control
        assert_eq!(watched.inner().assignments, 3);
    }

    #[test]
    fn test_callback_can_mutate_the_root() {
        let mut watched = watch_for_mount(PlainControl { assignments: 0 }, |ctx| {
            ctx.root.set_attr("href", "#");
        });

        let mut root = Element::div("plain-control");
        assign(&mut watched, &mut root);

        assert_eq!(root.attr("href"), Some("#"));
    }
}
