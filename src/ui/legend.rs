//! Legend control for print output.
//!
//! The mounted content is a deep clone of an externally supplied fragment,
//! so the live legend and the printed legend are independent DOM subtrees:
//! mutating one never affects the other, and the control never touches the
//! caller's original.

use crate::core::canvas::MapHandle;
use crate::ui::control::{Control, ControlPosition};
use crate::ui::element::Element;
use crate::Result;

pub struct LegendControl {
    fragment: Element,
    position: ControlPosition,
}

/// `fragment` stays owned by the caller; the control keeps its own copy.
pub fn legend_control(fragment: &Element) -> LegendControl {
    LegendControl {
        fragment: fragment.deep_clone(),
        position: ControlPosition::BottomRight,
    }
}

impl Control for LegendControl {
    fn position(&self) -> ControlPosition {
        self.position
    }

    fn build(&mut self, _map: &MapHandle) -> Result<Element> {
        let mut root = Element::div("info legend");
        root.append_child(self.fragment.deep_clone());
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::canvas::test_support::test_map;

    fn fragment() -> Element {
        Element::div("legend-body")
            .with_child(Element::new("span").with_text("waterdiepte (m)"))
    }

    #[test]
    fn test_mount_clones_the_fragment() {
        let original = fragment();
        let mut control = legend_control(&original);
        let root = control.build(&test_map()).unwrap();

        assert!(root.has_class("info"));
        assert!(root.has_class("legend"));
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0], original);
        assert_ne!(root.children[0].node_id(), original.node_id());
    }

    #[test]
    fn test_mounted_clone_is_independent() {
        let original = fragment();
        let mut control = legend_control(&original);
        let mut root = control.build(&test_map()).unwrap();

        root.children[0].children[0].set_text("gewijzigd");
        assert_eq!(original.children[0].text(), Some("waterdiepte (m)"));

        // a second mount starts from the pristine copy again
        let root2 = control.build(&test_map()).unwrap();
        assert_eq!(root2.children[0], original);
    }
}
