//! Icon registry: breach category to marker descriptor.
//!
//! Pure data, resolved at construction and handed to the layer factory as
//! an explicit read-only value. Lookup is total: unknown categories fall
//! back to the default marker.

/// Marker icon default size (regular PNG).
pub const MARKER_ICON_SIZE: (u32, u32) = (25, 41);

/// Anchor inside the icon (hot-spot) in pixel coords.
pub const MARKER_ICON_ANCHOR: (u32, u32) = (12, 41);

/// Immutable marker descriptor: image set plus anchor geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct IconDescriptor {
    pub icon_url: &'static str,
    pub icon_retina_url: &'static str,
    pub shadow_url: &'static str,
    pub icon_size: (u32, u32),
    pub icon_anchor: (u32, u32),
    pub popup_anchor: (i32, i32),
    pub tooltip_anchor: (i32, i32),
    pub shadow_size: (u32, u32),
}

impl IconDescriptor {
    const fn colored(icon_url: &'static str, icon_retina_url: &'static str) -> Self {
        Self {
            icon_url,
            icon_retina_url,
            shadow_url: "img/markers/marker-shadow.png",
            icon_size: MARKER_ICON_SIZE,
            icon_anchor: MARKER_ICON_ANCHOR,
            popup_anchor: (1, -34),
            tooltip_anchor: (16, -28),
            shadow_size: (41, 41),
        }
    }
}

/// Domain categories for breach-point layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreachCategory {
    Primary,
    Regional,
    OutsideDike,
    Flooding,
}

impl BreachCategory {
    /// Parses a wire token; unknown tokens yield `None` so lookups can
    /// fall back to the default icon.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "BREACH_PRIMARY" => Some(Self::Primary),
            "BREACH_REGIONAL" => Some(Self::Regional),
            "BREACH_OUTSIDE_DIKE" => Some(Self::OutsideDike),
            "BREACH_FLOODING" => Some(Self::Flooding),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Primary => "BREACH_PRIMARY",
            Self::Regional => "BREACH_REGIONAL",
            Self::OutsideDike => "BREACH_OUTSIDE_DIKE",
            Self::Flooding => "BREACH_FLOODING",
        }
    }
}

const DEFAULT_ICON: IconDescriptor = IconDescriptor::colored(
    "img/markers/marker-icon-blue.png",
    "img/markers/marker-icon-2x-blue.png",
);

const GREEN_ICON: IconDescriptor = IconDescriptor::colored(
    "img/markers/marker-icon-green.png",
    "img/markers/marker-icon-2x-green.png",
);

const BLACK_ICON: IconDescriptor = IconDescriptor::colored(
    "img/markers/marker-icon-black.png",
    "img/markers/marker-icon-2x-black.png",
);

/// Fixed category-to-icon mapping plus a default fallback.
#[derive(Debug, Clone, Default)]
pub struct IconRegistry;

impl IconRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Total lookup: every category resolves, unknown ones to the default.
    ///
    /// Descriptors are consts, so the borrow outlives the registry.
    pub fn icon_for(&self, category: Option<BreachCategory>) -> &'static IconDescriptor {
        match category {
            Some(BreachCategory::Primary) | None => &DEFAULT_ICON,
            Some(BreachCategory::Regional) => &GREEN_ICON,
            Some(BreachCategory::OutsideDike) | Some(BreachCategory::Flooding) => &BLACK_ICON,
        }
    }

    /// Convenience lookup straight from a wire token.
    pub fn icon_for_token(&self, token: &str) -> &'static IconDescriptor {
        self.icon_for(BreachCategory::parse(token))
    }
}
