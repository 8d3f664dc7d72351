//! Coordinate reference systems the base-layer catalogue knows about.
//!
//! Base-layer tile sources carry one URL per CRS; the active projection
//! picks the variant. The Dutch national grid (EPSG:28992, "Rijksdriehoek")
//! serves its tiles TMS-style, while the Web Mercator sources never do,
//! which is why the `tms` flag is suppressed for EPSG:3857.

use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// Web Mercator, the universal web-map projection
    #[serde(rename = "EPSG:3857")]
    Epsg3857,
    /// Rijksdriehoekstelsel, the Dutch national grid
    #[serde(rename = "EPSG:28992")]
    Epsg28992,
}

impl Crs {
    pub fn parse(code: &str) -> Result<Self> {
        match code {
            "EPSG:3857" => Ok(Self::Epsg3857),
            "EPSG:28992" => Ok(Self::Epsg28992),
            other => Err(MapError::ParseError(format!(
                "unknown projection: {other}"
            ))),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Epsg3857 => "EPSG:3857",
            Self::Epsg28992 => "EPSG:28992",
        }
    }

    /// Whether a configured `tms` flag is honored for this CRS.
    ///
    /// Web Mercator tile services are always XYZ-addressed, so a stray
    /// `tms: true` in the configuration must not flip the row order there.
    pub fn honors_tms(&self) -> bool {
        !matches!(self, Self::Epsg3857)
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
