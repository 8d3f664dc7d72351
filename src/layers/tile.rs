use crate::core::geo::TILE_SIZE;

/// Options applied to base tile layers, resolved from the map
/// configuration with process-wide fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct TileOptions {
    pub attribution: Option<String>,
    pub max_zoom: f64,
    pub min_zoom: f64,
    pub tms: bool,
    pub continuous_world: bool,
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            attribution: None,
            max_zoom: 18.0,
            min_zoom: 0.0,
            tms: false,
            continuous_world: false,
        }
    }
}

/// Raster overlay composed of pre-rendered tiles addressed by z/x/y.
#[derive(Debug, Clone)]
pub struct TileLayer {
    id: Option<String>,
    url: String,
    opacity: f64,
    options: TileOptions,
}

impl TileLayer {
    /// Overlay tile layer: only the source URL and opacity vary.
    pub fn new(id: Option<String>, url: impl Into<String>, opacity: f64) -> Self {
        Self {
            id,
            url: url.into(),
            opacity,
            options: TileOptions::default(),
        }
    }

    /// Base tile layer with resolved options.
    pub fn with_options(url: impl Into<String>, options: TileOptions) -> Self {
        Self {
            id: None,
            url: url.into(),
            opacity: 1.0,
            options,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn options(&self) -> &TileOptions {
        &self.options
    }

    pub fn tile_size(&self) -> u32 {
        TILE_SIZE
    }

    /// Expands the URL template for one tile, flipping the row index for
    /// TMS-addressed sources.
    pub fn tile_url(&self, z: u32, x: u32, y: u32) -> String {
        let y = if self.options.tms {
            (1u32 << z) - 1 - y
        } else {
            y
        };
        self.url
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}
