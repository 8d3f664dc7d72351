//! Print pipeline.
//!
//! The plugin is registered hidden: it never mounts a visible size mode
//! picker, and the map-owned print trigger starts an export directly with
//! one of the configured size modes.

use crate::ui::control::ControlPosition;
use crate::{MapError, Result};

use log::info;
use serde::{Deserialize, Serialize};

/// Page layout for one print run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintSizeMode {
    A4Portrait,
    A4Landscape,
    /// Print at the viewport's current size.
    Current,
}

impl PrintSizeMode {
    pub fn label(&self) -> &'static str {
        match self {
            PrintSizeMode::A4Portrait => "A4 staand",
            PrintSizeMode::A4Landscape => "A4 liggend",
            PrintSizeMode::Current => "Huidige weergave",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrintPluginOptions {
    /// No picker UI is mounted; the trigger lives with the map chrome.
    pub hidden: bool,
    /// Produce an export artifact instead of opening a print dialog.
    pub export_only: bool,
    pub hide_control_container: bool,
    pub position: ControlPosition,
    pub filename: String,
    pub size_modes: Vec<PrintSizeMode>,
}

impl Default for PrintPluginOptions {
    fn default() -> Self {
        Self {
            hidden: true,
            export_only: true,
            hide_control_container: false,
            position: ControlPosition::TopRight,
            filename: "export".to_string(),
            size_modes: vec![
                PrintSizeMode::A4Portrait,
                PrintSizeMode::A4Landscape,
                PrintSizeMode::Current,
            ],
        }
    }
}

/// One started print run, announced to listeners before rendering begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    pub mode: PrintSizeMode,
    pub filename: String,
}

#[derive(Debug)]
pub struct PrintPlugin {
    options: PrintPluginOptions,
}

impl PrintPlugin {
    pub fn new(options: PrintPluginOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PrintPluginOptions {
        &self.options
    }

    /// Starts a print run in one of the configured size modes.
    pub fn start(&self, mode: PrintSizeMode) -> Result<PrintJob> {
        if !self.options.size_modes.contains(&mode) {
            return Err(MapError::Export(format!(
                "size mode {mode:?} not configured for printing"
            )));
        }
        info!("print started: {} as {}", self.options.filename, mode.label());
        Ok(PrintJob {
            mode,
            filename: self.options.filename.clone(),
        })
    }
}

impl Default for PrintPlugin {
    fn default() -> Self {
        Self::new(PrintPluginOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_returns_configured_filename() {
        let plugin = PrintPlugin::default();
        let job = plugin.start(PrintSizeMode::A4Landscape).unwrap();
        assert_eq!(job.filename, "export");
        assert_eq!(job.mode, PrintSizeMode::A4Landscape);
    }

    #[test]
    fn test_unconfigured_mode_is_rejected() {
        let plugin = PrintPlugin::new(PrintPluginOptions {
            size_modes: vec![PrintSizeMode::Current],
            ..PrintPluginOptions::default()
        });
        assert!(plugin.start(PrintSizeMode::A4Portrait).is_err());
    }

    #[test]
    fn test_defaults_match_hidden_export_setup() {
        let options = PrintPluginOptions::default();
        assert!(options.hidden);
        assert!(options.export_only);
        assert!(!options.hide_control_container);
        assert_eq!(options.position, ControlPosition::TopRight);
        assert_eq!(options.size_modes.len(), 3);
    }
}
