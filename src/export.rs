//! Layer export against the webservice.
//!
//! The server bundles the requested layers into a zip archive; we POST the
//! selection and hand the returned bytes to a [`DownloadSink`], which is
//! whatever the hosting view uses to place a file in front of the user.

use crate::{MapError, Result};

use bytes::Bytes;
use log::{error, info};
use serde::Serialize;

const EXPORT_PATH: &str = "Maps.asmx/DownloadZipFileDataLayers";
const ZIP_MIME: &str = "application/zip";

/// Selection posted to the export webservice.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRequest {
    /// Layer identifiers, joined server-side into one archive.
    pub layers: Vec<String>,
    /// Base name of the archive, without extension.
    pub name: String,
}

/// A completed export ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime: String,
    pub bytes: Bytes,
}

/// Receives the finished archive; implementations decide how the file
/// reaches the user (save dialog, blob URL, test buffer).
pub trait DownloadSink {
    fn deliver(&mut self, download: Download) -> Result<()>;
}

/// Posts the layer selection to the export webservice and delivers the
/// resulting zip archive through `sink`.
pub async fn export_layers(
    client: &reqwest::Client,
    base_url: &str,
    request: &ExportRequest,
    sink: &mut dyn DownloadSink,
) -> Result<()> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), EXPORT_PATH);
    let response = client.post(&url).json(request).send().await?;

    let status = response.status();
    if !status.is_success() {
        error!("export of {} rejected: {status}", request.name);
        return Err(MapError::Export(format!(
            "webservice returned {status} for {url}"
        )));
    }

    let bytes = response.bytes().await?;
    info!("exported {} layers as {}.zip", request.layers.len(), request.name);
    sink.deliver(Download {
        filename: format!("{}.zip", request.name),
        mime: ZIP_MIME.to_string(),
        bytes,
    })
}

/// Buffers deliveries in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub downloads: Vec<Download>,
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, download: Download) -> Result<()> {
        self.downloads.push(download);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_layer_selection() {
        let request = ExportRequest {
            layers: vec!["LIWO_Basis_Waterdiepte".to_string(), "breaches".to_string()],
            name: "selectie".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["name"], "selectie");
        assert_eq!(json["layers"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_webservice_surfaces_a_network_error() {
        let client = reqwest::Client::new();
        let mut sink = MemorySink::default();
        let request = ExportRequest {
            layers: vec!["breaches".to_string()],
            name: "selectie".to_string(),
        };

        let err = export_layers(&client, "http://127.0.0.1:9", &request, &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, MapError::Network(_)));
        assert!(sink.downloads.is_empty());
    }

    #[test]
    fn test_memory_sink_keeps_downloads() {
        let mut sink = MemorySink::default();
        sink.deliver(Download {
            filename: "selectie.zip".to_string(),
            mime: ZIP_MIME.to_string(),
            bytes: Bytes::from_static(b"PK"),
        })
        .unwrap();
        assert_eq!(sink.downloads.len(), 1);
        assert_eq!(sink.downloads[0].filename, "selectie.zip");
    }
}
