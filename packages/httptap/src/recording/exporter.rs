// packages/httptap/src/recording/exporter.rs
//! Export the interception log for diagnostics
//!
//! Supports:
//! - JSON (one object per intercepted request)
//! - HAR 1.2 (request side only; the log does not keep responses)

use crate::recording::request_log::LoggedRequest;
use crate::utils::errors::{Result, TapError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format
    Json,

    /// HAR (HTTP Archive) format
    Har,
}

/// Exporter for the request log
pub struct Exporter {
    format: ExportFormat,
    max_body_size: usize,
}

impl Exporter {
    /// Create a new exporter; bodies longer than `max_body_size` are truncated
    pub fn new(format: ExportFormat, max_body_size: usize) -> Self {
        Self {
            format,
            max_body_size,
        }
    }

    /// Export requests to string
    ///
    /// Bodies are captured as a side effect, so they stay readable afterwards.
    pub async fn export(&self, requests: &[Arc<LoggedRequest>]) -> Result<String> {
        debug!("Exporting {} requests to {:?} format", requests.len(), self.format);

        let mut records = Vec::with_capacity(requests.len());
        for request in requests {
            records.push(self.record(request).await?);
        }

        match self.format {
            ExportFormat::Json => self.export_json(&records),
            ExportFormat::Har => self.export_har(&records),
        }
    }

    /// Export requests and write them to `path`
    pub async fn export_to_file(
        &self,
        requests: &[Arc<LoggedRequest>],
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let path = path.as_ref();
        let output = self.export(requests).await?;

        tokio::fs::write(path, output).await.map_err(|e| {
            TapError::Export(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!("Exported {} requests to {}", requests.len(), path.display());
        Ok(())
    }

    async fn record(&self, request: &LoggedRequest) -> Result<ExportedRequest> {
        let body = request.body_bytes().await?;
        let body_truncated = body.len() > self.max_body_size;
        let body = String::from_utf8_lossy(&body[..body.len().min(self.max_body_size)])
            .into_owned();

        let headers = request
            .headers()
            .iter()
            .map(|(name, value)| ExportedHeader {
                name: name.to_string(),
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            })
            .collect();

        Ok(ExportedRequest {
            id: request.id.to_string(),
            received_at: request.received_at,
            method: request.method().to_string(),
            url: request.url(),
            http_version: format!("{:?}", request.version()),
            headers,
            body,
            body_truncated,
        })
    }

    /// Export to JSON format
    fn export_json(&self, records: &[ExportedRequest]) -> Result<String> {
        serde_json::to_string_pretty(records)
            .map_err(|e| TapError::Export(format!("JSON serialization error: {}", e)))
    }

    /// Export to HAR format
    fn export_har(&self, records: &[ExportedRequest]) -> Result<String> {
        let har = HarDocument {
            log: HarLog {
                version: "1.2".to_string(),
                creator: HarCreator {
                    name: "httptap".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
                entries: records
                    .iter()
                    .map(|r| HarEntry {
                        started_date_time: format_timestamp(r.received_at),
                        request: HarRequest {
                            method: r.method.clone(),
                            url: r.url.clone(),
                            http_version: r.http_version.clone(),
                            headers: r.headers.clone(),
                            post_data: (!r.body.is_empty()).then(|| HarPostData {
                                mime_type: r
                                    .headers
                                    .iter()
                                    .find(|h| h.name.eq_ignore_ascii_case("content-type"))
                                    .map(|h| h.value.clone())
                                    .unwrap_or_default(),
                                text: r.body.clone(),
                            }),
                        },
                    })
                    .collect(),
            },
        };

        serde_json::to_string_pretty(&har)
            .map_err(|e| TapError::Export(format!("HAR serialization error: {}", e)))
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Serialize)]
struct ExportedRequest {
    id: String,
    received_at: DateTime<Utc>,
    method: String,
    url: String,
    http_version: String,
    headers: Vec<ExportedHeader>,
    body: String,
    body_truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
struct ExportedHeader {
    name: String,
    value: String,
}

// HAR format structures

#[derive(Serialize)]
struct HarDocument {
    log: HarLog,
}

#[derive(Serialize)]
struct HarLog {
    version: String,
    creator: HarCreator,
    entries: Vec<HarEntry>,
}

#[derive(Serialize)]
struct HarCreator {
    name: String,
    version: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HarEntry {
    started_date_time: String,
    request: HarRequest,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HarRequest {
    method: String,
    url: String,
    http_version: String,
    headers: Vec<ExportedHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    post_data: Option<HarPostData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HarPostData {
    mime_type: String,
    text: String,
}
