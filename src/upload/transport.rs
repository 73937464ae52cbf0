use super::types::{SelectedFile, Transport, TransportError, TransportEvent};
use crate::config::UploaderConfig;
use crate::results::{cell_text, Payload};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode};
use serde_json::Value;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

const CHUNK_SIZE: usize = 64 * 1024;

/// Posts the file as `multipart/form-data` to the configured endpoint.
///
/// Each submission runs on its own worker thread with a private tokio
/// runtime, so the GUI thread never blocks.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    form_field: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &UploaderConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim().to_string(),
            form_field: config.form_field.clone(),
            timeout: config.request_timeout(),
        }
    }

    async fn upload(
        &self,
        file: &SelectedFile,
        events: &Sender<TransportEvent>,
    ) -> Result<Payload, TransportError> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|e| TransportError::with_message(format!("Failed to read file: {}", e)))?;
        let total = bytes.len() as u64;

        let part = Part::stream_with_length(progress_body(bytes, events.clone()), total)
            .file_name(file.name.clone())
            .mime_str("application/pdf")
            .map_err(|e| TransportError::with_message(e.to_string()))?;
        let form = Form::new().part(self.form_field.clone(), part);

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| TransportError::with_message(format!("Failed to build client: {}", e)))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            file_name = %file.name,
            size = total,
            "Sending upload"
        );

        let response = client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::with_message(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::with_message(format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            success_payload(&body)
        } else {
            Err(failure_from_response(&self.endpoint, status, &body))
        }
    }
}

impl Transport for HttpTransport {
    fn submit_file(&self, file: &SelectedFile) -> Receiver<TransportEvent> {
        let (sender, receiver) = channel();
        let transport = self.clone();
        let file = file.clone();

        std::thread::spawn(move || {
            let outcome = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt.block_on(transport.upload(&file, &sender)),
                Err(e) => Err(TransportError::with_message(format!(
                    "Failed to start runtime: {}",
                    e
                ))),
            };

            let event = match outcome {
                Ok(payload) => TransportEvent::Succeeded(payload),
                Err(err) => {
                    tracing::warn!(file_name = %file.name, error = %err, "Upload failed");
                    TransportEvent::Failed(err)
                }
            };
            // The session may have been dropped with the window; nothing to do then.
            let _ = sender.send(event);
        });

        receiver
    }
}

/// Streams `bytes` in chunks, reporting cumulative percent as each chunk is
/// handed to the connection. Chunks are views into one shared buffer.
fn progress_body(bytes: Vec<u8>, events: Sender<TransportEvent>) -> Body {
    let bytes = Bytes::from(bytes);
    let total = bytes.len();

    let stream = futures_util::stream::iter((0..total).step_by(CHUNK_SIZE).map(move |start| {
        let end = (start + CHUNK_SIZE).min(total);
        let _ = events.send(TransportEvent::Progress(percent(end, total)));
        Ok::<_, std::io::Error>(bytes.slice(start..end))
    }));

    Body::wrap_stream(stream)
}

fn percent(sent: usize, total: usize) -> f32 {
    if total == 0 {
        100.0
    } else {
        (sent as f64 * 100.0 / total as f64) as f32
    }
}

/// A JSON object is the payload as-is; any other JSON value is wrapped under
/// `response` so the table always receives an object.
pub(crate) fn success_payload(body: &str) -> Result<Payload, TransportError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| TransportError::with_message(format!("Invalid response body: {}", e)))?;
    Ok(match value {
        Value::Object(map) => map,
        other => {
            let mut map = Payload::new();
            map.insert("response".to_string(), other);
            map
        }
    })
}

/// Only a body-level `error` field counts as the structured detail; anything
/// else falls back to the HTTP status line.
pub(crate) fn failure_from_response(
    endpoint: &str,
    status: StatusCode,
    body: &str,
) -> TransportError {
    let detail = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .get("error")
            .filter(|field| !field.is_null())
            .map(cell_text)
    });

    TransportError {
        detail,
        message: Some(format!("Http failure response for {}: {}", endpoint, status)),
    }
}
