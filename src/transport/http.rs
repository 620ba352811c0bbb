//! reqwest-backed transport.

use crate::config::ApiConfig;
use crate::error::TransportError;
use crate::transport::{decode_body, HttpMethod, RequestBody, Transport, TransportRequest, UploadForm};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// HTTP client for the workspace server.
///
/// No request timeout is configured; uploads run until the server answers.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    chunk_size: usize,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Client(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &ApiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chunk_size: config.upload_chunk_size.max(1),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn builder(&self, method: HttpMethod, url: &str) -> RequestBuilder {
        match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Delete => self.client.delete(url),
        }
    }

    /// Multipart form whose file part reports progress as the body is consumed.
    fn upload_form(&self, form: UploadForm) -> Form {
        let total = form.total_bytes();
        let reporter = form.progress;
        let chunks: Vec<Vec<u8>> = form
            .content
            .chunks(self.chunk_size)
            .map(<[u8]>::to_vec)
            .collect();
        if chunks.is_empty() {
            reporter.report(0, 0);
        }

        let mut loaded = 0u64;
        let stream = futures::stream::iter(chunks).map(move |chunk| {
            loaded += chunk.len() as u64;
            reporter.report(loaded, total);
            Ok::<_, std::io::Error>(chunk)
        });

        let file_part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
            .file_name(form.file_name);

        Form::new()
            .part("file", file_part)
            .text("targetRelativePath", form.target_relative_path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = request.method.as_str(), path = request.path))]
    async fn send(&self, request: TransportRequest) -> Result<Value, TransportError> {
        let url = self.url(request.path);
        let builder = self.builder(request.method, &url);
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(form) => builder.multipart(self.upload_form(form)),
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "request rejected by server");
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail: text,
            });
        }

        debug!(status = status.as_u16(), bytes = text.len(), "request completed");
        Ok(decode_body(&text))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
