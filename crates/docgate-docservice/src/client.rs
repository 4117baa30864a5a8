//! HTTP client for the document server.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, info, warn};

use docgate_core::config::DocumentServerConfig;
use docgate_core::error::{AppError, ErrorKind};
use docgate_core::result::AppResult;
use docgate_core::traits::{CommandRequest, ConversionOutcome, ConversionRequest, DocumentService};

use crate::wire::{CommandBody, CommandReply, ConvertBody, ConvertReply};

/// [`DocumentService`] backed by the document server's HTTP API.
#[derive(Debug, Clone)]
pub struct DocumentServerClient {
    /// Shared HTTP client.
    http: Client,
    /// Converter endpoint.
    converter_url: String,
    /// Command-service endpoint.
    command_url: String,
    /// Upper bound for one conversion call.
    conversion_timeout: Duration,
    /// Upper bound for one command call.
    command_timeout: Duration,
    /// Upper bound for one download.
    download_timeout: Duration,
}

impl DocumentServerClient {
    /// Creates a client from configuration.
    pub fn new(config: &DocumentServerConfig) -> AppResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build document server HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            http,
            converter_url: config.converter_url(),
            command_url: config.command_url(),
            conversion_timeout: Duration::from_secs(config.conversion_timeout_seconds),
            command_timeout: Duration::from_secs(config.command_timeout_seconds),
            download_timeout: Duration::from_secs(config.download_timeout_seconds),
        })
    }
}

#[async_trait]
impl DocumentService for DocumentServerClient {
    async fn convert(&self, request: &ConversionRequest) -> AppResult<ConversionOutcome> {
        let body = ConvertBody::from(request);
        debug!(
            key = %body.key,
            from = %body.filetype,
            to = %body.outputtype,
            is_async = body.is_async,
            "Requesting conversion"
        );

        let call = async {
            let response = self
                .http
                .post(&self.converter_url)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| transport_error(e, ErrorKind::ConversionTimeout, "conversion"))?;

            let status = response.status();
            if !status.is_success() {
                return Err(AppError::conversion_failed(format!(
                    "Converter answered with HTTP {status}"
                )));
            }

            response
                .json::<ConvertReply>()
                .await
                .map_err(|e| transport_error(e, ErrorKind::ConversionTimeout, "conversion"))
        };

        let reply = bounded(self.conversion_timeout, ErrorKind::ConversionTimeout, "conversion", call)
            .await?;
        let outcome = reply.into_outcome()?;

        if let ConversionOutcome::Completed(uri) = &outcome {
            info!(key = %body.key, uri = %uri, "Conversion completed");
        }
        Ok(outcome)
    }

    async fn command(&self, command: &CommandRequest) -> AppResult<()> {
        let body = CommandBody::from(command);

        let call = async {
            let response = self
                .http
                .post(&self.command_url)
                .json(&body)
                .send()
                .await
                .map_err(|e| transport_error(e, ErrorKind::ExternalService, "command"))?;

            let status = response.status();
            if !status.is_success() {
                return Err(AppError::external(format!(
                    "Command service answered with HTTP {status}"
                )));
            }

            response
                .json::<CommandReply>()
                .await
                .map_err(|e| transport_error(e, ErrorKind::ExternalService, "command"))
        };

        let reply = bounded(self.command_timeout, ErrorKind::ExternalService, "command", call).await?;
        reply.into_result(command)?;

        info!(command = command.name(), key = command.key(), "Command accepted");
        Ok(())
    }

    async fn download(&self, uri: &str) -> AppResult<Bytes> {
        let call = async {
            let response = self
                .http
                .get(uri)
                .send()
                .await
                .map_err(|e| transport_error(e, ErrorKind::ExternalService, "download"))?;

            let status = response.status();
            if !status.is_success() {
                return Err(AppError::external(format!(
                    "Download of {uri} answered with HTTP {status}"
                )));
            }

            response
                .bytes()
                .await
                .map_err(|e| transport_error(e, ErrorKind::ExternalService, "download"))
        };

        let data = bounded(self.download_timeout, ErrorKind::ExternalService, "download", call).await?;
        debug!(uri, bytes = data.len(), "Downloaded document");
        Ok(data)
    }
}

/// Runs `call` with an upper bound; exceeding it yields an error of `timeout_kind`.
async fn bounded<T, F>(limit: Duration, timeout_kind: ErrorKind, what: &str, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation = what, seconds = limit.as_secs(), "Document server call timed out");
            Err(AppError::new(
                timeout_kind,
                format!("Document server {what} timed out after {}s", limit.as_secs()),
            ))
        }
    }
}

fn transport_error(err: reqwest::Error, timeout_kind: ErrorKind, what: &str) -> AppError {
    let kind = if err.is_timeout() {
        timeout_kind
    } else {
        ErrorKind::ExternalService
    };
    AppError::with_source(kind, format!("Document server {what} request failed: {err}"), err)
}
