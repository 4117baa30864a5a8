//! JSON bodies exchanged with the document server's converter and command services.

use serde::{Deserialize, Serialize};

use docgate_core::error::AppError;
use docgate_core::result::AppResult;
use docgate_core::traits::{CommandRequest, ConversionOutcome, ConversionRequest};
use docgate_core::types::base_name;

/// Converter error code meaning "conversion not finished in time".
pub const CONVERSION_TIMEOUT_CODE: i64 = -2;

/// Command-service codes that count as success (`4` = document not modified).
const COMMAND_OK_CODES: [i64; 2] = [0, 4];

/// Body posted to the converter.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertBody {
    /// Whether the server answers immediately with progress.
    #[serde(rename = "async")]
    pub is_async: bool,
    /// Source document URL.
    pub url: String,
    /// Target format, without the leading dot.
    pub outputtype: String,
    /// Source format, without the leading dot.
    pub filetype: String,
    /// Document title.
    pub title: String,
    /// Revision key.
    pub key: String,
}

impl From<&ConversionRequest> for ConvertBody {
    fn from(request: &ConversionRequest) -> Self {
        Self {
            is_async: request.is_async,
            url: request.source_uri.clone(),
            outputtype: request.target_ext.trim_start_matches('.').to_string(),
            filetype: request.source_ext.trim_start_matches('.').to_string(),
            title: format!("{}{}", base_name(&request.source_uri), request.target_ext),
            key: request.revision_key.clone(),
        }
    }
}

/// Converter response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertReply {
    /// Whether the conversion has finished.
    #[serde(rename = "endConvert", default)]
    pub end_convert: bool,
    /// Location of the converted document.
    #[serde(rename = "fileUrl", default)]
    pub file_url: Option<String>,
    /// Progress in percent.
    #[serde(default)]
    pub percent: Option<i64>,
    /// Error code; absent or `0` on success.
    #[serde(default)]
    pub error: Option<i64>,
}

impl ConvertReply {
    /// Maps the reply onto an outcome or a typed error.
    pub fn into_outcome(self) -> AppResult<ConversionOutcome> {
        if let Some(code) = self.error.filter(|code| *code != 0) {
            let message = format!("Conversion failed: {}", conversion_error_message(code));
            return Err(if code == CONVERSION_TIMEOUT_CODE {
                AppError::conversion_timeout(message)
            } else {
                AppError::conversion_failed(message)
            });
        }

        if self.end_convert {
            return match self.file_url.filter(|url| !url.is_empty()) {
                Some(url) => Ok(ConversionOutcome::Completed(url)),
                None => Err(AppError::conversion_failed(
                    "Conversion finished without a result URL",
                )),
            };
        }

        let percent = self.percent.unwrap_or(0).clamp(0, 99) as u8;
        Ok(ConversionOutcome::Pending { percent })
    }
}

/// Body posted to the command service.
#[derive(Debug, Clone, Serialize)]
pub struct CommandBody {
    /// Command name.
    pub c: String,
    /// Document key.
    pub key: String,
}

impl From<&CommandRequest> for CommandBody {
    fn from(command: &CommandRequest) -> Self {
        Self {
            c: command.name().to_string(),
            key: command.key().to_string(),
        }
    }
}

/// Command-service response.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandReply {
    /// Result code.
    pub error: i64,
}

impl CommandReply {
    /// `Ok` for success codes, an `ExternalService` error otherwise.
    pub fn into_result(self, command: &CommandRequest) -> AppResult<()> {
        if COMMAND_OK_CODES.contains(&self.error) {
            Ok(())
        } else {
            Err(AppError::external(format!(
                "Command {} for key {} failed: {}",
                command.name(),
                command.key(),
                command_error_message(self.error)
            )))
        }
    }
}

fn conversion_error_message(code: i64) -> &'static str {
    match code {
        -1 => "unknown error",
        -2 => "timeout",
        -3 => "conversion error",
        -4 => "error while downloading the source document",
        -5 => "incorrect password",
        -6 => "error while accessing the conversion result database",
        -7 => "input error",
        -8 => "invalid token",
        _ => "unrecognised error code",
    }
}

fn command_error_message(code: i64) -> &'static str {
    match code {
        1 => "document key is missing or no document with such key could be found",
        2 => "callback url not correct",
        3 => "internal server error",
        5 => "command not correct",
        6 => "invalid token",
        _ => "unrecognised error code",
    }
}
