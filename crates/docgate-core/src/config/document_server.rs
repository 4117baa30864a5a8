//! External document server (editor + converter) configuration.

use serde::{Deserialize, Serialize};

/// Location and timeouts of the external document server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentServerConfig {
    /// Base URL of the document server (e.g. `https://office.example.com`).
    #[serde(default = "default_site_url")]
    pub site_url: String,
    /// Path of the editor JavaScript API, appended to `site_url`.
    #[serde(default = "default_api_path")]
    pub api_path: String,
    /// Path of the conversion endpoint, appended to `site_url`.
    #[serde(default = "default_converter_path")]
    pub converter_path: String,
    /// Path of the command endpoint, appended to `site_url`.
    #[serde(default = "default_command_path")]
    pub command_path: String,
    /// Timeout for a synchronous conversion in seconds.
    #[serde(default = "default_conversion_timeout")]
    pub conversion_timeout_seconds: u64,
    /// Timeout for command requests (force-save) in seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_seconds: u64,
    /// Timeout for downloading edited documents and change packages in seconds.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_seconds: u64,
    /// URL of the file chooser offered inside the editor.
    #[serde(default)]
    pub file_choice_url: String,
    /// Editor plugin configuration passed through verbatim.
    #[serde(default)]
    pub plugins: serde_json::Value,
}

impl Default for DocumentServerConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            api_path: default_api_path(),
            converter_path: default_converter_path(),
            command_path: default_command_path(),
            conversion_timeout_seconds: default_conversion_timeout(),
            command_timeout_seconds: default_command_timeout(),
            download_timeout_seconds: default_download_timeout(),
            file_choice_url: String::new(),
            plugins: serde_json::Value::Null,
        }
    }
}

impl DocumentServerConfig {
    /// Full URL of the editor API script.
    pub fn api_url(&self) -> String {
        join_url(&self.site_url, &self.api_path)
    }

    /// Full URL of the conversion service.
    pub fn converter_url(&self) -> String {
        join_url(&self.site_url, &self.converter_path)
    }

    /// Full URL of the command service.
    pub fn command_url(&self) -> String {
        join_url(&self.site_url, &self.command_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn default_site_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_path() -> String {
    "/web-apps/apps/api/documents/api.js".to_string()
}

fn default_converter_path() -> String {
    "/ConvertService.ashx".to_string()
}

fn default_command_path() -> String {
    "/coauthoring/CommandService.ashx".to_string()
}

fn default_conversion_timeout() -> u64 {
    120
}

fn default_command_timeout() -> u64 {
    10
}

fn default_download_timeout() -> u64 {
    60
}
