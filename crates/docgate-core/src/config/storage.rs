//! Document storage configuration.

use serde::{Deserialize, Serialize};

/// Local document storage and accepted formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding one sub-directory per topic.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Name of the trash directory (relative to `root_path`) for deleted topics.
    #[serde(default = "default_trash_dir")]
    pub trash_dir: String,
    /// Blank document copied when a topic is created. Empty creates an empty file.
    #[serde(default)]
    pub template_path: String,
    /// Maximum upload size in bytes (default 5 MB).
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Extensions that can only be viewed.
    #[serde(default = "default_viewed_docs")]
    pub viewed_docs: Vec<String>,
    /// Extensions that can be edited in place.
    #[serde(default = "default_edited_docs")]
    pub edited_docs: Vec<String>,
    /// Extensions converted to an editable format before editing.
    #[serde(default = "default_converted_docs")]
    pub converted_docs: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            trash_dir: default_trash_dir(),
            template_path: String::new(),
            max_file_size: default_max_file_size(),
            viewed_docs: default_viewed_docs(),
            edited_docs: default_edited_docs(),
            converted_docs: default_converted_docs(),
        }
    }
}

impl StorageConfig {
    /// Returns whether an extension (with leading dot) may be edited.
    pub fn is_editable(&self, ext: &str) -> bool {
        contains_ext(&self.edited_docs, ext)
    }

    /// Returns whether an extension must be converted before editing.
    pub fn is_convertible(&self, ext: &str) -> bool {
        contains_ext(&self.converted_docs, ext)
    }

    /// Returns whether an extension is accepted at all.
    pub fn is_supported(&self, ext: &str) -> bool {
        contains_ext(&self.viewed_docs, ext)
            || contains_ext(&self.edited_docs, ext)
            || contains_ext(&self.converted_docs, ext)
    }
}

fn contains_ext(list: &[String], ext: &str) -> bool {
    list.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

fn default_root_path() -> String {
    "./data/storage".to_string()
}

fn default_trash_dir() -> String {
    ".trash".to_string()
}

fn default_max_file_size() -> u64 {
    5_242_880 // 5 MB
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_viewed_docs() -> Vec<String> {
    to_strings(&[".pdf", ".djvu", ".xps"])
}

fn default_edited_docs() -> Vec<String> {
    to_strings(&[".docx", ".xlsx", ".csv", ".pptx", ".ppsx", ".txt"])
}

fn default_converted_docs() -> Vec<String> {
    to_strings(&[
        ".docm", ".dotx", ".dotm", ".dot", ".doc", ".odt", ".fodt", ".ott", ".xlsm", ".xltx",
        ".xltm", ".xlt", ".xls", ".ods", ".fods", ".ots", ".pptm", ".ppt", ".ppsm", ".pps",
        ".potx", ".potm", ".pot", ".odp", ".fodp", ".otp", ".rtf", ".mht", ".html", ".htm",
        ".epub",
    ])
}
