//! File-name helpers and document type classification.

use serde::{Deserialize, Serialize};

/// Editor document family, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Word-processing documents.
    Text,
    /// Spreadsheets.
    Spreadsheet,
    /// Presentations.
    Presentation,
}

const SPREADSHEET_EXTS: &[&str] = &[
    ".xls", ".xlsx", ".xlsm", ".xlt", ".xltx", ".xltm", ".ods", ".fods", ".ots", ".csv",
];

const PRESENTATION_EXTS: &[&str] = &[
    ".pps", ".ppsx", ".ppsm", ".ppt", ".pptx", ".pptm", ".pot", ".potx", ".potm", ".odp",
    ".fodp", ".otp",
];

impl DocumentType {
    /// Classifies a file name or URL. Anything not a spreadsheet or presentation is text.
    pub fn from_name(name: &str) -> Self {
        let ext = extension(name);
        if SPREADSHEET_EXTS.contains(&ext.as_str()) {
            Self::Spreadsheet
        } else if PRESENTATION_EXTS.contains(&ext.as_str()) {
            Self::Presentation
        } else {
            Self::Text
        }
    }

    /// The editable format documents of this family are converted into.
    pub fn internal_extension(&self) -> &'static str {
        match self {
            Self::Text => ".docx",
            Self::Spreadsheet => ".xlsx",
            Self::Presentation => ".pptx",
        }
    }

    /// Name used by the editor configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Spreadsheet => "spreadsheet",
            Self::Presentation => "presentation",
        }
    }
}

/// Last path segment of a path or URL, without query string or fragment.
pub fn file_name(path_or_url: &str) -> &str {
    let no_query = path_or_url
        .split(['?', '#'])
        .next()
        .unwrap_or(path_or_url);
    no_query
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(no_query)
}

/// File name without its extension.
pub fn base_name(path_or_url: &str) -> &str {
    let name = file_name(path_or_url);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Lower-cased extension including the leading dot, or an empty string.
pub fn extension(path_or_url: &str) -> String {
    let name = file_name(path_or_url);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_lowercase(),
        _ => String::new(),
    }
}
