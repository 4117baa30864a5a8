//! Revision keys understood by the document server.
//!
//! Keys are short, deterministic and restricted to `[0-9a-zA-Z.=_-]`. They
//! are not cryptographic: two different seeds may collide.

use chrono::{DateTime, Utc};

use docgate_core::types::TopicId;

/// Maximum key length accepted by the document server.
const MAX_KEY_LEN: usize = 20;

/// Derives a revision id from an arbitrary seed (usually a URL).
///
/// Seeds longer than 20 characters are first replaced by the decimal of
/// their 32-bit string hash.
pub fn generate_revision_id(seed: &str) -> String {
    let seed = if seed.chars().count() > MAX_KEY_LEN {
        string_hash(seed).to_string()
    } else {
        seed.to_string()
    };

    seed.chars()
        .map(|c| if is_key_char(c) { c } else { '_' })
        .take(MAX_KEY_LEN)
        .collect()
}

/// Editing-session key of a document.
///
/// Changes whenever a version is cut or the file is rewritten, which makes
/// the editor open a fresh session.
pub fn document_key(
    topic: &TopicId,
    file_uri: &str,
    version_count: u32,
    modified: DateTime<Utc>,
) -> String {
    generate_revision_id(&format!(
        "{topic}{file_uri}{version_count}{}",
        modified.timestamp_millis()
    ))
}

/// `h = 31 * h + unit` over UTF-16 code units with 32-bit wrap-around.
fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '=' | '_' | '-')
}
