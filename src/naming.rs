//! Filename parsing for stored upload names.
//!
//! The server stores every upload as `<anything>_<sequence>_<hash>.<ext>`,
//! where `sequence` is the position the image was given inside its article
//! and `hash` is a short lowercase hex digest:
//!
//! - `4296278785_2_ffe8e5.jpg` → sequence 2, hash `ffe8e5`, ext `jpg`
//! - `shirt_front_10_0a1b2c3d.webp` → sequence 10
//! - `noseq.jpg` → no match
//!
//! Names that don't follow the convention are still valid records. They
//! simply have no sequence and order as if they were sequence `0`.

/// Minimum length of the hex hash segment.
const MIN_HASH_LEN: usize = 6;

/// A filename that matched the `_<sequence>_<hash>.<ext>` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFilename<'a> {
    /// Everything before `_<sequence>_`. May be empty or contain underscores.
    pub prefix: &'a str,
    /// Parsed sequence number. Saturates at `u64::MAX` for absurdly long digit runs.
    pub sequence: u64,
    /// Lowercase hex hash (at least six characters).
    pub hash: &'a str,
    /// Extension without the dot.
    pub extension: &'a str,
}

/// Match `name` against `_<digits>_<hex{6,}>.<ext>` anchored at the end.
///
/// The extension is the text after the last `.` and must be made of word
/// characters (`[A-Za-z0-9_]`). The hash must be lowercase hex. Returns
/// `None` when any segment is missing or malformed.
pub fn parse_stored_filename(name: &str) -> Option<StoredFilename<'_>> {
    let (base, extension) = name.rsplit_once('.')?;
    if extension.is_empty() || !extension.chars().all(is_word_char) {
        return None;
    }

    let (rest, hash) = base.rsplit_once('_')?;
    if hash.len() < MIN_HASH_LEN || !hash.chars().all(is_lower_hex) {
        return None;
    }

    let (prefix, digits) = rest.rsplit_once('_')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(StoredFilename {
        prefix,
        sequence: parse_digits(digits),
        hash,
        extension,
    })
}

/// Ordering key for a filename: the embedded sequence, or `0` when the name
/// doesn't follow the stored-upload convention.
pub fn extract_sequence(name: &str) -> u64 {
    match parse_stored_filename(name) {
        Some(parsed) => parsed.sequence,
        None => 0,
    }
}

fn parse_digits(digits: &str) -> u64 {
    digits.chars().fold(0u64, |acc, c| {
        let d = u64::from(c as u8 - b'0');
        acc.saturating_mul(10).saturating_add(d)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_lower_hex(c: char) -> bool {
    matches!(c, '0'..='9' | 'a'..='f')
}
