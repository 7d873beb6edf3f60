use sha2::{Digest, Sha256};

use crate::RasterFormat;

const MAX_BASE_LEN: usize = 80;

/// File name for a downloaded snapshot: `{filename_base}.{ext}`.
///
/// Characters that are illegal in file names become `_`. Overlong bases are
/// truncated and suffixed with a short hash so distinct ids stay distinct.
pub fn export_filename(filename_base: &str, format: RasterFormat) -> String {
    let sanitized: String = filename_base
        .trim()
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut base = sanitized.trim_matches(&['.', ' '][..]).to_string();
    if base.is_empty() {
        base = "snapshot".to_string();
    }
    if base.len() > MAX_BASE_LEN {
        let mut end = MAX_BASE_LEN;
        while !base.is_char_boundary(end) {
            end -= 1;
        }
        base = format!("{}--{}", &base[..end], short_hash(filename_base));
    }
    format!("{base}.{}", format.extension())
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
