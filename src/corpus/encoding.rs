//! Text decoding under an ordered list of candidate encodings.
//!
//! Each candidate is tried in turn and the first one that decodes the whole
//! input without malformed sequences wins. Labels follow the WHATWG encoding
//! names understood by `encoding_rs` (`utf-8`, `windows-1254`, `latin1`, ...).

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::error::{CorpusError, CorpusResult};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decodes `bytes` with the first candidate encoding that accepts them.
///
/// Returns the text and the canonical name of the encoding that worked.
/// Unknown labels are logged and skipped.
pub fn decode_with_candidates(
    bytes: &[u8],
    candidates: &[String],
) -> Option<(String, &'static str)> {
    for label in candidates {
        let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) else {
            tracing::warn!("Ignoring unknown encoding label '{label}'");
            continue;
        };

        if let Some(text) = decode_strict(encoding, bytes) {
            return Some((text.into_owned(), encoding.name()));
        }
        tracing::debug!("Input is not valid {}", encoding.name());
    }
    None
}

/// Reads a file and decodes it with [`decode_with_candidates`].
pub fn read_text_file(path: &Path, candidates: &[String]) -> CorpusResult<String> {
    let bytes = std::fs::read(path).map_err(|source| CorpusError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let (text, encoding) =
        decode_with_candidates(&bytes, candidates).ok_or_else(|| CorpusError::Undecodable {
            path: path.to_path_buf(),
            encodings: candidates.to_vec(),
        })?;

    tracing::info!("Read {} as {encoding}", path.display());
    Ok(text)
}

fn decode_strict<'a>(encoding: &'static Encoding, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
    let bytes = if encoding == UTF_8 {
        bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
    } else {
        bytes
    };
    encoding.decode_without_bom_handling_and_without_replacement(bytes)
}
