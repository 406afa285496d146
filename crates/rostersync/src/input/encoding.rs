//! Best-effort text encoding detection.
//!
//! The guess is a hint for the loader, not ground truth. Anything the
//! detector cannot place confidently falls back to UTF-8.

use std::borrow::Cow;

use encoding_rs::{Encoding, EUC_JP, SHIFT_JIS, UTF_8, WINDOWS_1252};

/// Encoding used when nothing better can be inferred.
pub const FALLBACK_ENCODING: &Encoding = UTF_8;

/// Legacy encodings tried, in order, when the bytes are not valid UTF-8.
/// windows-1252 maps every byte, so it only ever acts as a last resort.
const LEGACY_CANDIDATES: &[&Encoding] = &[SHIFT_JIS, EUC_JP];

/// Result of sniffing a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingGuess {
    /// The guessed encoding.
    pub encoding: &'static Encoding,
    /// Whether the guess came from positive evidence (BOM, clean decode)
    /// rather than the fallback.
    pub confident: bool,
    /// Length of the byte-order mark at the start of the buffer, if any.
    pub bom_len: usize,
}

impl EncodingGuess {
    fn confident(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            confident: true,
            bom_len: 0,
        }
    }

    /// Name of the guessed encoding (WHATWG label, e.g. `UTF-8`, `Shift_JIS`).
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }
}

/// Guess the text encoding of `bytes`.
pub fn detect_encoding(bytes: &[u8]) -> EncodingGuess {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return EncodingGuess {
            encoding,
            confident: true,
            bom_len,
        };
    }

    if Encoding::utf8_valid_up_to(bytes) == bytes.len() {
        return EncodingGuess::confident(UTF_8);
    }

    for &candidate in LEGACY_CANDIDATES {
        if decodes_cleanly(candidate, bytes) {
            return EncodingGuess::confident(candidate);
        }
    }

    if decodes_cleanly(WINDOWS_1252, bytes) {
        return EncodingGuess {
            encoding: WINDOWS_1252,
            confident: false,
            bom_len: 0,
        };
    }

    EncodingGuess {
        encoding: FALLBACK_ENCODING,
        confident: false,
        bom_len: 0,
    }
}

/// Decode `bytes` with the guessed encoding.
///
/// Returns `None` when the bytes contain sequences that are malformed for
/// that encoding.
pub fn decode_strict<'a>(guess: &EncodingGuess, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
    guess
        .encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[guess.bom_len..])
}

/// Decode `bytes` as UTF-8, replacing anything undecodable with U+FFFD.
pub fn decode_lossy(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _had_errors) = FALLBACK_ENCODING.decode_with_bom_removal(bytes);
    text
}

fn decodes_cleanly(encoding: &'static Encoding, bytes: &[u8]) -> bool {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .is_some()
}
