//! # shellrelay Output Normalization (`common::encoding`)
//!
//! File: cli/src/common/encoding.rs
//!
//! ## Overview
//!
//! Windows interpreters do not agree on an output encoding: `cmd` writes the
//! console code page (usually UTF-8 when piped from a modern host), while
//! PowerShell and some native tools write UTF-16LE, with or without a byte
//! order mark. This module turns the raw captured bytes into text.
//!
//! ## Detection
//!
//! [`is_utf16`] classifies a buffer:
//!
//! 1. A leading BOM (`FF FE` little-endian, `FE FF` big-endian) is authoritative.
//! 2. Otherwise an even-length buffer longer than 10 bytes is UTF-16 when more
//!    than 30% of its odd-indexed bytes are zero. Latin-range text in UTF-16LE
//!    has a zero high byte in every second position.
//! 3. Anything else is treated as already-encoded text.
//!
//! Step 2 is statistical. Dense binary data with many zero bytes can be
//! misclassified, and UTF-16 text made mostly of non-Latin characters can be
//! missed. Both are accepted approximations.
//!
//! ## Decoding
//!
//! [`decode_utf16`] strips the BOM (which also fixes the byte order, default
//! little-endian), pairs bytes into code units and decodes them with surrogate
//! handling. A buffer with an odd byte count after the BOM cannot be UTF-16
//! and is passed through as text instead.
//!
use crate::core::trace::DebugTrace;

/// UTF-16 little-endian byte order mark.
pub const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
/// UTF-16 big-endian byte order mark.
pub const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Share of zero odd-indexed bytes above which a BOM-less buffer counts as UTF-16LE.
pub const ZERO_HIGH_BYTE_THRESHOLD: f64 = 0.3;
/// Buffers at or below this length are never classified by the heuristic.
const HEURISTIC_MIN_LEN: usize = 10;

/// Decodes captured process output into text, recording the decision in `trace`.
pub fn normalize(bytes: &[u8], trace: &mut DebugTrace) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    if is_utf16(bytes) {
        trace.note(|| "UTF-16 encoding detected, decoding...".to_string());
        decode_utf16(bytes)
    } else {
        trace.note(|| "Using standard UTF-8 processing".to_string());
        passthrough(bytes)
    }
}

/// Returns `true` when `bytes` look like UTF-16 encoded text.
pub fn is_utf16(bytes: &[u8]) -> bool {
    if bytes.starts_with(&UTF16_LE_BOM) || bytes.starts_with(&UTF16_BE_BOM) {
        return true;
    }

    if bytes.len() % 2 == 0 && bytes.len() > HEURISTIC_MIN_LEN {
        let zero_high = bytes.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
        let units = (bytes.len() / 2) as f64;
        return zero_high as f64 / units > ZERO_HIGH_BYTE_THRESHOLD;
    }

    false
}

/// Decodes UTF-16 bytes (optional BOM, little-endian by default) into text.
pub fn decode_utf16(bytes: &[u8]) -> String {
    let (body, little_endian) = if let Some(rest) = bytes.strip_prefix(&UTF16_LE_BOM) {
        (rest, true)
    } else if let Some(rest) = bytes.strip_prefix(&UTF16_BE_BOM) {
        (rest, false)
    } else {
        (bytes, true)
    };

    if body.len() % 2 != 0 {
        return passthrough(body);
    }

    let units = body.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if little_endian {
            u16::from_le_bytes(pair)
        } else {
            u16::from_be_bytes(pair)
        }
    });

    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Bytes that are already text; invalid UTF-8 sequences are replaced, not rejected.
fn passthrough(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
