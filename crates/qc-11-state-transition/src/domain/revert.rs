//! ABI `Error(string)` revert payloads.

use primitive_types::U256;

/// Selector of `Error(string)`.
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Decodes a revert reason from `Error(string)` return data.
///
/// Returns `None` for any other payload, truncated data, or invalid UTF-8.
#[must_use]
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    let body = data.strip_prefix(&ERROR_SELECTOR)?;

    let offset = read_word_as_usize(body, 0)?;
    let len = read_word_as_usize(body, offset)?;
    let start = offset.checked_add(32)?;
    let end = start.checked_add(len)?;

    let bytes = body.get(start..end)?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Encodes `message` as `Error(string)` return data.
#[must_use]
pub fn encode_revert_reason(message: &str) -> Vec<u8> {
    let bytes = message.as_bytes();
    let padded = bytes.len().div_ceil(32) * 32;

    let mut out = Vec::with_capacity(4 + 64 + padded);
    out.extend_from_slice(&ERROR_SELECTOR);
    out.extend_from_slice(&word(32));
    out.extend_from_slice(&word(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(4 + 64 + padded, 0);
    out
}

fn word(value: usize) -> [u8; 32] {
    let mut out = [0u8; 32];
    U256::from(value).to_big_endian(&mut out);
    out
}

fn read_word_as_usize(data: &[u8], at: usize) -> Option<usize> {
    let bytes = data.get(at..at.checked_add(32)?)?;
    let value = U256::from_big_endian(bytes);
    if value > U256::from(usize::MAX) {
        return None;
    }
    Some(value.as_usize())
}
