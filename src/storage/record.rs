//! Fixed-width record encoding
//!
//! One stored string per record, zero-padded or truncated to `RECORD_SIZE`.

use bytes::{Bytes, BytesMut};

/// Size of every record in the file
pub const RECORD_SIZE: usize = 256;

/// Encode a value into exactly `RECORD_SIZE` bytes.
///
/// Anything past the first `RECORD_SIZE` bytes of the UTF-8 encoding is
/// dropped without error.
pub fn encode(value: &str) -> Bytes {
    let bytes = value.as_bytes();
    let len = bytes.len().min(RECORD_SIZE);

    let mut record = BytesMut::zeroed(RECORD_SIZE);
    record[..len].copy_from_slice(&bytes[..len]);
    record.freeze()
}

/// Decode a record back into a string.
///
/// Trailing zero bytes are padding. A truncation that split a multi-byte
/// character decodes to U+FFFD for the broken tail.
pub fn decode(record: &[u8]) -> String {
    let end = record
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);

    String::from_utf8_lossy(&record[..end]).into_owned()
}

/// Whether `encode` will cut this value
pub fn is_truncated(value: &str) -> bool {
    value.len() > RECORD_SIZE
}
