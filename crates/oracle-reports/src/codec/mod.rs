//! Binary codecs for report payloads
//!
//! All integers on the wire are big-endian and unpadded.
//!
//! Exit request record, 64 bytes:
//!
//! ```text
//! | module_id (3) | operator_id (5) | validator_index (8) | pubkey (48) |
//! ```
//!
//! Extra-data chunk:
//!
//! ```text
//! | next_chunk_hash (32) | item | item | ...
//! item = | index (3) | type (2) | module_id (3) | n (8) | operator_ids (n * 8) | counts (n * 16) |
//! ```
//!
//! A zero `next_chunk_hash` marks the terminal chunk.

pub mod exit_request;
pub mod extra_data;
pub mod sorted;

pub use exit_request::{ExitRequestKey, ExitRequestRecord, EXIT_REQUEST_WIDTH, PUBKEY_LENGTH};
pub use extra_data::{
    decode_chunk, encode_chunk, ExtraDataChunk, ExtraDataItem, ExtraDataItemType, ExtraDataKey,
};
pub use sorted::{decode_sorted_list, encode_sorted_list, FixedRecord, SortedKeyTracker};

/// Cursor over a byte slice reading big-endian fields
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading at the beginning of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Whether every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `len` bytes, or `None` if fewer remain
    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.offset.checked_add(len)?;
        let slice = self.bytes.get(self.offset..end)?;
        self.offset = end;
        Some(slice)
    }

    /// Read a big-endian unsigned integer of `width` bytes (at most 16)
    pub fn read_uint(&mut self, width: usize) -> Option<u128> {
        debug_assert!(width <= 16);
        self.take(width).map(be_uint)
    }

    /// Read a big-endian unsigned integer of `width` bytes (at most 8)
    pub fn read_u64(&mut self, width: usize) -> Option<u64> {
        debug_assert!(width <= 8);
        self.take(width).map(|bytes| be_uint(bytes) as u64)
    }
}

/// Interpret `bytes` as a big-endian unsigned integer
pub fn be_uint(bytes: &[u8]) -> u128 {
    bytes
        .iter()
        .fold(0u128, |acc, byte| (acc << 8) | u128::from(*byte))
}

/// Append the low `width` bytes of `value` in big-endian order
pub fn put_uint(out: &mut Vec<u8>, value: u128, width: usize) {
    let bytes = value.to_be_bytes();
    out.extend_from_slice(&bytes[bytes.len() - width..]);
}
