//! Sorted-List Codec
//!
//! Records are decoded in a single pass. Each record exposes a composite key
//! whose derived `Ord` follows field order, and every key must be strictly
//! greater than the previous one. One comparison rejects duplicates and
//! descending pairs alike.
//!
//! [`SortedKeyTracker`] holds the only state of that pass, so a decode can
//! stop after one buffer and resume on the next from the persisted key.

use oracle_core::{OracleError, Result};
use serde::{Deserialize, Serialize};

/// Last accepted key of an ascending sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedKeyTracker<K> {
    last: Option<K>,
}

impl<K> Default for SortedKeyTracker<K> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<K: Ord + Copy> SortedKeyTracker<K> {
    /// Tracker for a fresh sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue a sequence whose last accepted key was `last`
    pub fn resume(last: Option<K>) -> Self {
        Self { last }
    }

    /// Last accepted key
    pub fn last(&self) -> Option<K> {
        self.last
    }

    /// Accept `key` at `position` if it is strictly greater than the last one
    pub fn admit(&mut self, key: K, position: u64) -> Result<()> {
        if self.last.is_some_and(|last| key <= last) {
            return Err(OracleError::OutOfOrder { position });
        }
        self.last = Some(key);
        Ok(())
    }
}

/// A record of fixed width with a composite sort key
pub trait FixedRecord: Sized {
    /// Encoded width in bytes
    const WIDTH: usize;

    /// Composite key, most significant field first
    type Key: Ord + Copy;

    /// Sort key of this record
    fn key(&self) -> Self::Key;

    /// Decode one record from exactly `WIDTH` bytes
    fn decode(bytes: &[u8], position: u64) -> Result<Self>;

    /// Append the encoding of this record
    fn encode(&self, out: &mut Vec<u8>);
}

/// Decode a flat buffer of `R` records in strictly ascending key order.
///
/// Checks, in order: the buffer length is a multiple of the record width,
/// the record count equals `declared_count`, then each record decodes and
/// exceeds its predecessor.
pub fn decode_sorted_list<R: FixedRecord>(buf: &[u8], declared_count: u64) -> Result<Vec<R>> {
    if buf.len() % R::WIDTH != 0 {
        return Err(OracleError::LengthMismatch {
            length: buf.len(),
            width: R::WIDTH,
        });
    }
    let actual = (buf.len() / R::WIDTH) as u64;
    if actual != declared_count {
        return Err(OracleError::CountMismatch {
            declared: declared_count,
            actual,
        });
    }

    let mut tracker = SortedKeyTracker::new();
    buf.chunks_exact(R::WIDTH)
        .zip(0u64..)
        .map(|(bytes, position)| {
            let record = R::decode(bytes, position)?;
            tracker.admit(record.key(), position)?;
            Ok(record)
        })
        .collect()
}

/// Concatenate the encodings of `records` without checking their order
pub fn encode_sorted_list<R: FixedRecord>(records: &[R]) -> Vec<u8> {
    let mut out = Vec::with_capacity(records.len() * R::WIDTH);
    for record in records {
        record.encode(&mut out);
    }
    out
}
