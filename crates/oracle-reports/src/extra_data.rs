//! Extra-Data Chunk Processor state
//!
//! The accounting main report declares the extra data (format, hash of the
//! first chunk, total item count). [`ExtraDataProcessingState`] is the cursor
//! that carries the sequence across calls: which hash the next chunk must
//! have, how many items are done and the last sort key.
//!
//! Verification is lazy. A chunk is authenticated by its own hash matching
//! the pointer stored from the previous call, and the pointer it carries is
//! trusted until the following chunk arrives. No call hashes the remainder of
//! the chain.

use crate::codec::{decode_chunk, ExtraDataItem, ExtraDataKey, SortedKeyTracker};
use crate::report_data::ExtraDataFormat;
use oracle_core::{Hash32, OracleError, ReportLimits, Result, Slot};
use serde::{Deserialize, Serialize};

/// Resumable cursor over the extra data of one accounting report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraDataProcessingState {
    /// Reference slot of the main report that declared the extra data
    pub reference_slot: Slot,
    /// Format the main report declared
    pub declared_format: ExtraDataFormat,
    /// Item total the main report declared
    pub total_items: u64,
    /// Items applied so far
    pub items_processed: u64,
    /// Hash the next chunk must have
    pub next_chunk_hash: Hash32,
    /// Last operator key accepted, for ordering across chunks
    pub last_sorting_key: Option<ExtraDataKey>,
    /// The sequence is complete
    pub submitted: bool,
}

/// Outcome of validating one list chunk against the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedChunk {
    /// Cursor after the chunk is applied
    pub cursor: ExtraDataProcessingState,
    /// Items to forward, in order
    pub items: Vec<ExtraDataItem>,
    /// Whether this was the terminal chunk
    pub terminal: bool,
}

impl ExtraDataProcessingState {
    /// Cursor for freshly declared extra data
    pub fn arm(
        reference_slot: Slot,
        declared_format: ExtraDataFormat,
        first_chunk_hash: Hash32,
        total_items: u64,
    ) -> Self {
        Self {
            reference_slot,
            declared_format,
            total_items,
            items_processed: 0,
            next_chunk_hash: first_chunk_hash,
            last_sorting_key: None,
            submitted: false,
        }
    }

    /// Whether a submission in `format` may proceed
    pub fn check_submittable(&self, format: ExtraDataFormat) -> Result<()> {
        if self.declared_format != format {
            return Err(OracleError::UnexpectedExtraDataFormat {
                expected: self.declared_format.as_u32(),
                actual: format.as_u32(),
            });
        }
        if self.submitted {
            return Err(OracleError::ExtraDataAlreadyProcessed);
        }
        Ok(())
    }

    /// Cursor after the empty-format completion call
    pub fn complete_empty(&self) -> Result<Self> {
        self.check_submittable(ExtraDataFormat::Empty)?;
        Ok(Self {
            submitted: true,
            ..self.clone()
        })
    }

    /// Authenticate and decode `chunk` without touching the cursor.
    ///
    /// Reaching the declared total must coincide with the terminal pointer:
    /// a terminal chunk must end exactly at the total and a non-terminal one
    /// must end strictly before it.
    pub fn prepare_list_chunk(&self, chunk: &[u8], limits: &ReportLimits) -> Result<PreparedChunk> {
        self.check_submittable(ExtraDataFormat::List)?;

        let actual = Hash32::of(chunk);
        if actual != self.next_chunk_hash {
            return Err(OracleError::UnexpectedChunkHash {
                expected: self.next_chunk_hash.to_string(),
                actual: actual.to_string(),
            });
        }

        let mut tracker = SortedKeyTracker::resume(self.last_sorting_key);
        let decoded = decode_chunk(chunk, self.items_processed, &mut tracker, limits)?;
        let items_processed = self
            .items_processed
            .checked_add(decoded.items.len() as u64)
            .ok_or_else(|| OracleError::overflow("extra data items processed"))?;
        let terminal = decoded.next_hash.is_zero();
        let count_ok = if terminal {
            items_processed == self.total_items
        } else {
            items_processed < self.total_items
        };
        if !count_ok {
            return Err(OracleError::ItemCountMismatch {
                declared: self.total_items,
                processed: items_processed,
            });
        }

        Ok(PreparedChunk {
            cursor: Self {
                items_processed,
                next_chunk_hash: decoded.next_hash,
                last_sorting_key: tracker.last(),
                submitted: terminal,
                ..self.clone()
            },
            items: decoded.items,
            terminal,
        })
    }
}
