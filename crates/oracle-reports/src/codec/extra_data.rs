//! Extra-data chunk codec
//!
//! A chunk is a forward pointer followed by one or more variable-width
//! items. Every operator inside an item contributes one key
//! `(item_type, module_id, operator_id)` to a single ascending sequence that
//! spans items and chunks, so operators are ascending within an item and
//! items are ascending by type, then module, then first operator.

use super::sorted::SortedKeyTracker;
use super::{put_uint, ByteReader};
use oracle_core::identifiers::wire;
use oracle_core::{check_limit, Hash32, ModuleId, OperatorId, OracleError, ReportLimits, Result};
use serde::{Deserialize, Serialize};

const NEXT_HASH_WIDTH: usize = 32;
const ITEM_INDEX_WIDTH: usize = 3;
const ITEM_TYPE_WIDTH: usize = 2;
const MODULE_ID_WIDTH: usize = 3;
const OPERATOR_COUNT_WIDTH: usize = 8;
const OPERATOR_ID_WIDTH: usize = 8;
const COUNT_WIDTH: usize = 16;

/// Kind of per-operator count carried by an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum ExtraDataItemType {
    /// Stuck validators per operator
    StuckValidators = 1,
    /// Exited validators per operator
    ExitedValidators = 2,
}

impl ExtraDataItemType {
    /// Parse the wire value of item `index`
    pub fn from_wire(raw: u16, index: u64) -> Result<Self> {
        match raw {
            1 => Ok(Self::StuckValidators),
            2 => Ok(Self::ExitedValidators),
            other => Err(OracleError::UnsupportedItemType {
                index,
                item_type: other,
            }),
        }
    }

    /// Wire value
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Sort key of one operator entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExtraDataKey {
    /// Item type, most significant
    pub item_type: ExtraDataItemType,
    /// Staking module
    pub module_id: ModuleId,
    /// Node operator, least significant
    pub operator_id: OperatorId,
}

/// One decoded item: counts for several operators of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraDataItem {
    /// Position in the report's item sequence
    pub index: u64,
    /// What the counts mean
    pub item_type: ExtraDataItemType,
    /// Module the operators belong to
    pub module_id: ModuleId,
    /// Strictly ascending
    pub operator_ids: Vec<OperatorId>,
    /// One count per operator
    pub counts: Vec<u128>,
}

impl ExtraDataItem {
    /// Append the encoding of this item
    pub fn encode(&self, out: &mut Vec<u8>) {
        put_uint(out, u128::from(self.index), ITEM_INDEX_WIDTH);
        put_uint(out, u128::from(self.item_type.as_u16()), ITEM_TYPE_WIDTH);
        put_uint(out, u128::from(self.module_id.get()), MODULE_ID_WIDTH);
        put_uint(out, self.operator_ids.len() as u128, OPERATOR_COUNT_WIDTH);
        for operator_id in &self.operator_ids {
            put_uint(out, u128::from(operator_id.get()), OPERATOR_ID_WIDTH);
        }
        for count in &self.counts {
            put_uint(out, *count, COUNT_WIDTH);
        }
    }
}

/// A decoded chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraDataChunk {
    /// Hash the next chunk must have; zero on the terminal chunk
    pub next_hash: Hash32,
    /// Items in wire order
    pub items: Vec<ExtraDataItem>,
}

/// Encode a chunk from its pointer and items
pub fn encode_chunk(next_hash: Hash32, items: &[ExtraDataItem]) -> Vec<u8> {
    let mut out = next_hash.as_bytes().to_vec();
    for item in items {
        item.encode(&mut out);
    }
    out
}

/// Decode one chunk whose first item must carry index `first_index`.
///
/// `tracker` carries the last key of the previous chunk and is advanced past
/// every operator of this one.
pub fn decode_chunk(
    bytes: &[u8],
    first_index: u64,
    tracker: &mut SortedKeyTracker<ExtraDataKey>,
    limits: &ReportLimits,
) -> Result<ExtraDataChunk> {
    let next_hash = Hash32::from_prefix(bytes).ok_or(OracleError::LengthMismatch {
        length: bytes.len(),
        width: NEXT_HASH_WIDTH,
    })?;
    let mut reader = ByteReader::new(&bytes[NEXT_HASH_WIDTH..]);
    if reader.is_empty() {
        return Err(OracleError::invalid_record(first_index, "chunk carries no items"));
    }

    let mut items = Vec::new();
    let mut expected_index = first_index;
    while !reader.is_empty() {
        check_limit(limits.max_items_per_extra_data_chunk, items.len() as u64 + 1)?;
        items.push(decode_item(&mut reader, expected_index, tracker, limits)?);
        expected_index = expected_index
            .checked_add(1)
            .ok_or_else(|| OracleError::overflow("extra data item index"))?;
    }
    Ok(ExtraDataChunk { next_hash, items })
}

fn decode_item(
    reader: &mut ByteReader<'_>,
    expected_index: u64,
    tracker: &mut SortedKeyTracker<ExtraDataKey>,
    limits: &ReportLimits,
) -> Result<ExtraDataItem> {
    let truncated = |what: &str| OracleError::invalid_record(expected_index, format!("truncated {what}"));

    let index = reader
        .read_u64(ITEM_INDEX_WIDTH)
        .ok_or_else(|| truncated("item header"))?;
    if index != expected_index {
        return Err(OracleError::UnexpectedItemIndex {
            expected: expected_index,
            actual: index,
        });
    }
    let raw_type = reader
        .read_u64(ITEM_TYPE_WIDTH)
        .ok_or_else(|| truncated("item header"))? as u16;
    let item_type = ExtraDataItemType::from_wire(raw_type, index)?;

    let module_id = wire::module_id(
        reader
            .read_u64(MODULE_ID_WIDTH)
            .ok_or_else(|| truncated("module id"))? as u32,
    );
    if module_id.is_zero() {
        return Err(OracleError::invalid_record(index, "module id is zero"));
    }

    let operator_count = reader
        .read_u64(OPERATOR_COUNT_WIDTH)
        .ok_or_else(|| truncated("operator count"))?;
    if operator_count == 0 {
        return Err(OracleError::invalid_record(index, "item has no operators"));
    }
    check_limit(limits.max_operators_per_extra_data_item, operator_count)?;
    // bounded by the limit above, so the cast and products stay small
    let operators = operator_count as usize;
    let body_len = operators
        .checked_mul(OPERATOR_ID_WIDTH + COUNT_WIDTH)
        .ok_or_else(|| OracleError::overflow("extra data item body"))?;
    if reader.remaining() < body_len {
        return Err(truncated("item body"));
    }

    let mut operator_ids = Vec::with_capacity(operators);
    for _ in 0..operators {
        let raw = reader
            .read_u64(OPERATOR_ID_WIDTH)
            .ok_or_else(|| truncated("operator ids"))?;
        let operator_id = OperatorId::new(raw)
            .map_err(|_| OracleError::invalid_record(index, format!("operator id {raw} too wide")))?;
        tracker.admit(
            ExtraDataKey {
                item_type,
                module_id,
                operator_id,
            },
            index,
        )?;
        operator_ids.push(operator_id);
    }
    let mut counts = Vec::with_capacity(operators);
    for _ in 0..operators {
        counts.push(
            reader
                .read_uint(COUNT_WIDTH)
                .ok_or_else(|| truncated("counts"))?,
        );
    }

    Ok(ExtraDataItem {
        index,
        item_type,
        module_id,
        operator_ids,
        counts,
    })
}
