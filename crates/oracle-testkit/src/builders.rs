//! Payload builders
//!
//! Builders encode records in the order they are given, so tests can build
//! misordered or miscounted payloads as easily as valid ones.

use oracle_core::{Hash32, ModuleId, OperatorId, Slot};
use oracle_reports::codec::{
    encode_chunk, encode_sorted_list, ExitRequestKey, ExitRequestRecord, ExtraDataItem,
    ExtraDataItemType, PUBKEY_LENGTH,
};
use oracle_reports::{AccountingReport, ExitRequestsReport, ExtraDataFormat};

/// Deterministic public key for a validator index
pub fn test_pubkey(validator_index: u64) -> [u8; PUBKEY_LENGTH] {
    let mut pubkey = [0u8; PUBKEY_LENGTH];
    pubkey[..8].copy_from_slice(&validator_index.to_be_bytes());
    pubkey[PUBKEY_LENGTH - 1] = 0xa5;
    pubkey
}

/// Exit request record for `(module, operator, validator_index)`
pub fn exit_record(module: u32, operator: u64, validator_index: u64) -> ExitRequestRecord {
    ExitRequestRecord {
        key: ExitRequestKey {
            module_id: ModuleId::new(module).unwrap(),
            operator_id: OperatorId::new(operator).unwrap(),
            validator_index,
        },
        pubkey: test_pubkey(validator_index),
    }
}

/// Builder for [`ExitRequestsReport`]
#[derive(Debug, Clone)]
pub struct ExitReportBuilder {
    ref_slot: Slot,
    consensus_version: u64,
    data_format: u32,
    records: Vec<ExitRequestRecord>,
    declared_count: Option<u64>,
    raw_data: Option<Vec<u8>>,
}

impl ExitReportBuilder {
    /// Empty list-format report for `ref_slot`
    pub fn new(ref_slot: Slot) -> Self {
        Self {
            ref_slot,
            consensus_version: 1,
            data_format: 1,
            records: Vec::new(),
            declared_count: None,
            raw_data: None,
        }
    }

    /// Append one request
    pub fn request(mut self, module: u32, operator: u64, validator_index: u64) -> Self {
        self.records.push(exit_record(module, operator, validator_index));
        self
    }

    /// Append several requests in the given order
    pub fn requests(mut self, keys: &[(u32, u64, u64)]) -> Self {
        for (module, operator, index) in keys {
            self.records.push(exit_record(*module, *operator, *index));
        }
        self
    }

    /// Override the consensus version
    pub fn consensus_version(mut self, version: u64) -> Self {
        self.consensus_version = version;
        self
    }

    /// Override the data format
    pub fn data_format(mut self, format: u32) -> Self {
        self.data_format = format;
        self
    }

    /// Declare a count other than the number of records
    pub fn declared_count(mut self, count: u64) -> Self {
        self.declared_count = Some(count);
        self
    }

    /// Replace the encoded records with arbitrary bytes
    pub fn raw_data(mut self, data: Vec<u8>) -> Self {
        self.raw_data = Some(data);
        self
    }

    /// Finish the report
    pub fn build(self) -> ExitRequestsReport {
        ExitRequestsReport {
            consensus_version: self.consensus_version,
            ref_slot: self.ref_slot,
            requests_count: self.declared_count.unwrap_or(self.records.len() as u64),
            data_format: self.data_format,
            data: self
                .raw_data
                .unwrap_or_else(|| encode_sorted_list(&self.records)),
        }
    }
}

/// Encoded extra data: chunks in submission order plus the declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraData {
    /// Encoded chunks, first to submit first
    pub chunks: Vec<Vec<u8>>,
    /// Hash of the first chunk, declared in the main report
    pub first_hash: Hash32,
    /// Item total, declared in the main report
    pub items_count: u64,
}

/// Builder for hash-linked extra-data chunks
#[derive(Debug, Clone)]
pub struct ExtraDataBuilder {
    items: Vec<ExtraDataItem>,
    items_per_chunk: usize,
}

impl Default for ExtraDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtraDataBuilder {
    /// No items, one item per chunk
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            items_per_chunk: 1,
        }
    }

    /// Items packed into each chunk
    pub fn items_per_chunk(mut self, count: usize) -> Self {
        self.items_per_chunk = count.max(1);
        self
    }

    fn push(mut self, item_type: ExtraDataItemType, module: u32, counts: &[(u64, u128)]) -> Self {
        let index = self.items.len() as u64;
        self.items.push(ExtraDataItem {
            index,
            item_type,
            module_id: ModuleId::new(module).unwrap(),
            operator_ids: counts
                .iter()
                .map(|(op, _)| OperatorId::new(*op).unwrap())
                .collect(),
            counts: counts.iter().map(|(_, count)| *count).collect(),
        });
        self
    }

    /// Append a stuck-validators item
    pub fn stuck(self, module: u32, counts: &[(u64, u128)]) -> Self {
        self.push(ExtraDataItemType::StuckValidators, module, counts)
    }

    /// Append an exited-validators item
    pub fn exited(self, module: u32, counts: &[(u64, u128)]) -> Self {
        self.push(ExtraDataItemType::ExitedValidators, module, counts)
    }

    /// Items added so far
    pub fn items(&self) -> &[ExtraDataItem] {
        &self.items
    }

    /// Encode the chunks back to front so each carries its successor's hash
    pub fn build(self) -> ExtraData {
        let groups: Vec<&[ExtraDataItem]> = self.items.chunks(self.items_per_chunk).collect();
        let mut chunks = Vec::with_capacity(groups.len());
        let mut next_hash = Hash32::ZERO;
        for group in groups.iter().rev() {
            let chunk = encode_chunk(next_hash, group);
            next_hash = Hash32::of(&chunk);
            chunks.push(chunk);
        }
        chunks.reverse();
        ExtraData {
            first_hash: next_hash,
            items_count: self.items.len() as u64,
            chunks,
        }
    }
}

/// Builder for [`AccountingReport`]
#[derive(Debug, Clone)]
pub struct AccountingReportBuilder {
    report: AccountingReport,
}

impl AccountingReportBuilder {
    /// Report for `ref_slot` with empty extra data and no exited modules
    pub fn new(ref_slot: Slot) -> Self {
        Self {
            report: AccountingReport {
                consensus_version: 1,
                ref_slot,
                num_validators: 100,
                cl_balance_gwei: 3_200_000_000_000,
                module_ids_with_newly_exited: Vec::new(),
                num_exited_by_module: Vec::new(),
                withdrawal_vault_balance: 1_000_000_000_000_000_000,
                el_rewards_vault_balance: 500_000_000_000_000_000,
                shares_requested_to_burn: 0,
                withdrawal_finalization_batches: Vec::new(),
                is_bunker_mode: false,
                extra_data_format: ExtraDataFormat::Empty.as_u32(),
                extra_data_hash: Hash32::ZERO,
                extra_data_items_count: 0,
            },
        }
    }

    /// Exited totals per module, in the given order
    pub fn exited_by_module(mut self, entries: &[(u32, u64)]) -> Self {
        self.report.module_ids_with_newly_exited = entries.iter().map(|(m, _)| *m).collect();
        self.report.num_exited_by_module = entries.iter().map(|(_, c)| *c).collect();
        self
    }

    /// Declare list-format extra data
    pub fn extra_data(mut self, extra: &ExtraData) -> Self {
        self.report.extra_data_format = ExtraDataFormat::List.as_u32();
        self.report.extra_data_hash = extra.first_hash;
        self.report.extra_data_items_count = extra.items_count;
        self
    }

    /// Override the extra-data declaration field by field
    pub fn extra_data_declaration(mut self, format: u32, hash: Hash32, items_count: u64) -> Self {
        self.report.extra_data_format = format;
        self.report.extra_data_hash = hash;
        self.report.extra_data_items_count = items_count;
        self
    }

    /// Finalization batches, in the given order
    pub fn finalization_batches(mut self, batches: &[u64]) -> Self {
        self.report.withdrawal_finalization_batches = batches.to_vec();
        self
    }

    /// Set the bunker mode flag
    pub fn bunker_mode(mut self, on: bool) -> Self {
        self.report.is_bunker_mode = on;
        self
    }

    /// Override the consensus version
    pub fn consensus_version(mut self, version: u64) -> Self {
        self.report.consensus_version = version;
        self
    }

    /// Finish the report
    pub fn build(self) -> AccountingReport {
        self.report
    }
}
