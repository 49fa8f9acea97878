//! Report payloads and their content digests
//!
//! A consensus digest commits to the whole payload struct: SHA-256 over a
//! per-oracle domain tag followed by the bincode encoding of the report.
//! Processors recompute it from the submitted data and compare against the
//! stored consensus report before decoding anything.

use oracle_consensus::{Caller, ReportStore};
use oracle_core::{Hash32, OracleError, Result, Slot};
use serde::{Deserialize, Serialize};

/// Data formats of an exit request report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFormat {
    /// Concatenated 64-byte exit request records
    List = 1,
}

impl TryFrom<u32> for DataFormat {
    type Error = OracleError;

    fn try_from(format: u32) -> Result<Self> {
        match format {
            1 => Ok(Self::List),
            other => Err(OracleError::UnsupportedFormat { format: other }),
        }
    }
}

/// Formats of the accounting report's extra data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraDataFormat {
    /// No extra data; a single completion call finishes the frame
    Empty = 0,
    /// Hash-linked chunks of items
    List = 1,
}

impl ExtraDataFormat {
    /// Wire value
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for ExtraDataFormat {
    type Error = OracleError;

    fn try_from(format: u32) -> Result<Self> {
        match format {
            0 => Ok(Self::Empty),
            1 => Ok(Self::List),
            other => Err(OracleError::UnsupportedFormat { format: other }),
        }
    }
}

/// A report whose digest is agreed on by consensus
pub trait ReportPayload: Serialize {
    /// Domain separation tag mixed into the digest
    const DOMAIN: &'static [u8];

    /// Consensus version the report was produced for
    fn consensus_version(&self) -> u64;

    /// Reference slot the report describes
    fn ref_slot(&self) -> Slot;

    /// Content digest of the report
    fn digest(&self) -> Result<Hash32> {
        let encoded = bincode::serialize(self).map_err(|e| OracleError::serialization(e.to_string()))?;
        Ok(Hash32::of_parts(&[Self::DOMAIN, encoded.as_slice()]))
    }

    /// Check the report against the stored consensus digest and return its
    /// content digest
    fn admit(&self, store: &ReportStore, caller: Caller<'_>) -> Result<Hash32> {
        let digest = self.digest()?;
        store.check_data_admission(caller, self.consensus_version(), self.ref_slot(), digest)?;
        Ok(digest)
    }
}

/// Validator exit requests for one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRequestsReport {
    /// Version the report was produced for
    pub consensus_version: u64,
    /// Slot the report describes
    pub ref_slot: Slot,
    /// Number of records in `data`
    pub requests_count: u64,
    /// See [`DataFormat`]
    pub data_format: u32,
    /// Encoded exit request records
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl ReportPayload for ExitRequestsReport {
    const DOMAIN: &'static [u8] = b"oracle/exit-requests/v1";

    fn consensus_version(&self) -> u64 {
        self.consensus_version
    }

    fn ref_slot(&self) -> Slot {
        self.ref_slot
    }
}

/// Main accounting report for one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingReport {
    /// Version the report was produced for
    pub consensus_version: u64,
    /// Slot the report describes
    pub ref_slot: Slot,
    /// Protocol validators seen on the consensus layer
    pub num_validators: u64,
    /// Their combined balance in gwei
    pub cl_balance_gwei: u64,
    /// Modules whose exited validator total changed, strictly ascending
    pub module_ids_with_newly_exited: Vec<u32>,
    /// New exited totals, one per module above
    pub num_exited_by_module: Vec<u64>,
    /// Withdrawal vault balance in wei
    pub withdrawal_vault_balance: u128,
    /// Execution-layer rewards vault balance in wei
    pub el_rewards_vault_balance: u128,
    /// Shares queued for burning
    pub shares_requested_to_burn: u128,
    /// Last withdrawal request id of each batch to finalize, strictly ascending
    pub withdrawal_finalization_batches: Vec<u64>,
    /// Protocol is in bunker mode
    pub is_bunker_mode: bool,
    /// See [`ExtraDataFormat`]
    pub extra_data_format: u32,
    /// Hash of the first extra-data chunk; zero for the empty format
    pub extra_data_hash: Hash32,
    /// Items across all chunks
    pub extra_data_items_count: u64,
}

impl ReportPayload for AccountingReport {
    const DOMAIN: &'static [u8] = b"oracle/accounting/v1";

    fn consensus_version(&self) -> u64 {
        self.consensus_version
    }

    fn ref_slot(&self) -> Slot {
        self.ref_slot
    }
}

/// Hex strings for human-readable formats, raw bytes otherwise
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
        } else {
            serializer.serialize_bytes(bytes)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            hex::decode(text.strip_prefix("0x").unwrap_or(&text)).map_err(serde::de::Error::custom)
        } else {
            Vec::<u8>::deserialize(deserializer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exit_report() -> ExitRequestsReport {
        ExitRequestsReport {
            consensus_version: 1,
            ref_slot: 319,
            requests_count: 0,
            data_format: 1,
            data: Vec::new(),
        }
    }

    #[test]
    fn test_digest_covers_every_field() {
        let base = exit_report().digest().unwrap();
        let mut changed = exit_report();
        changed.requests_count = 1;
        assert_ne!(changed.digest().unwrap(), base);
        let mut changed = exit_report();
        changed.data_format = 2;
        assert_ne!(changed.digest().unwrap(), base);
        assert_eq!(exit_report().digest().unwrap(), base);
    }

    #[test]
    fn test_admit_reads_version_and_slot_from_payload() {
        use oracle_consensus::{ChainParams, FrameClock, FrameConfig};
        use oracle_core::effects::{Capability, StaticCapabilities};
        use oracle_core::{MemberId, OracleKind};

        let genesis = 1_000_000;
        let clock = FrameClock::new(
            ChainParams::new(32, 12, genesis).unwrap(),
            FrameConfig::new(10, 2).unwrap(),
        );
        let mut store = ReportStore::new(OracleKind::ExitBus, clock, 1, 0);
        store.reporter = Some("member".into());
        let caps = StaticCapabilities::new().grant_all(
            "member",
            [Capability::SubmitConsensusReport, Capability::SubmitData],
        );
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let report = exit_report();
        let digest = report.digest().unwrap();
        store
            .submit_report(caller, 319, digest, genesis + 10 * 384, &mut Vec::new())
            .unwrap();

        assert_eq!(report.admit(&store, caller), Ok(digest));
        let mut other_version = exit_report();
        other_version.consensus_version = 2;
        assert_eq!(
            other_version.admit(&store, caller),
            Err(OracleError::UnexpectedConsensusVersion {
                expected: 1,
                actual: 2
            })
        );
        let mut other_slot = exit_report();
        other_slot.ref_slot = 318;
        assert_eq!(
            other_slot.admit(&store, caller),
            Err(OracleError::UnexpectedRefSlot {
                expected: 319,
                actual: 318
            })
        );
    }

    #[test]
    fn test_domains_differ() {
        assert_ne!(ExitRequestsReport::DOMAIN, AccountingReport::DOMAIN);
    }

    #[test]
    fn test_formats() {
        assert_eq!(DataFormat::try_from(1), Ok(DataFormat::List));
        assert_eq!(
            DataFormat::try_from(0),
            Err(OracleError::UnsupportedFormat { format: 0 })
        );
        assert_eq!(ExtraDataFormat::try_from(0), Ok(ExtraDataFormat::Empty));
        assert_eq!(
            ExtraDataFormat::try_from(2),
            Err(OracleError::UnsupportedFormat { format: 2 })
        );
    }

    #[test]
    fn test_json_data_is_hex() {
        let mut report = exit_report();
        report.data = vec![0xab, 0x01];
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["data"], "0xab01");
        let back: ExitRequestsReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
