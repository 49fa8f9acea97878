//! Exit request records

use super::sorted::FixedRecord;
use super::{put_uint, ByteReader};
use oracle_core::identifiers::wire;
use oracle_core::{ModuleId, OperatorId, OracleError, Result, ValidatorIndex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of one encoded exit request
pub const EXIT_REQUEST_WIDTH: usize = 64;

/// Length of a validator public key
pub const PUBKEY_LENGTH: usize = 48;

const MODULE_ID_WIDTH: usize = 3;
const OPERATOR_ID_WIDTH: usize = 5;
const VALIDATOR_INDEX_WIDTH: usize = 8;

/// Sort key of an exit request: module, then operator, then validator index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExitRequestKey {
    /// Staking module of the validator
    pub module_id: ModuleId,
    /// Node operator within the module
    pub operator_id: OperatorId,
    /// Global validator index
    pub validator_index: ValidatorIndex,
}

/// A request to exit one validator
#[derive(Clone, PartialEq, Eq)]
pub struct ExitRequestRecord {
    /// Which validator
    pub key: ExitRequestKey,
    /// Its BLS public key
    pub pubkey: [u8; PUBKEY_LENGTH],
}

impl ExitRequestRecord {
    /// Public key as lowercase hex with `0x` prefix
    pub fn pubkey_hex(&self) -> String {
        format!("0x{}", hex::encode(self.pubkey))
    }
}

impl fmt::Debug for ExitRequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitRequestRecord")
            .field("key", &self.key)
            .field("pubkey", &self.pubkey_hex())
            .finish()
    }
}

impl FixedRecord for ExitRequestRecord {
    const WIDTH: usize = EXIT_REQUEST_WIDTH;
    type Key = ExitRequestKey;

    fn key(&self) -> ExitRequestKey {
        self.key
    }

    fn decode(bytes: &[u8], position: u64) -> Result<Self> {
        let truncated = || OracleError::LengthMismatch {
            length: bytes.len(),
            width: EXIT_REQUEST_WIDTH,
        };
        let mut reader = ByteReader::new(bytes);
        let module_id = wire::module_id(reader.read_u64(MODULE_ID_WIDTH).ok_or_else(truncated)? as u32);
        let operator_id = wire::operator_id(reader.read_u64(OPERATOR_ID_WIDTH).ok_or_else(truncated)?);
        let validator_index = reader
            .read_u64(VALIDATOR_INDEX_WIDTH)
            .ok_or_else(truncated)?;
        let pubkey: [u8; PUBKEY_LENGTH] = reader
            .take(PUBKEY_LENGTH)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(truncated)?;

        if module_id.is_zero() {
            return Err(OracleError::invalid_record(position, "module id is zero"));
        }
        Ok(Self {
            key: ExitRequestKey {
                module_id,
                operator_id,
                validator_index,
            },
            pubkey,
        })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        put_uint(out, u128::from(self.key.module_id.get()), MODULE_ID_WIDTH);
        put_uint(out, u128::from(self.key.operator_id.get()), OPERATOR_ID_WIDTH);
        put_uint(out, u128::from(self.key.validator_index), VALIDATOR_INDEX_WIDTH);
        out.extend_from_slice(&self.pubkey);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::sorted::decode_sorted_list;

    fn record(module: u32, operator: u64, index: u64) -> ExitRequestRecord {
        ExitRequestRecord {
            key: ExitRequestKey {
                module_id: ModuleId::new(module).unwrap(),
                operator_id: OperatorId::new(operator).unwrap(),
                validator_index: index,
            },
            pubkey: [index as u8; PUBKEY_LENGTH],
        }
    }

    #[test]
    fn test_layout() {
        let mut out = Vec::new();
        record(0x010203, 0x0405060708, 0x1122).encode(&mut out);
        assert_eq!(out.len(), EXIT_REQUEST_WIDTH);
        assert_eq!(&out[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&out[8..16], &[0, 0, 0, 0, 0, 0, 0x11, 0x22]);
        assert_eq!(out[16], 0x22);
    }

    #[test]
    fn test_key_significance() {
        // a larger operator outranks a larger validator index
        assert!(record(1, 1, 0).key > record(1, 0, 99).key);
        assert!(record(2, 0, 0).key > record(1, 9, 99).key);
    }

    #[test]
    fn test_zero_module_rejected() {
        let mut out = Vec::new();
        record(1, 0, 0).encode(&mut out);
        out[..3].copy_from_slice(&[0, 0, 0]);
        assert_eq!(
            ExitRequestRecord::decode(&out, 4),
            Err(OracleError::invalid_record(4, "module id is zero"))
        );
    }

    #[test]
    fn test_list_decodes() {
        let mut buf = Vec::new();
        for r in [record(1, 0, 0), record(1, 0, 2), record(2, 0, 1)] {
            r.encode(&mut buf);
        }
        let records: Vec<ExitRequestRecord> = decode_sorted_list(&buf, 3).unwrap();
        assert_eq!(records[2], record(2, 0, 1));
    }
}
