//! Identifier types used across the oracle subsystem
//!
//! Module and operator identifiers are bounded by their wire widths (3 and 5
//! bytes). Constructors reject values that could never appear in a report.

use crate::{OracleError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Beacon chain slot number
pub type Slot = u64;

/// Beacon chain epoch number
pub type Epoch = u64;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Global validator index on the beacon chain
pub type ValidatorIndex = u64;

/// Staking module identifier (24 bits on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(u32);

impl ModuleId {
    /// Largest value representable in a report
    pub const MAX: u32 = (1 << 24) - 1;

    /// Create a module id, rejecting values wider than 24 bits
    pub fn new(value: u32) -> Result<Self> {
        if value > Self::MAX {
            return Err(OracleError::out_of_bounds("module_id", u64::from(value)));
        }
        Ok(Self(value))
    }

    /// Raw value
    pub fn get(self) -> u32 {
        self.0
    }

    /// Module id zero never names a real module
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub(crate) const fn from_raw(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module-{}", self.0)
    }
}

/// Node operator identifier within a staking module (40 bits on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(u64);

impl OperatorId {
    /// Largest value representable in an exit request record
    pub const MAX: u64 = (1 << 40) - 1;

    /// Create an operator id, rejecting values wider than 40 bits
    pub fn new(value: u64) -> Result<Self> {
        if value > Self::MAX {
            return Err(OracleError::out_of_bounds("operator_id", value));
        }
        Ok(Self(value))
    }

    /// Raw value
    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operator-{}", self.0)
    }
}

/// Identity of a caller (oracle member, admin, data submitter)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Create a member id from any string label
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Borrow the label
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Constructors for values decoded from fixed-width wire fields.
///
/// The decoder reads exactly 3 / 5 bytes, so the bound holds by construction.
pub mod wire {
    use super::{ModuleId, OperatorId};

    /// Module id read from a 3-byte field
    pub fn module_id(raw: u32) -> ModuleId {
        ModuleId::from_raw(raw & ModuleId::MAX)
    }

    /// Operator id read from a 5-byte field
    pub fn operator_id(raw: u64) -> OperatorId {
        OperatorId::from_raw(raw & OperatorId::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_id_bounds() {
        assert!(ModuleId::new(ModuleId::MAX).is_ok());
        assert_eq!(
            ModuleId::new(ModuleId::MAX + 1),
            Err(OracleError::out_of_bounds("module_id", u64::from(ModuleId::MAX + 1)))
        );
        assert!(ModuleId::new(0).unwrap().is_zero());
    }

    #[test]
    fn test_operator_id_bounds() {
        assert!(OperatorId::new(OperatorId::MAX).is_ok());
        assert!(OperatorId::new(OperatorId::MAX + 1).is_err());
    }

    #[test]
    fn test_ordering_follows_value() {
        let a = ModuleId::new(1).unwrap();
        let b = ModuleId::new(2).unwrap();
        assert!(a < b);
        assert_eq!(a.to_string(), "module-1");
    }
}
