//! # Oracle Core (Layer 1) - Foundation Types
//!
//! Shared vocabulary of the staking oracle subsystem.
//!
//! ## Architecture
//!
//! - **errors**: unified `OracleError` with failure categories
//! - **hash**: `Hash32` and the single hashing algorithm
//! - **identifiers**: slots, epochs, module/operator ids, member ids
//! - **events**: domain events published by committed steps
//! - **effects**: collaborator interfaces (registry, accounting, withdrawals,
//!   capability checks, clock)
//! - **config**: configuration loading contract and report limits

pub mod config;
pub mod effects;
pub mod errors;
pub mod events;
pub mod hash;
pub mod identifiers;

pub use config::{check_limit, OracleConfigFile, ReportLimits};
pub use errors::{ErrorCategory, OracleError, Result};
pub use events::{OracleEvent, OracleKind};
pub use hash::Hash32;
pub use identifiers::{
    Epoch, MemberId, ModuleId, OperatorId, Slot, Timestamp, ValidatorIndex,
};
