//! Accounting engine interface

use super::CollaboratorResult;
use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// Values of an accepted accounting report, handed to the share-rate engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingValues {
    /// Timestamp of the report's reference slot
    pub report_timestamp: Timestamp,
    /// Seconds since the previously processed reference slot
    pub time_elapsed: u64,
    /// Number of protocol validators on the consensus layer
    pub cl_validators: u64,
    /// Their total balance in gwei
    pub cl_balance_gwei: u64,
    /// Withdrawal vault balance in wei
    pub withdrawal_vault_balance: u128,
    /// Execution-layer rewards vault balance in wei
    pub el_rewards_vault_balance: u128,
    /// Shares requested to burn
    pub shares_requested_to_burn: u128,
    /// Withdrawal request ids ending each finalization batch
    pub withdrawal_finalization_batches: Vec<u64>,
}

/// Share/exchange-rate accounting engine
pub trait AccountingEngine: Send + Sync {
    /// Apply the decoded values of an accepted report
    fn handle_oracle_report(&self, values: &AccountingValues) -> CollaboratorResult;
}
