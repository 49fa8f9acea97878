//! Withdrawal request queue interface

use super::CollaboratorResult;
use crate::Timestamp;

/// Queue of pending withdrawal requests
pub trait WithdrawalQueue: Send + Sync {
    /// Notify the queue of a new accounting report
    fn on_oracle_report(
        &self,
        is_bunker_mode: bool,
        prev_report_timestamp: Timestamp,
        report_timestamp: Timestamp,
    ) -> CollaboratorResult;
}
