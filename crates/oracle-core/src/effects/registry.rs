//! Operator registry interface
//!
//! Receives per-module and per-operator validator counts decoded from
//! accounting reports.

use super::CollaboratorResult;
use crate::{ModuleId, OperatorId};

/// Registry of staking modules and their node operators
pub trait OperatorRegistry: Send + Sync {
    /// Total exited validators per module, from the accounting main report.
    ///
    /// `module_ids` is strictly ascending and the same length as `counts`.
    fn update_exited_validators_by_module(
        &self,
        module_ids: &[ModuleId],
        counts: &[u64],
    ) -> CollaboratorResult;

    /// Stuck validator counts for operators of one module (one extra-data item)
    fn report_stuck_validators(
        &self,
        module_id: ModuleId,
        operator_ids: &[OperatorId],
        counts: &[u128],
    ) -> CollaboratorResult;

    /// Exited validator counts for operators of one module (one extra-data item)
    fn report_exited_validators(
        &self,
        module_id: ModuleId,
        operator_ids: &[OperatorId],
        counts: &[u128],
    ) -> CollaboratorResult;

    /// All per-operator counts for the frame have been delivered. Best-effort.
    fn on_reporting_finished(&self) -> CollaboratorResult;
}
