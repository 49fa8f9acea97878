//! Collaborators that log what they receive
//!
//! The CLI has no registry, withdrawal queue or accounting engine behind it,
//! so every forwarded value is written to the log instead.

use oracle_core::effects::{
    AccountingEngine, AccountingValues, CollaboratorResult, OperatorRegistry, WithdrawalQueue,
};
use oracle_core::{ModuleId, OperatorId, Timestamp};
use tracing::info;

/// Collaborators that log every call at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSinks;

fn ids(operator_ids: &[OperatorId]) -> Vec<u64> {
    operator_ids.iter().map(|id| id.get()).collect()
}

impl OperatorRegistry for LogSinks {
    fn update_exited_validators_by_module(
        &self,
        module_ids: &[ModuleId],
        counts: &[u64],
    ) -> CollaboratorResult {
        let modules: Vec<u32> = module_ids.iter().map(|id| id.get()).collect();
        info!(?modules, ?counts, "registry: exited validators by module");
        Ok(())
    }

    fn report_stuck_validators(
        &self,
        module_id: ModuleId,
        operator_ids: &[OperatorId],
        counts: &[u128],
    ) -> CollaboratorResult {
        info!(%module_id, operators = ?ids(operator_ids), ?counts, "registry: stuck validators");
        Ok(())
    }

    fn report_exited_validators(
        &self,
        module_id: ModuleId,
        operator_ids: &[OperatorId],
        counts: &[u128],
    ) -> CollaboratorResult {
        info!(%module_id, operators = ?ids(operator_ids), ?counts, "registry: exited validators");
        Ok(())
    }

    fn on_reporting_finished(&self) -> CollaboratorResult {
        info!("registry: reporting finished");
        Ok(())
    }
}

impl WithdrawalQueue for LogSinks {
    fn on_oracle_report(
        &self,
        is_bunker_mode: bool,
        prev_report_timestamp: Timestamp,
        report_timestamp: Timestamp,
    ) -> CollaboratorResult {
        info!(
            is_bunker_mode,
            prev_report_timestamp, report_timestamp, "withdrawal queue: oracle report"
        );
        Ok(())
    }
}

impl AccountingEngine for LogSinks {
    fn handle_oracle_report(&self, values: &AccountingValues) -> CollaboratorResult {
        info!(
            report_timestamp = values.report_timestamp,
            time_elapsed = values.time_elapsed,
            cl_validators = values.cl_validators,
            cl_balance_gwei = values.cl_balance_gwei,
            "accounting engine: oracle report"
        );
        Ok(())
    }
}
