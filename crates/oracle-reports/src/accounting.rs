//! Accounting oracle: main report and extra data
//!
//! The main report starts processing of its reference slot, hands the
//! decoded values to the registry, the withdrawal queue and the accounting
//! engine, and arms the extra-data cursor. Extra data then arrives in any
//! number of later calls until the terminal chunk, or the next main report
//! replaces the cursor.
//!
//! Extra-data calls are not gated by the processing deadline or by pause.

use crate::codec::{ExtraDataItemType, SortedKeyTracker};
use crate::extra_data::ExtraDataProcessingState;
use crate::report_data::{AccountingReport, ExtraDataFormat, ReportPayload};
use oracle_consensus::{Caller, ReportStore};
use oracle_core::effects::{
    fatal, AccountingEngine, AccountingValues, Capability, OperatorRegistry, WithdrawalQueue,
};
use oracle_core::{
    Hash32, ModuleId, OracleError, OracleEvent, ReportLimits, Result, Slot, Timestamp,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Read-only view of the current frame's processing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingProcessingView {
    /// Reference slot of the frame containing now
    pub current_frame_ref_slot: Slot,
    /// Deadline of the stored report for this frame; zero if none
    pub processing_deadline_time: Timestamp,
    /// Stored consensus digest for this frame
    pub main_data_hash: Hash32,
    /// The main report for this frame was applied
    pub main_data_submitted: bool,
    /// First chunk hash declared by the main report
    pub extra_data_hash: Hash32,
    /// Declared extra-data format
    pub extra_data_format: u32,
    /// Every extra-data item was applied
    pub extra_data_submitted: bool,
    /// Declared extra-data item total
    pub extra_data_items_count: u64,
    /// Extra-data items applied
    pub extra_data_items_submitted: u64,
}

/// Persistent state of the accounting oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingState {
    /// Consensus report store of this oracle
    pub consensus: ReportStore,
    /// Cursor over the extra data of the last main report
    pub extra_data: Option<ExtraDataProcessingState>,
    /// First chunk hash declared by the last main report
    extra_data_hash: Hash32,
}

/// Collaborators a main report is forwarded to
pub struct ReportSinks<'a> {
    /// Receives exited totals and extra-data counts
    pub registry: &'a dyn OperatorRegistry,
    /// Receives the bunker flag and report timestamps
    pub withdrawals: &'a dyn WithdrawalQueue,
    /// Receives the report values
    pub accounting: &'a dyn AccountingEngine,
}

impl AccountingState {
    /// Fresh state around a consensus store
    pub fn new(consensus: ReportStore) -> Self {
        Self {
            consensus,
            extra_data: None,
            extra_data_hash: Hash32::ZERO,
        }
    }

    /// Processing progress for the frame containing `now`
    pub fn processing_view(&self, now: Timestamp) -> Result<AccountingProcessingView> {
        let frame = self.consensus.current_frame(now)?;
        let mut view = AccountingProcessingView {
            current_frame_ref_slot: frame.reference_slot,
            ..AccountingProcessingView::default()
        };
        let Some(report) = self
            .consensus
            .consensus_report()
            .filter(|r| r.reference_slot == frame.reference_slot)
        else {
            return Ok(view);
        };
        view.processing_deadline_time = report.deadline_time;
        view.main_data_hash = report.digest;
        view.main_data_submitted = self.consensus.last_processing_ref_slot == frame.reference_slot;
        if let Some(cursor) = self
            .extra_data
            .as_ref()
            .filter(|c| view.main_data_submitted && c.reference_slot == frame.reference_slot)
        {
            view.extra_data_hash = self.extra_data_hash;
            view.extra_data_format = cursor.declared_format.as_u32();
            view.extra_data_submitted = cursor.submitted;
            view.extra_data_items_count = cursor.total_items;
            view.extra_data_items_submitted = cursor.items_processed;
        }
        Ok(view)
    }

    /// Validate and apply a main accounting report
    pub fn submit_report_data(
        &mut self,
        caller: Caller<'_>,
        report: &AccountingReport,
        sinks: &ReportSinks<'_>,
        now: Timestamp,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        self.consensus.pause.check_resumed(now)?;
        let digest = report.admit(&self.consensus, caller)?;
        let prev_ref_slot = self.consensus.start_processing(now, events)?;

        if let Some(prev) = self
            .extra_data
            .as_ref()
            .filter(|c| c.reference_slot == prev_ref_slot && !c.submitted)
        {
            warn!(
                ref_slot = prev.reference_slot,
                items_processed = prev.items_processed,
                items_count = prev.total_items,
                "previous extra data left incomplete"
            );
            events.push(OracleEvent::ExtraDataIncomplete {
                ref_slot: prev.reference_slot,
                items_processed: prev.items_processed,
                items_count: prev.total_items,
            });
        }

        let format = check_extra_data_declaration(report)?;
        let module_ids = check_exited_validators(report)?;
        let mut batches = SortedKeyTracker::new();
        for (batch, position) in report.withdrawal_finalization_batches.iter().zip(0u64..) {
            batches.admit(*batch, position)?;
        }

        let chain = &self.consensus.clock.chain;
        let report_timestamp = chain.timestamp_at_slot(report.ref_slot)?;
        let prev_report_timestamp = chain.timestamp_at_slot(prev_ref_slot)?;
        let values = AccountingValues {
            report_timestamp,
            time_elapsed: report_timestamp.saturating_sub(prev_report_timestamp),
            cl_validators: report.num_validators,
            cl_balance_gwei: report.cl_balance_gwei,
            withdrawal_vault_balance: report.withdrawal_vault_balance,
            el_rewards_vault_balance: report.el_rewards_vault_balance,
            shares_requested_to_burn: report.shares_requested_to_burn,
            withdrawal_finalization_batches: report.withdrawal_finalization_batches.clone(),
        };

        fatal(
            "operator registry",
            sinks
                .registry
                .update_exited_validators_by_module(&module_ids, &report.num_exited_by_module),
        )?;
        fatal(
            "withdrawal queue",
            sinks.withdrawals.on_oracle_report(
                report.is_bunker_mode,
                prev_report_timestamp,
                report_timestamp,
            ),
        )?;
        fatal("accounting engine", sinks.accounting.handle_oracle_report(&values))?;

        self.extra_data = Some(ExtraDataProcessingState::arm(
            report.ref_slot,
            format,
            report.extra_data_hash,
            report.extra_data_items_count,
        ));
        self.extra_data_hash = report.extra_data_hash;
        info!(
            ref_slot = report.ref_slot,
            extra_data_format = format.as_u32(),
            extra_data_items = report.extra_data_items_count,
            %digest,
            "accounting report processed"
        );
        Ok(())
    }

    fn cursor_for_submission(&self, caller: Caller<'_>) -> Result<&ExtraDataProcessingState> {
        caller.require(Capability::SubmitData)?;
        self.extra_data
            .as_ref()
            .filter(|c| c.reference_slot == self.consensus.last_processing_ref_slot)
            .ok_or(OracleError::MainDataNotSubmitted)
    }

    /// Finish a frame whose main report declared no extra data
    pub fn submit_extra_data_empty(
        &mut self,
        caller: Caller<'_>,
        registry: &dyn OperatorRegistry,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        let cursor = self.cursor_for_submission(caller)?.complete_empty()?;
        notify_reporting_finished(registry);
        events.push(OracleEvent::ExtraDataSubmitted {
            ref_slot: cursor.reference_slot,
            items_processed: 0,
            items_count: 0,
        });
        info!(ref_slot = cursor.reference_slot, "empty extra data submitted");
        self.extra_data = Some(cursor);
        Ok(())
    }

    /// Apply the next chunk of list-format extra data
    pub fn submit_extra_data_list(
        &mut self,
        caller: Caller<'_>,
        chunk: &[u8],
        registry: &dyn OperatorRegistry,
        limits: &ReportLimits,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        let prepared = self
            .cursor_for_submission(caller)?
            .prepare_list_chunk(chunk, limits)?;

        for item in &prepared.items {
            let forwarded = match item.item_type {
                ExtraDataItemType::StuckValidators => {
                    registry.report_stuck_validators(item.module_id, &item.operator_ids, &item.counts)
                }
                ExtraDataItemType::ExitedValidators => {
                    registry.report_exited_validators(item.module_id, &item.operator_ids, &item.counts)
                }
            };
            fatal("operator registry", forwarded)?;
        }

        let cursor = prepared.cursor;
        debug!(
            ref_slot = cursor.reference_slot,
            items = prepared.items.len(),
            items_processed = cursor.items_processed,
            terminal = prepared.terminal,
            "extra data chunk applied"
        );
        if prepared.terminal {
            notify_reporting_finished(registry);
            info!(
                ref_slot = cursor.reference_slot,
                items = cursor.items_processed,
                "extra data complete"
            );
        }
        events.push(OracleEvent::ExtraDataSubmitted {
            ref_slot: cursor.reference_slot,
            items_processed: cursor.items_processed,
            items_count: cursor.total_items,
        });
        self.extra_data = Some(cursor);
        Ok(())
    }
}

/// Failures are logged and swallowed so a registry fault cannot block
/// completion of the frame.
fn notify_reporting_finished(registry: &dyn OperatorRegistry) {
    if let Err(e) = registry.on_reporting_finished() {
        warn!(error = %e, "reporting-finished notification failed");
    }
}

fn check_extra_data_declaration(report: &AccountingReport) -> Result<ExtraDataFormat> {
    let format = ExtraDataFormat::try_from(report.extra_data_format)?;
    match format {
        ExtraDataFormat::Empty => {
            if !report.extra_data_hash.is_zero() {
                return Err(OracleError::invalid_extra_data_declaration(
                    "empty extra data must have a zero hash",
                ));
            }
            if report.extra_data_items_count != 0 {
                return Err(OracleError::invalid_extra_data_declaration(
                    "empty extra data must have no items",
                ));
            }
        }
        ExtraDataFormat::List => {
            if report.extra_data_items_count == 0 {
                return Err(OracleError::invalid_extra_data_declaration(
                    "list extra data must have items",
                ));
            }
            if report.extra_data_hash.is_zero() {
                return Err(OracleError::invalid_extra_data_declaration(
                    "list extra data must have a non-zero hash",
                ));
            }
        }
    }
    Ok(format)
}

fn check_exited_validators(report: &AccountingReport) -> Result<Vec<ModuleId>> {
    if report.module_ids_with_newly_exited.len() != report.num_exited_by_module.len() {
        return Err(OracleError::invalid_exited_validators(format!(
            "{} module ids but {} counts",
            report.module_ids_with_newly_exited.len(),
            report.num_exited_by_module.len()
        )));
    }
    let mut tracker = SortedKeyTracker::new();
    report
        .module_ids_with_newly_exited
        .iter()
        .zip(0u64..)
        .map(|(raw, position)| {
            let module_id = ModuleId::new(*raw)
                .ok()
                .filter(|id| !id.is_zero())
                .ok_or_else(|| OracleError::invalid_exited_validators(format!("invalid module id {raw}")))?;
            tracker
                .admit(module_id, position)
                .map_err(|_| OracleError::invalid_exited_validators("module ids not strictly ascending"))?;
            Ok(module_id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> AccountingReport {
        AccountingReport {
            consensus_version: 1,
            ref_slot: 319,
            num_validators: 10,
            cl_balance_gwei: 320_000_000_000,
            module_ids_with_newly_exited: vec![1, 2],
            num_exited_by_module: vec![3, 4],
            withdrawal_vault_balance: 0,
            el_rewards_vault_balance: 0,
            shares_requested_to_burn: 0,
            withdrawal_finalization_batches: vec![5, 9],
            is_bunker_mode: false,
            extra_data_format: 0,
            extra_data_hash: Hash32::ZERO,
            extra_data_items_count: 0,
        }
    }

    #[test]
    fn test_extra_data_declaration() {
        assert_eq!(check_extra_data_declaration(&report()), Ok(ExtraDataFormat::Empty));

        let mut r = report();
        r.extra_data_items_count = 1;
        assert!(matches!(
            check_extra_data_declaration(&r),
            Err(OracleError::InvalidExtraDataDeclaration { .. })
        ));

        r.extra_data_format = 1;
        assert!(matches!(
            check_extra_data_declaration(&r),
            Err(OracleError::InvalidExtraDataDeclaration { .. })
        ));
        r.extra_data_hash = Hash32::of(b"chunk");
        assert_eq!(check_extra_data_declaration(&r), Ok(ExtraDataFormat::List));

        r.extra_data_format = 7;
        assert_eq!(
            check_extra_data_declaration(&r),
            Err(OracleError::UnsupportedFormat { format: 7 })
        );
    }

    #[test]
    fn test_exited_validators_checks() {
        assert_eq!(check_exited_validators(&report()).unwrap().len(), 2);

        let mut r = report();
        r.num_exited_by_module.pop();
        assert!(check_exited_validators(&r).is_err());

        let mut r = report();
        r.module_ids_with_newly_exited = vec![2, 2];
        assert_eq!(
            check_exited_validators(&r),
            Err(OracleError::invalid_exited_validators("module ids not strictly ascending"))
        );

        let mut r = report();
        r.module_ids_with_newly_exited = vec![0, 2];
        assert!(matches!(
            check_exited_validators(&r),
            Err(OracleError::InvalidExitedValidatorsData { .. })
        ));
    }
}
