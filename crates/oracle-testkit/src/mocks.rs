//! Recording collaborators
//!
//! Each mock appends every call it receives to a shared log so tests can
//! assert exactly what reached the outside world. Failures can be switched
//! on per mock to exercise the fatal and best-effort paths.

use oracle_core::effects::{
    AccountingEngine, AccountingValues, Capability, CapabilityCheck, CollaboratorError,
    CollaboratorResult, OperatorRegistry, WithdrawalQueue,
};
use oracle_core::{MemberId, ModuleId, OperatorId, Timestamp};
use parking_lot::Mutex;
use std::sync::Arc;

/// A call received by [`RecordingRegistry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    /// Exited totals per module from a main report
    ExitedByModule {
        /// Modules, ascending
        module_ids: Vec<ModuleId>,
        /// Exited count per module
        counts: Vec<u64>,
    },
    /// Stuck validator counts from an extra-data item
    Stuck {
        /// Module of the item
        module_id: ModuleId,
        /// Operators, ascending
        operator_ids: Vec<OperatorId>,
        /// Count per operator
        counts: Vec<u128>,
    },
    /// Exited validator counts from an extra-data item
    Exited {
        /// Module of the item
        module_id: ModuleId,
        /// Operators, ascending
        operator_ids: Vec<OperatorId>,
        /// Count per operator
        counts: Vec<u128>,
    },
    /// End of the extra data for a frame
    ReportingFinished,
}

#[derive(Debug, Default)]
struct RegistryInner {
    calls: Vec<RegistryCall>,
    fail_counts: bool,
    fail_finished: bool,
}

/// Operator registry that records calls
#[derive(Debug, Clone, Default)]
pub struct RecordingRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl RecordingRegistry {
    /// Registry accepting every call
    pub fn new() -> Self {
        Self::default()
    }

    /// Make count updates fail
    pub fn fail_counts(&self, fail: bool) {
        self.inner.lock().fail_counts = fail;
    }

    /// Make the reporting-finished notification fail
    pub fn fail_finished(&self, fail: bool) {
        self.inner.lock().fail_finished = fail;
    }

    /// Every call received so far, including failed ones
    pub fn calls(&self) -> Vec<RegistryCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of reporting-finished notifications received
    pub fn finished_count(&self) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|call| matches!(call, RegistryCall::ReportingFinished))
            .count()
    }

    /// Calls carrying per-operator counts
    pub fn operator_calls(&self) -> Vec<RegistryCall> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|call| matches!(call, RegistryCall::Stuck { .. } | RegistryCall::Exited { .. }))
            .cloned()
            .collect()
    }

    fn record(&self, call: RegistryCall, fail: impl Fn(&RegistryInner) -> bool) -> CollaboratorResult {
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        if fail(&*inner) {
            return Err(CollaboratorError::new("registry unavailable"));
        }
        Ok(())
    }
}

impl OperatorRegistry for RecordingRegistry {
    fn update_exited_validators_by_module(&self, module_ids: &[ModuleId], counts: &[u64]) -> CollaboratorResult {
        self.record(
            RegistryCall::ExitedByModule {
                module_ids: module_ids.to_vec(),
                counts: counts.to_vec(),
            },
            |inner| inner.fail_counts,
        )
    }

    fn report_stuck_validators(
        &self,
        module_id: ModuleId,
        operator_ids: &[OperatorId],
        counts: &[u128],
    ) -> CollaboratorResult {
        self.record(
            RegistryCall::Stuck {
                module_id,
                operator_ids: operator_ids.to_vec(),
                counts: counts.to_vec(),
            },
            |inner| inner.fail_counts,
        )
    }

    fn report_exited_validators(
        &self,
        module_id: ModuleId,
        operator_ids: &[OperatorId],
        counts: &[u128],
    ) -> CollaboratorResult {
        self.record(
            RegistryCall::Exited {
                module_id,
                operator_ids: operator_ids.to_vec(),
                counts: counts.to_vec(),
            },
            |inner| inner.fail_counts,
        )
    }

    fn on_reporting_finished(&self) -> CollaboratorResult {
        self.record(RegistryCall::ReportingFinished, |inner| inner.fail_finished)
    }
}

/// A call received by [`RecordingWithdrawals`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalCall {
    /// Bunker flag of the report
    pub is_bunker_mode: bool,
    /// Reference-slot time of the previous processed report
    pub prev_report_timestamp: Timestamp,
    /// Reference-slot time of this report
    pub report_timestamp: Timestamp,
}

/// Withdrawal queue that records calls
#[derive(Debug, Clone, Default)]
pub struct RecordingWithdrawals {
    calls: Arc<Mutex<Vec<WithdrawalCall>>>,
}

impl RecordingWithdrawals {
    /// Calls received so far
    pub fn calls(&self) -> Vec<WithdrawalCall> {
        self.calls.lock().clone()
    }
}

impl WithdrawalQueue for RecordingWithdrawals {
    fn on_oracle_report(
        &self,
        is_bunker_mode: bool,
        prev_report_timestamp: Timestamp,
        report_timestamp: Timestamp,
    ) -> CollaboratorResult {
        self.calls.lock().push(WithdrawalCall {
            is_bunker_mode,
            prev_report_timestamp,
            report_timestamp,
        });
        Ok(())
    }
}

/// Accounting engine that records the values it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingAccounting {
    reports: Arc<Mutex<Vec<AccountingValues>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingAccounting {
    /// Values received so far
    pub fn reports(&self) -> Vec<AccountingValues> {
        self.reports.lock().clone()
    }

    /// Make every call fail
    pub fn fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

impl AccountingEngine for RecordingAccounting {
    fn handle_oracle_report(&self, values: &AccountingValues) -> CollaboratorResult {
        if *self.fail.lock() {
            return Err(CollaboratorError::new("accounting engine rejected report"));
        }
        self.reports.lock().push(values.clone());
        Ok(())
    }
}

/// Capability check granting everything to everyone
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl CapabilityCheck for AllowAll {
    fn has_capability(&self, _caller: &MemberId, _capability: Capability) -> bool {
        true
    }
}
