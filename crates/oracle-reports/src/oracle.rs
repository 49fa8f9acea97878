//! Oracle instances: state, collaborators and the step boundary
//!
//! [`Oracle`] is the entry surface of one oracle instance. Every public
//! method that can change state runs as a single step through
//! [`oracle_consensus::atomically`]: it reads the clock once, works on a
//! staged copy of the state and commits it, together with its events, only
//! when the whole step succeeds.

use crate::accounting::{AccountingProcessingView, AccountingState, ReportSinks};
use crate::exit_bus::{ExitBusProcessingView, ExitBusState};
use crate::extra_data::ExtraDataProcessingState;
use crate::report_data::{AccountingReport, ExitRequestsReport};
use oracle_consensus::{atomically, Caller, ConsensusFrame, ConsensusReport, ReportStore, Staged};
use oracle_core::effects::{AccountingEngine, CapabilityCheck, Clock, OperatorRegistry, WithdrawalQueue};
use oracle_core::{
    Epoch, Hash32, MemberId, OracleEvent, ReportLimits, Result, Slot, Timestamp, ValidatorIndex,
};
use std::sync::Arc;

/// State types that embed a consensus report store
pub trait OracleState: Clone {
    /// The embedded store
    fn store(&self) -> &ReportStore;

    /// The embedded store, mutably
    fn store_mut(&mut self) -> &mut ReportStore;
}

impl OracleState for ExitBusState {
    fn store(&self) -> &ReportStore {
        &self.consensus
    }

    fn store_mut(&mut self) -> &mut ReportStore {
        &mut self.consensus
    }
}

impl OracleState for AccountingState {
    fn store(&self) -> &ReportStore {
        &self.consensus
    }

    fn store_mut(&mut self) -> &mut ReportStore {
        &mut self.consensus
    }
}

/// Injected collaborators
#[derive(Clone)]
pub struct Collaborators {
    /// Authorizes every caller
    pub capabilities: Arc<dyn CapabilityCheck>,
    /// Node operator registry
    pub registry: Arc<dyn OperatorRegistry>,
    /// Withdrawal queue
    pub withdrawals: Arc<dyn WithdrawalQueue>,
    /// Accounting engine
    pub accounting: Arc<dyn AccountingEngine>,
    /// Time source, read once per step
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    fn caller<'a>(&'a self, id: &'a MemberId) -> Caller<'a> {
        Caller::new(id, self.capabilities.as_ref())
    }

    fn sinks(&self) -> ReportSinks<'_> {
        ReportSinks {
            registry: self.registry.as_ref(),
            withdrawals: self.withdrawals.as_ref(),
            accounting: self.accounting.as_ref(),
        }
    }
}

/// One oracle instance
pub struct Oracle<S> {
    state: S,
    limits: ReportLimits,
    collaborators: Collaborators,
    events: Vec<OracleEvent>,
}

/// Validator exit request oracle
pub type ExitRequestsOracle = Oracle<ExitBusState>;

/// Accounting oracle
pub type AccountingOracle = Oracle<AccountingState>;

impl<S: OracleState> Oracle<S> {
    /// Wrap existing state
    pub fn new(state: S, limits: ReportLimits, collaborators: Collaborators) -> Self {
        Self {
            state,
            limits,
            collaborators,
            events: Vec::new(),
        }
    }

    /// Committed state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Give up the instance, keeping its state
    pub fn into_state(self) -> S {
        self.state
    }

    /// Active report limits
    pub fn limits(&self) -> &ReportLimits {
        &self.limits
    }

    /// Events committed since the last drain
    pub fn events(&self) -> &[OracleEvent] {
        &self.events
    }

    /// Take the committed events
    pub fn drain_events(&mut self) -> Vec<OracleEvent> {
        std::mem::take(&mut self.events)
    }

    fn now(&self) -> Timestamp {
        self.collaborators.clock.now()
    }

    fn step<T>(
        &mut self,
        body: impl FnOnce(&mut Staged<S>, &Collaborators, &ReportLimits, Timestamp) -> Result<T>,
    ) -> Result<T> {
        let now = self.collaborators.clock.now();
        let collaborators = &self.collaborators;
        let limits = &self.limits;
        atomically(&mut self.state, &mut self.events, |staged| {
            body(staged, collaborators, limits, now)
        })
    }

    fn store_step(
        &mut self,
        body: impl FnOnce(&mut ReportStore, &Collaborators, Timestamp, &mut Vec<OracleEvent>) -> Result<()>,
    ) -> Result<()> {
        self.step(|staged, collaborators, _, now| {
            let (state, events) = staged.parts_mut();
            body(state.store_mut(), collaborators, now, events)
        })
    }

    /// Frame containing the current time
    pub fn current_frame(&self) -> Result<ConsensusFrame> {
        self.state.store().current_frame(self.now())
    }

    /// Latest stored consensus report
    pub fn consensus_report(&self) -> Option<ConsensusReport> {
        self.state.store().consensus_report().copied()
    }

    /// Reference slot of the last report whose processing began
    pub fn last_processing_ref_slot(&self) -> Slot {
        self.state.store().last_processing_ref_slot
    }

    /// Whether report acceptance is paused now
    pub fn is_paused(&self) -> bool {
        self.state.store().pause.is_paused(self.now())
    }

    /// Store a consensus digest for the current frame
    pub fn submit_consensus_report(&mut self, caller: &MemberId, ref_slot: Slot, digest: Hash32) -> Result<()> {
        self.store_step(|store, c, now, events| {
            store.submit_report(c.caller(caller), ref_slot, digest, now, events)
        })
    }

    /// Withdraw the stored digest before processing starts
    pub fn discard_consensus_report(&mut self, caller: &MemberId, ref_slot: Slot) -> Result<()> {
        self.store_step(|store, c, _, events| store.discard_report(c.caller(caller), ref_slot, events))
    }

    /// Change the frame length
    pub fn set_frame_config(&mut self, caller: &MemberId, epochs_per_frame: u64) -> Result<()> {
        self.store_step(|store, c, now, events| {
            store.set_frame_config(c.caller(caller), epochs_per_frame, now, events)
        })
    }

    /// Move the initial epoch while it is in the future
    pub fn update_initial_epoch(&mut self, caller: &MemberId, initial_epoch: Epoch) -> Result<()> {
        self.store_step(|store, c, now, events| {
            store.update_initial_epoch(c.caller(caller), initial_epoch, now, events)
        })
    }

    /// Rotate the designated reporter
    pub fn set_reporter(&mut self, caller: &MemberId, reporter: MemberId) -> Result<()> {
        self.store_step(|store, c, _, events| store.set_reporter(c.caller(caller), reporter, events))
    }

    /// Change the consensus version
    pub fn set_consensus_version(&mut self, caller: &MemberId, version: u64) -> Result<()> {
        self.store_step(|store, c, _, events| {
            store.set_consensus_version(c.caller(caller), version, events)
        })
    }

    /// Pause acceptance for `duration` seconds
    pub fn pause_for(&mut self, caller: &MemberId, duration: u64) -> Result<()> {
        self.store_step(|store, c, now, events| store.pause_for(c.caller(caller), duration, now, events))
    }

    /// Pause acceptance until `until` inclusive
    pub fn pause_until(&mut self, caller: &MemberId, until: Timestamp) -> Result<()> {
        self.store_step(|store, c, now, events| store.pause_until(c.caller(caller), until, now, events))
    }

    /// Resume acceptance
    pub fn resume(&mut self, caller: &MemberId) -> Result<()> {
        self.store_step(|store, c, now, events| store.resume(c.caller(caller), now, events))
    }
}

impl Oracle<ExitBusState> {
    /// Apply a full exit request report
    pub fn submit_report_data(&mut self, caller: &MemberId, report: &ExitRequestsReport) -> Result<()> {
        self.step(|staged, c, limits, now| {
            let (state, events) = staged.parts_mut();
            state.submit_report_data(c.caller(caller), report, limits, now, events)
        })
    }

    /// Processing progress of the current frame
    pub fn processing_state(&self) -> Result<ExitBusProcessingView> {
        self.state.processing_view(self.now())
    }

    /// Last requested validator index per operator; `None` if never requested
    pub fn last_requested_validator_indices(
        &self,
        module_id: u32,
        operator_ids: &[u64],
    ) -> Result<Vec<Option<ValidatorIndex>>> {
        self.state.last_requested_validator_indices(module_id, operator_ids)
    }

    /// Requests accepted over the oracle's lifetime
    pub fn total_requests_processed(&self) -> u64 {
        self.state.total_requests_processed()
    }
}

impl Oracle<AccountingState> {
    /// Apply a main accounting report
    pub fn submit_report_data(&mut self, caller: &MemberId, report: &AccountingReport) -> Result<()> {
        self.step(|staged, c, _, now| {
            let (state, events) = staged.parts_mut();
            state.submit_report_data(c.caller(caller), report, &c.sinks(), now, events)
        })
    }

    /// Finish a frame whose main report declared no extra data
    pub fn submit_extra_data_empty(&mut self, caller: &MemberId) -> Result<()> {
        self.step(|staged, c, _, _| {
            let (state, events) = staged.parts_mut();
            state.submit_extra_data_empty(c.caller(caller), c.registry.as_ref(), events)
        })
    }

    /// Apply the next extra-data chunk
    pub fn submit_extra_data_list(&mut self, caller: &MemberId, chunk: &[u8]) -> Result<()> {
        self.step(|staged, c, limits, _| {
            let (state, events) = staged.parts_mut();
            state.submit_extra_data_list(c.caller(caller), chunk, c.registry.as_ref(), limits, events)
        })
    }

    /// Processing progress of the current frame
    pub fn processing_state(&self) -> Result<AccountingProcessingView> {
        self.state.processing_view(self.now())
    }

    /// Extra-data cursor of the last main report
    pub fn extra_data_state(&self) -> Option<&ExtraDataProcessingState> {
        self.state.extra_data.as_ref()
    }
}
