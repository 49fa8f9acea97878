//! Ready-made oracle pair on a small test chain
//!
//! Both oracles share one manual clock, one capability table and the
//! recording collaborators. The clock starts at the first slot of frame 0.

use crate::builders::ExtraData;
use crate::mocks::{RecordingAccounting, RecordingRegistry, RecordingWithdrawals};
use crate::time::ManualClock;
use oracle_consensus::ChainParams;
use oracle_core::effects::{Capability, StaticCapabilities};
use oracle_core::{MemberId, OracleEvent, ReportLimits, Result, Slot, Timestamp};
use oracle_reports::{
    AccountingOracle, AccountingReport, Collaborators, ExitRequestsOracle, ExitRequestsReport,
    Oracle, OracleConfig, OracleSection, ReportPayload,
};
use std::sync::Arc;

/// Genesis time of the test chain
pub const GENESIS_TIME: Timestamp = 1_700_000_000;
/// Slots per epoch of the test chain
pub const SLOTS_PER_EPOCH: u64 = 32;
/// Seconds per slot of the test chain
pub const SECONDS_PER_SLOT: u64 = 12;
/// Frame length of both test oracles
pub const EPOCHS_PER_FRAME: u64 = 4;
/// Seconds covered by one frame
pub const FRAME_SECONDS: u64 = EPOCHS_PER_FRAME * SLOTS_PER_EPOCH * SECONDS_PER_SLOT;

/// Designated reporter; also holds `SubmitData`
pub const REPORTER: &str = "reporter";
/// Holds every administrative capability
pub const ADMIN: &str = "admin";
/// Holds nothing
pub const OUTSIDER: &str = "outsider";

/// Configuration used by [`OracleFixture`]
pub fn test_config() -> OracleConfig {
    let section = OracleSection {
        initial_epoch: 1,
        epochs_per_frame: EPOCHS_PER_FRAME,
        consensus_version: 1,
        reporter: Some(MemberId::new(REPORTER)),
        last_processing_ref_slot: 0,
    };
    OracleConfig {
        chain: ChainParams::new(SLOTS_PER_EPOCH, SECONDS_PER_SLOT, GENESIS_TIME).unwrap(),
        exit_bus: section.clone(),
        accounting: section,
        limits: ReportLimits::default(),
    }
}

/// Capability table used by [`OracleFixture`]
pub fn test_capabilities() -> StaticCapabilities {
    StaticCapabilities::new()
        .grant_all(
            REPORTER,
            [Capability::SubmitConsensusReport, Capability::SubmitData],
        )
        .grant_all(
            ADMIN,
            [
                Capability::ManageFrameConfig,
                Capability::ManageReporter,
                Capability::ManageConsensusVersion,
                Capability::Pause,
                Capability::Resume,
            ],
        )
}

/// Both oracles wired to recording collaborators
pub struct OracleFixture {
    /// Clock shared by both oracles
    pub clock: ManualClock,
    /// Registry shared by both oracles
    pub registry: RecordingRegistry,
    /// Withdrawal queue
    pub withdrawals: RecordingWithdrawals,
    /// Accounting engine
    pub engine: RecordingAccounting,
    /// Exit request oracle
    pub exit_bus: ExitRequestsOracle,
    /// Accounting oracle
    pub accounting: AccountingOracle,
    /// Holds the reporter capabilities on both oracles
    pub reporter: MemberId,
    /// Holds every administrative capability
    pub admin: MemberId,
    /// Holds no capability
    pub outsider: MemberId,
}

impl Default for OracleFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl OracleFixture {
    /// Default limits, clock at the start of frame 0
    pub fn new() -> Self {
        Self::with_limits(ReportLimits::default())
    }

    /// Custom report limits
    pub fn with_limits(limits: ReportLimits) -> Self {
        let config = test_config();
        let frame_start = GENESIS_TIME + SLOTS_PER_EPOCH * SECONDS_PER_SLOT;
        let clock = ManualClock::new(frame_start);
        let registry = RecordingRegistry::new();
        let withdrawals = RecordingWithdrawals::default();
        let engine = RecordingAccounting::default();
        let collaborators = Collaborators {
            capabilities: Arc::new(test_capabilities()),
            registry: Arc::new(registry.clone()),
            withdrawals: Arc::new(withdrawals.clone()),
            accounting: Arc::new(engine.clone()),
            clock: Arc::new(clock.clone()),
        };
        Self {
            exit_bus: Oracle::new(config.exit_bus_state().unwrap(), limits, collaborators.clone()),
            accounting: Oracle::new(config.accounting_state().unwrap(), limits, collaborators),
            clock,
            registry,
            withdrawals,
            engine,
            reporter: MemberId::new(REPORTER),
            admin: MemberId::new(ADMIN),
            outsider: MemberId::new(OUTSIDER),
        }
    }

    /// Reference slot of the exit oracle's current frame
    pub fn exit_ref_slot(&self) -> Slot {
        self.exit_bus.current_frame().unwrap().reference_slot
    }

    /// Reference slot of the accounting oracle's current frame
    pub fn accounting_ref_slot(&self) -> Slot {
        self.accounting.current_frame().unwrap().reference_slot
    }

    /// Move the clock forward by whole frames
    pub fn advance_frames(&self, frames: u64) {
        self.clock.advance(frames * FRAME_SECONDS);
    }

    /// Submit the report's digest as the reporter, then its data
    pub fn submit_exit_report(&mut self, report: &ExitRequestsReport) -> Result<()> {
        self.exit_bus
            .submit_consensus_report(&self.reporter, report.ref_slot, report.digest()?)?;
        self.exit_bus.submit_report_data(&self.reporter, report)
    }

    /// Submit the report's digest as the reporter, then its main data
    pub fn submit_accounting_report(&mut self, report: &AccountingReport) -> Result<()> {
        self.accounting
            .submit_consensus_report(&self.reporter, report.ref_slot, report.digest()?)?;
        self.accounting.submit_report_data(&self.reporter, report)
    }

    /// Submit every chunk in order, stopping at the first failure
    pub fn submit_extra_data(&mut self, extra: &ExtraData) -> Result<()> {
        for chunk in &extra.chunks {
            self.accounting.submit_extra_data_list(&self.reporter, chunk)?;
        }
        Ok(())
    }

    /// Drain the events of both oracles, exit oracle first
    pub fn drain_events(&mut self) -> Vec<OracleEvent> {
        let mut events = self.exit_bus.drain_events();
        events.extend(self.accounting.drain_events());
        events
    }
}
