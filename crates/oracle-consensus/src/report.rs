//! Consensus Report Store
//!
//! Holds the single latest consensus digest of an oracle instance together
//! with the slot it describes and its processing deadline, and enforces the
//! submission protocol:
//!
//! 1. the digest targets the current frame's reference slot
//! 2. the frame's deadline has not passed
//! 3. processing for the slot has not begun
//! 4. the slot does not regress behind the stored report
//! 5. the digest is non-zero
//!
//! Processors call [`ReportStore::check_data_admission`] and then
//! [`ReportStore::start_processing`] when the full report data arrives.
//!
//! Methods mutate `self` only after every check has passed; entry points
//! still run them inside [`crate::atomically`] so that later failures in the
//! same step discard these mutations too.

use crate::frame::{ConsensusFrame, FrameClock, FrameConfig};
use crate::pause::PauseState;
use oracle_core::effects::{require, Capability, CapabilityCheck};
use oracle_core::{
    Epoch, Hash32, MemberId, OracleError, OracleEvent, OracleKind, Result, Slot, Timestamp,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// The stored consensus digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusReport {
    /// Content hash of the full report; zero once discarded
    pub digest: Hash32,
    /// Slot the report describes
    pub reference_slot: Slot,
    /// Time after which processing can no longer start
    pub deadline_time: Timestamp,
}

/// Caller plus the capability oracle used to authorize it
#[derive(Clone, Copy)]
pub struct Caller<'a> {
    /// Calling identity
    pub id: &'a MemberId,
    /// Capability oracle
    pub capabilities: &'a dyn CapabilityCheck,
}

impl<'a> Caller<'a> {
    /// Bundle a caller with its capability oracle
    pub fn new(id: &'a MemberId, capabilities: &'a dyn CapabilityCheck) -> Self {
        Self { id, capabilities }
    }

    /// Fail with `Unauthorized` unless the caller holds `capability`
    pub fn require(&self, capability: Capability) -> Result<()> {
        require(self.capabilities, self.id, capability)
    }
}

/// Consensus state of one oracle instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStore {
    /// Which oracle this store belongs to
    pub oracle: OracleKind,
    /// Frame clock
    pub clock: FrameClock,
    /// Latest accepted digest
    pub report: Option<ConsensusReport>,
    /// Reference slot of the last report whose processing began
    pub last_processing_ref_slot: Slot,
    /// Identity allowed to submit digests
    pub reporter: Option<MemberId>,
    /// Version every report must carry
    pub consensus_version: u64,
    /// Acceptance gate for new report data
    pub pause: PauseState,
}

impl ReportStore {
    /// Fresh store anchored at `last_processing_ref_slot`
    pub fn new(
        oracle: OracleKind,
        clock: FrameClock,
        consensus_version: u64,
        last_processing_ref_slot: Slot,
    ) -> Self {
        Self {
            oracle,
            clock,
            report: None,
            last_processing_ref_slot,
            reporter: None,
            consensus_version,
            pause: PauseState::default(),
        }
    }

    /// Frame containing `now`
    pub fn current_frame(&self, now: Timestamp) -> Result<ConsensusFrame> {
        self.clock.current_frame(now)
    }

    /// Latest stored report, if any
    pub fn consensus_report(&self) -> Option<&ConsensusReport> {
        self.report.as_ref()
    }

    /// Digest stored for `ref_slot`, or zero
    pub fn digest_for(&self, ref_slot: Slot) -> Hash32 {
        match &self.report {
            Some(report) if report.reference_slot == ref_slot => report.digest,
            _ => Hash32::ZERO,
        }
    }

    /// Whether processing of the stored report has begun
    pub fn processing_started(&self) -> bool {
        self.report
            .as_ref()
            .is_some_and(|r| r.reference_slot == self.last_processing_ref_slot)
    }

    fn require_reporter(&self, caller: Caller<'_>) -> Result<()> {
        caller.require(Capability::SubmitConsensusReport)?;
        if self.reporter.as_ref() != Some(caller.id) {
            return Err(OracleError::unauthorized(caller.id, "designated-reporter"));
        }
        Ok(())
    }

    /// Store a consensus digest for the current frame.
    pub fn submit_report(
        &mut self,
        caller: Caller<'_>,
        ref_slot: Slot,
        digest: Hash32,
        now: Timestamp,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        self.require_reporter(caller)?;

        let frame = self.clock.current_frame(now)?;
        if ref_slot != frame.reference_slot {
            return Err(OracleError::SlotMismatch {
                expected: frame.reference_slot,
                actual: ref_slot,
            });
        }
        let deadline_time = self.clock.deadline_time(&frame)?;
        if now > deadline_time {
            return Err(OracleError::DeadlineMissed {
                deadline: deadline_time,
                now,
            });
        }
        if ref_slot <= self.last_processing_ref_slot {
            return Err(OracleError::AlreadyProcessed { ref_slot });
        }
        if let Some(prev) = &self.report {
            if ref_slot < prev.reference_slot {
                return Err(OracleError::SlotRegression {
                    stored: prev.reference_slot,
                    actual: ref_slot,
                });
            }
        }
        if digest.is_zero() {
            return Err(OracleError::EmptyDigest);
        }

        if let Some(prev) = &self.report {
            if prev.reference_slot < ref_slot && prev.reference_slot > self.last_processing_ref_slot {
                warn!(
                    oracle = ?self.oracle,
                    ref_slot = prev.reference_slot,
                    "report replaced without being processed"
                );
                events.push(OracleEvent::ProcessingMissed {
                    oracle: self.oracle,
                    ref_slot: prev.reference_slot,
                });
            }
        }

        self.report = Some(ConsensusReport {
            digest,
            reference_slot: ref_slot,
            deadline_time,
        });
        info!(oracle = ?self.oracle, ref_slot, %digest, "consensus report submitted");
        events.push(OracleEvent::ReportSubmitted {
            oracle: self.oracle,
            ref_slot,
            digest,
            deadline_time,
        });
        Ok(())
    }

    /// Withdraw the stored digest for `ref_slot` before processing starts.
    pub fn discard_report(
        &mut self,
        caller: Caller<'_>,
        ref_slot: Slot,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        self.require_reporter(caller)?;

        let report = self.report.as_mut().ok_or(OracleError::NoConsensusReport)?;
        if report.reference_slot != ref_slot {
            return Err(OracleError::SlotMismatch {
                expected: report.reference_slot,
                actual: ref_slot,
            });
        }
        if ref_slot <= self.last_processing_ref_slot {
            return Err(OracleError::AlreadyProcessed { ref_slot });
        }
        if report.digest.is_zero() {
            return Err(OracleError::NoConsensusReport);
        }

        let digest = report.digest;
        report.digest = Hash32::ZERO;
        info!(oracle = ?self.oracle, ref_slot, "consensus report discarded");
        events.push(OracleEvent::ReportDiscarded {
            oracle: self.oracle,
            ref_slot,
            digest,
        });
        Ok(())
    }

    /// Check that report data may be processed against the stored digest.
    pub fn check_data_admission(
        &self,
        caller: Caller<'_>,
        consensus_version: u64,
        ref_slot: Slot,
        data_digest: Hash32,
    ) -> Result<()> {
        caller.require(Capability::SubmitData)?;
        if consensus_version != self.consensus_version {
            return Err(OracleError::UnexpectedConsensusVersion {
                expected: self.consensus_version,
                actual: consensus_version,
            });
        }
        let report = self
            .report
            .as_ref()
            .filter(|r| !r.digest.is_zero())
            .ok_or(OracleError::NoConsensusReport)?;
        if report.reference_slot != ref_slot {
            return Err(OracleError::UnexpectedRefSlot {
                expected: report.reference_slot,
                actual: ref_slot,
            });
        }
        if report.digest != data_digest {
            return Err(OracleError::UnexpectedDataHash {
                expected: report.digest.to_string(),
                actual: data_digest.to_string(),
            });
        }
        Ok(())
    }

    /// Begin processing the stored report.
    ///
    /// Returns the previously processing reference slot so callers can detect
    /// an unfinished predecessor.
    pub fn start_processing(
        &mut self,
        now: Timestamp,
        events: &mut Vec<OracleEvent>,
    ) -> Result<Slot> {
        let report = self
            .report
            .filter(|r| !r.digest.is_zero())
            .ok_or(OracleError::NoConsensusReport)?;
        if now > report.deadline_time {
            return Err(OracleError::DeadlineMissed {
                deadline: report.deadline_time,
                now,
            });
        }
        if report.reference_slot == self.last_processing_ref_slot {
            return Err(OracleError::AlreadyProcessed {
                ref_slot: report.reference_slot,
            });
        }

        let prev = self.last_processing_ref_slot;
        self.last_processing_ref_slot = report.reference_slot;
        info!(
            oracle = ?self.oracle,
            ref_slot = report.reference_slot,
            prev_ref_slot = prev,
            "processing started"
        );
        events.push(OracleEvent::ProcessingStarted {
            oracle: self.oracle,
            ref_slot: report.reference_slot,
            digest: report.digest,
        });
        Ok(prev)
    }

    /// Change the frame length, re-anchoring at the current frame's start.
    pub fn set_frame_config(
        &mut self,
        caller: Caller<'_>,
        epochs_per_frame: u64,
        now: Timestamp,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        caller.require(Capability::ManageFrameConfig)?;
        let initial_epoch = match self.clock.frame_start_epoch(now) {
            Ok(epoch) => epoch,
            Err(OracleError::ChainNotStarted { .. }) => self.clock.config.initial_epoch(),
            Err(e) => return Err(e),
        };
        self.apply_frame_config(FrameConfig::new(initial_epoch, epochs_per_frame)?, events)
    }

    /// Move the initial epoch while it is still in the future.
    pub fn update_initial_epoch(
        &mut self,
        caller: Caller<'_>,
        initial_epoch: Epoch,
        now: Timestamp,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        caller.require(Capability::ManageFrameConfig)?;
        let current_epoch = match self.clock.chain.epoch_at_timestamp(now) {
            Ok(epoch) => Some(epoch),
            Err(OracleError::ChainNotStarted { .. }) => None,
            Err(e) => return Err(e),
        };
        if let Some(current) = current_epoch {
            if self.clock.config.initial_epoch() <= current {
                return Err(OracleError::InitialEpochAlreadyArrived);
            }
            if initial_epoch <= current {
                return Err(OracleError::InitialEpochInPast {
                    epoch: initial_epoch,
                });
            }
        }
        let config = FrameConfig::new(initial_epoch, self.clock.config.epochs_per_frame())?;
        self.apply_frame_config(config, events)
    }

    fn apply_frame_config(
        &mut self,
        config: FrameConfig,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        let ref_slot = self.clock.initial_ref_slot(config.initial_epoch())?;
        if ref_slot < self.last_processing_ref_slot {
            return Err(OracleError::InitialRefSlotBehindProcessing {
                ref_slot,
                processing: self.last_processing_ref_slot,
            });
        }
        self.clock.config = config;
        info!(
            oracle = ?self.oracle,
            initial_epoch = config.initial_epoch(),
            epochs_per_frame = config.epochs_per_frame(),
            "frame config set"
        );
        events.push(OracleEvent::FrameConfigSet {
            oracle: self.oracle,
            initial_epoch: config.initial_epoch(),
            epochs_per_frame: config.epochs_per_frame(),
        });
        Ok(())
    }

    /// Rotate the designated reporter
    pub fn set_reporter(
        &mut self,
        caller: Caller<'_>,
        reporter: MemberId,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        caller.require(Capability::ManageReporter)?;
        if self.reporter.as_ref() == Some(&reporter) {
            return Err(OracleError::invalid_config(format!(
                "{reporter} is already the reporter"
            )));
        }
        let previous = self.reporter.replace(reporter.clone());
        info!(oracle = ?self.oracle, %reporter, "reporter set");
        events.push(OracleEvent::ReporterSet {
            oracle: self.oracle,
            previous,
            reporter,
        });
        Ok(())
    }

    /// Change the consensus version reports must carry
    pub fn set_consensus_version(
        &mut self,
        caller: Caller<'_>,
        version: u64,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        caller.require(Capability::ManageConsensusVersion)?;
        if version == self.consensus_version {
            return Err(OracleError::invalid_config(format!(
                "consensus version is already {version}"
            )));
        }
        let previous = self.consensus_version;
        self.consensus_version = version;
        events.push(OracleEvent::ConsensusVersionSet {
            oracle: self.oracle,
            previous,
            version,
        });
        Ok(())
    }

    /// Pause acceptance for `duration` seconds
    pub fn pause_for(
        &mut self,
        caller: Caller<'_>,
        duration: u64,
        now: Timestamp,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        caller.require(Capability::Pause)?;
        let resume_since = self.pause.pause_for(now, duration)?;
        self.record_pause(resume_since, events);
        Ok(())
    }

    /// Pause acceptance until `until` inclusive
    pub fn pause_until(
        &mut self,
        caller: Caller<'_>,
        until: Timestamp,
        now: Timestamp,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        caller.require(Capability::Pause)?;
        let resume_since = self.pause.pause_until(now, until)?;
        self.record_pause(resume_since, events);
        Ok(())
    }

    fn record_pause(&self, resume_since: Timestamp, events: &mut Vec<OracleEvent>) {
        warn!(oracle = ?self.oracle, resume_since, "report acceptance paused");
        events.push(OracleEvent::Paused {
            oracle: self.oracle,
            resume_since,
        });
    }

    /// Resume acceptance
    pub fn resume(
        &mut self,
        caller: Caller<'_>,
        now: Timestamp,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        caller.require(Capability::Resume)?;
        self.pause.resume(now)?;
        info!(oracle = ?self.oracle, "report acceptance resumed");
        events.push(OracleEvent::Resumed {
            oracle: self.oracle,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ChainParams;
    use oracle_core::effects::StaticCapabilities;

    const GENESIS: Timestamp = 1_000_000;
    // 32 slots * 12 s
    const EPOCH_SECS: u64 = 384;

    fn store() -> ReportStore {
        let clock = FrameClock::new(
            ChainParams::new(32, 12, GENESIS).unwrap(),
            FrameConfig::new(10, 2).unwrap(),
        );
        let mut store = ReportStore::new(OracleKind::ExitBus, clock, 1, 0);
        store.reporter = Some("member".into());
        store
    }

    fn caps() -> StaticCapabilities {
        StaticCapabilities::new()
            .grant_all(
                "member",
                [Capability::SubmitConsensusReport, Capability::SubmitData],
            )
            .grant_all(
                "admin",
                [
                    Capability::ManageFrameConfig,
                    Capability::ManageReporter,
                    Capability::ManageConsensusVersion,
                    Capability::Pause,
                    Capability::Resume,
                ],
            )
    }

    fn at_epoch(epoch: u64) -> Timestamp {
        GENESIS + epoch * EPOCH_SECS
    }

    #[test]
    fn test_submit_and_start() {
        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let mut store = store();
        let mut events = Vec::new();
        let now = at_epoch(10);
        let digest = Hash32::of(b"report");

        store.submit_report(caller, 319, digest, now, &mut events).unwrap();
        assert_eq!(store.digest_for(319), digest);
        store.check_data_admission(caller, 1, 319, digest).unwrap();
        assert_eq!(store.start_processing(now, &mut events).unwrap(), 0);
        assert!(store.processing_started());
        assert_eq!(
            store.start_processing(now, &mut events),
            Err(OracleError::AlreadyProcessed { ref_slot: 319 })
        );
        assert_eq!(
            store.submit_report(caller, 319, digest, now, &mut events),
            Err(OracleError::AlreadyProcessed { ref_slot: 319 })
        );
    }

    #[test]
    fn test_submission_preconditions_in_order() {
        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let mut store = store();
        let mut events = Vec::new();
        let now = at_epoch(10);

        assert_eq!(
            store.submit_report(caller, 320, Hash32::of(b"x"), now, &mut events),
            Err(OracleError::SlotMismatch {
                expected: 319,
                actual: 320
            })
        );
        assert_eq!(
            store.submit_report(caller, 319, Hash32::ZERO, now, &mut events),
            Err(OracleError::EmptyDigest)
        );
        // last slot of the frame is past the deadline slot's start time
        let late = at_epoch(12) - 1;
        assert!(matches!(
            store.submit_report(caller, 319, Hash32::of(b"x"), late, &mut events),
            Err(OracleError::DeadlineMissed { .. })
        ));
        assert!(events.is_empty());
    }

    #[test]
    fn test_only_reporter_may_submit() {
        let caps = caps();
        let admin = MemberId::new("admin");
        let mut store = store();
        let mut events = Vec::new();
        let err = store
            .submit_report(
                Caller::new(&admin, &caps),
                319,
                Hash32::of(b"x"),
                at_epoch(10),
                &mut events,
            )
            .unwrap_err();
        assert!(matches!(err, OracleError::Unauthorized { .. }));
    }

    #[test]
    fn test_missed_processing_warning() {
        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let mut store = store();
        let mut events = Vec::new();

        store
            .submit_report(caller, 319, Hash32::of(b"a"), at_epoch(10), &mut events)
            .unwrap();
        store
            .submit_report(caller, 383, Hash32::of(b"b"), at_epoch(12), &mut events)
            .unwrap();
        assert!(events.contains(&OracleEvent::ProcessingMissed {
            oracle: OracleKind::ExitBus,
            ref_slot: 319
        }));
    }

    #[test]
    fn test_discarded_report_replaced_warns_missed() {
        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let mut store = store();
        let mut events = Vec::new();

        store
            .submit_report(caller, 319, Hash32::of(b"a"), at_epoch(10), &mut events)
            .unwrap();
        store.discard_report(caller, 319, &mut events).unwrap();
        store
            .submit_report(caller, 383, Hash32::of(b"b"), at_epoch(12), &mut events)
            .unwrap();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, OracleEvent::ProcessingMissed { ref_slot: 319, .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_slot_regression_after_already_processed() {
        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let mut store = store();
        let mut events = Vec::new();
        let now = at_epoch(10);
        store.report = Some(ConsensusReport {
            digest: Hash32::of(b"later"),
            reference_slot: 383,
            deadline_time: at_epoch(14),
        });

        assert_eq!(
            store.submit_report(caller, 319, Hash32::of(b"a"), now, &mut events),
            Err(OracleError::SlotRegression {
                stored: 383,
                actual: 319
            })
        );

        store.last_processing_ref_slot = 319;
        assert_eq!(
            store.submit_report(caller, 319, Hash32::of(b"a"), now, &mut events),
            Err(OracleError::AlreadyProcessed { ref_slot: 319 })
        );
        assert!(events.is_empty());
        assert_eq!(store.digest_for(383), Hash32::of(b"later"));
    }

    #[test]
    fn test_resubmit_same_slot_replaces_without_warning() {
        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let mut store = store();
        let mut events = Vec::new();
        let now = at_epoch(10);

        store.submit_report(caller, 319, Hash32::of(b"a"), now, &mut events).unwrap();
        store.submit_report(caller, 319, Hash32::of(b"b"), now, &mut events).unwrap();
        assert_eq!(store.digest_for(319), Hash32::of(b"b"));
        assert!(!events
            .iter()
            .any(|e| matches!(e, OracleEvent::ProcessingMissed { .. })));
    }

    #[test]
    fn test_discard_blocks_processing() {
        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let mut store = store();
        let mut events = Vec::new();
        let now = at_epoch(10);
        let digest = Hash32::of(b"a");

        store.submit_report(caller, 319, digest, now, &mut events).unwrap();
        store.discard_report(caller, 319, &mut events).unwrap();
        assert_eq!(
            store.check_data_admission(caller, 1, 319, digest),
            Err(OracleError::NoConsensusReport)
        );
        assert_eq!(
            store.start_processing(now, &mut events),
            Err(OracleError::NoConsensusReport)
        );
    }

    #[test]
    fn test_data_admission_checks() {
        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let mut store = store();
        let mut events = Vec::new();
        let digest = Hash32::of(b"a");
        store
            .submit_report(caller, 319, digest, at_epoch(10), &mut events)
            .unwrap();

        assert_eq!(
            store.check_data_admission(caller, 2, 319, digest),
            Err(OracleError::UnexpectedConsensusVersion {
                expected: 1,
                actual: 2
            })
        );
        assert_eq!(
            store.check_data_admission(caller, 1, 318, digest),
            Err(OracleError::UnexpectedRefSlot {
                expected: 319,
                actual: 318
            })
        );
        assert!(matches!(
            store.check_data_admission(caller, 1, 319, Hash32::of(b"b")),
            Err(OracleError::UnexpectedDataHash { .. })
        ));
    }

    #[test]
    fn test_start_processing_after_deadline_fails() {
        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let mut store = store();
        let mut events = Vec::new();
        store
            .submit_report(caller, 319, Hash32::of(b"a"), at_epoch(10), &mut events)
            .unwrap();
        assert!(matches!(
            store.start_processing(at_epoch(12), &mut events),
            Err(OracleError::DeadlineMissed { .. })
        ));
        assert_eq!(store.last_processing_ref_slot, 0);
    }

    #[test]
    fn test_update_initial_epoch_only_in_future() {
        let caps = caps();
        let admin = MemberId::new("admin");
        let caller = Caller::new(&admin, &caps);
        let mut store = store();
        let mut events = Vec::new();

        store
            .update_initial_epoch(caller, 20, at_epoch(5), &mut events)
            .unwrap();
        assert_eq!(store.clock.config.initial_epoch(), 20);
        assert_eq!(
            store.update_initial_epoch(caller, 25, at_epoch(21), &mut events),
            Err(OracleError::InitialEpochAlreadyArrived)
        );
        assert_eq!(
            store.update_initial_epoch(caller, 6, at_epoch(7), &mut events),
            Err(OracleError::InitialEpochInPast { epoch: 6 })
        );
    }

    #[test]
    fn test_set_frame_config_keeps_current_reference_slot() {
        let caps = caps();
        let admin = MemberId::new("admin");
        let caller = Caller::new(&admin, &caps);
        let mut store = store();
        let mut events = Vec::new();
        let now = at_epoch(13);
        let before = store.current_frame(now).unwrap();

        store.set_frame_config(caller, 5, now, &mut events).unwrap();
        let after = store.current_frame(now).unwrap();
        assert_eq!(after.reference_slot, before.reference_slot);
        assert_eq!(after.deadline_slot, 17 * 32 - 1);
    }

    #[test]
    fn test_admin_requires_capability() {
        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let mut store = store();
        let mut events = Vec::new();
        assert!(matches!(
            store.pause_for(caller, 10, at_epoch(10), &mut events),
            Err(OracleError::Unauthorized { .. })
        ));
        assert!(matches!(
            store.set_reporter(caller, "other".into(), &mut events),
            Err(OracleError::Unauthorized { .. })
        ));
    }
}
