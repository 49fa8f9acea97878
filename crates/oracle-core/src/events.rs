//! Domain events emitted by committed steps
//!
//! Events are buffered inside a step and only published when the step
//! commits, so a failed step never leaves a trace in the event log.

use crate::{Hash32, MemberId, ModuleId, OperatorId, Slot, Timestamp, ValidatorIndex};
use serde::{Deserialize, Serialize};

/// Which oracle instance emitted an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OracleKind {
    /// Validator exit request oracle
    ExitBus,
    /// Accounting oracle (main report plus extra data)
    Accounting,
}

/// Event emitted on successful state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleEvent {
    /// A consensus digest was stored for a reference slot
    ReportSubmitted {
        /// Emitting oracle
        oracle: OracleKind,
        /// Reference slot concerned
        ref_slot: Slot,
        /// Report digest
        digest: Hash32,
        /// Processing deadline
        deadline_time: Timestamp,
    },
    /// The stored digest was withdrawn before processing
    ReportDiscarded {
        /// Emitting oracle
        oracle: OracleKind,
        /// Reference slot concerned
        ref_slot: Slot,
        /// Report digest
        digest: Hash32,
    },
    /// A stored report was replaced without ever being processed
    ProcessingMissed {
        /// Emitting oracle
        oracle: OracleKind,
        /// Reference slot concerned
        ref_slot: Slot,
    },
    /// Processing of a report began
    ProcessingStarted {
        /// Emitting oracle
        oracle: OracleKind,
        /// Reference slot concerned
        ref_slot: Slot,
        /// Report digest
        digest: Hash32,
    },
    /// One validator exit request was accepted
    ValidatorExitRequest {
        /// Staking module
        module_id: ModuleId,
        /// Node operator
        operator_id: OperatorId,
        /// Validator to exit
        validator_index: ValidatorIndex,
        /// Validator public key, 0x hex
        pubkey: String,
        /// Time of the call
        timestamp: Timestamp,
    },
    /// A new accounting report started while extra data was incomplete
    ExtraDataIncomplete {
        /// Reference slot concerned
        ref_slot: Slot,
        /// Items processed so far
        items_processed: u64,
        /// Declared item total
        items_count: u64,
    },
    /// An extra-data chunk (or the empty marker) was applied
    ExtraDataSubmitted {
        /// Reference slot concerned
        ref_slot: Slot,
        /// Items processed so far
        items_processed: u64,
        /// Declared item total
        items_count: u64,
    },
    /// Frame configuration changed
    FrameConfigSet {
        /// Emitting oracle
        oracle: OracleKind,
        /// First epoch of frame 0
        initial_epoch: u64,
        /// Frame length in epochs
        epochs_per_frame: u64,
    },
    /// Designated reporter rotated
    ReporterSet {
        /// Emitting oracle
        oracle: OracleKind,
        /// Previous value
        previous: Option<MemberId>,
        /// New reporter
        reporter: MemberId,
    },
    /// Consensus version changed
    ConsensusVersionSet {
        /// Emitting oracle
        oracle: OracleKind,
        /// Previous value
        previous: u64,
        /// New consensus version
        version: u64,
    },
    /// Report acceptance paused
    Paused {
        /// Emitting oracle
        oracle: OracleKind,
        /// First timestamp at which reporting resumes
        resume_since: Timestamp,
    },
    /// Report acceptance resumed
    Resumed {
        /// Emitting oracle
        oracle: OracleKind,
    },
}
