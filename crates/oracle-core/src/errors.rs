//! Unified error system for the oracle subsystem
//!
//! Every entry point aborts the whole step on the first error, so a single
//! flat error type is enough. Variants carry the values needed to diagnose a
//! misbehaving report producer; [`OracleError::category`] groups them the way
//! callers react to them.

use serde::{Deserialize, Serialize};

/// Broad classes of failures, matching how callers are expected to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Expected operational condition; resubmit against the correct frame.
    Temporal,
    /// Caller lacks the required capability.
    Authorization,
    /// The report producer sent bytes that do not decode or do not match.
    MalformedPayload,
    /// The report regresses previously accepted state.
    Monotonicity,
    /// Invalid configuration or administrative argument.
    Configuration,
    /// An external collaborator rejected a call.
    Collaborator,
}

/// Unified error type for all oracle operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum OracleError {
    // --- temporal ---
    /// Submission targets a slot other than the current frame's reference slot
    #[error("Reference slot mismatch: expected {expected}, got {actual}")]
    SlotMismatch {
        /// Value required
        expected: u64,
        /// Value received
        actual: u64,
    },

    /// The processing deadline of the frame or report has passed
    #[error("Processing deadline missed: deadline {deadline}, now {now}")]
    DeadlineMissed {
        /// Deadline timestamp
        deadline: u64,
        /// Time of the call
        now: u64,
    },

    /// The chain (or the first frame) has not started yet at the given time
    #[error("Chain not started at timestamp {timestamp}")]
    ChainNotStarted {
        /// Time of the call
        timestamp: u64,
    },

    /// Processing for this reference slot has already begun
    #[error("Reference slot {ref_slot} already processed")]
    AlreadyProcessed {
        /// Reference slot concerned
        ref_slot: u64,
    },

    /// Submission for an earlier slot than the stored report
    #[error("Reference slot regression: stored {stored}, got {actual}")]
    SlotRegression {
        /// Reference slot of the stored report
        stored: u64,
        /// Value received
        actual: u64,
    },

    /// No consensus report is stored
    #[error("No consensus report to process")]
    NoConsensusReport,

    /// Report data targets a different slot than the consensus report
    #[error("Unexpected reference slot: consensus {expected}, data {actual}")]
    UnexpectedRefSlot {
        /// Value required
        expected: u64,
        /// Value received
        actual: u64,
    },

    /// Acceptance of new reports is paused
    #[error("Reporting is paused until {resume_since}")]
    Paused {
        /// First timestamp at which reporting resumes
        resume_since: u64,
    },

    /// Resume requested while not paused
    #[error("Reporting is not paused")]
    NotPaused,

    // --- authorization ---
    /// Caller is not allowed to perform the operation
    #[error("Permission denied: {caller} lacks {capability}")]
    Unauthorized {
        /// Calling member
        caller: String,
        /// Missing capability
        capability: String,
    },

    // --- malformed payload ---
    /// Buffer length is not a multiple of the record width, or is truncated
    #[error("Payload length {length} does not fit records of {width} bytes")]
    LengthMismatch {
        /// Payload length in bytes
        length: usize,
        /// Record width in bytes
        width: usize,
    },

    /// Decoded item count differs from the declared one
    #[error("Declared {declared} items, payload carries {actual}")]
    CountMismatch {
        /// Declared count
        declared: u64,
        /// Value received
        actual: u64,
    },

    /// Composite key not strictly greater than its predecessor
    #[error("Record {position} out of order")]
    OutOfOrder {
        /// Zero-based record position
        position: u64,
    },

    /// Structurally invalid record (zero module id, empty item, truncated body)
    #[error("Invalid record {position}: {reason}")]
    InvalidRecord {
        /// Zero-based record position
        position: u64,
        /// What is wrong
        reason: String,
    },

    /// Terminal chunk reached with a different item total, or total reached early
    #[error("Extra data item count mismatch: declared {declared}, processed {processed}")]
    ItemCountMismatch {
        /// Declared count
        declared: u64,
        /// Items processed
        processed: u64,
    },

    /// Consensus digest is zero
    #[error("Empty report digest")]
    EmptyDigest,

    /// Report data does not hash to the consensus digest
    #[error("Unexpected data hash: consensus {expected}, data {actual}")]
    UnexpectedDataHash {
        /// Value required
        expected: String,
        /// Value received
        actual: String,
    },

    /// Extra-data chunk does not hash to the expected pointer
    #[error("Unexpected extra data chunk hash: expected {expected}, got {actual}")]
    UnexpectedChunkHash {
        /// Value required
        expected: String,
        /// Value received
        actual: String,
    },

    /// Extra-data item index breaks the sequence
    #[error("Unexpected extra data item index: expected {expected}, got {actual}")]
    UnexpectedItemIndex {
        /// Value required
        expected: u64,
        /// Value received
        actual: u64,
    },

    /// Data format not supported by the processor
    #[error("Unsupported data format {format}")]
    UnsupportedFormat {
        /// Format received
        format: u32,
    },

    /// Extra-data item type not supported
    #[error("Unsupported extra data item type {item_type} at item {index}")]
    UnsupportedItemType {
        /// Item index
        index: u64,
        /// Item type received
        item_type: u16,
    },

    /// Extra data submitted in a format other than the declared one
    #[error("Unexpected extra data format: declared {expected}, submitted {actual}")]
    UnexpectedExtraDataFormat {
        /// Value required
        expected: u32,
        /// Value received
        actual: u32,
    },

    /// Extra-data hash/count inconsistent with the declared format
    #[error("Invalid extra data declaration: {reason}")]
    InvalidExtraDataDeclaration {
        /// What is wrong
        reason: String,
    },

    /// Per-module exited validator data is malformed
    #[error("Invalid exited validators data: {reason}")]
    InvalidExitedValidatorsData {
        /// What is wrong
        reason: String,
    },

    /// Too many items in one report or chunk
    #[error("Too many items: {actual} exceeds limit {limit}")]
    TooManyItems {
        /// Configured limit
        limit: u64,
        /// Value received
        actual: u64,
    },

    /// Report carries a different consensus version
    #[error("Unexpected consensus version: expected {expected}, got {actual}")]
    UnexpectedConsensusVersion {
        /// Value required
        expected: u64,
        /// Value received
        actual: u64,
    },

    /// Extra data received before the main report of the frame
    #[error("Main report data not submitted for the current frame")]
    MainDataNotSubmitted,

    /// Extra data for this frame is already complete
    #[error("Extra data already processed")]
    ExtraDataAlreadyProcessed,

    /// Report could not be serialized for hashing
    #[error("Serialization error: {message}")]
    Serialization {
        /// Detail
        message: String,
    },

    // --- monotonicity ---
    /// Validator index does not exceed the one previously requested
    #[error(
        "Validator index must increase for module {module_id} operator {operator_id}: stored {stored_index}, got {new_index}"
    )]
    IndexMustIncrease {
        /// Staking module
        module_id: u32,
        /// Node operator
        operator_id: u64,
        /// Last requested index
        stored_index: u64,
        /// Index in the report
        new_index: u64,
    },

    // --- configuration ---
    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Detail
        message: String,
    },

    /// The current initial epoch is no longer in the future
    #[error("Initial epoch already arrived")]
    InitialEpochAlreadyArrived,

    /// The requested initial epoch is not in the future
    #[error("Initial epoch {epoch} is not in the future")]
    InitialEpochInPast {
        /// Requested epoch
        epoch: u64,
    },

    /// The requested initial epoch would place frame 0 behind processing
    #[error("Initial reference slot {ref_slot} is behind processing slot {processing}")]
    InitialRefSlotBehindProcessing {
        /// Reference slot concerned
        ref_slot: u64,
        /// Last processing reference slot
        processing: u64,
    },

    /// Query argument exceeds the wire width of its field
    #[error("Argument {name} out of bounds: {value}")]
    ArgumentOutOfBounds {
        /// Argument name
        name: String,
        /// Argument value
        value: u64,
    },

    /// Checked arithmetic overflowed
    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow {
        /// Quantity that overflowed
        context: String,
    },

    // --- collaborators ---
    /// An external collaborator call failed
    #[error("{name} failed: {message}")]
    Collaborator {
        /// Argument name
        name: String,
        /// Detail
        message: String,
    },
}

impl OracleError {
    /// Create an invalid record error
    pub fn invalid_record(position: u64, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            position,
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an authorization error
    pub fn unauthorized(caller: impl ToString, capability: impl ToString) -> Self {
        Self::Unauthorized {
            caller: caller.to_string(),
            capability: capability.to_string(),
        }
    }

    /// Create a collaborator failure
    pub fn collaborator(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid extra data declaration error
    pub fn invalid_extra_data_declaration(reason: impl Into<String>) -> Self {
        Self::InvalidExtraDataDeclaration {
            reason: reason.into(),
        }
    }

    /// Create an invalid exited validators data error
    pub fn invalid_exited_validators(reason: impl Into<String>) -> Self {
        Self::InvalidExitedValidatorsData {
            reason: reason.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an overflow error
    pub fn overflow(context: &str) -> Self {
        Self::ArithmeticOverflow {
            context: context.to_owned(),
        }
    }

    /// Create an out-of-bounds argument error
    pub fn out_of_bounds(name: &str, value: u64) -> Self {
        Self::ArgumentOutOfBounds {
            name: name.to_owned(),
            value,
        }
    }

    /// Failure class of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SlotMismatch { .. }
            | Self::DeadlineMissed { .. }
            | Self::ChainNotStarted { .. }
            | Self::AlreadyProcessed { .. }
            | Self::SlotRegression { .. }
            | Self::NoConsensusReport
            | Self::UnexpectedRefSlot { .. }
            | Self::Paused { .. }
            | Self::NotPaused => ErrorCategory::Temporal,
            Self::Unauthorized { .. } => ErrorCategory::Authorization,
            Self::LengthMismatch { .. }
            | Self::CountMismatch { .. }
            | Self::OutOfOrder { .. }
            | Self::InvalidRecord { .. }
            | Self::ItemCountMismatch { .. }
            | Self::EmptyDigest
            | Self::UnexpectedDataHash { .. }
            | Self::UnexpectedChunkHash { .. }
            | Self::UnexpectedItemIndex { .. }
            | Self::UnsupportedFormat { .. }
            | Self::UnsupportedItemType { .. }
            | Self::UnexpectedExtraDataFormat { .. }
            | Self::InvalidExtraDataDeclaration { .. }
            | Self::InvalidExitedValidatorsData { .. }
            | Self::TooManyItems { .. }
            | Self::UnexpectedConsensusVersion { .. }
            | Self::MainDataNotSubmitted
            | Self::ExtraDataAlreadyProcessed
            | Self::Serialization { .. } => ErrorCategory::MalformedPayload,
            Self::IndexMustIncrease { .. } => ErrorCategory::Monotonicity,
            Self::InvalidConfig { .. }
            | Self::InitialEpochAlreadyArrived
            | Self::InitialEpochInPast { .. }
            | Self::InitialRefSlotBehindProcessing { .. }
            | Self::ArgumentOutOfBounds { .. }
            | Self::ArithmeticOverflow { .. } => ErrorCategory::Configuration,
            Self::Collaborator { .. } => ErrorCategory::Collaborator,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::SlotMismatch { .. } => "oracle_slot_mismatch",
            Self::DeadlineMissed { .. } => "oracle_deadline_missed",
            Self::ChainNotStarted { .. } => "oracle_chain_not_started",
            Self::AlreadyProcessed { .. } => "oracle_already_processed",
            Self::SlotRegression { .. } => "oracle_slot_regression",
            Self::NoConsensusReport => "oracle_no_consensus_report",
            Self::UnexpectedRefSlot { .. } => "oracle_unexpected_ref_slot",
            Self::Paused { .. } => "oracle_paused",
            Self::NotPaused => "oracle_not_paused",
            Self::Unauthorized { .. } => "oracle_unauthorized",
            Self::LengthMismatch { .. } => "oracle_length_mismatch",
            Self::CountMismatch { .. } => "oracle_count_mismatch",
            Self::OutOfOrder { .. } => "oracle_out_of_order",
            Self::InvalidRecord { .. } => "oracle_invalid_record",
            Self::ItemCountMismatch { .. } => "oracle_item_count_mismatch",
            Self::EmptyDigest => "oracle_empty_digest",
            Self::UnexpectedDataHash { .. } => "oracle_unexpected_data_hash",
            Self::UnexpectedChunkHash { .. } => "oracle_unexpected_chunk_hash",
            Self::UnexpectedItemIndex { .. } => "oracle_unexpected_item_index",
            Self::UnsupportedFormat { .. } => "oracle_unsupported_format",
            Self::UnsupportedItemType { .. } => "oracle_unsupported_item_type",
            Self::UnexpectedExtraDataFormat { .. } => "oracle_unexpected_extra_data_format",
            Self::InvalidExtraDataDeclaration { .. } => "oracle_invalid_extra_data_declaration",
            Self::InvalidExitedValidatorsData { .. } => "oracle_invalid_exited_validators_data",
            Self::TooManyItems { .. } => "oracle_too_many_items",
            Self::UnexpectedConsensusVersion { .. } => "oracle_unexpected_consensus_version",
            Self::MainDataNotSubmitted => "oracle_main_data_not_submitted",
            Self::ExtraDataAlreadyProcessed => "oracle_extra_data_already_processed",
            Self::Serialization { .. } => "oracle_serialization",
            Self::IndexMustIncrease { .. } => "oracle_index_must_increase",
            Self::InvalidConfig { .. } => "oracle_invalid_config",
            Self::InitialEpochAlreadyArrived => "oracle_initial_epoch_already_arrived",
            Self::InitialEpochInPast { .. } => "oracle_initial_epoch_in_past",
            Self::InitialRefSlotBehindProcessing { .. } => "oracle_initial_ref_slot_behind",
            Self::ArgumentOutOfBounds { .. } => "oracle_argument_out_of_bounds",
            Self::ArithmeticOverflow { .. } => "oracle_arithmetic_overflow",
            Self::Collaborator { .. } => "oracle_collaborator_failed",
        }
    }
}

/// Standard Result type for oracle operations
pub type Result<T> = std::result::Result<T, OracleError>;

impl From<std::io::Error> for OracleError {
    fn from(err: std::io::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl From<toml::de::Error> for OracleError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid_config(format!("Invalid TOML: {err}"))
    }
}
