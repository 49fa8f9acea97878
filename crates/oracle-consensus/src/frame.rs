//! Frame Clock
//!
//! Pure functions mapping wall-clock time to slots, epochs and reporting
//! frames. A frame spans `epochs_per_frame` epochs starting at
//! `initial_epoch + index * epochs_per_frame`; its reference slot is the last
//! slot before the frame starts and its deadline slot is the last slot before
//! the next frame starts.
//!
//! All arithmetic is checked. Zero divisors are rejected when parameters are
//! constructed, so the accessors below never divide by zero.

use oracle_core::{Epoch, OracleError, Result, Slot, Timestamp};
use serde::{Deserialize, Serialize};

/// Immutable beacon chain timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChainParams", into = "RawChainParams")]
pub struct ChainParams {
    slots_per_epoch: u64,
    seconds_per_slot: u64,
    genesis_time: Timestamp,
}

#[derive(Serialize, Deserialize)]
struct RawChainParams {
    slots_per_epoch: u64,
    seconds_per_slot: u64,
    genesis_time: Timestamp,
}

impl TryFrom<RawChainParams> for ChainParams {
    type Error = OracleError;

    fn try_from(raw: RawChainParams) -> Result<Self> {
        ChainParams::new(raw.slots_per_epoch, raw.seconds_per_slot, raw.genesis_time)
    }
}

impl From<ChainParams> for RawChainParams {
    fn from(params: ChainParams) -> Self {
        Self {
            slots_per_epoch: params.slots_per_epoch,
            seconds_per_slot: params.seconds_per_slot,
            genesis_time: params.genesis_time,
        }
    }
}

impl ChainParams {
    /// Ethereum mainnet timing
    pub const MAINNET: ChainParams = ChainParams {
        slots_per_epoch: 32,
        seconds_per_slot: 12,
        genesis_time: 1_606_824_023,
    };

    /// Create chain parameters; every value must be positive.
    pub fn new(slots_per_epoch: u64, seconds_per_slot: u64, genesis_time: Timestamp) -> Result<Self> {
        if slots_per_epoch == 0 {
            return Err(OracleError::invalid_config("slots_per_epoch must be positive"));
        }
        if seconds_per_slot == 0 {
            return Err(OracleError::invalid_config("seconds_per_slot must be positive"));
        }
        if genesis_time == 0 {
            return Err(OracleError::invalid_config("genesis_time must be positive"));
        }
        Ok(Self {
            slots_per_epoch,
            seconds_per_slot,
            genesis_time,
        })
    }

    /// Slots per epoch
    pub fn slots_per_epoch(&self) -> u64 {
        self.slots_per_epoch
    }

    /// Seconds per slot
    pub fn seconds_per_slot(&self) -> u64 {
        self.seconds_per_slot
    }

    /// Genesis timestamp
    pub fn genesis_time(&self) -> Timestamp {
        self.genesis_time
    }

    /// `slot / slots_per_epoch`
    pub fn epoch_at_slot(&self, slot: Slot) -> Epoch {
        slot / self.slots_per_epoch
    }

    /// `(timestamp - genesis_time) / seconds_per_slot`
    pub fn slot_at_timestamp(&self, timestamp: Timestamp) -> Result<Slot> {
        let since_genesis = timestamp
            .checked_sub(self.genesis_time)
            .ok_or(OracleError::ChainNotStarted { timestamp })?;
        Ok(since_genesis / self.seconds_per_slot)
    }

    /// Epoch containing `timestamp`
    pub fn epoch_at_timestamp(&self, timestamp: Timestamp) -> Result<Epoch> {
        Ok(self.epoch_at_slot(self.slot_at_timestamp(timestamp)?))
    }

    /// First slot of `epoch`
    pub fn start_slot_of_epoch(&self, epoch: Epoch) -> Result<Slot> {
        epoch
            .checked_mul(self.slots_per_epoch)
            .ok_or_else(|| OracleError::overflow("start slot of epoch"))
    }

    /// Timestamp at the start of `slot`
    pub fn timestamp_at_slot(&self, slot: Slot) -> Result<Timestamp> {
        slot.checked_mul(self.seconds_per_slot)
            .and_then(|offset| offset.checked_add(self.genesis_time))
            .ok_or_else(|| OracleError::overflow("timestamp at slot"))
    }
}

/// Administrative frame layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFrameConfig", into = "RawFrameConfig")]
pub struct FrameConfig {
    initial_epoch: Epoch,
    epochs_per_frame: u64,
}

#[derive(Serialize, Deserialize)]
struct RawFrameConfig {
    initial_epoch: Epoch,
    epochs_per_frame: u64,
}

impl TryFrom<RawFrameConfig> for FrameConfig {
    type Error = OracleError;

    fn try_from(raw: RawFrameConfig) -> Result<Self> {
        FrameConfig::new(raw.initial_epoch, raw.epochs_per_frame)
    }
}

impl From<FrameConfig> for RawFrameConfig {
    fn from(config: FrameConfig) -> Self {
        Self {
            initial_epoch: config.initial_epoch,
            epochs_per_frame: config.epochs_per_frame,
        }
    }
}

impl FrameConfig {
    /// Create a frame config.
    ///
    /// `initial_epoch` must be at least 1 so that frame 0 has a reference slot.
    pub fn new(initial_epoch: Epoch, epochs_per_frame: u64) -> Result<Self> {
        if epochs_per_frame == 0 {
            return Err(OracleError::invalid_config("epochs_per_frame must be positive"));
        }
        if initial_epoch == 0 {
            return Err(OracleError::invalid_config("initial_epoch must be positive"));
        }
        Ok(Self {
            initial_epoch,
            epochs_per_frame,
        })
    }

    /// First epoch of frame 0
    pub fn initial_epoch(&self) -> Epoch {
        self.initial_epoch
    }

    /// Frame length in epochs
    pub fn epochs_per_frame(&self) -> u64 {
        self.epochs_per_frame
    }
}

/// A reporting frame derived from the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsensusFrame {
    /// Frame index counted from `initial_epoch`
    pub index: u64,
    /// Slot the frame's report describes
    pub reference_slot: Slot,
    /// Last slot at which the frame's report may start processing
    pub deadline_slot: Slot,
}

/// Chain parameters plus frame layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameClock {
    /// Chain timing
    pub chain: ChainParams,
    /// Frame layout
    pub config: FrameConfig,
}

impl FrameClock {
    /// Combine chain parameters and a frame layout
    pub fn new(chain: ChainParams, config: FrameConfig) -> Self {
        Self { chain, config }
    }

    /// Index of the frame containing `timestamp`.
    ///
    /// Fails with `ChainNotStarted` before genesis or before `initial_epoch`.
    pub fn frame_index(&self, timestamp: Timestamp) -> Result<u64> {
        let epoch = self.chain.epoch_at_timestamp(timestamp)?;
        let since_initial = epoch
            .checked_sub(self.config.initial_epoch)
            .ok_or(OracleError::ChainNotStarted { timestamp })?;
        Ok(since_initial / self.config.epochs_per_frame)
    }

    /// First epoch of frame `index`
    pub fn frame_start_epoch_at_index(&self, index: u64) -> Result<Epoch> {
        index
            .checked_mul(self.config.epochs_per_frame)
            .and_then(|offset| offset.checked_add(self.config.initial_epoch))
            .ok_or_else(|| OracleError::overflow("frame start epoch"))
    }

    /// First epoch of the frame containing `timestamp`
    pub fn frame_start_epoch(&self, timestamp: Timestamp) -> Result<Epoch> {
        self.frame_start_epoch_at_index(self.frame_index(timestamp)?)
    }

    /// Frame `index` with its reference and deadline slots
    pub fn frame_at_index(&self, index: u64) -> Result<ConsensusFrame> {
        let start_epoch = self.frame_start_epoch_at_index(index)?;
        let next_start_epoch = start_epoch
            .checked_add(self.config.epochs_per_frame)
            .ok_or_else(|| OracleError::overflow("next frame start epoch"))?;
        // start epochs are >= initial_epoch >= 1, so the start slots are positive
        let reference_slot = self.chain.start_slot_of_epoch(start_epoch)? - 1;
        let deadline_slot = self.chain.start_slot_of_epoch(next_start_epoch)? - 1;
        Ok(ConsensusFrame {
            index,
            reference_slot,
            deadline_slot,
        })
    }

    /// Frame containing `timestamp`
    pub fn current_frame(&self, timestamp: Timestamp) -> Result<ConsensusFrame> {
        self.frame_at_index(self.frame_index(timestamp)?)
    }

    /// Timestamp after which a frame's report can no longer start processing
    pub fn deadline_time(&self, frame: &ConsensusFrame) -> Result<Timestamp> {
        self.chain.timestamp_at_slot(frame.deadline_slot)
    }

    /// Reference slot of frame 0 under a hypothetical initial epoch
    pub fn initial_ref_slot(&self, initial_epoch: Epoch) -> Result<Slot> {
        let start = self.chain.start_slot_of_epoch(initial_epoch)?;
        start
            .checked_sub(1)
            .ok_or_else(|| OracleError::invalid_config("initial_epoch must be positive"))
    }
}
