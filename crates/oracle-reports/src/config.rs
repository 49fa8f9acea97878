//! Deployment configuration of both oracle instances
//!
//! ```toml
//! [chain]
//! slots_per_epoch = 32
//! seconds_per_slot = 12
//! genesis_time = 1606824023
//!
//! [exit_bus]
//! initial_epoch = 1
//! epochs_per_frame = 75
//! consensus_version = 1
//! reporter = "member-1"
//!
//! [accounting]
//! initial_epoch = 1
//! epochs_per_frame = 225
//! consensus_version = 1
//!
//! [limits]
//! max_exit_requests_per_report = 600
//! ```

use crate::accounting::AccountingState;
use crate::exit_bus::ExitBusState;
use oracle_consensus::{ChainParams, FrameClock, FrameConfig, ReportStore};
use oracle_core::{Epoch, MemberId, OracleConfigFile, OracleKind, ReportLimits, Result, Slot};
use serde::{Deserialize, Serialize};

/// Settings of one oracle instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSection {
    /// First epoch of frame 0, at least 1
    pub initial_epoch: Epoch,
    /// Frame length in epochs
    pub epochs_per_frame: u64,
    /// Version reports must carry
    #[serde(default = "default_consensus_version")]
    pub consensus_version: u64,
    /// Member allowed to submit consensus digests
    #[serde(default)]
    pub reporter: Option<MemberId>,
    /// Reference slot already processed at deployment
    #[serde(default)]
    pub last_processing_ref_slot: Slot,
}

fn default_consensus_version() -> u64 {
    1
}

impl OracleSection {
    fn with_frame(epochs_per_frame: u64) -> Self {
        Self {
            initial_epoch: 1,
            epochs_per_frame,
            consensus_version: default_consensus_version(),
            reporter: None,
            last_processing_ref_slot: 0,
        }
    }

    /// Frame layout of this instance
    pub fn frame_config(&self) -> Result<FrameConfig> {
        FrameConfig::new(self.initial_epoch, self.epochs_per_frame)
    }

    fn store(&self, oracle: OracleKind, chain: ChainParams) -> Result<ReportStore> {
        let clock = FrameClock::new(chain, self.frame_config()?);
        let mut store = ReportStore::new(
            oracle,
            clock,
            self.consensus_version,
            self.last_processing_ref_slot,
        );
        store.reporter = self.reporter.clone();
        Ok(store)
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Slot timing shared by both oracles
    #[serde(default = "default_chain")]
    pub chain: ChainParams,
    /// Exit request oracle
    #[serde(default = "default_exit_bus")]
    pub exit_bus: OracleSection,
    /// Accounting oracle
    #[serde(default = "default_accounting")]
    pub accounting: OracleSection,
    /// Report size limits
    #[serde(default)]
    pub limits: ReportLimits,
}

fn default_chain() -> ChainParams {
    ChainParams::MAINNET
}

fn default_exit_bus() -> OracleSection {
    OracleSection::with_frame(75)
}

fn default_accounting() -> OracleSection {
    OracleSection::with_frame(225)
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            chain: default_chain(),
            exit_bus: default_exit_bus(),
            accounting: default_accounting(),
            limits: ReportLimits::default(),
        }
    }
}

impl OracleConfigFile for OracleConfig {
    fn validate(&self) -> Result<()> {
        self.exit_bus.frame_config()?;
        self.accounting.frame_config()?;
        self.limits.validate()
    }
}

impl OracleConfig {
    /// Initial state of the exit request oracle
    pub fn exit_bus_state(&self) -> Result<ExitBusState> {
        Ok(ExitBusState::new(self.exit_bus.store(OracleKind::ExitBus, self.chain)?))
    }

    /// Initial state of the accounting oracle
    pub fn accounting_state(&self) -> Result<AccountingState> {
        Ok(AccountingState::new(
            self.accounting.store(OracleKind::Accounting, self.chain)?,
        ))
    }
}
