//! Local node: both oracles plus their persisted state
//!
//! State lives in a single JSON file next to the TOML configuration. Every
//! command loads it, runs one oracle step and writes it back only when the
//! step succeeded.

use crate::sinks::LogSinks;
use anyhow::{bail, Context, Result};
use oracle_core::effects::{Capability, Clock, StaticCapabilities, SystemClock};
use oracle_core::{MemberId, OracleConfigFile, OracleEvent, ReportLimits, Timestamp};
use oracle_reports::{
    AccountingOracle, AccountingState, Collaborators, ExitBusState, ExitRequestsOracle, Oracle,
    OracleConfig,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Capabilities granted to the administrator at `init`
pub const ADMIN_CAPABILITIES: [Capability; 5] = [
    Capability::ManageFrameConfig,
    Capability::ManageReporter,
    Capability::ManageConsensusVersion,
    Capability::Pause,
    Capability::Resume,
];

/// Capabilities granted to a configured reporter at `init`
pub const REPORTER_CAPABILITIES: [Capability; 2] =
    [Capability::SubmitConsensusReport, Capability::SubmitData];

/// Load, override from the environment and validate the configuration
pub fn load_config(path: &Path) -> Result<OracleConfig> {
    let mut config = OracleConfig::load_from_file(path)?;
    config.merge_with_env()?;
    config.validate()?;
    Ok(config)
}

/// Everything persisted between invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeState {
    /// Local capability table
    pub capabilities: StaticCapabilities,
    /// Exit request oracle state
    pub exit_bus: ExitBusState,
    /// Accounting oracle state
    pub accounting: AccountingState,
}

impl NodeState {
    /// Fresh state for `config` with `admin` holding every administrative
    /// capability
    pub fn from_config(config: &OracleConfig, admin: &MemberId) -> Result<Self> {
        let mut capabilities =
            StaticCapabilities::new().grant_all(admin.clone(), ADMIN_CAPABILITIES);
        for reporter in [&config.exit_bus.reporter, &config.accounting.reporter]
            .into_iter()
            .flatten()
        {
            capabilities = capabilities.grant_all(reporter.clone(), REPORTER_CAPABILITIES);
        }
        Ok(Self {
            capabilities,
            exit_bus: config.exit_bus_state()?,
            accounting: config.accounting_state()?,
        })
    }

    /// Read the state file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse state file {}", path.display()))
    }

    /// Write the state file through a temporary sibling
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, text)
            .with_context(|| format!("Failed to write state file {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace state file {}", path.display()))?;
        Ok(())
    }
}

/// Clock pinned to one timestamp, for `--now`
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Both oracles wired to logging collaborators
pub struct Node {
    /// Exit request oracle
    pub exit_bus: ExitRequestsOracle,
    /// Accounting oracle
    pub accounting: AccountingOracle,
    capabilities: StaticCapabilities,
}

impl Node {
    /// Build the oracles around loaded state
    pub fn new(state: NodeState, limits: ReportLimits, now: Option<Timestamp>) -> Self {
        let clock: Arc<dyn Clock> = match now {
            Some(timestamp) => Arc::new(FixedClock(timestamp)),
            None => Arc::new(SystemClock),
        };
        let sinks = Arc::new(LogSinks);
        let collaborators = Collaborators {
            capabilities: Arc::new(state.capabilities.clone()),
            registry: sinks.clone(),
            withdrawals: sinks.clone(),
            accounting: sinks,
            clock,
        };
        Self {
            exit_bus: Oracle::new(state.exit_bus, limits, collaborators.clone()),
            accounting: Oracle::new(state.accounting, limits, collaborators),
            capabilities: state.capabilities,
        }
    }

    /// Committed events of both oracles
    pub fn drain_events(&mut self) -> Vec<OracleEvent> {
        let mut events = self.exit_bus.drain_events();
        events.extend(self.accounting.drain_events());
        events
    }

    /// Give the oracles back as persistable state
    pub fn into_state(self) -> NodeState {
        NodeState {
            capabilities: self.capabilities,
            exit_bus: self.exit_bus.into_state(),
            accounting: self.accounting.into_state(),
        }
    }
}

/// Fail unless `--member` was given
pub fn require_member(member: Option<&MemberId>) -> Result<&MemberId> {
    match member {
        Some(member) => Ok(member),
        None => bail!("this command needs --member"),
    }
}
