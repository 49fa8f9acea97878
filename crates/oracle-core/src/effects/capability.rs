//! Capability check seam
//!
//! Authorization lives outside the subsystem. Every privileged entry point
//! asks a single injected [`CapabilityCheck`] whether the caller holds the
//! required [`Capability`]; the consensus and decoding logic never sees roles.

use crate::MemberId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Privileges checked by the subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Submit consensus digests (also requires being the designated reporter)
    SubmitConsensusReport,
    /// Submit report data and extra-data chunks
    SubmitData,
    /// Change frame configuration and initial epoch
    ManageFrameConfig,
    /// Rotate the designated reporter
    ManageReporter,
    /// Change the accepted consensus version
    ManageConsensusVersion,
    /// Pause report acceptance
    Pause,
    /// Resume report acceptance
    Resume,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::SubmitConsensusReport => "submit-consensus-report",
            Capability::SubmitData => "submit-data",
            Capability::ManageFrameConfig => "manage-frame-config",
            Capability::ManageReporter => "manage-reporter",
            Capability::ManageConsensusVersion => "manage-consensus-version",
            Capability::Pause => "pause",
            Capability::Resume => "resume",
        };
        f.write_str(name)
    }
}

/// Boolean capability oracle provided by the host
pub trait CapabilityCheck: Send + Sync {
    /// Whether `caller` holds `capability`
    fn has_capability(&self, caller: &MemberId, capability: Capability) -> bool;
}

/// Fail with `Unauthorized` unless `caller` holds `capability`
pub fn require(
    checker: &dyn CapabilityCheck,
    caller: &MemberId,
    capability: Capability,
) -> crate::Result<()> {
    if !checker.has_capability(caller, capability) {
        return Err(crate::OracleError::unauthorized(caller, capability));
    }
    Ok(())
}

/// Static grant table, used by the CLI and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticCapabilities {
    grants: BTreeMap<MemberId, BTreeSet<Capability>>,
}

impl StaticCapabilities {
    /// Empty table: nobody holds anything
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `capability` to `member`
    pub fn grant(mut self, member: impl Into<MemberId>, capability: Capability) -> Self {
        self.grants
            .entry(member.into())
            .or_default()
            .insert(capability);
        self
    }

    /// Grant every capability in `capabilities` to `member`
    pub fn grant_all(
        mut self,
        member: impl Into<MemberId>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        self.grants
            .entry(member.into())
            .or_default()
            .extend(capabilities);
        self
    }
}

impl CapabilityCheck for StaticCapabilities {
    fn has_capability(&self, caller: &MemberId, capability: Capability) -> bool {
        self.grants
            .get(caller)
            .is_some_and(|caps| caps.contains(&capability))
    }
}
