//! Subcommands
//!
//! Each submodule owns one clap command tree and a handler that runs it
//! against a loaded [`crate::node::Node`].

pub mod admin;
pub mod query;
pub mod submit;

use anyhow::Result;
use clap::ValueEnum;
use oracle_core::effects::Capability;
use serde::Serialize;
use std::io::Write;

/// Which oracle a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OracleArg {
    /// Validator exit request oracle
    ExitBus,
    /// Accounting oracle
    Accounting,
}

/// Capability names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CapabilityArg {
    /// Store consensus digests
    SubmitConsensusReport,
    /// Submit report data and extra data
    SubmitData,
    /// Change frame layout
    ManageFrameConfig,
    /// Rotate the reporter
    ManageReporter,
    /// Change the consensus version
    ManageConsensusVersion,
    /// Pause report acceptance
    Pause,
    /// Resume report acceptance
    Resume,
}

impl From<CapabilityArg> for Capability {
    fn from(arg: CapabilityArg) -> Self {
        match arg {
            CapabilityArg::SubmitConsensusReport => Capability::SubmitConsensusReport,
            CapabilityArg::SubmitData => Capability::SubmitData,
            CapabilityArg::ManageFrameConfig => Capability::ManageFrameConfig,
            CapabilityArg::ManageReporter => Capability::ManageReporter,
            CapabilityArg::ManageConsensusVersion => Capability::ManageConsensusVersion,
            CapabilityArg::Pause => Capability::Pause,
            CapabilityArg::Resume => Capability::Resume,
        }
    }
}

/// Write `value` as pretty JSON
pub(crate) fn print_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}
