//! Administrative commands

use super::OracleArg;
use crate::node::Node;
use anyhow::Result;
use clap::Subcommand;
use oracle_core::{Epoch, MemberId, Result as OracleResult, Timestamp};
use oracle_reports::{Oracle, OracleState};

/// Administrative commands, each naming its oracle
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Change the frame length, re-anchored at the current frame
    SetFrame {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,

        /// New frame length in epochs
        #[arg(long)]
        epochs_per_frame: u64,
    },

    /// Move the initial epoch while it is still in the future
    UpdateInitialEpoch {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,

        /// New initial epoch
        #[arg(long)]
        epoch: Epoch,
    },

    /// Rotate the designated reporter
    SetReporter {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,

        /// New reporter member
        #[arg(long)]
        reporter: String,
    },

    /// Change the consensus version reports must carry
    SetVersion {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,

        /// New consensus version
        #[arg(long)]
        version: u64,
    },

    /// Pause report acceptance for a number of seconds
    PauseFor {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,

        /// Pause length in seconds
        #[arg(long)]
        seconds: u64,
    },

    /// Pause report acceptance until a timestamp, inclusive
    PauseUntil {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,

        /// Last paused timestamp
        #[arg(long)]
        until: Timestamp,
    },

    /// Resume report acceptance
    Resume {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,
    },
}

impl AdminCommand {
    /// Oracle the command applies to
    pub fn oracle(&self) -> OracleArg {
        match self {
            AdminCommand::SetFrame { oracle, .. }
            | AdminCommand::UpdateInitialEpoch { oracle, .. }
            | AdminCommand::SetReporter { oracle, .. }
            | AdminCommand::SetVersion { oracle, .. }
            | AdminCommand::PauseFor { oracle, .. }
            | AdminCommand::PauseUntil { oracle, .. }
            | AdminCommand::Resume { oracle } => *oracle,
        }
    }
}

fn apply<S: OracleState>(cmd: AdminCommand, oracle: &mut Oracle<S>, member: &MemberId) -> OracleResult<()> {
    match cmd {
        AdminCommand::SetFrame {
            epochs_per_frame, ..
        } => oracle.set_frame_config(member, epochs_per_frame),
        AdminCommand::UpdateInitialEpoch { epoch, .. } => oracle.update_initial_epoch(member, epoch),
        AdminCommand::SetReporter { reporter, .. } => {
            oracle.set_reporter(member, MemberId::new(reporter))
        }
        AdminCommand::SetVersion { version, .. } => oracle.set_consensus_version(member, version),
        AdminCommand::PauseFor { seconds, .. } => oracle.pause_for(member, seconds),
        AdminCommand::PauseUntil { until, .. } => oracle.pause_until(member, until),
        AdminCommand::Resume { .. } => oracle.resume(member),
    }
}

/// Run an administrative command as `member`
pub fn handle_admin_command(cmd: AdminCommand, node: &mut Node, member: &MemberId) -> Result<()> {
    match cmd.oracle() {
        OracleArg::ExitBus => apply(cmd, &mut node.exit_bus, member)?,
        OracleArg::Accounting => apply(cmd, &mut node.accounting, member)?,
    }
    Ok(())
}
