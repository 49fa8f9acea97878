//! Read-only queries

use super::{print_json, OracleArg};
use crate::node::Node;
use anyhow::Result;
use clap::Subcommand;
use oracle_consensus::ConsensusReport;
use oracle_core::{MemberId, Slot, Timestamp};
use oracle_reports::{
    AccountingProcessingView, ExitBusProcessingView, ExtraDataProcessingState, Oracle, OracleState,
};
use serde::Serialize;
use std::io::Write;

/// Read-only queries
#[derive(Debug, Subcommand)]
pub enum QueryCommand {
    /// Current frame of an oracle
    Frame {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,
    },

    /// Consensus and processing state of an oracle
    Status {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,
    },

    /// Last requested validator index per operator (-1 if none)
    LastRequested {
        /// Staking module id
        #[arg(long)]
        module: u32,

        /// Comma-separated node operator ids
        #[arg(long, value_delimiter = ',', required = true)]
        operators: Vec<u64>,
    },
}

#[derive(Debug, Serialize)]
struct FrameView {
    index: u64,
    reference_slot: Slot,
    deadline_slot: Slot,
    deadline_time: Timestamp,
}

#[derive(Debug, Serialize)]
struct StatusView<P> {
    frame: FrameView,
    consensus_version: u64,
    reporter: Option<MemberId>,
    consensus_report: Option<ConsensusReport>,
    last_processing_ref_slot: Slot,
    is_paused: bool,
    processing: P,
}

#[derive(Debug, Serialize)]
struct ExitBusStatus {
    #[serde(flatten)]
    view: ExitBusProcessingView,
    total_requests_processed: u64,
}

#[derive(Debug, Serialize)]
struct AccountingStatus {
    #[serde(flatten)]
    view: AccountingProcessingView,
    extra_data: Option<ExtraDataProcessingState>,
}

fn frame_view<S: OracleState>(oracle: &Oracle<S>) -> Result<FrameView> {
    let frame = oracle.current_frame()?;
    let deadline_time = oracle.state().store().clock.deadline_time(&frame)?;
    Ok(FrameView {
        index: frame.index,
        reference_slot: frame.reference_slot,
        deadline_slot: frame.deadline_slot,
        deadline_time,
    })
}

fn status_view<S: OracleState, P>(oracle: &Oracle<S>, processing: P) -> Result<StatusView<P>> {
    let store = oracle.state().store();
    Ok(StatusView {
        frame: frame_view(oracle)?,
        consensus_version: store.consensus_version,
        reporter: store.reporter.clone(),
        consensus_report: oracle.consensus_report(),
        last_processing_ref_slot: oracle.last_processing_ref_slot(),
        is_paused: oracle.is_paused(),
        processing,
    })
}

/// Run a query and print its result
pub fn handle_query_command(cmd: QueryCommand, node: &Node, out: &mut dyn Write) -> Result<()> {
    match cmd {
        QueryCommand::Frame { oracle } => match oracle {
            OracleArg::ExitBus => print_json(out, &frame_view(&node.exit_bus)?),
            OracleArg::Accounting => print_json(out, &frame_view(&node.accounting)?),
        },

        QueryCommand::Status { oracle } => match oracle {
            OracleArg::ExitBus => {
                let processing = ExitBusStatus {
                    view: node.exit_bus.processing_state()?,
                    total_requests_processed: node.exit_bus.total_requests_processed(),
                };
                print_json(out, &status_view(&node.exit_bus, processing)?)
            }
            OracleArg::Accounting => {
                let processing = AccountingStatus {
                    view: node.accounting.processing_state()?,
                    extra_data: node.accounting.extra_data_state().cloned(),
                };
                print_json(out, &status_view(&node.accounting, processing)?)
            }
        },

        QueryCommand::LastRequested { module, operators } => {
            let indices = node
                .exit_bus
                .last_requested_validator_indices(module, &operators)?;
            for (operator, index) in operators.iter().zip(indices) {
                match index {
                    Some(index) => writeln!(out, "{operator}\t{index}")?,
                    None => writeln!(out, "{operator}\t-1")?,
                }
            }
            Ok(())
        }
    }
}
