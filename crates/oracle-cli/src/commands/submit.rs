//! Report submission
//!
//! Reports are read from JSON files in the same shape the oracles hash, so
//! `oracle digest` and `submit consensus` agree on the digest.

use super::OracleArg;
use crate::node::Node;
use anyhow::{Context, Result};
use clap::Subcommand;
use oracle_core::{Hash32, MemberId, Slot};
use oracle_reports::{AccountingReport, ExitRequestsReport, ReportPayload};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

/// Submissions made as the oracle member
#[derive(Debug, Subcommand)]
pub enum SubmitCommand {
    /// Store a consensus digest for the current frame
    Consensus {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,

        /// Reference slot of the current frame
        #[arg(long)]
        ref_slot: Slot,

        /// 0x-prefixed report digest
        #[arg(long)]
        digest: Hash32,
    },

    /// Withdraw the stored digest before processing starts
    Discard {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,

        /// Reference slot of the stored report
        #[arg(long)]
        ref_slot: Slot,
    },

    /// Apply an exit request report
    ExitReport {
        /// JSON report file
        file: PathBuf,

        /// Submit the report's digest first
        #[arg(long)]
        with_consensus: bool,
    },

    /// Apply an accounting main report
    AccountingReport {
        /// JSON report file
        file: PathBuf,

        /// Submit the report's digest first
        #[arg(long)]
        with_consensus: bool,
    },

    /// Apply the next extra-data chunk
    ExtraData {
        /// Hex-encoded chunk
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        hex: Option<String>,

        /// File holding the hex-encoded chunk
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Finish a frame whose report declared no extra data
    ExtraDataEmpty,
}

/// Parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Decode a hex chunk, tolerating a `0x` prefix and surrounding whitespace
pub fn decode_chunk_hex(text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    let raw = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(raw).context("Extra-data chunk is not valid hex")
}

/// Run a submission as `member`
pub fn handle_submit_command(cmd: SubmitCommand, node: &mut Node, member: &MemberId) -> Result<()> {
    match cmd {
        SubmitCommand::Consensus {
            oracle,
            ref_slot,
            digest,
        } => match oracle {
            OracleArg::ExitBus => node.exit_bus.submit_consensus_report(member, ref_slot, digest)?,
            OracleArg::Accounting => node.accounting.submit_consensus_report(member, ref_slot, digest)?,
        },

        SubmitCommand::Discard { oracle, ref_slot } => match oracle {
            OracleArg::ExitBus => node.exit_bus.discard_consensus_report(member, ref_slot)?,
            OracleArg::Accounting => node.accounting.discard_consensus_report(member, ref_slot)?,
        },

        SubmitCommand::ExitReport {
            file,
            with_consensus,
        } => {
            let report: ExitRequestsReport = read_json(&file)?;
            if with_consensus {
                node.exit_bus
                    .submit_consensus_report(member, report.ref_slot, report.digest()?)?;
            }
            node.exit_bus.submit_report_data(member, &report)?;
            info!(ref_slot = report.ref_slot, "exit report applied");
        }

        SubmitCommand::AccountingReport {
            file,
            with_consensus,
        } => {
            let report: AccountingReport = read_json(&file)?;
            if with_consensus {
                node.accounting
                    .submit_consensus_report(member, report.ref_slot, report.digest()?)?;
            }
            node.accounting.submit_report_data(member, &report)?;
            info!(ref_slot = report.ref_slot, "accounting report applied");
        }

        SubmitCommand::ExtraData { hex, file } => {
            let text = match (hex, file) {
                (Some(hex), _) => hex,
                (None, Some(file)) => std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?,
                (None, None) => anyhow::bail!("either --hex or --file is required"),
            };
            let chunk = decode_chunk_hex(&text)?;
            node.accounting.submit_extra_data_list(member, &chunk)?;
        }

        SubmitCommand::ExtraDataEmpty => node.accounting.submit_extra_data_empty(member)?,
    }
    Ok(())
}

/// Digest of the report in `file`
pub fn report_digest(oracle: OracleArg, file: &Path) -> Result<Hash32> {
    let digest = match oracle {
        OracleArg::ExitBus => read_json::<ExitRequestsReport>(file)?.digest()?,
        OracleArg::Accounting => read_json::<AccountingReport>(file)?.digest()?,
    };
    Ok(digest)
}
