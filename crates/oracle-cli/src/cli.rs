//! Argument parsing and dispatch

use crate::commands::admin::{handle_admin_command, AdminCommand};
use crate::commands::query::{handle_query_command, QueryCommand};
use crate::commands::submit::{handle_submit_command, report_digest, SubmitCommand};
use crate::commands::{CapabilityArg, OracleArg};
use crate::node::{load_config, require_member, Node, NodeState};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use oracle_core::{MemberId, OracleConfigFile, Timestamp};
use oracle_reports::OracleConfig;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Global options and the command to run
#[derive(Debug, Parser)]
#[command(name = "oracle")]
#[command(about = "Staking oracle - consensus reports, exit requests and accounting", long_about = None)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "oracle.toml")]
    pub config: PathBuf,

    /// State file path
    #[arg(short, long, global = true, default_value = "oracle-state.json")]
    pub state: PathBuf,

    /// Oracle member the command acts as
    #[arg(short, long, global = true)]
    pub member: Option<String>,

    /// Unix time to use instead of the system clock
    #[arg(long, global = true)]
    pub now: Option<Timestamp>,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the state file, writing a default config if none exists
    Init {
        /// Member receiving every administrative capability
        #[arg(long)]
        admin: String,

        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Read-only queries
    #[command(subcommand)]
    Query(QueryCommand),

    /// Consensus digests, reports and extra data
    #[command(subcommand)]
    Submit(SubmitCommand),

    /// Frame, reporter, version and pause administration
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Grant a capability in the local capability table
    Grant {
        /// Member receiving the capability
        #[arg(long)]
        to: String,

        /// Capability to grant
        #[arg(long, value_enum)]
        capability: CapabilityArg,
    },

    /// Print the consensus digest of a report file
    Digest {
        /// Target oracle
        #[arg(value_enum)]
        oracle: OracleArg,

        /// JSON report file
        file: PathBuf,
    },
}

/// Run one command, writing results to `out`
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let Cli {
        command,
        config,
        state,
        member,
        now,
        ..
    } = cli;
    let member = member.map(MemberId::new);

    match command {
        Commands::Init { admin, force } => init(&config, &state, &MemberId::new(admin), force, out),

        Commands::Digest { oracle, file } => {
            writeln!(out, "{}", report_digest(oracle, &file)?)?;
            Ok(())
        }

        Commands::Grant { to, capability } => {
            let mut node_state = NodeState::load(&state)?;
            node_state.capabilities = node_state
                .capabilities
                .grant(MemberId::new(to.as_str()), capability.into());
            node_state.save(&state)?;
            info!(member = %to, ?capability, "capability granted");
            Ok(())
        }

        Commands::Query(cmd) => {
            let limits = load_config(&config)?.limits;
            let node = Node::new(NodeState::load(&state)?, limits, now);
            handle_query_command(cmd, &node, out)
        }

        Commands::Submit(cmd) => {
            let member = require_member(member.as_ref())?;
            with_node(&config, &state, now, out, |node| handle_submit_command(cmd, node, member))
        }

        Commands::Admin(cmd) => {
            let member = require_member(member.as_ref())?;
            with_node(&config, &state, now, out, |node| handle_admin_command(cmd, node, member))
        }
    }
}

fn init(config_path: &Path, state_path: &Path, admin: &MemberId, force: bool, out: &mut dyn Write) -> Result<()> {
    if !config_path.exists() {
        std::fs::write(config_path, OracleConfig::default().to_toml_string()?)?;
        info!(path = %config_path.display(), "wrote default configuration");
    }
    let config = load_config(config_path)?;
    if state_path.exists() && !force {
        bail!(
            "State file {} already exists; pass --force to overwrite",
            state_path.display()
        );
    }
    NodeState::from_config(&config, admin)?.save(state_path)?;
    writeln!(out, "Initialized {}", state_path.display())?;
    Ok(())
}

/// Run `body` against the loaded node, print its events and persist the
/// state; nothing is written if `body` fails
fn with_node(
    config_path: &Path,
    state_path: &Path,
    now: Option<Timestamp>,
    out: &mut dyn Write,
    body: impl FnOnce(&mut Node) -> Result<()>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let mut node = Node::new(NodeState::load(state_path)?, config.limits, now);
    body(&mut node)?;
    for event in node.drain_events() {
        writeln!(out, "{}", serde_json::to_string(&event)?)?;
    }
    node.into_state().save(state_path)
}
