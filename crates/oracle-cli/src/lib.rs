//! # Oracle CLI
//!
//! Operates both oracles against a local JSON state file, with the TOML
//! configuration supplying chain timing, frame layout and report limits.
//! Collaborators only log what they receive.

pub mod cli;
pub mod commands;
pub mod node;
pub mod sinks;

pub use cli::{run, Cli, Commands};
pub use node::{load_config, Node, NodeState};
