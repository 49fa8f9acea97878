//! Collaborator interfaces ("effects")
//!
//! The subsystem owns its state but talks to the rest of the protocol through
//! these traits. Hosts inject implementations; tests use the recording mocks
//! from `oracle-testkit`.
//!
//! All calls are synchronous and happen inside a step. A failing call aborts
//! the step, except [`OperatorRegistry::on_reporting_finished`], whose failures
//! are logged and swallowed.

pub mod accounting;
pub mod capability;
pub mod registry;
pub mod time;
pub mod withdrawal;

pub use accounting::{AccountingEngine, AccountingValues};
pub use capability::{require, Capability, CapabilityCheck, StaticCapabilities};
pub use registry::OperatorRegistry;
pub use time::{Clock, SystemClock};
pub use withdrawal::WithdrawalQueue;

/// Error returned by a collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CollaboratorError {
    /// Human-readable reason
    pub message: String,
}

impl CollaboratorError {
    /// Create a collaborator error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type for collaborator calls
pub type CollaboratorResult = std::result::Result<(), CollaboratorError>;

/// Lift a collaborator failure into a step-aborting oracle error
pub fn fatal(name: &str, result: CollaboratorResult) -> crate::Result<()> {
    result.map_err(|e| crate::OracleError::collaborator(name, e.message))
}
