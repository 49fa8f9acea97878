//! # Oracle Reports (Layer 3) - Payloads and Processors
//!
//! Decodes report payloads and applies them to oracle state.
//!
//! ## Architecture
//!
//! - **codec**: big-endian record layouts and the Sorted-List Codec
//! - **report_data**: report structs, data formats and content digests
//! - **exit_bus**: Exit-Request Processor and the requested-validator table
//! - **accounting**: main accounting report and extra-data submission
//! - **extra_data**: resumable extra-data cursor with lazy chunk verification
//! - **oracle**: `Oracle<S>` instances running every call as one atomic step
//! - **config**: TOML deployment configuration
//!
//! ## Invariants
//!
//! - a malformed payload changes nothing and reaches no collaborator
//! - per `(module, operator)`, requested validator indices strictly increase
//! - reporting-finished fires once per frame, on the terminal chunk

pub mod accounting;
pub mod codec;
pub mod config;
pub mod exit_bus;
pub mod extra_data;
pub mod oracle;
pub mod report_data;

pub use accounting::{AccountingProcessingView, AccountingState, ReportSinks};
pub use config::{OracleConfig, OracleSection};
pub use exit_bus::{
    ExitBusProcessingView, ExitBusState, ExitRequestsProcessingState, RequestedValidator,
};
pub use extra_data::{ExtraDataProcessingState, PreparedChunk};
pub use oracle::{AccountingOracle, Collaborators, ExitRequestsOracle, Oracle, OracleState};
pub use report_data::{
    AccountingReport, DataFormat, ExitRequestsReport, ExtraDataFormat, ReportPayload,
};
