//! # Oracle Consensus (Layer 2) - Frames and Report Digests
//!
//! Time and agreement layer shared by every oracle instance.
//!
//! ## Architecture
//!
//! - **frame**: pure frame clock (time → slot → epoch → frame)
//! - **report**: consensus report store and the submission protocol
//! - **pause**: pause-until gate for report acceptance
//! - **transaction**: all-or-nothing staging of state and events per step
//!
//! ## Invariants
//!
//! - `last_processing_ref_slot` never decreases
//! - a reference slot starts processing at most once
//! - a failed step leaves no state change and no event

pub mod frame;
pub mod pause;
pub mod report;
pub mod transaction;

pub use frame::{ChainParams, ConsensusFrame, FrameClock, FrameConfig};
pub use pause::{PauseState, PAUSE_INFINITELY};
pub use report::{Caller, ConsensusReport, ReportStore};
pub use transaction::{atomically, Staged};
