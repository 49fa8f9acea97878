//! Oracle Testing Infrastructure
//!
//! Shared setup for tests across the workspace: recording collaborators,
//! a manually driven clock, payload builders that produce valid (or
//! deliberately broken) reports, and ready-made oracle fixtures.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! oracle-testkit = { path = "../oracle-testkit" }
//! ```
//!
//! ```rust,no_run
//! use oracle_testkit::*;
//!
//! let mut fx = OracleFixture::new();
//! let report = ExitReportBuilder::new(fx.exit_ref_slot()).request(1, 0, 7).build();
//! fx.submit_exit_report(&report).unwrap();
//! ```

pub mod builders;
pub mod fixtures;
pub mod mocks;
pub mod strategies;
pub mod time;

pub use builders::*;
pub use fixtures::*;
pub use mocks::*;
pub use time::ManualClock;

/// Install a test-writer subscriber once; later calls are no-ops
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
