//! CLI runs against a temporary config and state file

use assert_matches::assert_matches;
use clap::Parser;
use oracle_cli::{run, Cli, NodeState};
use oracle_core::{OracleConfigFile, OracleError};
use oracle_reports::ReportPayload;
use oracle_testkit::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const NOW: u64 = GENESIS_TIME + SLOTS_PER_EPOCH * SECONDS_PER_SLOT;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("oracle.toml"), test_config().to_toml_string().unwrap()).unwrap();
        let ws = Self { dir };
        ws.oracle(&["init", "--admin", ADMIN]).unwrap();
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn oracle(&self, args: &[&str]) -> anyhow::Result<String> {
        let config = self.path("oracle.toml");
        let state = self.path("oracle-state.json");
        let now = NOW.to_string();
        let mut argv = vec![
            "oracle",
            "--config",
            config.to_str().unwrap(),
            "--state",
            state.to_str().unwrap(),
            "--now",
            &now,
        ];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    fn state(&self) -> NodeState {
        NodeState::load(&self.path("oracle-state.json")).unwrap()
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_exit_report_round_trip() {
    let ws = Workspace::new();
    let report = ExitReportBuilder::new(SLOTS_PER_EPOCH - 1)
        .requests(&[(1, 0, 7), (1, 2, 3)])
        .build();
    let file = ws.write_json("exit.json", &report);

    let digest = ws.oracle(&["digest", "exit-bus", arg(&file)]).unwrap();
    assert_eq!(digest.trim(), report.digest().unwrap().to_string());

    let events = ws
        .oracle(&["--member", REPORTER, "submit", "exit-report", arg(&file), "--with-consensus"])
        .unwrap();
    assert_eq!(events.matches("ValidatorExitRequest").count(), 2);

    let indices = ws
        .oracle(&["query", "last-requested", "--module", "1", "--operators", "0,1,2"])
        .unwrap();
    assert_eq!(indices, "0\t7\n1\t-1\n2\t3\n");
    assert_eq!(ws.state().exit_bus.total_requests_processed(), 2);
}

#[test]
fn test_failed_step_leaves_state_file_alone() {
    let ws = Workspace::new();
    let before = std::fs::read_to_string(ws.path("oracle-state.json")).unwrap();
    let report = ExitReportBuilder::new(SLOTS_PER_EPOCH - 1)
        .requests(&[(1, 0, 7), (1, 0, 2)])
        .build();
    let file = ws.write_json("exit.json", &report);

    let err = ws
        .oracle(&["--member", REPORTER, "submit", "exit-report", arg(&file), "--with-consensus"])
        .unwrap_err();
    assert_matches!(err.downcast_ref::<OracleError>(), Some(OracleError::OutOfOrder { position: 1 }));
    assert_eq!(std::fs::read_to_string(ws.path("oracle-state.json")).unwrap(), before);
}

#[test]
fn test_accounting_with_extra_data() {
    let ws = Workspace::new();
    let extra = ExtraDataBuilder::new()
        .stuck(1, &[(0, 1)])
        .exited(1, &[(0, 2)])
        .build();
    let report = AccountingReportBuilder::new(SLOTS_PER_EPOCH - 1)
        .extra_data(&extra)
        .build();
    let file = ws.write_json("accounting.json", &report);
    ws.oracle(&["--member", REPORTER, "submit", "accounting-report", arg(&file), "--with-consensus"])
        .unwrap();

    for chunk in &extra.chunks {
        let hex = format!("0x{}", hex::encode(chunk));
        ws.oracle(&["--member", REPORTER, "submit", "extra-data", "--hex", &hex])
            .unwrap();
    }

    let cursor = ws.state().accounting.extra_data.unwrap();
    assert!(cursor.submitted);
    assert_eq!(cursor.items_processed, 2);

    let status = ws.oracle(&["query", "status", "accounting"]).unwrap();
    let status: serde_json::Value = serde_json::from_str(&status).unwrap();
    assert_eq!(status["processing"]["extra_data_submitted"], true);
    assert_eq!(status["last_processing_ref_slot"], SLOTS_PER_EPOCH - 1);
}

#[test]
fn test_admin_needs_member_and_capability() {
    let ws = Workspace::new();
    assert!(ws.oracle(&["admin", "pause-for", "exit-bus", "--seconds", "60"]).is_err());

    let err = ws
        .oracle(&["--member", OUTSIDER, "admin", "pause-for", "exit-bus", "--seconds", "60"])
        .unwrap_err();
    assert_matches!(err.downcast_ref::<OracleError>(), Some(OracleError::Unauthorized { .. }));

    ws.oracle(&["grant", "--to", OUTSIDER, "--capability", "pause"]).unwrap();
    let events = ws
        .oracle(&["--member", OUTSIDER, "admin", "pause-for", "exit-bus", "--seconds", "60"])
        .unwrap();
    assert!(events.contains("Paused"));

    let status = ws.oracle(&["query", "status", "exit-bus"]).unwrap();
    let status: serde_json::Value = serde_json::from_str(&status).unwrap();
    assert_eq!(status["is_paused"], true);
}

#[test]
fn test_init_refuses_to_overwrite() {
    let ws = Workspace::new();
    assert!(ws.oracle(&["init", "--admin", ADMIN]).is_err());
    ws.oracle(&["init", "--admin", ADMIN, "--force"]).unwrap();
}

#[test]
fn test_frame_query() {
    let ws = Workspace::new();
    let frame = ws.oracle(&["query", "frame", "exit-bus"]).unwrap();
    let frame: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(frame["index"], 0);
    assert_eq!(frame["reference_slot"], SLOTS_PER_EPOCH - 1);
    assert_eq!(frame["deadline_slot"], (1 + EPOCHS_PER_FRAME) * SLOTS_PER_EPOCH - 1);
}
