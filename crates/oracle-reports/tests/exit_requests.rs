//! Exit request oracle end to end: consensus digest, report data and the
//! requested-validator table.

use assert_matches::assert_matches;
use oracle_core::{OracleError, OracleEvent, ReportLimits};
use oracle_reports::codec::{decode_sorted_list, ExitRequestRecord};
use oracle_reports::ReportPayload;
use oracle_testkit::strategies::sorted_exit_keys;
use oracle_testkit::*;
use proptest::prelude::*;

fn exit_events(events: &[OracleEvent]) -> Vec<(u32, u64, u64)> {
    events
        .iter()
        .filter_map(|event| match event {
            OracleEvent::ValidatorExitRequest {
                module_id,
                operator_id,
                validator_index,
                ..
            } => Some((module_id.get(), operator_id.get(), *validator_index)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_sorted_report_is_accepted() {
    init_test_tracing();
    let mut fx = OracleFixture::new();
    let report = ExitReportBuilder::new(fx.exit_ref_slot())
        .requests(&[(1, 0, 0), (1, 0, 2), (2, 0, 1)])
        .build();

    fx.submit_exit_report(&report).unwrap();

    let events = fx.drain_events();
    assert_eq!(exit_events(&events), vec![(1, 0, 0), (1, 0, 2), (2, 0, 1)]);
    assert_eq!(fx.exit_bus.last_requested_validator_indices(1, &[0]).unwrap(), vec![Some(2)]);
    assert_eq!(fx.exit_bus.last_requested_validator_indices(2, &[0]).unwrap(), vec![Some(1)]);
    assert_eq!(fx.exit_bus.last_requested_validator_indices(3, &[0, 1]).unwrap(), vec![None, None]);
    assert_eq!(fx.exit_bus.total_requests_processed(), 3);
}

#[test]
fn test_event_carries_pubkey_and_step_time() {
    let mut fx = OracleFixture::new();
    let now = GENESIS_TIME + SLOTS_PER_EPOCH * SECONDS_PER_SLOT;
    let report = ExitReportBuilder::new(fx.exit_ref_slot()).request(4, 9, 77).build();
    fx.submit_exit_report(&report).unwrap();

    let event = fx
        .drain_events()
        .into_iter()
        .find(|e| matches!(e, OracleEvent::ValidatorExitRequest { .. }))
        .unwrap();
    assert_matches!(event, OracleEvent::ValidatorExitRequest { pubkey, timestamp, .. } => {
        assert_eq!(pubkey, format!("0x{}", hex::encode(test_pubkey(77))));
        assert_eq!(timestamp, now);
    });
}

#[test]
fn test_misordered_report_changes_nothing() {
    let mut fx = OracleFixture::new();
    let report = ExitReportBuilder::new(fx.exit_ref_slot())
        .requests(&[(1, 0, 2), (1, 0, 0), (2, 0, 1)])
        .build();
    let before = fx.exit_bus.state().clone();

    fx.exit_bus
        .submit_consensus_report(&fx.reporter, report.ref_slot, report.digest().unwrap())
        .unwrap();
    fx.drain_events();
    let consensus_only = fx.exit_bus.state().clone();
    assert_ne!(before, consensus_only);

    let result = fx.exit_bus.submit_report_data(&fx.reporter.clone(), &report);

    assert_matches!(result, Err(OracleError::OutOfOrder { position: 1 }));
    assert!(fx.drain_events().is_empty());
    assert_eq!(fx.exit_bus.state(), &consensus_only);
    assert_eq!(fx.exit_bus.last_requested_validator_indices(1, &[0]).unwrap(), vec![None]);
    assert_eq!(fx.exit_bus.last_processing_ref_slot(), 0);
}

#[test]
fn test_duplicate_key_is_out_of_order() {
    let mut fx = OracleFixture::new();
    let report = ExitReportBuilder::new(fx.exit_ref_slot())
        .requests(&[(1, 0, 5), (1, 0, 5)])
        .build();
    assert_matches!(fx.submit_exit_report(&report), Err(OracleError::OutOfOrder { position: 1 }));
}

#[test]
fn test_second_submission_for_same_slot_is_rejected() {
    let mut fx = OracleFixture::new();
    let report = ExitReportBuilder::new(fx.exit_ref_slot()).request(1, 0, 0).build();
    fx.submit_exit_report(&report).unwrap();

    let again = fx.submit_exit_report(&report);
    assert_matches!(again, Err(OracleError::AlreadyProcessed { ref_slot }) if ref_slot == report.ref_slot);

    let replay = fx.exit_bus.submit_report_data(&fx.reporter.clone(), &report);
    assert_matches!(replay, Err(OracleError::AlreadyProcessed { .. }));
    assert_eq!(fx.exit_bus.total_requests_processed(), 1);
}

/// Reference slot of frame 0 on the test chain
const FIRST_REF_SLOT: u64 = SLOTS_PER_EPOCH - 1;

#[test]
fn test_malformed_payloads_are_rejected_before_any_effect() {
    let builder = || ExitReportBuilder::new(FIRST_REF_SLOT).request(1, 0, 0);
    let cases = [
        builder().raw_data(vec![0u8; 65]).build(),
        builder().declared_count(2).build(),
        builder().data_format(2).build(),
        ExitReportBuilder::new(FIRST_REF_SLOT)
            .raw_data(vec![0u8; 64])
            .declared_count(1)
            .build(),
    ];
    let mut results = Vec::new();
    for report in &cases {
        let mut fx = OracleFixture::new();
        results.push(fx.submit_exit_report(report));
        assert!(exit_events(fx.exit_bus.events()).is_empty());
        assert_eq!(fx.exit_bus.last_processing_ref_slot(), 0);
        assert_eq!(fx.exit_bus.total_requests_processed(), 0);
        assert!(fx.registry.calls().is_empty());
    }
    assert_matches!(results[0], Err(OracleError::LengthMismatch { length: 65, width: 64 }));
    assert_matches!(results[1], Err(OracleError::CountMismatch { declared: 2, actual: 1 }));
    assert_matches!(results[2], Err(OracleError::UnsupportedFormat { format: 2 }));
    assert_matches!(results[3], Err(OracleError::InvalidRecord { position: 0, .. }));
}

#[test]
fn test_request_limit() {
    let limits = ReportLimits {
        max_exit_requests_per_report: 2,
        ..ReportLimits::default()
    };
    let mut fx = OracleFixture::with_limits(limits);
    let report = ExitReportBuilder::new(fx.exit_ref_slot())
        .requests(&[(1, 0, 0), (1, 0, 1), (1, 0, 2)])
        .build();
    assert_matches!(
        fx.submit_exit_report(&report),
        Err(OracleError::TooManyItems { limit: 2, actual: 3 })
    );
}

#[test]
fn test_index_must_increase_across_reports() {
    let mut fx = OracleFixture::new();
    let first = ExitReportBuilder::new(fx.exit_ref_slot())
        .requests(&[(1, 0, 10), (1, 1, 3)])
        .build();
    fx.submit_exit_report(&first).unwrap();

    fx.advance_frames(1);
    let second = ExitReportBuilder::new(fx.exit_ref_slot())
        .requests(&[(1, 0, 11), (1, 1, 3)])
        .build();
    let snapshot = fx.exit_bus.state().requested_validator(
        oracle_core::ModuleId::new(1).unwrap(),
        oracle_core::OperatorId::new(0).unwrap(),
    );
    let result = fx.submit_exit_report(&second);

    assert_matches!(
        result,
        Err(OracleError::IndexMustIncrease {
            module_id: 1,
            operator_id: 1,
            stored_index: 3,
            new_index: 3
        })
    );
    // the accepted (1, 0, 11) in the same report is rolled back too
    assert_eq!(
        fx.exit_bus.state().requested_validator(
            oracle_core::ModuleId::new(1).unwrap(),
            oracle_core::OperatorId::new(0).unwrap(),
        ),
        snapshot
    );
    assert_eq!(fx.exit_bus.last_requested_validator_indices(1, &[0, 1]).unwrap(), vec![Some(10), Some(3)]);
}

#[test]
fn test_empty_report_is_accepted() {
    let mut fx = OracleFixture::new();
    let report = ExitReportBuilder::new(fx.exit_ref_slot()).build();
    fx.submit_exit_report(&report).unwrap();

    let view = fx.exit_bus.processing_state().unwrap();
    assert!(view.data_submitted);
    assert_eq!(view.requests_count, 0);
    assert_eq!(view.data_hash, report.digest().unwrap());
}

#[test]
fn test_processing_view_follows_frame() {
    let mut fx = OracleFixture::new();
    let report = ExitReportBuilder::new(fx.exit_ref_slot()).request(1, 0, 1).build();
    fx.submit_exit_report(&report).unwrap();
    let view = fx.exit_bus.processing_state().unwrap();
    assert_eq!(view.current_frame_ref_slot, FIRST_REF_SLOT);
    assert_eq!(view.requests_submitted, 1);
    assert_eq!(view.data_format, 1);

    fx.advance_frames(1);
    let view = fx.exit_bus.processing_state().unwrap();
    assert_eq!(view.current_frame_ref_slot, FIRST_REF_SLOT + EPOCHS_PER_FRAME * SLOTS_PER_EPOCH);
    assert!(!view.data_submitted);
    assert!(view.data_hash.is_zero());
}

#[test]
fn test_data_after_deadline_is_rejected() {
    let mut fx = OracleFixture::new();
    let report = ExitReportBuilder::new(fx.exit_ref_slot()).request(1, 0, 1).build();
    fx.exit_bus
        .submit_consensus_report(&fx.reporter.clone(), report.ref_slot, report.digest().unwrap())
        .unwrap();
    let deadline = fx.exit_bus.consensus_report().unwrap().deadline_time;
    fx.clock.set(deadline + 1);

    let result = fx.exit_bus.submit_report_data(&fx.reporter.clone(), &report);
    assert_matches!(result, Err(OracleError::DeadlineMissed { deadline: d, .. }) if d == deadline);
}

#[test]
fn test_pause_blocks_report_data() {
    let mut fx = OracleFixture::new();
    let admin = fx.admin.clone();
    let reporter = fx.reporter.clone();
    fx.exit_bus.pause_for(&admin, 60).unwrap();
    assert!(fx.exit_bus.is_paused());

    let report = ExitReportBuilder::new(fx.exit_ref_slot()).request(1, 0, 1).build();
    assert_matches!(fx.submit_exit_report(&report), Err(OracleError::Paused { .. }));

    fx.exit_bus.resume(&admin).unwrap();
    fx.exit_bus.submit_report_data(&reporter, &report).unwrap();
    assert_eq!(fx.exit_bus.total_requests_processed(), 1);
}

#[test]
fn test_submitters_need_capabilities() {
    let mut fx = OracleFixture::new();
    let outsider = fx.outsider.clone();
    let report = ExitReportBuilder::new(fx.exit_ref_slot()).request(1, 0, 1).build();
    let digest = report.digest().unwrap();

    assert_matches!(
        fx.exit_bus.submit_consensus_report(&outsider, report.ref_slot, digest),
        Err(OracleError::Unauthorized { .. })
    );
    fx.exit_bus
        .submit_consensus_report(&fx.reporter.clone(), report.ref_slot, digest)
        .unwrap();
    assert_matches!(
        fx.exit_bus.submit_report_data(&outsider, &report),
        Err(OracleError::Unauthorized { .. })
    );
    assert_matches!(
        fx.exit_bus.pause_for(&outsider, 10),
        Err(OracleError::Unauthorized { .. })
    );
}

#[test]
fn test_data_must_match_digest() {
    let mut fx = OracleFixture::new();
    let reporter = fx.reporter.clone();
    let agreed = ExitReportBuilder::new(fx.exit_ref_slot()).request(1, 0, 1).build();
    fx.exit_bus
        .submit_consensus_report(&reporter, agreed.ref_slot, agreed.digest().unwrap())
        .unwrap();

    let other = ExitReportBuilder::new(fx.exit_ref_slot()).request(1, 0, 2).build();
    assert_matches!(
        fx.exit_bus.submit_report_data(&reporter, &other),
        Err(OracleError::UnexpectedDataHash { .. })
    );
    let wrong_version = ExitReportBuilder::new(fx.exit_ref_slot())
        .request(1, 0, 1)
        .consensus_version(2)
        .build();
    assert_matches!(
        fx.exit_bus.submit_report_data(&reporter, &wrong_version),
        Err(OracleError::UnexpectedConsensusVersion { expected: 1, actual: 2 })
    );
}

#[test]
fn test_query_bounds() {
    let fx = OracleFixture::new();
    assert_matches!(
        fx.exit_bus.last_requested_validator_indices(0, &[0]),
        Err(OracleError::ArgumentOutOfBounds { ref name, value: 0 }) if name == "module_id"
    );
    assert_matches!(
        fx.exit_bus.last_requested_validator_indices(1 << 24, &[0]),
        Err(OracleError::ArgumentOutOfBounds { .. })
    );
    assert_matches!(
        fx.exit_bus.last_requested_validator_indices(1, &[1 << 40]),
        Err(OracleError::ArgumentOutOfBounds { .. })
    );
}

fn requested_table(fx: &OracleFixture, keys: &[(u32, u64, u64)]) -> Vec<Option<u64>> {
    keys.iter()
        .flat_map(|(m, o, _)| fx.exit_bus.last_requested_validator_indices(*m, &[*o]).unwrap())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn sorted_records_decode_to_themselves(keys in sorted_exit_keys(40)) {
        let report = ExitReportBuilder::new(0).requests(&keys).build();
        let records: Vec<ExitRequestRecord> =
            decode_sorted_list(&report.data, report.requests_count).unwrap();
        let decoded: Vec<(u32, u64, u64)> = records
            .iter()
            .map(|r| (r.key.module_id.get(), r.key.operator_id.get(), r.key.validator_index))
            .collect();
        prop_assert_eq!(decoded, keys);
    }

    #[test]
    fn replaying_keys_next_frame_never_lowers_indices(keys in sorted_exit_keys(20)) {
        prop_assume!(!keys.is_empty());
        let mut fx = OracleFixture::new();
        let first = ExitReportBuilder::new(fx.exit_ref_slot()).requests(&keys).build();
        fx.submit_exit_report(&first).unwrap();
        let table = requested_table(&fx, &keys);

        fx.advance_frames(1);
        let replay = ExitReportBuilder::new(fx.exit_ref_slot()).requests(&keys).build();
        let result = fx.submit_exit_report(&replay);
        let is_index_error = matches!(result, Err(OracleError::IndexMustIncrease { .. }));
        prop_assert!(is_index_error);
        prop_assert_eq!(requested_table(&fx, &keys), table);

        fx.advance_frames(1);
        let shifted: Vec<_> = keys.iter().map(|(m, o, v)| (*m, *o, v + 10_000)).collect();
        let next = ExitReportBuilder::new(fx.exit_ref_slot()).requests(&shifted).build();
        fx.submit_exit_report(&next).unwrap();
        prop_assert_eq!(fx.exit_bus.total_requests_processed(), 2 * keys.len() as u64);
    }
}
