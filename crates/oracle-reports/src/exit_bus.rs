//! Exit-Request Processor
//!
//! Applies one complete exit request report per step. Records must be
//! strictly ascending inside the report (Sorted-List Codec) and, per
//! `(module, operator)`, validator indices must keep increasing across
//! reports. The whole buffer is decoded and checked before the first entry of
//! the requested-validator table changes.

use crate::codec::{decode_sorted_list, ExitRequestRecord};
use crate::report_data::{DataFormat, ExitRequestsReport, ReportPayload};
use oracle_consensus::{Caller, ReportStore};
use oracle_core::{
    check_limit, Hash32, ModuleId, OperatorId, OracleError, OracleEvent, ReportLimits, Result,
    Slot, Timestamp, ValidatorIndex,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Last exit requested for one node operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedValidator {
    /// An exit was requested at least once
    pub requested: bool,
    /// Highest validator index requested so far
    pub last_index: ValidatorIndex,
}

/// Processing progress of the last accepted exit report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRequestsProcessingState {
    /// Reference slot of the report
    pub reference_slot: Slot,
    /// Declared data format
    pub data_format: u32,
    /// Declared number of requests
    pub requests_count: u64,
    /// Requests applied
    pub requests_submitted: u64,
}

/// Read-only view of the current frame's processing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitBusProcessingView {
    /// Reference slot of the frame containing now
    pub current_frame_ref_slot: Slot,
    /// Deadline of the stored report for this frame; zero if none
    pub processing_deadline_time: Timestamp,
    /// Stored consensus digest for this frame
    pub data_hash: Hash32,
    /// Report data for this frame was applied
    pub data_submitted: bool,
    /// Format of the applied data
    pub data_format: u32,
    /// Requests declared by the applied data
    pub requests_count: u64,
    /// Requests applied
    pub requests_submitted: u64,
}

/// Persistent state of the exit request oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitBusState {
    /// Consensus report store of this oracle
    pub consensus: ReportStore,
    #[serde(with = "requested_entries")]
    requested: BTreeMap<(ModuleId, OperatorId), RequestedValidator>,
    processing: Option<ExitRequestsProcessingState>,
    total_requests_processed: u64,
}

impl ExitBusState {
    /// Fresh state around a consensus store
    pub fn new(consensus: ReportStore) -> Self {
        Self {
            consensus,
            requested: BTreeMap::new(),
            processing: None,
            total_requests_processed: 0,
        }
    }

    /// Requests accepted over the oracle's lifetime
    pub fn total_requests_processed(&self) -> u64 {
        self.total_requests_processed
    }

    /// Entry of one operator, if it ever had an exit requested
    pub fn requested_validator(&self, module_id: ModuleId, operator_id: OperatorId) -> Option<RequestedValidator> {
        self.requested.get(&(module_id, operator_id)).copied()
    }

    /// Last requested validator index per operator; `None` if never requested.
    ///
    /// Module id zero names no module and is rejected like an over-wide id.
    pub fn last_requested_validator_indices(
        &self,
        module_id: u32,
        operator_ids: &[u64],
    ) -> Result<Vec<Option<ValidatorIndex>>> {
        let module_id = ModuleId::new(module_id)?;
        if module_id.is_zero() {
            return Err(OracleError::out_of_bounds("module_id", 0));
        }
        operator_ids
            .iter()
            .map(|raw| {
                let operator_id = OperatorId::new(*raw)?;
                Ok(self
                    .requested_validator(module_id, operator_id)
                    .filter(|entry| entry.requested)
                    .map(|entry| entry.last_index))
            })
            .collect()
    }

    /// Processing progress for the frame containing `now`
    pub fn processing_view(&self, now: Timestamp) -> Result<ExitBusProcessingView> {
        let frame = self.consensus.current_frame(now)?;
        let mut view = ExitBusProcessingView {
            current_frame_ref_slot: frame.reference_slot,
            ..ExitBusProcessingView::default()
        };
        let Some(report) = self
            .consensus
            .consensus_report()
            .filter(|r| r.reference_slot == frame.reference_slot)
        else {
            return Ok(view);
        };
        view.processing_deadline_time = report.deadline_time;
        view.data_hash = report.digest;
        if let Some(processing) = self
            .processing
            .filter(|p| p.reference_slot == frame.reference_slot)
        {
            view.data_submitted = true;
            view.data_format = processing.data_format;
            view.requests_count = processing.requests_count;
            view.requests_submitted = processing.requests_submitted;
        }
        Ok(view)
    }

    /// Validate and apply a full exit request report.
    ///
    /// Runs inside a staged step: on error the caller discards `self`.
    pub fn submit_report_data(
        &mut self,
        caller: Caller<'_>,
        report: &ExitRequestsReport,
        limits: &ReportLimits,
        now: Timestamp,
        events: &mut Vec<OracleEvent>,
    ) -> Result<()> {
        self.consensus.pause.check_resumed(now)?;
        let digest = report.admit(&self.consensus, caller)?;
        self.consensus.start_processing(now, events)?;

        DataFormat::try_from(report.data_format)?;
        check_limit(limits.max_exit_requests_per_report, report.requests_count)?;
        let records: Vec<ExitRequestRecord> =
            decode_sorted_list(&report.data, report.requests_count)?;

        for record in &records {
            let key = record.key;
            let entry = self
                .requested
                .entry((key.module_id, key.operator_id))
                .or_insert(RequestedValidator {
                    requested: false,
                    last_index: 0,
                });
            if entry.requested && key.validator_index <= entry.last_index {
                return Err(OracleError::IndexMustIncrease {
                    module_id: key.module_id.get(),
                    operator_id: key.operator_id.get(),
                    stored_index: entry.last_index,
                    new_index: key.validator_index,
                });
            }
            *entry = RequestedValidator {
                requested: true,
                last_index: key.validator_index,
            };
            events.push(OracleEvent::ValidatorExitRequest {
                module_id: key.module_id,
                operator_id: key.operator_id,
                validator_index: key.validator_index,
                pubkey: record.pubkey_hex(),
                timestamp: now,
            });
        }

        self.total_requests_processed = self
            .total_requests_processed
            .checked_add(report.requests_count)
            .ok_or_else(|| OracleError::overflow("total requests processed"))?;
        self.processing = Some(ExitRequestsProcessingState {
            reference_slot: report.ref_slot,
            data_format: report.data_format,
            requests_count: report.requests_count,
            requests_submitted: report.requests_count,
        });
        info!(
            ref_slot = report.ref_slot,
            requests = report.requests_count,
            %digest,
            "exit requests processed"
        );
        Ok(())
    }
}

/// The table as a list of entries, since its tuple keys cannot be map keys
/// in every format
mod requested_entries {
    use super::RequestedValidator;
    use oracle_core::{ModuleId, OperatorId, ValidatorIndex};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    #[derive(Serialize, Deserialize)]
    struct Entry {
        module_id: ModuleId,
        operator_id: OperatorId,
        requested: bool,
        last_index: ValidatorIndex,
    }

    pub fn serialize<S: Serializer>(
        table: &BTreeMap<(ModuleId, OperatorId), RequestedValidator>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let entries: Vec<Entry> = table
            .iter()
            .map(|((module_id, operator_id), entry)| Entry {
                module_id: *module_id,
                operator_id: *operator_id,
                requested: entry.requested,
                last_index: entry.last_index,
            })
            .collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(ModuleId, OperatorId), RequestedValidator>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| {
                (
                    (e.module_id, e.operator_id),
                    RequestedValidator {
                        requested: e.requested,
                        last_index: e.last_index,
                    },
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_sorted_list, ExitRequestKey, PUBKEY_LENGTH};
    use oracle_consensus::{ChainParams, FrameClock, FrameConfig};
    use oracle_core::effects::{Capability, StaticCapabilities};
    use oracle_core::{MemberId, OracleKind};

    const GENESIS: Timestamp = 1_000_000;
    const NOW: Timestamp = GENESIS + 10 * 384;

    fn state() -> ExitBusState {
        let clock = FrameClock::new(
            ChainParams::new(32, 12, GENESIS).unwrap(),
            FrameConfig::new(10, 2).unwrap(),
        );
        let mut store = ReportStore::new(OracleKind::ExitBus, clock, 1, 0);
        store.reporter = Some("member".into());
        ExitBusState::new(store)
    }

    fn caps() -> StaticCapabilities {
        StaticCapabilities::new().grant_all(
            "member",
            [Capability::SubmitConsensusReport, Capability::SubmitData],
        )
    }

    fn report(ref_slot: Slot, keys: &[(u32, u64, u64)]) -> ExitRequestsReport {
        let records: Vec<ExitRequestRecord> = keys
            .iter()
            .map(|(m, o, v)| ExitRequestRecord {
                key: ExitRequestKey {
                    module_id: ModuleId::new(*m).unwrap(),
                    operator_id: OperatorId::new(*o).unwrap(),
                    validator_index: *v,
                },
                pubkey: [0xaa; PUBKEY_LENGTH],
            })
            .collect();
        ExitRequestsReport {
            consensus_version: 1,
            ref_slot,
            requests_count: keys.len() as u64,
            data_format: 1,
            data: encode_sorted_list(&records),
        }
    }

    fn submit(state: &mut ExitBusState, report: &ExitRequestsReport, now: Timestamp) -> Result<Vec<OracleEvent>> {
        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let mut events = Vec::new();
        state
            .consensus
            .submit_report(caller, report.ref_slot, report.digest()?, now, &mut events)?;
        events.clear();
        state.submit_report_data(caller, report, &ReportLimits::default(), now, &mut events)?;
        Ok(events)
    }

    #[test]
    fn test_accepts_sorted_records() {
        let mut state = state();
        let events = submit(&mut state, &report(319, &[(1, 0, 0), (1, 0, 2), (2, 0, 1)]), NOW).unwrap();
        let exits = events
            .iter()
            .filter(|e| matches!(e, OracleEvent::ValidatorExitRequest { timestamp: NOW, .. }))
            .count();
        assert_eq!(exits, 3);
        assert_eq!(state.last_requested_validator_indices(1, &[0, 5]).unwrap(), vec![Some(2), None]);
        assert_eq!(state.last_requested_validator_indices(2, &[0]).unwrap(), vec![Some(1)]);
        assert_eq!(state.total_requests_processed(), 3);
    }

    #[test]
    fn test_index_must_increase_across_reports() {
        let mut state = state();
        submit(&mut state, &report(319, &[(1, 0, 5)]), NOW).unwrap();
        let next_frame = GENESIS + 12 * 384;
        assert_eq!(
            submit(&mut state, &report(383, &[(1, 0, 5)]), next_frame),
            Err(OracleError::IndexMustIncrease {
                module_id: 1,
                operator_id: 0,
                stored_index: 5,
                new_index: 5,
            })
        );
    }

    #[test]
    fn test_empty_report_marks_frame_processed() {
        let mut state = state();
        let events = submit(&mut state, &report(319, &[]), NOW).unwrap();
        assert!(matches!(events[..], [OracleEvent::ProcessingStarted { ref_slot: 319, .. }]));
        let view = state.processing_view(NOW).unwrap();
        assert!(view.data_submitted);
        assert_eq!(view.requests_count, 0);
        assert_eq!(state.consensus.last_processing_ref_slot, 319);
    }

    #[test]
    fn test_unsupported_format_and_limit() {
        let mut state = state();
        let mut bad = report(319, &[(1, 0, 0)]);
        bad.data_format = 2;
        assert_eq!(
            submit(&mut state.clone(), &bad, NOW),
            Err(OracleError::UnsupportedFormat { format: 2 })
        );

        let caps = caps();
        let member = MemberId::new("member");
        let caller = Caller::new(&member, &caps);
        let big = report(319, &[(1, 0, 0), (1, 0, 1)]);
        let mut events = Vec::new();
        state
            .consensus
            .submit_report(caller, 319, big.digest().unwrap(), NOW, &mut events)
            .unwrap();
        let limits = ReportLimits {
            max_exit_requests_per_report: 1,
            ..ReportLimits::default()
        };
        assert_eq!(
            state.submit_report_data(caller, &big, &limits, NOW, &mut events),
            Err(OracleError::TooManyItems { limit: 1, actual: 2 })
        );
    }

    #[test]
    fn test_query_bounds() {
        let state = state();
        assert!(matches!(
            state.last_requested_validator_indices(0, &[0]),
            Err(OracleError::ArgumentOutOfBounds { value: 0, .. })
        ));
        assert!(matches!(
            state.last_requested_validator_indices(1 << 24, &[0]),
            Err(OracleError::ArgumentOutOfBounds { .. })
        ));
        assert!(matches!(
            state.last_requested_validator_indices(1, &[1 << 40]),
            Err(OracleError::ArgumentOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_state_json_roundtrip() {
        let mut state = state();
        submit(&mut state, &report(319, &[(1, 2, 3)]), NOW).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: ExitBusState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
