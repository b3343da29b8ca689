use std::{collections::BTreeSet, sync::Mutex};

use crate::session::{
    error::{SinkError, SinkErrorKind, sink_unreachable},
    ports::{ResultRecord, ResultSinkPort},
    types::TransmissionId,
};

#[derive(Debug, Default)]
struct MemorySinkState {
    records: Vec<ResultRecord>,
    calls: usize,
    failing_calls: BTreeSet<usize>,
}

/// Result sink keeping every record in memory. Individual calls can be
/// scheduled to fail, which is how partial transmission is exercised.
#[derive(Debug, Default)]
pub struct MemoryResultSink {
    state: Mutex<MemorySinkState>,
}

impl MemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `call`-th `record` call (1-based, counted over the sink's
    /// lifetime) fail as unreachable.
    pub fn fail_on_call(self, call: usize) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.failing_calls.insert(call);
        }
        self
    }

    pub fn records(&self) -> Vec<ResultRecord> {
        self.state
            .lock()
            .map(|state| state.records.clone())
            .unwrap_or_default()
    }

    pub fn records_for(&self, transmission_id: &TransmissionId) -> Vec<ResultRecord> {
        self.records()
            .into_iter()
            .filter(|record| &record.transmission_id == transmission_id)
            .collect()
    }

    /// Every `record` call, failed ones included.
    pub fn calls(&self) -> usize {
        self.state.lock().map(|state| state.calls).unwrap_or_default()
    }
}

impl ResultSinkPort for MemoryResultSink {
    fn record(&self, record: &ResultRecord) -> Result<(), SinkError> {
        let mut state = self.state.lock().map_err(|_| {
            SinkError::new(SinkErrorKind::Internal, "memory result sink lock poisoned")
        })?;
        state.calls += 1;
        let call = state.calls;
        if state.failing_calls.remove(&call) {
            return Err(sink_unreachable(format!(
                "memory result sink refused call {} for '{}'",
                call, record.transmission_id
            )));
        }
        state.records.push(record.clone());
        Ok(())
    }
}
