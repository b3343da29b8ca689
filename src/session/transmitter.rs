use std::sync::Arc;

use crate::{
    session::{
        error::SinkError,
        ports::{ResultRecord, ResultSinkPort},
        types::TransmissionId,
    },
    variables::Variable,
};

/// Adapts one variable plus its identifying context into one sink call.
#[derive(Clone)]
pub struct ResultTransmitter {
    sink: Arc<dyn ResultSinkPort>,
}

impl ResultTransmitter {
    pub fn new(sink: Arc<dyn ResultSinkPort>) -> Self {
        Self { sink }
    }

    pub fn transmit(
        &self,
        variable: &Variable,
        transmission_id: &TransmissionId,
        item_definition: &str,
        test_definition: &str,
    ) -> Result<(), SinkError> {
        let record = ResultRecord {
            transmission_id: transmission_id.clone(),
            item_definition: item_definition.to_string(),
            test_definition: test_definition.to_string(),
            variable: variable.clone(),
        };

        match self.sink.record(&record) {
            Ok(()) => {
                tracing::debug!(
                    target: "session.transmitter",
                    transmission_id = %transmission_id,
                    variable = %variable.identifier,
                    kind = ?variable.kind,
                    item_definition = item_definition,
                    test_definition = test_definition,
                    "variable_transmitted"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    target: "session.transmitter",
                    transmission_id = %transmission_id,
                    variable = %variable.identifier,
                    error_kind = ?err.kind,
                    error = %err,
                    "variable_transmission_failed"
                );
                Err(err)
            }
        }
    }
}
