use crate::session::{
    error::SinkError,
    ports::{ResultRecord, ResultSinkPort},
};

/// Accepts and drops every record.
#[derive(Debug, Clone, Default)]
pub struct NoopResultSink;

impl ResultSinkPort for NoopResultSink {
    fn record(&self, _record: &ResultRecord) -> Result<(), SinkError> {
        Ok(())
    }
}
