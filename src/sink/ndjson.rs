use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::session::{
    error::{SinkError, SinkErrorKind, sink_io, sink_serialization},
    ports::{ResultRecord, ResultSinkPort},
};

/// Append-only result log, one JSON record per line.
#[derive(Debug)]
pub struct NdjsonResultSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl NdjsonResultSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads back every record, skipping blank lines.
    pub fn read_all(&self) -> Result<Vec<ResultRecord>, SinkError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|err| {
            sink_io(format!(
                "failed to read result log {}: {}",
                self.path.display(),
                err
            ))
        })?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|err| sink_serialization(format!("invalid result record: {err}")))
            })
            .collect()
    }
}

impl ResultSinkPort for NdjsonResultSink {
    fn record(&self, record: &ResultRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(record)
            .map_err(|err| sink_serialization(format!("failed to serialize record: {err}")))?;
        line.push('\n');

        let _guard = self.write_lock.lock().map_err(|_| {
            SinkError::new(SinkErrorKind::Internal, "result log write lock poisoned")
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| {
                sink_io(format!(
                    "failed to create result log dir {}: {}",
                    parent.display(),
                    err
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| {
                sink_io(format!(
                    "failed to open result log {}: {}",
                    self.path.display(),
                    err
                ))
            })?;
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|err| sink_io(format!("failed to append result record: {err}")))
    }
}
