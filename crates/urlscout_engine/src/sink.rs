use std::io::{self, Stderr, Stdout, Write};
use std::sync::{mpsc, Mutex, PoisonError};

use engine_logging::engine_error;

use crate::{EngineEvent, FetchError, JobId, ResultRecord};

/// Receives the terminal outcome of every fetch task.
///
/// Records and failures are kept on separate channels: records are the run's
/// output, failures are diagnostics.
pub trait ReportSink: Send + Sync {
    fn record(&self, job_id: JobId, record: &ResultRecord);
    fn failure(&self, job_id: JobId, url: &str, error: &FetchError);
}

/// Writes one JSON object per record to `out` and one line per failure to
/// `diag`. Both writers are flushed after every line.
pub struct JsonLinesSink<O, D> {
    out: Mutex<O>,
    diag: Mutex<D>,
}

impl JsonLinesSink<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O, D> JsonLinesSink<O, D>
where
    O: Write + Send,
    D: Write + Send,
{
    pub fn new(out: O, diag: D) -> Self {
        Self {
            out: Mutex::new(out),
            diag: Mutex::new(diag),
        }
    }

    fn write_record(&self, record: &ResultRecord) -> io::Result<()> {
        let line = serde_json::to_string(record)?;
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "{line}")?;
        out.flush()
    }

    fn write_failure(&self, url: &str, error: &FetchError) -> io::Result<()> {
        let mut diag = self.diag.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(diag, "failed to fetch {url}: {error}")?;
        diag.flush()
    }
}

impl<O, D> ReportSink for JsonLinesSink<O, D>
where
    O: Write + Send,
    D: Write + Send,
{
    fn record(&self, job_id: JobId, record: &ResultRecord) {
        if let Err(err) = self.write_record(record) {
            engine_error!("job {} could not write record for {}: {}", job_id, record.url, err);
        }
    }

    fn failure(&self, job_id: JobId, url: &str, error: &FetchError) {
        if let Err(err) = self.write_failure(url, error) {
            engine_error!("job {} could not report failure for {}: {}", job_id, url, err);
        }
    }
}

/// Forwards outcomes as [`EngineEvent`]s, for callers that drive their own
/// output.
pub struct ChannelReportSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelReportSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

impl ReportSink for ChannelReportSink {
    fn record(&self, job_id: JobId, record: &ResultRecord) {
        self.emit(EngineEvent::RecordReady {
            job_id,
            record: record.clone(),
        });
    }

    fn failure(&self, job_id: JobId, url: &str, error: &FetchError) {
        self.emit(EngineEvent::FetchFailed {
            job_id,
            url: url.to_string(),
            error: error.clone(),
        });
    }
}
