use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::processor::PageProcessor;
use crate::sink::ReportSink;
use crate::{FetchTask, JobId, QueueReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Nothing to do right now; more input may still arrive.
    Idle,
    /// A task is waiting for its slot or being processed.
    Draining,
    /// Intake closed and every task finished. Terminal.
    Drained,
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("fetch worker stopped unexpectedly: {0}")]
    Worker(String),
}

/// Single-worker FIFO of fetch tasks.
///
/// Tasks run one at a time in arrival order. A task does not start until
/// `interval` has passed since the previous one completed, whether that one
/// succeeded or failed, and a retry never follows its first attempt sooner
/// than `interval` either. Enqueueing is a channel
/// send: it never blocks and never fetches.
pub struct FetchQueue {
    tx: Option<mpsc::UnboundedSender<Vec<FetchTask>>>,
    state_rx: watch::Receiver<QueueState>,
    worker: JoinHandle<QueueReport>,
}

impl FetchQueue {
    /// Starts the worker on the current tokio runtime.
    ///
    /// A retry is a fetch attempt as well, so the processor's retry delay is
    /// raised to `interval` when it is shorter.
    pub fn spawn(mut processor: PageProcessor, sink: Arc<dyn ReportSink>, interval: Duration) -> Self {
        processor.enforce_min_retry_delay(interval);
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(QueueState::Idle);
        let worker = tokio::spawn(run_worker(processor, sink, interval, rx, state_tx));
        Self {
            tx: Some(tx),
            state_rx,
            worker,
        }
    }

    /// Returns false once the queue has been closed.
    pub fn enqueue(&self, job_id: JobId, url: impl Into<String>) -> bool {
        self.enqueue_batch(vec![FetchTask {
            job_id,
            url: url.into(),
        }])
    }

    /// Hands several tasks over at once; the worker sees all of them before it
    /// picks the first.
    pub fn enqueue_batch(&self, tasks: Vec<FetchTask>) -> bool {
        if tasks.is_empty() {
            return self.tx.is_some();
        }
        match &self.tx {
            Some(tx) => tx.send(tasks).is_ok(),
            None => false,
        }
    }

    /// Signals that no further input will arrive. Queued work still runs.
    pub fn close(&mut self) {
        self.tx = None;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_none()
    }

    pub fn state(&self) -> QueueState {
        *self.state_rx.borrow()
    }

    /// Closes intake and waits until every queued task has finished.
    pub async fn run_to_completion(mut self) -> Result<QueueReport, QueueError> {
        self.close();
        self.worker
            .await
            .map_err(|err| QueueError::Worker(err.to_string()))
    }
}

async fn run_worker(
    processor: PageProcessor,
    sink: Arc<dyn ReportSink>,
    interval: Duration,
    mut rx: mpsc::UnboundedReceiver<Vec<FetchTask>>,
    state_tx: watch::Sender<QueueState>,
) -> QueueReport {
    let mut report = QueueReport::default();
    let mut pending: VecDeque<FetchTask> = VecDeque::new();
    let mut next_start: Option<Instant> = None;

    loop {
        if !pull_ready(&mut rx, &mut pending) && pending.is_empty() {
            break;
        }
        if pending.is_empty() {
            state_tx.send_replace(QueueState::Idle);
            match rx.recv().await {
                Some(batch) => pending.extend(batch),
                None => break,
            }
            continue;
        }

        state_tx.send_replace(QueueState::Draining);
        if let Some(at) = next_start {
            sleep_until(at).await;
        }
        // Batches that arrived during the wait go behind what is pending.
        pull_ready(&mut rx, &mut pending);
        let Some(task) = pending.pop_front() else {
            continue;
        };

        engine_debug!("job {} fetching {} ({} pending)", task.job_id, task.url, pending.len());
        report.processed += 1;
        match processor.process(&task, sink.as_ref()).await {
            Some(record) => {
                report.succeeded += 1;
                sink.record(task.job_id, &record);
            }
            None => report.failed += 1,
        }
        next_start = Some(Instant::now() + interval);
    }

    state_tx.send_replace(QueueState::Drained);
    engine_info!(
        "fetch queue drained: {} processed, {} succeeded, {} failed",
        report.processed,
        report.succeeded,
        report.failed
    );
    report
}

/// Moves every batch already in the channel into `pending`.
/// Returns false once the channel is closed and empty.
fn pull_ready(
    rx: &mut mpsc::UnboundedReceiver<Vec<FetchTask>>,
    pending: &mut VecDeque<FetchTask>,
) -> bool {
    loop {
        match rx.try_recv() {
            Ok(batch) => pending.extend(batch),
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}
