use std::sync::Arc;
use std::time::Duration;

use engine_logging::engine_info;

use crate::extract::{PageExtractor, ScraperExtractor};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::fingerprint::FingerprintSecret;
use crate::processor::PageProcessor;
use crate::queue::{FetchQueue, QueueError, QueueState};
use crate::sink::ReportSink;
use crate::{FetchError, FetchTask, JobId, QueueReport};

/// Run-wide settings, built once at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    /// Minimum gap between the end of one fetch cycle and the start of the next.
    pub request_interval: Duration,
    /// Wait before the single retry of a failed GET. Never shorter than
    /// `request_interval` in practice, see [`EngineConfig::effective_retry_delay`].
    pub retry_delay: Duration,
    /// Email fingerprints are only produced when this is set.
    pub secret: Option<FingerprintSecret>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            request_interval: Duration::from_secs(1),
            retry_delay: Duration::from_secs(60),
            secret: None,
        }
    }
}

impl EngineConfig {
    /// The retry is a fetch attempt too, so it honours the request spacing.
    pub fn effective_retry_delay(&self) -> Duration {
        self.retry_delay.max(self.request_interval)
    }
}

/// Owns the fetch queue and everything it needs to process tasks.
pub struct Engine {
    queue: FetchQueue,
}

impl Engine {
    /// Starts an engine using reqwest for transport and scraper for extraction.
    /// Must be called from within a tokio runtime.
    pub fn start(config: EngineConfig, sink: Arc<dyn ReportSink>) -> Result<Self, FetchError> {
        let fetcher = Arc::new(ReqwestFetcher::new(config.fetch.clone())?);
        Ok(Self::start_with(config, fetcher, Arc::new(ScraperExtractor), sink))
    }

    pub fn start_with(
        config: EngineConfig,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn PageExtractor>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let retry_delay = config.effective_retry_delay();
        engine_info!(
            "engine starting: interval {:?}, retry delay {:?}, fingerprinting {}",
            config.request_interval,
            retry_delay,
            if config.secret.is_some() { "on" } else { "off" }
        );
        let processor = PageProcessor::new(fetcher, extractor, config.secret, retry_delay);
        let queue = FetchQueue::spawn(processor, sink, config.request_interval);
        Self { queue }
    }

    pub fn enqueue(&self, job_id: JobId, url: impl Into<String>) -> bool {
        self.queue.enqueue(job_id, url)
    }

    pub fn enqueue_batch(&self, tasks: Vec<FetchTask>) -> bool {
        self.queue.enqueue_batch(tasks)
    }

    pub fn close(&mut self) {
        self.queue.close();
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    pub fn state(&self) -> QueueState {
        self.queue.state()
    }

    /// Closes intake if still open and waits for the queue to drain.
    pub async fn finish(self) -> Result<QueueReport, QueueError> {
        self.queue.run_to_completion().await
    }
}
