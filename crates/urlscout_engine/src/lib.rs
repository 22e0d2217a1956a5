//! urlscout engine: fetch queue, page processing and report sinks.
mod decode;
mod engine;
mod extract;
mod fetch;
mod fingerprint;
mod processor;
mod queue;
mod sink;
mod types;

pub use decode::{decode_page, PageText};
pub use engine::{Engine, EngineConfig};
pub use extract::{PageExtractor, ScraperExtractor};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use fingerprint::{fingerprint, FingerprintSecret};
pub use processor::{with_default_scheme, PageProcessor};
pub use queue::{FetchQueue, QueueError, QueueState};
pub use sink::{ChannelReportSink, JsonLinesSink, ReportSink};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchOutput, FetchTask, JobId, QueueReport, ResultRecord,
};
