use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use url::Url;

use crate::decode::decode_page;
use crate::extract::PageExtractor;
use crate::fetch::Fetcher;
use crate::fingerprint::{fingerprint, FingerprintSecret};
use crate::sink::ReportSink;
use crate::{FailureKind, FetchError, FetchOutput, FetchTask, ResultRecord};

/// Fetches one URL (retrying once after `retry_delay`) and turns the page
/// into a [`ResultRecord`].
pub struct PageProcessor {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn PageExtractor>,
    secret: Option<FingerprintSecret>,
    retry_delay: Duration,
}

impl PageProcessor {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn PageExtractor>,
        secret: Option<FingerprintSecret>,
        retry_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            secret,
            retry_delay,
        }
    }

    /// Raises the retry wait to at least `floor`.
    pub(crate) fn enforce_min_retry_delay(&mut self, floor: Duration) {
        if self.retry_delay < floor {
            engine_warn!(
                "retry delay {:?} is shorter than the request interval, using {:?}",
                self.retry_delay,
                floor
            );
            self.retry_delay = floor;
        }
    }

    /// Runs the fetch-and-report step for `task`.
    ///
    /// A permanent failure is reported to `sink` and yields `None`; it is never
    /// returned to the caller. Successful records are returned, not reported,
    /// so the queue decides when they are emitted.
    pub async fn process(&self, task: &FetchTask, sink: &dyn ReportSink) -> Option<ResultRecord> {
        match self.try_process(&task.url).await {
            Ok(record) => Some(record),
            Err(err) => {
                engine_warn!("job {} giving up on {}: {}", task.job_id, task.url, err);
                sink.failure(task.job_id, &task.url, &err);
                None
            }
        }
    }

    pub async fn try_process(&self, url: &str) -> Result<ResultRecord, FetchError> {
        let target = with_default_scheme(url)?;
        let output = self.fetch_with_retry(target.as_str()).await?;
        let page = decode_page(&output.bytes, output.content_type.as_deref());
        if page.lossy {
            engine_debug!("{} decoded lossily as {}", url, page.encoding_label);
        }
        Ok(self.build_record(url, &page.text))
    }

    async fn fetch_with_retry(&self, target: &str) -> Result<FetchOutput, FetchError> {
        match self.fetcher.fetch(target).await {
            Ok(output) => Ok(output),
            Err(first) => {
                engine_warn!(
                    "GET {} failed ({}), retrying in {:?}",
                    target,
                    first,
                    self.retry_delay
                );
                tokio::time::sleep(self.retry_delay).await;
                self.fetcher.fetch(target).await
            }
        }
    }

    fn build_record(&self, url: &str, page: &str) -> ResultRecord {
        let title = self
            .extractor
            .title(page)
            .filter(|title| !title.trim().is_empty());
        let email = self.secret.as_ref().and_then(|secret| {
            self.extractor
                .first_email(page)
                .map(|email| fingerprint(&email, secret))
        });

        ResultRecord {
            url: url.to_string(),
            title,
            email,
        }
    }
}

/// Parses a candidate as a URL, prefixing `https://` when it has no scheme.
pub fn with_default_scheme(raw: &str) -> Result<Url, FetchError> {
    let raw = raw.trim();
    let candidate = if has_scheme(raw) {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(format!("https://{raw}"))
    };
    Url::parse(&candidate)
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, format!("{candidate}: {err}")))
}

fn has_scheme(raw: &str) -> bool {
    match raw.split_once("://") {
        Some((scheme, _)) => {
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
