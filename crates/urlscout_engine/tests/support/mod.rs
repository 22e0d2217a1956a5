#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use urlscout_engine::{
    EngineEvent, FailureKind, FetchError, FetchOutput, Fetcher,
};

/// Fetcher that replays canned outcomes per URL and records when it was called.
#[derive(Default)]
pub struct ScriptedFetcher {
    script: Mutex<HashMap<String, VecDeque<Result<String, FailureKind>>>>,
    calls: Mutex<Vec<(String, Instant)>>,
    latency: Duration,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn page(&self, url: &str, html: &str) -> &Self {
        self.push(url, Ok(html.to_string()))
    }

    pub fn fail(&self, url: &str, kind: FailureKind) -> &Self {
        self.push(url, Err(kind))
    }

    fn push(&self, url: &str, outcome: Result<String, FailureKind>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|(url, _)| url).collect()
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let outcome = self
            .script
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        match outcome {
            Some(Ok(html)) => Ok(FetchOutput {
                bytes: html.into_bytes(),
                content_type: Some("text/html; charset=utf-8".to_string()),
            }),
            Some(Err(kind)) => Err(FetchError::new(kind, "scripted failure")),
            None => Err(FetchError::new(FailureKind::Network, "unscripted url")),
        }
    }
}

/// `Write` handle whose contents can be read back while a sink owns a clone.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn drain_events(rx: &mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    rx.try_iter().collect()
}

pub fn html_page(title: &str, body: &str) -> String {
    format!("<html><head><title>{title}</title></head><body>{body}</body></html>")
}
