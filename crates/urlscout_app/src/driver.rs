use std::io;
use std::sync::Arc;

use anyhow::Context;
use encoding_rs::UTF_8;
use engine_logging::{engine_debug, engine_info};
use tokio::io::{AsyncRead, AsyncReadExt};
use urlscout_core::{update, IntakeState, IntakeStats, Msg};
use urlscout_engine::{Engine, JsonLinesSink, QueueReport, ReportSink};

use crate::cli::{Cli, InputSource};
use crate::effects::{EffectRunner, TaskQueue};

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub intake: IntakeStats,
    pub queue: QueueReport,
}

/// Runs one full pass: read input, fetch every admitted URL, wait for the
/// queue to drain. Only unreadable input is an error.
pub async fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let sink: Arc<dyn ReportSink> = Arc::new(JsonLinesSink::stdio());
    run_with_sink(cli, sink).await
}

pub async fn run_with_sink(cli: &Cli, sink: Arc<dyn ReportSink>) -> anyhow::Result<RunSummary> {
    let engine =
        Engine::start(cli.engine_config(), sink).context("failed to start the fetch engine")?;
    let mut intake = Intake::new(EffectRunner::new(engine));

    match cli.input_source() {
        InputSource::File(path) => {
            engine_info!("scanning file {}", path.display());
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read input file {}", path.display()))?;
            let (text, _) = UTF_8.decode_with_bom_removal(&bytes);
            intake.dispatch(Msg::InputChunk(text.into_owned()));
            intake.dispatch(Msg::EndOfInput);
        }
        InputSource::Stdin => {
            engine_info!("scanning standard input");
            intake
                .feed_reader(tokio::io::stdin())
                .await
                .context("failed to read standard input")?;
        }
    }

    intake.finish().await
}

/// Producer side of a run: owns the intake state and pushes its effects into
/// the engine.
pub struct Intake<Q = Engine> {
    state: IntakeState,
    runner: EffectRunner<Q>,
}

impl<Q: TaskQueue> Intake<Q> {
    pub fn new(runner: EffectRunner<Q>) -> Self {
        Self {
            state: IntakeState::new(),
            runner,
        }
    }

    pub fn dispatch(&mut self, msg: Msg) {
        if matches!(msg, Msg::EndOfInput) && self.state.has_open_group() {
            engine_debug!("input ended inside an open group; its text is discarded");
        }
        let (state, effects) = update(std::mem::take(&mut self.state), msg);
        self.state = state;
        self.runner.apply(effects);
    }

    /// Streams `reader` into the scanner chunk by chunk. Multi-byte characters
    /// split across reads are held back until complete; invalid bytes become
    /// U+FFFD.
    pub async fn feed_reader<R>(&mut self, mut reader: R) -> io::Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let mut decoder = UTF_8.new_decoder();
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            let read = reader.read(&mut buf).await?;
            let last = read == 0;
            let capacity = decoder
                .max_utf8_buffer_length(read)
                .ok_or_else(|| io::Error::other("input chunk too large to decode"))?;
            let mut text = String::with_capacity(capacity);
            let (_, _, had_errors) = decoder.decode_to_string(&buf[..read], &mut text, last);
            if had_errors {
                engine_debug!("replaced malformed UTF-8 in input");
            }
            if !text.is_empty() {
                self.dispatch(Msg::InputChunk(text));
            }
            if last {
                self.dispatch(Msg::EndOfInput);
                return Ok(());
            }
        }
    }

    pub fn stats(&self) -> IntakeStats {
        self.state.stats()
    }
}

impl Intake<Engine> {
    pub async fn finish(self) -> anyhow::Result<RunSummary> {
        let intake = self.stats();
        let queue = self.runner.finish().await?;
        Ok(RunSummary { intake, queue })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{mpsc, Arc};

    use clap::Parser;
    use urlscout_engine::{ChannelReportSink, EngineEvent};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::effects::recording::{task, QueueCall, RecordingQueue};

    async fn page_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "<html><head><title>Found it</title></head></html>",
                "text/html",
            ))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    fn fast_cli(args: &[&str]) -> Cli {
        let mut argv = vec!["urlscout", "--interval-ms", "5", "--retry-delay-secs", "0"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    fn records(rx: &mpsc::Receiver<EngineEvent>) -> Vec<(String, Option<String>)> {
        rx.try_iter()
            .filter_map(|event| match event {
                EngineEvent::RecordReady { record, .. } => Some((record.url, record.title)),
                EngineEvent::FetchFailed { .. } => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn file_mode_fetches_each_bracketed_url_once() {
        let server = page_server().await;
        let url = format!("{}/page", server.uri());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "intro {url} [see {url}] and again [ nested [x] {url} ] [no link]"
        )
        .unwrap();

        let (tx, rx) = mpsc::channel();
        let cli = fast_cli(&[file.path().to_str().unwrap()]);
        let summary = run_with_sink(&cli, Arc::new(ChannelReportSink::new(tx)))
            .await
            .unwrap();

        assert_eq!(summary.intake.candidates, 2);
        assert_eq!(summary.intake.admitted, 1);
        assert_eq!(summary.queue.succeeded, 1);
        assert_eq!(records(&rx), vec![(url, Some("Found it".to_string()))]);
    }

    #[tokio::test]
    async fn missing_file_is_a_fatal_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let (tx, _rx) = mpsc::channel();
        let cli = fast_cli(&[missing.to_str().unwrap()]);

        let err = run_with_sink(&cli, Arc::new(ChannelReportSink::new(tx)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read input file"));
    }

    #[tokio::test]
    async fn stream_mode_handles_groups_and_characters_split_across_reads() {
        let server = page_server().await;
        let url = format!("{}/page", server.uri());
        let (tx, rx) = mpsc::channel();
        let cli = fast_cli(&[]);
        let engine =
            Engine::start(cli.engine_config(), Arc::new(ChannelReportSink::new(tx))).unwrap();
        let mut intake = Intake::new(EffectRunner::new(engine));

        // "é" is two bytes; split it between reads along with the group.
        let text = format!("caf\u{e9} [ {url} ] [{url}]");
        let bytes = text.as_bytes();
        let (head, tail) = bytes.split_at(4);
        let reader = tokio::io::AsyncReadExt::chain(head, tail);
        intake.feed_reader(reader).await.unwrap();

        let summary = intake.finish().await.unwrap();
        assert_eq!(summary.intake.admitted, 1);
        assert_eq!(summary.intake.duplicates, 1);
        assert_eq!(records(&rx), vec![(url, Some("Found it".to_string()))]);
    }

    #[test]
    fn urls_from_one_chunk_reach_the_queue_as_one_ordered_batch() {
        let queue = RecordingQueue::default();
        let mut intake = Intake::new(EffectRunner::new(queue.clone()));

        intake.dispatch(Msg::InputChunk("[www.a.com] text [www.b.com]".into()));
        intake.dispatch(Msg::InputChunk("[www.c.com]".into()));
        intake.dispatch(Msg::EndOfInput);

        assert_eq!(
            queue.calls(),
            vec![
                QueueCall::Batch(vec![task(1, "www.a.com"), task(2, "www.b.com")]),
                QueueCall::Batch(vec![task(3, "www.c.com")]),
                QueueCall::Close,
            ]
        );
    }

    #[tokio::test]
    async fn url_in_the_last_chunk_is_fetched_after_end_of_input() {
        let server = page_server().await;
        let url = format!("{}/page", server.uri());
        let (tx, rx) = mpsc::channel();
        let cli = fast_cli(&[]);
        let engine =
            Engine::start(cli.engine_config(), Arc::new(ChannelReportSink::new(tx))).unwrap();
        let mut intake = Intake::new(EffectRunner::new(engine));

        intake.dispatch(Msg::InputChunk(format!("[{url}]")));
        intake.dispatch(Msg::EndOfInput);

        let summary = intake.finish().await.unwrap();
        assert_eq!(summary.queue.succeeded, 1);
        assert_eq!(records(&rx), vec![(url, Some("Found it".to_string()))]);
    }
}
