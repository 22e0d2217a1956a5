use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use urlscout_engine::{EngineConfig, FetchSettings, FingerprintSecret};

use crate::logging::LogDestination;

/// Scan text for URLs inside `[...]` groups and fetch each one once.
///
/// One JSON object per fetched page is written to stdout; failures go to
/// stderr.
#[derive(Debug, Parser)]
#[command(name = "urlscout", version, about)]
pub struct Cli {
    /// Text file to scan. Reads standard input as a stream when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Key for email fingerprints. Without it no email field is written.
    #[arg(long, env = "URLSCOUT_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Milliseconds to wait after one fetch finishes before the next starts.
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,

    /// Seconds to wait before retrying a failed fetch. Values below the
    /// request interval are raised to it.
    #[arg(long, default_value_t = 60)]
    pub retry_delay_secs: u64,

    #[arg(long, default_value_t = 10)]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Largest response body accepted, in bytes.
    #[arg(long, default_value_t = 5 * 1024 * 1024)]
    pub max_bytes: u64,

    #[arg(long, default_value_t = 5)]
    pub redirect_limit: usize,

    /// More output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
}

impl Cli {
    pub fn input_source(&self) -> InputSource {
        match &self.input {
            Some(path) if path.as_os_str() != "-" => InputSource::File(path.clone()),
            _ => InputSource::Stdin,
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            fetch: FetchSettings {
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.timeout_secs),
                redirect_limit: self.redirect_limit,
                max_bytes: self.max_bytes,
            },
            request_interval: Duration::from_millis(self.interval_ms),
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            secret: self.secret.clone().and_then(FingerprintSecret::new),
        }
    }
}
