//! Application configuration from CLI flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use callgen_core::RunOptions;

/// callgen: stream a file's lines through a callback-driven generator.
#[derive(Parser, Debug)]
#[command(name = "callgen", version, about)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    /// File whose lines are streamed.
    #[arg(required_unless_present = "completion")]
    pub path: Option<PathBuf>,

    /// Stop after this many printed lines (0 = no limit).
    #[arg(short, long, default_value = "0")]
    pub limit: u64,

    /// Only print lines containing this text.
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Prefix each line with its 1-based line number.
    #[arg(short, long)]
    pub number: bool,

    /// Handoff deadline for each line (e.g., "500ms", "5s", "1m"; "0" = none).
    #[arg(long, default_value = "0", env = "CALLGEN_HANDOFF_TIMEOUT")]
    pub handoff_timeout: String,

    /// Print a run summary after the lines.
    #[arg(short, long)]
    pub stats: bool,

    /// Print the run summary as JSON (implies --stats).
    #[arg(long)]
    pub json: bool,

    /// Quiet mode (do not print lines).
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose logging of the run lifecycle.
    #[arg(short, long)]
    pub verbose: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

/// Invalid configuration values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The duration string could not be parsed.
    #[error("invalid duration {0:?} (expected e.g. \"500ms\", \"5s\", \"1m\")")]
    InvalidDuration(String),
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Whether a summary should be printed.
    #[must_use]
    pub fn wants_summary(&self) -> bool {
        self.stats || self.json
    }

    /// Run options derived from the flags.
    pub fn run_options(&self) -> Result<RunOptions, ConfigError> {
        let timeout = parse_duration(&self.handoff_timeout)
            .ok_or_else(|| ConfigError::InvalidDuration(self.handoff_timeout.clone()))?;
        Ok(RunOptions {
            handoff_timeout: Some(timeout),
            thread_name: "callgen-lines".to_string(),
        }
        .normalize())
    }
}

/// Parse a duration string like "5m", "1h", "30s", "250ms".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let n: u64 = ms.parse().ok()?;
        Some(Duration::from_millis(n))
    } else if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(60)?))
    } else if let Some(hours) = s.strip_suffix('h') {
        let n: u64 = hours.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(3600)?))
    } else if let Some(secs) = s.strip_suffix('s') {
        let n: u64 = secs.parse().ok()?;
        Some(Duration::from_secs(n))
    } else {
        let n: u64 = s.parse().ok()?;
        Some(Duration::from_secs(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> AppConfig {
        AppConfig::try_parse_from(std::iter::once("callgen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parse_duration_formats() {
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("7"), Some(Duration::from_secs(7)));
    }

    #[test]
    fn parse_duration_ms() {
        assert_eq!(parse_duration("1ms"), Some(Duration::from_millis(1)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("-5s"), None);
    }

    #[test]
    fn zero_timeout_means_no_deadline() {
        let opts = config(&["input.txt"]).run_options().unwrap();
        assert_eq!(opts.handoff_timeout, None);
        assert_eq!(opts.thread_name, "callgen-lines");
    }

    #[test]
    fn explicit_timeout_is_applied() {
        let opts = config(&["input.txt", "--handoff-timeout", "250ms"])
            .run_options()
            .unwrap();
        assert_eq!(opts.handoff_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn invalid_timeout_is_config_error() {
        let err = config(&["input.txt", "--handoff-timeout", "later"])
            .run_options()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidDuration("later".into()));
    }

    #[test]
    fn json_implies_summary() {
        assert!(config(&["input.txt", "--json"]).wants_summary());
        assert!(!config(&["input.txt"]).wants_summary());
    }

    #[test]
    fn path_optional_with_completion() {
        let cfg = config(&["--completion", "bash"]);
        assert!(cfg.path.is_none());
    }
}
