//! Constants shared by the engine and its front ends.

/// Name given to producer threads when `RunOptions::thread_name` is empty.
pub const DEFAULT_THREAD_NAME: &str = "callgen-producer";

/// Minimum interval between two `Produced` log lines from `LoggingObserver`.
pub const DEFAULT_LOG_INTERVAL_MS: u64 = 250;

/// Exit codes for the CLI application.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error (step or finalize failure, producer panic).
    pub const ERROR_GENERIC: i32 = 1;
    /// A value waited longer than the handoff deadline.
    pub const ERROR_TIMEOUT: i32 = 2;
    /// The initializer failed; no value was produced.
    pub const ERROR_INIT: i32 = 3;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// Run cancelled by the user (Ctrl+C).
    pub const ERROR_CANCELED: i32 = 130;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            exit_codes::SUCCESS,
            exit_codes::ERROR_GENERIC,
            exit_codes::ERROR_TIMEOUT,
            exit_codes::ERROR_INIT,
            exit_codes::ERROR_CONFIG,
            exit_codes::ERROR_CANCELED,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn default_thread_name_not_empty() {
        assert!(!DEFAULT_THREAD_NAME.is_empty());
    }
}
