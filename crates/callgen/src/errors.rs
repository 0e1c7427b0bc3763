//! Error handling and exit codes.

use callgen_core::constants::exit_codes;
use callgen_core::GeneratorError;

/// Map a run error to the process exit code.
pub fn exit_code<E>(err: &GeneratorError<E>) -> i32 {
    match err {
        GeneratorError::Init(_) => exit_codes::ERROR_INIT,
        GeneratorError::Timeout { .. } => exit_codes::ERROR_TIMEOUT,
        GeneratorError::Cancelled { .. } => exit_codes::ERROR_CANCELED,
        GeneratorError::Step { .. }
        | GeneratorError::Finalize { .. }
        | GeneratorError::Panicked { .. } => exit_codes::ERROR_GENERIC,
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::time::Duration;

    use callgen_core::Phase;

    use super::*;

    fn io_err() -> io::Error {
        io::Error::other("disk")
    }

    #[test]
    fn error_codes() {
        assert_eq!(exit_code(&GeneratorError::Init(io_err())), 3);
        assert_eq!(
            exit_code(&GeneratorError::<io::Error>::Timeout {
                index: 1,
                after: Duration::from_secs(1),
            }),
            2
        );
        assert_eq!(
            exit_code(&GeneratorError::<io::Error>::Cancelled { delivered: 0 }),
            130
        );
        assert_eq!(
            exit_code(&GeneratorError::Step {
                index: 0,
                source: io_err(),
            }),
            1
        );
        assert_eq!(
            exit_code(&GeneratorError::<io::Error>::Panicked {
                phase: Phase::Step,
                message: "boom".into(),
            }),
            1
        );
    }
}
