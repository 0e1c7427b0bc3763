//! Ready-made generators over common sources.

use std::cell::RefCell;
use std::convert::Infallible;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::PathBuf;

use tracing::debug;

use crate::generator::{Generator, GeneratorBuilder};
use crate::step::Step;

/// Open line cursor held by a [`lines`] run.
pub type LineCursor = RefCell<Lines<BufReader<File>>>;

/// Generator returned by [`lines`].
pub type LineGenerator = Generator<PathBuf, LineCursor, String, io::Error>;

/// Stream the lines of a text file without loading it into memory.
///
/// Each run opens the file in its initializer and yields one line per step
/// (without the trailing newline). The file closes when the run's state is
/// dropped, right after the finalizer. A missing file surfaces as an init
/// error, a read failure as a step error.
#[must_use]
pub fn lines(path: impl Into<PathBuf>) -> LineGenerator {
    lines_builder(path).step(next_line)
}

/// Builder stage of [`lines`], for attaching options or an observer
/// before fixing the step with [`next_line`].
pub fn lines_builder(
    path: impl Into<PathBuf>,
) -> GeneratorBuilder<PathBuf, LineCursor, io::Error> {
    GeneratorBuilder::with_init(path.into(), |path: &PathBuf| {
        let file = File::open(path)?;
        debug!(path = %path.display(), "opened line source");
        Ok(RefCell::new(BufReader::new(file).lines()))
    })
    .finalize(|cursor: Option<&LineCursor>| {
        if cursor.is_some() {
            debug!("closing line source");
        }
        Ok(())
    })
}

/// Step callback of [`lines`]: the next line, or `Done` at end of file.
pub fn next_line(_index: u64, cursor: &LineCursor) -> Step<String, io::Error> {
    Step::from(cursor.borrow_mut().next().transpose())
}

/// Yield `0..limit`.
///
/// # Example
/// ```
/// let total: u64 = callgen_core::sources::counter(5).start().sum();
/// assert_eq!(total, 10);
/// ```
#[must_use]
pub fn counter(limit: u64) -> Generator<u64, u64, u64, Infallible> {
    Generator::new(
        |i, limit: &u64| {
            if i < *limit {
                Step::Produced(i)
            } else {
                Step::Done
            }
        },
        limit,
    )
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::GeneratorError;

    #[test]
    fn lines_streams_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha").unwrap();
        writeln!(file, "beta").unwrap();
        write!(file, "gamma").unwrap();

        let generator = lines(file.path());
        let mut run = generator.start();
        let collected: Vec<String> = run.by_ref().collect();

        assert_eq!(collected, ["alpha", "beta", "gamma"]);
        assert!(run.error().unwrap().is_none());
    }

    #[test]
    fn lines_can_be_restarted() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "one").unwrap();

        let generator = lines(file.path());
        assert_eq!(generator.start().count(), 1);
        assert_eq!(generator.start().count(), 1);
    }

    #[test]
    fn lines_missing_file_is_init_error() {
        let dir = tempfile::tempdir().unwrap();
        let generator = lines(dir.path().join("missing.txt"));
        let mut run = generator.start();

        assert_eq!(run.by_ref().count(), 0);
        match run.error() {
            Ok(Some(GeneratorError::Init(err))) => {
                assert_eq!(err.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn lines_empty_file_yields_nothing() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut run = lines(file.path()).start();
        assert_eq!(run.next(), None);
        assert_eq!(run.steps(), Some(1));
    }

    #[test]
    fn counter_yields_range() {
        let values: Vec<u64> = counter(4).start().collect();
        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn counter_zero_is_empty() {
        let mut run = counter(0).start();
        assert_eq!(run.next(), None);
        assert!(run.error().unwrap().is_none());
    }
}
