//! Outcome of a single step callback invocation.

/// What a step callback reports for index `i`.
///
/// A step either hands over a value, signals the clean end of the
/// sequence, or fails. The three cases are mutually exclusive, so a step
/// can never deliver a value and terminate at the same time.
///
/// # Example
/// ```
/// use callgen_core::Step;
///
/// let produced: Step<u32, String> = Ok(Some(7)).into();
/// assert_eq!(produced, Step::Produced(7));
///
/// let done: Step<u32, String> = Ok(None).into();
/// assert!(done.is_terminal());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T, E> {
    /// A value for the consumer.
    Produced(T),
    /// The sequence ended cleanly.
    Done,
    /// The step failed; the run stops and records the error.
    Failed(E),
}

impl<T, E> Step<T, E> {
    /// Whether this outcome ends the run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Produced(_))
    }
}

impl<T, E> From<Result<Option<T>, E>> for Step<T, E> {
    fn from(result: Result<Option<T>, E>) -> Self {
        match result {
            Ok(Some(value)) => Self::Produced(value),
            Ok(None) => Self::Done,
            Err(err) => Self::Failed(err),
        }
    }
}
