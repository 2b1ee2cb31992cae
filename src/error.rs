//! Error types for pattern matching.

use thiserror::Error;

use crate::position::Position;

/// Boxed error type accepted from user hooks and capture constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A run-aborting matching error.
///
/// A plain dismatch is *not* an error: it is reported as a normal result
/// with `ok == false`. The variants here terminate the whole run.
#[derive(Debug, Error)]
pub enum Error {
    /// The pattern dismatched where a full parse was required.
    #[error("the pattern is dismatched")]
    Dismatch,

    /// The pattern matched a strict prefix where a full parse was required.
    #[error("the pattern is not full matched")]
    NotFullMatched,

    /// The nesting depth reached `Config::callstack_limit`.
    #[error("callstack overflow")]
    CallstackOverflow,

    /// A repetition counter reached `Config::repeat_limit`.
    #[error("repeat limit is reached")]
    RepeatLimitReached,

    /// A tail invocation was issued after the frame already consumed text.
    #[error("cannot tail-execute a pattern after text was consumed")]
    ExecuteWhenConsumed,

    /// A grammar variable was dereferenced without a binding in scope.
    #[error("variable {0:?} is undefined")]
    UndefinedVariable(String),

    /// An `abort(..)` pattern was reached.
    #[error("abort at {position}: {message}")]
    Aborted {
        message: String,
        position: Position,
    },

    /// A user hook or capture constructor reported an error.
    #[error("user hook failed: {0}")]
    Hook(#[source] BoxError),

    /// Engine state that should be unreachable.
    #[error("internal matching invariant violated")]
    Internal,
}
