//! Parse-tree captures: the `Capture` trait, the built-in node types and
//! the user constructor signatures.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::error::BoxError;
use crate::position::Position;

/// A node of the user-visible parse tree.
///
/// The two built-in implementations are [`Token`] (terminal) and
/// [`Variable`] (non-terminal); user constructors may return any other
/// implementation and downcast it back through [`Capture::as_any`].
pub trait Capture: Any + fmt::Debug + Send + Sync {
    /// Whether this node is a terminal.
    fn is_terminal(&self) -> bool;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// Constructor for terminal captures, invoked with the matched text and
/// the position of its first byte.
pub type TerminalConstructor =
    Arc<dyn Fn(&str, Position) -> Result<Box<dyn Capture>, BoxError> + Send + Sync>;

/// Constructor for non-terminal captures, invoked with the child captures
/// collected while the wrapped pattern matched.
pub type NonTerminalConstructor =
    Arc<dyn Fn(Vec<Box<dyn Capture>>) -> Result<Box<dyn Capture>, BoxError> + Send + Sync>;

/// Built-in terminal capture: a typed piece of matched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub tok_type: i32,
    pub value: String,
    pub position: Position,
}

/// Built-in non-terminal capture produced by grammar-variable capturing.
#[derive(Debug)]
pub struct Variable {
    pub name: String,
    pub subs: Vec<Box<dyn Capture>>,
}

impl Capture for Token {
    fn is_terminal(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Capture for Variable {
    fn is_terminal(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "token_{}{:?}@{}",
            self.tok_type, self.value, self.position
        )
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})",
            self.name,
            self.subs.iter().map(|sub| format!("{sub:?}")).join(", ")
        )
    }
}
