use std::fmt;

use crate::Symbol;

pub type Result<T, E = QuoteError> = std::result::Result<T, E>;

/// What went wrong while capturing or interpolating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An expression does not have the structure an operation requires.
    Shape,
    /// An option value is outside its accepted domain.
    Config,
    /// The evaluator failed on an unquoted or spliced operand.
    Eval,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Shape => "shape error",
            ErrorKind::Config => "config error",
            ErrorKind::Eval => "evaluation error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteError {
    pub kind: ErrorKind,
    pub message: String,
}

impl QuoteError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Shape, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn eval(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Eval, message)
    }

    #[inline]
    pub fn is_shape(&self) -> bool {
        self.kind == ErrorKind::Shape
    }

    #[inline]
    pub fn is_config(&self) -> bool {
        self.kind == ErrorKind::Config
    }
}

impl fmt::Display for QuoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl std::error::Error for QuoteError {}

/// A dots element carried an explicit name and a `:=` left-hand side at
/// the same time. The left-hand side wins; capture continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictWarning {
    /// Index of the element in the captured dots.
    pub position: usize,
    pub explicit_name: Symbol,
    pub resolved_name: Symbol,
}

impl fmt::Display for ConflictWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "argument {}: name `{}` is ignored in favour of `:=` name `{}`",
            self.position + 1,
            self.explicit_name,
            self.resolved_name
        )
    }
}
