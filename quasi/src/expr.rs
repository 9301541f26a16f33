//! Expression trees.
//!
//! Expressions are plain immutable values: they carry no scope and are
//! copied freely. The three protocol shapes (unquote, unquote-splice and
//! definition) have dedicated variants. [`Expr::call`] recognizes the
//! generic call spellings of those shapes, so hosts that build calls
//! programmatically end up with the same trees as hosts that build the
//! variants directly.

use crate::{Symbol, Value};

/// Head of the functional unquote spelling, `UQ(x)`.
pub const UNQUOTE: &str = "UQ";
/// Head of the functional splice spelling, `UQS(x)`.
pub const UNQUOTE_SPLICE: &str = "UQS";
/// Logical negation. Two of them spell an unquote, three a splice.
pub const BANG: &str = "!";
/// The definition operator, `lhs := rhs`.
pub const DEFINE: &str = ":=";
/// The variadic placeholder.
pub const DOTS: &str = "...";

/// A call argument: an optional name and its expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: Option<Symbol>,
    pub value: Expr,
}

impl Arg {
    pub fn positional(value: Expr) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: &str, value: Expr) -> Self {
        Self {
            name: Some(Symbol::new(name)),
            value,
        }
    }
}

impl From<Expr> for Arg {
    fn from(value: Expr) -> Self {
        Arg::positional(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bare name, looked up when evaluated.
    Ident(Symbol),
    /// A constant, or a value embedded by unquoting.
    Literal(Value),
    /// `head(args...)`. Operators are calls too: `a + b` is `+`(a, b).
    Call { head: Box<Expr>, args: Vec<Arg> },
    /// An empty argument slot, like the trailing slot of `f(a, )`.
    Missing,
    /// `!!x`: substitute the value of `x` at capture time.
    Unquote(Box<Expr>),
    /// `!!!x`: splice the elements of `x` into the enclosing arguments.
    UnquoteSplice(Box<Expr>),
    /// `lhs := rhs`.
    Definition { lhs: Box<Expr>, rhs: Box<Expr> },
}

impl Expr {
    pub fn ident(name: &str) -> Self {
        Expr::Ident(Symbol::new(name))
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn dots() -> Self {
        Expr::ident(DOTS)
    }

    /// Builds a call, recognizing the protocol shapes:
    ///
    /// - `UQ(x)` and `!!x` become [`Expr::Unquote`]
    /// - `UQS(x)` and `!!!x` become [`Expr::UnquoteSplice`]
    /// - `` `:=`(lhs, rhs) `` becomes [`Expr::Definition`]
    ///
    /// Anything else, including a `:=` call of the wrong arity, stays a
    /// plain [`Expr::Call`].
    pub fn call(head: Expr, mut args: Vec<Arg>) -> Self {
        let single = args.len() == 1 && args[0].name.is_none();
        let pair = args.len() == 2 && args.iter().all(|a| a.name.is_none());

        match head.as_ident().map(Symbol::as_str) {
            Some(UNQUOTE) if single => {
                return Expr::Unquote(Box::new(args.remove(0).value));
            }
            Some(UNQUOTE_SPLICE) if single => {
                return Expr::UnquoteSplice(Box::new(args.remove(0).value));
            }
            Some(BANG) if single => match negate(args.remove(0).value) {
                Ok(marker) => return marker,
                Err(operand) => args.push(Arg::positional(operand)),
            },
            Some(DEFINE) if pair => {
                let rhs = args.remove(1).value;
                let lhs = args.remove(0).value;
                return Expr::Definition {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
            }
            _ => {}
        }

        Expr::Call {
            head: Box::new(head),
            args,
        }
    }

    /// `name(args...)` with positional arguments.
    pub fn apply(name: &str, args: impl IntoIterator<Item = Expr>) -> Self {
        Expr::call(
            Expr::ident(name),
            args.into_iter().map(Arg::positional).collect(),
        )
    }

    pub fn binary(operator: &str, lhs: Expr, rhs: Expr) -> Self {
        Expr::apply(operator, [lhs, rhs])
    }

    pub fn unary(operator: &str, operand: Expr) -> Self {
        Expr::apply(operator, [operand])
    }

    pub fn unquote(operand: Expr) -> Self {
        Expr::Unquote(Box::new(operand))
    }

    pub fn splice(operand: Expr) -> Self {
        Expr::UnquoteSplice(Box::new(operand))
    }

    pub fn define(lhs: Expr, rhs: Expr) -> Self {
        Expr::Definition {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn as_ident(&self) -> Option<&Symbol> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }

    #[inline]
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(self, Expr::Ident(ident) if ident == name)
    }

    /// The head name of a call whose head is a bare identifier.
    pub fn head_name(&self) -> Option<&Symbol> {
        match self {
            Expr::Call { head, .. } => head.as_ident(),
            _ => None,
        }
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Expr::Missing)
    }

    #[inline]
    pub fn is_dots(&self) -> bool {
        self.is_ident(DOTS)
    }

    /// `true` if an unquote or splice marker occurs anywhere in the tree.
    ///
    /// Embedded values are opaque: markers inside an embedded quote
    /// belong to that quote and are not counted.
    pub fn has_markers(&self) -> bool {
        match self {
            Expr::Unquote(_) | Expr::UnquoteSplice(_) => true,
            Expr::Call { head, args } => {
                head.has_markers() || args.iter().any(|a| a.value.has_markers())
            }
            Expr::Definition { lhs, rhs } => lhs.has_markers() || rhs.has_markers(),
            Expr::Ident(_) | Expr::Literal(_) | Expr::Missing => false,
        }
    }
}

/// Applies one more `!` to `operand`: `!` over `!x` is an unquote and
/// `!` over an unquote is a splice. Any other operand is handed back.
fn negate(operand: Expr) -> Result<Expr, Expr> {
    match operand {
        Expr::Unquote(inner) => Ok(Expr::UnquoteSplice(inner)),
        Expr::Call { head, mut args }
            if head.is_ident(BANG) && args.len() == 1 && args[0].name.is_none() =>
        {
            Ok(Expr::Unquote(Box::new(args.remove(0).value)))
        }
        other => Err(other),
    }
}

impl From<Symbol> for Expr {
    fn from(name: Symbol) -> Self {
        Expr::Ident(name)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}
