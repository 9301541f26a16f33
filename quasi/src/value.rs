use std::{fmt, sync::Arc};

use crate::{Expr, Quote, Result, Symbol};

/// One entry of a [`Value::List`]: an optional name and the item.
pub type ListItem = (Option<Symbol>, Value);

type BuiltinFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// A host function the evaluator can call with already evaluated
/// positional arguments.
#[derive(Clone)]
pub struct Builtin {
    name: Symbol,
    func: Arc<BuiltinFn>,
}

impl Builtin {
    pub fn new(
        name: &str,
        func: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: Symbol::new(name),
            func: Arc::new(func),
        }
    }

    #[inline]
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<builtin {}>", self.name)
    }
}

/// An evaluated value.
///
/// This is what an unquote operand evaluates to and what gets embedded
/// back into an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(Arc<str>),
    /// A language object: an unevaluated expression held as data.
    Expr(Box<Expr>),
    Quote(Quote),
    /// An ordered list whose items may carry names.
    List(Vec<ListItem>),
    Builtin(Builtin),
}

impl Value {
    pub fn str(value: &str) -> Self {
        Value::Str(Arc::from(value))
    }

    pub fn expr(expr: Expr) -> Self {
        Value::Expr(Box::new(expr))
    }

    /// An unnamed list.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().map(|item| (None, item)).collect())
    }

    /// A list where every item is named.
    pub fn named_list<'a>(items: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Value::List(
            items
                .into_iter()
                .map(|(name, item)| (Some(Symbol::new(name)), item))
                .collect(),
        )
    }

    pub fn builtin(
        name: &str,
        func: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Value::Builtin(Builtin::new(name, func))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "logical",
            Value::Int(_) => "integer",
            Value::Double(_) => "double",
            Value::Str(_) => "character",
            Value::Expr(_) => "language",
            Value::Quote(_) => "quote",
            Value::List(_) => "list",
            Value::Builtin(_) => "builtin",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::str(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Arc::from(value))
    }
}

impl From<Expr> for Value {
    fn from(expr: Expr) -> Self {
        Value::expr(expr)
    }
}

impl From<Quote> for Value {
    fn from(quote: Quote) -> Self {
        Value::Quote(quote)
    }
}
