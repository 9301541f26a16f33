mod capture;
mod definition;
mod dots;
mod error;
mod eval;
mod expr;
pub mod format;
mod frame;
mod interpolate;
mod quote;
mod scope;
mod symbol;
mod value;

pub use capture::{
    CaptureOptions, IgnoreEmpty, Naming, capture_argument, capture_dots, capture_dots_with_warnings,
};
pub use definition::{
    Definition, as_definition, is_definition, partition_definitions, resolve_definition_names,
};
pub use dots::{Dots, DotsElement};
pub use error::{ConflictWarning, ErrorKind, QuoteError, Result};
pub use eval::{BasicEvaluator, Evaluator};
pub use expr::*;
pub use format::{DEFAULT_NAME_WIDTH, expr_text, truncate_text, value_text};
pub use frame::{CallFrame, Closure, DotsPromise, Formals, Promise};
pub use interpolate::{embed, interpolate, interpolate_quote, quote_in, splice_items};
pub use quote::{Quote, as_quote};
pub use scope::{Scope, ScopeRef};
pub use symbol::Symbol;
pub use value::{Builtin, ListItem, Value};
