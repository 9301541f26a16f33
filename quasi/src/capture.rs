use log::{debug, trace};

use crate::definition::resolve_definition_names;
use crate::interpolate::{quote_in, splice_items};
use crate::{
    CallFrame, ConflictWarning, DEFAULT_NAME_WIDTH, Dots, DotsElement, Evaluator, Expr, Quote,
    QuoteError, Result, Value, as_quote,
};

/// Whether and how unnamed dots elements get a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Naming {
    #[default]
    Off,
    /// Name after the rendered expression, cut to this many characters.
    /// Zero means no limit.
    Width(usize),
}

impl Naming {
    /// Reads a host naming flag: a boolean, or a non-negative integer
    /// width. An integral non-negative double is taken as an integer.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(false) => Ok(Naming::Off),
            Value::Bool(true) => Ok(Naming::Width(DEFAULT_NAME_WIDTH)),
            Value::Int(width) => usize::try_from(*width)
                .map(Naming::Width)
                .map_err(|_| invalid_naming(value)),
            Value::Double(width)
                if width.fract() == 0.0 && *width >= 0.0 && *width <= usize::MAX as f64 =>
            {
                Ok(Naming::Width(*width as usize))
            }
            _ => Err(invalid_naming(value)),
        }
    }

    #[inline]
    pub fn is_enabled(self) -> bool {
        matches!(self, Naming::Width(_))
    }
}

impl From<bool> for Naming {
    fn from(named: bool) -> Self {
        if named {
            Naming::Width(DEFAULT_NAME_WIDTH)
        } else {
            Naming::Off
        }
    }
}

fn invalid_naming(value: &Value) -> QuoteError {
    QuoteError::config(format!(
        "naming must be a boolean or a non-negative integer width, found `{}`",
        value
    ))
}

/// Which empty (missing) arguments in `...` are dropped.
///
/// The choice applies to the arguments as written at the call. Empty
/// items produced by a `!!!` splice are always kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgnoreEmpty {
    /// Only a missing final argument, as in `f(a, b, )`.
    #[default]
    Trailing,
    All,
    None,
}

impl IgnoreEmpty {
    /// Whether an empty argument is kept. `last` marks the final one.
    fn keeps(self, last: bool) -> bool {
        match self {
            IgnoreEmpty::None => true,
            IgnoreEmpty::All => false,
            IgnoreEmpty::Trailing => !last,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureOptions {
    pub naming: Naming,
    /// Turn `name := value` elements into named elements.
    pub assign_names: bool,
    pub ignore_empty: IgnoreEmpty,
}

impl CaptureOptions {
    /// Naming on with the default width.
    pub fn named() -> Self {
        Self {
            naming: Naming::Width(DEFAULT_NAME_WIDTH),
            ..Default::default()
        }
    }
}

/// Captures the argument supplied for `param` in `frame`.
///
/// The expression is the one written at the most recent call site only:
/// an argument forwarded by name through an intermediate function shows
/// up as that function's parameter name. The result is interpolated and
/// frozen in the frame's own scope.
pub fn capture_argument(
    frame: &CallFrame,
    param: &str,
    evaluator: &dyn Evaluator,
) -> Result<Quote> {
    let promise = frame.param(param).ok_or_else(|| {
        QuoteError::shape(format!("`{}` is not an argument of this call", param))
    })?;
    trace!(
        "capturing `{}` = `{}` (written in {})",
        param,
        promise.expr(),
        promise.scope()
    );
    let quote = quote_in(promise.expr(), frame.scope(), evaluator)?;
    debug!(
        "captured argument `{}` as {} in {}",
        param,
        quote,
        quote.scope()
    );
    Ok(quote)
}

/// Captures the `...` of `frame`.
///
/// Empty arguments are dropped first, as `options` asks. Each remaining
/// element is interpolated in the scope it was written in. Splices are
/// evaluated there too and flattened in place. Then `:=` names are
/// resolved and unnamed elements are named. Name conflicts are only
/// logged; use [`capture_dots_with_warnings`] to get them back.
pub fn capture_dots(
    frame: &CallFrame,
    options: &CaptureOptions,
    evaluator: &dyn Evaluator,
) -> Result<Dots> {
    capture_dots_with_warnings(frame, options, evaluator).map(|(dots, _)| dots)
}

/// [`capture_dots`], also returning the warnings raised by `:=` names.
pub fn capture_dots_with_warnings(
    frame: &CallFrame,
    options: &CaptureOptions,
    evaluator: &dyn Evaluator,
) -> Result<(Dots, Vec<ConflictWarning>)> {
    let written = frame.dots();
    let mut elements = Vec::with_capacity(written.len());

    for (index, dot) in written.iter().enumerate() {
        let scope = dot.promise.scope();
        let last = index + 1 == written.len();
        if dot.promise.expr().is_missing() && !options.ignore_empty.keeps(last) {
            trace!("dropping empty argument {} of `...`", index + 1);
            continue;
        }

        let Expr::UnquoteSplice(operand) = dot.promise.expr() else {
            let quote = quote_in(dot.promise.expr(), scope, evaluator)?;
            elements.push(DotsElement::new(dot.name.clone(), quote));
            continue;
        };

        let items = splice_items(evaluator.eval(operand, scope)?)?;
        if let Some(name) = &dot.name {
            debug!("dropping name `{}` of spliced argument", name);
        }
        trace!("splicing {} element(s) from `{}`", items.len(), operand);
        elements.extend(
            items
                .into_iter()
                .map(|(name, item)| DotsElement::new(name, as_quote(item, scope))),
        );
    }

    let mut dots = Dots::from(elements);

    let mut warnings = Vec::new();
    if options.assign_names {
        (dots, warnings) = resolve_definition_names(dots)?;
    }

    if let Naming::Width(width) = options.naming {
        dots = dots.auto_name(width);
    }

    debug!(
        "captured {} dots element(s) from {}",
        dots.len(),
        frame.scope()
    );
    Ok((dots, warnings))
}
