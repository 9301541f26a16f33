use log::trace;

use crate::{Arg, Evaluator, Expr, ListItem, Quote, QuoteError, Result, ScopeRef, Value};

/// Turns an evaluated value back into expression form.
///
/// A language object is inlined as the expression it holds. Everything
/// else, quotes included, is embedded as a literal node.
pub fn embed(value: Value) -> Expr {
    match value {
        Value::Expr(expr) => *expr,
        other => Expr::Literal(other),
    }
}

/// The items a `!!!` operand contributes, in order.
///
/// A list contributes its items (names included), `NULL` contributes
/// nothing and a call contributes its arguments.
pub fn splice_items(value: Value) -> Result<Vec<ListItem>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::List(items) => Ok(items),
        Value::Expr(expr) => match *expr {
            Expr::Call { args, .. } => Ok(args
                .into_iter()
                .map(|arg| (arg.name, Value::expr(arg.value)))
                .collect()),
            other => Err(QuoteError::shape(format!(
                "`!!!` expects a list or a call, found expression `{}`",
                other
            ))),
        },
        other => Err(QuoteError::shape(format!(
            "`!!!` expects a list or a call, found {}",
            other.type_name()
        ))),
    }
}

struct Interpolator<'a> {
    scope: &'a ScopeRef,
    evaluator: &'a dyn Evaluator,
}

impl Interpolator<'_> {
    fn expr(&self, expr: &Expr) -> Result<Expr> {
        match expr {
            Expr::Unquote(operand) => {
                let value = self.evaluator.eval(operand, self.scope)?;
                trace!("unquoted `{}` in {}: {}", operand, self.scope, value);
                Ok(embed(value))
            }
            Expr::UnquoteSplice(operand) => Err(QuoteError::shape(format!(
                "`!!!{}` can only be used within an argument list",
                operand
            ))),
            Expr::Call { head, args } => Ok(Expr::Call {
                head: Box::new(self.expr(head)?),
                args: self.args(args)?,
            }),
            Expr::Definition { lhs, rhs } => Ok(Expr::Definition {
                lhs: Box::new(self.expr(lhs)?),
                rhs: Box::new(self.expr(rhs)?),
            }),
            Expr::Ident(_) | Expr::Literal(_) | Expr::Missing => Ok(expr.clone()),
        }
    }

    fn args(&self, args: &[Arg]) -> Result<Vec<Arg>> {
        let mut interpolated = Vec::with_capacity(args.len());
        for arg in args {
            let Expr::UnquoteSplice(operand) = &arg.value else {
                interpolated.push(Arg {
                    name: arg.name.clone(),
                    value: self.expr(&arg.value)?,
                });
                continue;
            };

            let value = self.evaluator.eval(operand, self.scope)?;
            let items = splice_items(value)?;
            trace!(
                "spliced `{}` in {}: {} argument(s)",
                operand,
                self.scope,
                items.len()
            );
            for (name, item) in items {
                interpolated.push(Arg {
                    name,
                    value: embed(item),
                });
            }
        }
        Ok(interpolated)
    }
}

/// Resolves every `!!` and `!!!` marker in `expr` against `scope`.
///
/// Unmarked subtrees are copied unchanged, so an expression without
/// markers comes back equal to itself. Fails with a shape error when a
/// splice appears anywhere other than an argument list; on failure
/// nothing is returned and nothing is modified.
pub fn interpolate(expr: &Expr, scope: &ScopeRef, evaluator: &dyn Evaluator) -> Result<Expr> {
    if !expr.has_markers() {
        return Ok(expr.clone());
    }
    Interpolator { scope, evaluator }.expr(expr)
}

/// Interpolates a quote against its own scope.
pub fn interpolate_quote(quote: &Quote, evaluator: &dyn Evaluator) -> Result<Quote> {
    let expr = interpolate(quote.expr(), quote.scope(), evaluator)?;
    Ok(quote.with_expr(expr))
}

/// Interpolates `expr` in `scope` and freezes the result there.
///
/// When the whole expression unquotes to a quote, that quote is returned
/// as it is, keeping its own scope, instead of being wrapped again.
pub fn quote_in(expr: &Expr, scope: &ScopeRef, evaluator: &dyn Evaluator) -> Result<Quote> {
    match interpolate(expr, scope, evaluator)? {
        Expr::Literal(Value::Quote(quote)) => Ok(quote),
        expr => Ok(Quote::new(expr, scope.clone())),
    }
}
