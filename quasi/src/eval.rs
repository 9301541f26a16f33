use log::trace;

use crate::{Arg, Expr, QuoteError, Result, ScopeRef, Value, interpolate::quote_in};

/// The host evaluator.
///
/// Capture never evaluates the expressions it freezes. The only things it
/// evaluates are the operands of `!!` and `!!!`, and it does so through
/// this trait so the host decides what evaluation means.
pub trait Evaluator {
    fn eval(&self, expr: &Expr, scope: &ScopeRef) -> Result<Value>;
}

/// A small reference evaluator.
///
/// - identifiers are looked up through the scope chain
/// - literals evaluate to themselves; an embedded quote evaluates its
///   expression in its own scope
/// - `quote(x)` yields `x` as a language object, `quo(x)` captures `x`
///   in the current scope, `list(...)` builds a named list
/// - any other call must name a [`crate::Builtin`] bound in scope
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicEvaluator;

impl BasicEvaluator {
    fn eval_args(&self, args: &[Arg], scope: &ScopeRef) -> Result<Vec<Value>> {
        args.iter().map(|arg| self.eval(&arg.value, scope)).collect()
    }

    fn eval_call(&self, head: &Expr, args: &[Arg], scope: &ScopeRef) -> Result<Value> {
        if let Some(name) = head.as_ident() {
            match (name.as_str(), args) {
                ("quote", [arg]) => return Ok(Value::expr(arg.value.clone())),
                ("quo", [arg]) => {
                    let quote = quote_in(&arg.value, scope, self)?;
                    return Ok(Value::Quote(quote));
                }
                ("list", _) => {
                    let items = args
                        .iter()
                        .map(|arg| {
                            let value = self.eval(&arg.value, scope)?;
                            Ok((arg.name.clone(), value))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    return Ok(Value::List(items));
                }
                _ => {}
            }
        }

        match self.eval(head, scope)? {
            Value::Builtin(builtin) => {
                let values = self.eval_args(args, scope)?;
                trace!(
                    "calling {} with {} argument(s)",
                    builtin.name(),
                    values.len()
                );
                builtin.call(&values)
            }
            other => Err(QuoteError::eval(format!(
                "attempt to apply non-function `{}`",
                other
            ))),
        }
    }
}

impl Evaluator for BasicEvaluator {
    fn eval(&self, expr: &Expr, scope: &ScopeRef) -> Result<Value> {
        match expr {
            Expr::Ident(name) => scope.lookup(name).ok_or_else(|| {
                QuoteError::eval(format!("object `{}` not found", name))
            }),
            Expr::Literal(Value::Quote(quote)) => self.eval(quote.expr(), quote.scope()),
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Call { head, args } => self.eval_call(head, args, scope),
            Expr::Missing => Err(QuoteError::eval("argument is missing")),
            Expr::Unquote(_) | Expr::UnquoteSplice(_) => Err(QuoteError::eval(
                "`!!` and `!!!` can only be used within a quoted argument",
            )),
            Expr::Definition { .. } => Err(QuoteError::eval(
                "`:=` can only be used within a quoted argument",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Quote};

    fn scope_with_sum() -> ScopeRef {
        let scope = ScopeRef::global();
        scope.define_builtin("sum", |args| {
            let mut total = 0;
            for arg in args {
                match arg {
                    Value::Int(n) => total += n,
                    other => {
                        return Err(QuoteError::eval(format!(
                            "cannot add {}",
                            other.type_name()
                        )));
                    }
                }
            }
            Ok(Value::Int(total))
        });
        scope
    }

    #[test]
    fn test_lookup_and_builtin_call() {
        let scope = scope_with_sum();
        scope.define("x", 2);
        let expr = Expr::apply("sum", [Expr::ident("x"), Expr::literal(3)]);
        assert_eq!(BasicEvaluator.eval(&expr, &scope), Ok(Value::Int(5)));
    }

    #[test]
    fn test_unbound_identifier() {
        let err = BasicEvaluator
            .eval(&Expr::ident("nope"), &ScopeRef::global())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Eval);
    }

    #[test]
    fn test_quote_and_list_forms() {
        let scope = ScopeRef::global();
        scope.define("y", "why");
        let quoted = Expr::apply("quote", [Expr::ident("y")]);
        assert_eq!(
            BasicEvaluator.eval(&quoted, &scope),
            Ok(Value::expr(Expr::ident("y")))
        );

        let list = Expr::call(
            Expr::ident("list"),
            vec![Arg::named("a", Expr::ident("y")), Arg::positional(quoted)],
        );
        assert_eq!(
            BasicEvaluator.eval(&list, &scope),
            Ok(Value::List(vec![
                (Some("a".into()), Value::str("why")),
                (None, Value::expr(Expr::ident("y"))),
            ]))
        );
    }

    #[test]
    fn test_quo_captures_current_scope() {
        let scope = ScopeRef::global();
        let sum = Expr::binary("+", Expr::ident("a"), Expr::ident("b"));
        let expr = Expr::apply("quo", [sum]);
        match BasicEvaluator.eval(&expr, &scope) {
            Ok(Value::Quote(quote)) => {
                assert_eq!(quote.scope(), &scope);
                assert_eq!(quote.text(), "a + b");
            }
            other => panic!("Expected quote, got {:?}", other),
        }
    }

    #[test]
    fn test_embedded_quote_evaluates_in_own_scope() {
        let outer = ScopeRef::global();
        outer.define("x", "outer");
        let inner = ScopeRef::root("inner");
        inner.define("x", "inner");

        let embedded = Expr::literal(Quote::new(Expr::ident("x"), inner.clone()));
        assert_eq!(
            BasicEvaluator.eval(&embedded, &outer),
            Ok(Value::str("inner"))
        );
    }

    #[test]
    fn test_markers_are_not_evaluable() {
        let scope = ScopeRef::global();
        let unquote = Expr::unquote(Expr::ident("x"));
        let definition = Expr::define(Expr::ident("x"), Expr::literal(1));
        assert!(BasicEvaluator.eval(&unquote, &scope).is_err());
        assert!(BasicEvaluator.eval(&definition, &scope).is_err());
        assert!(BasicEvaluator.eval(&Expr::Missing, &scope).is_err());
    }

    #[test]
    fn test_non_function_head() {
        let scope = ScopeRef::global();
        scope.define("f", 1);
        let err = BasicEvaluator
            .eval(&Expr::apply("f", []), &scope)
            .unwrap_err();
        assert!(err.message.contains("non-function"));
    }
}
