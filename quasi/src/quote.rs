use std::{fmt, sync::Arc};

use crate::{Expr, ScopeRef, Value, format::expr_text};

/// An expression frozen together with the scope it was written in.
///
/// Quotes are immutable. The `with_*` methods build new quotes that share
/// the untouched half with the original.
#[derive(Clone, PartialEq)]
pub struct Quote {
    expr: Arc<Expr>,
    scope: ScopeRef,
}

impl Quote {
    pub fn new(expr: Expr, scope: ScopeRef) -> Self {
        Self {
            expr: Arc::new(expr),
            scope,
        }
    }

    #[inline]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    #[inline]
    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    pub fn with_expr(&self, expr: Expr) -> Self {
        Self {
            expr: Arc::new(expr),
            scope: self.scope.clone(),
        }
    }

    pub fn with_scope(&self, scope: ScopeRef) -> Self {
        Self {
            expr: self.expr.clone(),
            scope,
        }
    }

    /// Source rendering of the quoted expression.
    pub fn text(&self) -> String {
        expr_text(&self.expr)
    }
}

impl fmt::Debug for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Quote")
            .field("expr", &self.text())
            .field("scope", &self.scope)
            .finish()
    }
}

/// Coerces a value into a quote.
///
/// Quotes are returned as they are. A language object is quoted in
/// `scope`; any other value becomes a literal quoted in `scope`.
pub fn as_quote(value: Value, scope: &ScopeRef) -> Quote {
    match value {
        Value::Quote(quote) => quote,
        Value::Expr(expr) => Quote::new(*expr, scope.clone()),
        other => Quote::new(Expr::Literal(other), scope.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_expr_keeps_scope() {
        let scope = ScopeRef::global();
        let quote = Quote::new(Expr::ident("a"), scope.clone());
        let changed = quote.with_expr(Expr::ident("b"));

        assert_eq!(changed.scope(), &scope);
        assert_eq!(changed.expr(), &Expr::ident("b"));
        assert_eq!(quote.expr(), &Expr::ident("a"));
    }

    #[test]
    fn test_with_scope_shares_expr() {
        let quote = Quote::new(Expr::ident("a"), ScopeRef::global());
        let other = ScopeRef::root("other");
        let moved = quote.with_scope(other.clone());

        assert_eq!(moved.scope(), &other);
        assert!(Arc::ptr_eq(&quote.expr, &moved.expr));
        assert_ne!(quote, moved);
    }

    #[test]
    fn test_as_quote() {
        let scope = ScopeRef::global();
        let elsewhere = ScopeRef::root("elsewhere");
        let existing = Quote::new(Expr::ident("x"), elsewhere.clone());

        let passed = as_quote(Value::Quote(existing.clone()), &scope);
        assert_eq!(passed, existing);

        let language = as_quote(Value::expr(Expr::ident("y")), &scope);
        assert_eq!(language.expr(), &Expr::ident("y"));
        assert_eq!(language.scope(), &scope);

        let literal = as_quote(Value::Int(3), &scope);
        assert_eq!(literal.expr(), &Expr::literal(3));
    }
}
