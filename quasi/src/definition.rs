use log::{debug, warn};

use crate::{
    ConflictWarning, DEFINE, Dots, DotsElement, Evaluator, Expr, Quote, QuoteError, Result,
    ScopeRef, Symbol, Value, interpolate::interpolate_quote,
};

/// A resolved `lhs := rhs` element. Both sides are interpolated on their
/// own and quoted in the scope of the element they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub lhs: Quote,
    pub rhs: Quote,
}

impl Definition {
    /// The left-hand side reduced to a name.
    ///
    /// Identifiers and strings reduce to themselves. An embedded quote
    /// reduces to its expression when that is an identifier or a string.
    pub fn name(&self) -> Result<Symbol> {
        lhs_name(self.lhs.expr()).ok_or_else(|| {
            QuoteError::shape(format!(
                "the left-hand side of `:=` must be a name or a string, found `{}`",
                self.lhs.expr()
            ))
        })
    }
}

fn lhs_name(expr: &Expr) -> Option<Symbol> {
    match expr {
        Expr::Ident(name) => Some(name.clone()),
        Expr::Literal(Value::Str(text)) => Some(Symbol::from_text(text)),
        Expr::Literal(Value::Quote(quote)) => lhs_name(quote.expr()),
        _ => None,
    }
}

/// `true` if the root of `expr` is the definition operator.
#[inline]
pub fn is_definition(expr: &Expr) -> bool {
    matches!(expr, Expr::Definition { .. })
}

/// Also catches `:=` calls of the wrong arity, which are reported rather
/// than passed through as plain arguments.
fn uses_define(expr: &Expr) -> bool {
    is_definition(expr) || expr.head_name().is_some_and(|head| head == DEFINE)
}

/// One side of an interpolated definition. A side that unquoted to a
/// quote is that quote.
fn side(expr: &Expr, scope: &ScopeRef) -> Quote {
    match expr {
        Expr::Literal(Value::Quote(quote)) => quote.clone(),
        expr => Quote::new(expr.clone(), scope.clone()),
    }
}

/// Splits a quote whose markers are already resolved.
fn split(quote: &Quote) -> Result<Definition> {
    match quote.expr() {
        Expr::Definition { lhs, rhs } => Ok(Definition {
            lhs: side(lhs, quote.scope()),
            rhs: side(rhs, quote.scope()),
        }),
        Expr::Call { args, .. } if uses_define(quote.expr()) => {
            let message = format!(
                "`:=` takes exactly two unnamed operands, found {} argument(s)",
                args.len()
            );
            Err(QuoteError::shape(message))
        }
        other => Err(QuoteError::shape(format!(
            "expected a `lhs := rhs` definition, found `{}`",
            other
        ))),
    }
}

/// Splits a `lhs := rhs` quote into its two sides, interpolating each in
/// the scope of the quote.
pub fn as_definition(quote: &Quote, evaluator: &dyn Evaluator) -> Result<Definition> {
    if is_definition(quote.expr()) {
        split(&interpolate_quote(quote, evaluator)?)
    } else {
        split(quote)
    }
}

/// Separates definitions from plain elements of captured dots. Both
/// outputs keep the relative order of the input.
///
/// Captured elements are already interpolated, so nothing is evaluated
/// again here.
pub fn partition_definitions(dots: Dots) -> Result<(Dots, Vec<Definition>)> {
    let mut plain = Dots::new();
    let mut definitions = Vec::new();
    for element in dots {
        if uses_define(element.quote.expr()) {
            definitions.push(split(&element.quote)?);
        } else {
            plain.push(element.name, element.quote);
        }
    }
    debug!(
        "partitioned dots: {} plain, {} definition(s)",
        plain.len(),
        definitions.len()
    );
    Ok((plain, definitions))
}

/// Turns every `lhs := rhs` element of captured dots into an element
/// named after `lhs` holding `rhs`.
///
/// An element that also carries an explicit name keeps the `:=` name; a
/// [`ConflictWarning`] is returned for it.
pub fn resolve_definition_names(dots: Dots) -> Result<(Dots, Vec<ConflictWarning>)> {
    let mut resolved = Vec::with_capacity(dots.len());
    let mut warnings = Vec::new();

    for (position, element) in dots.into_iter().enumerate() {
        if !uses_define(element.quote.expr()) {
            resolved.push(element);
            continue;
        }

        let definition = split(&element.quote)?;
        let name = definition.name()?;
        if let Some(explicit_name) = element.name.filter(|n| !n.is_empty()) {
            let warning = ConflictWarning {
                position,
                explicit_name,
                resolved_name: name.clone(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
        resolved.push(DotsElement::new(Some(name), definition.rhs));
    }

    Ok((Dots::from(resolved), warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arg, BasicEvaluator};

    fn ident(name: &str) -> Expr {
        Expr::ident(name)
    }

    fn quote(expr: Expr, scope: &ScopeRef) -> Quote {
        Quote::new(expr, scope.clone())
    }

    fn define_in(expr: Expr, scope: &ScopeRef) -> Definition {
        let q = quote(expr, scope);
        as_definition(&q, &BasicEvaluator).unwrap()
    }

    #[test]
    fn test_as_definition_splits_sides() {
        let scope = ScopeRef::global();
        let q = quote(Expr::define(ident("x"), ident("expr")), &scope);
        let definition = as_definition(&q, &BasicEvaluator).unwrap();

        assert_eq!(definition.lhs, quote(ident("x"), &scope));
        assert_eq!(definition.rhs, quote(ident("expr"), &scope));
        assert_eq!(definition.name(), Ok(Symbol::new("x")));
    }

    #[test]
    fn test_plain_named_argument_is_not_a_definition() {
        let scope = ScopeRef::global();
        // `y = expr` as an argument is just a named argument; what reaches
        // the quote is the bare value.
        let q = quote(ident("expr"), &scope);
        assert!(as_definition(&q, &BasicEvaluator).unwrap_err().is_shape());

        let call = quote(Expr::binary("=", ident("y"), ident("expr")), &scope);
        let err = as_definition(&call, &BasicEvaluator).unwrap_err();
        assert!(err.is_shape());
    }

    #[test]
    fn test_malformed_operator() {
        let scope = ScopeRef::global();
        let malformed = Expr::call(
            ident(DEFINE),
            vec![
                Arg::positional(ident("a")),
                Arg::positional(ident("b")),
                Arg::positional(ident("c")),
            ],
        );
        assert!(!is_definition(&malformed));

        let q = quote(malformed, &scope);
        let err = as_definition(&q, &BasicEvaluator).unwrap_err();
        assert!(err.is_shape());
        assert!(err.message.contains("exactly two"));
    }

    #[test]
    fn test_sides_are_interpolated_independently() {
        let scope = ScopeRef::global();
        scope.define("var", "foo");
        scope.define("n", 2);
        let expr = Expr::define(
            Expr::unquote(ident("var")),
            Expr::binary("*", ident("x"), Expr::unquote(ident("n"))),
        );
        let definition = define_in(expr, &scope);

        assert_eq!(definition.name(), Ok(Symbol::new("foo")));
        assert_eq!(definition.rhs.text(), "x * 2");
        assert_eq!(definition.rhs.scope(), &scope);
    }

    #[test]
    fn test_name_requires_name_or_string() {
        let scope = ScopeRef::global();
        let expr = Expr::define(Expr::literal(1), ident("x"));
        let definition = define_in(expr, &scope);
        assert!(definition.name().unwrap_err().is_shape());

        let call = Expr::define(Expr::apply("f", [ident("a")]), ident("x"));
        let definition = define_in(call, &scope);
        assert!(definition.name().is_err());
    }

    #[test]
    fn test_name_through_embedded_quote() {
        let scope = ScopeRef::global();
        let other = ScopeRef::root("other");
        scope.define("q", quote(ident("bar"), &other));
        let expr = Expr::define(Expr::apply("f", [Expr::unquote(ident("q"))]), ident("x"));
        // the left-hand side is a call around the quote, so no name
        let definition = define_in(expr, &scope);
        assert!(definition.name().is_err());

        let expr = Expr::define(Expr::unquote(ident("q")), ident("x"));
        let definition = define_in(expr, &scope);
        assert_eq!(definition.lhs.scope(), &other);
        assert_eq!(definition.name(), Ok(Symbol::new("bar")));
    }

    #[test]
    fn test_string_name_is_not_interned() {
        let scope = ScopeRef::global();
        let lhs = Expr::literal("string-lhs-only");
        let q = quote(Expr::define(lhs, ident("x")), &scope);
        let definition = as_definition(&q, &BasicEvaluator).unwrap();

        assert_eq!(definition.name(), Ok(Symbol::new("string-lhs-only")));
        // comparing against `Symbol::new` above interned it, so check a
        // second name that only ever came from data
        let q = quote(Expr::define(Expr::literal("data-lhs"), ident("x")), &scope);
        let name = as_definition(&q, &BasicEvaluator).unwrap().name().unwrap();
        assert_eq!(name, "data-lhs");
        assert!(!crate::symbol::is_interned("data-lhs"));
    }

    #[test]
    fn test_captured_sides_are_not_evaluated_again() {
        let scope = ScopeRef::global();
        // `!!e` with `e = quote(!!y)` leaves a literal `!!y` in the tree
        let injected = Expr::define(ident("nm"), Expr::unquote(ident("y")));
        let captured = quote(injected, &scope);
        let dots: Dots = vec![DotsElement::new(None, captured)].into();

        let (resolved, warnings) = resolve_definition_names(dots.clone()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(resolved.get("nm").map(Quote::text), Some("!!y".into()));

        let (plain, definitions) = partition_definitions(dots).unwrap();
        assert!(plain.is_empty());
        assert_eq!(definitions[0].rhs.text(), "!!y");
        assert_eq!(definitions[0].rhs.scope(), &scope);
    }

    #[test]
    fn test_partition_keeps_order() {
        let scope = ScopeRef::global();
        let dots: Dots = vec![
            DotsElement::new(None, quote(ident("a"), &scope)),
            DotsElement::new(None, quote(Expr::define(ident("x"), ident("one")), &scope)),
            DotsElement::new(Some("b".into()), quote(ident("b"), &scope)),
            DotsElement::new(None, quote(Expr::define(ident("y"), ident("two")), &scope)),
        ]
        .into();

        let (plain, definitions) = partition_definitions(dots).unwrap();
        let texts: Vec<_> = plain.quotes().map(Quote::text).collect();
        assert_eq!(texts, ["a", "b"]);
        assert_eq!(plain.get("b").map(Quote::text), Some("b".into()));

        let names: Vec<_> = definitions
            .iter()
            .map(|definition| definition.name().unwrap())
            .collect();
        assert_eq!(names, [Symbol::new("x"), Symbol::new("y")]);
    }

    #[test]
    fn test_partition_rejects_malformed_operator() {
        let scope = ScopeRef::global();
        let malformed = Expr::call(ident(DEFINE), vec![Arg::positional(ident("a"))]);
        let element = DotsElement::new(None, quote(malformed, &scope));
        let dots: Dots = vec![element].into();
        assert!(partition_definitions(dots).unwrap_err().is_shape());
    }

    #[test]
    fn test_resolve_names_with_conflict() {
        let scope = ScopeRef::global();
        let dots: Dots = vec![
            DotsElement::new(Some("keep".into()), quote(ident("a"), &scope)),
            DotsElement::new(
                Some("explicit".into()),
                quote(Expr::define(ident("foo"), ident("expr")), &scope),
            ),
        ]
        .into();

        let (resolved, warnings) = resolve_definition_names(dots).unwrap();
        assert_eq!(resolved.get("keep").map(Quote::text), Some("a".into()));
        assert_eq!(resolved.get("foo").map(Quote::text), Some("expr".into()));
        assert!(resolved.get("explicit").is_none());
        assert_eq!(
            warnings,
            [ConflictWarning {
                position: 1,
                explicit_name: Symbol::new("explicit"),
                resolved_name: Symbol::new("foo"),
            }]
        );
    }

    #[test]
    fn test_resolve_names_bad_lhs() {
        let scope = ScopeRef::global();
        let bad = Expr::define(Expr::literal(true), ident("x"));
        let dots: Dots = vec![DotsElement::new(None, quote(bad, &scope))].into();
        let err = resolve_definition_names(dots).unwrap_err();
        assert!(err.is_shape());
    }
}
