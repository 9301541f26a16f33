//! Explicit call frames.
//!
//! Capture needs two things from the host runtime: the expression a caller
//! wrote for an argument, and the scope it wrote it in. Instead of
//! introspecting a live call stack, the host records both in a
//! [`CallFrame`] when it activates a function.
//!
//! ```text
//!  global:  g(a + b)
//!             │  bar ← Promise(a + b, global)
//!             ▼
//!  g frame: fn(bar, ...)
//!             │  foo ← Promise(bar, g frame)
//!             │  ... ← g frame's dots promises, forwarded as they are
//!             ▼
//!  fn frame
//! ```
//!
//! Named arguments are re-written at every hop, so only the most recent
//! call site is visible through them. Dots are forwarded by reference, so
//! each dots promise keeps the scope of the call site that wrote it, no
//! matter how many frames it passed through.

use std::sync::Arc;

use log::trace;

use crate::{Arg, DOTS, Expr, QuoteError, Result, ScopeRef, Symbol};

/// An unevaluated argument: the expression as written and the scope it
/// was written in.
#[derive(Debug, Clone, PartialEq)]
pub struct Promise {
    expr: Arc<Expr>,
    scope: ScopeRef,
}

impl Promise {
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
}

/// One element of a frame's `...`.
#[derive(Debug, Clone, PartialEq)]
pub struct DotsPromise {
    pub name: Option<Symbol>,
    pub promise: Promise,
}

/// The declared parameters of a function, in order. May contain `...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Formals {
    names: Vec<Symbol>,
}

impl Formals {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            names: names.into_iter().map(Symbol::new).collect(),
        }
    }

    #[inline]
    pub fn names(&self) -> &[Symbol] {
        &self.names
    }

    fn dots_position(&self) -> Option<usize> {
        self.names.iter().position(|name| name == DOTS)
    }

    #[inline]
    pub fn has_dots(&self) -> bool {
        self.dots_position().is_some()
    }
}

/// A function activation as far as capture is concerned.
#[derive(Debug, Clone)]
pub struct CallFrame {
    scope: ScopeRef,
    params: Vec<(Symbol, Promise)>,
    dots: Vec<DotsPromise>,
}

impl CallFrame {
    /// An empty frame whose local scope is `scope`.
    pub fn new(scope: ScopeRef) -> Self {
        Self {
            scope,
            params: Vec::new(),
            dots: Vec::new(),
        }
    }

    /// Binds `name` to `expr` as written in `written_in`.
    pub fn with_param(mut self, name: &str, expr: Expr, written_in: &ScopeRef) -> Self {
        let name = Symbol::new(name);
        let promise = Promise::new(expr, written_in.clone());
        match self.params.iter_mut().find(|(param, _)| *param == name) {
            Some((_, slot)) => *slot = promise,
            None => self.params.push((name, promise)),
        }
        self
    }

    /// Appends a dots element written in `written_in`.
    pub fn with_dot(mut self, name: Option<&str>, expr: Expr, written_in: &ScopeRef) -> Self {
        self.dots.push(DotsPromise {
            name: name.map(Symbol::new),
            promise: Promise::new(expr, written_in.clone()),
        });
        self
    }

    /// Activates a function: matches the arguments of a call written in
    /// `caller` against `formals`, the way an R-like host does.
    ///
    /// Arguments are matched by exact name first, then positionally
    /// against the formals before `...`. Whatever is left goes to `...`.
    /// A bare `...` argument forwards the dots of `caller_frame` without
    /// touching their expressions or scopes.
    pub fn bind(
        formals: &Formals,
        scope: ScopeRef,
        args: &[Arg],
        caller: &ScopeRef,
        caller_frame: Option<&CallFrame>,
    ) -> Result<Self> {
        let actuals = expand_actuals(args, caller, caller_frame)?;
        let positional_limit = formals.dots_position().unwrap_or(formals.names.len());

        let mut bound: Vec<Option<Promise>> = vec![None; formals.names.len()];
        let mut unmatched = Vec::new();

        for actual in actuals {
            let formal = actual.name.as_ref().and_then(|name| {
                formals
                    .names
                    .iter()
                    .position(|formal| formal == name && formal != DOTS)
            });
            match formal {
                Some(index) if bound[index].is_some() => {
                    return Err(QuoteError::shape(format!(
                        "formal argument `{}` matched by multiple actual arguments",
                        formals.names[index]
                    )));
                }
                Some(index) => bound[index] = Some(actual.promise),
                None => unmatched.push(actual),
            }
        }

        let mut dots = Vec::new();
        let mut next_formal = 0;
        for actual in unmatched {
            if actual.name.is_none() {
                while next_formal < positional_limit && bound[next_formal].is_some() {
                    next_formal += 1;
                }
                if next_formal < positional_limit {
                    bound[next_formal] = Some(actual.promise);
                    continue;
                }
            }
            if !formals.has_dots() {
                return Err(QuoteError::shape(format!(
                    "unused argument `{}`",
                    actual.promise.expr()
                )));
            }
            dots.push(actual);
        }

        let params = formals
            .names
            .iter()
            .cloned()
            .zip(bound)
            .filter_map(|(name, promise)| Some((name, promise?)))
            .collect();

        let frame = Self {
            scope,
            params,
            dots,
        };
        trace!(
            "bound frame {}: {} param(s), {} dots element(s)",
            frame.scope,
            frame.params.len(),
            frame.dots.len()
        );
        Ok(frame)
    }

    #[inline]
    pub fn scope(&self) -> &ScopeRef {
        &self.scope
    }

    pub fn param(&self, name: &str) -> Option<&Promise> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, promise)| promise)
    }

    #[inline]
    pub fn dots(&self) -> &[DotsPromise] {
        &self.dots
    }
}

/// Turns call arguments into promises, replacing a bare `...` by the
/// caller's own dots promises.
fn expand_actuals(
    args: &[Arg],
    caller: &ScopeRef,
    caller_frame: Option<&CallFrame>,
) -> Result<Vec<DotsPromise>> {
    let mut actuals = Vec::with_capacity(args.len());
    for arg in args {
        if arg.name.is_none() && arg.value.is_dots() {
            let frame = caller_frame.ok_or_else(|| {
                QuoteError::shape("`...` used in a frame without dots")
            })?;
            actuals.extend(frame.dots.iter().cloned());
            continue;
        }
        actuals.push(DotsPromise {
            name: arg.name.clone(),
            promise: Promise::new(arg.value.clone(), caller.clone()),
        });
    }
    Ok(actuals)
}

/// A host function: formals plus the scope it was defined in.
#[derive(Debug, Clone)]
pub struct Closure {
    name: Symbol,
    formals: Formals,
    env: ScopeRef,
}

impl Closure {
    pub fn new(name: &str, formals: Formals, env: ScopeRef) -> Self {
        Self {
            name: Symbol::new(name),
            formals,
            env,
        }
    }

    #[inline]
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    #[inline]
    pub fn formals(&self) -> &Formals {
        &self.formals
    }

    /// Calls the function: a fresh scope under the defining scope, bound
    /// to the arguments as written in `caller`.
    pub fn activate(
        &self,
        args: &[Arg],
        caller: &ScopeRef,
        caller_frame: Option<&CallFrame>,
    ) -> Result<CallFrame> {
        let scope = self.env.child(self.name.as_str());
        CallFrame::bind(&self.formals, scope, args, caller, caller_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expr {
        Expr::ident(name)
    }

    fn positional(name: &str) -> Arg {
        Arg::positional(ident(name))
    }

    #[test]
    fn test_positional_and_named_matching() {
        let global = ScopeRef::global();
        let f = Closure::new("f", Formals::new(["x", "y"]), global.clone());
        let frame = f
            .activate(
                &[positional("a"), Arg::named("x", ident("b"))],
                &global,
                None,
            )
            .unwrap();

        assert_eq!(frame.param("x").unwrap().expr(), &ident("b"));
        assert_eq!(frame.param("y").unwrap().expr(), &ident("a"));
        assert_eq!(frame.param("x").unwrap().scope(), &global);
        assert_eq!(frame.scope().parent(), Some(&global));
    }

    #[test]
    fn test_extra_arguments_go_to_dots() {
        let global = ScopeRef::global();
        let f = Closure::new("f", Formals::new(["x", "..."]), global.clone());
        let frame = f
            .activate(
                &[
                    positional("a"),
                    positional("b"),
                    Arg::named("k", ident("c")),
                ],
                &global,
                None,
            )
            .unwrap();

        assert_eq!(frame.param("x").unwrap().expr(), &ident("a"));
        let dots = frame.dots();
        assert_eq!(dots.len(), 2);
        assert_eq!(dots[0].promise.expr(), &ident("b"));
        assert_eq!(dots[1].name, Some(Symbol::new("k")));
    }

    #[test]
    fn test_formals_after_dots_match_by_name_only() {
        let global = ScopeRef::global();
        let f = Closure::new("f", Formals::new(["...", "sep"]), global.clone());
        let frame = f
            .activate(&[positional("a"), positional("b")], &global, None)
            .unwrap();
        assert!(frame.param("sep").is_none());
        assert_eq!(frame.dots().len(), 2);
    }

    #[test]
    fn test_unused_argument() {
        let global = ScopeRef::global();
        let f = Closure::new("f", Formals::new(["x"]), global.clone());
        let err = f
            .activate(&[positional("a"), positional("b")], &global, None)
            .unwrap_err();
        assert!(err.is_shape());
    }

    #[test]
    fn test_duplicate_name_match() {
        let global = ScopeRef::global();
        let f = Closure::new("f", Formals::new(["x"]), global.clone());
        let err = f
            .activate(
                &[Arg::named("x", ident("a")), Arg::named("x", ident("b"))],
                &global,
                None,
            )
            .unwrap_err();
        assert!(err.is_shape());
    }

    #[test]
    fn test_dots_forwarding_keeps_original_scope() {
        let global = ScopeRef::global();
        let outer = Closure::new("outer", Formals::new(["..."]), global.clone());
        let inner = Closure::new("inner", Formals::new(["..."]), global.clone());

        let outer_frame = outer.activate(&[positional("a")], &global, None).unwrap();
        let inner_frame = inner
            .activate(
                &[Arg::positional(Expr::dots()), positional("local")],
                outer_frame.scope(),
                Some(&outer_frame),
            )
            .unwrap();

        let dots = inner_frame.dots();
        assert_eq!(dots.len(), 2);
        assert_eq!(dots[0].promise.expr(), &ident("a"));
        assert_eq!(dots[0].promise.scope(), &global);
        assert_eq!(dots[1].promise.scope(), outer_frame.scope());
        assert!(Arc::ptr_eq(
            &dots[0].promise.expr,
            &outer_frame.dots()[0].promise.expr
        ));
    }

    #[test]
    fn test_dots_without_caller_frame() {
        let global = ScopeRef::global();
        let f = Closure::new("f", Formals::new(["..."]), global.clone());
        let err = f
            .activate(&[Arg::positional(Expr::dots())], &global, None)
            .unwrap_err();
        assert!(err.is_shape());
    }

    #[test]
    fn test_manual_frame() {
        let global = ScopeRef::global();
        let frame = CallFrame::new(global.child("fn"))
            .with_param("x", ident("a"), &global)
            .with_param("x", ident("b"), &global)
            .with_dot(Some("n"), ident("c"), &global);
        assert_eq!(frame.param("x").unwrap().expr(), &ident("b"));
        assert_eq!(frame.dots()[0].name, Some(Symbol::new("n")));
    }
}
