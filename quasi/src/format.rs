use std::fmt::{self, Write};

use crate::{Arg, Expr, Quote, Value};

/// Name width used when naming is requested without an explicit width.
pub const DEFAULT_NAME_WIDTH: usize = 60;

const ELLIPSIS: &str = "...";

/// Binding strength of the infix operators the renderer knows about.
/// Higher binds tighter.
fn infix_precedence(operator: &str) -> Option<u8> {
    let precedence = match operator {
        "~" => 1,
        ":=" => 2,
        "<-" | "<<-" | "=" => 3,
        "||" | "|" => 4,
        "&&" | "&" => 5,
        "==" | "!=" | "<" | ">" | "<=" | ">=" => 7,
        "+" | "-" => 8,
        "*" | "/" => 9,
        "%%" | "%/%" | "%in%" | "%>%" => 10,
        ":" => 11,
        "^" => 13,
        "$" | "@" => 14,
        "::" | ":::" => 15,
        _ => return None,
    };
    Some(precedence)
}

const PREFIX_PRECEDENCE: u8 = 12;

fn is_tight(operator: &str) -> bool {
    matches!(operator, "^" | ":" | "$" | "@" | "::" | ":::")
}

fn is_prefix(operator: &str) -> bool {
    matches!(operator, "-" | "+" | "!" | "~")
}

const RESERVED: &[&str] = &[
    "if",
    "else",
    "repeat",
    "while",
    "function",
    "for",
    "in",
    "next",
    "break",
    "TRUE",
    "FALSE",
    "NULL",
    "Inf",
    "NaN",
    "NA",
    "NA_integer_",
    "NA_real_",
    "NA_character_",
    "NA_complex_",
];

fn is_syntactic(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let starts_well = match first {
        '.' => !name[1..].starts_with(|c: char| c.is_ascii_digit()),
        c => c.is_alphabetic(),
    };
    starts_well
        && chars.all(|c| c.is_alphanumeric() || c == '.' || c == '_')
        && !RESERVED.contains(&name)
}

fn write_name(out: &mut String, name: &str) {
    if name == crate::DOTS || is_syntactic(name) {
        out.push_str(name);
    } else {
        let _ = write!(out, "`{}`", name);
    }
}

fn write_string(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_double(out: &mut String, value: f64) {
    if value.is_nan() {
        out.push_str("NaN");
    } else if value.is_infinite() {
        out.push_str(if value > 0.0 { "Inf" } else { "-Inf" });
    } else {
        let _ = write!(out, "{}", value);
    }
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("NULL"),
        Value::Bool(true) => out.push_str("TRUE"),
        Value::Bool(false) => out.push_str("FALSE"),
        Value::Int(value) => {
            let _ = write!(out, "{}", value);
        }
        Value::Double(value) => write_double(out, *value),
        Value::Str(value) => write_string(out, value),
        Value::Expr(expr) => write_expr(out, expr, 0),
        Value::Quote(quote) => {
            out.push('^');
            write_expr(out, quote.expr(), PREFIX_PRECEDENCE);
        }
        Value::List(items) => {
            out.push_str("list(");
            for (i, (name, item)) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if let Some(name) = name {
                    write_name(out, name.as_str());
                    out.push_str(" = ");
                }
                write_value(out, item);
            }
            out.push(')');
        }
        Value::Builtin(builtin) => {
            let _ = write!(out, "<builtin {}>", builtin.name());
        }
    }
}

fn write_args(out: &mut String, args: &[Arg]) {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if let Some(name) = &arg.name {
            write_name(out, name.as_str());
            out.push_str(" = ");
        }
        write_expr(out, &arg.value, 0);
    }
}

/// Renders `expr` into `out`. `context` is the precedence of the
/// surrounding operator; lower-precedence operators get parenthesized.
fn write_expr(out: &mut String, expr: &Expr, context: u8) {
    match expr {
        Expr::Ident(name) => write_name(out, name.as_str()),
        Expr::Literal(value) => write_value(out, value),
        Expr::Missing => {}
        Expr::Unquote(inner) => {
            out.push_str("!!");
            write_expr(out, inner, PREFIX_PRECEDENCE);
        }
        Expr::UnquoteSplice(inner) => {
            out.push_str("!!!");
            write_expr(out, inner, PREFIX_PRECEDENCE);
        }
        Expr::Definition { lhs, rhs } => {
            write_infix(out, crate::DEFINE, lhs, rhs, context);
        }
        Expr::Call { head, args } => {
            let operator = head.as_ident().map(|name| name.as_str());
            let unnamed = args.iter().all(|arg| arg.name.is_none());
            match (operator, args.as_slice()) {
                (Some("("), [arg]) if unnamed => {
                    out.push('(');
                    write_expr(out, &arg.value, 0);
                    out.push(')');
                }
                (Some(op), [lhs, rhs]) if unnamed && infix_precedence(op).is_some() => {
                    write_infix(out, op, &lhs.value, &rhs.value, context);
                }
                (Some(op), [operand]) if unnamed && is_prefix(op) => {
                    let parenthesize = context > PREFIX_PRECEDENCE;
                    if parenthesize {
                        out.push('(');
                    }
                    out.push_str(op);
                    write_expr(out, &operand.value, PREFIX_PRECEDENCE);
                    if parenthesize {
                        out.push(')');
                    }
                }
                _ => {
                    write_expr(out, head, u8::MAX);
                    out.push('(');
                    write_args(out, args);
                    out.push(')');
                }
            }
        }
    }
}

fn write_infix(out: &mut String, operator: &str, lhs: &Expr, rhs: &Expr, context: u8) {
    let precedence = infix_precedence(operator).unwrap_or(u8::MAX);
    let parenthesize = precedence < context;
    // `^` and the assignment family group to the right
    let right_assoc = matches!(operator, "^" | "<-" | "<<-" | "=" | ":=");
    let (lhs_context, rhs_context) = if right_assoc {
        (precedence.saturating_add(1), precedence)
    } else {
        (precedence, precedence.saturating_add(1))
    };

    if parenthesize {
        out.push('(');
    }
    write_expr(out, lhs, lhs_context);
    if is_tight(operator) {
        out.push_str(operator);
    } else {
        out.push(' ');
        out.push_str(operator);
        out.push(' ');
    }
    write_expr(out, rhs, rhs_context);
    if parenthesize {
        out.push(')');
    }
}

/// Single-line source rendering of an expression.
pub fn expr_text(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, 0);
    out
}

pub fn value_text(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Cuts `text` down to at most `width` characters, marking the cut with a
/// trailing `...`. A width of zero means no limit.
pub fn truncate_text(text: &str, width: usize) -> String {
    if width == 0 || text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&expr_text(self))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&value_text(self))
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&value_text(&Value::Quote(self.clone())))
    }
}
