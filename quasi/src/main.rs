use clap::{Parser as ClapParser, ValueEnum};
use std::process;

use quasi::{
    Arg, BasicEvaluator, CallFrame, CaptureOptions, Closure, Dots, Expr, Formals, IgnoreEmpty,
    Naming, Quote, Result, ScopeRef, Value, as_definition, capture_argument,
    capture_dots_with_warnings, partition_definitions,
};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Scenario {
    All,
    /// Capture one argument in the callee's frame
    Argument,
    /// Forward a named argument and dots through an intermediate call
    Forward,
    /// Splice a list into dots
    Splice,
    /// Resolve `:=` definitions
    Define,
    /// Name unnamed dots elements
    Naming,
}

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario to run
    #[arg(value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,

    /// Name unnamed dots elements after their expression
    #[arg(long, help = "Auto-name unnamed dots elements")]
    named: bool,

    /// Truncation width for generated names, 0 for none
    #[arg(long, help = "Width of generated names (implies --named)")]
    width: Option<usize>,

    /// Turn `lhs := rhs` elements into named elements
    #[arg(long, help = "Use `:=` left-hand sides as element names")]
    assign_names: bool,

    /// Drop every empty dots element, not only a trailing one
    #[arg(long, help = "Drop all empty dots elements")]
    drop_empty: bool,

    #[arg(short, long, help = "Log captures and interpolation steps")]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> CaptureOptions {
        let naming = match self.width {
            Some(width) => Naming::Width(width),
            None => Naming::from(self.named),
        };
        let ignore_empty = if self.drop_empty {
            IgnoreEmpty::All
        } else {
            IgnoreEmpty::Trailing
        };
        CaptureOptions {
            naming,
            assign_names: self.assign_names,
            ignore_empty,
        }
    }
}

fn ident(name: &str) -> Expr {
    Expr::ident(name)
}

fn print_quote(label: &str, quote: &Quote) {
    println!("  {:<10} {}  in {}", label, quote, quote.scope());
}

fn print_dots(dots: &Dots) {
    if dots.is_empty() {
        println!("  (no elements)");
    }
    for (index, element) in dots.iter().enumerate() {
        let name = match &element.name {
            Some(name) => name.as_str(),
            None => "",
        };
        println!(
            "  [{}] {:<12} {}  in {}",
            index + 1,
            name,
            element.quote,
            element.quote.scope()
        );
    }
}

/// `fn <- function(foo) capture(foo); fn(a + b)`
fn run_argument(global: &ScopeRef) -> Result<()> {
    println!("== argument ==");
    let func = Closure::new("fn", Formals::new(["foo"]), global.clone());
    let sum = Expr::binary("+", ident("a"), ident("b"));
    let frame = func.activate(&[Arg::positional(sum)], global, None)?;

    let quote = capture_argument(&frame, "foo", &BasicEvaluator)?;
    print_quote("foo", &quote);

    global.define("n", 10);
    let marked = Expr::binary("*", ident("x"), Expr::unquote(ident("n")));
    let frame = func.activate(&[Arg::positional(marked)], global, None)?;
    let quote = capture_argument(&frame, "foo", &BasicEvaluator)?;
    print_quote("foo", &quote);
    Ok(())
}

/// `g <- function(bar, ...) fn(bar, ...); g(a + b, c * d)`
fn run_forward(global: &ScopeRef, options: &CaptureOptions) -> Result<()> {
    println!("== forward ==");
    let func = Closure::new("fn", Formals::new(["foo", "..."]), global.clone());
    let g = Closure::new("g", Formals::new(["bar", "..."]), global.clone());

    let g_frame = g.activate(
        &[
            Arg::positional(Expr::binary("+", ident("a"), ident("b"))),
            Arg::positional(Expr::binary("*", ident("c"), ident("d"))),
        ],
        global,
        None,
    )?;
    let fn_frame = func.activate(
        &[
            Arg::positional(ident("bar")),
            Arg::positional(Expr::dots()),
            Arg::named("local", ident("e")),
        ],
        g_frame.scope(),
        Some(&g_frame),
    )?;

    let quote = capture_argument(&fn_frame, "foo", &BasicEvaluator)?;
    print_quote("foo", &quote);
    let (dots, _) = capture_dots_with_warnings(&fn_frame, options, &BasicEvaluator)?;
    print_dots(&dots);
    Ok(())
}

/// `f(a, !!!xs, b, )` with `xs <- list(x, y)`
fn run_splice(global: &ScopeRef, options: &CaptureOptions) -> Result<()> {
    println!("== splice ==");
    global.define(
        "xs",
        Value::list([Value::expr(ident("x")), Value::expr(ident("y"))]),
    );
    global.define("none", Value::list([]));
    let frame = CallFrame::new(global.child("f"))
        .with_dot(None, ident("a"), global)
        .with_dot(None, Expr::splice(ident("xs")), global)
        .with_dot(None, Expr::splice(ident("none")), global)
        .with_dot(None, ident("b"), global)
        .with_dot(None, Expr::Missing, global);

    let (dots, _) = capture_dots_with_warnings(&frame, options, &BasicEvaluator)?;
    print_dots(&dots);
    Ok(())
}

/// `f(x := expr, !!var := value * 2, plain = y)` with `var <- "foo"`
fn run_define(global: &ScopeRef, options: &CaptureOptions) -> Result<()> {
    println!("== define ==");
    global.define("var", "foo");
    let frame = CallFrame::new(global.child("f"))
        .with_dot(None, Expr::define(ident("x"), ident("expr")), global)
        .with_dot(
            Some("explicit"),
            Expr::define(
                Expr::unquote(ident("var")),
                Expr::binary("*", ident("value"), Expr::literal(2)),
            ),
            global,
        )
        .with_dot(Some("plain"), ident("y"), global);

    let (dots, warnings) = capture_dots_with_warnings(&frame, options, &BasicEvaluator)?;
    for warning in &warnings {
        println!("  warning: {}", warning);
    }
    if options.assign_names {
        print_dots(&dots);
        return Ok(());
    }

    let (plain, definitions) = partition_definitions(dots)?;
    for definition in &definitions {
        print_quote(definition.name()?.as_str(), &definition.rhs);
    }
    print_dots(&plain);

    if let Some(element) = plain.iter().next() {
        if let Err(err) = as_definition(&element.quote, &BasicEvaluator) {
            println!("  not a definition: {}", err);
        }
    }
    Ok(())
}

/// `f(foo(bar), some_long_function_name(argument), given = z)`
fn run_naming(global: &ScopeRef, options: &CaptureOptions) -> Result<()> {
    println!("== naming ==");
    let options = if options.naming.is_enabled() {
        *options
    } else {
        CaptureOptions {
            naming: Naming::from_value(&Value::Bool(true))?,
            ..*options
        }
    };
    let frame = CallFrame::new(global.child("f"))
        .with_dot(None, Expr::apply("foo", [ident("bar")]), global)
        .with_dot(
            None,
            Expr::apply("some_long_function_name", [ident("argument")]),
            global,
        )
        .with_dot(Some("given"), ident("z"), global);

    let (dots, _) = capture_dots_with_warnings(&frame, &options, &BasicEvaluator)?;
    print_dots(&dots);
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.options();
    let global = ScopeRef::global();
    let all = cli.scenario == Scenario::All;

    if all || cli.scenario == Scenario::Argument {
        run_argument(&global)?;
    }
    if all || cli.scenario == Scenario::Forward {
        run_forward(&global, &options)?;
    }
    if all || cli.scenario == Scenario::Splice {
        run_splice(&global, &options)?;
    }
    if all || cli.scenario == Scenario::Define {
        run_define(&global, &options)?;
    }
    if all || cli.scenario == Scenario::Naming {
        run_naming(&global, &options)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(filter);
    env_logger::Builder::from_env(env).init();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
