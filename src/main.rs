//! fractaleq: compile or check a fractal equation from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use fractaleq::equation::{validate, Compiler, EmittedCode};
use fractaleq::{logging, shader, Config};

#[derive(Parser)]
#[command(
    name = "fractaleq",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compile complex equations into escape-time fractal shader code",
    after_help = r#"
Examples:
  fractaleq compile "z^2 + c"             # (cmul(z, z) + c)
  fractaleq compile --shader "sin(z)+c"   # helpers + iteration loop
  fractaleq compile --ast "-z^2"          # parsed tree
  fractaleq validate "z +++ c"            # quick structural check

Environment Variables:
  FRACTALEQ_LOG=debug         Log filter (overridden by --log-level)
"#
)]
struct Cli {
    /// Log filter, e.g. "debug" or "fractaleq=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Configuration file (default: ~/.fractaleq/config.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an equation and print the emitted expression
    Compile {
        equation: String,

        /// Print the parsed tree instead of code
        #[arg(long, conflicts_with_all = ["json", "shader"])]
        ast: bool,

        /// Print the full result as JSON
        #[arg(long, conflicts_with = "shader")]
        json: bool,

        /// Print helper definitions and the iteration loop with the equation spliced in
        #[arg(long)]
        shader: bool,

        /// Exit with an error instead of substituting the default equation
        #[arg(long)]
        strict: bool,
    },
    /// Run the structural pre-check only
    Validate {
        equation: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path).unwrap_or_else(|| {
            eprintln!("could not load config from {}, using defaults", path.display());
            Config::default()
        }),
        None => Config::load(),
    };
    logging::init(cli.log_level.as_deref(), &config.log_level);

    let code = match cli.command {
        Commands::Compile {
            equation,
            ast,
            json,
            shader,
            strict,
        } => run_compile(&config, &equation, ast, json, shader, strict),
        Commands::Validate { equation, json } => run_validate(&equation, json),
    };
    process::exit(code);
}

fn run_compile(
    config: &Config,
    equation: &str,
    ast: bool,
    json: bool,
    shader: bool,
    strict: bool,
) -> i32 {
    if ast {
        return match Compiler::parse(equation) {
            Ok(expr) => {
                println!("{expr}");
                0
            }
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        };
    }

    let compiler = Compiler::with_config(config);
    let emitted = if strict {
        match compiler.try_compile(equation) {
            Ok(emitted) => emitted,
            Err(e) => {
                eprintln!("error: {e}");
                return 1;
            }
        }
    } else {
        compiler.compile(equation)
    };

    if json {
        return print_json(&emitted);
    }
    if let Some(err) = &emitted.fallback {
        eprintln!("warning: {err}; showing default equation");
    }
    if shader {
        print!("{}", shader::fragment(&emitted));
    } else {
        println!("{}", emitted.code);
    }
    0
}

fn print_json(emitted: &EmittedCode) -> i32 {
    match serde_json::to_string_pretty(emitted) {
        Ok(text) => {
            println!("{text}");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_validate(equation: &str, json: bool) -> i32 {
    let result = validate(equation);
    if json {
        let value = match &result {
            Ok(()) => serde_json::json!({ "ok": true }),
            Err(w) => serde_json::json!({
                "ok": false,
                "kind": w.kind,
                "message": w.message,
                "position": w.position,
            }),
        };
        println!("{value}");
    } else {
        match &result {
            Ok(()) => println!("ok"),
            Err(w) => println!("{w}"),
        }
    }
    i32::from(result.is_err())
}
