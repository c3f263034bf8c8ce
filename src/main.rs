use std::fs;
use std::path::PathBuf;

use binexpr::{Lexer, Parser as ExprParser, Report};
use clap::{Args as ClapArgs, Parser, Subcommand};
use miette::{IntoDiagnostic, WrapErr};
use num_bigint::BigUint;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(about = "Validate and evaluate binary + / - expressions")]
struct Args {
    /// Log every stage at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, ClapArgs)]
#[group(required = true, multiple = false)]
struct Input {
    /// Expression to analyze, e.g. "1010 + 11".
    #[arg(allow_hyphen_values = true)]
    expression: Option<String>,

    /// Read the expression from a file instead.
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Tokenize {
        #[command(flatten)]
        input: Input,
    },
    Parse {
        #[command(flatten)]
        input: Input,

        /// Print an indented tree instead of an S-expression.
        #[arg(long)]
        tree: bool,
    },
    Eval {
        #[command(flatten)]
        input: Input,

        /// Also print the decimal value of the result.
        #[arg(long)]
        decimal: bool,
    },
    /// Print tokens, tree, result and a decimal cross-check, or the
    /// classified error with its location.
    Analyze {
        #[command(flatten)]
        input: Input,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("binexpr=debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        return;
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

impl Input {
    /// Returns the display name and contents of the expression.
    fn load(&self) -> miette::Result<(String, String)> {
        // The argument group guarantees exactly one of the two is set.
        let Some(filename) = &self.file else {
            let expression = self.expression.clone().unwrap_or_default();
            return Ok(("<input>".to_string(), expression));
        };
        let contents = fs::read_to_string(filename)
            .into_diagnostic()
            .wrap_err_with(|| format!("reading `{}` failed", filename.display()))?;
        // A trailing newline from the editor is not part of the expression.
        let contents = contents.trim_end_matches(['\r', '\n']).to_string();
        Ok((filename.display().to_string(), contents))
    }
}

/// Prints the diagnostic and exits with the data-error status.
fn fail(e: impl Into<miette::Report>) -> ! {
    eprintln!("{:?}", e.into());
    std::process::exit(65);
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Tokenize { input } => {
            let (name, source) = input.load()?;
            debug!(%name, "tokenizing");
            let tokens = Lexer::new(Some(name.as_str()), &source)
                .tokenize()
                .unwrap_or_else(|e| fail(e));
            for token in tokens {
                println!("{token}");
            }
        }
        Commands::Parse { input, tree } => {
            let (name, source) = input.load()?;
            debug!(%name, "parsing");
            let tokens = Lexer::new(Some(name.as_str()), &source)
                .tokenize()
                .unwrap_or_else(|e| fail(e));
            let ast = ExprParser::new(Some(name.as_str()), &source, &tokens)
                .parse()
                .unwrap_or_else(|e| fail(e));
            if tree {
                print!("{}", ast.tree());
            } else {
                println!("{ast}");
            }
        }
        Commands::Eval { input, decimal } => {
            let (name, source) = input.load()?;
            debug!(%name, "evaluating");
            let (_, ast, result) =
                binexpr::analysis::run(Some(name.as_str()), &source).unwrap_or_else(|e| fail(e));
            debug!(%ast, "evaluated");
            if decimal {
                match BigUint::parse_bytes(result.as_bytes(), 2) {
                    Some(value) => println!("{result} ({value})"),
                    None => println!("{result}"),
                }
            } else {
                println!("{result}");
            }
        }
        Commands::Analyze { input } => {
            let (name, source) = input.load()?;
            debug!(%name, "analyzing");
            let analysis = binexpr::analyze(&source);
            print!("{}", Report::new(&source, &analysis));
            if !analysis.is_success() {
                std::process::exit(65);
            }
        }
    }
    Ok(())
}
