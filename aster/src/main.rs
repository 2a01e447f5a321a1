use anyhow::{bail, Context};
use aster::{compile, parse, CompileError, CompileOptions};
use aster_parser::lexer::tokenize;
use aster_passes::symbol_table::ScopeLookup;
use aster_source::Source;
use clap::Parser;
use console::style;
use std::{fs, io, path::PathBuf, process::ExitCode};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Compiles an Aster source file to C.
#[derive(Debug, Parser)]
#[command(name = "aster", version, about)]
struct Cli {
    /// Source file to compile
    path: PathBuf,

    /// Generated C file (defaults to the source path with a `.c` extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the parsed AST instead of compiling
    #[arg(long)]
    emit_ast: bool,

    /// Print the token stream instead of compiling
    #[arg(long, conflicts_with = "emit_ast")]
    emit_tokens: bool,

    /// Only search the innermost scope when resolving names
    #[arg(long)]
    innermost_scope: bool,

    /// Log every compilation stage
    #[arg(short, long)]
    verbose: bool,

    /// Log debug information (implies --verbose)
    #[arg(long)]
    debug: bool,
}

/// Outcome of a run, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecResult {
    Ok,
    /// Failure before compilation (I/O, arguments).
    Fail,
    /// The program has lexical, syntax or semantic errors.
    CompileError,
}

impl From<ExecResult> for ExitCode {
    fn from(result: ExecResult) -> Self {
        let code = match result {
            ExecResult::Ok => 0,
            ExecResult::Fail => 1,
            ExecResult::CompileError => 2,
        };
        ExitCode::from(code)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter_layer = if cli.debug {
        EnvFilter::new("debug")
    } else if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&cli) {
        Ok(result) => result.into(),
        Err(err) => {
            eprintln!("{} {:#}", style("error:").red().bold(), err);
            ExecResult::Fail.into()
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExecResult> {
    let content = fs::read_to_string(&cli.path)
        .with_context(|| format!("could not read source file `{}`", cli.path.display()))?;
    let name = cli.path.display().to_string();
    let source = Source::with_name(&name, &content);

    if cli.emit_tokens {
        for token in tokenize(&source) {
            println!("{}", token);
        }
        if !source.has_no_errors() {
            report_errors(&source, CompileError::Lexical(source.errors.len()));
            return Ok(ExecResult::CompileError);
        }
        return Ok(ExecResult::Ok);
    }

    if cli.emit_ast {
        return match parse(&source) {
            Ok(program) => {
                println!("{:#?}", program);
                Ok(ExecResult::Ok)
            }
            Err(err) => {
                report_errors(&source, err);
                Ok(ExecResult::CompileError)
            }
        };
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.path.with_extension("c"));
    if output == cli.path {
        bail!(
            "refusing to overwrite the source file `{}`",
            cli.path.display()
        );
    }

    let options = CompileOptions {
        scope_lookup: if cli.innermost_scope {
            ScopeLookup::Innermost
        } else {
            ScopeLookup::Lexical
        },
        ..CompileOptions::default()
    };
    match compile(&source, &options) {
        Ok(c_source) => {
            fs::write(&output, c_source)
                .with_context(|| format!("could not write `{}`", output.display()))?;
            info!(output = %output.display(), "compiled successfully");
            Ok(ExecResult::Ok)
        }
        Err(err) => {
            report_errors(&source, err);
            Ok(ExecResult::CompileError)
        }
    }
}

/// Prints every diagnostic of `source` followed by the reason compilation stopped.
fn report_errors(source: &Source, err: CompileError) {
    for error in source.errors.errors().iter() {
        let rendered = source.errors.render(error);
        let (header, body) = rendered.split_once('\n').unwrap_or((rendered.as_str(), ""));
        eprintln!("{}\n{}", style(header).red().bold(), body);
    }
    eprintln!("{}", style(err).dim());
}
