//! sbcc command-line driver
//!
//! Compiles one C source file to AArch64 assembly:
//!
//! ```text
//! sbcc <SOURCE> -o <OUTPUT> [-O <LEVEL>] [--emit-ir] [-v]
//! ```

mod output;

use anyhow::Context;
use clap::Parser;
use sbcc_engine::{compile_file, CompileOptions, Error, OptLevel};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sbcc")]
#[command(about = "Small AArch64 compiler for a subset of C", long_about = None)]
#[command(version)]
struct Cli {
    /// C source file
    source: PathBuf,

    /// Assembly output file
    #[arg(short, long)]
    output: PathBuf,

    /// Optimization level (0 disables the optimizer)
    #[arg(short = 'O', value_name = "LEVEL", default_value = "0")]
    opt_level: String,

    /// Print the IR (after optimization) to stdout
    #[arg(long)]
    emit_ir: bool,

    /// Log pipeline stages at debug level
    #[arg(short, long)]
    verbose: bool,

    /// When to color diagnostics: auto, always, never
    #[arg(long, value_name = "WHEN")]
    color: Option<String>,
}

impl Cli {
    fn options(&self) -> CompileOptions {
        let level = if self.opt_level == "0" {
            OptLevel::None
        } else {
            OptLevel::Basic
        };
        CompileOptions::new(level).with_emit_ir(self.emit_ir)
    }
}

/// `SBCC_LOG` wins over `RUST_LOG`; `-v` raises the default to debug
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default()
        .filter_or("SBCC_LOG", std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_string()));
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let compiled = match compile_file(&cli.source, &cli.options()) {
        Ok(compiled) => compiled,
        Err(Error::Io(err)) => {
            return Err(err).with_context(|| format!("cannot read {}", cli.source.display()));
        }
        Err(err) => {
            let mut out = output::StyledOutput::new(output::resolve_color_choice(cli.color.as_deref()));
            out.diagnostics(&cli.source, &err);
            return Ok(false);
        }
    };

    if let Some(ir) = &compiled.ir {
        print!("{}", ir);
    }

    std::fs::write(&cli.output, &compiled.assembly)
        .with_context(|| format!("cannot write {}", cli.output.display()))?;
    log::debug!("wrote {}", cli.output.display());
    Ok(true)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                // --help and --version
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            let mut out = output::StyledOutput::new(output::resolve_color_choice(cli.color.as_deref()));
            out.error_line(None, &format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
