//! fstfile CLI - console front end for FST/DPK archives

mod commands;
pub mod display;
pub mod invocation;
pub mod progress;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::config::FstConfig;
use crate::error::{Error, ErrorKind};
use invocation::{Invocation, SessionOptions};

#[derive(Parser)]
#[command(name = "fstfile")]
#[command(about = "FstFile: MechCommander FST/DPK archive tool", long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// `-<command>[modifier] <path> [argument]`, or a single archive path
    #[arg(num_args = 0.., allow_hyphen_values = true, trailing_var_arg = true)]
    args: Vec<String>,
}

/// Numeric outcome printed in the closing line and used as exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Success,
    ProcessingError,
    ArgumentError,
    InvalidModifier,
}

impl ResultCode {
    /// Map a codec error onto a result code
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        match err.kind() {
            ErrorKind::IndexOutOfRange | ErrorKind::UnsupportedEntry => Self::ArgumentError,
            _ => Self::ProcessingError,
        }
    }

    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::ProcessingError => 1,
            Self::ArgumentError => 2,
            Self::InvalidModifier => 3,
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully.",
            Self::ProcessingError => "File processing error.",
            Self::ArgumentError => "Argument parsing error.",
            Self::InvalidModifier => "Invalid modifier. Was ignored.",
        }
    }
}

impl From<ResultCode> for ExitCode {
    fn from(code: ResultCode) -> Self {
        Self::from(code.as_i32() as u8)
    }
}

/// Run the fstfile CLI
pub fn run_cli() -> ExitCode {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (code, session) = run(&cli.args);

    if let Err(e) = pause(session) {
        tracing::warn!("{e:#}");
    }
    code.into()
}

/// Dispatch one invocation and print the closing block
fn run(args: &[String]) -> (ResultCode, SessionOptions) {
    let request = match Invocation::parse(args) {
        Ok(Invocation::ShortHelp) => {
            print!("{}", display::short_help());
            return (ResultCode::Success, SessionOptions::default());
        }
        Ok(Invocation::FullHelp) => {
            print!("{}", display::full_help());
            return (ResultCode::Success, SessionOptions::default());
        }
        Ok(Invocation::Run(request)) => request,
        Err(e) => {
            println!("{e}");
            println!("{}", display::result_line(ResultCode::ArgumentError));
            return (ResultCode::ArgumentError, e.session);
        }
    };

    let outcome = FstConfig::discover().and_then(|config| commands::execute(&request, &config));

    let mut code = match &outcome {
        Ok(()) => ResultCode::Success,
        Err(e) => {
            let code = ResultCode::from_error(e);
            if code == ResultCode::ArgumentError {
                println!("Error. Invalid input value. {e}");
            }
            code
        }
    };

    if let Some(modifier) = request.invalid_modifier {
        println!("Error. Invalid modifier: {modifier}");
        if code == ResultCode::Success {
            code = ResultCode::InvalidModifier;
        }
    }

    println!("{}", display::result_line(code));
    if let (ResultCode::ProcessingError, Err(e)) = (code, &outcome) {
        tracing::debug!("{e:?}");
        println!("{}", display::diagnostic(e));
    }

    (code, request.session)
}

/// Wait for a key press unless pausing is disabled or stdout is not a terminal
fn pause(session: SessionOptions) -> anyhow::Result<()> {
    let term = Term::stdout();
    if session.ignore_pause || !term.is_term() {
        return Ok(());
    }
    term.write_line("Press any key to exit...")
        .context("Failed to write pause prompt")?;
    term.read_key().context("Failed to read key press")?;
    Ok(())
}
