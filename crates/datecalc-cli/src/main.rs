//! datecalc: evaluate date/time expressions from the command line.
//!
//! ```text
//! datecalc today + 10days to YYYY-MM-DD
//! datecalc 2024-01-01 diff 2024-03-01 to days
//! datecalc now ">" 2024-12-31T23:59
//! ```

use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use colored::Colorize;
use tracing::Level;

use datecalc_core::{evaluate, is_help_request, Anchors, Zone};

mod guide;

/// Date/time calculator: dates, durations and operators evaluated left to right.
#[derive(Parser, Debug)]
#[command(name = "datecalc", version, about, long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Evaluation timezone: `local` or an IANA name (e.g. `Europe/Paris`)
    #[arg(long, value_name = "ZONE", default_value = "local")]
    tz: String,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log evaluation steps to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Values and operators, optionally followed by `to <format>`
    #[arg(num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    expression: Vec<String>,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if is_help_request(args.get(1..).unwrap_or_default()) {
        print!("{}", guide::Guide);
        return ExitCode::SUCCESS;
    }

    let cli = Cli::parse_from(args);
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(output) if cli.json => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Ok(output) => {
            println!("{}", output.green());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", format!("Error: {err:#}").red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let zone = Zone::parse(&cli.tz)?;
    let anchors = Anchors::capture(zone)?;
    let evaluation = evaluate(&cli.expression, &anchors)?;

    if cli.json {
        serde_json::to_string_pretty(&evaluation).context("failed to serialize result")
    } else {
        Ok(evaluation.text)
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
