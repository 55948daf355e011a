use anyhow::Result;

use recsys_eval::cli::Command;
use recsys_eval::{handle_compare, handle_similarities, handle_sweep, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Compare { common, k, factor } => handle_compare(common, *k, factor),
        Command::Similarities { common, k } => handle_similarities(common, *k),
        Command::Sweep {
            common,
            sizes,
            metric,
        } => handle_sweep(common, sizes, *metric),
    }
}
