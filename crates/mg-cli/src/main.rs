//! Migration Guard CLI - validates versioned SQL migrations against a policy

use clap::Parser;
use mg_core::EventLevel;

mod cli;
mod commands;
mod output;

use cli::Cli;
use commands::common::ExitCode;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = commands::validate::execute(&cli) {
        if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
            std::process::exit(*code);
        }
        output::emit(EventLevel::Error, &format!("{:#}", err));
        std::process::exit(1);
    }
}
