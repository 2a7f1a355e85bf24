//! `bed`: a command-line BER/XML editor for TAP/RAP billing records, built
//! on the `xfsx` library. This binary owns everything the library
//! deliberately doesn't: argument parsing, grammar-file loading, and
//! talking to stdout/stderr/an external XSD validator.

mod cli;
mod commands;
mod grammar_load;

use clap::{CommandFactory, Parser};
use cli::{Cli, Command};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::PrettyWriteXml(args) => commands::pretty_write_xml(args),
        Command::WriteBer(args) => commands::write_ber(args),
        Command::WriteId(args) => commands::write_id(args),
        Command::WriteDef(args) => commands::write_def(args),
        Command::WriteIndef(args) => commands::write_indef(args),
        Command::Search(args) => commands::search(args),
        Command::Edit(args) => commands::edit(args),
        Command::Validate(args) => commands::validate(args),
        Command::ComputeAci(args) => commands::compute_aci(args),
        Command::WriteAci(args) => commands::write_aci(args),
        Command::MkBashComp => {
            mk_bash_comp();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bed: error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn mk_bash_comp() {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(clap_complete::shells::Bash, &mut cmd, name, &mut std::io::stdout());
}
