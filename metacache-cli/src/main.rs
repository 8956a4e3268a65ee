mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;
use cli::{Cli, Commands};
use error::exit_with_error;

fn init_tracing(cli: &Cli) {
    // --quiet   -> "off"
    // --verbose -> RUST_LOG if set, otherwise "info"
    // default   -> "warn"
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    // Errors go to stderr, so piping stdout does not disable color.
    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    if let Err(e) = run(cli) {
        exit_with_error(e);
    }
}

fn run(cli: Cli) -> error::CliResult<()> {
    let codec = config::load_codec_config(cli.config.as_deref(), cli.size_limit)?;

    match cli.command {
        Commands::Convert { input, output } => commands::convert::run(&input, &output, &codec),
        Commands::Parse { input, dump } => commands::parse::run(&input, dump, &codec),
        Commands::Compare { left, right } => commands::compare::run(&left, &right, &codec),
        Commands::Export { input, output } => {
            commands::export::run(&input, output.as_deref(), &codec)
        }
    }
}
