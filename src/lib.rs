//! sheaf - bulk mutation engine for a markdown note vault

pub mod cli;
pub mod domain;
pub mod engine;
pub mod infra;
pub mod persist;
pub mod search;
pub mod store;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{
    Cli, Command,
    config::Config,
    handlers::{
        handle_append, handle_classify, handle_find, handle_history, handle_mkdir, handle_mv,
        handle_mvdir, handle_new, handle_pattern, handle_rm, handle_rmdir, handle_set, handle_tag,
        handle_undo, handle_write,
    },
};

/// Default log filter for a `-v` count.
fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins, then the config `log_level`, then the `-v` count.
fn init_tracing(verbose: u8, configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| match configured {
            Some(level) if verbose == 0 => EnvFilter::try_new(level),
            _ => EnvFilter::try_new(verbosity_filter(verbose)),
        })
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // A subscriber may already be set when embedded; keep that one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_tracing(cli.verbose, config.log_level.as_deref());

    let vault = config.vault_dir(cli.dir.as_ref());

    match &cli.command {
        Command::Find(args) => handle_find(args, &vault),
        Command::Tag(args) => handle_tag(args, &vault, &config),
        Command::Set(args) => handle_set(args, &vault, &config),
        Command::Mv(args) => handle_mv(args, &vault, &config),
        Command::New(args) => handle_new(args, &vault, &config),
        Command::Write(args) => handle_write(args, &vault, &config),
        Command::Append(args) => handle_append(args, &vault, &config),
        Command::Rm(args) => handle_rm(args, &vault, &config),
        Command::Mkdir(args) => handle_mkdir(args, &vault, &config),
        Command::Rmdir(args) => handle_rmdir(args, &vault, &config),
        Command::Mvdir(args) => handle_mvdir(args, &vault, &config),
        Command::Undo(args) => handle_undo(args, &vault),
        Command::History(args) => handle_history(args, &vault),
        Command::Pattern(command) => handle_pattern(command, &vault),
        Command::Classify(args) => handle_classify(args, &vault),
        Command::Completions(args) => {
            clap_complete::generate(
                args.shell,
                &mut Cli::command(),
                "sheaf",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(verbosity_filter(0), "warn");
        assert_eq!(verbosity_filter(1), "info");
        assert_eq!(verbosity_filter(2), "debug");
        assert_eq!(verbosity_filter(7), "trace");
    }
}
