mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    // Show modlib info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("modlib", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Info { library } => commands::info::run(library, &cli.global),
        Command::Resolve { library, query } => {
            commands::resolve::run(library, query.as_deref(), &cli.global)
        }
        Command::Contexts {
            library,
            query,
            exclude,
        } => commands::contexts::run(library, query.as_deref(), exclude, &cli.global),
        Command::Find {
            library,
            class,
            query,
            context,
        } => commands::find::run(
            library,
            class,
            query.as_deref(),
            context.as_deref(),
            &cli.global,
        ),
        Command::Extract {
            library,
            class,
            query,
            output,
        } => commands::extract::run(library, class, query.as_deref(), output, &cli.global),
    }
}
