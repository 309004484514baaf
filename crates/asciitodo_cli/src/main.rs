use asciitodo_cli::cli::{Cli, collect_config_overrides};
use asciitodo_cli::commands::{Output, run_command};
use asciitodo_cli::controller::Controller;
use asciitodo_cli::interactive::{normalize_parse_error, run_interactive};
use asciitodo_cli::prompt::LinePrompter;
use asciitodo_core::config::{Config, Palette, load_config_with_fallback, merge_overrides};
use asciitodo_core::error::AppError;
use asciitodo_core::storage::FileStore;
use asciitodo_core::store::TaskStore;
use clap::Parser;
use clap::error::ErrorKind;
use std::io;

type StdioController = Controller<FileStore, LinePrompter<io::StdinLock<'static>, io::Stderr>>;

fn init_logging() {
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Warn)
        .parse_env("ASCIITODO_LOG")
        .init();
}

fn load_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        log::warn!("using default configuration: {err}");
    }
    let overrides = collect_config_overrides(raw_overrides).map_err(AppError::invalid_input)?;
    Ok(merge_overrides(&loaded.config, &overrides))
}

fn open_controller(config: &Config) -> Result<StdioController, AppError> {
    let store = TaskStore::open(FileStore::from_env()?);
    let prompter = LinePrompter::new(io::stdin().lock(), io::stderr());
    Ok(Controller::new(store, prompter, config.filter()))
}

fn run_session() -> Result<(), AppError> {
    let config = load_config(&[])?;
    let mut controller = open_controller(&config)?;
    let output = Output {
        json: false,
        palette: config.palette(),
        interactive: true,
    };
    run_interactive(&mut controller, &output)
}

fn run_once(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli.config_override)?;
    let mut controller = open_controller(&config)?;
    let output = Output {
        json: cli.json,
        palette: if cli.json {
            Palette::PLAIN
        } else {
            config.palette()
        },
        interactive: false,
    };
    run_command(&mut controller, cli.command, &output)?;
    Ok(())
}

fn main() {
    init_logging();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_session() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_once(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
