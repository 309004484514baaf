use crate::cli::Cli;
use crate::commands::{Effect, Output, list, run_command};
use crate::controller::Controller;
use crate::prompt::LinePrompter;
use asciitodo_core::error::AppError;
use asciitodo_core::storage::KeyValueStore;
use clap::{CommandFactory, Parser};
use std::io::{BufRead, Write};

pub fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

/// Output mode and config are fixed when the session starts.
fn reject_one_shot_flags(cli: &Cli) -> Result<(), AppError> {
    if cli.json {
        return Err(AppError::invalid_input(
            "--json is not available in an interactive session",
        ));
    }
    if !cli.config_override.is_empty() {
        return Err(AppError::invalid_input(
            "--config-override is not available in an interactive session",
        ));
    }
    Ok(())
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
    println!("Session commands: help, ?, exit, quit");
}

/// Reads commands line by line until `exit`, `quit` or end of input. The list
/// is shown on start and after every change, using the session's filter.
pub fn run_interactive<S, R, W>(
    controller: &mut Controller<S, LinePrompter<R, W>>,
    output: &Output,
) -> Result<(), AppError>
where
    S: KeyValueStore,
    R: BufRead,
    W: Write,
{
    list(controller, output);

    loop {
        let line = controller
            .prompter_mut()
            .read_line()
            .map_err(|err| AppError::io(err.to_string()))?;
        let Some(line) = line else {
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("asciitodo".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = reject_one_shot_flags(&cli) {
            eprintln!("ERROR: {}", err);
            continue;
        }

        match run_command(controller, cli.command, output) {
            Ok(Effect::Changed) => list(controller, output),
            Ok(_) => {}
            Err(err) => eprintln!("ERROR: {}", err),
        }
    }

    Ok(())
}
