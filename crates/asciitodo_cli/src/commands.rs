use crate::cli::Command;
use crate::controller::Controller;
use crate::prompt::Prompter;
use crate::render::{print_list, task_json};
use asciitodo_core::config::Palette;
use asciitodo_core::error::AppError;
use asciitodo_core::model::{Task, TaskId};
use asciitodo_core::storage::KeyValueStore;
use asciitodo_core::view::{Filter, escape_text};
use time::{OffsetDateTime, UtcOffset};

pub struct Output {
    pub json: bool,
    pub palette: Palette,
    /// Interactive sessions keep the filter between commands and show the
    /// filter bar.
    pub interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Changed,
    Unchanged,
    Listed,
}

pub fn local_now() -> OffsetDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset)
}

fn print_task(output: &Output, verb: &str, task: &Task) {
    if output.json {
        println!("{}", task_json(task));
    } else {
        println!("{verb} task: {} (#{})", escape_text(&task.text), task.id);
    }
}

fn changed(output: &Output, verb: &str, task: Option<Task>) -> Effect {
    match task {
        Some(task) => {
            print_task(output, verb, &task);
            Effect::Changed
        }
        None => Effect::Unchanged,
    }
}

pub fn list<S: KeyValueStore, P: Prompter>(controller: &Controller<S, P>, output: &Output) {
    let projection = controller.projection(local_now());
    print_list(&projection, &output.palette, output.json, output.interactive);
}

pub fn run_command<S: KeyValueStore, P: Prompter>(
    controller: &mut Controller<S, P>,
    command: Command,
    output: &Output,
) -> Result<Effect, AppError> {
    let effect = match command {
        Command::Add { text } => {
            let task = controller.submit(&text.join(" "))?;
            print_task(output, "Added", &task);
            Effect::Changed
        }
        Command::Toggle { id } => {
            let task = controller.toggle(id.parse::<TaskId>()?)?;
            let verb = match task.as_ref() {
                Some(task) if task.completed => "Completed",
                _ => "Reopened",
            };
            changed(output, verb, task)
        }
        Command::Edit { id, text } => {
            let id = id.parse::<TaskId>()?;
            let text = text.join(" ");
            let inline = if text.trim().is_empty() {
                None
            } else {
                Some(text.as_str())
            };
            let task = controller.edit(id, inline)?;
            changed(output, "Updated", task)
        }
        Command::Delete { id, yes } => {
            let task = controller.delete(id.parse::<TaskId>()?, yes)?;
            changed(output, "Deleted", task)
        }
        Command::Clear { yes } => match controller.clear(yes) {
            Some(removed) => {
                if output.json {
                    println!("{}", serde_json::json!({ "cleared": removed }));
                } else {
                    println!("Cleared {removed} tasks");
                }
                Effect::Changed
            }
            None => Effect::Unchanged,
        },
        Command::List { filter } => {
            if let Some(filter) = filter {
                controller.set_filter(filter.parse::<Filter>()?);
            }
            list(controller, output);
            Effect::Listed
        }
        Command::Filter { filter } => {
            controller.set_filter(filter.parse::<Filter>()?);
            list(controller, output);
            Effect::Listed
        }
    };

    Ok(effect)
}
