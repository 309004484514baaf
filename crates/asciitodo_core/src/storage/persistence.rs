//! Task list (de)serialization over a [`KeyValueStore`].
//!
//! Loading never fails. A missing key, a value that is not a JSON array, or an
//! unreadable store normalize to an empty list, which is written back so the
//! key exists afterwards. Inside an array, records are read one by one: a
//! record with usable text is kept with its bad fields defaulted, anything
//! else is skipped. Stored data is left as-is until the next save.

use crate::error::AppError;
use crate::model::{Priority, Task, TaskId};
use serde_json::Value;
use crate::storage::KeyValueStore;

pub const STORAGE_KEY: &str = "ascii-todos";

pub fn load_tasks<S: KeyValueStore + ?Sized>(store: &mut S) -> Vec<Task> {
    let raw = match store.get_item(STORAGE_KEY) {
        Ok(raw) => raw,
        Err(err) => {
            log::error!("error loading tasks: {err}");
            reset(store);
            return Vec::new();
        }
    };

    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => {
            reset(store);
            return Vec::new();
        }
    };

    match decode_tasks(&raw) {
        Ok(tasks) => tasks,
        Err(err) => {
            log::warn!("invalid tasks data, resetting: {err}");
            reset(store);
            Vec::new()
        }
    }
}

pub fn save_tasks<S: KeyValueStore + ?Sized>(store: &mut S, tasks: &[Task]) -> Result<(), AppError> {
    let content =
        serde_json::to_string(tasks).map_err(|err| AppError::invalid_data(err.to_string()))?;
    store.set_item(STORAGE_KEY, &content)
}

fn decode_tasks(raw: &str) -> Result<Vec<Task>, AppError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| AppError::invalid_data(err.to_string()))?;
    let Value::Array(records) = value else {
        return Err(AppError::invalid_data("stored tasks are not an array"));
    };

    Ok(records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| decode_record(position, record))
        .collect())
}

fn decode_record(position: usize, record: Value) -> Option<Task> {
    let task = match serde_json::from_value::<Task>(record.clone()) {
        Ok(task) => Some(task),
        Err(err) => {
            log::warn!("repairing task record {position}: {err}");
            repair_record(&record)
        }
    };
    match task {
        Some(task) if !task.text.trim().is_empty() => Some(task),
        _ => {
            log::warn!("skipping task record {position}: no text");
            None
        }
    }
}

fn repair_record(record: &Value) -> Option<Task> {
    let text = record.get("text").and_then(Value::as_str)?;
    let string_field = |name: &str| record.get(name).and_then(Value::as_str).map(str::to_string);
    Some(Task {
        id: TaskId::default(),
        text: text.to_string(),
        completed: record
            .get("completed")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        priority: string_field("priority").and_then(|raw| raw.parse::<Priority>().ok()),
        due_date: string_field("dueDate"),
        created_at: string_field("createdAt").unwrap_or_default(),
    })
}

fn reset<S: KeyValueStore + ?Sized>(store: &mut S) {
    if let Err(err) = save_tasks(store, &[]) {
        log::error!("error saving tasks: {err}");
    }
}
