use crate::error::AppError;
use crate::model::{Task, TaskId};
use crate::parse::{Draft, parse_input};
use crate::storage::KeyValueStore;
use crate::storage::persistence::{load_tasks, save_tasks};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

/// Result of a mutation that was applied in memory. `save_error` is set when
/// the write-through failed; the in-memory change is kept regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved<T> {
    pub value: T,
    pub save_error: Option<AppError>,
}

/// Ordered task collection, written through to a [`KeyValueStore`] after
/// every mutation.
#[derive(Debug)]
pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    backend: S,
    next_id: u64,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn open(mut backend: S) -> Self {
        let mut tasks = load_tasks(&mut backend);
        let mut next_id = 1;
        for task in &mut tasks {
            task.id = TaskId(next_id);
            next_id += 1;
        }

        Self {
            tasks,
            backend,
            next_id,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn index_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn add(&mut self, draft: Draft) -> Result<Saved<Task>, AppError> {
        self.add_at(draft, OffsetDateTime::now_utc())
    }

    pub fn add_at(&mut self, draft: Draft, now: OffsetDateTime) -> Result<Saved<Task>, AppError> {
        let created_at = now
            .to_offset(UtcOffset::UTC)
            .format(&Rfc3339)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;

        let task = Task {
            id: TaskId(self.next_id),
            text: draft.text,
            completed: false,
            priority: draft.priority,
            due_date: draft.due_date,
            created_at,
        };
        self.next_id += 1;
        self.tasks.push(task.clone());

        Ok(self.saved(task))
    }

    pub fn toggle(&mut self, index: usize) -> Result<Saved<Task>, AppError> {
        let task = self.task_mut(index)?;
        task.completed = !task.completed;
        let updated = task.clone();

        Ok(self.saved(updated))
    }

    /// Re-parses `raw`. Text is always replaced; priority and due date only
    /// when the new input carries them, so neither can be cleared here.
    pub fn edit(&mut self, index: usize, raw: &str) -> Result<Saved<Task>, AppError> {
        // Stale index wins over a parse error.
        self.task_mut(index)?;
        let draft = parse_input(raw)?;

        let task = self.task_mut(index)?;
        task.text = draft.text;
        if draft.priority.is_some() {
            task.priority = draft.priority;
        }
        if draft.due_date.is_some() {
            task.due_date = draft.due_date;
        }
        let updated = task.clone();

        Ok(self.saved(updated))
    }

    pub fn delete(&mut self, index: usize) -> Result<Saved<Task>, AppError> {
        if index >= self.tasks.len() {
            return Err(AppError::index_out_of_range(index, self.tasks.len()));
        }
        let removed = self.tasks.remove(index);

        Ok(self.saved(removed))
    }

    /// Empties the store. Returns `None` without writing when there was
    /// nothing to clear, otherwise the number of removed tasks.
    pub fn clear(&mut self) -> Option<Saved<usize>> {
        if self.tasks.is_empty() {
            return None;
        }
        let removed = self.tasks.len();
        self.tasks.clear();

        Some(self.saved(removed))
    }

    fn task_mut(&mut self, index: usize) -> Result<&mut Task, AppError> {
        let len = self.tasks.len();
        self.tasks
            .get_mut(index)
            .ok_or_else(|| AppError::index_out_of_range(index, len))
    }

    fn saved<T>(&mut self, value: T) -> Saved<T> {
        let save_error = save_tasks(&mut self.backend, &self.tasks).err();
        if let Some(err) = save_error.as_ref() {
            log::error!("error saving tasks: {err}");
        }
        Saved { value, save_error }
    }
}
