//! Binds user actions to the task store.
//!
//! Every action resolves its [`TaskId`] to the task's current position at the
//! moment it runs, so a row rendered before an unrelated delete still
//! addresses the right task. Unknown ids are ignored.

use crate::prompt::Prompter;
use asciitodo_core::error::AppError;
use asciitodo_core::model::{Task, TaskId};
use asciitodo_core::parse::parse_input;
use asciitodo_core::storage::KeyValueStore;
use asciitodo_core::store::{Saved, TaskStore};
use asciitodo_core::view::{Filter, Projection, project};
use time::OffsetDateTime;

pub const SAVE_FAILED_MESSAGE: &str =
    "Failed to save your changes. Please check your storage settings.";
pub const CONFIRM_DELETE_MESSAGE: &str = "Are you sure you want to delete this task?";
pub const CONFIRM_CLEAR_MESSAGE: &str = "Are you sure you want to clear all tasks?";
pub const EDIT_PROMPT_MESSAGE: &str = "Edit task";

pub struct Controller<S: KeyValueStore, P: Prompter> {
    store: TaskStore<S>,
    prompter: P,
    filter: Filter,
}

impl<S: KeyValueStore, P: Prompter> Controller<S, P> {
    pub fn new(store: TaskStore<S>, prompter: P, filter: Filter) -> Self {
        Self {
            store,
            prompter,
            filter,
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn prompter_mut(&mut self) -> &mut P {
        &mut self.prompter
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn projection(&self, now: OffsetDateTime) -> Projection {
        project(self.store.tasks(), self.filter, now)
    }

    /// Parse errors are returned for the caller to show; nothing is stored.
    pub fn submit(&mut self, raw: &str) -> Result<Task, AppError> {
        let draft = parse_input(raw)?;
        let saved = self.store.add(draft)?;
        Ok(self.report(saved))
    }

    pub fn toggle(&mut self, id: TaskId) -> Result<Option<Task>, AppError> {
        let Some(index) = self.resolve(id) else {
            return Ok(None);
        };
        let result = self.store.toggle(index);
        self.finish(result)
    }

    /// With `text` absent the prompter is asked, pre-filled with the current
    /// text; cancelling changes nothing.
    pub fn edit(&mut self, id: TaskId, text: Option<&str>) -> Result<Option<Task>, AppError> {
        let Some(index) = self.resolve(id) else {
            return Ok(None);
        };

        let answer = match text {
            Some(text) => text.to_string(),
            None => {
                let current = self
                    .store
                    .get(index)
                    .map(|task| task.text.clone())
                    .unwrap_or_default();
                match self.prompter.ask(EDIT_PROMPT_MESSAGE, &current) {
                    Some(answer) => answer,
                    None => return Ok(None),
                }
            }
        };

        let result = self.store.edit(index, &answer);
        self.finish(result)
    }

    pub fn delete(&mut self, id: TaskId, confirmed: bool) -> Result<Option<Task>, AppError> {
        let Some(index) = self.resolve(id) else {
            return Ok(None);
        };
        if !confirmed && !self.prompter.confirm(CONFIRM_DELETE_MESSAGE) {
            return Ok(None);
        }
        let result = self.store.delete(index);
        self.finish(result)
    }

    /// `None` when nothing was removed: the store was already empty (no
    /// prompt is shown) or the user declined.
    pub fn clear(&mut self, confirmed: bool) -> Option<usize> {
        if self.store.is_empty() {
            return None;
        }
        if !confirmed && !self.prompter.confirm(CONFIRM_CLEAR_MESSAGE) {
            return None;
        }
        let saved = self.store.clear()?;
        Some(self.report(saved))
    }

    fn resolve(&self, id: TaskId) -> Option<usize> {
        let index = self.store.index_of(id);
        if index.is_none() {
            log::debug!("ignoring action for unknown task {id}");
        }
        index
    }

    fn finish(&mut self, result: Result<Saved<Task>, AppError>) -> Result<Option<Task>, AppError> {
        match result {
            Ok(saved) => Ok(Some(self.report(saved))),
            Err(AppError::IndexOutOfRange { index, len }) => {
                log::debug!("ignoring stale index {index} (store has {len} tasks)");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn report<T>(&mut self, saved: Saved<T>) -> T {
        if saved.save_error.is_some() {
            self.prompter.alert(SAVE_FAILED_MESSAGE);
        }
        saved.value
    }
}
