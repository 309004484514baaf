//! Read-only projection of the task list into render-ready rows.

use crate::error::AppError;
use crate::model::{Priority, Task, TaskId, priority_rank};
use crate::parse::parse_due_date;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

pub const INVALID_DATE_LABEL: &str = "Invalid date";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
    Overdue,
}

impl Filter {
    pub const ALL: [Filter; 4] = [Self::All, Self::Active, Self::Completed, Self::Overdue];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }

    pub fn matches(self, task: &Task, now: OffsetDateTime) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
            Self::Overdue => is_overdue(task, now),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let cleaned = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str() == cleaned)
            .ok_or_else(|| AppError::invalid_input(format!("unknown filter '{}'", raw.trim())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    /// Position in the unfiltered store at projection time.
    pub index: usize,
    pub id: TaskId,
    pub completed: bool,
    pub overdue: bool,
    pub priority: Option<Priority>,
    pub symbol: &'static str,
    pub text: String,
    pub due_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub filter: Filter,
    pub rows: Vec<DisplayRow>,
    pub stats: Stats,
}

/// `now` should carry the local offset; it decides both "today" for labels
/// and the instant due dates are compared against.
pub fn project(tasks: &[Task], filter: Filter, now: OffsetDateTime) -> Projection {
    let mut visible: Vec<(usize, &Task)> = tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| filter.matches(task, now))
        .collect();
    merge_sort_by(&mut visible, &mut |a, b| compare_tasks(a.1, b.1));

    let rows = visible
        .into_iter()
        .map(|(index, task)| DisplayRow {
            index,
            id: task.id,
            completed: task.completed,
            overdue: is_overdue(task, now),
            priority: task.priority,
            symbol: task.priority.map(Priority::symbol).unwrap_or(""),
            text: escape_text(&task.text),
            due_label: task
                .due_date
                .as_deref()
                .map(|due| due_label(due, task.completed, now.date())),
        })
        .collect();

    Projection {
        filter,
        rows,
        stats: stats(tasks, now),
    }
}

pub fn stats(tasks: &[Task], now: OffsetDateTime) -> Stats {
    Stats {
        total: tasks.len(),
        completed: tasks.iter().filter(|task| task.completed).count(),
        overdue: tasks.iter().filter(|task| is_overdue(task, now)).count(),
    }
}

/// Incomplete and dated with a due day whose midnight (UTC) has passed.
pub fn is_overdue(task: &Task, now: OffsetDateTime) -> bool {
    if task.completed {
        return false;
    }
    task.due_date
        .as_deref()
        .and_then(parse_due_date)
        .is_some_and(|due| due.midnight().assume_utc() < now)
}

/// Completion, then priority, then due date when both tasks have one, then
/// newest first. Two dated tasks never fall through to the creation time.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    if a.completed != b.completed {
        return a.completed.cmp(&b.completed);
    }

    let by_priority = priority_rank(b.priority).cmp(&priority_rank(a.priority));
    if by_priority != Ordering::Equal {
        return by_priority;
    }

    if let (Some(a_due), Some(b_due)) = (a.due_date.as_deref(), b.due_date.as_deref()) {
        return match (parse_due_date(a_due), parse_due_date(b_due)) {
            (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
            _ => Ordering::Equal,
        };
    }

    match (
        OffsetDateTime::parse(&a.created_at, &Rfc3339),
        OffsetDateTime::parse(&b.created_at, &Rfc3339),
    ) {
        (Ok(a_created), Ok(b_created)) => b_created.cmp(&a_created),
        _ => Ordering::Equal,
    }
}

/// Stable top-down merge sort. Unlike `slice::sort_by` it tolerates a
/// comparator that is not a total order: [`compare_tasks`] can form cycles
/// when only one of two tasks has a due date.
fn merge_sort_by<T: Copy>(items: &mut [T], compare: &mut dyn FnMut(&T, &T) -> Ordering) {
    let len = items.len();
    if len <= 1 {
        return;
    }

    let mid = len / 2;
    merge_sort_by(&mut items[..mid], compare);
    merge_sort_by(&mut items[mid..], compare);

    let mut merged = Vec::with_capacity(len);
    let (mut left, mut right) = (0, mid);
    while left < mid && right < len {
        // Right side only wins when strictly smaller, which keeps ties stable.
        if compare(&items[right], &items[left]) == Ordering::Less {
            merged.push(items[right]);
            right += 1;
        } else {
            merged.push(items[left]);
            left += 1;
        }
    }
    merged.extend_from_slice(&items[left..mid]);
    merged.extend_from_slice(&items[right..]);
    items.copy_from_slice(&merged);
}

pub fn due_label(due_date: &str, completed: bool, today: Date) -> String {
    let Some(due) = parse_due_date(due_date) else {
        log::debug!("unparseable due date '{due_date}'");
        return INVALID_DATE_LABEL.to_string();
    };

    if due == today {
        return "Today".to_string();
    }
    if today.checked_add(Duration::days(1)) == Some(due) {
        return "Tomorrow".to_string();
    }

    let Ok(formatted) = due.format(format_description!(
        "[month padding:none]/[day padding:none]/[year]"
    )) else {
        return INVALID_DATE_LABEL.to_string();
    };

    if due < today && !completed {
        format!("Overdue: {formatted}")
    } else {
        formatted
    }
}

/// Makes control characters visible so stored text cannot emit terminal
/// control sequences when printed.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_control() {
            escaped.extend(ch.escape_default());
        } else {
            escaped.push(ch);
        }
    }
    escaped
}
