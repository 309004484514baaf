//! Inline directive parsing for free-form task input.
//!
//! A line such as `Buy milk !high @2099-01-01` becomes a [`Draft`] with the
//! directives pulled out of the text. Directives are not word-bounded and only
//! the first occurrence of each kind is recognised and stripped.

use crate::error::AppError;
use crate::model::Priority;
use regex::Regex;
use std::sync::LazyLock;
use time::Date;
use time::macros::format_description;

static PRIORITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)!(high|medium|low)").unwrap());
static DUE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([0-9]{4}-[0-9]{2}-[0-9]{2})").unwrap());

pub const EMPTY_TEXT_MESSAGE: &str = "task text cannot be empty";

/// Parsed input that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
}

pub fn parse_input(raw: &str) -> Result<Draft, AppError> {
    let priority = PRIORITY_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|word| word.as_str().parse::<Priority>().ok());

    let due_date = DUE_DATE_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|date| date.as_str().to_string())
        .filter(|candidate| parse_due_date(candidate).is_some());

    let without_priority = strip_first(&PRIORITY_RE, raw);
    let without_date = strip_first(&DUE_DATE_RE, &without_priority);
    let text = without_date.trim();

    if text.is_empty() {
        return Err(AppError::empty_text(EMPTY_TEXT_MESSAGE));
    }

    Ok(Draft {
        text: text.to_string(),
        priority,
        due_date,
    })
}

/// Removes the first match of `re`. When the match sat between two blanks,
/// one of them goes with it so `a @x b` reads `a b`.
fn strip_first(re: &Regex, text: &str) -> String {
    let Some(found) = re.find(text) else {
        return text.to_string();
    };

    let before = &text[..found.start()];
    let mut after = &text[found.end()..];
    if before.ends_with(char::is_whitespace)
        && let Some(first) = after.chars().next()
        && first.is_whitespace()
    {
        after = &after[first.len_utf8()..];
    }

    format!("{before}{after}")
}

/// Strict `YYYY-MM-DD` calendar parse; `None` for impossible dates.
pub fn parse_due_date(value: &str) -> Option<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).ok()
}
