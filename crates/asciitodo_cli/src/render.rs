use asciitodo_core::config::Palette;
use asciitodo_core::error::AppError;
use asciitodo_core::model::{Task, TaskId};
use asciitodo_core::view::{DisplayRow, Filter, Projection, Stats};
use tabled::settings::Style;
use tabled::{Table, Tabled};

pub const RENDER_ERROR_PLACEHOLDER: &str = "Error displaying tasks";

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "#")]
    id: TaskId,
    #[tabled(rename = "done")]
    check: &'static str,
    #[tabled(rename = "pri")]
    symbol: String,
    #[tabled(rename = "task")]
    text: String,
    #[tabled(rename = "due")]
    due: String,
}

impl TableRow {
    fn new(row: &DisplayRow, palette: &Palette) -> Self {
        let due = row
            .due_label
            .as_ref()
            .map(|label| format!("({label})"))
            .unwrap_or_default();

        Self {
            id: row.id,
            check: if row.completed { "[x]" } else { "[ ]" },
            symbol: palette.accentize(row.symbol),
            text: row.text.clone(),
            due: if row.overdue {
                palette.alertize(&due)
            } else {
                due
            },
        }
    }
}

pub fn render_rows(rows: &[DisplayRow], palette: &Palette) -> String {
    if rows.is_empty() {
        return palette.mutedize("No tasks");
    }

    let mut table = Table::new(rows.iter().map(|row| TableRow::new(row, palette)));
    table.with(Style::blank());
    table.to_string()
}

pub fn render_stats(stats: &Stats, palette: &Palette) -> String {
    let mut line = palette.accentize(&format!(
        "{}/{} tasks completed",
        stats.completed, stats.total
    ));
    if stats.overdue > 0 {
        line.push(' ');
        line.push_str(&palette.alertize(&format!("({} overdue)", stats.overdue)));
    }
    line
}

/// `[all] active completed overdue`, with exactly the active filter marked.
pub fn render_filter_bar(active: Filter) -> String {
    Filter::ALL
        .iter()
        .map(|filter| {
            if *filter == active {
                format!("[{filter}]")
            } else {
                filter.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_list(
    projection: &Projection,
    palette: &Palette,
    json: bool,
    with_filter_bar: bool,
) -> Result<String, AppError> {
    if json {
        return serde_json::to_string(projection)
            .map_err(|err| AppError::invalid_data(err.to_string()));
    }

    let mut sections = Vec::with_capacity(3);
    if with_filter_bar {
        sections.push(render_filter_bar(projection.filter));
    }
    sections.push(render_rows(&projection.rows, palette));
    sections.push(render_stats(&projection.stats, palette));
    Ok(sections.join("\n"))
}

/// Prints the list, or a placeholder when rendering fails.
pub fn print_list(projection: &Projection, palette: &Palette, json: bool, with_filter_bar: bool) {
    match render_list(projection, palette, json, with_filter_bar) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => {
            log::error!("error rendering tasks: {err}");
            println!("{RENDER_ERROR_PLACEHOLDER}");
        }
    }
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "text": task.text,
        "completed": task.completed,
        "priority": task.priority,
        "dueDate": task.due_date,
        "createdAt": task.created_at,
    })
}
