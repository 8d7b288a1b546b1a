use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, TimeZone};
use unicode_width::UnicodeWidthStr;

use crate::api::{Notifier, Toast, ToastStyle};
use crate::board::Board;
use crate::category::{CategoryStats, TaskCategory, category_name, category_stats};
use crate::color::category_color;
use crate::config::Config;
use crate::datetime::{format_relative_date_at, is_overdue_at};
use crate::filter::{CategorySelection, task_count_by_category};
use crate::priority::{Priority, priority_by_id};
use crate::project::CodingProject;
use crate::settings::Settings;
use crate::task::Task;

const NO_DESCRIPTION: &str = "_No description provided_";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(settings: &Settings, no_color: bool) -> anyhow::Result<Self> {
        let color = settings.color_enabled()? && !no_color;
        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, board, tasks, now))]
    pub fn print_task_table<Z: TimeZone>(
        &self,
        board: &Board,
        tasks: &[Task],
        now: &DateTime<Z>,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "ID".to_string(),
            "".to_string(),
            "Task".to_string(),
            "Category".to_string(),
            "Due".to_string(),
            "Priority".to_string(),
            "".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());
        for task in tasks {
            let status = if task.done { "[x]" } else { "[ ]" };
            let name = category_name(task, &board.categories);

            let mut due = format_relative_date_at(&task.due, now);
            if !task.done && is_overdue_at(&task.due, now) {
                due = self.paint(&format!("{due} !"), "31");
            }

            let priority = task
                .priority_id
                .map(|id| {
                    let priority = priority_by_id(&board.priorities, id);
                    self.paint_hex(&priority.name, &priority.color)
                })
                .unwrap_or_default();

            rows.push(vec![
                self.paint(&task.id.to_string(), "33"),
                status.to_string(),
                task.task.clone(),
                self.paint_hex(name, category_color(Some(name))),
                due,
                priority,
                if task.archived { "archived".to_string() } else { String::new() },
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    /// One line with the open-task count per category, `All` first.
    pub fn print_category_counts(&self, board: &Board) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let mut parts = vec![format!(
            "All • {}",
            task_count_by_category(&board.tasks, &CategorySelection::All)
        )];
        for category in &board.categories {
            let name = if category.category.is_empty() {
                "Unnamed"
            } else {
                category.category.as_str()
            };
            let count =
                task_count_by_category(&board.tasks, &CategorySelection::from(category.id));
            parts.push(format!(
                "{} • {count}",
                self.paint_hex(name, category_color(Some(name)))
            ));
        }
        writeln!(out, "{}", parts.join("   "))?;
        Ok(())
    }

    #[tracing::instrument(skip(self, categories, tasks))]
    pub fn print_category_table(
        &self,
        categories: &[TaskCategory],
        tasks: &[Task],
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let count = categories.len();
        writeln!(
            out,
            "{count} categor{} • Sorted alphabetically",
            if count == 1 { "y" } else { "ies" }
        )?;

        let headers = vec![
            "ID".to_string(),
            "Category".to_string(),
            "Active".to_string(),
            "Total".to_string(),
            "Repository".to_string(),
            "Branch".to_string(),
        ];
        let rows = categories
            .iter()
            .map(|category| {
                let stats = category_stats(category.id, tasks);
                vec![
                    self.paint(&category.id.to_string(), "33"),
                    self.paint_hex(&category.category, category_color(Some(&category.category))),
                    stats.active.to_string(),
                    stats.total.to_string(),
                    category.repository_url.clone().unwrap_or_default(),
                    category.branch_name.clone().unwrap_or_default(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    pub fn print_priority_table(&self, priorities: &[Priority]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let headers = vec![
            "ID".to_string(),
            "Level".to_string(),
            "Name".to_string(),
            "Color".to_string(),
        ];
        let rows = priorities
            .iter()
            .map(|priority| {
                vec![
                    self.paint(&priority.id.to_string(), "33"),
                    priority.level.to_string(),
                    self.paint_hex(&priority.name, &priority.color),
                    priority.color.clone(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    pub fn print_project_table<Z: TimeZone>(
        &self,
        projects: &[CodingProject],
        now: &DateTime<Z>,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let headers = vec![
            "ID".to_string(),
            "Name".to_string(),
            "Branch".to_string(),
            "Repository".to_string(),
            "Created".to_string(),
        ];
        let rows = projects
            .iter()
            .map(|project| {
                vec![
                    self.paint(&project.id.to_string(), "33"),
                    project.name.clone(),
                    project.branch_name.clone(),
                    project.repository_url.clone(),
                    format_relative_date_at(&project.created_at, now),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    pub fn print_config(&self, config: &Config) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let headers = vec!["Endpoint".to_string(), "URL".to_string()];
        let rows = config
            .endpoints()
            .iter()
            .map(|(name, url)| {
                let url = if url.is_empty() {
                    self.paint("(not set)", "2")
                } else {
                    url.to_string()
                };
                vec![name.to_string(), url]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    pub fn print_empty_state(&self, title: &str, description: &str) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", self.paint(title, "1"))?;
        writeln!(out, "{description}")?;
        Ok(())
    }

    pub fn print_markdown(&self, markdown: &str) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{markdown}")?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    /// Truecolor foreground from a `#RRGGBB` value; other shapes print plain.
    fn paint_hex(&self, text: &str, hex: &str) -> String {
        match hex_to_rgb(hex) {
            Some((r, g, b)) => self.paint(text, &format!("38;2;{r};{g};{b}")),
            None => text.to_string(),
        }
    }
}

/// Markdown body of the task detail view.
pub fn task_markdown<Z: TimeZone>(
    task: &Task,
    category_name: &str,
    priorities: &[Priority],
    now: &DateTime<Z>,
) -> String {
    let description = task
        .description
        .as_deref()
        .filter(|desc| !desc.trim().is_empty())
        .unwrap_or(NO_DESCRIPTION);

    let mut lines = vec![
        format!("# {}", task.task),
        String::new(),
        description.to_string(),
        String::new(),
        "---".to_string(),
        String::new(),
        format!("**Category:** {category_name}"),
    ];
    if let Some(id) = task.priority_id {
        lines.push(format!("**Priority:** {}", priority_by_id(priorities, id).name));
    }
    lines.push(format!(
        "**Status:** {}",
        if task.done { "✅ Done" } else { "⏳ Pending" }
    ));
    lines.push(format!(
        "**Archived:** {}",
        if task.archived { "📦 Yes" } else { "No" }
    ));

    let mut due = format!("**Due Date:** {}", format_relative_date_at(&task.due, now));
    if !task.done && is_overdue_at(&task.due, now) {
        due.push_str(" ⚠️ **Overdue**");
    }
    lines.push(due);

    lines.join("\n")
}

/// Markdown body of the category detail view.
pub fn category_markdown<Z: TimeZone>(
    category: &TaskCategory,
    stats: &CategoryStats,
    now: &DateTime<Z>,
) -> String {
    let description = category
        .description
        .as_deref()
        .filter(|desc| !desc.trim().is_empty())
        .unwrap_or(NO_DESCRIPTION);

    let mut lines = vec![
        format!("# {}", category.category),
        String::new(),
        description.to_string(),
        String::new(),
        "---".to_string(),
        String::new(),
        format!("**Total Tasks:** {}", stats.total),
        format!("**Active Tasks:** {}", stats.active),
        format!("**Completed Tasks:** {}", stats.done),
        format!("**Archived Tasks:** {}", stats.archived),
    ];

    if let Some(url) = category.repository_url.as_deref().filter(|u| !u.trim().is_empty()) {
        lines.push(String::new());
        lines.push(format!("**Repository:** {url}"));
        if let Some(branch) = category.branch_name.as_deref().filter(|b| !b.trim().is_empty()) {
            lines.push(format!("**Branch:** {branch}"));
        }
    }

    let created = category.created_at.as_deref();
    let updated = category.updated_at.as_deref();
    if created.is_some() || updated.is_some() {
        lines.push(String::new());
    }
    if let Some(created) = created {
        lines.push(format!("**Created:** {}", format_relative_date_at(created, now)));
    }
    if let Some(updated) = updated {
        lines.push(format!("**Updated:** {}", format_relative_date_at(updated, now)));
    }

    lines.join("\n")
}

/// Prints toasts on stderr so they never mix with table output.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    color: bool,
}

impl ConsoleNotifier {
    pub fn new(color: bool) -> Self {
        Self {
            color: color && io::stderr().is_terminal(),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        let (mark, code) = match toast.style {
            ToastStyle::Success => ("✓", "32"),
            ToastStyle::Failure => ("✗", "31"),
        };
        let mark = if self.color {
            format!("\x1b[{code}m{mark}\x1b[0m")
        } else {
            mark.to_string()
        };

        let mut err = io::stderr().lock();
        let _ = match toast.message {
            Some(message) => writeln!(err, "{mark} {}: {message}", toast.title),
            None => writeln!(err, "{mark} {}", toast.title),
        };
    }
}

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
