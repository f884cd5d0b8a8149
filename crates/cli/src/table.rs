// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable table rendering for `barn list`/`barn status`.

use barn_wire::{JobView, StatusView};
use tabled::settings::{object::Columns, Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::color;

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "LOAD")]
    load_level: String,
    #[tabled(rename = "COMMAND")]
    command: String,
    #[tabled(rename = "TAG")]
    tag: String,
    #[tabled(rename = "CREATED")]
    created_at: String,
}

impl From<&JobView> for JobRow {
    fn from(job: &JobView) -> Self {
        Self {
            id: job.id.clone(),
            state: color::state(job.state),
            load_level: job.load_level.to_string(),
            command: truncate(&job.command.join(" "), 48),
            tag: job.tag.clone().unwrap_or_else(|| "-".to_string()),
            created_at: job.created_at.to_rfc3339(),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max.saturating_sub(3)).collect::<String>())
    }
}

pub fn render_job_list(jobs: &[JobView]) -> String {
    let rows: Vec<JobRow> = jobs.iter().map(JobRow::from).collect();
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string()
}

pub fn render_job_detail(job: &JobView) -> String {
    let mut lines = vec![
        format!("{}  {}", color::header("id:"), job.id),
        format!("{}  {}", color::header("state:"), color::state(job.state)),
        format!("{}  {}", color::header("load level:"), job.load_level),
        format!("{}  {}", color::header("command:"), job.command.join(" ")),
        format!("{}  {}", color::header("tag:"), job.tag.as_deref().unwrap_or("-")),
        format!("{}  {}", color::header("created at:"), job.created_at.to_rfc3339()),
    ];
    if let Some(started) = job.started_at {
        lines.push(format!("{}  {}", color::header("started at:"), started.to_rfc3339()));
    }
    if let Some(finished) = job.finished_at {
        lines.push(format!("{}  {}", color::header("finished at:"), finished.to_rfc3339()));
    }
    if let Some(pid) = job.pid {
        lines.push(format!("{}  {}", color::header("pid:"), pid));
    }
    if let Some(heartbeat) = job.heartbeat {
        lines.push(format!("{}  {}", color::header("heartbeat:"), heartbeat.to_rfc3339()));
    }
    if let Some(exit_code) = &job.exit_code {
        lines.push(format!("{}  {}", color::header("exit code:"), exit_code));
    }
    if let Some(error) = &job.error {
        lines.push(format!("{}  {}", color::header("error:"), error));
    }
    lines.push(format!("{}  {}", color::header("retry count:"), job.retry_count));
    if let Some(retry_at) = job.retry_at {
        lines.push(format!("{}  {}", color::header("retry at:"), retry_at.to_rfc3339()));
    }
    if !job.retry_history.is_empty() {
        lines.push(color::header("retry history:"));
        for line in &job.retry_history {
            lines.push(format!("  {}", color::muted(line)));
        }
    }
    lines.join("\n")
}

pub fn render_status(status: &StatusView) -> String {
    let header = if status.running { "scheduler: running" } else { "scheduler: stopped" };
    format!(
        "{}\n  high:   {}/{}\n  medium: {}/{}\n  low:    {}/{}\n{}  {}",
        color::header(header),
        status.running_high,
        status.limits.max_high,
        status.running_medium,
        status.limits.max_medium,
        status.running_low,
        status.limits.max_low,
        color::header("queued:"),
        status.queued,
    )
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
