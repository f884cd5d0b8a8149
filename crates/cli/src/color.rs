// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use barn_core::job::JobState;
use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    /// Section headers and running jobs: steel blue.
    pub const HEADER: u8 = 74;
    /// Secondary / muted text: darker grey.
    pub const MUTED: u8 = 240;
    /// Succeeded jobs: green.
    pub const SUCCESS: u8 = 71;
    /// Failed/killed jobs: red.
    pub const FAILURE: u8 = 167;
    /// Queued/canceled jobs: yellow.
    pub const PENDING: u8 = 179;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables -> `COLOR=1` forces -> TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::MUTED)))))
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

const RESET: &str = "\x1b[0m";

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("{}{}{}", fg256(code), text, RESET)
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn muted(text: &str) -> String {
    paint(codes::MUTED, text)
}

/// Color a job's state token the way `barn list`/`barn describe` render it:
/// green once it reached SUCCEEDED, red for FAILED/KILLED, yellow while
/// QUEUED or CANCELED, steel blue while RUNNING.
pub fn state(s: JobState) -> String {
    let code = match s {
        JobState::Succeeded => codes::SUCCESS,
        JobState::Failed | JobState::Killed => codes::FAILURE,
        JobState::Queued | JobState::Canceled => codes::PENDING,
        JobState::Running => codes::HEADER,
    };
    paint(code, &s.to_string())
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
