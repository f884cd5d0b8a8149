// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Load-level classifier (§4.4): matches a command's executable against
//! three gitignore-style whitelist files and picks HIGH > MEDIUM > LOW,
//! defaulting to MEDIUM on no match.

use barn_core::job::LoadLevel;
use std::path::{Path, PathBuf};

/// A single parsed line from a `*.load` file.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    /// Bare name (no `/`): matches any command whose executable basename
    /// equals this name.
    Name(String),
    /// Absolute path with no trailing slash: matches that exact path.
    ExactPath(PathBuf),
    /// Absolute path with a trailing slash: matches commands whose parent
    /// directory equals this normalized directory (non-recursive).
    Dir(PathBuf),
}

impl Pattern {
    fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        if !trimmed.contains('/') {
            return Some(Pattern::Name(trimmed.to_string()));
        }
        if let Some(dir) = trimmed.strip_suffix('/') {
            return Some(Pattern::Dir(PathBuf::from(dir)));
        }
        Some(Pattern::ExactPath(PathBuf::from(trimmed)))
    }

    fn matches(&self, executable: &str) -> bool {
        let exe_path = Path::new(executable);
        match self {
            Pattern::Name(name) => exe_path.file_name().map(|f| f == name.as_str()).unwrap_or(false),
            Pattern::ExactPath(path) => exe_path == path,
            Pattern::Dir(dir) => exe_path.parent().map(|p| p == dir).unwrap_or(false),
        }
    }
}

fn parse_patterns(contents: &str) -> Vec<Pattern> {
    contents.lines().filter_map(Pattern::parse_line).collect()
}

/// Pure classifier holding the three parsed whitelists. Construct once via
/// [`Classifier::load`] from a configuration directory, then call
/// [`Classifier::classify`] for every incoming command — it does no I/O.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    high: Vec<Pattern>,
    medium: Vec<Pattern>,
    low: Vec<Pattern>,
}

impl Classifier {
    /// Reads `high.load`, `medium.load`, `low.load` from `config_dir`. A
    /// missing file yields an empty (never-matching) list rather than an
    /// error — absence of the whole classifier config is valid and just
    /// means "everything is MEDIUM".
    pub fn load(config_dir: &Path) -> std::io::Result<Self> {
        Ok(Self {
            high: Self::read_file(config_dir, "high.load")?,
            medium: Self::read_file(config_dir, "medium.load")?,
            low: Self::read_file(config_dir, "low.load")?,
        })
    }

    fn read_file(config_dir: &Path, name: &str) -> std::io::Result<Vec<Pattern>> {
        match std::fs::read_to_string(config_dir.join(name)) {
            Ok(contents) => Ok(parse_patterns(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub fn from_lists(high: &str, medium: &str, low: &str) -> Self {
        Self { high: parse_patterns(high), medium: parse_patterns(medium), low: parse_patterns(low) }
    }

    /// Classify `command` (first element is the executable). Priority
    /// HIGH > MEDIUM > LOW; first match within that order wins. No match
    /// anywhere defaults to MEDIUM.
    pub fn classify(&self, command: &[String]) -> LoadLevel {
        let Some(executable) = command.first() else {
            return LoadLevel::Medium;
        };
        if self.high.iter().any(|p| p.matches(executable)) {
            return LoadLevel::High;
        }
        if self.medium.iter().any(|p| p.matches(executable)) {
            return LoadLevel::Medium;
        }
        if self.low.iter().any(|p| p.matches(executable)) {
            return LoadLevel::Low;
        }
        LoadLevel::Medium
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
