//! Results history persistence
//!
//! An append-only record of completed sessions, held in one JSON file shaped
//! as `{ "exams": [...] }`. The whole file is rewritten on every append;
//! exactly one process is expected to own it at a time (concurrent writers
//! lose updates, last full rewrite wins).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::exam::session::ExamOutcome;

/// How a session's questions were selected
///
/// New kinds are additive tags; existing history remains readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// One whole test, in order
    Lesson,
    /// Twenty questions drawn across the whole bank
    Random20,
    /// Forty questions drawn from the first curriculum half
    HalfFirst,
    /// Forty questions drawn from the second curriculum half
    HalfSecond,
}

impl SessionKind {
    /// Stable label, as persisted
    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Lesson => "lesson",
            SessionKind::Random20 => "random20",
            SessionKind::HalfFirst => "half_first",
            SessionKind::HalfSecond => "half_second",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The persisted summary of one completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Selection strategy of the session
    #[serde(rename = "type")]
    pub kind: SessionKind,

    /// Section the session was drawn from; absent for whole-bank sessions
    pub section: Option<String>,

    /// Source test file; absent for multi-file sessions
    pub test: Option<String>,

    /// Correct answers
    pub score: u32,

    /// Presented questions
    pub total: u32,

    /// Completion time, second precision
    pub date: NaiveDateTime,
}

impl SessionResult {
    /// Summarize a completed session
    pub fn from_outcome(
        kind: SessionKind,
        section: Option<String>,
        test: Option<String>,
        outcome: &ExamOutcome,
        completed_at: NaiveDateTime,
    ) -> Self {
        Self {
            kind,
            section,
            test,
            score: outcome.score,
            total: outcome.total,
            date: completed_at,
        }
    }
}

/// Current local time truncated to whole seconds
pub fn now_local() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// On-disk shape of the history file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HistoryFile {
    exams: Vec<SessionResult>,
}

/// The append-only session history
#[derive(Debug)]
pub struct ResultsStore {
    path: PathBuf,
    history: HistoryFile,
}

impl ResultsStore {
    /// Load the history from disk
    ///
    /// A missing file is an empty history. A file that exists but cannot be
    /// parsed is [`QuizError::CorruptHistory`]; it is never silently
    /// replaced.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, QuizError> {
        let path = path.into();

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let history = serde_json::from_str(&contents).map_err(|e| {
                QuizError::CorruptHistory { path: path.clone(), message: e.to_string() }
            })?;
            Ok(Self { path, history })
        } else {
            Ok(Self { path, history: HistoryFile::default() })
        }
    }

    /// Append one result and rewrite the whole history
    pub fn append(&mut self, result: SessionResult) -> Result<(), QuizError> {
        self.history.exams.push(result);
        self.save()
    }

    /// All recorded results, in append order
    pub fn results(&self) -> &[SessionResult] {
        &self.history.exams
    }

    /// Path of the history file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), QuizError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.history)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
