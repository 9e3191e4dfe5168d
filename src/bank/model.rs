//! Question model for test banks
//!
//! This module defines the core data structures for multiple-choice
//! questions. The model is shared by the structured (JSON) and free-text
//! bank sources.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four option letters of a question
///
/// Serializes as the bare letter (`"A"`) so it can key the options map in
/// JSON bank files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    /// All letters in display order
    pub const ALL: [Letter; 4] = [Letter::A, Letter::B, Letter::C, Letter::D];

    /// Parse a letter from a character (either case)
    pub fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            _ => None,
        }
    }

    /// The uppercase character for this letter
    pub fn as_char(self) -> char {
        match self {
            Letter::A => 'A',
            Letter::B => 'B',
            Letter::C => 'C',
            Letter::D => 'D',
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single multiple-choice question
///
/// `section` and `test` are provenance tags attached by the selector when a
/// question enters a multi-source pool; the parser never sets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Question text
    pub question: String,

    /// Option letter to option text
    pub options: BTreeMap<Letter, String>,

    /// Correct option letter, if it could be resolved
    ///
    /// When set, it is expected to be a key of `options`; the parser does
    /// not enforce this, so scoring treats an unresolvable letter as absent
    /// text.
    #[serde(default)]
    pub answer: Option<Letter>,

    /// Section the question was drawn from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Bank file the question was drawn from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
}

impl Question {
    /// Create a question with no options and no answer
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            options: BTreeMap::new(),
            answer: None,
            section: None,
            test: None,
        }
    }

    /// Add an option
    pub fn with_option(mut self, letter: Letter, text: impl Into<String>) -> Self {
        self.options.insert(letter, text.into());
        self
    }

    /// Set the correct answer
    pub fn with_answer(mut self, letter: Letter) -> Self {
        self.answer = Some(letter);
        self
    }

    /// Get the text of an option, if present
    pub fn option_text(&self, letter: Letter) -> Option<&str> {
        self.options.get(&letter).map(String::as_str)
    }

    /// Whether this question can ever be scored as correct
    ///
    /// False when parsing (and fallback recovery) could not resolve an
    /// answer, or when the recorded answer is not one of the options.
    pub fn is_scorable(&self) -> bool {
        self.answer.is_some_and(|letter| self.options.contains_key(&letter))
    }
}
