//! Bank catalog
//!
//! Indexes a bank root directory: one subdirectory per section, each holding
//! one bank file per test. A root that holds bank files directly is exposed
//! as the single implicit "General" section.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use super::parser;
use crate::error::QuizError;

/// Label of the implicit section used when the root holds bank files directly
pub const DEFAULT_SECTION: &str = "General";

/// Curriculum coordinates in a file stem: `<subject>_+Tema<digits>`
static SUBJECT_TOPIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)_+(?i:tema)(\d+)$").unwrap());

/// Index over one bank root directory
///
/// The root is an explicit value; nothing here reads ambient state.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

impl Catalog {
    /// Create a catalog over the given bank root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The bank root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List section labels
    ///
    /// Sections are the subdirectory names under the root, sorted. With no
    /// subdirectories, a root that directly contains bank files reports the
    /// single implicit [`DEFAULT_SECTION`]; an empty root reports nothing.
    /// The root directory is created if missing.
    pub fn sections(&self) -> Result<Vec<String>, QuizError> {
        fs::create_dir_all(&self.root)?;

        let mut sections = Vec::new();
        let mut has_root_banks = false;

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                sections.push(entry.file_name().to_string_lossy().into_owned());
            } else if is_bank_file(&path) {
                has_root_banks = true;
            }
        }

        sections.sort();
        if sections.is_empty() && has_root_banks {
            sections.push(DEFAULT_SECTION.to_string());
        }

        Ok(sections)
    }

    /// List the bank files of a section, sorted by name
    pub fn tests(&self, section: &str) -> Result<Vec<String>, QuizError> {
        let dir = self.section_dir(section);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut tests = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if is_bank_file(&path) {
                if let Some(name) = path.file_name() {
                    tests.push(name.to_string_lossy().into_owned());
                }
            }
        }

        tests.sort();
        Ok(tests)
    }

    /// Directory holding a section's bank files
    ///
    /// The implicit [`DEFAULT_SECTION`] maps to the root itself.
    pub fn section_dir(&self, section: &str) -> PathBuf {
        if section == DEFAULT_SECTION { self.root.clone() } else { self.root.join(section) }
    }

    /// Full path of one bank file within a section
    pub fn test_path(&self, section: &str, test: &str) -> PathBuf {
        self.section_dir(section).join(test)
    }

    /// Create a new section directory; spaces in the name become underscores
    pub fn create_section(&self, name: &str) -> Result<String, QuizError> {
        let label = name.trim().replace(' ', "_");
        if label.is_empty() {
            return Err(QuizError::Format("section name is empty".to_string()));
        }
        fs::create_dir_all(self.root.join(&label))?;
        Ok(label)
    }

    /// Copy an existing bank file into a section
    pub fn install_test(&self, source: &Path, section: &str) -> Result<PathBuf, QuizError> {
        if !is_bank_file(source) {
            return Err(QuizError::Format(format!(
                "{:?} is not a bank file (.json or .txt)",
                source
            )));
        }
        let Some(name) = source.file_name() else {
            return Err(QuizError::Format(format!("{:?} has no file name", source)));
        };

        let dir = self.section_dir(section);
        fs::create_dir_all(&dir)?;
        let dest = dir.join(name);
        fs::copy(source, &dest)?;
        Ok(dest)
    }

    /// Convert a free-text document into a structured bank file in a section
    ///
    /// Writes `<stem>.json`, pretty-printed, and returns its path. Fails with
    /// [`QuizError::EmptyPool`] when the document yields no questions.
    pub fn import_document(&self, source: &Path, section: &str) -> Result<PathBuf, QuizError> {
        let questions = parser::parse_file(source)?;
        if questions.is_empty() {
            return Err(QuizError::EmptyPool);
        }

        let Some(stem) = source.file_stem() else {
            return Err(QuizError::Format(format!("{:?} has no file name", source)));
        };

        let dir = self.section_dir(section);
        fs::create_dir_all(&dir)?;
        let dest = dir.join(format!("{}.json", stem.to_string_lossy()));
        let contents = serde_json::to_string_pretty(&questions)?;
        fs::write(&dest, contents)?;
        Ok(dest)
    }
}

/// Whether a path looks like a bank file (`.json` or `.txt`)
fn is_bank_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("txt"))
}

/// Derive curriculum coordinates from a bank file name
///
/// The stem must match `<subject>_+Tema<digits>` ("tema" in any case);
/// underscore runs in the subject read as spaces. Non-matching names yield
/// `None` and are excluded from topic-based grouping.
pub fn derive_subject_topic(filename: &str) -> Option<(String, u32)> {
    let stem = Path::new(filename).file_stem()?.to_str()?;
    let caps = SUBJECT_TOPIC_RE.captures(stem)?;

    let subject =
        caps[1].split('_').filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ");
    if subject.is_empty() {
        return None;
    }

    let topic = caps[2].parse().ok()?;
    Some((subject, topic))
}
