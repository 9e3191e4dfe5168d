//! Exam selection strategies
//!
//! Builds the question list for a session: one whole test, a random draw
//! across the catalog, or a draw from one half of the curriculum grouped by
//! subject. All multi-file strategies tag questions with their section and
//! source file, skip unreadable bank files with a warning, and sample
//! without replacement.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::bank::catalog::{Catalog, derive_subject_topic};
use crate::bank::model::Question;
use crate::bank::parser;
use crate::error::QuizError;

/// Questions drawn for the random-across-the-bank exam
pub const RANDOM_EXAM_SIZE: usize = 20;

/// Questions drawn for a curriculum-half exam
pub const HALF_EXAM_SIZE: usize = 40;

/// Which half of each subject's topic-ordered file list to draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurriculumHalf {
    /// Topics before the midpoint (`floor(count / 2)` files)
    First,
    /// Topics from the midpoint on
    Second,
}

/// Load one complete test in parsed order
///
/// Fails with [`QuizError::EmptyPool`] when the file yields no usable
/// questions.
pub fn single_test(
    catalog: &Catalog,
    section: &str,
    test: &str,
) -> Result<Vec<Question>, QuizError> {
    let path = catalog.test_path(section, test);
    let mut questions = parser::parse_file(&path)?;
    retain_usable(&mut questions);

    if questions.is_empty() {
        return Err(QuizError::EmptyPool);
    }

    tag(&mut questions, section, test);
    warn_unscorable(&questions, test);
    Ok(questions)
}

/// Draw up to [`RANDOM_EXAM_SIZE`] questions uniformly from the whole bank
pub fn random_exam<R: Rng + ?Sized>(
    catalog: &Catalog,
    rng: &mut R,
) -> Result<Vec<Question>, QuizError> {
    let pool = gather_pool(catalog)?;
    if pool.is_empty() {
        return Err(QuizError::EmptyPool);
    }

    let drawn = sample(pool, RANDOM_EXAM_SIZE, rng);
    warn_unscorable(&drawn, "random exam");
    Ok(drawn)
}

/// Draw up to [`HALF_EXAM_SIZE`] questions from one curriculum half
///
/// Bank files whose names carry no subject/topic coordinates are excluded
/// from this mode entirely. Within each subject, files sort by topic number
/// and split at `floor(count / 2)`; a single-file subject contributes
/// nothing to the first half.
pub fn half_exam<R: Rng + ?Sized>(
    catalog: &Catalog,
    half: CurriculumHalf,
    rng: &mut R,
) -> Result<Vec<Question>, QuizError> {
    let mut groups: BTreeMap<String, Vec<(u32, String, String)>> = BTreeMap::new();
    for section in catalog.sections()? {
        for test in catalog.tests(&section)? {
            if let Some((subject, topic)) = derive_subject_topic(&test) {
                groups.entry(subject).or_default().push((topic, section.clone(), test));
            }
        }
    }

    let mut pool = Vec::new();
    for files in groups.values_mut() {
        files.sort();
        let mid = files.len() / 2;
        let chosen = match half {
            CurriculumHalf::First => &files[..mid],
            CurriculumHalf::Second => &files[mid..],
        };
        for (_, section, test) in chosen {
            collect_test(catalog, section, test, &mut pool);
        }
    }

    if pool.is_empty() {
        return Err(QuizError::EmptyPool);
    }

    let drawn = sample(pool, HALF_EXAM_SIZE, rng);
    warn_unscorable(&drawn, "curriculum-half exam");
    Ok(drawn)
}

/// Uniform sample without replacement of `min(size, pool)` questions
pub fn sample<R: Rng + ?Sized>(mut pool: Vec<Question>, size: usize, rng: &mut R) -> Vec<Question> {
    pool.shuffle(rng);
    pool.truncate(size);
    pool
}

/// Every usable question in every section, tagged with its provenance
fn gather_pool(catalog: &Catalog) -> Result<Vec<Question>, QuizError> {
    let mut pool = Vec::new();
    for section in catalog.sections()? {
        for test in catalog.tests(&section)? {
            collect_test(catalog, &section, &test, &mut pool);
        }
    }
    Ok(pool)
}

/// Parse one test into the pool; a bad file is skipped, not fatal
fn collect_test(catalog: &Catalog, section: &str, test: &str, pool: &mut Vec<Question>) {
    let path = catalog.test_path(section, test);
    match parser::parse_file(&path) {
        Ok(mut questions) => {
            retain_usable(&mut questions);
            tag(&mut questions, section, test);
            pool.extend(questions);
        }
        Err(e) => warn!("Skipping unreadable bank file {:?}: {}", path, e),
    }
}

/// Drop records the parser emitted without any option
fn retain_usable(questions: &mut Vec<Question>) {
    questions.retain(|q| !q.options.is_empty());
}

fn tag(questions: &mut [Question], section: &str, test: &str) {
    for q in questions {
        q.section = Some(section.to_string());
        q.test = Some(test.to_string());
    }
}

fn warn_unscorable(questions: &[Question], origin: &str) {
    let unscorable = questions.iter().filter(|q| !q.is_scorable()).count();
    if unscorable > 0 {
        warn!("{} question(s) in {} have no resolvable answer and cannot score", unscorable, origin);
    }
}
