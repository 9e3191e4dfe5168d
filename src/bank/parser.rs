//! Bank file parsing
//!
//! Recovers question records from two source shapes: structured JSON banks
//! and semi-structured free-text documents (one paragraph per line). The
//! free-text classifier is a pure function of its input and never fails;
//! worst case it yields an empty list or records with an unresolved answer.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{Letter, Question};
use crate::error::QuizError;

/// An option line: letter, separator, whitespace, then the option text
static OPTION_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ABCD][.)-]\s+").unwrap());

/// Anything that merely starts like an option, text or not
static OPTION_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ABCD][.)-]").unwrap());

/// Inline answer marker: "respuesta", optional colon, optional whitespace
static ANSWER_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^respuesta:?\s*").unwrap());

/// Knobs for the free-text classifier
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Recover missing answers from option-prefixed lines (see
    /// [`parse_plain_text_with`])
    pub answer_key_fallback: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { answer_key_fallback: true }
    }
}

/// Parse a structured JSON bank: an array of question records
///
/// Each record must carry `question` and `options`; `answer` may be absent
/// or null. Anything else is a format error.
pub fn parse_structured(json: &str) -> Result<Vec<Question>, QuizError> {
    serde_json::from_str(json).map_err(|e| QuizError::Format(e.to_string()))
}

/// Parse a free-text document with the default options
pub fn parse_plain_text(text: &str) -> Vec<Question> {
    parse_plain_text_with(text, ParseOptions::default())
}

/// Parse a free-text document into question records
///
/// Single pass over the non-empty lines, first matching rule wins:
/// 1. a line ending in `?` that is not option-prefixed closes the open
///    record and starts a new question;
/// 2. an option line (`A.`/`A)`/`A-` plus whitespace) stores its text under
///    that letter in the open record, last duplicate wins;
/// 3. a "respuesta" line records the first option letter found after the
///    keyword as the open record's answer;
/// 4. anything else is ignored.
///
/// When any record still lacks an answer afterwards, and the fallback is
/// enabled, the answer key is recovered positionally: the first character of
/// the i-th option-prefixed line anywhere in the document becomes the i-th
/// record's answer, overwriting every record, provided there are at least as
/// many such lines as records. The recovered key is the option lines' own
/// letters, so a trailing key that does not literally repeat option-lettered
/// lines in document order will be mis-read.
pub fn parse_plain_text_with(text: &str, options: ParseOptions) -> Vec<Question> {
    let mut records: Vec<Question> = Vec::new();
    let mut current: Option<Question> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.len() > 1 && line.ends_with('?') && !OPTION_PREFIX_RE.is_match(line) {
            if let Some(done) = current.take() {
                records.push(done);
            }
            current = Some(Question::new(line));
            continue;
        }

        let Some(open) = current.as_mut() else {
            continue;
        };

        if let Some(m) = OPTION_LINE_RE.find(line) {
            if let Some(letter) = line.chars().next().and_then(Letter::from_char) {
                open.options.insert(letter, line[m.end()..].to_string());
            }
            continue;
        }

        if let Some(m) = ANSWER_LINE_RE.find(line) {
            if let Some(letter) = line[m.end()..].chars().find_map(Letter::from_char) {
                open.answer = Some(letter);
            }
            continue;
        }
    }

    if let Some(done) = current.take() {
        records.push(done);
    }

    if options.answer_key_fallback && records.iter().any(|q| q.answer.is_none()) {
        apply_answer_key_fallback(text, &mut records);
    }

    records
}

/// Positional answer-key recovery over the whole document
fn apply_answer_key_fallback(text: &str, records: &mut [Question]) {
    let keys: Vec<Letter> = text
        .lines()
        .map(str::trim)
        .filter(|line| OPTION_PREFIX_RE.is_match(line))
        .filter_map(|line| line.chars().next().and_then(Letter::from_char))
        .collect();

    if keys.len() >= records.len() {
        for (record, key) in records.iter_mut().zip(keys) {
            record.answer = Some(key);
        }
    }
}

/// Parse one bank file, dispatching on its extension
///
/// `.json` files are structured banks; anything else is read as UTF-8 free
/// text.
pub fn parse_file(path: &Path) -> Result<Vec<Question>, QuizError> {
    let contents = fs::read_to_string(path)?;

    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        parse_structured(&contents)
    } else {
        Ok(parse_plain_text(&contents))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const BANK: &str = "\
¿Qué norma tiene rango superior?
A. El reglamento
B) La ley orgánica
C- La orden ministerial
D. La circular
Respuesta: B

¿Cuántos títulos tiene la Constitución?
A. Diez
B. Once
C. Doce
Respuesta: A
";

    #[test]
    fn parses_questions_options_and_answers() {
        let records = parse_plain_text(BANK);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].question, "¿Qué norma tiene rango superior?");
        assert_eq!(records[0].options.len(), 4);
        assert_eq!(records[0].option_text(Letter::B), Some("La ley orgánica"));
        assert_eq!(records[0].answer, Some(Letter::B));
        assert_eq!(records[1].answer, Some(Letter::A));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let records = parse_plain_text("\n\n¿Sola?\n\nA. Sí\n\nRespuesta: A\n\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].options.len(), 1);
    }

    #[test]
    fn option_line_ending_in_question_mark_is_an_option() {
        let text = "¿Primera pregunta?\nA. Is this correct?\nB. No\nRespuesta: A\n";
        let records = parse_plain_text(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].option_text(Letter::A), Some("Is this correct?"));
    }

    #[test]
    fn duplicate_option_letter_last_wins() {
        let text = "¿Repite?\nA. Primera\nA. Segunda\nRespuesta: A\n";
        let records = parse_plain_text(text);
        assert_eq!(records[0].option_text(Letter::A), Some("Segunda"));
    }

    #[test]
    fn answer_marker_is_case_insensitive_and_skips_its_own_letters() {
        let text = "¿Mayúsculas?\nA. Sí\nB. No\nRESPUESTA: b\n";
        let records = parse_plain_text(text);
        assert_eq!(records[0].answer, Some(Letter::B));
    }

    #[test]
    fn unmatched_lines_are_ignored() {
        let text = "Página 3 de 10\n¿Pregunta?\nA. Sí\nNota al pie\nRespuesta: A\n";
        let records = parse_plain_text(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].options.len(), 1);
    }

    #[test]
    fn lines_before_the_first_question_are_ignored() {
        let text = "A. Huérfana\nRespuesta: C\n¿Ahora sí?\nA. Vale\nRespuesta: A\n";
        let records = parse_plain_text(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].answer, Some(Letter::A));
    }

    #[test]
    fn open_record_is_closed_at_end_of_input() {
        let records = parse_plain_text("¿Última?\nA. Sí\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].answer, None);
    }

    #[test]
    fn fallback_fires_when_enough_option_lines_exist() {
        // Three questions, no inline answers, exactly three option lines.
        let text = "\
¿Uno?
A. a1
¿Dos?
B. b1
¿Tres?
C. c1
";
        let records = parse_plain_text(text);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].answer, Some(Letter::A));
        assert_eq!(records[1].answer, Some(Letter::B));
        assert_eq!(records[2].answer, Some(Letter::C));
    }

    #[test]
    fn fallback_does_not_fire_below_the_threshold() {
        let text = "\
¿Uno?
A. a1
¿Dos?
B. b1
¿Tres?
";
        let records = parse_plain_text(text);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|q| q.answer.is_none()));
    }

    #[test]
    fn fallback_overwrites_resolved_answers_too() {
        // The second question has an inline answer, but the first does not,
        // so the positional key overwrites both.
        let text = "\
¿Uno?
A. a1
¿Dos?
B. b1
Respuesta: D
";
        let records = parse_plain_text(text);
        assert_eq!(records[0].answer, Some(Letter::A));
        assert_eq!(records[1].answer, Some(Letter::B));
    }

    #[test]
    fn fallback_can_be_disabled() {
        let text = "¿Uno?\nA. a1\n";
        let options = ParseOptions { answer_key_fallback: false };
        let records = parse_plain_text_with(text, options);
        assert_eq!(records[0].answer, None);
    }

    #[test]
    fn structured_round_trip_is_idempotent() {
        let json = r#"[
            {
                "question": "¿Qué artículo regula la reforma?",
                "options": { "A": "El 166", "B": "El 167", "C": "El 168", "D": "Todos" },
                "answer": "D"
            },
            {
                "question": "¿Sin respuesta conocida?",
                "options": { "A": "Sí" },
                "answer": null
            }
        ]"#;

        let records = parse_structured(json).unwrap();
        let serialized = serde_json::to_string(&records).unwrap();
        let reparsed = parse_structured(&serialized).unwrap();
        assert_eq!(reparsed, records);
    }

    #[test]
    fn structured_bank_tolerates_missing_answer_field() {
        let json = r#"[{ "question": "¿Sin clave?", "options": { "A": "Sí" } }]"#;
        let records = parse_structured(json).unwrap();
        assert_eq!(records[0].answer, None);
    }

    #[test]
    fn structured_bank_missing_options_is_a_format_error() {
        let json = r#"[{ "question": "¿Sin opciones?" }]"#;
        let err = parse_structured(json).unwrap_err();
        assert!(matches!(err, QuizError::Format(_)));
    }

    #[test]
    fn structured_bank_rejects_unknown_letters() {
        let json = r#"[{ "question": "¿?", "options": { "E": "No existe" } }]"#;
        assert!(parse_structured(json).is_err());
    }

    #[test]
    fn parse_file_dispatches_on_extension() {
        let dir = tempfile::TempDir::new().unwrap();

        let json_path = dir.path().join("tema1.json");
        std::fs::write(&json_path, r#"[{ "question": "¿J?", "options": { "A": "Sí" } }]"#)
            .unwrap();
        assert_eq!(parse_file(&json_path).unwrap().len(), 1);

        let txt_path = dir.path().join("tema1.txt");
        std::fs::write(&txt_path, "¿T?\nA. Sí\nRespuesta: A\n").unwrap();
        let records = parse_file(&txt_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].answer, Some(Letter::A));
    }
}
