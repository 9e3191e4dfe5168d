//! Exam session state machine
//!
//! A strict linear walk over a selected question sequence: one question is
//! presented at a time, at most one option letter is collected for it, and
//! advancing is final. There is no backward navigation; abandoning a session
//! (dropping it before completion) leaves no trace.

use crate::bank::model::{Letter, Question};
use crate::error::QuizError;

/// The reviewed outcome of one presented question
///
/// Created when the session advances past the question and immutable from
/// then on. Texts are resolved against the question's options at creation
/// time; a letter that is not a valid option key resolves to no text.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    /// Question text, for review display
    pub question: String,
    /// Chosen option letter, if any
    pub selected_letter: Option<Letter>,
    /// Text of the chosen option
    pub selected_text: Option<String>,
    /// Correct option letter, if the bank resolved one
    pub correct_letter: Option<Letter>,
    /// Text of the correct option
    pub correct_text: Option<String>,
}

impl AnswerRecord {
    fn resolve(question: &Question, selection: Option<Letter>) -> Self {
        Self {
            question: question.question.clone(),
            selected_letter: selection,
            selected_text: selection.and_then(|l| question.options.get(&l).cloned()),
            correct_letter: question.answer,
            correct_text: question.answer.and_then(|l| question.options.get(&l).cloned()),
        }
    }

    /// Whether the selection matches the correct letter
    ///
    /// Requires both letters to be present; two absences never count as a
    /// match.
    pub fn is_correct(&self) -> bool {
        match (self.selected_letter, self.correct_letter) {
            (Some(selected), Some(correct)) => selected == correct,
            _ => false,
        }
    }
}

/// Final result of a completed session
#[derive(Debug, Clone, PartialEq)]
pub struct ExamOutcome {
    /// One record per presented question, in presentation order
    pub answers: Vec<AnswerRecord>,
    /// Count of correct answers
    pub score: u32,
    /// Count of presented questions
    pub total: u32,
}

impl ExamOutcome {
    /// Score as a percentage of the total, 0 when nothing was presented
    pub fn percentage(&self) -> f64 {
        if self.total == 0 { 0.0 } else { 100.0 * f64::from(self.score) / f64::from(self.total) }
    }
}

/// Collaborator that supplies the answer for each presented question
///
/// One blocking call per question; returning `None` leaves the question
/// unanswered. The engine holds no presentation state of its own.
pub trait AnswerPrompt {
    /// Choose an option for `question`, shown as number `index + 1` of
    /// `total`
    fn select(&mut self, question: &Question, index: usize, total: usize) -> Option<Letter>;
}

/// A sequential exam over a fixed question list
#[derive(Debug)]
pub struct ExamSession {
    questions: Vec<Question>,
    answers: Vec<AnswerRecord>,
    position: usize,
}

impl ExamSession {
    /// Start a session over the given questions
    ///
    /// An empty list is [`QuizError::EmptyPool`]; no partial session starts.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyPool);
        }
        Ok(Self { questions, answers: Vec::new(), position: 0 })
    }

    /// The question currently presented, or `None` once completed
    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.position)
    }

    /// Zero-based index of the current question
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of questions in the session
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Whether every question has been answered or skipped
    pub fn is_complete(&self) -> bool {
        self.position >= self.questions.len()
    }

    /// Records collected so far, in presentation order
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Record a selection (or a skip) for the current question and advance
    pub fn submit(&mut self, selection: Option<Letter>) -> Result<(), QuizError> {
        let Some(question) = self.questions.get(self.position) else {
            return Err(QuizError::SessionFinished);
        };

        let record = AnswerRecord::resolve(question, selection);
        self.answers.push(record);
        self.position += 1;
        Ok(())
    }

    /// Finalize a completed session, or `None` while questions remain
    pub fn into_outcome(self) -> Option<ExamOutcome> {
        if !self.is_complete() {
            return None;
        }
        Some(outcome_from(self.answers))
    }

    /// Drive the whole session, asking `prompt` once per question
    pub fn run(mut self, prompt: &mut dyn AnswerPrompt) -> ExamOutcome {
        let total = self.questions.len();

        while self.position < total {
            let question = &self.questions[self.position];
            let selection = prompt.select(question, self.position, total);
            let record = AnswerRecord::resolve(question, selection);
            self.answers.push(record);
            self.position += 1;
        }

        outcome_from(self.answers)
    }
}

fn outcome_from(answers: Vec<AnswerRecord>) -> ExamOutcome {
    let score = answers.iter().filter(|a| a.is_correct()).count() as u32;
    let total = answers.len() as u32;
    ExamOutcome { answers, score, total }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, answer: Option<Letter>) -> Question {
        let mut q = Question::new(text)
            .with_option(Letter::A, format!("{text} opción A"))
            .with_option(Letter::B, format!("{text} opción B"));
        q.answer = answer;
        q
    }

    struct Scripted(Vec<Option<Letter>>);

    impl AnswerPrompt for Scripted {
        fn select(&mut self, _q: &Question, index: usize, _total: usize) -> Option<Letter> {
            self.0[index]
        }
    }

    #[test]
    fn empty_question_list_is_rejected() {
        assert!(matches!(ExamSession::new(Vec::new()), Err(QuizError::EmptyPool)));
    }

    #[test]
    fn session_advances_one_question_at_a_time() {
        let qs = vec![question("¿Uno?", Some(Letter::A)), question("¿Dos?", Some(Letter::B))];
        let mut session = ExamSession::new(qs).unwrap();

        assert_eq!(session.current().unwrap().question, "¿Uno?");
        assert_eq!(session.position(), 0);
        assert!(!session.is_complete());

        session.submit(Some(Letter::A)).unwrap();
        assert_eq!(session.current().unwrap().question, "¿Dos?");

        session.submit(None).unwrap();
        assert!(session.is_complete());
        assert!(session.current().is_none());
    }

    #[test]
    fn submitting_past_completion_is_an_error() {
        let mut session = ExamSession::new(vec![question("¿Una?", None)]).unwrap();
        session.submit(None).unwrap();
        assert!(matches!(session.submit(Some(Letter::A)), Err(QuizError::SessionFinished)));
    }

    #[test]
    fn outcome_is_unavailable_until_complete() {
        let qs = vec![question("¿Uno?", Some(Letter::A)), question("¿Dos?", Some(Letter::B))];
        let mut session = ExamSession::new(qs.clone()).unwrap();
        session.submit(Some(Letter::A)).unwrap();
        assert!(session.into_outcome().is_none());

        let mut session = ExamSession::new(qs).unwrap();
        session.submit(Some(Letter::A)).unwrap();
        session.submit(Some(Letter::A)).unwrap();
        let outcome = session.into_outcome().unwrap();
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.total, 2);
    }

    #[test]
    fn records_resolve_selected_and_correct_texts() {
        let q = question("¿Textos?", Some(Letter::B));
        let mut session = ExamSession::new(vec![q]).unwrap();
        session.submit(Some(Letter::A)).unwrap();

        let record = &session.answers()[0];
        assert_eq!(record.selected_text.as_deref(), Some("¿Textos? opción A"));
        assert_eq!(record.correct_text.as_deref(), Some("¿Textos? opción B"));
        assert!(!record.is_correct());
    }

    #[test]
    fn unresolved_answer_never_scores() {
        // The bank never resolved an answer, so the correct text is absent
        // and even a skipped selection must not count as a match.
        let q = question("¿Sin clave?", None);
        let mut session = ExamSession::new(vec![q]).unwrap();
        session.submit(None).unwrap();

        let record = &session.answers()[0];
        assert_eq!(record.correct_letter, None);
        assert_eq!(record.correct_text, None);
        assert!(!record.is_correct());
    }

    #[test]
    fn selection_outside_the_options_has_no_text() {
        let q = question("¿Fuera?", Some(Letter::A));
        let mut session = ExamSession::new(vec![q]).unwrap();
        session.submit(Some(Letter::D)).unwrap();

        let record = &session.answers()[0];
        assert_eq!(record.selected_letter, Some(Letter::D));
        assert_eq!(record.selected_text, None);
    }

    #[test]
    fn scoring_requires_both_letters_present() {
        // (selected, correct): (A,A) (B,C) (none,D) (none,none) -> 1 point.
        let qs = vec![
            question("¿Uno?", Some(Letter::A)),
            question("¿Dos?", Some(Letter::C)),
            question("¿Tres?", Some(Letter::D)),
            question("¿Cuatro?", None),
        ];
        let session = ExamSession::new(qs).unwrap();
        let mut prompt = Scripted(vec![Some(Letter::A), Some(Letter::B), None, None]);
        let outcome = session.run(&mut prompt);

        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.total, 4);
        assert_eq!(outcome.answers.len(), 4);
        assert_eq!(outcome.percentage(), 25.0);
    }

    #[test]
    fn run_presents_questions_in_order() {
        struct Recording(Vec<String>);
        impl AnswerPrompt for Recording {
            fn select(&mut self, q: &Question, index: usize, total: usize) -> Option<Letter> {
                self.0.push(format!("{}/{} {}", index + 1, total, q.question));
                Some(Letter::A)
            }
        }

        let qs = vec![question("¿Uno?", Some(Letter::A)), question("¿Dos?", Some(Letter::A))];
        let mut prompt = Recording(Vec::new());
        let outcome = ExamSession::new(qs).unwrap().run(&mut prompt);

        assert_eq!(prompt.0, vec!["1/2 ¿Uno?", "2/2 ¿Dos?"]);
        assert_eq!(outcome.score, 2);
    }
}
