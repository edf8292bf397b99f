//! Quiz system: multiple-choice questions gating investigations.
//!
//! The bank is loaded once. If the source cannot be read or parsed a
//! single built-in question is substituted, so a load never fails.
//! A presented question is consumed by exactly one answer or skip.

use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question:    String,
    /// Option letter → option text, ordered by letter.
    pub options:     BTreeMap<String, String>,
    pub answer:      String,
    pub explanation: String,
    #[serde(default)]
    pub image:       Option<String>,
    #[serde(default)]
    pub problem_description: Option<String>,
}

impl Question {
    pub fn is_correct(&self, letter: &str) -> bool {
        letter.trim().eq_ignore_ascii_case(&self.answer)
    }
}

/// Where the bank came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankSource {
    Loaded,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
    source:    BankSource,
}

impl QuestionBank {
    /// Read a JSON array of questions from `path`.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content),
            Err(e) => {
                log::warn!("Failed to load questions from {path}: {e}; using fallback");
                Self::fallback()
            }
        }
    }

    pub fn from_json(content: &str) -> Self {
        match serde_json::from_str::<Vec<Question>>(content) {
            Ok(questions) => {
                log::info!("Loaded {} questions", questions.len());
                Self { questions, source: BankSource::Loaded }
            }
            Err(e) => {
                log::warn!("Failed to parse questions: {e}; using fallback");
                Self::fallback()
            }
        }
    }

    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self { questions, source: BankSource::Loaded }
    }

    /// The single built-in question.
    pub fn fallback() -> Self {
        let options = [
            ("A", "Amazon EC2"),
            ("B", "Amazon S3"),
            ("C", "Amazon RDS"),
            ("D", "Amazon Lambda"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            questions: vec![Question {
                question: "Which AWS service is best for storing static website content?".into(),
                options,
                answer: "B".into(),
                explanation: "Amazon S3 is ideal for hosting static websites with high \
                              availability and scalability."
                    .into(),
                image: Some("images/services16/Arch_Storage/48/Arch_Amazon-S3_48.png".into()),
                problem_description: None,
            }],
            source: BankSource::Fallback,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn source(&self) -> BankSource {
        self.source
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

/// The result of one presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizVerdict {
    pub correct:     bool,
    pub skipped:     bool,
    pub explanation: Option<String>,
}

pub struct QuizSystem {
    bank:    QuestionBank,
    current: Option<Question>,
    rng:     Box<dyn RandomSource>,
}

impl QuizSystem {
    pub fn new(bank: QuestionBank, rng: Box<dyn RandomSource>) -> Self {
        Self { bank, current: None, rng }
    }

    /// Uniform pick, with replacement. `None` only for an empty bank.
    pub fn random_question(&mut self) -> Option<&Question> {
        if self.bank.is_empty() {
            return None;
        }
        let idx = self.rng.pick_index(self.bank.len());
        self.bank.questions.get(idx)
    }

    /// Present a random question. Returns false when none is available
    /// or one is already awaiting an answer.
    pub fn show_question(&mut self) -> bool {
        if self.current.is_some() {
            return false;
        }
        let Some(question) = self.random_question().cloned() else {
            return false;
        };
        log::debug!("quiz: presenting \"{}\"", question.question);
        self.current = Some(question);
        true
    }

    pub fn current(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.current.is_some()
    }

    /// Answer the presented question. `None` if nothing is presented.
    pub fn answer(&mut self, letter: &str) -> Option<QuizVerdict> {
        let question = self.current.take()?;
        Some(QuizVerdict {
            correct: question.is_correct(letter),
            skipped: false,
            explanation: Some(question.explanation),
        })
    }

    /// Skip the presented question. `None` if nothing is presented.
    pub fn skip(&mut self) -> Option<QuizVerdict> {
        self.current.take()?;
        Some(QuizVerdict { correct: false, skipped: true, explanation: None })
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    const TWO_QUESTIONS: &str = r#"[
        {
            "question": "Which service runs code without servers?",
            "options": { "A": "EC2", "B": "Lambda" },
            "answer": "B",
            "explanation": "Lambda is serverless."
        },
        {
            "question": "Which service queues messages?",
            "options": { "A": "SQS", "B": "SNS" },
            "answer": "A",
            "explanation": "SQS is a queue.",
            "problem_description": "A worker pool needs buffering."
        }
    ]"#;

    fn quiz(bank: QuestionBank, roll: f64) -> QuizSystem {
        QuizSystem::new(bank, Box::new(ScriptedRng::constant(roll)))
    }

    #[test]
    fn parses_question_bank() {
        let bank = QuestionBank::from_json(TWO_QUESTIONS);
        assert_eq!(bank.source(), BankSource::Loaded);
        assert_eq!(bank.len(), 2);
        assert_eq!(
            bank.questions()[1].problem_description.as_deref(),
            Some("A worker pool needs buffering.")
        );
    }

    #[test]
    fn malformed_json_falls_back() {
        let bank = QuestionBank::from_json("{ not json");
        assert_eq!(bank.source(), BankSource::Fallback);
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.questions()[0].answer, "B");
    }

    #[test]
    fn missing_file_falls_back() {
        let bank = QuestionBank::load("/no/such/questions.json");
        assert_eq!(bank.source(), BankSource::Fallback);
        assert!(!bank.is_empty());
    }

    #[test]
    fn empty_bank_presents_nothing() {
        let mut quiz = quiz(QuestionBank::from_questions(vec![]), 0.0);
        assert!(quiz.random_question().is_none());
        assert!(!quiz.show_question());
        assert!(quiz.answer("A").is_none());
    }

    #[test]
    fn one_verdict_per_presentation() {
        let mut quiz = quiz(QuestionBank::from_json(TWO_QUESTIONS), 0.9);
        assert!(quiz.show_question());
        assert!(!quiz.show_question(), "second presentation waits for the first");

        let verdict = quiz.answer("a").unwrap();
        assert!(verdict.correct);
        assert!(!verdict.skipped);
        assert!(quiz.answer("a").is_none());
        assert!(quiz.skip().is_none());
    }

    #[test]
    fn skip_reports_incorrect_and_skipped() {
        let mut quiz = quiz(QuestionBank::fallback(), 0.0);
        assert!(quiz.show_question());
        let verdict = quiz.skip().unwrap();
        assert_eq!(verdict, QuizVerdict { correct: false, skipped: true, explanation: None });
    }

    #[test]
    fn wrong_letter_is_incorrect() {
        let mut quiz = quiz(QuestionBank::fallback(), 0.0);
        quiz.show_question();
        let verdict = quiz.answer("C").unwrap();
        assert!(!verdict.correct);
        assert!(verdict.explanation.unwrap().contains("static websites"));
    }
}
