//! Lesson quiz and the lesson gate
//!
//! A quiz is answered one question at a time. Passing needs at least 70% of
//! the questions right, rounded up. Quiz and missions of a lesson stay locked
//! until the lesson itself is completed.

use gamegreeneco_core::{Error, LessonId, LessonProgress, Result};
use serde::{Deserialize, Serialize};

const PASS_RATIO: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

impl QuizQuestion {
    fn new(id: &str, question: &str, options: [&str; 4], correct_answer: usize) -> Self {
        Self {
            id: id.to_string(),
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self { questions }
    }

    /// Built-in climate quiz shared by every lesson
    pub fn eco_basics() -> Self {
        Self::new(vec![
            QuizQuestion::new(
                "1",
                "What is the main cause of climate change?",
                [
                    "Natural solar variations",
                    "Human activities and greenhouse gas emissions",
                    "Ocean currents",
                    "Volcanic eruptions",
                ],
                1,
            ),
            QuizQuestion::new(
                "2",
                "Which renewable energy source is most widely used globally?",
                ["Solar power", "Wind power", "Hydroelectric power", "Geothermal power"],
                2,
            ),
            QuizQuestion::new(
                "3",
                "What percentage of global greenhouse gas emissions come from agriculture?",
                ["10-15%", "20-25%", "30-35%", "40-45%"],
                1,
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Minimum correct answers to pass: `ceil(n * 0.7)`
    pub fn pass_mark(&self) -> usize {
        (self.questions.len() as f64 * PASS_RATIO).ceil() as usize
    }

    pub fn start(&self) -> QuizAttempt<'_> {
        QuizAttempt {
            quiz: self,
            current: 0,
            score: 0,
        }
    }
}

/// Result of answering one question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_answer: usize,
}

/// Final result of a finished attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub score: usize,
    pub total: usize,
    pub percent: u32,
    pub passed: bool,
}

/// One pass through a quiz
#[derive(Debug, Clone)]
pub struct QuizAttempt<'a> {
    quiz: &'a Quiz,
    current: usize,
    score: usize,
}

impl<'a> QuizAttempt<'a> {
    pub fn current_question(&self) -> Option<&'a QuizQuestion> {
        self.quiz.questions.get(self.current)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.quiz.len()
    }

    /// Answer the current question and move to the next.
    /// Returns `None` once every question has been answered.
    pub fn answer(&mut self, option: usize) -> Option<AnswerFeedback> {
        let question = self.current_question()?;
        let correct = option == question.correct_answer;
        if correct {
            self.score += 1;
        }
        self.current += 1;
        Some(AnswerFeedback {
            correct,
            correct_answer: question.correct_answer,
        })
    }

    /// Outcome once finished
    pub fn outcome(&self) -> Option<QuizOutcome> {
        if !self.is_finished() {
            return None;
        }
        let total = self.quiz.len();
        let percent = if total == 0 {
            0
        } else {
            ((self.score as f64 / total as f64) * 100.0).round() as u32
        };
        Some(QuizOutcome {
            score: self.score,
            total,
            percent,
            passed: self.score >= self.quiz.pass_mark(),
        })
    }
}

/// What a user may do with a lesson given their progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonGate {
    lesson_id: LessonId,
    completed: bool,
}

impl LessonGate {
    pub fn new(lesson_id: LessonId, progress: Option<&LessonProgress>) -> Self {
        Self {
            lesson_id,
            completed: progress.is_some_and(|p| p.is_completed),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.completed
    }

    pub fn check_quiz(&self) -> Result<()> {
        self.check()
    }

    pub fn check_missions(&self) -> Result<()> {
        self.check()
    }

    fn check(&self) -> Result<()> {
        if self.completed {
            Ok(())
        } else {
            Err(Error::QuizLocked(self.lesson_id.to_string()))
        }
    }
}
