use crate::models::{Question, QuizSet};

pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("quiz for {poi_id} has no questions")]
    Empty { poi_id: String },
    #[error("question {question} of quiz {poi_id} marks option {index} as correct, but only 4 options exist")]
    BadCorrectIndex {
        poi_id: String,
        question: usize,
        index: usize,
    },
    #[error("option {0} does not exist")]
    NoSuchOption(usize),
    #[error("the quiz is already finished")]
    Finished,
}

impl QuizSet {
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.questions.is_empty() {
            return Err(QuizError::Empty {
                poi_id: self.poi_id.clone(),
            });
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.correct_index >= OPTION_COUNT {
                return Err(QuizError::BadCorrectIndex {
                    poi_id: self.poi_id.clone(),
                    question: i,
                    index: q.correct_index,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_index: usize,
    pub finished: bool,
}

/// Walks a visitor through one quiz, one question at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizProgress {
    questions: Vec<Question>,
    current: usize,
    score: usize,
}

impl QuizProgress {
    pub fn new(set: &QuizSet) -> Self {
        Self {
            questions: set.questions.clone(),
            current: 0,
            score: 0,
        }
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// Zero-based index of the current question.
    pub fn position(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    pub fn answer(&mut self, option: usize) -> Result<AnswerOutcome, QuizError> {
        let question = self.current().ok_or(QuizError::Finished)?;
        if option >= OPTION_COUNT {
            return Err(QuizError::NoSuchOption(option));
        }
        let correct_index = question.correct_index;
        let correct = option == correct_index;
        if correct {
            self.score += 1;
        }
        self.current += 1;
        Ok(AnswerOutcome {
            correct,
            correct_index,
            finished: self.is_finished(),
        })
    }
}
