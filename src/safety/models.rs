//! Safety briefing tests: questions with one or several correct answers,
//! taken by employees and scored one point per fully correct question.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::collections::BTreeSet;
use utoipa::ToSchema;

use crate::documents::Validator;
use crate::validators::{validate_required, ValidationError, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnswerOption {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Question {
    pub text: String,
    /// Several answers may be correct; all of them must be chosen.
    #[serde(default)]
    pub multiple: bool,
    pub answers: Vec<AnswerOption>,
}

impl Question {
    fn correct_indices(&self) -> BTreeSet<usize> {
        self.answers
            .iter()
            .enumerate()
            .filter(|(_, a)| a.correct)
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether `selected` (0-based answer indices) earns the point.
    pub fn is_answered_by(&self, selected: &[usize]) -> bool {
        if self.multiple {
            selected.iter().copied().collect::<BTreeSet<_>>() == self.correct_indices()
        } else {
            matches!(selected, [i] if self.answers.get(*i).is_some_and(|a| a.correct))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct SafetyTest {
    pub id: i64,
    pub name: String,
    #[schema(value_type = Vec<Question>)]
    pub questions: Json<Vec<Question>>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct SafetyTestSummary {
    pub id: i64,
    pub name: String,
    pub question_count: i64,
    pub results_count: i64,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
}

/// Test list with statistics over every result taken.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SafetyTestsOverview {
    pub tests: Vec<SafetyTestSummary>,
    pub total_results: i64,
    /// Mean score, one decimal
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSafetyTestRequest {
    pub name: String,
    pub questions: Vec<Question>,
}

impl Validator for CreateSafetyTestRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.name, "name", "Название теста", &mut errors);
        if self.questions.is_empty() {
            errors.add(ValidationError::new("questions", "Добавьте хотя бы один вопрос"));
        }
        for (i, question) in self.questions.iter().enumerate() {
            let field = format!("questions[{}]", i);
            validate_required(&question.text, &field, "Текст вопроса", &mut errors);
            if question.answers.iter().any(|a| a.text.trim().is_empty()) {
                errors.add(ValidationError::new(&field, "Пустой вариант ответа"));
            }
            let correct = question.correct_indices().len();
            if correct == 0 {
                errors.add(ValidationError::new(&field, "Не отмечен правильный ответ"));
            } else if !question.multiple && correct > 1 {
                errors.add(
                    ValidationError::new(&field, "Отмечено несколько правильных ответов")
                        .with_suggestion("Включите множественный выбор"),
                );
            }
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TakeTestRequest {
    pub employee_name: String,
    /// Chosen answer indices (0-based) per question, in question order.
    #[serde(default)]
    pub answers: Vec<Vec<usize>>,
}

impl TakeTestRequest {
    pub fn validate_against(&self, test: &SafetyTest) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.employee_name, "employee_name", "ФИО сотрудника", &mut errors);
        if self.answers.len() > test.questions.len() {
            errors.add(ValidationError::new(
                "answers",
                format!("В тесте {} вопросов", test.questions.len()),
            ));
        }
        errors.into_result()
    }
}

/// Score of a finished test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub score: i64,
    pub max_score: i64,
    pub passed: bool,
}

/// Share of correct answers needed to pass, in tenths.
pub const PASS_THRESHOLD_TENTHS: i64 = 7;

pub fn grade(questions: &[Question], answers: &[Vec<usize>]) -> Grade {
    let score = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| q.is_answered_by(answers.get(*i).map(Vec::as_slice).unwrap_or(&[])))
        .count() as i64;
    let max_score = questions.len() as i64;
    Grade {
        score,
        max_score,
        passed: score * 10 >= max_score * PASS_THRESHOLD_TENTHS,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct TestResult {
    pub id: i64,
    pub test_id: i64,
    pub employee_name: String,
    #[schema(value_type = Vec<Vec<usize>>)]
    pub answers: Json<Vec<Vec<usize>>>,
    pub score: i64,
    pub max_score: i64,
    pub passed: bool,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
}
