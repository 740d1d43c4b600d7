//! Safety tests and their results

use sqlx::types::Json;

use super::AppState;
use crate::safety::models::{
    CreateSafetyTestRequest, Grade, SafetyTest, SafetyTestSummary, SafetyTestsOverview,
    TestResult,
};

impl AppState {
    pub async fn safety_tests_overview(&self) -> Result<SafetyTestsOverview, sqlx::Error> {
        let tests = sqlx::query_as::<_, SafetyTestSummary>(
            r#"
            SELECT t.id, t.name, json_array_length(t.questions) AS question_count,
                   COUNT(r.id) AS results_count, t.created_at
            FROM tests t
            LEFT JOIN test_results r ON r.test_id = t.id
            GROUP BY t.id
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let (total_results, average) = sqlx::query_as::<_, (i64, Option<f64>)>(
            "SELECT COUNT(*), AVG(score) FROM test_results",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(SafetyTestsOverview {
            tests,
            total_results,
            average_score: (average.unwrap_or(0.0) * 10.0).round() / 10.0,
        })
    }

    pub async fn get_safety_test(&self, id: i64) -> Result<Option<SafetyTest>, sqlx::Error> {
        sqlx::query_as::<_, SafetyTest>("SELECT * FROM tests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert_safety_test(
        &self,
        request: &CreateSafetyTestRequest,
    ) -> Result<SafetyTest, sqlx::Error> {
        sqlx::query_as::<_, SafetyTest>(
            "INSERT INTO tests (name, questions) VALUES (?, ?) RETURNING *",
        )
        .bind(request.name.trim())
        .bind(Json(request.questions.clone()))
        .fetch_one(&self.pool)
        .await
    }

    pub async fn insert_test_result(
        &self,
        test_id: i64,
        employee_name: &str,
        answers: &[Vec<usize>],
        grade: Grade,
    ) -> Result<TestResult, sqlx::Error> {
        sqlx::query_as::<_, TestResult>(
            r#"
            INSERT INTO test_results (test_id, employee_name, answers, score, max_score, passed)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(test_id)
        .bind(employee_name.trim())
        .bind(Json(answers.to_vec()))
        .bind(grade.score)
        .bind(grade.max_score)
        .bind(grade.passed)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_test_results(&self, test_id: i64) -> Result<Vec<TestResult>, sqlx::Error> {
        sqlx::query_as::<_, TestResult>(
            "SELECT * FROM test_results WHERE test_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await
    }
}
