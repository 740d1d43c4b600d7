//! Daily dispatch requests

use sqlx::types::Json;

use super::AppState;
use crate::daily_request::models::{CreateDailyRequest, DailyRequest};

impl AppState {
    pub async fn list_daily_requests(&self) -> Result<Vec<DailyRequest>, sqlx::Error> {
        sqlx::query_as::<_, DailyRequest>(
            "SELECT * FROM daily_requests ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert_daily_request(
        &self,
        request: &CreateDailyRequest,
    ) -> Result<DailyRequest, sqlx::Error> {
        sqlx::query_as::<_, DailyRequest>(
            r#"
            INSERT INTO daily_requests (date, shift_type, vehicles_data)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.request_date)
        .bind(request.shift_type())
        .bind(Json(request.vehicles()))
        .fetch_one(&self.pool)
        .await
    }

    /// Ids from `ids` with no employee behind them.
    pub async fn missing_employee_ids(&self, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
        let mut missing = Vec::new();
        for &id in ids {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)",
            )
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
            if !exists {
                missing.push(id);
            }
        }
        Ok(missing)
    }
}
