//! Work permit database operations

use super::AppState;
use crate::work_permit::models::{work_permit_number, WorkPermit, WorkPermitForm};

impl AppState {
    /// Inserts a permit and numbers it from its own id, like TTNs.
    pub async fn insert_work_permit(
        &self,
        form: &WorkPermitForm,
        template_path: Option<&str>,
    ) -> Result<WorkPermit, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO work_permits (
                number, tire_type, start_date, end_date, start_time, end_time,
                supervisor_id, responsible_id, executor_id, template_path
            )
            VALUES ('', ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(form.tire_type.as_deref())
        .bind(form.start_date)
        .bind(form.end_date)
        .bind(form.start_time.as_deref())
        .bind(form.end_time.as_deref())
        .bind(form.supervisor_id)
        .bind(form.responsible_id)
        .bind(form.executor_id)
        .bind(template_path)
        .fetch_one(&mut *tx)
        .await?;

        let permit = sqlx::query_as::<_, WorkPermit>(
            "UPDATE work_permits SET number = ? WHERE id = ? RETURNING *",
        )
        .bind(work_permit_number(id))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(permit)
    }

    pub async fn list_work_permits(&self) -> Result<Vec<WorkPermit>, sqlx::Error> {
        sqlx::query_as::<_, WorkPermit>(
            "SELECT * FROM work_permits ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Number the next permit will most likely get; shown on the blank form.
    pub async fn next_work_permit_number(&self) -> Result<String, sqlx::Error> {
        let last = sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(id) FROM work_permits")
            .fetch_one(&self.pool)
            .await?;
        Ok(work_permit_number(last.unwrap_or(0) + 1))
    }
}
