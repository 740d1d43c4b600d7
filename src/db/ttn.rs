//! Bill of lading (TTN) database operations

use super::AppState;
use crate::ttn::models::{ttn_number, Ttn, TtnForm, TTN_DETAIL_FIELDS};

/// Placeholder held only inside the insert transaction.
const PENDING_NUMBER: &str = "";

impl AppState {
    /// Inserts a TTN and numbers it from its own id in the same transaction.
    /// The insert takes the write lock first, so concurrent saves never share
    /// a number.
    pub async fn insert_ttn(
        &self,
        form: &TtnForm,
        template_path: Option<&str>,
    ) -> Result<Ttn, sqlx::Error> {
        let columns = TTN_DETAIL_FIELDS.join(", ");
        let placeholders = vec!["?"; TTN_DETAIL_FIELDS.len() + 2].join(", ");
        let sql = format!(
            "INSERT INTO ttns (date, number, {}, template_path) VALUES ({}) RETURNING id",
            columns, placeholders
        );

        let mut tx = self.pool.begin().await?;
        let mut query = sqlx::query_scalar::<_, i64>(&sql)
            .bind(form.date)
            .bind(PENDING_NUMBER);
        for value in &form.details {
            query = query.bind(value.as_deref());
        }
        let id = query.bind(template_path).fetch_one(&mut *tx).await?;

        let ttn = sqlx::query_as::<_, Ttn>("UPDATE ttns SET number = ? WHERE id = ? RETURNING *")
            .bind(ttn_number(id))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(ttn)
    }

    pub async fn set_ttn_generated_document(
        &self,
        id: i64,
        generated_document_path: &str,
    ) -> Result<Ttn, sqlx::Error> {
        sqlx::query_as::<_, Ttn>(
            "UPDATE ttns SET generated_document_path = ? WHERE id = ? RETURNING *",
        )
        .bind(generated_document_path)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_ttns(&self) -> Result<Vec<Ttn>, sqlx::Error> {
        sqlx::query_as::<_, Ttn>("SELECT * FROM ttns ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
    }
}
