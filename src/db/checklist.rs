//! Checklist forms and filled checklists

use sqlx::types::Json;

use super::AppState;
use crate::checklist::models::{
    Checklist, ChecklistForm, CreateChecklistRequest, SaveChecklistFormRequest,
};

const CHECKLIST_SELECT: &str = r#"
    SELECT c.id, c.form_id, f.name AS form_name, c.filled_data, c.created_by, c.created_at
    FROM checklists c
    JOIN checklist_forms f ON f.id = c.form_id
"#;

impl AppState {
    pub async fn list_checklist_forms(&self) -> Result<Vec<ChecklistForm>, sqlx::Error> {
        sqlx::query_as::<_, ChecklistForm>("SELECT * FROM checklist_forms ORDER BY name")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn insert_checklist_form(
        &self,
        request: &SaveChecklistFormRequest,
    ) -> Result<ChecklistForm, sqlx::Error> {
        sqlx::query_as::<_, ChecklistForm>(
            "INSERT INTO checklist_forms (name, form_structure) VALUES (?, ?) RETURNING *",
        )
        .bind(request.name.trim())
        .bind(Json(request.structure()))
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_checklist_form(
        &self,
        id: i64,
        request: &SaveChecklistFormRequest,
    ) -> Result<Option<ChecklistForm>, sqlx::Error> {
        sqlx::query_as::<_, ChecklistForm>(
            r#"
            UPDATE checklist_forms
            SET name = ?, form_structure = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(request.name.trim())
        .bind(Json(request.structure()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_checklists(&self) -> Result<Vec<Checklist>, sqlx::Error> {
        sqlx::query_as::<_, Checklist>(&format!(
            "{} ORDER BY c.created_at DESC, c.id DESC",
            CHECKLIST_SELECT
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert_checklist(
        &self,
        request: &CreateChecklistRequest,
    ) -> Result<Checklist, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO checklists (form_id, filled_data, created_by) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(request.form_id)
        .bind(Json(request.data()))
        .bind(request.created_by.trim())
        .fetch_one(&self.pool)
        .await?;

        sqlx::query_as::<_, Checklist>(&format!("{} WHERE c.id = ?", CHECKLIST_SELECT))
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }
}
