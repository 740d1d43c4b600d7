//! Acceptance act forms and filled acts

use sqlx::types::Json;

use super::AppState;
use crate::acceptance_act::models::{
    AcceptanceAct, AcceptanceActForm, CreateAcceptanceActRequest, SaveAcceptanceActFormRequest,
};

const ACT_SELECT: &str = r#"
    SELECT a.id, a.form_id, f.name AS form_name, f.act_type, a.filled_data, a.created_by, a.created_at
    FROM acceptance_acts a
    JOIN acceptance_act_forms f ON f.id = a.form_id
"#;

impl AppState {
    pub async fn list_acceptance_act_forms(&self) -> Result<Vec<AcceptanceActForm>, sqlx::Error> {
        sqlx::query_as::<_, AcceptanceActForm>("SELECT * FROM acceptance_act_forms ORDER BY name")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn insert_acceptance_act_form(
        &self,
        request: &SaveAcceptanceActFormRequest,
    ) -> Result<AcceptanceActForm, sqlx::Error> {
        sqlx::query_as::<_, AcceptanceActForm>(
            r#"
            INSERT INTO acceptance_act_forms (name, act_type, form_structure)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.name.trim())
        .bind(request.act_type())
        .bind(Json(request.structure()))
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_acceptance_acts(&self) -> Result<Vec<AcceptanceAct>, sqlx::Error> {
        sqlx::query_as::<_, AcceptanceAct>(&format!(
            "{} ORDER BY a.created_at DESC, a.id DESC",
            ACT_SELECT
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert_acceptance_act(
        &self,
        request: &CreateAcceptanceActRequest,
    ) -> Result<AcceptanceAct, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO acceptance_acts (form_id, filled_data, created_by) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(request.form_id)
        .bind(Json(request.data()))
        .bind(request.created_by.trim())
        .fetch_one(&self.pool)
        .await?;

        sqlx::query_as::<_, AcceptanceAct>(&format!("{} WHERE a.id = ?", ACT_SELECT))
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }
}
