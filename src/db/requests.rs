//! Pass request and shift request database operations

use sqlx::types::Json;

use super::AppState;
use crate::pass_request::models::{PassRequest, PassRequestForm, STATUS_DRAFT};
use crate::shift_request::models::{ShiftRequest, ShiftRequestForm};

impl AppState {
    pub async fn insert_pass_request(
        &self,
        form: &PassRequestForm,
        template_path: Option<&str>,
        generated_document_path: Option<&str>,
    ) -> Result<PassRequest, sqlx::Error> {
        sqlx::query_as::<_, PassRequest>(
            r#"
            INSERT INTO pass_requests (
                request_type, post_ids, start_date, end_date, contract_id, inn_id, purpose,
                formed_by, agreement_person_id, is_one_time, employee_ids, vehicle_ids,
                status, template_path, generated_document_path
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&form.request_type)
        .bind(Json(&form.post_ids))
        .bind(form.start_date)
        .bind(form.end_date)
        .bind(form.contract_id)
        .bind(form.inn_id)
        .bind(&form.purpose)
        .bind(&form.formed_by)
        .bind(form.agreement_person_id)
        .bind(form.is_one_time)
        .bind(Json(&form.employee_ids))
        .bind(Json(&form.vehicle_ids))
        .bind(STATUS_DRAFT)
        .bind(template_path)
        .bind(generated_document_path)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_pass_requests(&self) -> Result<Vec<PassRequest>, sqlx::Error> {
        sqlx::query_as::<_, PassRequest>(
            "SELECT * FROM pass_requests ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_pass_request(&self, id: i64) -> Result<Option<PassRequest>, sqlx::Error> {
        sqlx::query_as::<_, PassRequest>("SELECT * FROM pass_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert_shift_request(
        &self,
        form: &ShiftRequestForm,
        template_path: Option<&str>,
        generated_document_path: Option<&str>,
    ) -> Result<ShiftRequest, sqlx::Error> {
        sqlx::query_as::<_, ShiftRequest>(
            r#"
            INSERT INTO shift_requests (
                request_type, flight_date, departure_airport_id, arrival_airport_id,
                contract_id, flight_number, preliminary_cost, auto_delivery_from,
                auto_delivery_to, formed_by, employees, status, template_path,
                generated_document_path
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(form.kind.as_str())
        .bind(form.flight_date)
        .bind(form.departure_airport_id)
        .bind(form.arrival_airport_id)
        .bind(form.contract_id)
        .bind(&form.flight_number)
        .bind(&form.preliminary_cost)
        .bind(&form.auto_delivery_from)
        .bind(&form.auto_delivery_to)
        .bind(&form.formed_by)
        .bind(Json(&form.employee_ids))
        .bind(STATUS_DRAFT)
        .bind(template_path)
        .bind(generated_document_path)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_shift_requests(&self) -> Result<Vec<ShiftRequest>, sqlx::Error> {
        sqlx::query_as::<_, ShiftRequest>(
            "SELECT * FROM shift_requests ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
    }
}
