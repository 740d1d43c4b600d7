//! Uniform types, issues and per-position norms

use chrono::NaiveDate;

use super::AppState;
use crate::uniform::models::{
    CreateNormRequest, CreateUniformTypeRequest, EmployeeUniform, NewIssue, NormUsage,
    PositionUniform, UniformType,
};

const ISSUE_SELECT: &str = r#"
    SELECT eu.id, eu.employee_id,
           TRIM(e.last_name || ' ' || e.first_name || COALESCE(' ' || e.middle_name, '')) AS employee_name,
           eu.uniform_type_id, ut.name AS uniform_type_name,
           eu.issue_date, eu.expiry_date, eu.quantity, eu.created_at
    FROM employee_uniforms eu
    JOIN employees e ON e.id = eu.employee_id
    JOIN uniform_types ut ON ut.id = eu.uniform_type_id
"#;

const NORM_SELECT: &str = r#"
    SELECT pu.id, pu.position_id, p.name AS position_name,
           pu.uniform_type_id, ut.name AS uniform_type_name, pu.quantity
    FROM position_uniforms pu
    JOIN positions p ON p.id = pu.position_id
    JOIN uniform_types ut ON ut.id = pu.uniform_type_id
"#;

impl AppState {
    pub async fn list_uniform_types(&self) -> Result<Vec<UniformType>, sqlx::Error> {
        sqlx::query_as::<_, UniformType>("SELECT * FROM uniform_types ORDER BY name")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_uniform_type(&self, id: i64) -> Result<Option<UniformType>, sqlx::Error> {
        sqlx::query_as::<_, UniformType>("SELECT * FROM uniform_types WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert_uniform_type(
        &self,
        request: &CreateUniformTypeRequest,
    ) -> Result<UniformType, sqlx::Error> {
        sqlx::query_as::<_, UniformType>(
            "INSERT INTO uniform_types (name, wear_period) VALUES (?, ?) RETURNING *",
        )
        .bind(request.name.trim())
        .bind(request.wear_period)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn insert_uniform_issue(
        &self,
        issue: &NewIssue,
        expiry_date: Option<NaiveDate>,
    ) -> Result<EmployeeUniform, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO employee_uniforms (employee_id, uniform_type_id, issue_date, expiry_date, quantity)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(issue.employee_id)
        .bind(issue.uniform_type_id)
        .bind(issue.issue_date)
        .bind(expiry_date)
        .bind(issue.quantity)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query_as::<_, EmployeeUniform>(&format!("{} WHERE eu.id = ?", ISSUE_SELECT))
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn list_uniform_issues(&self) -> Result<Vec<EmployeeUniform>, sqlx::Error> {
        sqlx::query_as::<_, EmployeeUniform>(&format!(
            "{} ORDER BY eu.issue_date DESC, eu.id DESC",
            ISSUE_SELECT
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_uniform_norms(&self) -> Result<Vec<PositionUniform>, sqlx::Error> {
        sqlx::query_as::<_, PositionUniform>(&format!(
            "{} ORDER BY p.name, ut.name",
            NORM_SELECT
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn insert_uniform_norm(
        &self,
        request: &CreateNormRequest,
    ) -> Result<PositionUniform, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO position_uniforms (position_id, uniform_type_id, quantity) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(request.position_id)
        .bind(request.uniform_type_id)
        .bind(request.quantity)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query_as::<_, PositionUniform>(&format!("{} WHERE pu.id = ?", NORM_SELECT))
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    /// Every norm with the position headcount and the quantity issued to
    /// that position and still valid on `today`.
    pub async fn uniform_norm_usage(&self, today: NaiveDate) -> Result<Vec<NormUsage>, sqlx::Error> {
        sqlx::query_as::<_, NormUsage>(
            r#"
            SELECT pu.position_id, p.name AS position_name,
                   pu.uniform_type_id, ut.name AS uniform_type_name, pu.quantity,
                   (SELECT COUNT(*) FROM employees e WHERE e.position_id = pu.position_id) AS employees,
                   (SELECT COALESCE(SUM(eu.quantity), 0)
                      FROM employee_uniforms eu
                      JOIN employees e ON e.id = eu.employee_id
                     WHERE e.position_id = pu.position_id
                       AND eu.uniform_type_id = pu.uniform_type_id
                       AND (eu.expiry_date IS NULL OR eu.expiry_date >= ?)) AS issued
            FROM position_uniforms pu
            JOIN positions p ON p.id = pu.position_id
            JOIN uniform_types ut ON ut.id = pu.uniform_type_id
            ORDER BY p.name, ut.name
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await
    }
}
