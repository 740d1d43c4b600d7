//! Employee database operations

use super::AppState;
use crate::personnel::models::{Employee, EmployeeForm, EmployeeSearchResult};

const EMPLOYEE_SELECT: &str = r#"
    SELECT e.*,
           d.name AS department_name,
           p.name AS position_name,
           c.name AS city_name
    FROM employees e
    LEFT JOIN departments d ON d.id = e.department_id
    LEFT JOIN positions p ON p.id = e.position_id
    LEFT JOIN cities c ON c.id = e.city_id
"#;

pub const SEARCH_LIMIT: i64 = 10;

impl AppState {
    pub async fn list_employees(&self) -> Result<Vec<Employee>, sqlx::Error> {
        let sql = format!("{} ORDER BY e.last_name, e.first_name", EMPLOYEE_SELECT);
        sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_employee(&self, id: i64) -> Result<Option<Employee>, sqlx::Error> {
        let sql = format!("{} WHERE e.id = ?", EMPLOYEE_SELECT);
        sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert_employee(
        &self,
        form: &EmployeeForm,
        photo_path: Option<&str>,
    ) -> Result<Employee, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO employees (
                last_name, first_name, middle_name, gender, birth_date,
                department_id, position_id, passport_series, passport_number,
                phone, email, city_id, has_driver_license, license_categories,
                pass_number, pass_expiry, medical_exam_expiry, medical_exam_not_required,
                psychiatric_exam_expiry, psychiatric_exam_not_required,
                clothing_size, shoe_size, height, photo_path
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&form.last_name)
        .bind(&form.first_name)
        .bind(&form.middle_name)
        .bind(&form.gender)
        .bind(form.birth_date)
        .bind(form.department_id)
        .bind(form.position_id)
        .bind(&form.passport_series)
        .bind(&form.passport_number)
        .bind(&form.phone)
        .bind(&form.email)
        .bind(form.city_id)
        .bind(form.has_driver_license)
        .bind(&form.license_categories)
        .bind(&form.pass_number)
        .bind(form.pass_expiry)
        .bind(form.medical_exam_expiry)
        .bind(form.medical_exam_not_required)
        .bind(form.psychiatric_exam_expiry)
        .bind(form.psychiatric_exam_not_required)
        .bind(&form.clothing_size)
        .bind(&form.shoe_size)
        .bind(&form.height)
        .bind(photo_path)
        .fetch_one(&self.pool)
        .await?;

        self.get_employee(id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Rewrites every form field. `photo_path` replaces the stored photo only
    /// when given.
    pub async fn update_employee(
        &self,
        id: i64,
        form: &EmployeeForm,
        photo_path: Option<&str>,
    ) -> Result<Option<Employee>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE employees SET
                last_name = ?, first_name = ?, middle_name = ?, gender = ?, birth_date = ?,
                department_id = ?, position_id = ?, passport_series = ?, passport_number = ?,
                phone = ?, email = ?, city_id = ?, has_driver_license = ?, license_categories = ?,
                pass_number = ?, pass_expiry = ?, medical_exam_expiry = ?,
                medical_exam_not_required = ?, psychiatric_exam_expiry = ?,
                psychiatric_exam_not_required = ?, clothing_size = ?, shoe_size = ?, height = ?,
                photo_path = COALESCE(?, photo_path),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&form.last_name)
        .bind(&form.first_name)
        .bind(&form.middle_name)
        .bind(&form.gender)
        .bind(form.birth_date)
        .bind(form.department_id)
        .bind(form.position_id)
        .bind(&form.passport_series)
        .bind(&form.passport_number)
        .bind(&form.phone)
        .bind(&form.email)
        .bind(form.city_id)
        .bind(form.has_driver_license)
        .bind(&form.license_categories)
        .bind(&form.pass_number)
        .bind(form.pass_expiry)
        .bind(form.medical_exam_expiry)
        .bind(form.medical_exam_not_required)
        .bind(form.psychiatric_exam_expiry)
        .bind(form.psychiatric_exam_not_required)
        .bind(&form.clothing_size)
        .bind(&form.shoe_size)
        .bind(&form.height)
        .bind(photo_path)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_employee(id).await
    }

    /// Deletes the row and returns its photo path so the caller can remove
    /// the file. `None` when no such employee exists.
    pub async fn delete_employee(&self, id: i64) -> Result<Option<Option<String>>, sqlx::Error> {
        let photo: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM employees WHERE id = ? RETURNING photo_path")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(photo)
    }

    /// Case-insensitive match on last name, first name or pass number.
    /// SQLite folds case for ASCII only.
    pub async fn search_employees(
        &self,
        query: &str,
    ) -> Result<Vec<EmployeeSearchResult>, sqlx::Error> {
        let pattern = format!("%{}%", query.trim());
        sqlx::query_as::<_, EmployeeSearchResult>(
            r#"
            SELECT id,
                   TRIM(last_name || ' ' || first_name || ' ' || COALESCE(middle_name, '')) AS text,
                   pass_number,
                   license_categories
            FROM employees
            WHERE last_name LIKE ?1 OR first_name LIKE ?1 OR pass_number LIKE ?1
            ORDER BY last_name, first_name
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await
    }

    /// Full names in the order of `ids`; unknown ids are skipped.
    pub async fn employee_full_names(&self, ids: &[i64]) -> Result<Vec<String>, sqlx::Error> {
        let mut names = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(employee) = self.get_employee(*id).await? {
                names.push(employee.full_name());
            }
        }
        Ok(names)
    }
}
