//! Vehicle database operations

use super::personnel::SEARCH_LIMIT;
use super::AppState;
use crate::fleet::models::{Vehicle, VehicleForm, VehicleSearchResult};

const VEHICLE_SELECT: &str = r#"
    SELECT v.*,
           t.name AS vehicle_type_name,
           d.name AS department_name,
           c.name AS vehicle_category_name
    FROM vehicles v
    LEFT JOIN vehicle_types t ON t.id = v.vehicle_type_id
    LEFT JOIN departments d ON d.id = v.department_id
    LEFT JOIN vehicle_categories c ON c.id = v.vehicle_category_id
"#;

impl AppState {
    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, sqlx::Error> {
        let sql = format!("{} ORDER BY v.brand, v.license_plate", VEHICLE_SELECT);
        sqlx::query_as::<_, Vehicle>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_vehicle(&self, id: i64) -> Result<Option<Vehicle>, sqlx::Error> {
        let sql = format!("{} WHERE v.id = ?", VEHICLE_SELECT);
        sqlx::query_as::<_, Vehicle>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn insert_vehicle(&self, form: &VehicleForm) -> Result<Vehicle, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO vehicles (
                vehicle_type_id, brand, license_plate, department_id, vehicle_category_id,
                manufacture_year, pass_number, pass_expiry, insurance_expiry, inspection_expiry
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(form.vehicle_type_id)
        .bind(&form.brand)
        .bind(&form.license_plate)
        .bind(form.department_id)
        .bind(form.vehicle_category_id)
        .bind(form.manufacture_year)
        .bind(&form.pass_number)
        .bind(form.pass_expiry)
        .bind(form.insurance_expiry)
        .bind(form.inspection_expiry)
        .fetch_one(&self.pool)
        .await?;

        self.get_vehicle(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update_vehicle(
        &self,
        id: i64,
        form: &VehicleForm,
    ) -> Result<Option<Vehicle>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE vehicles SET
                vehicle_type_id = ?, brand = ?, license_plate = ?, department_id = ?,
                vehicle_category_id = ?, manufacture_year = ?, pass_number = ?,
                pass_expiry = ?, insurance_expiry = ?, inspection_expiry = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(form.vehicle_type_id)
        .bind(&form.brand)
        .bind(&form.license_plate)
        .bind(form.department_id)
        .bind(form.vehicle_category_id)
        .bind(form.manufacture_year)
        .bind(&form.pass_number)
        .bind(form.pass_expiry)
        .bind(form.insurance_expiry)
        .bind(form.inspection_expiry)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_vehicle(id).await
    }

    pub async fn delete_vehicle(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Match on plate, brand or pass number, at most ten rows.
    pub async fn search_vehicles(
        &self,
        query: &str,
    ) -> Result<Vec<VehicleSearchResult>, sqlx::Error> {
        let pattern = format!("%{}%", query.trim());
        sqlx::query_as::<_, VehicleSearchResult>(
            r#"
            SELECT id,
                   brand || ' (' || license_plate || ')' AS text,
                   license_plate,
                   pass_number
            FROM vehicles
            WHERE license_plate LIKE ?1 OR brand LIKE ?1 OR pass_number LIKE ?1
            ORDER BY brand, license_plate
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await
    }

    /// License plates in the order of `ids`; unknown ids are skipped.
    pub async fn vehicle_plates(&self, ids: &[i64]) -> Result<Vec<String>, sqlx::Error> {
        let mut plates = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(plate) =
                sqlx::query_scalar::<_, String>("SELECT license_plate FROM vehicles WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            {
                plates.push(plate);
            }
        }
        Ok(plates)
    }
}
