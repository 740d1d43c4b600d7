//! Rows read by the expiring-documents report

use super::AppState;
use crate::reports::models::{EmployeeExpiry, VehicleExpiry};

impl AppState {
    pub async fn employee_expiries(&self) -> Result<Vec<EmployeeExpiry>, sqlx::Error> {
        sqlx::query_as::<_, EmployeeExpiry>(
            r#"
            SELECT id, last_name, first_name, middle_name,
                   pass_expiry, medical_exam_expiry, medical_exam_not_required,
                   psychiatric_exam_expiry, psychiatric_exam_not_required
            FROM employees
            WHERE pass_expiry IS NOT NULL
               OR medical_exam_expiry IS NOT NULL
               OR psychiatric_exam_expiry IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn vehicle_expiries(&self) -> Result<Vec<VehicleExpiry>, sqlx::Error> {
        sqlx::query_as::<_, VehicleExpiry>(
            r#"
            SELECT id, brand, license_plate, pass_expiry, insurance_expiry, inspection_expiry
            FROM vehicles
            WHERE pass_expiry IS NOT NULL
               OR insurance_expiry IS NOT NULL
               OR inspection_expiry IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
