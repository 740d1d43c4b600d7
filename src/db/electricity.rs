//! Electricity readings database operations

use super::AppState;
use crate::electricity::models::{ElectricityForm, ElectricityReading};

/// Readings shown on the electricity page.
pub const RECENT_READINGS: i64 = 5;

fn blank_as_null(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

impl AppState {
    pub async fn insert_electricity_reading(
        &self,
        form: &ElectricityForm,
        file_path: Option<&str>,
    ) -> Result<ElectricityReading, sqlx::Error> {
        let readings = &form.readings;
        sqlx::query_as::<_, ElectricityReading>(
            r#"
            INSERT INTO electricity_readings (
                date, previous_bpo, previous_dormitory, current_bpo, current_dormitory, file_path
            )
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(form.date)
        .bind(blank_as_null(&readings.previous_bpo))
        .bind(blank_as_null(&readings.previous_dormitory))
        .bind(blank_as_null(&readings.current_bpo))
        .bind(blank_as_null(&readings.current_dormitory))
        .bind(file_path)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn recent_electricity_readings(
        &self,
    ) -> Result<Vec<ElectricityReading>, sqlx::Error> {
        sqlx::query_as::<_, ElectricityReading>(
            "SELECT * FROM electricity_readings ORDER BY date DESC, id DESC LIMIT ?",
        )
        .bind(RECENT_READINGS)
        .fetch_all(&self.pool)
        .await
    }
}
