use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;

use crate::documents::Validator;
use crate::validators::{validate_required, ValidationError, ValidationErrors};

/// One vehicle line of a daily dispatch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyVehicle {
    #[schema(example = "Автобус")]
    pub vehicle_type: String,
    pub driver_id: i64,
    #[serde(default)]
    pub shifts_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct DailyRequest {
    pub id: i64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub shift_type: Option<String>,
    #[schema(value_type = Vec<DailyVehicle>)]
    pub vehicles_data: Json<Vec<DailyVehicle>>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDailyRequest {
    #[schema(value_type = String, format = "date")]
    pub request_date: NaiveDate,
    #[serde(default)]
    #[schema(example = "day")]
    pub shift_type: Option<String>,
    #[serde(default)]
    pub vehicles: Vec<DailyVehicle>,
}

impl CreateDailyRequest {
    pub fn shift_type(&self) -> Option<&str> {
        self.shift_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Vehicle lines with names trimmed.
    pub fn vehicles(&self) -> Vec<DailyVehicle> {
        self.vehicles
            .iter()
            .map(|v| DailyVehicle {
                vehicle_type: v.vehicle_type.trim().to_string(),
                ..v.clone()
            })
            .collect()
    }

    pub fn driver_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.vehicles.iter().map(|v| v.driver_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl Validator for CreateDailyRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (i, vehicle) in self.vehicles.iter().enumerate() {
            let prefix = format!("vehicles[{}]", i);
            validate_required(
                &vehicle.vehicle_type,
                &format!("{}.vehicle_type", prefix),
                "Тип техники",
                &mut errors,
            );
            if vehicle.driver_id <= 0 {
                errors.add(ValidationError::new(
                    format!("{}.driver_id", prefix),
                    "Не выбран водитель",
                ));
            }
            if vehicle.shifts_count < 0 {
                errors.add(ValidationError::new(
                    format!("{}.shifts_count", prefix),
                    "Количество смен не может быть отрицательным",
                ));
            }
        }
        errors.into_result()
    }
}
