use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validators::{
    non_empty, parse_date_field, validate_license_plate, validate_numeric_range,
    validate_required, ValidationErrors,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub vehicle_type_id: Option<i64>,
    pub vehicle_type_name: Option<String>,
    #[schema(example = "КАМАЗ 65115")]
    pub brand: String,
    #[schema(example = "А123ВС77")]
    pub license_plate: String,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
    pub vehicle_category_id: Option<i64>,
    pub vehicle_category_name: Option<String>,
    pub manufacture_year: Option<i64>,
    pub pass_number: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub pass_expiry: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub insurance_expiry: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub inspection_expiry: Option<NaiveDate>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateVehicleRequest {
    pub vehicle_type_id: Option<i64>,
    pub brand: String,
    pub license_plate: String,
    pub department_id: Option<i64>,
    pub vehicle_category_id: Option<i64>,
    pub manufacture_year: Option<i64>,
    pub pass_number: Option<String>,
    #[schema(example = "2025-12-31")]
    pub pass_expiry: Option<String>,
    pub insurance_expiry: Option<String>,
    pub inspection_expiry: Option<String>,
}

/// A vehicle request that passed validation. Plates are stored upper-cased.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleForm {
    pub vehicle_type_id: Option<i64>,
    pub brand: String,
    pub license_plate: String,
    pub department_id: Option<i64>,
    pub vehicle_category_id: Option<i64>,
    pub manufacture_year: Option<i64>,
    pub pass_number: Option<String>,
    pub pass_expiry: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
    pub inspection_expiry: Option<NaiveDate>,
}

impl CreateVehicleRequest {
    pub fn parse(&self) -> Result<VehicleForm, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.brand, "brand", "Марка", &mut errors);
        validate_required(&self.license_plate, "license_plate", "Госномер", &mut errors);
        validate_license_plate(&self.license_plate, "license_plate", &mut errors);

        if let Some(year) = self.manufacture_year {
            let max = f64::from(Local::now().year() + 1);
            validate_numeric_range(
                &year.to_string(),
                Some(1900.0),
                Some(max),
                "manufacture_year",
                "Год выпуска",
                &mut errors,
            );
        }

        let date = |value: &Option<String>, field: &str, errors: &mut ValidationErrors| {
            parse_date_field(value.as_deref().unwrap_or_default(), field, errors)
        };
        let pass_expiry = date(&self.pass_expiry, "pass_expiry", &mut errors);
        let insurance_expiry = date(&self.insurance_expiry, "insurance_expiry", &mut errors);
        let inspection_expiry = date(&self.inspection_expiry, "inspection_expiry", &mut errors);

        errors.into_result()?;
        Ok(VehicleForm {
            vehicle_type_id: self.vehicle_type_id,
            brand: self.brand.trim().to_string(),
            license_plate: self.license_plate.trim().to_uppercase(),
            department_id: self.department_id,
            vehicle_category_id: self.vehicle_category_id,
            manufacture_year: self.manufacture_year,
            pass_number: non_empty(&self.pass_number),
            pass_expiry,
            insurance_expiry,
            inspection_expiry,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct VehicleSearchResult {
    pub id: i64,
    /// "Brand (PLATE)"
    pub text: String,
    pub license_plate: String,
    pub pass_number: Option<String>,
}
