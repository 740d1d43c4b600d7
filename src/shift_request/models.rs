use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;

use crate::documents::adapters::ShiftKind;
use crate::documents::RawFields;
use crate::validators::{
    parse_date_field, parse_id_field, validate_numeric_range, ValidationError, ValidationErrors,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ShiftRequest {
    pub id: i64,
    /// `charter`, `regular` or `auto`.
    #[schema(example = "charter")]
    pub request_type: String,
    #[schema(value_type = Option<String>, format = "date")]
    pub flight_date: Option<NaiveDate>,
    pub departure_airport_id: Option<i64>,
    pub arrival_airport_id: Option<i64>,
    pub contract_id: Option<i64>,
    pub flight_number: Option<String>,
    pub preliminary_cost: Option<String>,
    pub auto_delivery_from: Option<String>,
    pub auto_delivery_to: Option<String>,
    pub formed_by: Option<String>,
    #[schema(value_type = Vec<i64>)]
    pub employees: Json<Vec<i64>>,
    pub status: String,
    pub template_path: Option<String>,
    pub generated_document_path: Option<String>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

/// Shift request form for one sub-kind. Every field is optional; the
/// auto delivery form names its date `request_date`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftRequestForm {
    pub kind: ShiftKind,
    pub flight_date: Option<NaiveDate>,
    pub departure_airport_id: Option<i64>,
    pub arrival_airport_id: Option<i64>,
    pub contract_id: Option<i64>,
    pub flight_number: Option<String>,
    pub preliminary_cost: Option<String>,
    pub auto_delivery_from: Option<String>,
    pub auto_delivery_to: Option<String>,
    pub formed_by: Option<String>,
    pub employee_ids: Vec<i64>,
}

fn optional_text(fields: &RawFields, name: &str) -> Option<String> {
    let value = fields.text_or_empty(name);
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ShiftRequestForm {
    pub fn from_fields(kind: ShiftKind, fields: &RawFields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let date_field = match kind {
            ShiftKind::AutoDelivery if !fields.text_or_empty("request_date").trim().is_empty() => {
                "request_date"
            }
            _ => "flight_date",
        };
        let flight_date =
            parse_date_field(&fields.text_or_empty(date_field), date_field, &mut errors);

        let departure_airport_id = parse_id_field(
            &fields.text_or_empty("departure_airport_id"),
            "departure_airport_id",
            &mut errors,
        );
        let arrival_airport_id = parse_id_field(
            &fields.text_or_empty("arrival_airport_id"),
            "arrival_airport_id",
            &mut errors,
        );
        if departure_airport_id.is_some() && departure_airport_id == arrival_airport_id {
            errors.add(
                ValidationError::new(
                    "arrival_airport_id",
                    "Аэропорт прилета совпадает с аэропортом вылета",
                )
                .with_suggestion("Выберите другой аэропорт"),
            );
        }
        let contract_id =
            parse_id_field(&fields.text_or_empty("contract_id"), "contract_id", &mut errors);

        let preliminary_cost = optional_text(fields, "preliminary_cost");
        if let Some(cost) = &preliminary_cost {
            validate_numeric_range(
                cost,
                Some(0.0),
                None,
                "preliminary_cost",
                "Предварительная стоимость",
                &mut errors,
            );
        }

        let employee_ids = fields
            .list("employees")
            .iter()
            .filter(|value| !value.trim().is_empty())
            .filter_map(|value| parse_id_field(value, "employees", &mut errors))
            .collect();

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            kind,
            flight_date,
            departure_airport_id,
            arrival_airport_id,
            contract_id,
            flight_number: optional_text(fields, "flight_number"),
            preliminary_cost,
            auto_delivery_from: optional_text(fields, "auto_delivery_from"),
            auto_delivery_to: optional_text(fields, "auto_delivery_to"),
            formed_by: optional_text(fields, "formed_by"),
            employee_ids,
        })
    }
}
