use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::documents::RawFields;
use crate::validators::{
    parse_date_field, parse_id_field, parse_time_field, validate_date_range, ValidationError,
    ValidationErrors, DEFAULT_RANGE_LABELS,
};

/// Work permit (наряд-допуск) for tyre fitting jobs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct WorkPermit {
    pub id: i64,
    #[schema(example = "ШМР-0001")]
    pub number: String,
    pub tire_type: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "08:00")]
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub supervisor_id: Option<i64>,
    pub responsible_id: Option<i64>,
    pub executor_id: Option<i64>,
    pub template_path: Option<String>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
}

/// `ШМР-0007` for sequence value 7.
pub fn work_permit_number(sequence: i64) -> String {
    format!("ШМР-{:04}", sequence)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NextWorkPermitNumber {
    #[schema(example = "ШМР-0001")]
    pub number: String,
}

/// Work permit form. The number is assigned on save.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkPermitForm {
    pub tire_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// `HH:MM`
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub supervisor_id: Option<i64>,
    pub responsible_id: Option<i64>,
    pub executor_id: Option<i64>,
}

impl WorkPermitForm {
    pub fn from_fields(fields: &RawFields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let text = |name: &str| fields.text_or_empty(name);

        let start_date = parse_date_field(&text("start_date"), "start_date", &mut errors);
        let end_date = parse_date_field(&text("end_date"), "end_date", &mut errors);
        validate_date_range(start_date, end_date, DEFAULT_RANGE_LABELS, "end_date", &mut errors);

        let start_time = parse_time_field(&text("start_time"), "start_time", &mut errors);
        let end_time = parse_time_field(&text("end_time"), "end_time", &mut errors);
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if start_date.is_some() && start_date == end_date && end <= start {
                errors.add(ValidationError::new(
                    "end_time",
                    "Время окончания должно быть позже времени начала",
                ));
            }
        }

        let supervisor_id = parse_id_field(&text("supervisor_id"), "supervisor_id", &mut errors);
        let responsible_id = parse_id_field(&text("responsible_id"), "responsible_id", &mut errors);
        let executor_id = parse_id_field(&text("executor_id"), "executor_id", &mut errors);

        errors.into_result()?;
        let tire_type = text("tire_type");
        Ok(Self {
            tire_type: (!tire_type.is_empty()).then_some(tire_type),
            start_date,
            end_date,
            start_time: start_time.map(|t| t.format("%H:%M").to_string()),
            end_time: end_time.map(|t| t.format("%H:%M").to_string()),
            supervisor_id,
            responsible_id,
            executor_id,
        })
    }
}
