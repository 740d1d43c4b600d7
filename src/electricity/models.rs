use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::documents::electricity::MeterReadings;
use crate::documents::RawFields;
use crate::validators::{
    parse_date_field, validate_numeric_range, validate_required, ValidationErrors,
};

pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx"];

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ElectricityReading {
    pub id: i64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub previous_bpo: Option<String>,
    pub previous_dormitory: Option<String>,
    pub current_bpo: Option<String>,
    pub current_dormitory: Option<String>,
    /// Tracking workbook the readings were appended to.
    pub file_path: Option<String>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectricityForm {
    pub date: NaiveDate,
    pub readings: MeterReadings,
}

const READING_FIELDS: [(&str, &str); 4] = [
    ("previous_bpo", "Предыдущие показания БПО"),
    ("current_bpo", "Текущие показания БПО"),
    ("previous_dormitory", "Предыдущие показания общежития"),
    ("current_dormitory", "Текущие показания общежития"),
];

impl ElectricityForm {
    pub fn from_fields(fields: &RawFields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let date_raw = fields.text_or_empty("reading_date");
        validate_required(&date_raw, "reading_date", "Дата показаний", &mut errors);
        let date = parse_date_field(&date_raw, "reading_date", &mut errors);

        for (field, label) in READING_FIELDS {
            validate_numeric_range(
                &fields.text_or_empty(field),
                Some(0.0),
                None,
                field,
                label,
                &mut errors,
            );
        }

        match date {
            Some(date) if errors.is_empty() => Ok(Self {
                date,
                readings: MeterReadings {
                    previous_bpo: fields.text_or_empty("previous_bpo"),
                    current_bpo: fields.text_or_empty("current_bpo"),
                    previous_dormitory: fields.text_or_empty("previous_dormitory"),
                    current_dormitory: fields.text_or_empty("current_dormitory"),
                },
            }),
            _ => Err(errors),
        }
    }
}
