use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::documents::RawFields;
use crate::validators::{parse_date_field, validate_required, ValidationErrors};

/// Optional text columns, also the form field names the adapter reads.
pub const TTN_DETAIL_FIELDS: [&str; 13] = [
    "sender_organization",
    "receiver_organization",
    "places_count",
    "cargo_weight",
    "loading_address",
    "unloading_address",
    "loading_time",
    "sender_individual",
    "sender_legal",
    "carrier_individual",
    "vehicle_info",
    "waybill_number",
    "trailer_info",
];

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Ttn {
    pub id: i64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "ТТН-000001")]
    pub number: String,
    pub sender_organization: Option<String>,
    pub receiver_organization: Option<String>,
    pub places_count: Option<String>,
    pub cargo_weight: Option<String>,
    pub loading_address: Option<String>,
    pub unloading_address: Option<String>,
    pub loading_time: Option<String>,
    pub sender_individual: Option<String>,
    pub sender_legal: Option<String>,
    pub carrier_individual: Option<String>,
    pub vehicle_info: Option<String>,
    pub waybill_number: Option<String>,
    pub trailer_info: Option<String>,
    pub template_path: Option<String>,
    pub generated_document_path: Option<String>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
}

/// `ТТН-000042` for sequence value 42.
pub fn ttn_number(sequence: i64) -> String {
    format!("ТТН-{:06}", sequence)
}

/// Bill of lading form. The number is assigned on save.
#[derive(Debug, Clone, PartialEq)]
pub struct TtnForm {
    pub date: NaiveDate,
    /// Values of [`TTN_DETAIL_FIELDS`] in the same order, `None` when blank.
    pub details: Vec<Option<String>>,
    /// Cargo names as posted: repeated values or a JSON array.
    pub cargo_list: Vec<String>,
}

impl TtnForm {
    pub fn from_fields(fields: &RawFields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let date_raw = fields.text_or_empty("date");
        validate_required(&date_raw, "date", "Дата составления", &mut errors);
        let date = parse_date_field(&date_raw, "date", &mut errors);

        match date {
            Some(date) if errors.is_empty() => Ok(Self {
                date,
                details: TTN_DETAIL_FIELDS
                    .iter()
                    .map(|name| {
                        let value = fields.text_or_empty(name);
                        (!value.is_empty()).then_some(value)
                    })
                    .collect(),
                cargo_list: fields.list("cargo_list"),
            }),
            _ => Err(errors),
        }
    }

    pub fn detail(&self, name: &str) -> Option<&str> {
        TTN_DETAIL_FIELDS
            .iter()
            .position(|field| *field == name)
            .and_then(|i| self.details.get(i))
            .and_then(|value| value.as_deref())
    }

    /// Fields for the TTN adapter once the number is known.
    pub fn document_fields(&self, number: &str) -> RawFields {
        let mut fields = RawFields::new();
        fields.insert("date", self.date.format("%Y-%m-%d").to_string());
        fields.insert("number", number);
        for (name, value) in TTN_DETAIL_FIELDS.iter().zip(&self.details) {
            fields.insert(*name, value.clone().unwrap_or_default());
        }
        match self.cargo_list.as_slice() {
            [] => {}
            [single] => fields.insert("cargo_list", single.as_str()),
            many => fields.insert_list("cargo_list", many.to_vec()),
        }
        fields
    }
}
