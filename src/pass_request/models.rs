use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;

use crate::documents::RawFields;
use crate::validators::{
    parse_date_field, parse_id_field, validate_date_range, validate_required, ValidationErrors,
    DEFAULT_RANGE_LABELS,
};

pub const STATUS_DRAFT: &str = "draft";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct PassRequest {
    pub id: i64,
    /// Free-form sub-kind chosen on the form, e.g. `auto` or `people`.
    #[schema(example = "auto")]
    pub request_type: String,
    #[schema(value_type = Vec<i64>)]
    pub post_ids: Json<Vec<i64>>,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub contract_id: Option<i64>,
    pub inn_id: Option<i64>,
    pub purpose: Option<String>,
    pub formed_by: String,
    pub agreement_person_id: Option<i64>,
    pub is_one_time: bool,
    #[schema(value_type = Vec<i64>)]
    pub employee_ids: Json<Vec<i64>>,
    #[schema(value_type = Vec<i64>)]
    pub vehicle_ids: Json<Vec<i64>>,
    pub status: String,
    pub template_path: Option<String>,
    pub generated_document_path: Option<String>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

/// A pass request with its referenced posts, employees and vehicles resolved
/// to display names.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PassRequestDetail {
    #[serde(flatten)]
    pub request: PassRequest,
    pub posts: Vec<String>,
    pub employees: Vec<String>,
    pub vehicles: Vec<String>,
}

/// Fields of the pass request form. `posts`, `employees` and `vehicles`
/// carry record ids.
#[derive(Debug, Clone, PartialEq)]
pub struct PassRequestForm {
    pub request_type: String,
    pub post_ids: Vec<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub contract_id: Option<i64>,
    pub inn_id: Option<i64>,
    pub purpose: Option<String>,
    pub formed_by: String,
    pub agreement_person_id: Option<i64>,
    pub is_one_time: bool,
    pub employee_ids: Vec<i64>,
    pub vehicle_ids: Vec<i64>,
}

impl PassRequestForm {
    pub fn from_fields(fields: &RawFields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let request_type = fields.text_or_empty("request_type");
        validate_required(&request_type, "request_type", "Тип заявки", &mut errors);
        let formed_by = fields.text_or_empty("formed_by");
        validate_required(&formed_by, "formed_by", "Сформировал", &mut errors);

        let start_raw = fields.text_or_empty("start_date");
        let end_raw = fields.text_or_empty("end_date");
        validate_required(&start_raw, "start_date", "Дата начала", &mut errors);
        validate_required(&end_raw, "end_date", "Дата окончания", &mut errors);
        let start = parse_date_field(&start_raw, "start_date", &mut errors);
        let end = parse_date_field(&end_raw, "end_date", &mut errors);
        validate_date_range(start, end, DEFAULT_RANGE_LABELS, "end_date", &mut errors);

        let post_ids = id_list(fields, "posts", &mut errors);
        let employee_ids = id_list(fields, "employees", &mut errors);
        let vehicle_ids = id_list(fields, "vehicles", &mut errors);
        let contract_id =
            parse_id_field(&fields.text_or_empty("contract_id"), "contract_id", &mut errors);
        let inn_id = parse_id_field(&fields.text_or_empty("inn_id"), "inn_id", &mut errors);
        let agreement_person_id = parse_id_field(
            &fields.text_or_empty("agreement_person_id"),
            "agreement_person_id",
            &mut errors,
        );
        let purpose = fields.text_or_empty("purpose");

        match (start, end) {
            (Some(start_date), Some(end_date)) if errors.is_empty() => Ok(Self {
                request_type,
                post_ids,
                start_date,
                end_date,
                contract_id,
                inn_id,
                purpose: (!purpose.is_empty()).then_some(purpose),
                formed_by,
                agreement_person_id,
                is_one_time: fields.flag("is_one_time"),
                employee_ids,
                vehicle_ids,
            }),
            _ => Err(errors),
        }
    }
}

/// Non-empty values of a multi-select, each parsed as an id.
fn id_list(fields: &RawFields, name: &str, errors: &mut ValidationErrors) -> Vec<i64> {
    fields
        .list(name)
        .iter()
        .filter(|value| !value.trim().is_empty())
        .filter_map(|value| parse_id_field(value, name, errors))
        .collect()
}
