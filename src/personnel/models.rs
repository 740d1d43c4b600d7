use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::documents::RawFields;
use crate::validators::{
    parse_date_field, parse_id_field, validate_email, validate_passport, validate_past_date,
    validate_phone, validate_required, ValidationErrors,
};

pub const PHOTO_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];
pub const PHOTO_MAX_MB: usize = 5;

/// Employee card as stored, with dictionary names resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    #[schema(example = "Иванов")]
    pub last_name: String,
    #[schema(example = "Иван")]
    pub first_name: String,
    pub middle_name: Option<String>,
    pub gender: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub birth_date: Option<NaiveDate>,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
    pub position_id: Option<i64>,
    pub position_name: Option<String>,
    pub passport_series: Option<String>,
    pub passport_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city_id: Option<i64>,
    pub city_name: Option<String>,
    pub has_driver_license: bool,
    /// Comma-separated, e.g. `B,C`.
    pub license_categories: Option<String>,
    pub pass_number: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub pass_expiry: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub medical_exam_expiry: Option<NaiveDate>,
    pub medical_exam_not_required: bool,
    #[schema(value_type = Option<String>, format = "date")]
    pub psychiatric_exam_expiry: Option<NaiveDate>,
    pub psychiatric_exam_not_required: bool,
    pub clothing_size: Option<String>,
    pub shoe_size: Option<String>,
    pub height: Option<String>,
    /// Storage-relative path, served under `/storage/`.
    pub photo_path: Option<String>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

impl Employee {
    /// "Last First Middle", as printed on pass requests.
    pub fn full_name(&self) -> String {
        full_name(&self.last_name, &self.first_name, self.middle_name.as_deref())
    }
}

pub fn full_name(last: &str, first: &str, middle: Option<&str>) -> String {
    [Some(last), Some(first), middle]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Employee fields submitted through the multipart add/edit form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmployeeForm {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub department_id: Option<i64>,
    pub position_id: Option<i64>,
    pub passport_series: Option<String>,
    pub passport_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city_id: Option<i64>,
    pub has_driver_license: bool,
    pub license_categories: Option<String>,
    pub pass_number: Option<String>,
    pub pass_expiry: Option<NaiveDate>,
    pub medical_exam_expiry: Option<NaiveDate>,
    pub medical_exam_not_required: bool,
    pub psychiatric_exam_expiry: Option<NaiveDate>,
    pub psychiatric_exam_not_required: bool,
    pub clothing_size: Option<String>,
    pub shoe_size: Option<String>,
    pub height: Option<String>,
}

impl EmployeeForm {
    pub fn from_fields(fields: &RawFields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let text = |name: &str| -> Option<String> {
            let value = fields.text_or_empty(name);
            (!value.is_empty()).then_some(value)
        };

        let last_name = fields.text_or_empty("last_name");
        let first_name = fields.text_or_empty("first_name");
        validate_required(&last_name, "last_name", "Фамилия", &mut errors);
        validate_required(&first_name, "first_name", "Имя", &mut errors);

        let email = text("email");
        let phone = text("phone");
        validate_email(email.as_deref().unwrap_or_default(), "email", &mut errors);
        validate_phone(phone.as_deref().unwrap_or_default(), "phone", &mut errors);

        let passport_series = text("passport_series");
        let passport_number = text("passport_number");
        validate_passport(
            passport_series.as_deref().unwrap_or_default(),
            passport_number.as_deref().unwrap_or_default(),
            &mut errors,
        );

        let birth_date =
            parse_date_field(&fields.text_or_empty("birth_date"), "birth_date", &mut errors);
        validate_past_date(birth_date, "birth_date", "Дата рождения", &mut errors);

        let date = |name: &str, errors: &mut ValidationErrors| {
            parse_date_field(&fields.text_or_empty(name), name, errors)
        };
        let id = |name: &str, errors: &mut ValidationErrors| {
            parse_id_field(&fields.text_or_empty(name), name, errors)
        };

        let categories: Vec<String> = fields
            .list("license_categories")
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        let form = EmployeeForm {
            last_name,
            first_name,
            middle_name: text("middle_name"),
            gender: text("gender"),
            birth_date,
            department_id: id("department_id", &mut errors),
            position_id: id("position_id", &mut errors),
            passport_series,
            passport_number,
            phone,
            email,
            city_id: id("city_id", &mut errors),
            has_driver_license: fields.flag("has_driver_license"),
            license_categories: (!categories.is_empty()).then(|| categories.join(",")),
            pass_number: text("pass_number"),
            pass_expiry: date("pass_expiry", &mut errors),
            medical_exam_expiry: date("medical_exam_expiry", &mut errors),
            medical_exam_not_required: fields.flag("medical_exam_not_required"),
            psychiatric_exam_expiry: date("psychiatric_exam_expiry", &mut errors),
            psychiatric_exam_not_required: fields.flag("psychiatric_exam_not_required"),
            clothing_size: text("clothing_size"),
            shoe_size: text("shoe_size"),
            height: text("height"),
        };

        errors.into_result().map(|_| form)
    }
}

/// Entry of the autocomplete list used by request forms.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct EmployeeSearchResult {
    pub id: i64,
    /// "Last First Middle"
    pub text: String,
    pub pass_number: Option<String>,
    pub license_categories: Option<String>,
}


/// A personal document uploaded for an employee.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmployeeDocument {
    pub employee_id: i64,
    /// Storage-relative path, served under `/storage/`
    #[schema(example = "documents/employee_7_20250301_101500_passport.pdf")]
    pub path: String,
    pub filename: String,
    pub size: usize,
}
