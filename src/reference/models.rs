use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::documents::Validator;
use crate::validators::{
    non_empty, parse_date_field, validate_date_range, validate_email, validate_inn,
    validate_phone, validate_required, ValidationErrors, DEFAULT_RANGE_LABELS,
};

/// Checkpoint listed on pass requests.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    #[schema(example = "Пост №1 - Главный въезд")]
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub name: String,
    pub description: Option<String>,
}

impl Validator for CreatePostRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.name, "name", "Название поста", &mut errors);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Contract {
    pub id: i64,
    #[schema(example = "ДГ-001/2024")]
    pub number: String,
    pub name: Option<String>,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    pub customer: Option<String>,
    pub is_active: bool,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

/// Dates arrive as `YYYY-MM-DD` strings; `end_date` may be empty.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateContractRequest {
    pub number: String,
    pub name: Option<String>,
    #[schema(example = "2025-01-15")]
    pub start_date: String,
    pub end_date: Option<String>,
    pub customer: Option<String>,
}

/// A contract request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContract {
    pub number: String,
    pub name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub customer: Option<String>,
}

impl CreateContractRequest {
    pub fn parse(&self) -> Result<NewContract, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.number, "number", "Номер договора", &mut errors);
        validate_required(&self.start_date, "start_date", "Дата начала", &mut errors);
        let start = parse_date_field(&self.start_date, "start_date", &mut errors);
        let end = parse_date_field(
            self.end_date.as_deref().unwrap_or_default(),
            "end_date",
            &mut errors,
        );
        validate_date_range(start, end, DEFAULT_RANGE_LABELS, "end_date", &mut errors);

        match start {
            Some(start_date) if errors.is_empty() => Ok(NewContract {
                number: self.number.trim().to_string(),
                name: non_empty(&self.name),
                start_date,
                end_date: end,
                customer: non_empty(&self.customer),
            }),
            _ => Err(errors),
        }
    }
}

impl Validator for CreateContractRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.parse().map(|_| ())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct OrganizationInn {
    pub id: i64,
    #[schema(example = "1234567890")]
    pub inn: String,
    pub organization_name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateInnRequest {
    pub inn: String,
    pub organization_name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Validator for CreateInnRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.inn, "inn", "ИНН", &mut errors);
        validate_inn(&self.inn, "inn", &mut errors);
        validate_required(
            &self.organization_name,
            "organization_name",
            "Наименование организации",
            &mut errors,
        );
        validate_phone(self.phone.as_deref().unwrap_or_default(), "phone", &mut errors);
        validate_email(self.email.as_deref().unwrap_or_default(), "email", &mut errors);
        errors.into_result()
    }
}

/// Person who signs off pass requests.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct AgreementPerson {
    pub id: i64,
    #[schema(example = "Иванов Иван Иванович")]
    pub full_name: String,
    pub organization: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAgreementPersonRequest {
    pub full_name: String,
    pub organization: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Validator for CreateAgreementPersonRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.full_name, "full_name", "ФИО", &mut errors);
        validate_phone(self.phone.as_deref().unwrap_or_default(), "phone", &mut errors);
        validate_email(self.email.as_deref().unwrap_or_default(), "email", &mut errors);
        errors.into_result()
    }
}

