use chrono::{Days, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::documents::Validator;
use crate::validators::{
    parse_date_field, validate_required, ValidationError, ValidationErrors,
};

/// Window used by the accounting overview for "expiring soon".
pub const EXPIRING_WINDOW_DAYS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct UniformType {
    pub id: i64,
    pub name: String,
    /// Wear period in months, `None` when the item never expires.
    pub wear_period: Option<i64>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUniformTypeRequest {
    pub name: String,
    pub wear_period: Option<i64>,
}

impl Validator for CreateUniformTypeRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.name, "name", "Наименование", &mut errors);
        if matches!(self.wear_period, Some(months) if months <= 0) {
            errors.add(ValidationError::new(
                "wear_period",
                "Срок носки должен быть положительным числом месяцев",
            ));
        }
        errors.into_result()
    }
}

/// An issue of uniform items to an employee, with display names.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct EmployeeUniform {
    pub id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub uniform_type_id: i64,
    pub uniform_type_name: String,
    #[schema(value_type = String, format = "date")]
    pub issue_date: NaiveDate,
    #[schema(value_type = Option<String>, format = "date")]
    pub expiry_date: Option<NaiveDate>,
    pub quantity: i64,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueUniformRequest {
    pub employee_id: i64,
    pub uniform_type_id: i64,
    #[schema(example = "2025-03-01")]
    pub issue_date: String,
    #[serde(default)]
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub employee_id: i64,
    pub uniform_type_id: i64,
    pub issue_date: NaiveDate,
    pub quantity: i64,
}

impl IssueUniformRequest {
    pub fn parse(&self) -> Result<NewIssue, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.issue_date, "issue_date", "Дата выдачи", &mut errors);
        let issue_date = parse_date_field(&self.issue_date, "issue_date", &mut errors);
        let quantity = self.quantity.unwrap_or(1);
        if quantity < 1 {
            errors.add(ValidationError::new("quantity", "Количество должно быть не меньше 1"));
        }
        match issue_date {
            Some(issue_date) if errors.is_empty() => Ok(NewIssue {
                employee_id: self.employee_id,
                uniform_type_id: self.uniform_type_id,
                issue_date,
                quantity,
            }),
            _ => Err(errors),
        }
    }
}

/// Issue date plus the wear period; month ends clamp (31 Jan + 1 = 28/29 Feb).
pub fn expiry_date(issue_date: NaiveDate, wear_period: Option<i64>) -> Option<NaiveDate> {
    let months = u32::try_from(wear_period?).ok().filter(|m| *m > 0)?;
    issue_date.checked_add_months(Months::new(months))
}

/// Whether an issue expires within `window_days` of `today` (inclusive).
pub fn expires_within(expiry: Option<NaiveDate>, today: NaiveDate, window_days: u64) -> bool {
    match (expiry, today.checked_add_days(Days::new(window_days))) {
        (Some(expiry), Some(limit)) => expiry >= today && expiry <= limit,
        _ => false,
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UniformAccounting {
    /// Number of issue records.
    pub total_issued: i64,
    pub expiring_soon: i64,
    pub uniform_types: Vec<UniformType>,
    pub issues: Vec<EmployeeUniform>,
}

/// How many items of a type each employee in a position receives.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct PositionUniform {
    pub id: i64,
    pub position_id: i64,
    pub position_name: String,
    pub uniform_type_id: i64,
    pub uniform_type_name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNormRequest {
    pub position_id: i64,
    pub uniform_type_id: i64,
    pub quantity: i64,
}

impl Validator for CreateNormRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.quantity < 1 {
            errors.add(ValidationError::new("quantity", "Количество должно быть не меньше 1"));
        }
        errors.into_result()
    }
}

/// A norm joined with the position headcount and the unexpired issues.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NormUsage {
    pub position_id: i64,
    pub position_name: String,
    pub uniform_type_id: i64,
    pub uniform_type_name: String,
    pub quantity: i64,
    pub employees: i64,
    pub issued: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UniformRequirement {
    pub position_id: i64,
    pub position_name: String,
    pub uniform_type_id: i64,
    pub uniform_type_name: String,
    pub employees: i64,
    pub required: i64,
    pub issued: i64,
    pub deficit: i64,
}

/// Rows with a shortage only: required = norm x headcount.
pub fn requirements(usage: Vec<NormUsage>) -> Vec<UniformRequirement> {
    usage
        .into_iter()
        .filter_map(|norm| {
            let required = norm.quantity * norm.employees;
            let deficit = required - norm.issued;
            (deficit > 0).then(|| UniformRequirement {
                position_id: norm.position_id,
                position_name: norm.position_name,
                uniform_type_id: norm.uniform_type_id,
                uniform_type_name: norm.uniform_type_name,
                employees: norm.employees,
                required,
                issued: norm.issued,
                deficit,
            })
        })
        .collect()
}
