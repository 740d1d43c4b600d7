//! Input validation for registry forms.
//!
//! Every check appends to a [`ValidationErrors`] collector instead of failing
//! fast, so a form submission reports all problems at once. Optional fields
//! pass when empty. Messages are user-facing and in Russian.

use chrono::{Local, NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    static ref PASSPORT_SERIES_RE: Regex = Regex::new(r"^\d{4}$").unwrap();
    static ref PASSPORT_NUMBER_RE: Regex = Regex::new(r"^\d{6}$").unwrap();
    static ref LICENSE_PLATE_RE: Regex =
        Regex::new(r"^[АВЕКМНОРСТУХ]\d{3}[АВЕКМНОРСТУХ]{2}\d{2,3}$").unwrap();
}

/// A single failed check.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationError {
    /// Form field the message belongs to
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn required(field: &str, label: &str) -> Self {
        Self::new(field, format!("Поле '{}' обязательно для заполнения", label))
    }

    pub fn invalid_email(field: &str) -> Self {
        Self::new(field, "Неверный формат email адреса")
            .with_suggestion("Пример: ivanov@example.ru")
    }

    pub fn invalid_phone(field: &str) -> Self {
        Self::new(field, "Неверный формат номера телефона")
            .with_suggestion("Пример: +7 (912) 345-67-89")
    }

    pub fn invalid_plate(field: &str) -> Self {
        Self::new(field, "Неверный формат государственного номера")
            .with_suggestion("Пример: А123ВС77")
    }

    pub fn invalid_date(field: &str, value: &str) -> Self {
        Self::new(field, format!("Неверный формат даты '{}'", value))
            .with_suggestion("Используйте формат ГГГГ-ММ-ДД")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// One line per error, suitable for a flash notice.
    pub fn to_message(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.clone())
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_message())
    }
}

// ============================================================================
// Checks
// ============================================================================

pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::required(field, label));
    }
}

pub fn validate_email(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }
    if !EMAIL_RE.is_match(trimmed) {
        errors.add(ValidationError::invalid_email(field));
    }
}

/// Russian numbers: 10 digits, or 11 starting with 7 or 8. Separators are ignored.
pub fn validate_phone(value: &str, field: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        return;
    }
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    let ok = match digits.len() {
        10 => true,
        11 => digits.starts_with('7') || digits.starts_with('8'),
        _ => false,
    };
    if !ok {
        errors.add(ValidationError::invalid_phone(field));
    }
}

/// Checked only when both series and number are given.
pub fn validate_passport(series: &str, number: &str, errors: &mut ValidationErrors) {
    let series = series.trim();
    let number = number.trim();
    if series.is_empty() || number.is_empty() {
        return;
    }
    if !PASSPORT_SERIES_RE.is_match(series) {
        errors.add(ValidationError::new(
            "passport_series",
            "Серия паспорта должна содержать 4 цифры",
        ));
    } else if !PASSPORT_NUMBER_RE.is_match(number) {
        errors.add(ValidationError::new(
            "passport_number",
            "Номер паспорта должен содержать 6 цифр",
        ));
    }
}

pub fn validate_license_plate(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }
    if !LICENSE_PLATE_RE.is_match(&trimmed.to_uppercase()) {
        errors.add(ValidationError::invalid_plate(field));
    }
}

/// Length and digits only; control digits are not verified.
pub fn validate_inn(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }
    let len = trimmed.chars().count();
    if len != 10 && len != 12 {
        errors.add(ValidationError::new(field, "ИНН должен содержать 10 или 12 цифр"));
    } else if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        errors.add(ValidationError::new(field, "ИНН должен содержать только цифры"));
    }
}

/// Parses `YYYY-MM-DD`. An empty value is `Ok(None)`; a malformed one is recorded.
pub fn parse_date_field(
    value: &str,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(ValidationError::invalid_date(field, trimmed));
            None
        }
    }
}

/// Parses `HH:MM`, the way time inputs post it. Empty is `None`.
pub fn parse_time_field(
    value: &str,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<NaiveTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match NaiveTime::parse_from_str(trimmed, "%H:%M") {
        Ok(time) => Some(time),
        Err(_) => {
            errors.add(
                ValidationError::new(field, format!("Неверный формат времени '{}'", trimmed))
                    .with_suggestion("Используйте формат ЧЧ:ММ"),
            );
            None
        }
    }
}

/// Trimmed value, `None` when blank.
pub fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parses an optional numeric reference (`department_id` and the like).
pub fn parse_id_field(value: &str, field: &str, errors: &mut ValidationErrors) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            errors.add(ValidationError::new(field, format!("Неверный идентификатор '{}'", trimmed)));
            None
        }
    }
}

pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    labels: (&str, &str),
    field: &str,
    errors: &mut ValidationErrors,
) {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            errors.add(ValidationError::new(
                field,
                format!("{} не может быть раньше {}", labels.1, labels.0),
            ));
        }
    }
}

pub const DEFAULT_RANGE_LABELS: (&str, &str) = ("Дата начала", "Дата окончания");

pub fn validate_past_date(
    value: Option<NaiveDate>,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) {
    if let Some(date) = value {
        if date > Local::now().date_naive() {
            errors.add(ValidationError::new(field, format!("{} не может быть в будущем", label)));
        }
    }
}

pub fn validate_file_extension(
    filename: &str,
    allowed: &[&str],
    field: &str,
    errors: &mut ValidationErrors,
) {
    if filename.is_empty() {
        return;
    }
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if !allowed.iter().any(|a| *a == ext) {
        errors.add(ValidationError::new(
            field,
            format!("Недопустимый формат файла. Разрешены: {}", allowed.join(", ")),
        ));
    }
}

pub fn validate_file_size(size: usize, max_mb: usize, field: &str, errors: &mut ValidationErrors) {
    if size > max_mb * 1024 * 1024 {
        errors.add(ValidationError::new(field, format!("Размер файла превышает {}MB", max_mb)));
    }
}

pub fn validate_numeric_range(
    value: &str,
    min: Option<f64>,
    max: Option<f64>,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }
    let number: f64 = match trimmed.replace(',', ".").parse() {
        Ok(n) => n,
        Err(_) => {
            errors.add(ValidationError::new(field, format!("{} должно быть числом", label)));
            return;
        }
    };

    let mut problems = Vec::new();
    if let Some(min) = min {
        if number < min {
            problems.push(format!("не может быть меньше {}", min));
        }
    }
    if let Some(max) = max {
        if number > max {
            problems.push(format!("не может быть больше {}", max));
        }
    }
    if !problems.is_empty() {
        errors.add(ValidationError::new(field, format!("{} {}", label, problems.join(", "))));
    }
}
