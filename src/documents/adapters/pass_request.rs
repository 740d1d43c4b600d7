use chrono::NaiveDate;

use super::{name_list, AdapterError, DocumentAdapter};
use crate::documents::docx::RowSet;
use crate::documents::fields::{FieldValue, RawFields};
use crate::documents::value::{format_date, DocumentData, TagValue};
use crate::documents::DocumentKind;

pub const TAG_PERIOD: &str = "ПЕРИОД ПРОЕЗДА";
pub const TAG_POSTS: &str = "ПЕРЕЧЕНЬ ПОСТОВ";
pub const ROW_EMPLOYEE: &str = "СОТРУДНИК";
pub const ROW_VEHICLE: &str = "ТРАНСПОРТ";
pub const ROW_NUMBER: &str = "№";

/// Pass request (заявка на пропуск).
///
/// Every submitted field is passed through under its own name, so templates
/// can use `{{purpose}}` or `{{formed_by}}` directly. On top of that the
/// travel period and the post list get their own tags, and employees and
/// vehicles fill table rows marked `{{СОТРУДНИК}}` / `{{ТРАНСПОРТ}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassRequestDocument {
    pub request_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub posts: Option<Vec<String>>,
    pub employees: Vec<String>,
    pub vehicles: Vec<String>,
    pub fields: RawFields,
}

impl PassRequestDocument {
    pub fn period(&self) -> String {
        format!(
            "с {} по {}",
            format_date(self.start_date),
            format_date(self.end_date)
        )
    }
}

impl DocumentAdapter for PassRequestDocument {
    const KIND: DocumentKind = DocumentKind::PassRequest;

    fn from_fields(fields: &RawFields) -> Result<Self, AdapterError> {
        Ok(Self {
            start_date: fields.required_date("start_date")?,
            end_date: fields.required_date("end_date")?,
            request_type: fields.text_or_empty("request_type"),
            posts: name_list(fields, "posts")?,
            employees: name_list(fields, "employees")?.unwrap_or_default(),
            vehicles: name_list(fields, "vehicles")?.unwrap_or_default(),
            fields: fields.clone(),
        })
    }

    fn to_data(&self) -> DocumentData {
        let mut data: DocumentData = self
            .fields
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    FieldValue::Text(s) => TagValue::Text(s.clone()),
                    FieldValue::List(items) => TagValue::List(items.clone()),
                };
                (name.clone(), value)
            })
            .collect();

        data.insert(TAG_PERIOD.to_string(), TagValue::Text(self.period()));
        if let Some(posts) = &self.posts {
            data.insert(TAG_POSTS.to_string(), TagValue::List(posts.clone()));
        }
        data
    }

    fn row_sets(&self) -> Vec<RowSet> {
        vec![
            numbered_rows(ROW_EMPLOYEE, &self.employees),
            numbered_rows(ROW_VEHICLE, &self.vehicles),
        ]
    }

    fn label(&self) -> String {
        if self.request_type.is_empty() {
            "general".to_string()
        } else {
            self.request_type.clone()
        }
    }
}

fn numbered_rows(marker: &str, values: &[String]) -> RowSet {
    let rows = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let mut row = DocumentData::new();
            row.insert(ROW_NUMBER.to_string(), TagValue::Text((i + 1).to_string()));
            row.insert(marker.to_string(), TagValue::Text(value.clone()));
            row
        })
        .collect();
    RowSet::new(marker, rows)
}
