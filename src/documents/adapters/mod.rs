//! Per-kind transforms from raw form fields to a flat tag mapping.
//!
//! Each document kind has a typed struct built from [`RawFields`] (failing on
//! missing required fields or malformed dates) and rendered into
//! [`DocumentData`]. Adapters are pure: the same fields always give the same
//! mapping.

pub mod pass_request;
pub mod shift_request;
pub mod ttn;

pub use pass_request::PassRequestDocument;
pub use shift_request::{ShiftKind, ShiftRequestDocument};
pub use ttn::TtnDocument;

use thiserror::Error;

use super::docx::RowSet;
use super::fields::{FieldValue, RawFields};
use super::value::DocumentData;
use super::DocumentKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("required field '{0}' is missing")]
    MissingField(String),
    #[error("field '{field}' has invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { field: String, value: String },
    #[error("unknown document kind '{0}'")]
    UnknownKind(String),
    #[error("field '{field}' is malformed: {reason}")]
    Malformed { field: String, reason: String },
}

pub trait DocumentAdapter: Sized {
    const KIND: DocumentKind;

    fn from_fields(fields: &RawFields) -> Result<Self, AdapterError>;

    fn to_data(&self) -> DocumentData;

    /// Table rows to replicate before tags are substituted.
    fn row_sets(&self) -> Vec<RowSet> {
        Vec::new()
    }

    /// Sub-kind used in the output file name.
    fn label(&self) -> String;
}

/// Adapter output for one generation.
#[derive(Debug, Clone)]
pub struct Adapted {
    pub kind: DocumentKind,
    pub label: String,
    pub data: DocumentData,
    pub row_sets: Vec<RowSet>,
}

impl Adapted {
    fn from_adapter<A: DocumentAdapter>(adapter: &A) -> Self {
        Self {
            kind: A::KIND,
            label: adapter.label(),
            data: adapter.to_data(),
            row_sets: adapter.row_sets(),
        }
    }
}

/// Dispatches on `kind`. Sub-kinds are read from the `request_type` field.
pub fn adapt(kind: DocumentKind, fields: &RawFields) -> Result<Adapted, AdapterError> {
    match kind {
        DocumentKind::PassRequest => {
            PassRequestDocument::from_fields(fields).map(|a| Adapted::from_adapter(&a))
        }
        DocumentKind::Ttn => TtnDocument::from_fields(fields).map(|a| Adapted::from_adapter(&a)),
        DocumentKind::ShiftRequest => {
            ShiftRequestDocument::from_fields(fields).map(|a| Adapted::from_adapter(&a))
        }
    }
}

/// Reads a list field that may arrive as repeated values or as a JSON array.
///
/// Array items may be strings or objects with a `name` member.
pub(crate) fn name_list(fields: &RawFields, field: &str) -> Result<Option<Vec<String>>, AdapterError> {
    let malformed = |reason: String| AdapterError::Malformed {
        field: field.to_string(),
        reason,
    };
    match fields.get(field) {
        None => Ok(None),
        Some(FieldValue::List(items)) => Ok(Some(items.clone())),
        Some(FieldValue::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(Some(Vec::new()));
            }
            if !trimmed.starts_with('[') {
                return Ok(Some(vec![trimmed.to_string()]));
            }
            let items: Vec<serde_json::Value> =
                serde_json::from_str(trimmed).map_err(|e| malformed(e.to_string()))?;
            items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => Ok(s),
                    serde_json::Value::Object(ref map) => map
                        .get("name")
                        .and_then(|n| n.as_str())
                        .map(str::to_string)
                        .ok_or_else(|| malformed("item without a name".to_string())),
                    other => Ok(other.to_string()),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_list_forms() {
        let fields = RawFields::new()
            .with("json", r#"[{"name": "Щебень"}, "Песок"]"#)
            .with("plain", "Пост №1")
            .with("broken", "[1, ");
        assert_eq!(
            name_list(&fields, "json").unwrap(),
            Some(vec!["Щебень".to_string(), "Песок".to_string()])
        );
        assert_eq!(
            name_list(&fields, "plain").unwrap(),
            Some(vec!["Пост №1".to_string()])
        );
        assert_eq!(name_list(&fields, "absent").unwrap(), None);
        assert!(matches!(
            name_list(&fields, "broken"),
            Err(AdapterError::Malformed { .. })
        ));
    }

    #[test]
    fn test_adapt_dispatches_by_kind() {
        let fields = RawFields::new()
            .with("date", "2025-02-03")
            .with("number", "ТТН-000001");
        let adapted = adapt(DocumentKind::Ttn, &fields).unwrap();
        assert_eq!(adapted.kind, DocumentKind::Ttn);
        assert_eq!(adapted.label, "ТТН-000001");
        assert_eq!(adapted.data["ДАТАСОСТАВЛЕНИЯ"].render(), "03.02.2025");

        assert_eq!(
            adapt(DocumentKind::PassRequest, &fields).unwrap_err(),
            AdapterError::MissingField("start_date".to_string())
        );
    }
}
