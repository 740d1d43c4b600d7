//! Raw form input handed to the adapters.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::adapters::AdapterError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

/// Field name to submitted value(s), as posted by a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    inner: BTreeMap<String, FieldValue>,
}

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), FieldValue::Text(value.into()));
    }

    pub fn insert_list(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.inner.insert(name.into(), FieldValue::List(values));
    }

    /// Appends to a multi-valued field, turning a single value into a list.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        let merged = match self.inner.remove(&name) {
            None => FieldValue::Text(value),
            Some(FieldValue::Text(first)) => FieldValue::List(vec![first, value]),
            Some(FieldValue::List(mut items)) => {
                items.push(value);
                FieldValue::List(items)
            }
        };
        self.inner.insert(name, merged);
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.inner.get(name)
    }

    /// Single value; for a list, its first element.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.inner.get(name)? {
            FieldValue::Text(s) => Some(s.as_str()),
            FieldValue::List(items) => items.first().map(String::as_str),
        }
    }

    /// Value trimmed, empty when absent.
    pub fn text_or_empty(&self, name: &str) -> String {
        self.text(name).map(|s| s.trim().to_string()).unwrap_or_default()
    }

    /// All values; a single text value becomes a one-element list.
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.inner.get(name) {
            Some(FieldValue::List(items)) => items.clone(),
            Some(FieldValue::Text(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn required(&self, name: &str) -> Result<String, AdapterError> {
        let value = self.text_or_empty(name);
        if value.is_empty() {
            Err(AdapterError::MissingField(name.to_string()))
        } else {
            Ok(value)
        }
    }

    pub fn required_date(&self, name: &str) -> Result<NaiveDate, AdapterError> {
        let value = self.required(name)?;
        parse_form_date(name, &value)
    }

    pub fn optional_date(&self, name: &str) -> Result<Option<NaiveDate>, AdapterError> {
        let value = self.text_or_empty(name);
        if value.is_empty() {
            Ok(None)
        } else {
            parse_form_date(name, &value).map(Some)
        }
    }

    /// Checkbox semantics: present and not `0`, `false` or `off`.
    pub fn flag(&self, name: &str) -> bool {
        match self.text(name).map(|v| v.trim().to_lowercase()) {
            Some(v) => !(v.is_empty() || v == "0" || v == "false" || v == "off"),
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.inner.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn parse_form_date(field: &str, value: &str) -> Result<NaiveDate, AdapterError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| AdapterError::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    })
}

impl FromIterator<(String, FieldValue)> for RawFields {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
