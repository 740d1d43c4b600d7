//! Values substituted into templates.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Tag name (without braces) to value. Ordered so repeated renders of the same
/// input are byte-identical.
pub type DocumentData = BTreeMap<String, TagValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Text(String),
    /// Rendered as `DD.MM.YYYY`.
    Date(NaiveDate),
    /// Rendered joined with `", "`.
    List(Vec<String>),
}

impl TagValue {
    pub fn text(value: impl Into<String>) -> Self {
        TagValue::Text(value.into())
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(s) => f.write_str(s),
            TagValue::Date(d) => write!(f, "{}", format_date(*d)),
            TagValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

impl From<NaiveDate> for TagValue {
    fn from(value: NaiveDate) -> Self {
        TagValue::Date(value)
    }
}

impl From<Vec<String>> for TagValue {
    fn from(value: Vec<String>) -> Self {
        TagValue::List(value)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(TagValue::from(date).render(), "05.01.2025");
        assert_eq!(
            TagValue::from(vec!["Пост №1".to_string(), "Пост №2".to_string()]).render(),
            "Пост №1, Пост №2"
        );
        assert_eq!(TagValue::List(Vec::new()).render(), "");
        assert_eq!(TagValue::text("ТТН-000007").render(), "ТТН-000007");
    }
}
