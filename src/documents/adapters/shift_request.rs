use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::{AdapterError, DocumentAdapter};
use crate::documents::fields::RawFields;
use crate::documents::value::{DocumentData, TagValue};
use crate::documents::DocumentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShiftKind {
    Charter,
    Regular,
    #[serde(rename = "auto")]
    AutoDelivery,
}

impl ShiftKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftKind::Charter => "charter",
            ShiftKind::Regular => "regular",
            ShiftKind::AutoDelivery => "auto",
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftKind {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "charter" => Ok(ShiftKind::Charter),
            "regular" => Ok(ShiftKind::Regular),
            "auto" | "auto_delivery" => Ok(ShiftKind::AutoDelivery),
            other => Err(AdapterError::UnknownKind(other.to_string())),
        }
    }
}

/// Shift-handover request (заявка на перевахтовку). All fields are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftRequestDocument {
    Charter {
        departure_airport: String,
        arrival_airport: String,
        flight_date: Option<NaiveDate>,
        auto_delivery_from: String,
        auto_delivery_to: String,
    },
    Regular {
        departure_airport: String,
        arrival_airport: String,
        flight_date: Option<NaiveDate>,
        preliminary_cost: String,
        flight_number: String,
    },
    AutoDelivery {
        delivery_date: Option<NaiveDate>,
        auto_delivery_from: String,
        auto_delivery_to: String,
    },
}

impl ShiftRequestDocument {
    pub fn from_kind(kind: ShiftKind, fields: &RawFields) -> Result<Self, AdapterError> {
        Ok(match kind {
            ShiftKind::Charter => ShiftRequestDocument::Charter {
                departure_airport: fields.text_or_empty("departure_airport"),
                arrival_airport: fields.text_or_empty("arrival_airport"),
                flight_date: fields.optional_date("flight_date")?,
                auto_delivery_from: fields.text_or_empty("auto_delivery_from"),
                auto_delivery_to: fields.text_or_empty("auto_delivery_to"),
            },
            ShiftKind::Regular => ShiftRequestDocument::Regular {
                departure_airport: fields.text_or_empty("departure_airport"),
                arrival_airport: fields.text_or_empty("arrival_airport"),
                flight_date: fields.optional_date("flight_date")?,
                preliminary_cost: fields.text_or_empty("preliminary_cost"),
                flight_number: fields.text_or_empty("flight_number"),
            },
            ShiftKind::AutoDelivery => {
                let delivery_date = match fields.optional_date("request_date")? {
                    Some(date) => Some(date),
                    None => fields.optional_date("flight_date")?,
                };
                ShiftRequestDocument::AutoDelivery {
                    delivery_date,
                    auto_delivery_from: fields.text_or_empty("auto_delivery_from"),
                    auto_delivery_to: fields.text_or_empty("auto_delivery_to"),
                }
            }
        })
    }

    pub fn kind(&self) -> ShiftKind {
        match self {
            ShiftRequestDocument::Charter { .. } => ShiftKind::Charter,
            ShiftRequestDocument::Regular { .. } => ShiftKind::Regular,
            ShiftRequestDocument::AutoDelivery { .. } => ShiftKind::AutoDelivery,
        }
    }
}

fn date_or_empty(date: Option<NaiveDate>) -> TagValue {
    match date {
        Some(d) => TagValue::Date(d),
        None => TagValue::Text(String::new()),
    }
}

impl DocumentAdapter for ShiftRequestDocument {
    const KIND: DocumentKind = DocumentKind::ShiftRequest;

    /// Sub-kind comes from the `request_type` field.
    fn from_fields(fields: &RawFields) -> Result<Self, AdapterError> {
        let kind: ShiftKind = fields.required("request_type")?.parse()?;
        Self::from_kind(kind, fields)
    }

    fn to_data(&self) -> DocumentData {
        let entries: Vec<(&str, TagValue)> = match self {
            ShiftRequestDocument::Charter {
                departure_airport,
                arrival_airport,
                flight_date,
                auto_delivery_from,
                auto_delivery_to,
            } => vec![
                ("ОТКУДА", departure_airport.as_str().into()),
                ("КУДА", arrival_airport.as_str().into()),
                ("ДАТА ВЫЛЕТА", date_or_empty(*flight_date)),
                ("ОТКУДА АВТО", auto_delivery_from.as_str().into()),
                ("КУДА АВТО", auto_delivery_to.as_str().into()),
            ],
            ShiftRequestDocument::Regular {
                departure_airport,
                arrival_airport,
                flight_date,
                preliminary_cost,
                flight_number,
            } => vec![
                ("ВЫЛЕТ", departure_airport.as_str().into()),
                ("ПРИЛЕТ", arrival_airport.as_str().into()),
                ("ДАТА ВЫЛЕТА", date_or_empty(*flight_date)),
                ("СТОИМОСТЬ", preliminary_cost.as_str().into()),
                ("НОМЕР РЕЙСА", flight_number.as_str().into()),
            ],
            ShiftRequestDocument::AutoDelivery {
                delivery_date,
                auto_delivery_from,
                auto_delivery_to,
            } => vec![
                ("ДАТА ДОСТАВКИ", date_or_empty(*delivery_date)),
                ("ОТКУДА АВТО", auto_delivery_from.as_str().into()),
                ("КУДА АВТО", auto_delivery_to.as_str().into()),
            ],
        };
        entries
            .into_iter()
            .map(|(tag, value)| (tag.to_string(), value))
            .collect()
    }

    fn label(&self) -> String {
        self.kind().as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charter_tags() {
        let fields = RawFields::new()
            .with("departure_airport", "Москва (SVO)")
            .with("arrival_airport", "Новый Уренгой (NUX)")
            .with("flight_date", "2025-04-01")
            .with("auto_delivery_from", "Аэропорт")
            .with("auto_delivery_to", "Вахтовый посёлок");
        let data = ShiftRequestDocument::from_kind(ShiftKind::Charter, &fields)
            .unwrap()
            .to_data();
        assert_eq!(data["ОТКУДА"].render(), "Москва (SVO)");
        assert_eq!(data["КУДА"].render(), "Новый Уренгой (NUX)");
        assert_eq!(data["ДАТА ВЫЛЕТА"].render(), "01.04.2025");
        assert_eq!(data["КУДА АВТО"].render(), "Вахтовый посёлок");
        assert_eq!(data.len(), 5);
    }

    #[test]
    fn test_regular_without_date() {
        let fields = RawFields::new()
            .with("flight_number", "SU-1402")
            .with("preliminary_cost", "15400");
        let data = ShiftRequestDocument::from_kind(ShiftKind::Regular, &fields)
            .unwrap()
            .to_data();
        assert_eq!(data["ДАТА ВЫЛЕТА"].render(), "");
        assert_eq!(data["НОМЕР РЕЙСА"].render(), "SU-1402");
        assert_eq!(data["СТОИМОСТЬ"].render(), "15400");
        assert_eq!(data["ВЫЛЕТ"].render(), "");
    }

    #[test]
    fn test_auto_delivery_uses_request_date() {
        let fields = RawFields::new()
            .with("request_type", "auto")
            .with("request_date", "2025-05-09")
            .with("auto_delivery_from", "Тюмень");
        let doc = ShiftRequestDocument::from_fields(&fields).unwrap();
        assert_eq!(doc.kind(), ShiftKind::AutoDelivery);
        let data = doc.to_data();
        assert_eq!(data["ДАТА ДОСТАВКИ"].render(), "09.05.2025");
        assert_eq!(data["ОТКУДА АВТО"].render(), "Тюмень");
        assert_eq!(doc.label(), "auto");
    }

    #[test]
    fn test_unknown_kind_and_bad_date() {
        assert_eq!(
            "helicopter".parse::<ShiftKind>().unwrap_err(),
            AdapterError::UnknownKind("helicopter".to_string())
        );
        let fields = RawFields::new().with("flight_date", "01/04/2025");
        assert!(matches!(
            ShiftRequestDocument::from_kind(ShiftKind::Charter, &fields),
            Err(AdapterError::InvalidDate { .. })
        ));
    }
}
