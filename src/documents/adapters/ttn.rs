use chrono::NaiveDate;

use super::{name_list, AdapterError, DocumentAdapter};
use crate::documents::fields::RawFields;
use crate::documents::value::{DocumentData, TagValue};
use crate::documents::DocumentKind;

pub const TAG_CARGO: &str = "НАИМЕНОВАНИЕГРУЗА";

/// Optional form fields and the tags they fill.
const FIELD_TAGS: &[(&str, &str)] = &[
    ("sender_organization", "ОРГАНИЗАЦИЯ ГРУЗООТПРАВИТЕЛЬ"),
    ("receiver_organization", "ОРГАНИЗАЦИЯГРУЗОПОЛУЧАТЕЛЬ"),
    ("places_count", "МЕСТА"),
    ("cargo_weight", "МАССАГРУЗА"),
    ("loading_address", "АДРЕСПОГРУЗКИ"),
    ("unloading_address", "АДРЕСРАЗГРУЗКИ"),
    ("loading_time", "ВРЕМЯПОГРУЗКИ"),
    ("sender_individual", "ГРУЗОТПРАВИТЕЛЬФИЗ"),
    ("carrier_individual", "ПЕРЕВОЗЧИКФИЗ"),
    ("sender_legal", "ГРУЗООТПРАВИТЕЛЬЮР"),
    ("vehicle_info", "ТС"),
    ("waybill_number", "НОМЕРПЛ"),
    ("trailer_info", "ПРИЦЕП"),
];

/// Bill of lading (товарно-транспортная накладная).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtnDocument {
    pub date: NaiveDate,
    pub number: String,
    /// Tag to value for the optional fields, empty when not submitted.
    pub details: Vec<(&'static str, String)>,
    pub cargo: Option<Vec<String>>,
}

impl DocumentAdapter for TtnDocument {
    const KIND: DocumentKind = DocumentKind::Ttn;

    fn from_fields(fields: &RawFields) -> Result<Self, AdapterError> {
        Ok(Self {
            date: fields.required_date("date")?,
            number: fields.required("number")?,
            details: FIELD_TAGS
                .iter()
                .map(|(field, tag)| (*tag, fields.text_or_empty(field)))
                .collect(),
            cargo: name_list(fields, "cargo_list")?,
        })
    }

    fn to_data(&self) -> DocumentData {
        let mut data = DocumentData::new();
        data.insert("ДАТАСОСТАВЛЕНИЯ".to_string(), TagValue::Date(self.date));
        data.insert("НОМЕРТТН".to_string(), TagValue::Text(self.number.clone()));
        for (tag, value) in &self.details {
            data.insert(tag.to_string(), TagValue::Text(value.clone()));
        }
        if let Some(cargo) = &self.cargo {
            data.insert(TAG_CARGO.to_string(), TagValue::List(cargo.clone()));
        }
        data
    }

    fn label(&self) -> String {
        self.number.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_mapping() {
        let fields = RawFields::new()
            .with("date", "2025-03-15")
            .with("number", "ТТН-000007")
            .with("sender_organization", "ООО \"Север\"")
            .with("cargo_weight", "12.5")
            .with("vehicle_info", "КАМАЗ А123ВС77")
            .with(
                "cargo_list",
                r#"[{"name": "Щебень", "qty": 2}, {"name": "Песок"}]"#,
            );
        let data = TtnDocument::from_fields(&fields).unwrap().to_data();

        assert_eq!(data["ДАТАСОСТАВЛЕНИЯ"].render(), "15.03.2025");
        assert_eq!(data["НОМЕРТТН"].render(), "ТТН-000007");
        assert_eq!(data["ОРГАНИЗАЦИЯ ГРУЗООТПРАВИТЕЛЬ"].render(), "ООО \"Север\"");
        assert_eq!(data["МАССАГРУЗА"].render(), "12.5");
        assert_eq!(data["ТС"].render(), "КАМАЗ А123ВС77");
        assert_eq!(data["ПРИЦЕП"].render(), "");
        assert_eq!(data[TAG_CARGO].render(), "Щебень, Песок");
        assert_eq!(data.len(), 2 + FIELD_TAGS.len() + 1);
    }

    #[test]
    fn test_cargo_tag_only_when_submitted() {
        let fields = RawFields::new()
            .with("date", "2025-03-15")
            .with("number", "ТТН-000008");
        let data = TtnDocument::from_fields(&fields).unwrap().to_data();
        assert!(!data.contains_key(TAG_CARGO));
    }

    #[test]
    fn test_number_and_date_are_required() {
        let fields = RawFields::new().with("date", "2025-03-15");
        assert_eq!(
            TtnDocument::from_fields(&fields).unwrap_err(),
            AdapterError::MissingField("number".to_string())
        );
        let fields = RawFields::new().with("number", "1");
        assert_eq!(
            TtnDocument::from_fields(&fields).unwrap_err(),
            AdapterError::MissingField("date".to_string())
        );
    }
}
