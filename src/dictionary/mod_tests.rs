#[cfg(test)]
mod tests {
    use crate::dictionary::models::{CreateDictionaryEntryRequest, DictionaryKind};
    use crate::documents::Validator;

    #[test]
    fn test_kind_from_path_segment() {
        assert_eq!(
            "vehicle-types".parse::<DictionaryKind>().unwrap(),
            DictionaryKind::VehicleTypes
        );
        assert_eq!(
            "airports".parse::<DictionaryKind>().unwrap(),
            DictionaryKind::Airports
        );
        assert!("employees".parse::<DictionaryKind>().is_err());
    }

    #[test]
    fn test_only_airports_have_codes() {
        let with_code: Vec<_> = DictionaryKind::ALL
            .iter()
            .filter(|k| k.has_code())
            .collect();
        assert_eq!(with_code, vec![&DictionaryKind::Airports]);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let request = CreateDictionaryEntryRequest {
            name: "  ".to_string(),
            code: None,
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.errors()[0].field, "name");

        let request = CreateDictionaryEntryRequest {
            name: "Склад".to_string(),
            code: None,
        };
        assert!(request.validate().is_ok());
    }
}
