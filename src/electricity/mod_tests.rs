#[cfg(test)]
mod tests {
    use crate::documents::RawFields;
    use crate::electricity::models::ElectricityForm;
    use chrono::NaiveDate;

    #[test]
    fn test_readings_form() {
        let fields = RawFields::new()
            .with("reading_date", "2025-03-31")
            .with("previous_bpo", "15230")
            .with("current_bpo", "15870")
            .with("current_dormitory", "8400,5");
        let form = ElectricityForm::from_fields(&fields).unwrap();
        assert_eq!(form.date, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(form.readings.current_bpo, "15870");
        assert_eq!(form.readings.current_dormitory, "8400,5");
        assert_eq!(form.readings.previous_dormitory, "");
    }

    #[test]
    fn test_readings_must_be_non_negative_numbers() {
        let fields = RawFields::new()
            .with("reading_date", "2025-03-31")
            .with("previous_bpo", "-1")
            .with("current_bpo", "много");
        let errors = ElectricityForm::from_fields(&fields).unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["previous_bpo", "current_bpo"]);
    }

    #[test]
    fn test_date_is_required() {
        let errors = ElectricityForm::from_fields(&RawFields::new()).unwrap_err();
        assert_eq!(errors.errors()[0].field, "reading_date");
    }
}
