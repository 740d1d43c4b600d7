#[cfg(test)]
mod tests {
    use crate::documents::RawFields;
    use crate::pass_request::models::PassRequestForm;
    use chrono::NaiveDate;

    fn fields() -> RawFields {
        let mut fields = RawFields::new()
            .with("request_type", "auto")
            .with("start_date", "2025-01-10")
            .with("end_date", "2025-01-20")
            .with("formed_by", "Сидоров С.С.")
            .with("contract_id", "2");
        fields.push("posts", "1");
        fields.push("posts", "3");
        fields.push("employees", "");
        fields.push("vehicles", "5");
        fields
    }

    #[test]
    fn test_form_collects_ids() {
        let form = PassRequestForm::from_fields(&fields()).unwrap();
        assert_eq!(form.post_ids, vec![1, 3]);
        assert!(form.employee_ids.is_empty());
        assert_eq!(form.vehicle_ids, vec![5]);
        assert_eq!(form.contract_id, Some(2));
        assert_eq!(form.inn_id, None);
        assert_eq!(form.start_date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert_eq!(form.purpose, None);
        assert!(!form.is_one_time);
    }

    #[test]
    fn test_form_rejects_reversed_period() {
        let fields = fields().with("end_date", "2025-01-01");
        let errors = PassRequestForm::from_fields(&fields).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "end_date");
    }

    #[test]
    fn test_form_requires_type_author_and_dates() {
        let errors = PassRequestForm::from_fields(&RawFields::new()).unwrap_err();
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["request_type", "formed_by", "start_date", "end_date"]);
    }

    #[test]
    fn test_form_rejects_non_numeric_ids() {
        let mut fields = fields();
        fields.push("posts", "Пост №1");
        let errors = PassRequestForm::from_fields(&fields).unwrap_err();
        assert_eq!(errors.errors()[0].field, "posts");
    }
}
