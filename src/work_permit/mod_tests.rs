#[cfg(test)]
mod tests {
    use crate::documents::RawFields;
    use crate::work_permit::models::{work_permit_number, WorkPermitForm};
    use chrono::NaiveDate;

    #[test]
    fn test_number_format() {
        assert_eq!(work_permit_number(1), "ШМР-0001");
        assert_eq!(work_permit_number(12345), "ШМР-12345");
    }

    #[test]
    fn test_form_parses_dates_times_and_people() {
        let fields = RawFields::new()
            .with("tire_type", " Зимние ")
            .with("start_date", "2025-03-01")
            .with("end_date", "2025-03-02")
            .with("start_time", "08:00")
            .with("end_time", "17:30")
            .with("supervisor_id", "1")
            .with("executor_id", "3");
        let form = WorkPermitForm::from_fields(&fields).unwrap();
        assert_eq!(form.tire_type.as_deref(), Some("Зимние"));
        assert_eq!(form.start_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(form.end_time.as_deref(), Some("17:30"));
        assert_eq!(form.supervisor_id, Some(1));
        assert_eq!(form.responsible_id, None);
        assert_eq!(form.executor_id, Some(3));
    }

    #[test]
    fn test_empty_form_is_accepted() {
        let form = WorkPermitForm::from_fields(&RawFields::new()).unwrap();
        assert_eq!(form.tire_type, None);
        assert_eq!(form.start_date, None);
    }

    #[test]
    fn test_same_day_permit_must_end_after_it_starts() {
        let fields = RawFields::new()
            .with("start_date", "2025-03-01")
            .with("end_date", "2025-03-01")
            .with("start_time", "12:00")
            .with("end_time", "09:00")
            .with("executor_id", "x");
        let errors = WorkPermitForm::from_fields(&fields).unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["end_time", "executor_id"]);
    }
}
