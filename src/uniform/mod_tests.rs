#[cfg(test)]
mod tests {
    use crate::documents::Validator;
    use crate::uniform::models::{
        expires_within, expiry_date, requirements, CreateUniformTypeRequest, IssueUniformRequest,
        NormUsage,
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_expiry_adds_wear_months() {
        assert_eq!(expiry_date(date(2025, 3, 15), Some(12)), Some(date(2026, 3, 15)));
        assert_eq!(expiry_date(date(2025, 1, 31), Some(1)), Some(date(2025, 2, 28)));
        assert_eq!(expiry_date(date(2025, 3, 15), None), None);
        assert_eq!(expiry_date(date(2025, 3, 15), Some(0)), None);
    }

    #[test]
    fn test_expires_within_window() {
        let today = date(2025, 3, 1);
        assert!(expires_within(Some(date(2025, 3, 1)), today, 30));
        assert!(expires_within(Some(date(2025, 3, 31)), today, 30));
        assert!(!expires_within(Some(date(2025, 4, 1)), today, 30));
        assert!(!expires_within(Some(date(2025, 2, 28)), today, 30));
        assert!(!expires_within(None, today, 30));
    }

    #[test]
    fn test_issue_request_defaults_quantity() {
        let request = IssueUniformRequest {
            employee_id: 1,
            uniform_type_id: 2,
            issue_date: "2025-03-01".to_string(),
            quantity: None,
        };
        let issue = request.parse().unwrap();
        assert_eq!(issue.quantity, 1);
        assert_eq!(issue.issue_date, date(2025, 3, 1));

        let request = IssueUniformRequest {
            quantity: Some(0),
            issue_date: String::new(),
            ..request
        };
        let errors = request.parse().unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["issue_date", "quantity"]);
    }

    #[test]
    fn test_uniform_type_wear_period_must_be_positive() {
        let request = CreateUniformTypeRequest {
            name: "Куртка".to_string(),
            wear_period: Some(-3),
        };
        assert!(request.validate().is_err());
        let request = CreateUniformTypeRequest {
            name: "Куртка".to_string(),
            wear_period: None,
        };
        assert!(request.validate().is_ok());
    }

    fn usage(quantity: i64, employees: i64, issued: i64) -> NormUsage {
        NormUsage {
            position_id: 1,
            position_name: "Водитель".to_string(),
            uniform_type_id: 2,
            uniform_type_name: "Костюм летний".to_string(),
            quantity,
            employees,
            issued,
        }
    }

    #[test]
    fn test_requirements_keep_shortages_only() {
        let rows = requirements(vec![usage(2, 3, 4), usage(1, 2, 2), usage(1, 0, 0)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].required, 6);
        assert_eq!(rows[0].issued, 4);
        assert_eq!(rows[0].deficit, 2);
    }
}
