#[cfg(test)]
mod tests {
    use crate::acceptance_act::models::{
        CreateAcceptanceActRequest, SaveAcceptanceActFormRequest,
    };
    use crate::documents::Validator;
    use serde_json::json;

    #[test]
    fn test_blank_act_type_is_untyped() {
        let request: SaveAcceptanceActFormRequest = serde_json::from_value(json!({
            "name": "Приёмка шин",
            "act_type": "  "
        }))
        .unwrap();
        assert_eq!(request.act_type(), None);
        assert_eq!(request.structure(), json!({}));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_act_needs_author_and_object_data() {
        let request = CreateAcceptanceActRequest {
            form_id: 3,
            filled_data: Some(json!(42)),
            created_by: " ".to_string(),
        };
        let errors = request.validate().unwrap_err();
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["created_by", "filled_data"]);
    }
}
