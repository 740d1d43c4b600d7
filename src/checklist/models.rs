use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use utoipa::ToSchema;

use crate::documents::Validator;
use crate::validators::{validate_required, ValidationError, ValidationErrors};

/// A checklist template: a name and a free-form JSON structure of its
/// sections and items.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ChecklistForm {
    pub id: i64,
    pub name: String,
    #[schema(value_type = Object)]
    pub form_structure: Json<Value>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveChecklistFormRequest {
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub form_structure: Option<Value>,
}

impl SaveChecklistFormRequest {
    /// Structure to store; an absent one is an empty object.
    pub fn structure(&self) -> Value {
        self.form_structure
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default()))
    }
}

pub(crate) fn require_container(value: &Value, field: &str, errors: &mut ValidationErrors) {
    if !(value.is_object() || value.is_array()) {
        errors.add(ValidationError::new(
            field,
            "Ожидается JSON-объект или массив",
        ));
    }
}

impl Validator for SaveChecklistFormRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.name, "name", "Название формы", &mut errors);
        require_container(&self.structure(), "form_structure", &mut errors);
        errors.into_result()
    }
}

/// A filled checklist.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Checklist {
    pub id: i64,
    pub form_id: i64,
    pub form_name: String,
    #[schema(value_type = Object)]
    pub filled_data: Json<Value>,
    pub created_by: String,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateChecklistRequest {
    pub form_id: i64,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub filled_data: Option<Value>,
    pub created_by: String,
}

impl CreateChecklistRequest {
    pub fn data(&self) -> Value {
        self.filled_data
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default()))
    }
}

impl Validator for CreateChecklistRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.created_by, "created_by", "Заполнил", &mut errors);
        require_container(&self.data(), "filled_data", &mut errors);
        errors.into_result()
    }
}
