use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use utoipa::ToSchema;

use crate::checklist::models::require_container;
use crate::documents::Validator;
use crate::validators::{validate_required, ValidationErrors};

/// Template of an acceptance act, e.g. vehicle handover or tyre receipt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct AcceptanceActForm {
    pub id: i64,
    pub name: String,
    pub act_type: Option<String>,
    #[schema(value_type = Object)]
    pub form_structure: Json<Value>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveAcceptanceActFormRequest {
    pub name: String,
    #[serde(default)]
    pub act_type: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub form_structure: Option<Value>,
}

impl SaveAcceptanceActFormRequest {
    pub fn structure(&self) -> Value {
        self.form_structure
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default()))
    }

    /// Act type with surrounding blanks removed; blank means untyped.
    pub fn act_type(&self) -> Option<&str> {
        self.act_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl Validator for SaveAcceptanceActFormRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.name, "name", "Название формы", &mut errors);
        require_container(&self.structure(), "form_structure", &mut errors);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct AcceptanceAct {
    pub id: i64,
    pub form_id: i64,
    pub form_name: String,
    pub act_type: Option<String>,
    #[schema(value_type = Object)]
    pub filled_data: Json<Value>,
    pub created_by: String,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAcceptanceActRequest {
    pub form_id: i64,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub filled_data: Option<Value>,
    pub created_by: String,
}

impl CreateAcceptanceActRequest {
    pub fn data(&self) -> Value {
        self.filled_data
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default()))
    }
}

impl Validator for CreateAcceptanceActRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.created_by, "created_by", "Составил", &mut errors);
        require_container(&self.data(), "filled_data", &mut errors);
        errors.into_result()
    }
}
