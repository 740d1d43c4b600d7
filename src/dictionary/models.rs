use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::documents::Validator;
use crate::validators::{validate_required, ValidationErrors};

/// Plain name lists used as select options across the forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DictionaryKind {
    Departments,
    Positions,
    Cities,
    VehicleTypes,
    VehicleCategories,
    Airports,
}

impl DictionaryKind {
    pub const ALL: [DictionaryKind; 6] = [
        DictionaryKind::Departments,
        DictionaryKind::Positions,
        DictionaryKind::Cities,
        DictionaryKind::VehicleTypes,
        DictionaryKind::VehicleCategories,
        DictionaryKind::Airports,
    ];

    /// Table name; also the path segment under `/api/dictionaries`.
    pub fn table(&self) -> &'static str {
        match self {
            DictionaryKind::Departments => "departments",
            DictionaryKind::Positions => "positions",
            DictionaryKind::Cities => "cities",
            DictionaryKind::VehicleTypes => "vehicle_types",
            DictionaryKind::VehicleCategories => "vehicle_categories",
            DictionaryKind::Airports => "airports",
        }
    }

    pub fn has_code(&self) -> bool {
        matches!(self, DictionaryKind::Airports)
    }
}

impl fmt::Display for DictionaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for DictionaryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        DictionaryKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.table() == normalized)
            .ok_or_else(|| format!("Unknown dictionary '{}'", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct DictionaryEntry {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Транспортный отдел")]
    pub name: String,
    /// Only airports carry a code
    #[schema(example = "SVO")]
    pub code: Option<String>,
    #[schema(value_type = String, example = "2025-01-10T08:30:00")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDictionaryEntryRequest {
    #[schema(example = "Склад")]
    pub name: String,
    pub code: Option<String>,
}

impl Validator for CreateDictionaryEntryRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.name, "name", "Название", &mut errors);
        errors.into_result()
    }
}
