use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::personnel::models::full_name;

pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExpiringKind {
    Pass,
    MedicalExam,
    PsychiatricExam,
    Insurance,
    Inspection,
}

impl ExpiringKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExpiringKind::Pass => "Пропуск",
            ExpiringKind::MedicalExam => "Медосмотр",
            ExpiringKind::PsychiatricExam => "Психиатрическое освидетельствование",
            ExpiringKind::Insurance => "Страховка",
            ExpiringKind::Inspection => "Техосмотр",
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExpiringQuery {
    /// Look-ahead window in days, 30 when omitted.
    pub days: Option<i64>,
}

/// One document of an employee or vehicle that runs out within the window.
/// Already expired documents are included with a negative `days_left`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExpiringDocument {
    pub id: i64,
    pub name: String,
    pub kind: ExpiringKind,
    pub label: String,
    #[schema(value_type = String, format = "date")]
    pub expiry_date: NaiveDate,
    pub days_left: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExpiringReport {
    pub days: i64,
    #[schema(value_type = String, format = "date")]
    pub today: NaiveDate,
    pub employees: Vec<ExpiringDocument>,
    pub vehicles: Vec<ExpiringDocument>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmployeeExpiry {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub pass_expiry: Option<NaiveDate>,
    pub medical_exam_expiry: Option<NaiveDate>,
    pub medical_exam_not_required: bool,
    pub psychiatric_exam_expiry: Option<NaiveDate>,
    pub psychiatric_exam_not_required: bool,
}

impl EmployeeExpiry {
    /// Tracked dates; exams marked as not required are skipped.
    pub fn documents(&self) -> Vec<(ExpiringKind, Option<NaiveDate>)> {
        let mut documents = vec![(ExpiringKind::Pass, self.pass_expiry)];
        if !self.medical_exam_not_required {
            documents.push((ExpiringKind::MedicalExam, self.medical_exam_expiry));
        }
        if !self.psychiatric_exam_not_required {
            documents.push((ExpiringKind::PsychiatricExam, self.psychiatric_exam_expiry));
        }
        documents
    }

    pub fn name(&self) -> String {
        full_name(&self.last_name, &self.first_name, self.middle_name.as_deref())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VehicleExpiry {
    pub id: i64,
    pub brand: String,
    pub license_plate: String,
    pub pass_expiry: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
    pub inspection_expiry: Option<NaiveDate>,
}

impl VehicleExpiry {
    pub fn documents(&self) -> Vec<(ExpiringKind, Option<NaiveDate>)> {
        vec![
            (ExpiringKind::Pass, self.pass_expiry),
            (ExpiringKind::Insurance, self.insurance_expiry),
            (ExpiringKind::Inspection, self.inspection_expiry),
        ]
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.brand, self.license_plate)
    }
}

/// Documents dated on or before `today + days`, soonest first.
pub fn expiring_documents(
    owners: impl IntoIterator<Item = (i64, String, Vec<(ExpiringKind, Option<NaiveDate>)>)>,
    today: NaiveDate,
    days: i64,
) -> Vec<ExpiringDocument> {
    let mut found: Vec<ExpiringDocument> = owners
        .into_iter()
        .flat_map(|(id, name, documents)| {
            documents
                .into_iter()
                .filter_map(move |(kind, expiry)| {
                    let expiry_date = expiry?;
                    let days_left = (expiry_date - today).num_days();
                    (days_left <= days).then(|| ExpiringDocument {
                        id,
                        name: name.clone(),
                        kind,
                        label: kind.label().to_string(),
                        expiry_date,
                        days_left,
                    })
                })
        })
        .collect();
    found.sort_by(|a, b| a.expiry_date.cmp(&b.expiry_date).then(a.id.cmp(&b.id)));
    found
}
