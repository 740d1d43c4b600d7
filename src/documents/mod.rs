//! Documents module - fills uploaded `.docx` / `.xlsx` templates from form data.
//!
//! The path from a form to a stored file:
//! - `adapters` turn raw form fields into a flat [`DocumentData`] per document kind
//! - `docx` / `xlsx` replace `{{KEY}}` tags in a template with that data
//! - `generator` ties both together and persists the output through storage
//!
//! Rendering is a pure function of template bytes and data; nothing is shared
//! between generations and templates are never modified.

pub mod adapters;
pub mod docx;
pub mod electricity;
pub mod fields;
pub mod generator;
pub mod package;
pub mod tags;
pub mod traits;
pub mod value;
pub mod xlsx;
pub mod xml;

pub use adapters::{adapt, AdapterError, DocumentAdapter};
pub use docx::RowSet;
pub use fields::{FieldValue, RawFields};
pub use generator::DocumentGenerator;
pub use traits::{Generator, Validator};
pub use value::{DocumentData, TagValue};

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// How tags are located in word-processor paragraphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Each run is matched on its own; run formatting is kept.
    #[default]
    Run,
    /// The paragraph's text is matched as a whole and written back into its
    /// first run, which then carries the formatting for the whole paragraph.
    Paragraph,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub mode: MatchMode,
    /// Fail when a `{{KEY}}` is still present after substitution.
    pub strict: bool,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template is not a readable package: {0}")]
    Package(String),
    #[error("template is missing part {0}")]
    MissingPart(String),
    #[error("template is malformed: {0}")]
    Malformed(String),
    #[error(transparent)]
    Xml(#[from] xml::XmlError),
    #[error("unresolved tags: {}", .0.join(", "))]
    UnresolvedTags(Vec<String>),
    #[error("unsupported template format: {0}")]
    UnsupportedFormat(String),
}

/// Errors that can occur during document generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("invalid form data: {0}")]
    Adapter(#[from] AdapterError),
    #[error("failed to load template {path}: {source}")]
    TemplateLoad {
        path: String,
        #[source]
        source: crate::storage::StorageError,
    },
    #[error("failed to render template: {0}")]
    Render(#[from] TemplateError),
    #[error("failed to store generated document: {0}")]
    Store(#[source] crate::storage::StorageError),
}

/// The kinds of documents generated from templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PassRequest,
    Ttn,
    ShiftRequest,
}

impl DocumentKind {
    /// Directory under `generated/` and file-name prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::PassRequest => "pass_request",
            DocumentKind::Ttn => "ttn",
            DocumentKind::ShiftRequest => "shift_request",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::PassRequest | DocumentKind::Ttn => "docx",
            DocumentKind::ShiftRequest => "xlsx",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful document generation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    pub filename: String,
    /// Storage-relative path, e.g. `generated/ttn/ttn_....docx`.
    pub path: String,
}
