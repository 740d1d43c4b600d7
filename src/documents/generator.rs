//! Generation boundary: adapt form fields, render the template, persist.

use chrono::Local;
use log::{debug, error, info};
use sanitize_filename::sanitize;
use std::sync::Arc;
use uuid::Uuid;

use super::adapters::{adapt, Adapted, DocumentAdapter, ShiftKind, ShiftRequestDocument};
use super::docx::render_docx;
use super::fields::RawFields;
use super::traits::Generator;
use super::xlsx::render_xlsx;
use super::{DocumentKind, GeneratedDocument, GeneratorError, RenderOptions};
use crate::storage::FileStorage;

/// One generation request: the kind of document and its raw form fields.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: DocumentKind,
    pub fields: RawFields,
}

/// Fills a single stored template and writes the result under `generated/`.
pub struct DocumentGenerator {
    storage: Arc<dyn FileStorage>,
    template_path: String,
    options: RenderOptions,
}

impl DocumentGenerator {
    pub fn new(storage: Arc<dyn FileStorage>, template_path: impl Into<String>) -> Self {
        Self {
            storage,
            template_path: template_path.into(),
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn template_path(&self) -> &str {
        &self.template_path
    }

    pub fn generate_pass_request(
        &self,
        fields: &RawFields,
        request_type: &str,
    ) -> Result<GeneratedDocument, GeneratorError> {
        let mut fields = fields.clone();
        fields.insert("request_type", request_type);
        self.generate(GenerationRequest {
            kind: DocumentKind::PassRequest,
            fields,
        })
    }

    pub fn generate_ttn(&self, fields: &RawFields) -> Result<GeneratedDocument, GeneratorError> {
        self.generate(GenerationRequest {
            kind: DocumentKind::Ttn,
            fields: fields.clone(),
        })
    }

    pub fn generate_shift_request(
        &self,
        fields: &RawFields,
        kind: ShiftKind,
    ) -> Result<GeneratedDocument, GeneratorError> {
        let document = ShiftRequestDocument::from_kind(kind, fields)?;
        self.produce(Adapted {
            kind: DocumentKind::ShiftRequest,
            label: document.label(),
            data: document.to_data(),
            row_sets: Vec::new(),
        })
    }

    /// Runs `generate` and turns a failure into `None` after logging it.
    pub fn generate_or_log(&self, request: GenerationRequest) -> Option<GeneratedDocument> {
        let kind = request.kind;
        match self.generate(request) {
            Ok(doc) => Some(doc),
            Err(e) => {
                error!(
                    "Failed to generate {} from {}: {}",
                    kind, self.template_path, e
                );
                None
            }
        }
    }

    fn produce(&self, adapted: Adapted) -> Result<GeneratedDocument, GeneratorError> {
        let template = self
            .storage
            .read(&self.template_path)
            .map_err(|source| GeneratorError::TemplateLoad {
                path: self.template_path.clone(),
                source,
            })?;
        debug!(
            "Rendering {} with {} tags from {}",
            adapted.kind,
            adapted.data.len(),
            self.template_path
        );

        let bytes = match adapted.kind.extension() {
            "xlsx" => render_xlsx(&template, &adapted.data, self.options)?,
            _ => render_docx(&template, &adapted.data, &adapted.row_sets, self.options)?,
        };

        let filename = output_filename(adapted.kind, &adapted.label);
        let path = self
            .storage
            .save_generated_document(&bytes, &filename, adapted.kind.as_str())
            .map_err(GeneratorError::Store)?;
        info!("Generated {} document {}", adapted.kind, path);

        Ok(GeneratedDocument {
            kind: adapted.kind,
            filename,
            path,
        })
    }
}

impl Generator<GenerationRequest> for DocumentGenerator {
    fn generate(&self, request: GenerationRequest) -> Result<GeneratedDocument, GeneratorError> {
        let adapted = adapt(request.kind, &request.fields)?;
        self.produce(adapted)
    }
}

/// Longest label kept in a generated file name, in characters.
pub const MAX_LABEL_CHARS: usize = 64;

/// `<kind>_<label>_<YYYYmmdd_HHMMSS>_<8 hex>.<ext>`, sanitized. The label is
/// cut to [`MAX_LABEL_CHARS`] so the stamp, token and extension always fit.
pub fn output_filename(kind: DocumentKind, label: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    let label: String = sanitize(label.replace(' ', "_"))
        .chars()
        .take(MAX_LABEL_CHARS)
        .collect();
    let label = if label.is_empty() { "document".to_string() } else { label };
    sanitize(format!(
        "{}_{}_{}_{}.{}",
        kind.as_str(),
        label,
        Local::now().format("%Y%m%d_%H%M%S"),
        &token[..8],
        kind.extension()
    ))
}
