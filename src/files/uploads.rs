//! Template upload and generation steps shared by the request handlers.
//!
//! Both steps are best effort: a failure is logged, turned into a warning for
//! the response and the business record is saved regardless.

use actix_web::web;
use log::{error, warn};

use crate::db::AppState;
use crate::documents::generator::GenerationRequest;
use crate::documents::{DocumentGenerator, GeneratedDocument};
use crate::multipart::UploadedFile;

pub const TEMPLATE_FAILED: &str = "Не удалось сохранить шаблон";
pub const GENERATION_FAILED: &str = "Не удалось сформировать документ по шаблону";

/// Saves an uploaded template under `templates/`, returning its path.
pub async fn store_template(
    state: &AppState,
    template: Option<UploadedFile>,
    template_type: &'static str,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let template = template?;
    let storage = state.storage.clone();
    match web::block(move || {
        storage.save_template(&template.bytes, &template.filename, template_type)
    })
    .await
    {
        Ok(Ok(path)) => Some(path),
        Ok(Err(e)) => {
            error!("Failed to save {} template: {}", template_type, e);
            warnings.push(TEMPLATE_FAILED.to_string());
            None
        }
        Err(e) => {
            error!("Template save task failed: {}", e);
            warnings.push(TEMPLATE_FAILED.to_string());
            None
        }
    }
}

/// Fills the stored template at `template_path` off the async runtime.
pub async fn generate_document(
    state: &AppState,
    template_path: &str,
    request: GenerationRequest,
    warnings: &mut Vec<String>,
) -> Option<GeneratedDocument> {
    let generator = DocumentGenerator::new(state.storage.clone(), template_path);
    match web::block(move || generator.generate_or_log(request)).await {
        Ok(Some(document)) => Some(document),
        Ok(None) => {
            warnings.push(GENERATION_FAILED.to_string());
            None
        }
        Err(e) => {
            warn!("Generation task failed for {}: {}", template_path, e);
            warnings.push(GENERATION_FAILED.to_string());
            None
        }
    }
}
