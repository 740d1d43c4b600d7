use actix_files::NamedFile;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, warn};

use crate::db::AppState;
use crate::ErrorResponse;

/// Serves a stored file (photos, templates, generated documents) by its
/// storage-relative path.
#[utoipa::path(
    tag = "Files",
    get,
    path = "/storage/{path}",
    params(("path" = String, Path, description = "Storage-relative path, e.g. generated/ttn/ttn_1.docx")),
    responses(
        (status = 200, description = "File contents"),
        (status = 400, description = "Path escapes the storage root", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
pub async fn serve_file(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let relative = path.into_inner();
    let resolved = match state.storage.resolve(&relative) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!("Refused storage path '{}': {}", relative, e);
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request("Invalid path"));
        }
    };

    match NamedFile::open_async(&resolved).await {
        Ok(file) => {
            debug!("Serving {}", resolved.display());
            file.into_response(&req)
        }
        Err(_) => HttpResponse::NotFound().json(ErrorResponse::not_found("File not found")),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/storage/{path:.*}", web::get().to(serve_file));
}
