use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::db::{AppState, DeleteOutcome};
use crate::dictionary::models::{CreateDictionaryEntryRequest, DictionaryEntry, DictionaryKind};
use crate::documents::Validator;
use crate::{ErrorResponse, SuccessResponse};

fn parse_kind(raw: &str) -> Result<DictionaryKind, HttpResponse> {
    raw.parse::<DictionaryKind>()
        .map_err(|e| HttpResponse::NotFound().json(ErrorResponse::not_found(&e)))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Dictionaries",
    get,
    path = "/dictionaries/{kind}",
    params(
        ("kind" = String, Path, description = "departments, positions, cities, vehicle_types, vehicle_categories or airports")
    ),
    responses(
        (status = 200, description = "Dictionary entries", body = [DictionaryEntry]),
        (status = 404, description = "Unknown dictionary", body = ErrorResponse)
    )
)]
pub async fn list_entries(path: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    let kind = match parse_kind(&path) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    match state.list_dictionary(kind).await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(e) => {
            error!("Failed to list {}: {}", kind, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load dictionary"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Dictionaries",
    post,
    path = "/dictionaries/{kind}",
    request_body = CreateDictionaryEntryRequest,
    params(
        ("kind" = String, Path, description = "Dictionary name")
    ),
    responses(
        (status = 201, description = "Entry created", body = DictionaryEntry),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown dictionary", body = ErrorResponse)
    )
)]
pub async fn create_entry(
    path: web::Path<String>,
    body: web::Json<CreateDictionaryEntryRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let kind = match parse_kind(&path) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }

    let code = body.code.as_deref().map(str::trim).filter(|c| !c.is_empty());
    match state
        .insert_dictionary_entry(kind, body.name.trim(), code)
        .await
    {
        Ok(entry) => {
            info!("Added '{}' to {}", entry.name, kind);
            HttpResponse::Created().json(entry)
        }
        Err(e) => {
            error!("Failed to insert into {}: {}", kind, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to save entry"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Dictionaries",
    delete,
    path = "/dictionaries/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "Dictionary name"),
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry deleted", body = SuccessResponse),
        (status = 400, description = "Entry is still referenced", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    )
)]
pub async fn delete_entry(
    path: web::Path<(String, i64)>,
    state: web::Data<AppState>,
) -> impl Responder {
    let (raw_kind, id) = path.into_inner();
    let kind = match parse_kind(&raw_kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    match state.delete_dictionary_entry(kind, id).await {
        Ok(DeleteOutcome::Deleted) => {
            info!("Deleted {} entry {}", kind, id);
            HttpResponse::Ok().json(SuccessResponse::ok())
        }
        Ok(DeleteOutcome::NotFound) => {
            HttpResponse::NotFound().json(ErrorResponse::not_found("Entry not found"))
        }
        Ok(DeleteOutcome::InUse(count)) => HttpResponse::BadRequest().json(
            ErrorResponse::in_use(&format!("Эта запись используется в {} записях", count)),
        ),
        Err(e) => {
            error!("Failed to delete {} entry {}: {}", kind, id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to delete entry"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/dictionaries/{kind}")
            .route(web::get().to(list_entries))
            .route(web::post().to(create_entry)),
    )
    .service(
        web::resource("/dictionaries/{kind}/{id}").route(web::delete().to(delete_entry)),
    );
}
