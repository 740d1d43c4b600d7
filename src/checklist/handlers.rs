use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::checklist::models::{
    Checklist, ChecklistForm, CreateChecklistRequest, SaveChecklistFormRequest,
};
use crate::db::{is_foreign_key_violation, AppState};
use crate::documents::Validator;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Checklists",
    get,
    path = "/checklists/forms",
    responses(
        (status = 200, description = "Checklist forms", body = [ChecklistForm])
    )
)]
pub async fn list_forms(state: web::Data<AppState>) -> impl Responder {
    match state.list_checklist_forms().await {
        Ok(forms) => HttpResponse::Ok().json(forms),
        Err(e) => {
            error!("Failed to list checklist forms: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load checklist forms"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Checklists",
    post,
    path = "/checklists/forms",
    request_body = SaveChecklistFormRequest,
    responses(
        (status = 201, description = "Form created", body = ChecklistForm),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_form(
    body: web::Json<SaveChecklistFormRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.insert_checklist_form(&body).await {
        Ok(form) => {
            info!("Created checklist form {} '{}'", form.id, form.name);
            HttpResponse::Created().json(form)
        }
        Err(e) => {
            error!("Failed to save checklist form: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при создании формы: {}",
                e
            )))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Checklists",
    put,
    path = "/checklists/forms/{id}",
    params(("id" = i64, Path, description = "Checklist form ID")),
    request_body = SaveChecklistFormRequest,
    responses(
        (status = 200, description = "Form updated", body = ChecklistForm),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Form not found", body = ErrorResponse)
    )
)]
pub async fn update_form(
    path: web::Path<i64>,
    body: web::Json<SaveChecklistFormRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let id = path.into_inner();
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.update_checklist_form(id, &body).await {
        Ok(Some(form)) => {
            info!("Updated checklist form {}", id);
            HttpResponse::Ok().json(form)
        }
        Ok(None) => HttpResponse::NotFound()
            .json(ErrorResponse::not_found("Checklist form not found")),
        Err(e) => {
            error!("Failed to update checklist form {}: {}", id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при обновлении формы: {}",
                e
            )))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Checklists",
    get,
    path = "/checklists",
    responses(
        (status = 200, description = "Filled checklists, newest first", body = [Checklist])
    )
)]
pub async fn list_checklists(state: web::Data<AppState>) -> impl Responder {
    match state.list_checklists().await {
        Ok(checklists) => HttpResponse::Ok().json(checklists),
        Err(e) => {
            error!("Failed to list checklists: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load checklists"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Checklists",
    post,
    path = "/checklists",
    request_body = CreateChecklistRequest,
    responses(
        (status = 201, description = "Checklist filled", body = Checklist),
        (status = 400, description = "Invalid request or unknown form", body = ErrorResponse)
    )
)]
pub async fn create_checklist(
    body: web::Json<CreateChecklistRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.insert_checklist(&body).await {
        Ok(checklist) => {
            info!(
                "Checklist {} filled by {} on form '{}'",
                checklist.id, checklist.created_by, checklist.form_name
            );
            HttpResponse::Created().json(checklist)
        }
        Err(e) if is_foreign_key_violation(&e) => HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Checklist form not found")),
        Err(e) => {
            error!("Failed to save checklist: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при заполнении чек-листа: {}",
                e
            )))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/checklists/forms")
            .route(web::get().to(list_forms))
            .route(web::post().to(create_form)),
    )
    .service(web::resource("/checklists/forms/{id}").route(web::put().to(update_form)))
    .service(
        web::resource("/checklists")
            .route(web::get().to(list_checklists))
            .route(web::post().to(create_checklist)),
    );
}
