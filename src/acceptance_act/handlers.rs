use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::acceptance_act::models::{
    AcceptanceAct, AcceptanceActForm, CreateAcceptanceActRequest, SaveAcceptanceActFormRequest,
};
use crate::db::{is_foreign_key_violation, AppState};
use crate::documents::Validator;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Acceptance Acts",
    get,
    path = "/acceptance-acts/forms",
    operation_id = "list_acceptance_act_forms",
    responses(
        (status = 200, description = "Acceptance act forms", body = [AcceptanceActForm])
    )
)]
pub async fn list_forms(state: web::Data<AppState>) -> impl Responder {
    match state.list_acceptance_act_forms().await {
        Ok(forms) => HttpResponse::Ok().json(forms),
        Err(e) => {
            error!("Failed to list acceptance act forms: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load acceptance act forms"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Acceptance Acts",
    post,
    path = "/acceptance-acts/forms",
    operation_id = "create_acceptance_act_form",
    request_body = SaveAcceptanceActFormRequest,
    responses(
        (status = 201, description = "Form created", body = AcceptanceActForm),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_form(
    body: web::Json<SaveAcceptanceActFormRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.insert_acceptance_act_form(&body).await {
        Ok(form) => {
            info!("Created acceptance act form {} '{}'", form.id, form.name);
            HttpResponse::Created().json(form)
        }
        Err(e) => {
            error!("Failed to save acceptance act form: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при создании формы акта: {}",
                e
            )))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Acceptance Acts",
    get,
    path = "/acceptance-acts",
    responses(
        (status = 200, description = "Acceptance acts, newest first", body = [AcceptanceAct])
    )
)]
pub async fn list_acts(state: web::Data<AppState>) -> impl Responder {
    match state.list_acceptance_acts().await {
        Ok(acts) => HttpResponse::Ok().json(acts),
        Err(e) => {
            error!("Failed to list acceptance acts: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load acceptance acts"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Acceptance Acts",
    post,
    path = "/acceptance-acts",
    request_body = CreateAcceptanceActRequest,
    responses(
        (status = 201, description = "Act filled", body = AcceptanceAct),
        (status = 400, description = "Invalid request or unknown form", body = ErrorResponse)
    )
)]
pub async fn create_act(
    body: web::Json<CreateAcceptanceActRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.insert_acceptance_act(&body).await {
        Ok(act) => {
            info!(
                "Acceptance act {} drawn up by {} on form '{}'",
                act.id, act.created_by, act.form_name
            );
            HttpResponse::Created().json(act)
        }
        Err(e) if is_foreign_key_violation(&e) => HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Acceptance act form not found")),
        Err(e) => {
            error!("Failed to save acceptance act: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при составлении акта: {}",
                e
            )))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/acceptance-acts/forms")
            .route(web::get().to(list_forms))
            .route(web::post().to(create_form)),
    )
    .service(
        web::resource("/acceptance-acts")
            .route(web::get().to(list_acts))
            .route(web::post().to(create_act)),
    );
}
