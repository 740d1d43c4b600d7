use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::db::{is_foreign_key_violation, AppState};
use crate::files::uploads::store_template;
use crate::multipart::MultipartParser;
use crate::work_permit::models::{NextWorkPermitNumber, WorkPermit, WorkPermitForm};
use crate::{ErrorResponse, SaveResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Work Permits",
    get,
    path = "/work-permits",
    responses(
        (status = 200, description = "Work permits, newest first", body = [WorkPermit])
    )
)]
pub async fn list_work_permits(state: web::Data<AppState>) -> impl Responder {
    match state.list_work_permits().await {
        Ok(permits) => HttpResponse::Ok().json(permits),
        Err(e) => {
            error!("Failed to list work permits: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load work permits"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Work Permits",
    get,
    path = "/work-permits/next-number",
    responses(
        (status = 200, description = "Number the next permit is expected to get", body = NextWorkPermitNumber)
    )
)]
pub async fn next_number(state: web::Data<AppState>) -> impl Responder {
    match state.next_work_permit_number().await {
        Ok(number) => HttpResponse::Ok().json(NextWorkPermitNumber { number }),
        Err(e) => {
            error!("Failed to compute next work permit number: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to compute the next number"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Work Permits",
    post,
    path = "/work-permits",
    request_body(
        content_type = "multipart/form-data",
        description = "tire_type, start_date, end_date, start_time, end_time, supervisor_id, responsible_id, executor_id and an optional `template`"
    ),
    responses(
        (status = 201, description = "Permit saved with the next number", body = SaveResponse<WorkPermit>),
        (status = 400, description = "Invalid form or unknown employee", body = ErrorResponse)
    )
)]
pub async fn create_work_permit(payload: Multipart, state: web::Data<AppState>) -> impl Responder {
    let mut form = match MultipartParser::parse_form(payload, state.config.max_content_length).await
    {
        Ok(form) => form,
        Err(e) => return HttpResponse::from(e),
    };
    let permit_form = match WorkPermitForm::from_fields(&form.fields) {
        Ok(permit_form) => permit_form,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
    };

    let mut warnings = Vec::new();
    let template_path =
        store_template(&state, form.take_file("template"), "work_permits", &mut warnings).await;

    match state.insert_work_permit(&permit_form, template_path.as_deref()).await {
        Ok(permit) => {
            info!("Saved work permit {} as record {}", permit.number, permit.id);
            HttpResponse::Created().json(
                SaveResponse::new(permit, "Наряд-допуск успешно создан").with_warnings(warnings),
            )
        }
        Err(e) if is_foreign_key_violation(&e) => HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Employee not found")),
        Err(e) => {
            error!("Failed to save work permit: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при создании наряда-допуска: {}",
                e
            )))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/work-permits/next-number").route(web::get().to(next_number)))
        .service(
            web::resource("/work-permits")
                .route(web::get().to(list_work_permits))
                .route(web::post().to(create_work_permit)),
        );
}
