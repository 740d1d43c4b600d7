use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::daily_request::models::{CreateDailyRequest, DailyRequest};
use crate::db::AppState;
use crate::documents::Validator;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Daily Requests",
    get,
    path = "/daily-requests",
    responses(
        (status = 200, description = "Daily requests, latest date first", body = [DailyRequest])
    )
)]
pub async fn list_daily_requests(state: web::Data<AppState>) -> impl Responder {
    match state.list_daily_requests().await {
        Ok(requests) => HttpResponse::Ok().json(requests),
        Err(e) => {
            error!("Failed to list daily requests: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load daily requests"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Daily Requests",
    post,
    path = "/daily-requests",
    request_body = CreateDailyRequest,
    responses(
        (status = 201, description = "Daily request created", body = DailyRequest),
        (status = 400, description = "Invalid request or unknown driver", body = ErrorResponse)
    )
)]
pub async fn create_daily_request(
    body: web::Json<CreateDailyRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.missing_employee_ids(&body.driver_ids()).await {
        Ok(missing) if !missing.is_empty() => {
            let ids: Vec<String> = missing.iter().map(i64::to_string).collect();
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
                "Водитель не найден: {}",
                ids.join(", ")
            )));
        }
        Ok(_) => {}
        Err(e) => {
            error!("Failed to check drivers: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to check drivers"));
        }
    }
    match state.insert_daily_request(&body).await {
        Ok(request) => {
            info!(
                "Daily request {} for {} with {} vehicles",
                request.id,
                request.date,
                request.vehicles_data.len()
            );
            HttpResponse::Created().json(request)
        }
        Err(e) => {
            error!("Failed to save daily request: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при создании заявки: {}",
                e
            )))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/daily-requests")
            .route(web::get().to(list_daily_requests))
            .route(web::post().to(create_daily_request)),
    );
}
