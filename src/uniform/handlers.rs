use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use log::{debug, error, info};

use crate::db::{is_foreign_key_violation, AppState};
use crate::documents::Validator;
use crate::uniform::models::{
    expires_within, expiry_date, requirements, CreateNormRequest, CreateUniformTypeRequest,
    EmployeeUniform, IssueUniformRequest, PositionUniform, UniformAccounting, UniformRequirement,
    UniformType, EXPIRING_WINDOW_DAYS,
};
use crate::ErrorResponse;

fn load_failed(what: &str, e: sqlx::Error) -> HttpResponse {
    error!("Failed to load {}: {}", what, e);
    HttpResponse::InternalServerError()
        .json(ErrorResponse::internal_error(&format!("Failed to load {}", what)))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Uniforms",
    get,
    path = "/uniform-types",
    responses(
        (status = 200, description = "Uniform types", body = [UniformType])
    )
)]
pub async fn list_uniform_types(state: web::Data<AppState>) -> impl Responder {
    match state.list_uniform_types().await {
        Ok(types) => HttpResponse::Ok().json(types),
        Err(e) => load_failed("uniform types", e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Uniforms",
    post,
    path = "/uniform-types",
    request_body = CreateUniformTypeRequest,
    responses(
        (status = 201, description = "Uniform type created", body = UniformType),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_uniform_type(
    body: web::Json<CreateUniformTypeRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.insert_uniform_type(&body).await {
        Ok(uniform_type) => {
            info!("Created uniform type {} '{}'", uniform_type.id, uniform_type.name);
            HttpResponse::Created().json(uniform_type)
        }
        Err(e) => {
            error!("Failed to save uniform type: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to save uniform type"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Uniforms",
    post,
    path = "/uniforms/issue",
    request_body = IssueUniformRequest,
    responses(
        (status = 201, description = "Uniform issued; expiry follows the wear period", body = EmployeeUniform),
        (status = 400, description = "Invalid request or unknown employee / uniform type", body = ErrorResponse)
    )
)]
pub async fn issue_uniform(
    body: web::Json<IssueUniformRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let issue = match body.parse() {
        Ok(issue) => issue,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
    };
    let uniform_type = match state.get_uniform_type(issue.uniform_type_id).await {
        Ok(Some(uniform_type)) => uniform_type,
        Ok(None) => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request("Unknown uniform type"))
        }
        Err(e) => return load_failed("uniform type", e),
    };

    let expiry = expiry_date(issue.issue_date, uniform_type.wear_period);
    debug!(
        "Issuing {} x '{}' to employee {}, expires {:?}",
        issue.quantity, uniform_type.name, issue.employee_id, expiry
    );
    match state.insert_uniform_issue(&issue, expiry).await {
        Ok(issued) => {
            info!("Issued uniform {} to {}", issued.id, issued.employee_name);
            HttpResponse::Created().json(issued)
        }
        Err(e) if is_foreign_key_violation(&e) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request("Unknown employee"))
        }
        Err(e) => {
            error!("Failed to issue uniform: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при выдаче спецодежды: {}",
                e
            )))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Uniforms",
    get,
    path = "/uniforms/accounting",
    responses(
        (status = 200, description = "Issued uniforms with totals", body = UniformAccounting)
    )
)]
pub async fn uniform_accounting(state: web::Data<AppState>) -> impl Responder {
    let uniform_types = match state.list_uniform_types().await {
        Ok(types) => types,
        Err(e) => return load_failed("uniform types", e),
    };
    let issues = match state.list_uniform_issues().await {
        Ok(issues) => issues,
        Err(e) => return load_failed("uniform issues", e),
    };

    let today = Local::now().date_naive();
    let expiring_soon = issues
        .iter()
        .filter(|issue| expires_within(issue.expiry_date, today, EXPIRING_WINDOW_DAYS))
        .count() as i64;
    HttpResponse::Ok().json(UniformAccounting {
        total_issued: issues.len() as i64,
        expiring_soon,
        uniform_types,
        issues,
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Uniforms",
    get,
    path = "/uniforms/norms",
    responses(
        (status = 200, description = "Uniform norms per position", body = [PositionUniform])
    )
)]
pub async fn list_norms(state: web::Data<AppState>) -> impl Responder {
    match state.list_uniform_norms().await {
        Ok(norms) => HttpResponse::Ok().json(norms),
        Err(e) => load_failed("uniform norms", e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Uniforms",
    post,
    path = "/uniforms/norms",
    request_body = CreateNormRequest,
    responses(
        (status = 201, description = "Norm created", body = PositionUniform),
        (status = 400, description = "Invalid request or unknown position / uniform type", body = ErrorResponse)
    )
)]
pub async fn create_norm(
    body: web::Json<CreateNormRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.insert_uniform_norm(&body).await {
        Ok(norm) => {
            info!(
                "Norm for '{}': {} x '{}'",
                norm.position_name, norm.quantity, norm.uniform_type_name
            );
            HttpResponse::Created().json(norm)
        }
        Err(e) if is_foreign_key_violation(&e) => HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("Unknown position or uniform type")),
        Err(e) => {
            error!("Failed to save uniform norm: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to save uniform norm"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Uniforms",
    get,
    path = "/uniforms/requirements",
    responses(
        (status = 200, description = "Positions and uniform types with a shortage", body = [UniformRequirement])
    )
)]
pub async fn uniform_requirements(state: web::Data<AppState>) -> impl Responder {
    let today = Local::now().date_naive();
    match state.uniform_norm_usage(today).await {
        Ok(usage) => HttpResponse::Ok().json(requirements(usage)),
        Err(e) => load_failed("uniform requirements", e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/uniform-types")
            .route(web::get().to(list_uniform_types))
            .route(web::post().to(create_uniform_type)),
    )
    .service(web::resource("/uniforms/issue").route(web::post().to(issue_uniform)))
    .service(web::resource("/uniforms/accounting").route(web::get().to(uniform_accounting)))
    .service(
        web::resource("/uniforms/norms")
            .route(web::get().to(list_norms))
            .route(web::post().to(create_norm)),
    )
    .service(web::resource("/uniforms/requirements").route(web::get().to(uniform_requirements)));
}
