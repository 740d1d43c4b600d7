use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info};

use crate::db::AppState;
use crate::documents::generator::GenerationRequest;
use crate::documents::{DocumentKind, RawFields};
use crate::files::uploads::{generate_document, store_template, GENERATION_FAILED};
use crate::multipart::MultipartParser;
use crate::pass_request::models::{PassRequest, PassRequestDetail, PassRequestForm};
use crate::{ErrorResponse, SaveResponse};

/// Display names printed on the document and returned with a request.
struct ResolvedNames {
    posts: Vec<String>,
    employees: Vec<String>,
    vehicles: Vec<String>,
}

async fn resolve_names(
    state: &AppState,
    post_ids: &[i64],
    employee_ids: &[i64],
    vehicle_ids: &[i64],
) -> Result<ResolvedNames, sqlx::Error> {
    Ok(ResolvedNames {
        posts: state.post_names(post_ids).await?,
        employees: state.employee_full_names(employee_ids).await?,
        vehicles: state.vehicle_plates(vehicle_ids).await?,
    })
}

/// Fields handed to the pass request adapter.
fn document_fields(form: &PassRequestForm, names: ResolvedNames) -> RawFields {
    let mut fields = RawFields::new();
    fields.insert("request_type", form.request_type.as_str());
    fields.insert("start_date", form.start_date.format("%Y-%m-%d").to_string());
    fields.insert("end_date", form.end_date.format("%Y-%m-%d").to_string());
    fields.insert("formed_by", form.formed_by.as_str());
    fields.insert("purpose", form.purpose.clone().unwrap_or_default());
    fields.insert_list("posts", names.posts);
    fields.insert_list("employees", names.employees);
    fields.insert_list("vehicles", names.vehicles);
    fields
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pass Requests",
    get,
    path = "/pass-requests",
    responses(
        (status = 200, description = "All pass requests, newest first", body = [PassRequest])
    )
)]
pub async fn list_pass_requests(state: web::Data<AppState>) -> impl Responder {
    match state.list_pass_requests().await {
        Ok(requests) => HttpResponse::Ok().json(requests),
        Err(e) => {
            error!("Failed to list pass requests: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load pass requests"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pass Requests",
    get,
    path = "/pass-requests/{id}",
    params(("id" = i64, Path, description = "Pass request ID")),
    responses(
        (status = 200, description = "Pass request with resolved names", body = PassRequestDetail),
        (status = 404, description = "Pass request not found", body = ErrorResponse)
    )
)]
pub async fn get_pass_request(path: web::Path<i64>, state: web::Data<AppState>) -> impl Responder {
    let id = path.into_inner();
    let request = match state.get_pass_request(id).await {
        Ok(Some(request)) => request,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::not_found("Pass request not found"))
        }
        Err(e) => {
            error!("Failed to load pass request {}: {}", id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load pass request"));
        }
    };
    match resolve_names(
        &state,
        &request.post_ids,
        &request.employee_ids,
        &request.vehicle_ids,
    )
    .await
    {
        Ok(names) => HttpResponse::Ok().json(PassRequestDetail {
            request,
            posts: names.posts,
            employees: names.employees,
            vehicles: names.vehicles,
        }),
        Err(e) => {
            error!("Failed to resolve names for pass request {}: {}", id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load pass request"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Pass Requests",
    post,
    path = "/pass-requests",
    request_body(
        content_type = "multipart/form-data",
        description = "request_type, start_date, end_date, formed_by, purpose, contract_id, inn_id, agreement_person_id, is_one_time, repeated posts/employees/vehicles ids and an optional `template` (.docx)"
    ),
    responses(
        (status = 201, description = "Pass request saved; warnings list generation problems", body = SaveResponse<PassRequest>),
        (status = 400, description = "Invalid form", body = ErrorResponse)
    )
)]
pub async fn create_pass_request(payload: Multipart, state: web::Data<AppState>) -> impl Responder {
    let mut form = match MultipartParser::parse_form(payload, state.config.max_content_length).await
    {
        Ok(form) => form,
        Err(e) => return HttpResponse::from(e),
    };
    let request_form = match PassRequestForm::from_fields(&form.fields) {
        Ok(request_form) => request_form,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
    };
    info!(
        "Creating {} pass request for {} employees and {} vehicles",
        request_form.request_type,
        request_form.employee_ids.len(),
        request_form.vehicle_ids.len()
    );

    let mut warnings = Vec::new();
    let template_path =
        store_template(&state, form.take_file("template"), "pass_requests", &mut warnings).await;

    let mut generated_path = None;
    if let Some(template_path) = &template_path {
        match resolve_names(
            &state,
            &request_form.post_ids,
            &request_form.employee_ids,
            &request_form.vehicle_ids,
        )
        .await
        {
            Ok(names) => {
                debug!(
                    "Resolved {} posts, {} employees, {} vehicles",
                    names.posts.len(),
                    names.employees.len(),
                    names.vehicles.len()
                );
                let generation = GenerationRequest {
                    kind: DocumentKind::PassRequest,
                    fields: document_fields(&request_form, names),
                };
                generated_path =
                    generate_document(&state, template_path, generation, &mut warnings)
                        .await
                        .map(|document| document.path);
            }
            Err(e) => {
                error!("Failed to resolve names for the pass request document: {}", e);
                warnings.push(GENERATION_FAILED.to_string());
            }
        }
    }

    match state
        .insert_pass_request(
            &request_form,
            template_path.as_deref(),
            generated_path.as_deref(),
        )
        .await
    {
        Ok(request) => {
            info!("Saved pass request {}", request.id);
            HttpResponse::Created().json(
                SaveResponse::new(request, "Заявка на пропуск успешно создана")
                    .with_warnings(warnings),
            )
        }
        Err(e) => {
            error!("Failed to save pass request: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при создании заявки: {}",
                e
            )))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/pass-requests")
            .route(web::get().to(list_pass_requests))
            .route(web::post().to(create_pass_request)),
    )
    .service(web::resource("/pass-requests/{id}").route(web::get().to(get_pass_request)));
}
