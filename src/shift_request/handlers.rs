use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info, warn};

use crate::db::AppState;
use crate::dictionary::models::DictionaryKind;
use crate::documents::adapters::ShiftKind;
use crate::documents::generator::GenerationRequest;
use crate::documents::{DocumentKind, RawFields};
use crate::files::uploads::{generate_document, store_template, GENERATION_FAILED};
use crate::multipart::MultipartParser;
use crate::shift_request::models::{ShiftRequest, ShiftRequestForm};
use crate::{ErrorResponse, SaveResponse};

async fn airport_name(state: &AppState, id: Option<i64>) -> Result<String, sqlx::Error> {
    match id {
        Some(id) => Ok(state
            .dictionary_names(DictionaryKind::Airports, &[id])
            .await?
            .into_iter()
            .next()
            .unwrap_or_default()),
        None => Ok(String::new()),
    }
}

/// Fields handed to the shift request adapter, airports resolved to names.
async fn document_fields(
    state: &AppState,
    form: &ShiftRequestForm,
) -> Result<RawFields, sqlx::Error> {
    let mut fields = RawFields::new();
    fields.insert("request_type", form.kind.as_str());
    let date = form
        .flight_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    fields.insert("flight_date", date.as_str());
    if form.kind == ShiftKind::AutoDelivery {
        fields.insert("request_date", date);
    }
    fields.insert(
        "departure_airport",
        airport_name(state, form.departure_airport_id).await?,
    );
    fields.insert(
        "arrival_airport",
        airport_name(state, form.arrival_airport_id).await?,
    );
    for (name, value) in [
        ("flight_number", &form.flight_number),
        ("preliminary_cost", &form.preliminary_cost),
        ("auto_delivery_from", &form.auto_delivery_from),
        ("auto_delivery_to", &form.auto_delivery_to),
    ] {
        fields.insert(name, value.clone().unwrap_or_default());
    }
    Ok(fields)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Shift Requests",
    get,
    path = "/shift-requests",
    responses(
        (status = 200, description = "All shift requests, newest first", body = [ShiftRequest])
    )
)]
pub async fn list_shift_requests(state: web::Data<AppState>) -> impl Responder {
    match state.list_shift_requests().await {
        Ok(requests) => HttpResponse::Ok().json(requests),
        Err(e) => {
            error!("Failed to list shift requests: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load shift requests"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Shift Requests",
    post,
    path = "/shift-requests/{kind}",
    params(("kind" = String, Path, description = "charter, regular or auto")),
    request_body(
        content_type = "multipart/form-data",
        description = "flight_date (request_date for auto), departure_airport_id, arrival_airport_id, contract_id, flight_number, preliminary_cost, auto_delivery_from, auto_delivery_to, formed_by, repeated employees ids and an optional `template` (.xlsx)"
    ),
    responses(
        (status = 201, description = "Shift request saved; warnings list generation problems", body = SaveResponse<ShiftRequest>),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 404, description = "Unknown shift request kind", body = ErrorResponse)
    )
)]
pub async fn create_shift_request(
    path: web::Path<String>,
    payload: Multipart,
    state: web::Data<AppState>,
) -> impl Responder {
    let kind: ShiftKind = match path.parse() {
        Ok(kind) => kind,
        Err(e) => {
            warn!("Rejected shift request kind '{}': {}", path, e);
            return HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
                "Unknown shift request kind '{}'",
                path
            )));
        }
    };
    let mut form = match MultipartParser::parse_form(payload, state.config.max_content_length).await
    {
        Ok(form) => form,
        Err(e) => return HttpResponse::from(e),
    };
    let request_form = match ShiftRequestForm::from_fields(kind, &form.fields) {
        Ok(request_form) => request_form,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
    };
    info!(
        "Creating {} shift request for {} employees",
        kind,
        request_form.employee_ids.len()
    );

    let mut warnings = Vec::new();
    let template_path =
        store_template(&state, form.take_file("template"), "shift_requests", &mut warnings).await;

    let mut generated_path = None;
    if let Some(template_path) = &template_path {
        match document_fields(&state, &request_form).await {
            Ok(fields) => {
                debug!("Shift request document gets {} fields", fields.iter().count());
                let generation = GenerationRequest {
                    kind: DocumentKind::ShiftRequest,
                    fields,
                };
                generated_path =
                    generate_document(&state, template_path, generation, &mut warnings)
                        .await
                        .map(|document| document.path);
            }
            Err(e) => {
                error!("Failed to resolve airports for the shift request document: {}", e);
                warnings.push(GENERATION_FAILED.to_string());
            }
        }
    }

    match state
        .insert_shift_request(
            &request_form,
            template_path.as_deref(),
            generated_path.as_deref(),
        )
        .await
    {
        Ok(request) => {
            info!("Saved {} shift request {}", kind, request.id);
            HttpResponse::Created().json(
                SaveResponse::new(request, "Заявка на перевахтовку успешно создана")
                    .with_warnings(warnings),
            )
        }
        Err(e) => {
            error!("Failed to save shift request: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при создании заявки: {}",
                e
            )))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/shift-requests").route(web::get().to(list_shift_requests)))
        .service(
            web::resource("/shift-requests/{kind}").route(web::post().to(create_shift_request)),
        );
}
