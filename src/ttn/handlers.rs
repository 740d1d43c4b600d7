use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::db::AppState;
use crate::documents::generator::GenerationRequest;
use crate::documents::DocumentKind;
use crate::files::uploads::{generate_document, store_template};
use crate::multipart::MultipartParser;
use crate::ttn::models::{Ttn, TtnForm};
use crate::{ErrorResponse, SaveResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "TTN",
    get,
    path = "/ttns",
    responses(
        (status = 200, description = "All bills of lading, newest first", body = [Ttn])
    )
)]
pub async fn list_ttns(state: web::Data<AppState>) -> impl Responder {
    match state.list_ttns().await {
        Ok(ttns) => HttpResponse::Ok().json(ttns),
        Err(e) => {
            error!("Failed to list TTNs: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load TTNs"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "TTN",
    post,
    path = "/ttns",
    request_body(
        content_type = "multipart/form-data",
        description = "date, sender/receiver organizations, places_count, cargo_weight, addresses, loading_time, sender/carrier details, vehicle_info, waybill_number, trailer_info, cargo_list and an optional `template` (.docx)"
    ),
    responses(
        (status = 201, description = "TTN saved with the next number; warnings list generation problems", body = SaveResponse<Ttn>),
        (status = 400, description = "Invalid form", body = ErrorResponse)
    )
)]
pub async fn create_ttn(payload: Multipart, state: web::Data<AppState>) -> impl Responder {
    let mut form = match MultipartParser::parse_form(payload, state.config.max_content_length).await
    {
        Ok(form) => form,
        Err(e) => return HttpResponse::from(e),
    };
    let ttn_form = match TtnForm::from_fields(&form.fields) {
        Ok(ttn_form) => ttn_form,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
    };

    info!("Creating TTN dated {}", ttn_form.date);

    let mut warnings = Vec::new();
    let template_path =
        store_template(&state, form.take_file("template"), "ttn", &mut warnings).await;

    let ttn = match state.insert_ttn(&ttn_form, template_path.as_deref()).await {
        Ok(ttn) => ttn,
        Err(e) => {
            error!("Failed to save TTN: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::internal_error(
                &format!("Ошибка при создании ТТН: {}", e),
            ));
        }
    };
    info!("Saved TTN {} as record {}", ttn.number, ttn.id);

    let Some(template_path) = &template_path else {
        return HttpResponse::Created()
            .json(SaveResponse::new(ttn, "ТТН успешно создана").with_warnings(warnings));
    };
    let generation = GenerationRequest {
        kind: DocumentKind::Ttn,
        fields: ttn_form.document_fields(&ttn.number),
    };
    let ttn = match generate_document(&state, template_path, generation, &mut warnings).await {
        Some(document) => match state.set_ttn_generated_document(ttn.id, &document.path).await {
            Ok(updated) => updated,
            Err(e) => {
                error!("Failed to link {} to TTN {}: {}", document.path, ttn.number, e);
                warnings.push("Документ сформирован, но не привязан к ТТН".to_string());
                ttn
            }
        },
        None => ttn,
    };

    HttpResponse::Created()
        .json(SaveResponse::new(ttn, "ТТН успешно создана").with_warnings(warnings))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/ttns")
            .route(web::get().to(list_ttns))
            .route(web::post().to(create_ttn)),
    );
}
