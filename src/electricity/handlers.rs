use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use log::{debug, error, info};

use crate::db::AppState;
use crate::documents::electricity::{append_month_sheet, MeterReadings};
use crate::electricity::models::{ElectricityForm, ElectricityReading, WORKBOOK_EXTENSIONS};
use crate::multipart::{MultipartParser, UploadedFile};
use crate::storage::StorageError;
use crate::validators::{validate_file_extension, ValidationErrors};
use crate::{ErrorResponse, SaveResponse};

const WORKBOOK_FAILED: &str = "Не удалось обновить файл учета электроэнергии";

/// Stores the uploaded tracking workbook and appends the month sheet to it.
/// When the sheet cannot be added the workbook is kept as uploaded.
async fn update_workbook(
    state: &AppState,
    workbook: UploadedFile,
    date: NaiveDate,
    readings: MeterReadings,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let mut errors = ValidationErrors::new();
    validate_file_extension(&workbook.filename, WORKBOOK_EXTENSIONS, "excel_file", &mut errors);
    if !errors.is_empty() {
        warnings.push(errors.to_message());
        return None;
    }

    let storage = state.storage.clone();
    let result = web::block(move || -> Result<(String, Option<String>), StorageError> {
        let path = storage.save_document(&workbook.bytes, &workbook.filename, "electricity")?;
        match append_month_sheet(&workbook.bytes, date, &readings) {
            Ok((updated, title)) => {
                storage.write(&path, &updated)?;
                Ok((path, Some(title)))
            }
            Err(e) => {
                error!("Failed to append a month sheet to {}: {}", path, e);
                Ok((path, None))
            }
        }
    })
    .await;

    match result {
        Ok(Ok((path, Some(title)))) => {
            debug!("Added sheet '{}' to {}", title, path);
            Some(path)
        }
        Ok(Ok((path, None))) => {
            warnings.push(WORKBOOK_FAILED.to_string());
            Some(path)
        }
        Ok(Err(e)) => {
            error!("Failed to store the electricity workbook: {}", e);
            warnings.push(WORKBOOK_FAILED.to_string());
            None
        }
        Err(e) => {
            error!("Workbook task failed: {}", e);
            warnings.push(WORKBOOK_FAILED.to_string());
            None
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Electricity",
    get,
    path = "/electricity",
    responses(
        (status = 200, description = "The five latest readings", body = [ElectricityReading])
    )
)]
pub async fn list_readings(state: web::Data<AppState>) -> impl Responder {
    match state.recent_electricity_readings().await {
        Ok(readings) => HttpResponse::Ok().json(readings),
        Err(e) => {
            error!("Failed to list electricity readings: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load electricity readings"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Electricity",
    post,
    path = "/electricity",
    request_body(
        content_type = "multipart/form-data",
        description = "reading_date, previous_bpo, current_bpo, previous_dormitory, current_dormitory and an optional `excel_file` (.xlsx tracking workbook)"
    ),
    responses(
        (status = 201, description = "Readings saved", body = SaveResponse<ElectricityReading>),
        (status = 400, description = "Invalid form", body = ErrorResponse)
    )
)]
pub async fn save_readings(payload: Multipart, state: web::Data<AppState>) -> impl Responder {
    let mut form = match MultipartParser::parse_form(payload, state.config.max_content_length).await
    {
        Ok(form) => form,
        Err(e) => return HttpResponse::from(e),
    };
    let readings_form = match ElectricityForm::from_fields(&form.fields) {
        Ok(readings_form) => readings_form,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
    };
    info!("Saving electricity readings for {}", readings_form.date);

    let mut warnings = Vec::new();
    let file_path = match form.take_file("excel_file") {
        Some(workbook) => {
            update_workbook(
                &state,
                workbook,
                readings_form.date,
                readings_form.readings.clone(),
                &mut warnings,
            )
            .await
        }
        None => None,
    };

    match state
        .insert_electricity_reading(&readings_form, file_path.as_deref())
        .await
    {
        Ok(reading) => HttpResponse::Created().json(
            SaveResponse::new(reading, "Показания электроэнергии успешно сохранены")
                .with_warnings(warnings),
        ),
        Err(e) => {
            error!("Failed to save electricity readings: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при сохранении показаний: {}",
                e
            )))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/electricity")
            .route(web::get().to(list_readings))
            .route(web::post().to(save_readings)),
    );
}
