use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info, warn};

use crate::db::AppState;
use crate::multipart::{MultipartParser, UploadedFile};
use crate::personnel::models::{
    Employee, EmployeeDocument, EmployeeForm, EmployeeSearchResult, PHOTO_EXTENSIONS,
    PHOTO_MAX_MB,
};
use crate::storage::StorageError;
use crate::validators::{validate_file_extension, validate_file_size, ValidationErrors};
use crate::{ErrorResponse, SaveResponse, SearchQuery, SuccessResponse};

/// Stores an uploaded photo. Problems become warnings; the employee is saved
/// either way.
async fn store_photo(
    state: &AppState,
    photo: Option<UploadedFile>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let photo = photo?;
    let mut errors = ValidationErrors::new();
    validate_file_extension(&photo.filename, &PHOTO_EXTENSIONS, "photo", &mut errors);
    validate_file_size(photo.bytes.len(), PHOTO_MAX_MB, "photo", &mut errors);
    if !errors.is_empty() {
        warnings.push(errors.to_message());
        return None;
    }

    let storage = state.storage.clone();
    match web::block(move || storage.save_employee_photo(&photo.bytes, &photo.filename)).await {
        Ok(Ok(path)) => Some(path),
        Ok(Err(e)) => {
            error!("Failed to save employee photo: {}", e);
            warnings.push("Не удалось сохранить фото".to_string());
            None
        }
        Err(e) => {
            error!("Photo save task failed: {}", e);
            warnings.push("Не удалось сохранить фото".to_string());
            None
        }
    }
}

async fn remove_photo(state: &AppState, path: String) {
    let storage = state.storage.clone();
    let target = path.clone();
    match web::block(move || storage.delete_file(&target)).await {
        Ok(Ok(_)) => debug!("Removed photo {}", path),
        Ok(Err(e)) => warn!("Failed to remove photo {}: {}", path, e),
        Err(e) => warn!("Photo removal task failed for {}: {}", path, e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Employees",
    get,
    path = "/employees",
    responses(
        (status = 200, description = "All employees", body = [Employee])
    )
)]
pub async fn list_employees(state: web::Data<AppState>) -> impl Responder {
    match state.list_employees().await {
        Ok(employees) => HttpResponse::Ok().json(employees),
        Err(e) => {
            error!("Failed to list employees: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load employees"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Employees",
    get,
    path = "/employees/{id}",
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee card", body = Employee),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
pub async fn get_employee(path: web::Path<i64>, state: web::Data<AppState>) -> impl Responder {
    let id = path.into_inner();
    match state.get_employee(id).await {
        Ok(Some(employee)) => HttpResponse::Ok().json(employee),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Employee not found")),
        Err(e) => {
            error!("Failed to load employee {}: {}", id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load employee"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Employees",
    post,
    path = "/employees",
    request_body(content_type = "multipart/form-data", description = "Employee form fields and an optional `photo` file"),
    responses(
        (status = 201, description = "Employee created", body = SaveResponse<Employee>),
        (status = 400, description = "Invalid form", body = ErrorResponse)
    )
)]
pub async fn create_employee(payload: Multipart, state: web::Data<AppState>) -> impl Responder {
    info!("Creating employee");
    let mut form = match MultipartParser::parse_form(payload, state.config.max_content_length).await
    {
        Ok(form) => form,
        Err(e) => return HttpResponse::from(e),
    };
    let employee_form = match EmployeeForm::from_fields(&form.fields) {
        Ok(employee_form) => employee_form,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
    };

    let mut warnings = Vec::new();
    let photo_path = store_photo(&state, form.take_file("photo"), &mut warnings).await;

    match state
        .insert_employee(&employee_form, photo_path.as_deref())
        .await
    {
        Ok(employee) => {
            info!("Created employee {} ({})", employee.id, employee.full_name());
            HttpResponse::Created().json(
                SaveResponse::new(employee, "Сотрудник успешно добавлен").with_warnings(warnings),
            )
        }
        Err(e) => {
            error!("Failed to insert employee: {}", e);
            if let Some(path) = photo_path {
                remove_photo(&state, path).await;
            }
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при добавлении сотрудника: {}",
                e
            )))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Employees",
    put,
    path = "/employees/{id}",
    params(("id" = i64, Path, description = "Employee ID")),
    request_body(content_type = "multipart/form-data", description = "Employee form fields and an optional new `photo`"),
    responses(
        (status = 200, description = "Employee updated", body = SaveResponse<Employee>),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
pub async fn update_employee(
    path: web::Path<i64>,
    payload: Multipart,
    state: web::Data<AppState>,
) -> impl Responder {
    let id = path.into_inner();
    let previous_photo = match state.get_employee(id).await {
        Ok(Some(employee)) => employee.photo_path,
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::not_found("Employee not found"))
        }
        Err(e) => {
            error!("Failed to load employee {}: {}", id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load employee"));
        }
    };

    let mut form = match MultipartParser::parse_form(payload, state.config.max_content_length).await
    {
        Ok(form) => form,
        Err(e) => return HttpResponse::from(e),
    };
    let employee_form = match EmployeeForm::from_fields(&form.fields) {
        Ok(employee_form) => employee_form,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
    };

    let mut warnings = Vec::new();
    let photo_path = store_photo(&state, form.take_file("photo"), &mut warnings).await;

    match state
        .update_employee(id, &employee_form, photo_path.as_deref())
        .await
    {
        Ok(Some(employee)) => {
            if let (Some(_), Some(old)) = (&photo_path, previous_photo) {
                remove_photo(&state, old).await;
            }
            info!("Updated employee {}", id);
            HttpResponse::Ok().json(
                SaveResponse::new(employee, "Данные сотрудника успешно обновлены")
                    .with_warnings(warnings),
            )
        }
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Employee not found")),
        Err(e) => {
            error!("Failed to update employee {}: {}", id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при обновлении данных сотрудника: {}",
                e
            )))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Employees",
    delete,
    path = "/employees/{id}",
    params(("id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee and photo deleted", body = SuccessResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
pub async fn delete_employee(path: web::Path<i64>, state: web::Data<AppState>) -> impl Responder {
    let id = path.into_inner();
    match state.delete_employee(id).await {
        Ok(Some(photo)) => {
            if let Some(photo) = photo {
                remove_photo(&state, photo).await;
            }
            info!("Deleted employee {}", id);
            HttpResponse::Ok().json(SuccessResponse::ok())
        }
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Employee not found")),
        Err(e) => {
            error!("Failed to delete employee {}: {}", id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при удалении сотрудника: {}",
                e
            )))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Employees",
    post,
    path = "/employees/{id}/documents",
    params(("id" = i64, Path, description = "Employee ID")),
    request_body(content_type = "multipart/form-data", description = "The scanned `document` file"),
    responses(
        (status = 201, description = "Document stored", body = EmployeeDocument),
        (status = 400, description = "No file or unusable file name", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
pub async fn upload_document(
    path: web::Path<i64>,
    payload: Multipart,
    state: web::Data<AppState>,
) -> impl Responder {
    let id = path.into_inner();
    let mut form = match MultipartParser::parse_form(payload, state.config.max_content_length).await
    {
        Ok(form) => form,
        Err(e) => return HttpResponse::from(e),
    };
    match state.get_employee(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(ErrorResponse::not_found("Employee not found"))
        }
        Err(e) => {
            error!("Failed to load employee {}: {}", id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load employee"));
        }
    }
    let Some(document) = form.take_file("document") else {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request("Файл не выбран"));
    };

    let storage = state.storage.clone();
    let filename = document.filename.clone();
    let size = document.bytes.len();
    match web::block(move || {
        storage.save_employee_document(&document.bytes, id, &document.filename)
    })
    .await
    {
        Ok(Ok(stored)) => {
            info!("Uploaded document {} for employee {}", stored, id);
            HttpResponse::Created().json(EmployeeDocument {
                employee_id: id,
                path: stored,
                filename,
                size,
            })
        }
        Ok(Err(StorageError::InvalidPath(name))) => HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request(&format!("Недопустимое имя файла '{}'", name))),
        Ok(Err(e)) => {
            error!("Failed to save document for employee {}: {}", id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при загрузке документа: {}",
                e
            )))
        }
        Err(e) => {
            error!("Document save task failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Ошибка при загрузке документа"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Employees",
    get,
    path = "/employees/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Up to 10 matching employees", body = [EmployeeSearchResult])
    )
)]
pub async fn search_employees(
    query: web::Query<SearchQuery>,
    state: web::Data<AppState>,
) -> impl Responder {
    debug!("Employee search '{}'", query.q);
    match state.search_employees(&query.q).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => {
            error!("Employee search failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Search failed"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/employees/search").route(web::get().to(search_employees)))
        .service(
            web::resource("/employees")
                .route(web::get().to(list_employees))
                .route(web::post().to(create_employee)),
        )
        .service(
            web::resource("/employees/{id}")
                .route(web::get().to(get_employee))
                .route(web::put().to(update_employee))
                .route(web::delete().to(delete_employee)),
        )
        .service(web::resource("/employees/{id}/documents").route(web::post().to(upload_document)));
}
