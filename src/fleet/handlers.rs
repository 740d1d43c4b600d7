use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info};

use crate::db::AppState;
use crate::fleet::models::{CreateVehicleRequest, Vehicle, VehicleSearchResult};
use crate::{ErrorResponse, SaveResponse, SearchQuery, SuccessResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Vehicles",
    get,
    path = "/vehicles",
    responses(
        (status = 200, description = "All vehicles", body = [Vehicle])
    )
)]
pub async fn list_vehicles(state: web::Data<AppState>) -> impl Responder {
    match state.list_vehicles().await {
        Ok(vehicles) => HttpResponse::Ok().json(vehicles),
        Err(e) => {
            error!("Failed to list vehicles: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load vehicles"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Vehicles",
    get,
    path = "/vehicles/{id}",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle card", body = Vehicle),
        (status = 404, description = "Vehicle not found", body = ErrorResponse)
    )
)]
pub async fn get_vehicle(path: web::Path<i64>, state: web::Data<AppState>) -> impl Responder {
    let id = path.into_inner();
    match state.get_vehicle(id).await {
        Ok(Some(vehicle)) => HttpResponse::Ok().json(vehicle),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Vehicle not found")),
        Err(e) => {
            error!("Failed to load vehicle {}: {}", id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load vehicle"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Vehicles",
    post,
    path = "/vehicles",
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Vehicle created", body = SaveResponse<Vehicle>),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_vehicle(
    body: web::Json<CreateVehicleRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let form = match body.parse() {
        Ok(form) => form,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
    };
    match state.insert_vehicle(&form).await {
        Ok(vehicle) => {
            info!("Created vehicle {} ({})", vehicle.id, vehicle.license_plate);
            HttpResponse::Created().json(SaveResponse::new(vehicle, "Транспорт успешно добавлен"))
        }
        Err(e) => {
            error!("Failed to insert vehicle: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при добавлении транспорта: {}",
                e
            )))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Vehicles",
    put,
    path = "/vehicles/{id}",
    params(("id" = i64, Path, description = "Vehicle ID")),
    request_body = CreateVehicleRequest,
    responses(
        (status = 200, description = "Vehicle updated", body = SaveResponse<Vehicle>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Vehicle not found", body = ErrorResponse)
    )
)]
pub async fn update_vehicle(
    path: web::Path<i64>,
    body: web::Json<CreateVehicleRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let id = path.into_inner();
    let form = match body.parse() {
        Ok(form) => form,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
    };
    match state.update_vehicle(id, &form).await {
        Ok(Some(vehicle)) => {
            info!("Updated vehicle {}", id);
            HttpResponse::Ok().json(SaveResponse::new(vehicle, "Данные транспорта обновлены"))
        }
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::not_found("Vehicle not found")),
        Err(e) => {
            error!("Failed to update vehicle {}: {}", id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to update vehicle"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Vehicles",
    delete,
    path = "/vehicles/{id}",
    params(("id" = i64, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle deleted", body = SuccessResponse),
        (status = 404, description = "Vehicle not found", body = ErrorResponse)
    )
)]
pub async fn delete_vehicle(path: web::Path<i64>, state: web::Data<AppState>) -> impl Responder {
    let id = path.into_inner();
    match state.delete_vehicle(id).await {
        Ok(true) => {
            info!("Deleted vehicle {}", id);
            HttpResponse::Ok().json(SuccessResponse::ok())
        }
        Ok(false) => HttpResponse::NotFound().json(ErrorResponse::not_found("Vehicle not found")),
        Err(e) => {
            error!("Failed to delete vehicle {}: {}", id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to delete vehicle"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Vehicles",
    get,
    path = "/vehicles/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Up to 10 matching vehicles", body = [VehicleSearchResult])
    )
)]
pub async fn search_vehicles(
    query: web::Query<SearchQuery>,
    state: web::Data<AppState>,
) -> impl Responder {
    debug!("Vehicle search '{}'", query.q);
    match state.search_vehicles(&query.q).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => {
            error!("Vehicle search failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Search failed"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/vehicles/search").route(web::get().to(search_vehicles)))
        .service(
            web::resource("/vehicles")
                .route(web::get().to(list_vehicles))
                .route(web::post().to(create_vehicle)),
        )
        .service(
            web::resource("/vehicles/{id}")
                .route(web::get().to(get_vehicle))
                .route(web::put().to(update_vehicle))
                .route(web::delete().to(delete_vehicle)),
        );
}
