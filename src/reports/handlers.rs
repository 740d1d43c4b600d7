use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use log::{debug, error};

use crate::db::AppState;
use crate::reports::models::{
    expiring_documents, ExpiringQuery, ExpiringReport, DEFAULT_WINDOW_DAYS,
};
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Reports",
    get,
    path = "/reports/expiring",
    params(ExpiringQuery),
    responses(
        (status = 200, description = "Employee and vehicle documents expiring within the window", body = ExpiringReport),
        (status = 400, description = "Negative window", body = ErrorResponse)
    )
)]
pub async fn expiring_report(
    query: web::Query<ExpiringQuery>,
    state: web::Data<AppState>,
) -> impl Responder {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if days < 0 {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request("days must not be negative"));
    }

    let employees = match state.employee_expiries().await {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to load employee expiry dates: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to build the report"));
        }
    };
    let vehicles = match state.vehicle_expiries().await {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to load vehicle expiry dates: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to build the report"));
        }
    };

    let today = Local::now().date_naive();
    let report = ExpiringReport {
        days,
        today,
        employees: expiring_documents(
            employees
                .iter()
                .map(|row| (row.id, row.name(), row.documents())),
            today,
            days,
        ),
        vehicles: expiring_documents(
            vehicles
                .iter()
                .map(|row| (row.id, row.name(), row.documents())),
            today,
            days,
        ),
    };
    debug!(
        "Expiring within {} days: {} employee and {} vehicle documents",
        days,
        report.employees.len(),
        report.vehicles.len()
    );
    HttpResponse::Ok().json(report)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/reports/expiring").route(web::get().to(expiring_report)));
}
