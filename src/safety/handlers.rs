use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::db::AppState;
use crate::documents::Validator;
use crate::safety::models::{
    grade, CreateSafetyTestRequest, SafetyTest, SafetyTestsOverview, TakeTestRequest, TestResult,
};
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Safety",
    get,
    path = "/safety/tests",
    responses(
        (status = 200, description = "Tests with result statistics", body = SafetyTestsOverview)
    )
)]
pub async fn list_tests(state: web::Data<AppState>) -> impl Responder {
    match state.safety_tests_overview().await {
        Ok(overview) => HttpResponse::Ok().json(overview),
        Err(e) => {
            error!("Failed to list safety tests: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load tests"))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Safety",
    post,
    path = "/safety/tests",
    request_body = CreateSafetyTestRequest,
    responses(
        (status = 201, description = "Test created", body = SafetyTest),
        (status = 400, description = "Invalid test", body = ErrorResponse)
    )
)]
pub async fn create_test(
    body: web::Json<CreateSafetyTestRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.insert_safety_test(&body).await {
        Ok(test) => {
            info!(
                "Created safety test {} '{}' with {} questions",
                test.id,
                test.name,
                test.questions.len()
            );
            HttpResponse::Created().json(test)
        }
        Err(e) => {
            error!("Failed to save safety test: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при создании теста: {}",
                e
            )))
        }
    }
}

async fn load_test(state: &AppState, id: i64) -> Result<SafetyTest, HttpResponse> {
    match state.get_safety_test(id).await {
        Ok(Some(test)) => Ok(test),
        Ok(None) => Err(HttpResponse::NotFound().json(ErrorResponse::not_found("Test not found"))),
        Err(e) => {
            error!("Failed to load safety test {}: {}", id, e);
            Err(HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load test")))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Safety",
    get,
    path = "/safety/tests/{id}",
    params(("id" = i64, Path, description = "Test ID")),
    responses(
        (status = 200, description = "Test with its questions", body = SafetyTest),
        (status = 404, description = "Test not found", body = ErrorResponse)
    )
)]
pub async fn get_test(path: web::Path<i64>, state: web::Data<AppState>) -> impl Responder {
    match load_test(&state, path.into_inner()).await {
        Ok(test) => HttpResponse::Ok().json(test),
        Err(response) => response,
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Safety",
    post,
    path = "/safety/tests/{id}/take",
    params(("id" = i64, Path, description = "Test ID")),
    request_body = TakeTestRequest,
    responses(
        (status = 201, description = "Answers graded and stored", body = TestResult),
        (status = 400, description = "Invalid answers", body = ErrorResponse),
        (status = 404, description = "Test not found", body = ErrorResponse)
    )
)]
pub async fn take_test(
    path: web::Path<i64>,
    body: web::Json<TakeTestRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let test = match load_test(&state, path.into_inner()).await {
        Ok(test) => test,
        Err(response) => return response,
    };
    if let Err(errors) = body.validate_against(&test) {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }

    let graded = grade(&test.questions, &body.answers);
    match state
        .insert_test_result(test.id, &body.employee_name, &body.answers, graded)
        .await
    {
        Ok(result) => {
            info!(
                "{} scored {}/{} on test '{}' ({})",
                result.employee_name,
                result.score,
                result.max_score,
                test.name,
                if result.passed { "passed" } else { "failed" }
            );
            HttpResponse::Created().json(result)
        }
        Err(e) => {
            error!("Failed to save result of test {}: {}", test.id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&format!(
                "Ошибка при сохранении результатов: {}",
                e
            )))
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Safety",
    get,
    path = "/safety/tests/{id}/results",
    params(("id" = i64, Path, description = "Test ID")),
    responses(
        (status = 200, description = "Results, newest first", body = [TestResult]),
        (status = 404, description = "Test not found", body = ErrorResponse)
    )
)]
pub async fn list_results(path: web::Path<i64>, state: web::Data<AppState>) -> impl Responder {
    let test = match load_test(&state, path.into_inner()).await {
        Ok(test) => test,
        Err(response) => return response,
    };
    match state.list_test_results(test.id).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(e) => {
            error!("Failed to list results of test {}: {}", test.id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Failed to load results"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/safety/tests")
            .route(web::get().to(list_tests))
            .route(web::post().to(create_test)),
    )
    .service(web::resource("/safety/tests/{id}").route(web::get().to(get_test)))
    .service(web::resource("/safety/tests/{id}/take").route(web::post().to(take_test)))
    .service(web::resource("/safety/tests/{id}/results").route(web::get().to(list_results)));
}
