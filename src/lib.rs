use actix_cors::Cors;
use actix_web::error::JsonPayloadError;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpRequest, HttpResponse, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod acceptance_act;
pub mod checklist;
pub mod config;
pub mod daily_request;
pub mod db;
pub mod dictionary;
pub mod documents;
pub mod electricity;
pub mod files;
pub mod fleet;
pub mod multipart;
pub mod pass_request;
pub mod personnel;
pub mod reference;
pub mod reports;
pub mod safety;
pub mod shift_request;
pub mod storage;
pub mod ttn;
pub mod uniform;
pub mod validators;
pub mod work_permit;

pub use crate::config::AppConfig;
pub use crate::db::AppState;

use crate::validators::{ValidationError, ValidationErrors};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    /// Per-field problems of a rejected form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ValidationError>,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: Vec::new(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        Self {
            details: errors.errors().to_vec(),
            ..Self::new("ValidationError", &errors.to_message())
        }
    }

    /// A record that other records still refer to.
    pub fn in_use(message: &str) -> Self {
        Self::new("InUse", message)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// A saved record, the confirmation shown to the user and any non-fatal
/// problems (a template that was not stored, a document that failed to
/// generate).
#[derive(Debug, Serialize, ToSchema)]
pub struct SaveResponse<T: Serialize> {
    pub data: T,
    pub message: String,
    pub warnings: Vec<String>,
}

impl<T: Serialize> SaveResponse<T> {
    pub fn new(data: T, message: &str) -> Self {
        Self {
            data,
            message: message.to_string(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct SearchQuery {
    /// Substring to look for, case-insensitive for latin letters.
    #[serde(default)]
    pub q: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::dictionary::handlers::list_entries,
        crate::dictionary::handlers::create_entry,
        crate::dictionary::handlers::delete_entry,
        crate::reference::handlers::list_posts,
        crate::reference::handlers::create_post,
        crate::reference::handlers::delete_post,
        crate::reference::handlers::list_contracts,
        crate::reference::handlers::create_contract,
        crate::reference::handlers::delete_contract,
        crate::reference::handlers::list_inns,
        crate::reference::handlers::create_inn,
        crate::reference::handlers::delete_inn,
        crate::reference::handlers::list_agreement_persons,
        crate::reference::handlers::create_agreement_person,
        crate::reference::handlers::delete_agreement_person,
        crate::personnel::handlers::list_employees,
        crate::personnel::handlers::get_employee,
        crate::personnel::handlers::create_employee,
        crate::personnel::handlers::update_employee,
        crate::personnel::handlers::delete_employee,
        crate::personnel::handlers::search_employees,
        crate::personnel::handlers::upload_document,
        crate::fleet::handlers::list_vehicles,
        crate::fleet::handlers::get_vehicle,
        crate::fleet::handlers::create_vehicle,
        crate::fleet::handlers::update_vehicle,
        crate::fleet::handlers::delete_vehicle,
        crate::fleet::handlers::search_vehicles,
        crate::pass_request::handlers::list_pass_requests,
        crate::pass_request::handlers::get_pass_request,
        crate::pass_request::handlers::create_pass_request,
        crate::shift_request::handlers::list_shift_requests,
        crate::shift_request::handlers::create_shift_request,
        crate::ttn::handlers::list_ttns,
        crate::ttn::handlers::create_ttn,
        crate::electricity::handlers::list_readings,
        crate::electricity::handlers::save_readings,
        crate::uniform::handlers::list_uniform_types,
        crate::uniform::handlers::create_uniform_type,
        crate::uniform::handlers::issue_uniform,
        crate::uniform::handlers::uniform_accounting,
        crate::uniform::handlers::list_norms,
        crate::uniform::handlers::create_norm,
        crate::uniform::handlers::uniform_requirements,
        crate::checklist::handlers::list_forms,
        crate::checklist::handlers::create_form,
        crate::checklist::handlers::update_form,
        crate::checklist::handlers::list_checklists,
        crate::checklist::handlers::create_checklist,
        crate::acceptance_act::handlers::list_forms,
        crate::acceptance_act::handlers::create_form,
        crate::acceptance_act::handlers::list_acts,
        crate::acceptance_act::handlers::create_act,
        crate::work_permit::handlers::list_work_permits,
        crate::work_permit::handlers::next_number,
        crate::work_permit::handlers::create_work_permit,
        crate::daily_request::handlers::list_daily_requests,
        crate::daily_request::handlers::create_daily_request,
        crate::safety::handlers::list_tests,
        crate::safety::handlers::create_test,
        crate::safety::handlers::get_test,
        crate::safety::handlers::take_test,
        crate::safety::handlers::list_results,
        crate::reports::handlers::expiring_report,
        crate::files::handlers::serve_file
    ),
    components(
        schemas(
            ErrorResponse,
            SuccessResponse,
            ValidationError,
            dictionary::models::DictionaryKind,
            dictionary::models::DictionaryEntry,
            dictionary::models::CreateDictionaryEntryRequest,
            reference::models::Post,
            reference::models::CreatePostRequest,
            reference::models::Contract,
            reference::models::CreateContractRequest,
            reference::models::OrganizationInn,
            reference::models::CreateInnRequest,
            reference::models::AgreementPerson,
            reference::models::CreateAgreementPersonRequest,
            personnel::models::Employee,
            personnel::models::EmployeeSearchResult,
            personnel::models::EmployeeDocument,
            fleet::models::Vehicle,
            fleet::models::CreateVehicleRequest,
            fleet::models::VehicleSearchResult,
            pass_request::models::PassRequest,
            pass_request::models::PassRequestDetail,
            shift_request::models::ShiftRequest,
            documents::adapters::ShiftKind,
            ttn::models::Ttn,
            electricity::models::ElectricityReading,
            uniform::models::UniformType,
            uniform::models::CreateUniformTypeRequest,
            uniform::models::EmployeeUniform,
            uniform::models::IssueUniformRequest,
            uniform::models::UniformAccounting,
            uniform::models::PositionUniform,
            uniform::models::CreateNormRequest,
            uniform::models::UniformRequirement,
            checklist::models::ChecklistForm,
            checklist::models::SaveChecklistFormRequest,
            checklist::models::Checklist,
            checklist::models::CreateChecklistRequest,
            acceptance_act::models::AcceptanceActForm,
            acceptance_act::models::SaveAcceptanceActFormRequest,
            acceptance_act::models::AcceptanceAct,
            acceptance_act::models::CreateAcceptanceActRequest,
            work_permit::models::WorkPermit,
            work_permit::models::NextWorkPermitNumber,
            daily_request::models::DailyVehicle,
            daily_request::models::DailyRequest,
            daily_request::models::CreateDailyRequest,
            safety::models::AnswerOption,
            safety::models::Question,
            safety::models::SafetyTest,
            safety::models::SafetyTestSummary,
            safety::models::SafetyTestsOverview,
            safety::models::CreateSafetyTestRequest,
            safety::models::TakeTestRequest,
            safety::models::TestResult,
            reports::models::ExpiringKind,
            reports::models::ExpiringDocument,
            reports::models::ExpiringReport,
        )
    ),
    tags(
        (name = "Dictionaries", description = "Departments, positions, cities, vehicle types and categories, airports."),
        (name = "Reference", description = "Posts, contracts, organization INNs and agreement persons."),
        (name = "Employees", description = "Employee registry with photos and personal documents."),
        (name = "Vehicles", description = "Vehicle registry."),
        (name = "Pass Requests", description = "Pass requests and their generated documents."),
        (name = "Shift Requests", description = "Charter, regular and auto delivery shift requests."),
        (name = "TTN", description = "Bills of lading."),
        (name = "Electricity", description = "Monthly meter readings."),
        (name = "Uniforms", description = "Uniform types, issues, norms and requirements."),
        (name = "Checklists", description = "Checklist forms and filled checklists."),
        (name = "Acceptance Acts", description = "Acceptance act forms and drawn up acts."),
        (name = "Work Permits", description = "Tyre fitting work permits."),
        (name = "Daily Requests", description = "Daily dispatch requests for vehicles and drivers."),
        (name = "Safety", description = "Safety briefing tests and their results."),
        (name = "Reports", description = "Expiring passes, exams, insurance and inspections."),
        (name = "Files", description = "Stored photos, templates and generated documents.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Local server")
    )
)]
pub struct ApiDoc;

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = err.to_string();
    actix_web::error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message)),
    )
    .into()
}

/// JSON body limit and the error body used for malformed JSON.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(json_error_handler)
}

/// Every route under `/api`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(dictionary::config)
        .configure(reference::config)
        .configure(personnel::config)
        .configure(fleet::config)
        .configure(pass_request::config)
        .configure(shift_request::config)
        .configure(ttn::config)
        .configure(electricity::config)
        .configure(uniform::config)
        .configure(checklist::config)
        .configure(acceptance_act::config)
        .configure(work_permit::config)
        .configure(daily_request::config)
        .configure(safety::config)
        .configure(reports::config);
}

pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let bind = (config.bind_address.clone(), config.port);
    let app_state = match AppState::new(config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to initialise the database or storage. Check DATABASE_URL and UPLOAD_FOLDER in .env. Error: {}",
                e
            );
            return Err(std::io::Error::other(e));
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("transport_admin_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let limit = app_state.config.max_content_length;
        let prometheus = prometheus.clone();
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:8080")
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .app_data(json_config(limit))
            .app_data(web::PayloadConfig::new(limit))
            .service(web::scope("/api").configure(configure_api))
            .configure(files::config)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind)?
    .run()
    .await
}
