use actix_web::{web, HttpResponse, Responder};
use log::{error, info};

use crate::db::{is_unique_violation, AppState, DeleteOutcome};
use crate::documents::Validator;
use crate::reference::models::{
    AgreementPerson, Contract, CreateAgreementPersonRequest, CreateContractRequest,
    CreateInnRequest, CreatePostRequest, OrganizationInn, Post,
};
use crate::{ErrorResponse, SuccessResponse};

/// Shared mapping of a soft-delete result onto a response.
fn delete_response(
    what: &str,
    id: i64,
    outcome: Result<DeleteOutcome, sqlx::Error>,
) -> HttpResponse {
    match outcome {
        Ok(DeleteOutcome::Deleted) => {
            info!("Deactivated {} {}", what, id);
            HttpResponse::Ok().json(SuccessResponse::ok())
        }
        Ok(DeleteOutcome::NotFound) => HttpResponse::NotFound()
            .json(ErrorResponse::not_found(&format!("{} {} not found", what, id))),
        Ok(DeleteOutcome::InUse(count)) => HttpResponse::BadRequest().json(
            ErrorResponse::in_use(&format!(
                "Невозможно удалить: используется в {} заявках",
                count
            )),
        ),
        Err(e) => {
            error!("Failed to delete {} {}: {}", what, id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("Failed to delete {}", what)))
        }
    }
}

fn insert_failed(what: &str, e: sqlx::Error, duplicate_message: &str) -> HttpResponse {
    if is_unique_violation(&e) {
        return HttpResponse::Conflict().json(ErrorResponse::new("Conflict", duplicate_message));
    }
    error!("Failed to insert {}: {}", what, e);
    HttpResponse::InternalServerError()
        .json(ErrorResponse::internal_error(&format!("Failed to save {}", what)))
}

fn list_failed(what: &str, e: sqlx::Error) -> HttpResponse {
    error!("Failed to list {}: {}", what, e);
    HttpResponse::InternalServerError()
        .json(ErrorResponse::internal_error(&format!("Failed to load {}", what)))
}

// ============================================================================
// Posts
// ============================================================================

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    get,
    path = "/posts",
    responses(
        (status = 200, description = "Active posts", body = [Post])
    )
)]
pub async fn list_posts(state: web::Data<AppState>) -> impl Responder {
    match state.list_posts().await {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(e) => list_failed("posts", e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_post(
    body: web::Json<CreatePostRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.insert_post(&body).await {
        Ok(post) => {
            info!("Created post {} '{}'", post.id, post.name);
            HttpResponse::Created().json(post)
        }
        Err(e) => insert_failed("post", e, "Пост с таким названием уже существует"),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    delete,
    path = "/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deactivated", body = SuccessResponse),
        (status = 400, description = "Post is used by pass requests", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    )
)]
pub async fn delete_post(path: web::Path<i64>, state: web::Data<AppState>) -> impl Responder {
    let id = path.into_inner();
    delete_response("post", id, state.delete_post(id).await)
}

// ============================================================================
// Contracts
// ============================================================================

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    get,
    path = "/contracts",
    responses(
        (status = 200, description = "Active contracts", body = [Contract])
    )
)]
pub async fn list_contracts(state: web::Data<AppState>) -> impl Responder {
    match state.list_contracts().await {
        Ok(contracts) => HttpResponse::Ok().json(contracts),
        Err(e) => list_failed("contracts", e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    post,
    path = "/contracts",
    request_body = CreateContractRequest,
    responses(
        (status = 201, description = "Contract created", body = Contract),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Contract number already exists", body = ErrorResponse)
    )
)]
pub async fn create_contract(
    body: web::Json<CreateContractRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let contract = match body.parse() {
        Ok(contract) => contract,
        Err(errors) => {
            return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors))
        }
    };
    match state.insert_contract(&contract).await {
        Ok(contract) => {
            info!("Created contract {} '{}'", contract.id, contract.number);
            HttpResponse::Created().json(contract)
        }
        Err(e) => insert_failed("contract", e, "Договор с таким номером уже существует"),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    delete,
    path = "/contracts/{id}",
    params(("id" = i64, Path, description = "Contract ID")),
    responses(
        (status = 200, description = "Contract deactivated", body = SuccessResponse),
        (status = 400, description = "Contract is used by requests", body = ErrorResponse),
        (status = 404, description = "Contract not found", body = ErrorResponse)
    )
)]
pub async fn delete_contract(path: web::Path<i64>, state: web::Data<AppState>) -> impl Responder {
    let id = path.into_inner();
    delete_response("contract", id, state.delete_contract(id).await)
}

// ============================================================================
// Organization INNs
// ============================================================================

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    get,
    path = "/inns",
    responses(
        (status = 200, description = "Active organizations", body = [OrganizationInn])
    )
)]
pub async fn list_inns(state: web::Data<AppState>) -> impl Responder {
    match state.list_inns().await {
        Ok(inns) => HttpResponse::Ok().json(inns),
        Err(e) => list_failed("INNs", e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    post,
    path = "/inns",
    request_body = CreateInnRequest,
    responses(
        (status = 201, description = "Organization created", body = OrganizationInn),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "INN already exists", body = ErrorResponse)
    )
)]
pub async fn create_inn(
    body: web::Json<CreateInnRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.insert_inn(&body).await {
        Ok(inn) => {
            info!("Created organization {} ({})", inn.organization_name, inn.inn);
            HttpResponse::Created().json(inn)
        }
        Err(e) => insert_failed("INN", e, "Организация с таким ИНН уже существует"),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    delete,
    path = "/inns/{id}",
    params(("id" = i64, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization deactivated", body = SuccessResponse),
        (status = 400, description = "Organization is used by pass requests", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    )
)]
pub async fn delete_inn(path: web::Path<i64>, state: web::Data<AppState>) -> impl Responder {
    let id = path.into_inner();
    delete_response("INN", id, state.delete_inn(id).await)
}

// ============================================================================
// Agreement persons
// ============================================================================

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    get,
    path = "/agreement-persons",
    responses(
        (status = 200, description = "Active agreement persons", body = [AgreementPerson])
    )
)]
pub async fn list_agreement_persons(state: web::Data<AppState>) -> impl Responder {
    match state.list_agreement_persons().await {
        Ok(persons) => HttpResponse::Ok().json(persons),
        Err(e) => list_failed("agreement persons", e),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    post,
    path = "/agreement-persons",
    request_body = CreateAgreementPersonRequest,
    responses(
        (status = 201, description = "Agreement person created", body = AgreementPerson),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_agreement_person(
    body: web::Json<CreateAgreementPersonRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    if let Err(errors) = body.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::validation(&errors));
    }
    match state.insert_agreement_person(&body).await {
        Ok(person) => {
            info!("Created agreement person {} '{}'", person.id, person.full_name);
            HttpResponse::Created().json(person)
        }
        Err(e) => insert_failed("agreement person", e, "Такая запись уже существует"),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Reference",
    delete,
    path = "/agreement-persons/{id}",
    params(("id" = i64, Path, description = "Agreement person ID")),
    responses(
        (status = 200, description = "Agreement person deactivated", body = SuccessResponse),
        (status = 400, description = "Person is used by pass requests", body = ErrorResponse),
        (status = 404, description = "Person not found", body = ErrorResponse)
    )
)]
pub async fn delete_agreement_person(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> impl Responder {
    let id = path.into_inner();
    delete_response("agreement person", id, state.delete_agreement_person(id).await)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/posts")
            .route(web::get().to(list_posts))
            .route(web::post().to(create_post)),
    )
    .service(web::resource("/posts/{id}").route(web::delete().to(delete_post)))
    .service(
        web::resource("/contracts")
            .route(web::get().to(list_contracts))
            .route(web::post().to(create_contract)),
    )
    .service(web::resource("/contracts/{id}").route(web::delete().to(delete_contract)))
    .service(
        web::resource("/inns")
            .route(web::get().to(list_inns))
            .route(web::post().to(create_inn)),
    )
    .service(web::resource("/inns/{id}").route(web::delete().to(delete_inn)))
    .service(
        web::resource("/agreement-persons")
            .route(web::get().to(list_agreement_persons))
            .route(web::post().to(create_agreement_person)),
    )
    .service(
        web::resource("/agreement-persons/{id}")
            .route(web::delete().to(delete_agreement_person)),
    );
}
