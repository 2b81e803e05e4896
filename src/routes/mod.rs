//! HTTP handlers of the document API, mounted under `/api`.

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde::Serialize;

use crate::dto::api::ApiEnvelope;
use crate::services::ServiceError;

pub mod admin;
pub mod public;

/// Largest JSON body accepted by admin writes.
pub const MAX_JSON_BODY: usize = 2 * 1024 * 1024;

/// Registers the `/api` scope. Static routes come before `{collection}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(
                web::JsonConfig::default()
                    .limit(MAX_JSON_BODY)
                    .error_handler(json_error),
            )
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .service(public::search_pharmacies)
            .service(public::list_documents)
            .service(public::get_document)
            .service(admin::list_documents)
            .service(admin::create_document)
            .service(admin::update_document)
            .service(admin::delete_document)
            .default_service(web::to(not_found)),
    );
}

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiEnvelope::data(data))
}

pub fn failure(status: actix_web::http::StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ApiEnvelope::<()>::failure(message))
}

/// Maps a service outcome to its status code and envelope.
pub fn error_response(err: ServiceError, context: &str) -> HttpResponse {
    use actix_web::http::StatusCode;

    match err {
        ServiceError::Forbidden => failure(StatusCode::FORBIDDEN, "Insufficient permissions"),
        ServiceError::NotFound => failure(StatusCode::NOT_FOUND, "Document not found"),
        ServiceError::Conflict(message) => failure(StatusCode::CONFLICT, message),
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            failure(StatusCode::BAD_REQUEST, message)
        }
        err => {
            log::error!("{context}: {err}");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = failure(err.status_code(), format!("Invalid JSON body: {err}"));
    InternalError::from_response(err, response).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = failure(
        actix_web::http::StatusCode::BAD_REQUEST,
        format!("Invalid query string: {err}"),
    );
    InternalError::from_response(err, response).into()
}

async fn not_found() -> HttpResponse {
    failure(actix_web::http::StatusCode::NOT_FOUND, "Route not found")
}
