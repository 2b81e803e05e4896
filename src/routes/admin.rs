use actix_web::{HttpResponse, Responder, delete, get, post, put, web};
use serde_json::Value;

use crate::domain::auth::AuthenticatedUser;
use crate::dto::api::ApiEnvelope;
use crate::repository::DieselRepository;
use crate::routes::{error_response, ok};
use crate::services::admin as admin_service;

#[get("/admin/{collection}")]
pub async fn list_documents(
    collection: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match admin_service::list_documents(repo.get_ref(), &user, &collection) {
        Ok(docs) => ok(docs),
        Err(err) => error_response(err, &format!("Failed to list `{collection}`")),
    }
}

#[post("/admin/{collection}")]
pub async fn create_document(
    collection: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(payload): web::Json<Value>,
) -> impl Responder {
    match admin_service::create_document(repo.get_ref(), &user, &collection, payload) {
        Ok(doc) => HttpResponse::Created().json(ApiEnvelope::data(doc)),
        Err(err) => error_response(err, &format!("Failed to create a `{collection}` document")),
    }
}

#[put("/admin/{collection}/{id}")]
pub async fn update_document(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(payload): web::Json<Value>,
) -> impl Responder {
    let (collection, id) = path.into_inner();
    match admin_service::update_document(repo.get_ref(), &user, &collection, &id, payload) {
        Ok(doc) => ok(doc),
        Err(err) => error_response(err, &format!("Failed to update `{collection}/{id}`")),
    }
}

#[delete("/admin/{collection}/{id}")]
pub async fn delete_document(
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (collection, id) = path.into_inner();
    match admin_service::delete_document(repo.get_ref(), &user, &collection, &id) {
        Ok(()) => HttpResponse::Ok().json(ApiEnvelope::<()>::message("Document deleted")),
        Err(err) => error_response(err, &format!("Failed to delete `{collection}/{id}`")),
    }
}
