use actix_web::{Responder, get, web};

use crate::forms::pharmacies::PharmaciesQuery;
use crate::repository::DieselRepository;
use crate::routes::{error_response, ok};
use crate::services::{pharmacies as pharmacies_service, public as public_service};

#[get("/public/pharmacies")]
pub async fn search_pharmacies(
    repo: web::Data<DieselRepository>,
    query: web::Query<PharmaciesQuery>,
) -> impl Responder {
    match pharmacies_service::search_pharmacies(repo.get_ref(), query.into_inner()) {
        Ok(docs) => ok(docs),
        Err(err) => error_response(err, "Failed to search pharmacies"),
    }
}

#[get("/public/{collection}")]
pub async fn list_documents(
    collection: web::Path<String>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match public_service::list_documents(repo.get_ref(), &collection) {
        Ok(docs) => ok(docs),
        Err(err) => error_response(err, &format!("Failed to list `{collection}`")),
    }
}

#[get("/public/{collection}/{id}")]
pub async fn get_document(
    path: web::Path<(String, String)>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (collection, id) = path.into_inner();
    match public_service::get_document(repo.get_ref(), &collection, &id) {
        Ok(doc) => ok(doc),
        Err(err) => error_response(err, &format!("Failed to load `{collection}/{id}`")),
    }
}
