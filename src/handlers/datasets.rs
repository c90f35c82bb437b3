use std::collections::HashMap;
use actix_web::{web, HttpResponse};

use crate::models::response::ErrorResponse;
use crate::services::datasets;

pub async fn list_datasets() -> HttpResponse {
    HttpResponse::Ok().json(datasets::list_datasets())
}

/// Rows of a dataset, filtered by exact match on query-string fields
pub async fn query_dataset(
    name: web::Path<String>,
    filters: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    HttpResponse::Ok().json(datasets::query_dataset(&name, &filters))
}

pub async fn get_schema(name: web::Path<String>) -> HttpResponse {
    match datasets::schema(&name) {
        Some(schema) => HttpResponse::Ok().json(schema),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: format!("Dataset {} not found", name),
            status_code: 404,
        }),
    }
}
