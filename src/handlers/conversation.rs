use actix_web::{web, HttpResponse, Error};
use log::{info, error};
use serde::Deserialize;

use crate::models::conversation::QueryRequest;
use crate::models::response::ErrorResponse;
use crate::services::conversation::ConversationService;
use crate::services::synthesizer::EXAMPLE_QUERIES;

/// Handle a natural language query
pub async fn query_endpoint(
    query_req: web::Json<QueryRequest>,
    conversation_service: web::Data<ConversationService>,
) -> Result<HttpResponse, Error> {
    let request = query_req.into_inner();
    if request.query.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Query must not be empty".to_string(),
            status_code: 400,
        }));
    }

    info!("Received query: {}", request.query);

    match conversation_service.handle_request(request).await {
        Ok(response) => {
            info!("Query processed successfully");
            Ok(HttpResponse::Ok().json(response))
        },
        Err(e) => {
            error!("Error processing query: {}", e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Error processing query: {}", e),
                status_code: 500,
            }))
        }
    }
}

/// Example queries the engine can answer
pub async fn list_examples() -> HttpResponse {
    HttpResponse::Ok().json(EXAMPLE_QUERIES)
}

#[derive(Debug, Deserialize)]
pub struct StoryParams {
    pub title: Option<String>,
}

/// Report generated from a stored conversation
pub async fn get_story(
    conversation_id: web::Path<String>,
    params: web::Query<StoryParams>,
    conversation_service: web::Data<ConversationService>,
) -> Result<HttpResponse, Error> {
    let conversation_id = conversation_id.into_inner();

    match conversation_service.story(&conversation_id, params.title.as_deref()) {
        Ok(Some(story)) => Ok(HttpResponse::Ok().json(story)),
        Ok(None) => Ok(HttpResponse::NotFound().json(ErrorResponse {
            error: format!("Conversation with ID {} not found", conversation_id),
            status_code: 404,
        })),
        Err(e) => {
            error!("Failed to build story for {}: {}", conversation_id, e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to build story: {}", e),
                status_code: 500,
            }))
        }
    }
}
