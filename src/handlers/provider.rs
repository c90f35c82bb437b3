use actix_web::{web, HttpResponse, Error};
use log::{info, error};
use serde::Serialize;

use crate::config::{LlmConfig, ProviderKind};
use crate::models::response::ErrorResponse;
use crate::services::conversation::ConversationService;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub provider: ProviderKind,
    pub connected: bool,
}

/// Probe the configured provider
pub async fn provider_health(
    conversation_service: web::Data<ConversationService>,
) -> Result<HttpResponse, Error> {
    match conversation_service.test_connection().await {
        Ok((provider, connected)) => {
            info!("Provider {} connection test: {}", provider, connected);
            Ok(HttpResponse::Ok().json(HealthResponse { provider, connected }))
        },
        Err(e) => {
            error!("Failed to obtain provider: {}", e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to obtain provider: {}", e),
                status_code: 500,
            }))
        }
    }
}

/// Replace the provider configuration
pub async fn update_provider_config(
    config: web::Json<LlmConfig>,
    conversation_service: web::Data<ConversationService>,
) -> Result<HttpResponse, Error> {
    match conversation_service.reconfigure(config.into_inner()) {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => {
            error!("Failed to update provider config: {}", e);
            Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to update provider config: {}", e),
                status_code: 500,
            }))
        }
    }
}
