use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware::Logger};
use std::io;

use ai_dash_engine::config::Config;
use ai_dash_engine::handlers;
use ai_dash_engine::services::ConversationService;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("🚀 Starting analytics chat engine");

    // Load configuration from environment variables
    let config = Config::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {:#}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;
    log::info!("🤖 Using {} provider: {:?}", config.llm.provider, config.llm);

    let conversation_service = web::Data::new(ConversationService::new(config.llm.clone()));

    let server_url = format!("http://127.0.0.1:{}", config.server_port);
    log::info!("🌐 Starting server at {}", server_url);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(conversation_service.clone())
            .configure(handlers::configure)
    })
    .bind(format!("127.0.0.1:{}", config.server_port))
    .map_err(|e| {
        log::error!("❌ Failed to bind to port {}: {}", config.server_port, e);
        e
    })?
    .run()
    .await
}
