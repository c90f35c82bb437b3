pub mod conversation;
pub mod datasets;
pub mod provider;

pub use conversation::*;
pub use datasets::*;
pub use provider::*;

use actix_web::web;

/// Register every API route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/query").route(web::post().to(query_endpoint)))
        .service(web::resource("/examples").route(web::get().to(list_examples)))
        .service(web::resource("/datasets").route(web::get().to(list_datasets)))
        .service(web::resource("/datasets/{name}").route(web::get().to(query_dataset)))
        .service(web::resource("/datasets/{name}/schema").route(web::get().to(get_schema)))
        .service(web::resource("/provider/health").route(web::get().to(provider_health)))
        .service(web::resource("/provider/config").route(web::put().to(update_provider_config)))
        .service(web::resource("/conversations/{id}/story").route(web::get().to(get_story)));
}
