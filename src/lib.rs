#[macro_use]
extern crate diesel;

pub mod admin;
pub mod api;
pub mod auth;
pub mod booking;
pub mod config;
pub mod conversation;
pub mod database;
pub mod error;
pub mod models;
pub mod protocol;
pub mod public;
pub mod schema;
pub mod slug;
pub mod utils;
pub mod voice;
pub mod walk_in;

use actix_web::web;

use crate::error::ApiError;

/// Every route of the service. The app must also carry `Settings`, the DB
/// pool, the conversation `SessionStore` and `VoiceServices` as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        ApiError::validation(format!("Invalid JSON body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        ApiError::validation(format!("Invalid query string: {}", err)).into()
    }))
    .service(web::scope("/api").configure(api::config))
    .service(web::scope("/admin").configure(admin::config))
    .service(web::scope("/public").configure(public::config));
}
