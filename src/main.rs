use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;

use clinic_desk::{
    config::Settings,
    conversation::session::SessionStore,
    database, utils,
    voice::{client::VendorClient, VoiceServices},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let pool = database::build_pool(&settings.database_url)?;
    database::run_migrations(&pool)?;

    let voice = match settings.vendor.clone() {
        Some(vendor) => VendorClient::new(vendor)?.into_services(),
        None => {
            log::warn!("LLM_API_URL not set, conversation and transcription are disabled");
            VoiceServices::disabled()
        }
    };

    let bind = settings.bind_addr.clone();
    let pool = web::Data::new(pool);
    let sessions = web::Data::new(SessionStore::new(settings.conversation_ttl));
    let voice = web::Data::new(voice);
    let settings = web::Data::new(settings);

    log::info!("listening on {}", bind);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(pool.clone())
            .app_data(sessions.clone())
            .app_data(voice.clone())
            .app_data(settings.clone())
            .configure(clinic_desk::configure)
            .default_service(web::to(utils::not_found))
    })
    .bind(&bind)
    .with_context(|| format!("Failed to bind {}", bind))?
    .run()
    .await
    .context("Server error")
}
