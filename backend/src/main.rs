mod config;
mod error;
mod job_controller;
mod remote;
mod services;

use crate::config::Config;
use crate::job_controller::state::BatchesState;
use crate::remote::RemoteClient;
use crate::services::auth::guard::require_session;
use actix_web::middleware::{from_fn, Logger};
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use tokio::sync::mpsc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::load().map_err(|e| {
        error!("Configuration error: {e}");
        std::io::Error::other(e)
    })?;
    let client = RemoteClient::new(config.remote_url.clone(), config.request_timeout)
        .map_err(std::io::Error::other)?;
    let address = config.address();

    // Initialize batch tracking state
    let (tx, rx) = mpsc::channel(100);
    let batches_state = BatchesState::new(tx);

    // Start batch updater task
    let updater_state = batches_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_batch_updater(updater_state, rx).await;
    });

    info!("Server running at http://{}:{}", address.0, address.1);

    let config = web::Data::new(config);
    let client = web::Data::new(client);
    let batches_state = web::Data::new(batches_state);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::JsonConfig::default().limit(config.max_upload_bytes))
            .app_data(config.clone())
            .app_data(client.clone())
            .app_data(batches_state.clone())
            .service(services::auth::configure_routes())
            .service(
                services::batches::configure_routes::<RemoteClient>()
                    .wrap(from_fn(require_session)),
            )
            .service(services::pages::upload_scope().wrap(from_fn(require_session)))
            .service(services::verify::configure_routes::<RemoteClient>())
            .service(services::verify::configure_api_routes::<RemoteClient>())
            .configure(services::pages::configure_public)
            .default_service(web::route().to(services::pages::serve_embedded))
    })
    .bind(address)?
    .run()
    .await
}
