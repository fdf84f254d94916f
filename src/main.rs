mod config;
mod db;
mod errors;
mod handlers;
mod middlewares;
mod models;
mod payloads;
mod qr;
mod routes;
mod services;
mod state;
mod structs;
mod utils;

use std::sync::Arc;

use crate::config::{AppConfig, StorageBackend};
use crate::db::memory::InMemoryRecordStore;
use crate::db::records::{MongoRecordStore, RecordStore};
use crate::qr::encoder::QrSymbolEncoder;
use crate::state::app_state::AppState;
use actix_cors::Cors;
use actix_web::{App, HttpServer, http, middleware::Logger, web};
use anyhow::Context;
use db::mongodb::get_database;
use dotenv::dotenv;
use env_logger::Env;
use log::{info, warn};
use routes::init_routes;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = AppConfig::from_env()?;

    // Pick the record store
    let store: Arc<dyn RecordStore> = match config.storage {
        StorageBackend::MongoDb => {
            let db = get_database(&config.mongodb_uri, &config.mongodb_db)
                .await
                .context("Error connecting to the database")?;
            Arc::new(MongoRecordStore::new(db))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory record storage; records are lost on restart");
            Arc::new(InMemoryRecordStore::new())
        }
    };

    // Create shared state
    let app_state = web::Data::new(AppState::new(Arc::new(QrSymbolEncoder), store));

    let bind_addr = (config.host.clone(), config.port);
    let cors_origins = config.cors_origins.clone();
    let jwt_secret = config.jwt_secret.clone();
    info!(
        "Starting server on {}:{} with {:?} storage",
        bind_addr.0, bind_addr.1, config.storage
    );

    // Start the Actix Web server
    HttpServer::new(move || {
        // Create a logger with a custom format instead
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .max_age(3600);
        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(|cfg| init_routes(cfg, &jwt_secret))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
