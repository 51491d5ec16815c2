// src/main.rs

mod app_state;
mod auth;
mod config;
mod error;
mod middleware;
mod models;
mod projection;
mod routes;
mod store;
mod task;
#[cfg(test)]
mod test_support;
mod user_management;

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};

use crate::app_state::AppState;
use crate::config::Config;
use crate::store::MongoStore;

fn cors(config: &Config) -> Cors {
    config
        .allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let store = MongoStore::connect(&config.mongo_uri, &config.database_name)
        .await
        .map_err(|e| {
            error!("Could not create MongoDB client: {}", e);
            io::Error::new(io::ErrorKind::Other, e)
        })?;
    match store.ping().await {
        Ok(()) => info!("Pinged your deployment. You successfully connected to MongoDB!"),
        Err(e) => error!("MongoDB ping failed: {}", e),
    }
    let store = Arc::new(store);

    if config.enforce_task_ownership {
        info!("Task ownership policy enabled");
    } else {
        warn!("Task ownership policy disabled: any authenticated caller may modify any task");
    }

    let port = config.port;
    let state = web::Data::new(AppState::new(store.clone(), store, config.clone()));

    info!("Task Management Server is running on port {}", port);
    info!("Allowed CORS origins: {:?}", config.allowed_origins);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors(&config))
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
