use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};

use tripplanner_api::{
    config::AppConfig,
    db::{memory::MemoryStore, mongo::MongoStore},
    routes,
    services::openai_service::{OpenAiClient, TextGenerator},
    state::AppState,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let generator: Option<Arc<dyn TextGenerator>> = match config.openai.clone() {
        Some(openai) => {
            let client: Arc<dyn TextGenerator> = Arc::new(
                OpenAiClient::new(openai)
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?,
            );
            Some(client)
        }
        None => {
            warn!("OPENAI_API_KEY not set; itinerary generation is disabled");
            None
        }
    };

    let state = match &config.mongodb_uri {
        Some(uri) => {
            info!("Connecting to MongoDB database {}", config.mongodb_database);
            let store = MongoStore::connect(uri, &config.mongodb_database)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            AppState::new(Arc::new(store), generator)
        }
        None => {
            warn!("MONGODB_URI not set; using the in-memory store, data is lost on exit");
            AppState::new(Arc::new(MemoryStore::new()), generator)
        }
    };
    let state = web::Data::new(state);

    info!("Starting HTTP server on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
