use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use tour_planner_api::config::AppConfig;
use tour_planner_api::db::mongo::create_mongo_client;
use tour_planner_api::db::resources::MongoResourceReader;
use tour_planner_api::db::trips::MongoTripRepository;
use tour_planner_api::routes;
use tour_planner_api::services::trip_service::TripService;

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("Application starting...");

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let client = create_mongo_client(&config.mongo_uri, &config.database_name)
        .await
        .map_err(|e| {
            log::error!("Failed to create MongoDB client: {}", e);
            io::Error::new(io::ErrorKind::Other, e.to_string())
        })?;
    let database = client.database(&config.database_name);

    let trips = MongoTripRepository::new(&database);
    if let Err(e) = trips.init_indexes().await {
        log::warn!("Could not create trip indexes: {}", e);
    }

    let service = TripService::new(
        Arc::new(trips),
        Arc::new(MongoResourceReader::new(&database)),
        config.trips.clone(),
    );

    let bind = (config.host.clone(), config.port);
    log::info!("Starting HTTP server on {}:{}", bind.0, bind.1);

    let service = web::Data::new(service);
    let client = web::Data::new(client);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(service.clone())
            .app_data(client.clone())
            .app_data(config.clone())
            .route("/health", web::get().to(routes::health::health_check))
            .configure(routes::configure)
    })
    .bind(bind)?
    .run()
    .await
}
