pub mod health;
pub mod trip;

use actix_web::{error, web, HttpRequest};

use crate::error::TripError;

/// Registers the trip API. The fixed `/trips/*` paths go before `/trips/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(
            web::scope("/api")
                .route("/trips", web::post().to(trip::create_trip))
                .route("/user/{user_id}/trips", web::get().to(trip::get_user_trips))
                .route(
                    "/user/{user_id}/default-trip",
                    web::get().to(trip::get_default_trip),
                )
                .route("/trips/add-place", web::post().to(trip::add_place))
                .route("/trips/remove-place", web::post().to(trip::remove_place))
                .route("/trips/add-guide", web::post().to(trip::add_guide))
                .route("/trips/remove-guide", web::post().to(trip::remove_guide))
                .route("/trips/update-guide", web::put().to(trip::update_guide))
                .route("/trips/add-hotel", web::post().to(trip::add_hotel))
                .route("/trips/remove-hotel", web::post().to(trip::remove_hotel))
                .route("/trips/update-hotel", web::put().to(trip::update_hotel))
                .route("/trips/add-vehicle", web::post().to(trip::add_vehicle))
                .route("/trips/remove-vehicle", web::post().to(trip::remove_vehicle))
                .route("/trips/update-vehicle", web::put().to(trip::update_vehicle))
                .route("/trips/confirm", web::post().to(trip::confirm_trip))
                .route("/trips/{id}", web::get().to(trip::get_trip))
                .route("/trips/{id}", web::put().to(trip::update_trip))
                .route("/trips/{id}", web::delete().to(trip::delete_trip)),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
        TripError::validation(format!("Invalid request body: {}", err)).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(
        |err: error::QueryPayloadError, _req: &HttpRequest| {
            TripError::validation(format!("Invalid query string: {}", err)).into()
        },
    )
}
