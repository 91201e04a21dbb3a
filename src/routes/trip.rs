use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::TripError;
use crate::models::requests::{
    ConfirmTripInput, CreateTripInput, Expand, ExpandQuery, GuideInput, HotelInput, PlaceInput,
    TripQuery, UpdateTripInput, VehicleInput,
};
use crate::models::trip::Trip;
use crate::services::trip_service::TripService;

type HandlerResult = Result<HttpResponse, TripError>;

async fn trip_response(
    service: &TripService,
    trip: Trip,
    expand: Expand,
    message: Option<&str>,
) -> HandlerResult {
    let trip = service.populate(trip, expand).await?;
    let body = match message {
        Some(message) => json!({ "status": "Success", "trip": trip, "message": message }),
        None => json!({ "status": "Success", "trip": trip }),
    };
    Ok(HttpResponse::Ok().json(body))
}

/*
    POST /api/trips
*/
pub async fn create_trip(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<CreateTripInput>,
) -> HandlerResult {
    let trip = service.create_trip(input.into_inner()).await?;
    let trip = service.populate(trip, query.expand).await?;
    Ok(HttpResponse::Created().json(json!({ "status": "Success", "trip": trip })))
}

/*
    GET /api/user/{user_id}/trips
*/
pub async fn get_user_trips(
    service: web::Data<TripService>,
    path: web::Path<String>,
    query: web::Query<ExpandQuery>,
) -> HandlerResult {
    let trips = service.list_user_trips(&path.into_inner()).await?;
    let trips = service.populate_all(trips, query.expand).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "Success", "trips": trips })))
}

/*
    GET /api/user/{user_id}/default-trip
*/
pub async fn get_default_trip(
    service: web::Data<TripService>,
    path: web::Path<String>,
    query: web::Query<ExpandQuery>,
) -> HandlerResult {
    let trip = service.get_or_create_default_trip(&path.into_inner()).await?;
    trip_response(&service, trip, query.expand, None).await
}

/*
    GET /api/trips/{id}?userId=
*/
pub async fn get_trip(
    service: web::Data<TripService>,
    path: web::Path<String>,
    query: web::Query<TripQuery>,
) -> HandlerResult {
    let trip = service.get_trip(&path.into_inner(), &query.user_id).await?;
    trip_response(&service, trip, query.expand, None).await
}

/*
    PUT /api/trips/{id}
*/
pub async fn update_trip(
    service: web::Data<TripService>,
    path: web::Path<String>,
    query: web::Query<ExpandQuery>,
    input: web::Json<UpdateTripInput>,
) -> HandlerResult {
    let trip = service
        .update_trip(&path.into_inner(), input.into_inner())
        .await?;
    trip_response(&service, trip, query.expand, None).await
}

/*
    DELETE /api/trips/{id}?userId=
*/
pub async fn delete_trip(
    service: web::Data<TripService>,
    path: web::Path<String>,
    query: web::Query<TripQuery>,
) -> HandlerResult {
    service.delete_trip(&path.into_inner(), &query.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "Success",
        "message": "Trip deleted successfully",
    })))
}

/*
    POST /api/trips/confirm
*/
pub async fn confirm_trip(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<ConfirmTripInput>,
) -> HandlerResult {
    let trip = service.confirm_trip(input.into_inner()).await?;
    trip_response(&service, trip, query.expand, Some("Trip confirmed successfully")).await
}

/*
    POST /api/trips/add-place, /api/trips/remove-place
*/
pub async fn add_place(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<PlaceInput>,
) -> HandlerResult {
    let trip = service.add_place(input.into_inner()).await?;
    trip_response(&service, trip, query.expand, Some("Place added to trip successfully")).await
}

pub async fn remove_place(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<PlaceInput>,
) -> HandlerResult {
    let trip = service.remove_place(input.into_inner()).await?;
    trip_response(
        &service,
        trip,
        query.expand,
        Some("Place removed from trip successfully"),
    )
    .await
}

/*
    POST /api/trips/add-guide, /api/trips/remove-guide
    PUT  /api/trips/update-guide
*/
pub async fn add_guide(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<GuideInput>,
) -> HandlerResult {
    let trip = service.add_guide(input.into_inner()).await?;
    trip_response(&service, trip, query.expand, Some("Guide added to trip successfully")).await
}

pub async fn remove_guide(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<GuideInput>,
) -> HandlerResult {
    let trip = service.remove_guide(input.into_inner()).await?;
    trip_response(
        &service,
        trip,
        query.expand,
        Some("Guide removed from trip successfully"),
    )
    .await
}

pub async fn update_guide(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<GuideInput>,
) -> HandlerResult {
    let trip = service.update_guide(input.into_inner()).await?;
    trip_response(
        &service,
        trip,
        query.expand,
        Some("Guide updated in trip successfully"),
    )
    .await
}

/*
    POST /api/trips/add-hotel, /api/trips/remove-hotel
    PUT  /api/trips/update-hotel
*/
pub async fn add_hotel(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<HotelInput>,
) -> HandlerResult {
    let trip = service.add_hotel(input.into_inner()).await?;
    trip_response(&service, trip, query.expand, Some("Hotel added to trip successfully")).await
}

pub async fn remove_hotel(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<HotelInput>,
) -> HandlerResult {
    let trip = service.remove_hotel(input.into_inner()).await?;
    trip_response(
        &service,
        trip,
        query.expand,
        Some("Hotel removed from trip successfully"),
    )
    .await
}

pub async fn update_hotel(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<HotelInput>,
) -> HandlerResult {
    let trip = service.update_hotel(input.into_inner()).await?;
    trip_response(
        &service,
        trip,
        query.expand,
        Some("Hotel updated in trip successfully"),
    )
    .await
}

/*
    POST /api/trips/add-vehicle, /api/trips/remove-vehicle
    PUT  /api/trips/update-vehicle
*/
pub async fn add_vehicle(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<VehicleInput>,
) -> HandlerResult {
    let trip = service.add_vehicle(input.into_inner()).await?;
    trip_response(
        &service,
        trip,
        query.expand,
        Some("Vehicle added to trip successfully"),
    )
    .await
}

pub async fn remove_vehicle(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<VehicleInput>,
) -> HandlerResult {
    let trip = service.remove_vehicle(input.into_inner()).await?;
    trip_response(
        &service,
        trip,
        query.expand,
        Some("Vehicle removed from trip successfully"),
    )
    .await
}

pub async fn update_vehicle(
    service: web::Data<TripService>,
    query: web::Query<ExpandQuery>,
    input: web::Json<VehicleInput>,
) -> HandlerResult {
    let trip = service.update_vehicle(input.into_inner()).await?;
    trip_response(
        &service,
        trip,
        query.expand,
        Some("Vehicle updated in trip successfully"),
    )
    .await
}
