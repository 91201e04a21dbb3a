#![allow(dead_code)]

use actix_web::{middleware::Logger, web, App};
use mongodb::bson::oid::ObjectId;
use serde_json::{json, Value};
use std::sync::Arc;

use tour_planner_api::config::TripConfig;
use tour_planner_api::db::memory::{InMemoryResourceReader, InMemoryTripRepository};
use tour_planner_api::models::resource::{Guide, Hotel, Place, Vehicle};
use tour_planner_api::routes;
use tour_planner_api::services::trip_service::TripService;

pub const TEST_USER: &str = "test_user_123";
pub const OTHER_USER: &str = "test_user_456";

/// Trip API wired to in-memory storage.
pub struct TestApp {
    pub trips: InMemoryTripRepository,
    pub resources: InMemoryResourceReader,
    pub service: TripService,
}

impl TestApp {
    pub fn new() -> Self {
        let trips = InMemoryTripRepository::new();
        let resources = InMemoryResourceReader::new();
        let service = TripService::new(
            Arc::new(trips.clone()),
            Arc::new(resources.clone()),
            TripConfig::default(),
        );

        Self {
            trips,
            resources,
            service,
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(self.service.clone()))
            .configure(routes::configure)
    }

    /// Resources are built from their stored JSON shape.
    pub async fn seed_place(&self, entry_fee: &str) -> ObjectId {
        let id = ObjectId::new();
        let place: Place = from_stored(json!({
            "_id": { "$oid": id.to_hex() },
            "name": "Sigiriya",
            "entryFee": entry_fee
        }));
        self.resources.insert_place(place).await;
        id
    }

    pub async fn seed_guide(&self, daily_rate: f64) -> ObjectId {
        let id = ObjectId::new();
        let guide: Guide = from_stored(json!({
            "_id": { "$oid": id.to_hex() },
            "guideName": "Kamal",
            "pricing": { "hourlyRate": 1000, "dailyRate": daily_rate, "currency": "LKR" },
            "availability": { "isAvailable": true, "workingHours": { "start": "08:00", "end": "17:00" } }
        }));
        self.resources.insert_guide(guide).await;
        id
    }

    /// Returns the hotel id and the id of its single package.
    pub async fn seed_hotel(&self) -> (ObjectId, ObjectId) {
        let id = ObjectId::new();
        let package_id = ObjectId::new();
        let hotel: Hotel = from_stored(json!({
            "_id": { "$oid": id.to_hex() },
            "hotelName": "Lake View",
            "roomPackages": [{
                "_id": { "$oid": package_id.to_hex() },
                "packageName": "Deluxe",
                "roomType": "Double",
                "price": 12000,
                "capacity": 2
            }]
        }));
        self.resources.insert_hotel(hotel).await;
        (id, package_id)
    }

    pub async fn seed_vehicle(&self, passengers: u32, status: &str) -> ObjectId {
        let id = ObjectId::new();
        let vehicle: Vehicle = from_stored(json!({
            "_id": { "$oid": id.to_hex() },
            "type": "Van",
            "passengerAmount": passengers,
            "rentPrice": 5000,
            "driverCost": 1500,
            "status": status
        }));
        self.resources.insert_vehicle(vehicle).await;
        id
    }
}

fn from_stored<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}
