//! In-memory repositories, for local development and tests.

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::resources::ResourceReader;
use crate::db::trips::{classify, SaveOutcome, TripLookup, TripRepository};
use crate::error::TripResult;
use crate::models::resource::{Guide, Hotel, Place, Vehicle};
use crate::models::trip::Trip;

#[derive(Debug, Default, Clone)]
pub struct InMemoryTripRepository {
    trips: Arc<RwLock<HashMap<ObjectId, Trip>>>,
}

impl InMemoryTripRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored copy, regardless of owner or soft-delete state.
    pub async fn get(&self, id: &ObjectId) -> Option<Trip> {
        self.trips.read().await.get(id).cloned()
    }
}

#[async_trait]
impl TripRepository for InMemoryTripRepository {
    async fn insert(&self, mut trip: Trip) -> TripResult<Trip> {
        let id = ObjectId::new();
        trip.id = Some(id);
        self.trips.write().await.insert(id, trip.clone());
        Ok(trip)
    }

    async fn find_active(&self, id: &ObjectId, user_id: &str) -> TripResult<Option<Trip>> {
        let trips = self.trips.read().await;
        Ok(trips
            .get(id)
            .filter(|t| t.user_id == user_id && t.is_active)
            .cloned())
    }

    async fn find_active_by_name(&self, user_id: &str, name: &str) -> TripResult<Option<Trip>> {
        let trips = self.trips.read().await;
        Ok(trips
            .values()
            .find(|t| t.user_id == user_id && t.is_active && t.name == name)
            .cloned())
    }

    async fn list_active(&self, user_id: &str) -> TripResult<Vec<Trip>> {
        let trips = self.trips.read().await;
        let mut result: Vec<Trip> = trips
            .values()
            .filter(|t| t.user_id == user_id && t.is_active)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(result)
    }

    async fn probe(&self, id: &ObjectId, user_id: &str) -> TripResult<TripLookup> {
        let trips = self.trips.read().await;
        Ok(match trips.get(id) {
            None => TripLookup::Absent,
            Some(t) => classify(t.user_id == user_id, t.is_active),
        })
    }

    async fn save(&self, trip: &Trip) -> TripResult<SaveOutcome> {
        let Some(id) = trip.id else {
            return Ok(SaveOutcome::VersionConflict);
        };

        let mut trips = self.trips.write().await;
        match trips.get(&id) {
            Some(stored) if stored.version == trip.version => {
                let mut next = trip.clone();
                next.version += 1;
                next.updated_at = Utc::now();
                trips.insert(id, next.clone());
                Ok(SaveOutcome::Saved(next))
            }
            _ => Ok(SaveOutcome::VersionConflict),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryResourceReader {
    places: Arc<RwLock<HashMap<ObjectId, Place>>>,
    guides: Arc<RwLock<HashMap<ObjectId, Guide>>>,
    hotels: Arc<RwLock<HashMap<ObjectId, Hotel>>>,
    vehicles: Arc<RwLock<HashMap<ObjectId, Vehicle>>>,
}

impl InMemoryResourceReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_place(&self, place: Place) {
        self.places.write().await.insert(place.id, place);
    }

    pub async fn insert_guide(&self, guide: Guide) {
        self.guides.write().await.insert(guide.id, guide);
    }

    pub async fn insert_hotel(&self, hotel: Hotel) {
        self.hotels.write().await.insert(hotel.id, hotel);
    }

    pub async fn insert_vehicle(&self, vehicle: Vehicle) {
        self.vehicles.write().await.insert(vehicle.id, vehicle);
    }

    pub async fn remove_place(&self, id: &ObjectId) {
        self.places.write().await.remove(id);
    }

    pub async fn remove_guide(&self, id: &ObjectId) {
        self.guides.write().await.remove(id);
    }

    pub async fn remove_vehicle(&self, id: &ObjectId) {
        self.vehicles.write().await.remove(id);
    }
}

#[async_trait]
impl ResourceReader for InMemoryResourceReader {
    async fn find_place(&self, id: &ObjectId) -> TripResult<Option<Place>> {
        Ok(self.places.read().await.get(id).cloned())
    }

    async fn find_guide(&self, id: &ObjectId) -> TripResult<Option<Guide>> {
        Ok(self.guides.read().await.get(id).cloned())
    }

    async fn find_hotel(&self, id: &ObjectId) -> TripResult<Option<Hotel>> {
        Ok(self.hotels.read().await.get(id).cloned())
    }

    async fn find_vehicle(&self, id: &ObjectId) -> TripResult<Option<Vehicle>> {
        Ok(self.vehicles.read().await.get(id).cloned())
    }
}
