use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection, Database,
};

use crate::db::mongo::{GUIDES_COLLECTION, HOTELS_COLLECTION, PLACES_COLLECTION, VEHICLES_COLLECTION};
use crate::error::TripResult;
use crate::models::resource::{Guide, Hotel, Place, Vehicle};

/// Lookup capability over the bookable resources. The trip core never writes
/// through it; a `None` means the resource is gone.
#[async_trait]
pub trait ResourceReader: Send + Sync {
    async fn find_place(&self, id: &ObjectId) -> TripResult<Option<Place>>;

    async fn find_guide(&self, id: &ObjectId) -> TripResult<Option<Guide>>;

    async fn find_hotel(&self, id: &ObjectId) -> TripResult<Option<Hotel>>;

    async fn find_vehicle(&self, id: &ObjectId) -> TripResult<Option<Vehicle>>;
}

pub struct MongoResourceReader {
    places: Collection<Place>,
    guides: Collection<Guide>,
    hotels: Collection<Hotel>,
    vehicles: Collection<Vehicle>,
}

impl MongoResourceReader {
    pub fn new(db: &Database) -> Self {
        Self {
            places: db.collection(PLACES_COLLECTION),
            guides: db.collection(GUIDES_COLLECTION),
            hotels: db.collection(HOTELS_COLLECTION),
            vehicles: db.collection(VEHICLES_COLLECTION),
        }
    }
}

#[async_trait]
impl ResourceReader for MongoResourceReader {
    async fn find_place(&self, id: &ObjectId) -> TripResult<Option<Place>> {
        Ok(self.places.find_one(doc! { "_id": *id }).await?)
    }

    async fn find_guide(&self, id: &ObjectId) -> TripResult<Option<Guide>> {
        Ok(self.guides.find_one(doc! { "_id": *id }).await?)
    }

    async fn find_hotel(&self, id: &ObjectId) -> TripResult<Option<Hotel>> {
        Ok(self.hotels.find_one(doc! { "_id": *id }).await?)
    }

    async fn find_vehicle(&self, id: &ObjectId) -> TripResult<Option<Vehicle>> {
        Ok(self.vehicles.find_one(doc! { "_id": *id }).await?)
    }
}
