use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::IndexOptions,
    Collection, Database, IndexModel,
};

use crate::db::mongo::TRIPS_COLLECTION;
use crate::error::{TripError, TripResult};
use crate::models::trip::Trip;

/// What a trip id resolves to for a given caller. Only used for audit logs;
/// callers always see the same not-found response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripLookup {
    Owned,
    OwnedByOther,
    Deleted,
    Absent,
}

#[derive(Debug)]
pub enum SaveOutcome {
    /// The stored trip, with its bumped version.
    Saved(Trip),
    /// Someone else saved the trip since it was loaded.
    VersionConflict,
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Stores a new trip and returns it with its assigned id.
    async fn insert(&self, trip: Trip) -> TripResult<Trip>;

    /// Finds an active trip by id, restricted to its owner.
    async fn find_active(&self, id: &ObjectId, user_id: &str) -> TripResult<Option<Trip>>;

    async fn find_active_by_name(&self, user_id: &str, name: &str) -> TripResult<Option<Trip>>;

    /// Active trips of a user, most recently updated first.
    async fn list_active(&self, user_id: &str) -> TripResult<Vec<Trip>>;

    async fn probe(&self, id: &ObjectId, user_id: &str) -> TripResult<TripLookup>;

    /// Replaces the stored trip if its version still matches `trip.version`.
    async fn save(&self, trip: &Trip) -> TripResult<SaveOutcome>;
}

pub struct MongoTripRepository {
    collection: Collection<Trip>,
}

impl MongoTripRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Trip>(TRIPS_COLLECTION),
        }
    }

    pub async fn init_indexes(&self) -> TripResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "userId": 1, "isActive": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_user_active".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "userId": 1, "status": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_user_status".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        log::info!("Trip indexes created");
        Ok(())
    }
}

#[async_trait]
impl TripRepository for MongoTripRepository {
    async fn insert(&self, mut trip: Trip) -> TripResult<Trip> {
        trip.id = None;
        let result = self.collection.insert_one(&trip).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| TripError::Internal("inserted trip has no ObjectId".to_string()))?;
        trip.id = Some(id);
        Ok(trip)
    }

    async fn find_active(&self, id: &ObjectId, user_id: &str) -> TripResult<Option<Trip>> {
        let filter = doc! { "_id": *id, "userId": user_id, "isActive": true };
        Ok(self.collection.find_one(filter).await?)
    }

    async fn find_active_by_name(&self, user_id: &str, name: &str) -> TripResult<Option<Trip>> {
        let filter = doc! { "userId": user_id, "isActive": true, "name": name };
        Ok(self.collection.find_one(filter).await?)
    }

    async fn list_active(&self, user_id: &str) -> TripResult<Vec<Trip>> {
        let filter = doc! { "userId": user_id, "isActive": true };
        let trips: Vec<Trip> = self
            .collection
            .find(filter)
            .sort(doc! { "updatedAt": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(trips)
    }

    async fn probe(&self, id: &ObjectId, user_id: &str) -> TripResult<TripLookup> {
        let raw = self.collection.clone_with_type::<Document>();
        let found = raw
            .find_one(doc! { "_id": *id })
            .projection(doc! { "userId": 1, "isActive": 1 })
            .await?;

        Ok(match found {
            None => TripLookup::Absent,
            Some(d) => classify(
                d.get_str("userId").unwrap_or_default() == user_id,
                d.get_bool("isActive").unwrap_or(true),
            ),
        })
    }

    async fn save(&self, trip: &Trip) -> TripResult<SaveOutcome> {
        let id = trip
            .id
            .ok_or_else(|| TripError::Internal("cannot save a trip without an id".to_string()))?;

        // Documents written before versioning have no field at all.
        let expected = if trip.version == 0 {
            Bson::Document(doc! { "$in": [0_i64, Bson::Null] })
        } else {
            Bson::Int64(trip.version)
        };

        let mut next = trip.clone();
        next.version = trip.version + 1;
        next.updated_at = Utc::now();

        let result = self
            .collection
            .replace_one(doc! { "_id": id, "version": expected }, &next)
            .await?;

        if result.matched_count == 0 {
            return Ok(SaveOutcome::VersionConflict);
        }
        Ok(SaveOutcome::Saved(next))
    }
}

pub(crate) fn classify(owned: bool, active: bool) -> TripLookup {
    match (owned, active) {
        (false, _) => TripLookup::OwnedByOther,
        (true, false) => TripLookup::Deleted,
        (true, true) => TripLookup::Owned,
    }
}
