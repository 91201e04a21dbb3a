use chrono::Utc;
use futures::future::{join_all, try_join_all};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

use crate::config::TripConfig;
use crate::db::resources::ResourceReader;
use crate::db::trips::{SaveOutcome, TripLookup, TripRepository};
use crate::error::{TripError, TripResult};
use crate::models::populated::{PopulatedTrip, Reference};
use crate::models::requests::{
    parse_object_id, require, ConfirmTripInput, CreateTripInput, Expand, GuideInput, HotelInput,
    PlaceInput, UpdateTripInput, VehicleInput,
};
use crate::models::trip::{
    GuideEntry, HotelBookingDetails, HotelEntry, PlaceEntry, Trip, TripStatus, VehicleEntry,
    WorkingHours,
};
use crate::services::pricing_service::PricingService;

const DEFAULT_ROOMS_BOOKED: u32 = 1;
const DEFAULT_GUEST_COUNT: u32 = 2;

/// Trip composition: every mutation follows validate, load (owner only),
/// verify the resource, mutate, reprice, save.
#[derive(Clone)]
pub struct TripService {
    trips: Arc<dyn TripRepository>,
    resources: Arc<dyn ResourceReader>,
    config: TripConfig,
}

impl TripService {
    pub fn new(
        trips: Arc<dyn TripRepository>,
        resources: Arc<dyn ResourceReader>,
        config: TripConfig,
    ) -> Self {
        Self {
            trips,
            resources,
            config,
        }
    }

    pub async fn create_trip(&self, input: CreateTripInput) -> TripResult<Trip> {
        let name = require(&input.name, "Trip name is required")?;
        let user_id = require(&input.user_id, "User ID is required")?;

        let mut trip = Trip::new(user_id, name);
        trip.description = input.description.as_deref().unwrap_or("").trim().to_string();
        trip.start_date = input.start_date;
        trip.end_date = input.end_date;
        if let Some(count) = input.travellers_count {
            trip.set_travellers_count(count);
        }

        let trip = self.trips.insert(trip).await?;
        log::info!("Created trip {} for user {}", trip.id_hex(), trip.user_id);
        Ok(trip)
    }

    pub async fn list_user_trips(&self, user_id: &str) -> TripResult<Vec<Trip>> {
        if user_id.trim().is_empty() {
            return Err(TripError::validation("User ID is required"));
        }
        self.trips.list_active(user_id.trim()).await
    }

    pub async fn get_trip(&self, trip_id: &str, user_id: &Option<String>) -> TripResult<Trip> {
        let user_id = require_user(user_id)?;
        let trip_id = parse_object_id(trip_id, "trip")?;
        self.load(&trip_id, user_id).await
    }

    pub async fn update_trip(&self, trip_id: &str, input: UpdateTripInput) -> TripResult<Trip> {
        let user_id = require_user(&input.user_id)?;
        let trip_id = parse_object_id(trip_id, "trip")?;

        let name = match input.name.as_deref().map(str::trim) {
            Some("") => return Err(TripError::validation("Trip name cannot be empty")),
            other => other.map(str::to_string),
        };

        let trip = self.load(&trip_id, user_id).await?;
        let saved = self
            .apply_and_save(trip, |trip| {
                if let Some(name) = &name {
                    trip.name = name.clone();
                }
                if let Some(description) = &input.description {
                    trip.description = description.trim().to_string();
                }
                if let Some(start) = input.start_date {
                    trip.start_date = start;
                }
                if let Some(end) = input.end_date {
                    trip.end_date = end;
                }
                if let Some(status) = input.status {
                    trip.status = status;
                }
                if let Some(count) = input.travellers_count {
                    trip.set_travellers_count(count);
                }
                if let Some(amount) = input.other_expenses {
                    trip.set_other_expenses(amount);
                }
                Ok(())
            })
            .await?;

        log::info!("Updated trip {}", trip_id);
        Ok(saved)
    }

    /// Soft delete: the trip stays in storage with `isActive = false`.
    pub async fn delete_trip(&self, trip_id: &str, user_id: &Option<String>) -> TripResult<()> {
        let user_id = require_user(user_id)?;
        let trip_id = parse_object_id(trip_id, "trip")?;

        let trip = self.load(&trip_id, user_id).await?;
        self.apply_and_save(trip, |trip| {
            trip.is_active = false;
            Ok(())
        })
        .await?;

        log::info!("Deleted trip {}", trip_id);
        Ok(())
    }

    pub async fn get_or_create_default_trip(&self, user_id: &str) -> TripResult<Trip> {
        if user_id.trim().is_empty() {
            return Err(TripError::validation("User ID is required"));
        }
        let user_id = user_id.trim();
        let name = &self.config.default_trip_name;

        if let Some(trip) = self.trips.find_active_by_name(user_id, name).await? {
            return Ok(trip);
        }

        let mut trip = Trip::new(user_id, name.as_str());
        trip.description = self.config.default_trip_description.clone();
        let trip = self.trips.insert(trip).await?;
        log::info!("Created default trip {} for user {}", trip.id_hex(), user_id);
        Ok(trip)
    }

    pub async fn confirm_trip(&self, input: ConfirmTripInput) -> TripResult<Trip> {
        let trip_id = require(&input.trip_id, "Trip ID is required")?;
        let trip_id = parse_object_id(trip_id, "trip")?;
        let user_id = require_user(&input.user_id)?;

        let trip = self.load(&trip_id, user_id).await?;
        self.apply_and_save(trip, |trip| {
            if trip.status != TripStatus::Planning {
                return Err(TripError::validation(format!(
                    "Only trips in planning can be confirmed (current status: {})",
                    trip.status.as_str()
                )));
            }
            trip.status = TripStatus::Confirmed;
            Ok(())
        })
        .await
    }

    pub async fn add_place(&self, input: PlaceInput) -> TripResult<Trip> {
        let (trip_id, place_id) = required_ids(
            &input.trip_id,
            &input.place_id,
            "Trip ID and Place ID are required",
            "place",
        )?;
        let user_id = require_user(&input.user_id)?;

        let trip = self.load(&trip_id, user_id).await?;
        if self.resources.find_place(&place_id).await?.is_none() {
            return Err(TripError::not_found("Place not found"));
        }

        let notes = input.notes.unwrap_or_default();
        let saved = self
            .apply_and_save(trip, |trip| {
                if trip.has_place(&place_id) {
                    return Err(TripError::validation("Place already added to this trip"));
                }
                trip.places.push(PlaceEntry {
                    place_id,
                    notes: notes.clone(),
                    added_at: Utc::now(),
                    daily_cost: 0.0,
                    total_trip_cost: 0.0,
                });
                Ok(())
            })
            .await?;

        log::info!("Added place {} to trip {}", place_id, trip_id);
        Ok(saved)
    }

    pub async fn remove_place(&self, input: PlaceInput) -> TripResult<Trip> {
        let (trip_id, place_id) = required_ids(
            &input.trip_id,
            &input.place_id,
            "Trip ID and Place ID are required",
            "place",
        )?;
        let user_id = require_user(&input.user_id)?;

        let trip = self.load(&trip_id, user_id).await?;
        self.apply_and_save(trip, |trip| {
            trip.places.retain(|p| p.place_id != place_id);
            Ok(())
        })
        .await
    }

    pub async fn add_guide(&self, input: GuideInput) -> TripResult<Trip> {
        let (trip_id, guide_id) = required_ids(
            &input.trip_id,
            &input.guide_id,
            "Trip ID and Guide ID are required",
            "guide",
        )?;
        let user_id = require_user(&input.user_id)?;

        let trip = self.load(&trip_id, user_id).await?;
        let guide = self
            .resources
            .find_guide(&guide_id)
            .await?
            .ok_or_else(|| TripError::not_found("Guide not found"))?;

        // Requested hours win, then the guide's own schedule.
        let defaults = WorkingHours::default();
        let requested = input.working_hours.unwrap_or_default();
        let working_hours = WorkingHours {
            start: requested
                .start
                .or_else(|| guide.working_hours_start().map(str::to_string))
                .unwrap_or(defaults.start),
            end: requested
                .end
                .or_else(|| guide.working_hours_end().map(str::to_string))
                .unwrap_or(defaults.end),
            hours_per_day: defaults.hours_per_day,
        };

        let notes = input.notes.unwrap_or_default();
        let saved = self
            .apply_and_save(trip, |trip| {
                if trip.has_guide(&guide_id) {
                    return Err(TripError::validation("Guide already added to this trip"));
                }
                trip.guides.push(GuideEntry {
                    guide_id,
                    notes: notes.clone(),
                    added_at: Utc::now(),
                    working_hours: working_hours.clone(),
                    daily_cost: 0.0,
                    total_trip_cost: 0.0,
                });
                Ok(())
            })
            .await?;

        log::info!("Added guide {} to trip {}", guide_id, trip_id);
        Ok(saved)
    }

    pub async fn remove_guide(&self, input: GuideInput) -> TripResult<Trip> {
        let (trip_id, guide_id) = required_ids(
            &input.trip_id,
            &input.guide_id,
            "Trip ID and Guide ID are required",
            "guide",
        )?;
        let user_id = require_user(&input.user_id)?;

        let trip = self.load(&trip_id, user_id).await?;
        self.apply_and_save(trip, |trip| {
            trip.guides.retain(|g| g.guide_id != guide_id);
            Ok(())
        })
        .await
    }

    pub async fn update_guide(&self, input: GuideInput) -> TripResult<Trip> {
        let (trip_id, guide_id) = required_ids(
            &input.trip_id,
            &input.guide_id,
            "Trip ID and Guide ID are required",
            "guide",
        )?;
        let user_id = require_user(&input.user_id)?;

        let trip = self.load(&trip_id, user_id).await?;
        if !trip.has_guide(&guide_id) {
            return Err(TripError::not_found("Guide not found in this trip"));
        }
        if self.resources.find_guide(&guide_id).await?.is_none() {
            return Err(TripError::not_found("Guide not found"));
        }

        self.apply_and_save(trip, |trip| {
            let entry = trip
                .guide_mut(&guide_id)
                .ok_or_else(|| TripError::not_found("Guide not found in this trip"))?;
            if let Some(hours) = &input.working_hours {
                if let Some(start) = &hours.start {
                    entry.working_hours.start = start.clone();
                }
                if let Some(end) = &hours.end {
                    entry.working_hours.end = end.clone();
                }
            }
            if let Some(notes) = &input.notes {
                entry.notes = notes.clone();
            }
            Ok(())
        })
        .await
    }

    pub async fn add_hotel(&self, input: HotelInput) -> TripResult<Trip> {
        const MISSING: &str = "Trip ID, Hotel ID, Package ID, and booking details are required";

        let (trip_id, hotel_id) = required_ids(&input.trip_id, &input.hotel_id, MISSING, "hotel")?;
        let package_id = parse_object_id(require(&input.package_id, MISSING)?, "package")?;
        let details = input
            .booking_details
            .as_ref()
            .ok_or_else(|| TripError::validation(MISSING))?;
        let user_id = require_user(&input.user_id)?;

        let (check_in_date, check_out_date) = match (details.check_in_date, details.check_out_date)
        {
            (Some(check_in), Some(check_out)) => (check_in, check_out),
            _ => {
                return Err(TripError::validation(
                    "Check-in and check-out dates are required",
                ))
            }
        };
        let booking_details = HotelBookingDetails {
            check_in_date,
            check_out_date,
            rooms_booked: details.rooms_booked.unwrap_or(DEFAULT_ROOMS_BOOKED).max(1),
            guest_count: details.guest_count.unwrap_or(DEFAULT_GUEST_COUNT).max(1),
            total_price: details.total_price.unwrap_or(0.0),
        };
        validate_booking(&booking_details)?;

        let trip = self.load(&trip_id, user_id).await?;
        let hotel = self
            .resources
            .find_hotel(&hotel_id)
            .await?
            .ok_or_else(|| TripError::not_found("Hotel not found"))?;
        if hotel.package(&package_id).is_none() {
            return Err(TripError::not_found("Package not found in hotel"));
        }

        let notes = input.notes.unwrap_or_default();
        let saved = self
            .apply_and_save(trip, |trip| {
                if trip.has_hotel(&hotel_id) {
                    return Err(TripError::validation("Hotel already added to this trip"));
                }
                trip.hotels.push(HotelEntry {
                    hotel_id,
                    package_id,
                    notes: notes.clone(),
                    added_at: Utc::now(),
                    booking_details: booking_details.clone(),
                    daily_cost: 0.0,
                    total_trip_cost: 0.0,
                });
                Ok(())
            })
            .await?;

        log::info!("Added hotel {} to trip {}", hotel_id, trip_id);
        Ok(saved)
    }

    pub async fn remove_hotel(&self, input: HotelInput) -> TripResult<Trip> {
        let (trip_id, hotel_id) = required_ids(
            &input.trip_id,
            &input.hotel_id,
            "Trip ID and Hotel ID are required",
            "hotel",
        )?;
        let user_id = require_user(&input.user_id)?;

        let trip = self.load(&trip_id, user_id).await?;
        self.apply_and_save(trip, |trip| {
            trip.hotels.retain(|h| h.hotel_id != hotel_id);
            Ok(())
        })
        .await
    }

    /// Merges whichever booking fields are given into the stored booking.
    pub async fn update_hotel(&self, input: HotelInput) -> TripResult<Trip> {
        let (trip_id, hotel_id) = required_ids(
            &input.trip_id,
            &input.hotel_id,
            "Trip ID and Hotel ID are required",
            "hotel",
        )?;
        let user_id = require_user(&input.user_id)?;

        let trip = self.load(&trip_id, user_id).await?;
        if !trip.has_hotel(&hotel_id) {
            return Err(TripError::not_found("Hotel not found in trip"));
        }

        self.apply_and_save(trip, |trip| {
            let entry = trip
                .hotel_mut(&hotel_id)
                .ok_or_else(|| TripError::not_found("Hotel not found in trip"))?;

            if let Some(patch) = &input.booking_details {
                let mut details = entry.booking_details.clone();
                if let Some(check_in) = patch.check_in_date {
                    details.check_in_date = check_in;
                }
                if let Some(check_out) = patch.check_out_date {
                    details.check_out_date = check_out;
                }
                if let Some(rooms) = patch.rooms_booked {
                    details.rooms_booked = rooms.max(1);
                }
                if let Some(guests) = patch.guest_count {
                    details.guest_count = guests.max(1);
                }
                if let Some(price) = patch.total_price {
                    details.total_price = price;
                }
                validate_booking(&details)?;
                entry.booking_details = details;
            }
            if let Some(notes) = &input.notes {
                entry.notes = notes.clone();
            }
            Ok(())
        })
        .await
    }

    pub async fn add_vehicle(&self, input: VehicleInput) -> TripResult<Trip> {
        let (trip_id, vehicle_id) = required_ids(
            &input.trip_id,
            &input.vehicle_id,
            "Trip ID and Vehicle ID are required",
            "vehicle",
        )?;
        let user_id = require_user(&input.user_id)?;
        let travellers_count = vehicle_travellers(input.travellers_count)?.unwrap_or(1);

        let trip = self.load(&trip_id, user_id).await?;
        let vehicle = self
            .resources
            .find_vehicle(&vehicle_id)
            .await?
            .ok_or_else(|| TripError::not_found("Vehicle not found"))?;
        if !vehicle.is_available() {
            return Err(TripError::validation("Vehicle is not available"));
        }
        if travellers_count > vehicle.passenger_amount {
            return Err(capacity_exceeded(vehicle.passenger_amount));
        }

        let notes = input.notes.unwrap_or_default();
        let with_driver = input.with_driver.unwrap_or(false);
        let saved = self
            .apply_and_save(trip, |trip| {
                if trip.has_vehicle(&vehicle_id) {
                    return Err(TripError::validation("Vehicle already added to this trip"));
                }
                trip.vehicles.push(VehicleEntry {
                    vehicle_id,
                    travellers_count,
                    notes: notes.clone(),
                    with_driver,
                    added_at: Utc::now(),
                    daily_cost: 0.0,
                    total_trip_cost: 0.0,
                });
                Ok(())
            })
            .await?;

        log::info!("Added vehicle {} to trip {}", vehicle_id, trip_id);
        Ok(saved)
    }

    pub async fn remove_vehicle(&self, input: VehicleInput) -> TripResult<Trip> {
        let (trip_id, vehicle_id) = required_ids(
            &input.trip_id,
            &input.vehicle_id,
            "Trip ID and Vehicle ID are required",
            "vehicle",
        )?;
        let user_id = require_user(&input.user_id)?;

        let trip = self.load(&trip_id, user_id).await?;
        self.apply_and_save(trip, |trip| {
            trip.vehicles.retain(|v| v.vehicle_id != vehicle_id);
            Ok(())
        })
        .await
    }

    pub async fn update_vehicle(&self, input: VehicleInput) -> TripResult<Trip> {
        let (trip_id, vehicle_id) = required_ids(
            &input.trip_id,
            &input.vehicle_id,
            "Trip ID and Vehicle ID are required",
            "vehicle",
        )?;
        let user_id = require_user(&input.user_id)?;
        let travellers_count = vehicle_travellers(input.travellers_count)?;

        let trip = self.load(&trip_id, user_id).await?;
        if !trip.has_vehicle(&vehicle_id) {
            return Err(TripError::not_found("Vehicle not found in trip"));
        }

        // A vehicle deleted since booking has no capacity left to check.
        if let Some(count) = travellers_count {
            if let Some(vehicle) = self.resources.find_vehicle(&vehicle_id).await? {
                if count > vehicle.passenger_amount {
                    return Err(capacity_exceeded(vehicle.passenger_amount));
                }
            }
        }

        self.apply_and_save(trip, |trip| {
            let entry = trip
                .vehicle_mut(&vehicle_id)
                .ok_or_else(|| TripError::not_found("Vehicle not found in trip"))?;
            if let Some(count) = travellers_count {
                entry.travellers_count = count;
            }
            if let Some(notes) = &input.notes {
                entry.notes = notes.clone();
            }
            if let Some(with_driver) = input.with_driver {
                entry.with_driver = with_driver;
            }
            Ok(())
        })
        .await
    }

    /// Resolves booking references for a response according to `expand`.
    pub async fn populate(&self, trip: Trip, expand: Expand) -> TripResult<PopulatedTrip> {
        let mut populated = PopulatedTrip::unexpanded(trip);
        if expand == Expand::None {
            return Ok(populated);
        }

        let resources = self.resources.as_ref();
        let base = &populated.base;
        let (places, guides) = futures::join!(
            try_join_all(base.places.iter().map(|e| resources.find_place(&e.place_id))),
            try_join_all(base.guides.iter().map(|e| resources.find_guide(&e.guide_id))),
        );

        for (view, found) in populated.places.iter_mut().zip(places?) {
            view.place_id = Reference::from_lookup(found);
        }
        for (view, found) in populated.guides.iter_mut().zip(guides?) {
            view.guide_id = Reference::from_lookup(found);
        }

        if expand == Expand::All {
            let base = &populated.base;
            let (hotels, vehicles) = futures::join!(
                try_join_all(base.hotels.iter().map(|e| resources.find_hotel(&e.hotel_id))),
                try_join_all(
                    base.vehicles
                        .iter()
                        .map(|e| resources.find_vehicle(&e.vehicle_id))
                ),
            );

            let package_ids: Vec<ObjectId> =
                populated.base.hotels.iter().map(|e| e.package_id).collect();
            for ((view, found), package_id) in populated
                .hotels
                .iter_mut()
                .zip(hotels?)
                .zip(package_ids)
            {
                view.package_id =
                    Reference::from_lookup(found.as_ref().and_then(|h| h.package(&package_id)).cloned());
                view.hotel_id = Reference::from_lookup(found);
            }
            for (view, found) in populated.vehicles.iter_mut().zip(vehicles?) {
                view.vehicle_id = Reference::from_lookup(found);
            }
        }

        Ok(populated)
    }

    pub async fn populate_all(
        &self,
        trips: Vec<Trip>,
        expand: Expand,
    ) -> TripResult<Vec<PopulatedTrip>> {
        join_all(trips.into_iter().map(|trip| self.populate(trip, expand)))
            .await
            .into_iter()
            .collect()
    }

    /// Loads an active trip owned by `user_id`. Missing, deleted and foreign
    /// trips produce the same error; the difference only reaches the log.
    async fn load(&self, trip_id: &ObjectId, user_id: &str) -> TripResult<Trip> {
        if let Some(trip) = self.trips.find_active(trip_id, user_id).await? {
            return Ok(trip);
        }

        match self.trips.probe(trip_id, user_id).await {
            Ok(TripLookup::OwnedByOther) => log::warn!(
                "User {} requested trip {} which belongs to another user",
                user_id,
                trip_id
            ),
            Ok(TripLookup::Deleted) => {
                log::debug!("User {} requested deleted trip {}", user_id, trip_id)
            }
            Ok(TripLookup::Absent) => {
                log::debug!("User {} requested unknown trip {}", user_id, trip_id)
            }
            Ok(TripLookup::Owned) => {}
            Err(e) => log::debug!("Ownership probe for trip {} failed: {}", trip_id, e),
        }
        Err(TripError::trip_not_found())
    }

    /// Applies `apply`, reprices and saves. When the stored trip changed in
    /// the meantime, reloads it and applies again, up to the configured
    /// number of attempts.
    async fn apply_and_save<F>(&self, mut trip: Trip, mut apply: F) -> TripResult<Trip>
    where
        F: FnMut(&mut Trip) -> TripResult<()>,
    {
        let trip_id = trip
            .id
            .ok_or_else(|| TripError::Internal("loaded trip has no id".to_string()))?;
        let user_id = trip.user_id.clone();
        let max_attempts = self.config.max_save_attempts.max(1);

        let mut attempt = 1;
        loop {
            apply(&mut trip)?;
            PricingService::recalculate(&mut trip, self.resources.as_ref()).await?;

            match self.trips.save(&trip).await? {
                SaveOutcome::Saved(saved) => return Ok(saved),
                SaveOutcome::VersionConflict if attempt < max_attempts => {
                    log::warn!(
                        "Trip {} changed during update (attempt {}/{}), retrying",
                        trip_id,
                        attempt,
                        max_attempts
                    );
                    attempt += 1;
                    trip = self.load(&trip_id, &user_id).await?;
                }
                SaveOutcome::VersionConflict => {
                    return Err(TripError::Conflict(
                        "Trip was modified by another request, please retry".to_string(),
                    ))
                }
            }
        }
    }
}

fn require_user(user_id: &Option<String>) -> TripResult<&str> {
    require(user_id, "User ID is required")
}

fn required_ids(
    trip_id: &Option<String>,
    resource_id: &Option<String>,
    message: &str,
    resource: &str,
) -> TripResult<(ObjectId, ObjectId)> {
    let trip_id = require(trip_id, message)?;
    let resource_id = require(resource_id, message)?;
    Ok((
        parse_object_id(trip_id, "trip")?,
        parse_object_id(resource_id, resource)?,
    ))
}

fn validate_booking(details: &HotelBookingDetails) -> TripResult<()> {
    if !details.total_price.is_finite() || details.total_price < 0.0 {
        return Err(TripError::validation("Total price cannot be negative"));
    }
    if details.check_out_date < details.check_in_date {
        return Err(TripError::validation(
            "Check-out date cannot be before check-in date",
        ));
    }
    Ok(())
}

fn vehicle_travellers(count: Option<i64>) -> TripResult<Option<u32>> {
    match count {
        None => Ok(None),
        Some(n) if n < 1 => Err(TripError::validation(
            "Vehicle travellers count must be at least 1",
        )),
        Some(n) => Ok(Some(n.min(u32::MAX as i64) as u32)),
    }
}

fn capacity_exceeded(passenger_amount: u32) -> TripError {
    TripError::validation(format!(
        "Vehicle can only accommodate {} passengers",
        passenger_amount
    ))
}
