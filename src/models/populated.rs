use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::resource::{Guide, Hotel, Place, RoomPackage, Vehicle};
use super::trip::{
    GuideEntry, HotelBookingDetails, HotelEntry, PlaceEntry, Trip, VehicleEntry, WorkingHours,
};

/// A booking reference as it appears in a response: the bare id when it was
/// not expanded, the full document when it was, `null` when it dangles.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(String),
    Resolved(T),
    Missing,
}

impl<T> Reference<T> {
    pub fn from_lookup(found: Option<T>) -> Self {
        match found {
            Some(doc) => Reference::Resolved(doc),
            None => Reference::Missing,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Reference::Resolved(_))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedPlace {
    pub place_id: Reference<Place>,
    pub notes: String,
    pub added_at: DateTime<Utc>,
    pub daily_cost: f64,
    pub total_trip_cost: f64,
}

impl PopulatedPlace {
    pub fn new(entry: &PlaceEntry, place_id: Reference<Place>) -> Self {
        Self {
            place_id,
            notes: entry.notes.clone(),
            added_at: entry.added_at,
            daily_cost: entry.daily_cost,
            total_trip_cost: entry.total_trip_cost,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedGuide {
    pub guide_id: Reference<Guide>,
    pub notes: String,
    pub added_at: DateTime<Utc>,
    pub working_hours: WorkingHours,
    pub daily_cost: f64,
    pub total_trip_cost: f64,
}

impl PopulatedGuide {
    pub fn new(entry: &GuideEntry, guide_id: Reference<Guide>) -> Self {
        Self {
            guide_id,
            notes: entry.notes.clone(),
            added_at: entry.added_at,
            working_hours: entry.working_hours.clone(),
            daily_cost: entry.daily_cost,
            total_trip_cost: entry.total_trip_cost,
        }
    }
}

/// Booking details with RFC 3339 dates; the stored form uses BSON dates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetailsView {
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub rooms_booked: u32,
    pub guest_count: u32,
    pub total_price: f64,
}

impl From<&HotelBookingDetails> for BookingDetailsView {
    fn from(details: &HotelBookingDetails) -> Self {
        Self {
            check_in_date: details.check_in_date,
            check_out_date: details.check_out_date,
            rooms_booked: details.rooms_booked,
            guest_count: details.guest_count,
            total_price: details.total_price,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedHotel {
    pub hotel_id: Reference<Hotel>,
    pub package_id: Reference<RoomPackage>,
    pub notes: String,
    pub added_at: DateTime<Utc>,
    pub booking_details: BookingDetailsView,
    pub daily_cost: f64,
    pub total_trip_cost: f64,
}

impl PopulatedHotel {
    pub fn new(
        entry: &HotelEntry,
        hotel_id: Reference<Hotel>,
        package_id: Reference<RoomPackage>,
    ) -> Self {
        Self {
            hotel_id,
            package_id,
            notes: entry.notes.clone(),
            added_at: entry.added_at,
            booking_details: BookingDetailsView::from(&entry.booking_details),
            daily_cost: entry.daily_cost,
            total_trip_cost: entry.total_trip_cost,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedVehicle {
    pub vehicle_id: Reference<Vehicle>,
    pub travellers_count: u32,
    pub notes: String,
    pub with_driver: bool,
    pub added_at: DateTime<Utc>,
    pub daily_cost: f64,
    pub total_trip_cost: f64,
}

impl PopulatedVehicle {
    pub fn new(entry: &VehicleEntry, vehicle_id: Reference<Vehicle>) -> Self {
        Self {
            vehicle_id,
            travellers_count: entry.travellers_count,
            notes: entry.notes.clone(),
            with_driver: entry.with_driver,
            added_at: entry.added_at,
            daily_cost: entry.daily_cost,
            total_trip_cost: entry.total_trip_cost,
        }
    }
}

/// A trip with its booking references expanded for a response.
#[derive(Debug, Clone)]
pub struct PopulatedTrip {
    pub base: Trip,
    pub places: Vec<PopulatedPlace>,
    pub guides: Vec<PopulatedGuide>,
    pub hotels: Vec<PopulatedHotel>,
    pub vehicles: Vec<PopulatedVehicle>,
}

impl Serialize for PopulatedTrip {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("PopulatedTrip", 17)?;

        state.serialize_field("_id", &self.base.id_hex())?;
        state.serialize_field("userId", &self.base.user_id)?;
        state.serialize_field("name", &self.base.name)?;
        state.serialize_field("description", &self.base.description)?;
        state.serialize_field("status", &self.base.status)?;
        state.serialize_field("isActive", &self.base.is_active)?;
        state.serialize_field("startDate", &self.base.start_date)?;
        state.serialize_field("endDate", &self.base.end_date)?;
        state.serialize_field("travellersCount", &self.base.travellers_count)?;
        state.serialize_field("estimatedBudget", &self.base.estimated_budget)?;

        state.serialize_field("places", &self.places)?;
        state.serialize_field("guides", &self.guides)?;
        state.serialize_field("hotels", &self.hotels)?;
        state.serialize_field("vehicles", &self.vehicles)?;

        state.serialize_field("version", &self.base.version)?;
        state.serialize_field("createdAt", &self.base.created_at)?;
        state.serialize_field("updatedAt", &self.base.updated_at)?;

        state.end()
    }
}

impl PopulatedTrip {
    /// Every reference left as a bare id.
    pub fn unexpanded(base: Trip) -> Self {
        let places = base
            .places
            .iter()
            .map(|e| PopulatedPlace::new(e, Reference::Id(e.place_id.to_hex())))
            .collect();
        let guides = base
            .guides
            .iter()
            .map(|e| PopulatedGuide::new(e, Reference::Id(e.guide_id.to_hex())))
            .collect();
        let hotels = base
            .hotels
            .iter()
            .map(|e| {
                PopulatedHotel::new(
                    e,
                    Reference::Id(e.hotel_id.to_hex()),
                    Reference::Id(e.package_id.to_hex()),
                )
            })
            .collect();
        let vehicles = base
            .vehicles
            .iter()
            .map(|e| PopulatedVehicle::new(e, Reference::Id(e.vehicle_id.to_hex())))
            .collect();

        Self {
            base,
            places,
            guides,
            hotels,
            vehicles,
        }
    }
}
