//! Stored trip documents. Timestamps are BSON dates, the same representation
//! other writers of the `trips` collection use.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const MIN_TRAVELLERS: u32 = 1;
pub const MAX_TRAVELLERS: u32 = 50;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    #[default]
    Planning,
    Confirmed,
    Ongoing,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Planning => "planning",
            TripStatus::Confirmed => "confirmed",
            TripStatus::Ongoing => "ongoing",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedBudget {
    #[serde(default)]
    pub entries_total: f64,
    #[serde(default)]
    pub guides_total: f64,
    #[serde(default)]
    pub hotels_total: f64,
    #[serde(default)]
    pub vehicles_total: f64,
    #[serde(default)]
    pub other_expenses: f64,
    #[serde(default)]
    pub total_budget: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlaceEntry {
    pub place_id: ObjectId,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub daily_cost: f64,
    #[serde(default)]
    pub total_trip_cost: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub start: String,
    pub end: String,
    /// Informational only, never used for pricing.
    pub hours_per_day: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start: "09:00".to_string(),
            end: "18:00".to_string(),
            hours_per_day: 8,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GuideEntry {
    pub guide_id: ObjectId,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub working_hours: WorkingHours,
    #[serde(default)]
    pub daily_cost: f64,
    #[serde(default)]
    pub total_trip_cost: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HotelBookingDetails {
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub check_in_date: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub check_out_date: DateTime<Utc>,
    pub rooms_booked: u32,
    pub guest_count: u32,
    /// Caller supplied and authoritative for the hotel's cost.
    pub total_price: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HotelEntry {
    pub hotel_id: ObjectId,
    pub package_id: ObjectId,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub added_at: DateTime<Utc>,
    pub booking_details: HotelBookingDetails,
    #[serde(default)]
    pub daily_cost: f64,
    #[serde(default)]
    pub total_trip_cost: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VehicleEntry {
    pub vehicle_id: ObjectId,
    pub travellers_count: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub with_driver: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub daily_cost: f64,
    #[serde(default)]
    pub total_trip_cost: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TripStatus,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, with = "optional_bson_datetime")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_bson_datetime")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_travellers")]
    pub travellers_count: u32,
    #[serde(default)]
    pub places: Vec<PlaceEntry>,
    #[serde(default)]
    pub guides: Vec<GuideEntry>,
    #[serde(default)]
    pub hotels: Vec<HotelEntry>,
    #[serde(default)]
    pub vehicles: Vec<VehicleEntry>,
    #[serde(default)]
    pub estimated_budget: EstimatedBudget,
    /// Bumped on every save; a save only lands if the stored value still matches.
    #[serde(default)]
    pub version: i64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

mod optional_bson_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(bson::DateTime::from_chrono).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<bson::DateTime>::deserialize(deserializer)?.map(|d| d.to_chrono()))
    }
}

fn default_true() -> bool {
    true
}

fn default_travellers() -> u32 {
    MIN_TRAVELLERS
}

impl Trip {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            user_id: user_id.into(),
            name: name.into(),
            description: String::new(),
            status: TripStatus::Planning,
            is_active: true,
            start_date: None,
            end_date: None,
            travellers_count: MIN_TRAVELLERS,
            places: Vec::new(),
            guides: Vec::new(),
            hotels: Vec::new(),
            vehicles: Vec::new(),
            estimated_budget: EstimatedBudget::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Accepts any integer and stores it clamped to the allowed traveller range.
    pub fn set_travellers_count(&mut self, count: i64) {
        self.travellers_count = count.clamp(MIN_TRAVELLERS as i64, MAX_TRAVELLERS as i64) as u32;
    }

    pub fn set_other_expenses(&mut self, amount: f64) {
        self.estimated_budget.other_expenses = if amount.is_finite() {
            amount.max(0.0)
        } else {
            0.0
        };
    }

    pub fn has_place(&self, place_id: &ObjectId) -> bool {
        self.places.iter().any(|p| &p.place_id == place_id)
    }

    pub fn has_guide(&self, guide_id: &ObjectId) -> bool {
        self.guides.iter().any(|g| &g.guide_id == guide_id)
    }

    pub fn has_hotel(&self, hotel_id: &ObjectId) -> bool {
        self.hotels.iter().any(|h| &h.hotel_id == hotel_id)
    }

    pub fn has_vehicle(&self, vehicle_id: &ObjectId) -> bool {
        self.vehicles.iter().any(|v| &v.vehicle_id == vehicle_id)
    }

    pub fn guide_mut(&mut self, guide_id: &ObjectId) -> Option<&mut GuideEntry> {
        self.guides.iter_mut().find(|g| &g.guide_id == guide_id)
    }

    pub fn hotel_mut(&mut self, hotel_id: &ObjectId) -> Option<&mut HotelEntry> {
        self.hotels.iter_mut().find(|h| &h.hotel_id == hotel_id)
    }

    pub fn vehicle_mut(&mut self, vehicle_id: &ObjectId) -> Option<&mut VehicleEntry> {
        self.vehicles.iter_mut().find(|v| &v.vehicle_id == vehicle_id)
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, Bson};
    use chrono::TimeZone;

    #[test]
    fn test_travellers_count_is_clamped() {
        let mut trip = Trip::new("user-1", "Hill country");

        trip.set_travellers_count(100);
        assert_eq!(trip.travellers_count, 50);

        trip.set_travellers_count(0);
        assert_eq!(trip.travellers_count, 1);

        trip.set_travellers_count(-7);
        assert_eq!(trip.travellers_count, 1);

        trip.set_travellers_count(12);
        assert_eq!(trip.travellers_count, 12);
    }

    #[test]
    fn test_other_expenses_never_negative() {
        let mut trip = Trip::new("user-1", "Coast");

        trip.set_other_expenses(-50.0);
        assert_eq!(trip.estimated_budget.other_expenses, 0.0);

        trip.set_other_expenses(f64::NAN);
        assert_eq!(trip.estimated_budget.other_expenses, 0.0);

        trip.set_other_expenses(2500.5);
        assert_eq!(trip.estimated_budget.other_expenses, 2500.5);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let value = serde_json::to_value(TripStatus::Cancelled).unwrap();
        assert_eq!(value, "cancelled");

        let parsed: TripStatus = serde_json::from_str("\"ongoing\"").unwrap();
        assert_eq!(parsed, TripStatus::Ongoing);
    }

    #[test]
    fn test_stored_trip_defaults() {
        let now = bson::DateTime::now();
        let trip: Trip = bson::from_document(doc! {
            "_id": ObjectId::new(),
            "userId": "user-9",
            "name": "Old trip",
            "isActive": true,
            "createdAt": now,
            "updatedAt": now,
        })
        .unwrap();

        assert!(trip.is_active);
        assert_eq!(trip.travellers_count, 1);
        assert_eq!(trip.status, TripStatus::Planning);
        assert_eq!(trip.version, 0);
        assert_eq!(trip.start_date, None);
        assert_eq!(trip.created_at, now.to_chrono());
        assert!(trip.places.is_empty());
    }

    #[test]
    fn test_decodes_bookings_with_bson_dates() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let check_out = Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap();
        let start_bson = bson::DateTime::from_chrono(start);

        let trip: Trip = bson::from_document(doc! {
            "_id": ObjectId::new(),
            "userId": "user-9",
            "name": "Written elsewhere",
            "startDate": start_bson,
            "endDate": Bson::Null,
            "places": [{ "placeId": ObjectId::new(), "addedAt": start_bson }],
            "hotels": [{
                "hotelId": ObjectId::new(),
                "packageId": ObjectId::new(),
                "addedAt": start_bson,
                "bookingDetails": {
                    "checkInDate": start_bson,
                    "checkOutDate": bson::DateTime::from_chrono(check_out),
                    "roomsBooked": 1_i64,
                    "guestCount": 2_i64,
                    "totalPrice": 30000.0,
                },
            }],
            "createdAt": start_bson,
            "updatedAt": start_bson,
        })
        .unwrap();

        assert_eq!(trip.start_date, Some(start));
        assert_eq!(trip.end_date, None);
        assert_eq!(trip.places[0].added_at, start);
        assert_eq!(trip.hotels[0].booking_details.check_out_date, check_out);
    }

    #[test]
    fn test_dates_stored_as_bson_dates() {
        let mut trip = Trip::new("user-1", "Stored");
        trip.start_date = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        let stored = bson::to_document(&trip).unwrap();
        assert!(matches!(stored.get("createdAt"), Some(Bson::DateTime(_))));
        assert!(matches!(stored.get("startDate"), Some(Bson::DateTime(_))));
        assert_eq!(stored.get("endDate"), Some(&Bson::Null));
    }
}
