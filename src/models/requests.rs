//! JSON bodies and query strings accepted by the trip endpoints.
//!
//! Required identifiers are modelled as `Option` so that a missing field turns
//! into a readable validation error from the service instead of a generic
//! deserialization failure.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{de, Deserialize, Deserializer};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::error::{TripError, TripResult};
use crate::models::trip::TripStatus;

#[serde_as]
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub travellers_count: Option<i64>,
}

/// Every field is optional. For the dates, an explicit `null` (or empty string)
/// clears the value while an absent key leaves it untouched.
#[serde_as]
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTripInput {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date_patch")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_date_patch")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<TripStatus>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub travellers_count: Option<i64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub other_expenses: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaceInput {
    pub trip_id: Option<String>,
    pub place_id: Option<String>,
    pub user_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WorkingHoursInput {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GuideInput {
    pub trip_id: Option<String>,
    pub guide_id: Option<String>,
    pub user_id: Option<String>,
    pub notes: Option<String>,
    pub working_hours: Option<WorkingHoursInput>,
}

#[serde_as]
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetailsInput {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub check_in_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub check_out_date: Option<DateTime<Utc>>,
    pub rooms_booked: Option<u32>,
    pub guest_count: Option<u32>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub total_price: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HotelInput {
    pub trip_id: Option<String>,
    pub hotel_id: Option<String>,
    pub package_id: Option<String>,
    pub user_id: Option<String>,
    pub notes: Option<String>,
    pub booking_details: Option<BookingDetailsInput>,
}

#[serde_as]
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    pub trip_id: Option<String>,
    pub vehicle_id: Option<String>,
    pub user_id: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub travellers_count: Option<i64>,
    pub notes: Option<String>,
    pub with_driver: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmTripInput {
    pub trip_id: Option<String>,
    pub user_id: Option<String>,
}

/// Which booking references get resolved to full documents in a response.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Expand {
    /// Places and guides only.
    #[default]
    Default,
    All,
    None,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TripQuery {
    pub user_id: Option<String>,
    #[serde(default)]
    pub expand: Expand,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExpandQuery {
    #[serde(default)]
    pub expand: Expand,
}

/// Returns the trimmed value or a validation error carrying `message`.
pub fn require<'a>(value: &'a Option<String>, message: &str) -> TripResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(TripError::validation(message)),
    }
}

pub fn parse_object_id(value: &str, label: &str) -> TripResult<ObjectId> {
    ObjectId::parse_str(value).map_err(|_| TripError::validation(format!("Invalid {} ID", label)))
}

/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` and bare dates
/// (taken as midnight UTC).
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date: {}", raw))
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s).map(Some).map_err(de::Error::custom),
    }
}

fn deserialize_date_patch<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_date(deserializer).map(Some)
}
