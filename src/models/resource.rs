//! Read-only views of the documents other components own. Only the fields the
//! trip core looks at are modelled; everything else in the stored document is
//! ignored on deserialization.

use mongodb::bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};
use serde::{Deserialize, Deserializer, Serialize};

pub const VEHICLE_AVAILABLE: &str = "available";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Legacy display text such as "LKR 1,500 per person".
    #[serde(default)]
    pub entry_fee: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub entry_fee_amount: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GuidePricing {
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub hourly_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub daily_rate: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GuideWorkingHours {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GuideAvailability {
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub working_hours: Option<GuideWorkingHours>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub guide_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pricing: Option<GuidePricing>,
    #[serde(default)]
    pub availability: Option<GuideAvailability>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Guide {
    pub fn daily_rate(&self) -> f64 {
        self.pricing
            .as_ref()
            .and_then(|p| p.daily_rate)
            .unwrap_or(0.0)
    }

    fn working_hours(&self) -> Option<&GuideWorkingHours> {
        self.availability
            .as_ref()
            .and_then(|a| a.working_hours.as_ref())
    }

    pub fn working_hours_start(&self) -> Option<&str> {
        self.working_hours().and_then(|h| h.start.as_deref())
    }

    pub fn working_hours_end(&self) -> Option<&str> {
        self.working_hours().and_then(|h| h.end.as_deref())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoomPackage {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub package_name: String,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_rounded_u32")]
    pub capacity: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_optional_rounded_u32")]
    pub available_rooms: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub hotel_name: String,
    #[serde(default)]
    pub room_packages: Vec<RoomPackage>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Hotel {
    pub fn package(&self, package_id: &ObjectId) -> Option<&RoomPackage> {
        self.room_packages.iter().find(|p| &p.id == package_id)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    #[serde(default, deserialize_with = "deserialize_rounded_u32")]
    pub passenger_amount: u32,
    /// Per day.
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub rent_price: Option<f64>,
    /// Per day.
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub driver_cost: Option<f64>,
    #[serde(default = "default_vehicle_status")]
    pub status: String,
}

impl Vehicle {
    pub fn is_available(&self) -> bool {
        self.status == VEHICLE_AVAILABLE
    }
}

fn default_vehicle_status() -> String {
    VEHICLE_AVAILABLE.to_string()
}

// Stored numbers come back as Int32, Int64 or Double depending on who wrote
// them, so accept any numeric representation.
fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64().filter(|f| f.is_finite())),
        Some(serde_json::Value::String(s)) => Ok(s.trim().parse::<f64>().ok()),
        _ => Ok(None),
    }
}

fn deserialize_rounded_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_rounded_u32(deserializer)?.unwrap_or(0))
}

fn deserialize_optional_rounded_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        Some(serde_json::Value::Number(n)) => {
            if let Some(i) = n.as_u64() {
                Ok(Some(i.min(u32::MAX as u64) as u32))
            } else if let Some(f) = n.as_f64() {
                Ok(Some(f.max(0.0).ceil() as u32))
            } else {
                Ok(None)
            }
        }
        _ => Ok(None),
    }
}
