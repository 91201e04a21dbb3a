use chrono::{DateTime, Utc};
use futures::future::join_all;
use regex::Regex;
use std::sync::OnceLock;

use crate::db::resources::ResourceReader;
use crate::error::TripResult;
use crate::models::resource::{Guide, Place, Vehicle};
use crate::models::trip::{EstimatedBudget, Trip};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

fn fee_pattern() -> &'static Regex {
    static FEE: OnceLock<Regex> = OnceLock::new();
    FEE.get_or_init(|| Regex::new(r"[0-9][0-9,]*(?:\.[0-9]+)?").expect("fee pattern is valid"))
}

pub struct PricingService;

impl PricingService {
    /// Whole days covered by the trip, counting both ends. Undated or
    /// inverted trips count as one day.
    pub fn trip_days(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> i64 {
        match (start, end) {
            (Some(start), Some(end)) => {
                let elapsed = (end - start).num_milliseconds();
                (elapsed.div_euclid(MILLIS_PER_DAY) + 1).max(1)
            }
            _ => 1,
        }
    }

    /// Nights between check-in and check-out, at least one.
    pub fn hotel_nights(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i64 {
        let elapsed = (check_out - check_in).num_milliseconds();
        elapsed.div_euclid(MILLIS_PER_DAY).max(1)
    }

    /// Pulls the first number out of free text such as "LKR 1,500 per person".
    pub fn parse_entry_fee(text: &str) -> f64 {
        fee_pattern()
            .find(text)
            .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
            .filter(|fee| fee.is_finite())
            .unwrap_or(0.0)
    }

    /// Per-person entry fee. The structured amount wins over the legacy text.
    pub fn place_fee(place: &Place) -> f64 {
        match place.entry_fee_amount {
            Some(amount) if amount.is_finite() && amount >= 0.0 => amount,
            _ => place
                .entry_fee
                .as_deref()
                .map(Self::parse_entry_fee)
                .unwrap_or(0.0),
        }
    }

    /// Daily rent plus the driver when one is booked. A vehicle without a
    /// rent price is not priced at all.
    pub fn vehicle_daily_cost(vehicle: &Vehicle, with_driver: bool) -> f64 {
        match vehicle.rent_price {
            Some(rent) => {
                let driver = if with_driver {
                    vehicle.driver_cost.unwrap_or(0.0)
                } else {
                    0.0
                };
                rent + driver
            }
            None => 0.0,
        }
    }

    /// Resolves every booked resource and rewrites the trip's cached entry
    /// costs and budget summary. Resources that no longer exist cost nothing.
    pub async fn recalculate(trip: &mut Trip, resources: &dyn ResourceReader) -> TripResult<()> {
        let place_lookups = join_all(trip.places.iter().map(|e| resources.find_place(&e.place_id)));
        let guide_lookups = join_all(trip.guides.iter().map(|e| resources.find_guide(&e.guide_id)));
        let vehicle_lookups = join_all(
            trip.vehicles
                .iter()
                .map(|e| resources.find_vehicle(&e.vehicle_id)),
        );

        let (places, guides, vehicles) =
            futures::join!(place_lookups, guide_lookups, vehicle_lookups);

        let places = places.into_iter().collect::<TripResult<Vec<_>>>()?;
        let guides = guides.into_iter().collect::<TripResult<Vec<_>>>()?;
        let vehicles = vehicles.into_iter().collect::<TripResult<Vec<_>>>()?;

        Self::apply(trip, &places, &guides, &vehicles);
        Ok(())
    }

    /// The synchronous half of [`recalculate`](Self::recalculate). Each slice
    /// holds the lookup result for the entry at the same index.
    pub fn apply(
        trip: &mut Trip,
        places: &[Option<Place>],
        guides: &[Option<Guide>],
        vehicles: &[Option<Vehicle>],
    ) {
        let trip_id = trip.id_hex();
        let days = Self::trip_days(trip.start_date, trip.end_date) as f64;
        let travellers = trip.travellers_count as f64;

        let mut entries_total = 0.0;
        for (entry, place) in trip.places.iter_mut().zip(places) {
            let fee = match place {
                Some(place) => Self::place_fee(place),
                None => {
                    log::warn!(
                        "Place {} on trip {} no longer exists, pricing it at zero",
                        entry.place_id,
                        trip_id
                    );
                    0.0
                }
            };
            entry.daily_cost = fee;
            entry.total_trip_cost = fee * travellers;
            entries_total += entry.total_trip_cost;
        }

        let mut guides_total = 0.0;
        for (entry, guide) in trip.guides.iter_mut().zip(guides) {
            let daily_rate = match guide {
                Some(guide) => guide.daily_rate(),
                None => {
                    log::warn!(
                        "Guide {} on trip {} no longer exists, pricing it at zero",
                        entry.guide_id,
                        trip_id
                    );
                    0.0
                }
            };
            entry.daily_cost = daily_rate;
            entry.total_trip_cost = daily_rate * days;
            guides_total += entry.total_trip_cost;
        }

        let mut hotels_total = 0.0;
        for entry in trip.hotels.iter_mut() {
            let details = &entry.booking_details;
            let nights = Self::hotel_nights(details.check_in_date, details.check_out_date) as f64;
            entry.total_trip_cost = details.total_price;
            entry.daily_cost = details.total_price / nights;
            hotels_total += entry.total_trip_cost;
        }

        let mut vehicles_total = 0.0;
        for (entry, vehicle) in trip.vehicles.iter_mut().zip(vehicles) {
            let daily = match vehicle {
                Some(vehicle) => Self::vehicle_daily_cost(vehicle, entry.with_driver),
                None => {
                    log::warn!(
                        "Vehicle {} on trip {} no longer exists, pricing it at zero",
                        entry.vehicle_id,
                        trip_id
                    );
                    0.0
                }
            };
            entry.daily_cost = daily;
            entry.total_trip_cost = daily * days;
            vehicles_total += entry.total_trip_cost;
        }

        let other_expenses = trip.estimated_budget.other_expenses;
        trip.estimated_budget = EstimatedBudget {
            entries_total,
            guides_total,
            hotels_total,
            vehicles_total,
            other_expenses,
            total_budget: entries_total + guides_total + hotels_total + vehicles_total
                + other_expenses,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryResourceReader;
    use crate::models::resource::GuidePricing;
    use crate::models::trip::{
        GuideEntry, HotelBookingDetails, HotelEntry, PlaceEntry, VehicleEntry, WorkingHours,
    };
    use chrono::TimeZone;
    use mongodb::bson::oid::ObjectId;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    fn place(fee: &str) -> Place {
        Place {
            id: ObjectId::new(),
            name: "Temple of the Tooth".to_string(),
            description: None,
            province: None,
            district: None,
            location: None,
            entry_fee: Some(fee.to_string()),
            entry_fee_amount: None,
        }
    }

    fn guide(daily_rate: f64) -> Guide {
        Guide {
            id: ObjectId::new(),
            guide_name: "Sunil".to_string(),
            description: None,
            pricing: Some(GuidePricing {
                hourly_rate: None,
                daily_rate: Some(daily_rate),
                currency: Some("LKR".to_string()),
            }),
            availability: None,
            status: None,
        }
    }

    fn vehicle(rent: f64, driver: f64) -> Vehicle {
        Vehicle {
            id: ObjectId::new(),
            vehicle_type: "Van".to_string(),
            passenger_amount: 8,
            rent_price: Some(rent),
            driver_cost: Some(driver),
            status: "available".to_string(),
        }
    }

    fn place_entry(id: ObjectId) -> PlaceEntry {
        PlaceEntry {
            place_id: id,
            notes: String::new(),
            added_at: Utc::now(),
            daily_cost: 0.0,
            total_trip_cost: 0.0,
        }
    }

    fn guide_entry(id: ObjectId) -> GuideEntry {
        GuideEntry {
            guide_id: id,
            notes: String::new(),
            added_at: Utc::now(),
            working_hours: WorkingHours::default(),
            daily_cost: 0.0,
            total_trip_cost: 0.0,
        }
    }

    fn vehicle_entry(id: ObjectId, with_driver: bool) -> VehicleEntry {
        VehicleEntry {
            vehicle_id: id,
            travellers_count: 2,
            notes: String::new(),
            with_driver,
            added_at: Utc::now(),
            daily_cost: 0.0,
            total_trip_cost: 0.0,
        }
    }

    #[test]
    fn test_trip_days() {
        assert_eq!(PricingService::trip_days(Some(day(1)), Some(day(1))), 1);
        assert_eq!(PricingService::trip_days(Some(day(1)), Some(day(3))), 3);
        assert_eq!(PricingService::trip_days(None, Some(day(3))), 1);
        assert_eq!(PricingService::trip_days(Some(day(1)), None), 1);
        assert_eq!(PricingService::trip_days(None, None), 1);
        assert_eq!(PricingService::trip_days(Some(day(5)), Some(day(2))), 1);
    }

    #[test]
    fn test_hotel_nights() {
        assert_eq!(PricingService::hotel_nights(day(1), day(4)), 3);
        assert_eq!(PricingService::hotel_nights(day(1), day(1)), 1);
        assert_eq!(PricingService::hotel_nights(day(4), day(1)), 1);
    }

    #[test]
    fn test_parse_entry_fee() {
        assert_eq!(PricingService::parse_entry_fee("LKR 1,500 per person"), 1500.0);
        assert_eq!(PricingService::parse_entry_fee("USD 12.50"), 12.5);
        assert_eq!(PricingService::parse_entry_fee("Free"), 0.0);
        assert_eq!(PricingService::parse_entry_fee(""), 0.0);
        assert_eq!(PricingService::parse_entry_fee("Adults 2,000 / kids 1,000"), 2000.0);
        assert_eq!(PricingService::parse_entry_fee("Free for locals, LKR 3,000"), 3000.0);
    }

    #[test]
    fn test_structured_fee_takes_precedence() {
        let mut p = place("LKR 1,500");
        p.entry_fee_amount = Some(900.0);
        assert_eq!(PricingService::place_fee(&p), 900.0);

        p.entry_fee_amount = Some(-1.0);
        assert_eq!(PricingService::place_fee(&p), 1500.0);
    }

    #[test]
    fn test_vehicle_daily_cost() {
        let v = vehicle(5000.0, 1500.0);
        assert_eq!(PricingService::vehicle_daily_cost(&v, true), 6500.0);
        assert_eq!(PricingService::vehicle_daily_cost(&v, false), 5000.0);

        let mut unpriced = vehicle(0.0, 1500.0);
        unpriced.rent_price = None;
        assert_eq!(PricingService::vehicle_daily_cost(&unpriced, true), 0.0);
    }

    #[actix_rt::test]
    async fn test_recalculate_full_trip() {
        let resources = InMemoryResourceReader::new();
        let p = place("LKR 1,500 per person");
        let g = guide(4000.0);
        let v = vehicle(5000.0, 1500.0);
        resources.insert_place(p.clone()).await;
        resources.insert_guide(g.clone()).await;
        resources.insert_vehicle(v.clone()).await;

        let mut trip = Trip::new("user-1", "Cultural triangle");
        trip.travellers_count = 4;
        trip.start_date = Some(day(1));
        trip.end_date = Some(day(3));
        trip.estimated_budget.other_expenses = 250.0;
        trip.places.push(place_entry(p.id));
        trip.guides.push(guide_entry(g.id));
        trip.vehicles.push(vehicle_entry(v.id, true));
        trip.hotels.push(HotelEntry {
            hotel_id: ObjectId::new(),
            package_id: ObjectId::new(),
            notes: String::new(),
            added_at: Utc::now(),
            booking_details: HotelBookingDetails {
                check_in_date: day(1),
                check_out_date: day(4),
                rooms_booked: 1,
                guest_count: 2,
                total_price: 30000.0,
            },
            daily_cost: 0.0,
            total_trip_cost: 0.0,
        });

        PricingService::recalculate(&mut trip, &resources).await.unwrap();

        let budget = &trip.estimated_budget;
        assert_eq!(budget.entries_total, 6000.0);
        assert_eq!(budget.guides_total, 12000.0);
        assert_eq!(budget.hotels_total, 30000.0);
        assert_eq!(budget.vehicles_total, 19500.0);
        assert_eq!(budget.other_expenses, 250.0);
        assert_eq!(budget.total_budget, 6000.0 + 12000.0 + 30000.0 + 19500.0 + 250.0);

        assert_eq!(trip.places[0].daily_cost, 1500.0);
        assert_eq!(trip.guides[0].daily_cost, 4000.0);
        assert_eq!(trip.guides[0].total_trip_cost, 12000.0);
        assert_eq!(trip.hotels[0].daily_cost, 10000.0);
        assert_eq!(trip.hotels[0].total_trip_cost, 30000.0);
        assert_eq!(trip.vehicles[0].daily_cost, 6500.0);
        assert_eq!(trip.vehicles[0].total_trip_cost, 19500.0);
    }

    #[actix_rt::test]
    async fn test_recalculate_is_idempotent() {
        let resources = InMemoryResourceReader::new();
        let g = guide(3500.0);
        resources.insert_guide(g.clone()).await;

        let mut trip = Trip::new("user-1", "Yala");
        trip.start_date = Some(day(10));
        trip.end_date = Some(day(12));
        trip.guides.push(guide_entry(g.id));

        PricingService::recalculate(&mut trip, &resources).await.unwrap();
        let first = trip.estimated_budget.clone();
        PricingService::recalculate(&mut trip, &resources).await.unwrap();

        assert_eq!(trip.estimated_budget, first);
        assert_eq!(first.guides_total, 10500.0);
    }

    #[actix_rt::test]
    async fn test_dangling_references_cost_nothing() {
        let resources = InMemoryResourceReader::new();
        let kept = guide(2000.0);
        let gone = guide(9000.0);
        resources.insert_guide(kept.clone()).await;
        resources.insert_guide(gone.clone()).await;

        let mut trip = Trip::new("user-1", "Galle");
        trip.guides.push(guide_entry(kept.id));
        trip.guides.push(guide_entry(gone.id));
        PricingService::recalculate(&mut trip, &resources).await.unwrap();
        assert_eq!(trip.estimated_budget.guides_total, 11000.0);

        resources.remove_guide(&gone.id).await;
        PricingService::recalculate(&mut trip, &resources).await.unwrap();

        assert_eq!(trip.estimated_budget.guides_total, 2000.0);
        assert_eq!(trip.guides[1].daily_cost, 0.0);
        assert_eq!(trip.guides[1].total_trip_cost, 0.0);
        assert_eq!(trip.guides.len(), 2);
    }

    #[test]
    fn test_undated_trip_prices_one_day() {
        let v = vehicle(5000.0, 1500.0);
        let mut trip = Trip::new("user-1", "Undated");
        trip.vehicles.push(vehicle_entry(v.id, false));

        PricingService::apply(&mut trip, &[], &[], &[Some(v)]);

        assert_eq!(trip.estimated_budget.vehicles_total, 5000.0);
        assert_eq!(trip.estimated_budget.total_budget, 5000.0);
    }
}
