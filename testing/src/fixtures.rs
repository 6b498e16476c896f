//! A small, consistent railway for tests and demos.
//!
//! One trip, `G1234`, runs Shanghai → Suzhou → Nanjing on route `r-1` with
//! cumulative distances `0 / 10 / 60`. Rates are `0.5` (economy) and `0.8`
//! (comfort), so the Suzhou → Nanjing segment prices at `25.0 / 40.0`.

#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

use crate::railway::InMemoryRailway;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use trainticket_core::types::{
    Contacts, OrderTicketsInfo, PriceConfig, Route, SeatClass, SeatRequest, TicketPrices,
    TrainType, Travel, Trip, TripAllDetailInfo, TripResponse, User,
};
use uuid::Uuid;

/// Trip id (train number)
pub const TRIP_ID: &str = "G1234";
/// Train type of the trip
pub const TRAIN_TYPE_ID: &str = "GaoTieOne";
/// Route of the trip
pub const ROUTE_ID: &str = "r-1";
/// First station name
pub const SHANGHAI: &str = "Shang Hai";
/// First station id
pub const SHANGHAI_ID: &str = "shanghai";
/// Middle station name
pub const SUZHOU: &str = "Su Zhou";
/// Middle station id
pub const SUZHOU_ID: &str = "suzhou";
/// Last station name
pub const NANJING: &str = "Nan Jing";
/// Last station id
pub const NANJING_ID: &str = "nanjing";
/// Billing contact id
pub const CONTACTS_ID: &str = "contacts-1";
/// Economy seats initially left on the trip
pub const ECONOMY_SEATS: i32 = 120;
/// Comfort seats initially left on the trip
pub const COMFORT_SEATS: i32 = 40;
/// Economy price of the Suzhou → Nanjing segment
pub const ECONOMY_PRICE: f64 = 25.0;
/// Comfort price of the Suzhou → Nanjing segment
pub const COMFORT_PRICE: f64 = 40.0;

/// The booking account
#[must_use]
pub fn account_id() -> Uuid {
    Uuid::from_u128(0x4d2a_46c7_71cb_4cf1_b5bb_b68406d9da6f)
}

/// Travel date of every fixture request
#[must_use]
pub fn travel_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// Departure of the trip from its first station
#[must_use]
pub fn starting_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
}

/// The trip record
#[must_use]
pub fn trip() -> Trip {
    Trip {
        trip_id: TRIP_ID.to_string(),
        train_type_id: TRAIN_TYPE_ID.to_string(),
        route_id: ROUTE_ID.to_string(),
        starting_station_id: SHANGHAI_ID.to_string(),
        terminal_station_id: NANJING_ID.to_string(),
        starting_time: starting_time(),
        end_time: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
    }
}

/// The trip's capacity
#[must_use]
pub fn trip_response() -> TripResponse {
    TripResponse {
        trip_id: TRIP_ID.to_string(),
        train_type_id: TRAIN_TYPE_ID.to_string(),
        starting_station: SUZHOU.to_string(),
        terminal_station: NANJING.to_string(),
        starting_time: starting_time(),
        end_time: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
        economy_class: ECONOMY_SEATS,
        comfort_class: COMFORT_SEATS,
        price_for_economy_class: ECONOMY_PRICE.to_string(),
        price_for_comfort_class: COMFORT_PRICE.to_string(),
    }
}

/// The train type
#[must_use]
pub fn train_type() -> TrainType {
    TrainType {
        id: TRAIN_TYPE_ID.to_string(),
        economy_class: ECONOMY_SEATS,
        comfort_class: COMFORT_SEATS,
        average_speed: 250,
    }
}

/// Route `r-1`: Shanghai (0) → Suzhou (10) → Nanjing (60)
#[must_use]
pub fn route() -> Route {
    Route {
        id: ROUTE_ID.to_string(),
        stations: vec![
            SHANGHAI_ID.to_string(),
            SUZHOU_ID.to_string(),
            NANJING_ID.to_string(),
        ],
        distances: vec![0, 10, 60],
        start_station_id: SHANGHAI_ID.to_string(),
        terminal_station_id: NANJING_ID.to_string(),
    }
}

/// Rates 0.5 / 0.8 for (`r-1`, `GaoTieOne`)
#[must_use]
pub fn price_config() -> PriceConfig {
    PriceConfig {
        id: "price-1".to_string(),
        train_type: TRAIN_TYPE_ID.to_string(),
        route_id: ROUTE_ID.to_string(),
        basic_price_rate: 0.5,
        first_class_price_rate: 0.8,
    }
}

/// The billing contact
#[must_use]
pub fn contacts() -> Contacts {
    Contacts {
        id: CONTACTS_ID.to_string(),
        account_id: account_id().to_string(),
        name: "Contacts One".to_string(),
        document_type: 1,
        document_number: "DocumentNumber_One".to_string(),
        phone_number: "ContactsPhoneNum_One".to_string(),
    }
}

/// The booking account's user record
#[must_use]
pub fn user() -> User {
    User {
        user_id: account_id(),
        user_name: "fdse_microservice".to_string(),
        email: "trainticket_notify@163.com".to_string(),
    }
}

/// A railway populated with everything above
#[must_use]
pub fn railway() -> InMemoryRailway {
    InMemoryRailway::new()
        .with_station(SHANGHAI, SHANGHAI_ID)
        .with_station(SUZHOU, SUZHOU_ID)
        .with_station(NANJING, NANJING_ID)
        .with_train_type(train_type())
        .with_route(route())
        .with_price_config(price_config())
        .with_contacts(contacts())
        .with_trip(trip(), trip_response())
        .with_ticket_prices(
            TRIP_ID,
            TicketPrices {
                economy_class: ECONOMY_PRICE,
                comfort_class: COMFORT_PRICE,
            },
        )
        .with_user(user())
}

/// A Suzhou → Nanjing reservation request with no add-ons
#[must_use]
pub fn order_request(seat_type: SeatClass) -> OrderTicketsInfo {
    OrderTicketsInfo {
        account_id: account_id(),
        contacts_id: CONTACTS_ID.to_string(),
        trip_id: TRIP_ID.to_string(),
        seat_type,
        date: travel_date(),
        from: SUZHOU.to_string(),
        to: NANJING.to_string(),
        assurance: 0,
        food_type: 0,
        food_name: String::new(),
        food_price: 0.0,
        station_name: String::new(),
        store_name: String::new(),
        consignee_name: String::new(),
        consignee_phone: String::new(),
        consignee_weight: 0.0,
        handle_date: String::new(),
        is_within: false,
    }
}

/// The trip-detail query matching [`order_request`]
#[must_use]
pub fn trip_query() -> TripAllDetailInfo {
    TripAllDetailInfo {
        trip_id: TRIP_ID.to_string(),
        travel_date: travel_date(),
        from: SUZHOU.to_string(),
        to: NANJING.to_string(),
    }
}

/// The seat request matching [`order_request`]
#[must_use]
pub fn seat_request(seat_type: SeatClass) -> SeatRequest {
    SeatRequest {
        travel_date: travel_date(),
        train_number: TRIP_ID.to_string(),
        start_station: SUZHOU_ID.to_string(),
        dest_station: NANJING_ID.to_string(),
        seat_type,
    }
}

/// A Suzhou → Nanjing price query departing at `departure_time`
#[must_use]
pub fn travel(departure_time: DateTime<Utc>) -> Travel {
    Travel {
        trip: trip(),
        starting_place: SUZHOU.to_string(),
        end_place: NANJING.to_string(),
        departure_time,
    }
}
