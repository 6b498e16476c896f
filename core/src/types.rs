//! Domain records exchanged with downstream services.
//!
//! Field names follow the JSON wire format of the railway services
//! (`camelCase`, including the historical `confortClass` spelling).
//! Records used as cache keys derive `Eq + Hash`; records used as cached
//! values derive `PartialEq` so the cache can detect inconsistencies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ===== Seat classes =====
//

/// Fare class of a seat. Encoded on the wire by its legacy integer code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum SeatClass {
    /// Comfort ("first") class, code 2
    FirstClass,
    /// Economy ("second") class, code 3
    SecondClass,
}

impl SeatClass {
    /// Legacy integer code
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::FirstClass => 2,
            Self::SecondClass => 3,
        }
    }

    /// Display name used in notifications
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstClass => "FirstClass",
            Self::SecondClass => "SecondClass",
        }
    }
}

impl TryFrom<i32> for SeatClass {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            2 => Ok(Self::FirstClass),
            3 => Ok(Self::SecondClass),
            other => Err(format!("unknown seat class code {other}")),
        }
    }
}

impl From<SeatClass> for i32 {
    fn from(class: SeatClass) -> Self {
        class.code()
    }
}

impl fmt::Display for SeatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//
// ===== Reservation request =====
//

/// Incoming reservation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTicketsInfo {
    /// Account placing the order
    pub account_id: Uuid,
    /// Billing contact to look up
    pub contacts_id: String,
    /// Trip (train number) to book
    pub trip_id: String,
    /// Requested fare class
    pub seat_type: SeatClass,
    /// Travel date
    pub date: NaiveDate,
    /// Origin station name
    pub from: String,
    /// Destination station name
    pub to: String,
    /// Assurance type, `0` for none
    #[serde(default)]
    pub assurance: i32,
    /// Food type, `0` for none, `2` for a station food store
    #[serde(default)]
    pub food_type: i32,
    /// Food item name
    #[serde(default)]
    pub food_name: String,
    /// Food price
    #[serde(default)]
    pub food_price: f64,
    /// Station of the food store (food type 2 only)
    #[serde(default)]
    pub station_name: String,
    /// Food store name (food type 2 only)
    #[serde(default)]
    pub store_name: String,
    /// Consignee name, empty for no consignment
    #[serde(default)]
    pub consignee_name: String,
    /// Consignee phone
    #[serde(default)]
    pub consignee_phone: String,
    /// Consignment weight
    #[serde(default)]
    pub consignee_weight: f64,
    /// Consignment hand-over date
    #[serde(default)]
    pub handle_date: String,
    /// Whether the consignment stays within the city
    #[serde(default)]
    pub is_within: bool,
}

//
// ===== Contacts =====
//

/// A billing contact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contacts {
    /// Contact id
    pub id: String,
    /// Owning account
    pub account_id: String,
    /// Contact name
    pub name: String,
    /// Identity document type
    pub document_type: i32,
    /// Identity document number
    pub document_number: String,
    /// Phone number
    #[serde(default)]
    pub phone_number: String,
}

//
// ===== Trips and capacity =====
//

/// A scheduled train run.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Trip id (train number)
    pub trip_id: String,
    /// Train type id
    pub train_type_id: String,
    /// Route id
    pub route_id: String,
    /// First station of the run
    pub starting_station_id: String,
    /// Last station of the run
    pub terminal_station_id: String,
    /// Departure from the first station
    pub starting_time: DateTime<Utc>,
    /// Arrival at the last station
    pub end_time: DateTime<Utc>,
}

/// Query for a trip's schedule and remaining capacity. Cache key of the trip cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripAllDetailInfo {
    /// Trip id
    pub trip_id: String,
    /// Travel date
    pub travel_date: NaiveDate,
    /// Origin station name
    pub from: String,
    /// Destination station name
    pub to: String,
}

/// Remaining capacity and schedule of a trip between two stations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripResponse {
    /// Trip id
    pub trip_id: String,
    /// Train type id
    pub train_type_id: String,
    /// Origin station name
    pub starting_station: String,
    /// Destination station name
    pub terminal_station: String,
    /// Departure time at origin
    pub starting_time: DateTime<Utc>,
    /// Arrival time at destination
    pub end_time: DateTime<Utc>,
    /// Remaining economy seats
    pub economy_class: i32,
    /// Remaining comfort seats
    #[serde(rename = "confortClass")]
    pub comfort_class: i32,
    /// Listed economy price
    #[serde(default)]
    pub price_for_economy_class: String,
    /// Listed comfort price
    #[serde(rename = "priceForConfortClass", default)]
    pub price_for_comfort_class: String,
}

/// Trip detail answer: capacity plus the trip record, either possibly absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripAllDetail {
    /// Capacity and schedule
    pub trip_response: Option<TripResponse>,
    /// The trip itself
    pub trip: Option<Trip>,
}

//
// ===== Pricing =====
//

/// Query for ticket prices of a trip segment. Cache key of the ticket-info cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Travel {
    /// The trip
    pub trip: Trip,
    /// Origin station name
    pub starting_place: String,
    /// Destination station name
    pub end_place: String,
    /// Departure time of the query
    pub departure_time: DateTime<Utc>,
}

/// A train type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainType {
    /// Train type id
    pub id: String,
    /// Economy seats per train
    pub economy_class: i32,
    /// Comfort seats per train
    #[serde(rename = "confortClass")]
    pub comfort_class: i32,
    /// Average speed
    #[serde(default)]
    pub average_speed: i32,
}

/// A route: ordered station ids and cumulative distances from the first station.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Route id
    pub id: String,
    /// Station ids in travel order
    pub stations: Vec<String>,
    /// Cumulative distance of each station
    pub distances: Vec<i32>,
    /// First station id
    #[serde(default)]
    pub start_station_id: String,
    /// Last station id
    #[serde(default)]
    pub terminal_station_id: String,
}

/// Per-class price rates of a (route, train type) pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceConfig {
    /// Price config id
    pub id: String,
    /// Train type id
    pub train_type: String,
    /// Route id
    pub route_id: String,
    /// Economy rate per distance unit
    pub basic_price_rate: f64,
    /// Comfort rate per distance unit
    pub first_class_price_rate: f64,
}

/// Ticket prices for both classes.
///
/// The railway services send prices as decimal strings (`"25.0"`); plain
/// numbers are accepted too.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicketPrices {
    /// Economy price
    #[serde(rename = "economyClass", deserialize_with = "price_text_or_number")]
    pub economy_class: f64,
    /// Comfort price
    #[serde(rename = "confortClass", deserialize_with = "price_text_or_number")]
    pub comfort_class: f64,
}

fn price_text_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    match Price::deserialize(deserializer)? {
        Price::Number(price) => Ok(price),
        Price::Text(text) => text.trim().parse().map_err(|_| {
            serde::de::Error::invalid_value(serde::de::Unexpected::Str(&text), &"a decimal price")
        }),
    }
}

impl TicketPrices {
    /// Price of the given class
    #[must_use]
    pub const fn for_class(&self, class: SeatClass) -> f64 {
        match class {
            SeatClass::FirstClass => self.comfort_class,
            SeatClass::SecondClass => self.economy_class,
        }
    }
}

/// Result of a ticket-price query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelResult {
    /// Whether every lookup behind the prices resolved
    pub status: bool,
    /// Discount percentage applied (always 1.0)
    pub percent: f64,
    /// Resolved train type
    pub train_type: Option<TrainType>,
    /// Prices for both classes
    pub prices: TicketPrices,
}

//
// ===== Seats =====
//

/// Seat allocation request. Cache key of the seat cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatRequest {
    /// Travel date
    pub travel_date: NaiveDate,
    /// Trip id
    pub train_number: String,
    /// Origin station id
    pub start_station: String,
    /// Destination station id
    pub dest_station: String,
    /// Fare class
    pub seat_type: SeatClass,
}

/// An allocated seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Seat number
    pub seat_no: i32,
    /// Origin station id
    pub start_station: String,
    /// Destination station id
    pub dest_station: String,
}

//
// ===== Orders =====
//

/// Lifecycle status of an order. Encoded by its legacy integer code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum OrderStatus {
    /// Created, not paid
    NotPaid,
    /// Paid
    Paid,
    /// Ticket collected
    Collected,
    /// Rebooked
    Change,
    /// Cancelled
    Cancel,
    /// Refunded
    Refunds,
    /// Travelled
    Used,
}

impl TryFrom<i32> for OrderStatus {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::NotPaid,
            1 => Self::Paid,
            2 => Self::Collected,
            3 => Self::Change,
            4 => Self::Cancel,
            5 => Self::Refunds,
            6 => Self::Used,
            other => return Err(format!("unknown order status code {other}")),
        })
    }
}

impl From<OrderStatus> for i32 {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::NotPaid => 0,
            OrderStatus::Paid => 1,
            OrderStatus::Collected => 2,
            OrderStatus::Change => 3,
            OrderStatus::Cancel => 4,
            OrderStatus::Refunds => 5,
            OrderStatus::Used => 6,
        }
    }
}

/// A ticket order as persisted by the order service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order id
    pub id: Uuid,
    /// When the order was drafted
    pub bought_date: DateTime<Utc>,
    /// Travel date
    pub travel_date: NaiveDate,
    /// Departure time of the trip
    pub travel_time: DateTime<Utc>,
    /// Ordering account
    pub account_id: Uuid,
    /// Contact name
    pub contacts_name: String,
    /// Contact document type
    pub document_type: i32,
    /// Contact document number
    pub contacts_document_number: String,
    /// Trip id
    pub train_number: String,
    /// Fare class
    pub seat_class: SeatClass,
    /// Seat number
    pub seat_number: String,
    /// Origin station id
    pub from: String,
    /// Destination station id
    pub to: String,
    /// Order status
    pub status: OrderStatus,
    /// Price paid
    pub price: f64,
}

//
// ===== Advisory add-ons =====
//

/// Food order attached to a ticket order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodOrder {
    /// Ticket order id
    pub order_id: Uuid,
    /// Food type (`1` train food, `2` station store)
    pub food_type: i32,
    /// Station of the store (type 2 only)
    pub station_name: Option<String>,
    /// Store name (type 2 only)
    pub store_name: Option<String>,
    /// Food item
    pub food_name: String,
    /// Price
    pub price: f64,
}

/// Luggage consignment attached to a ticket order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consign {
    /// Ticket order id
    pub order_id: Uuid,
    /// Ordering account
    pub account_id: Uuid,
    /// Hand-over date
    pub handle_date: String,
    /// Target date (the travel date)
    pub target_date: String,
    /// Origin station id
    pub from: String,
    /// Destination station id
    pub to: String,
    /// Consignee name
    pub consignee: String,
    /// Consignee phone
    pub phone: String,
    /// Weight
    pub weight: f64,
    /// Within the city
    pub within: bool,
}

/// An account as known to the user service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account id
    pub user_id: Uuid,
    /// Login name
    pub user_name: String,
    /// Notification address
    pub email: String,
}

/// Payload of the "reservation succeeded" notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyInfo {
    /// Recipient address
    pub email: String,
    /// Order id
    pub order_number: String,
    /// Recipient name
    pub username: String,
    /// Origin station id
    pub starting_place: String,
    /// Destination station id
    pub end_place: String,
    /// Departure time
    pub starting_time: String,
    /// Notification date
    pub date: String,
    /// Fare class name
    pub seat_class: String,
    /// Seat number
    pub seat_number: String,
    /// Price
    pub price: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn seat_class_uses_legacy_codes() {
        assert_eq!(serde_json::to_string(&SeatClass::FirstClass).unwrap(), "2");
        assert_eq!(
            serde_json::from_str::<SeatClass>("3").unwrap(),
            SeatClass::SecondClass
        );
        assert!(serde_json::from_str::<SeatClass>("9").is_err());
    }

    #[test]
    fn prices_pick_matching_class() {
        let prices = TicketPrices {
            economy_class: 25.0,
            comfort_class: 40.0,
        };
        assert!((prices.for_class(SeatClass::FirstClass) - 40.0).abs() < f64::EPSILON);
        assert!((prices.for_class(SeatClass::SecondClass) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn prices_decode_from_decimal_strings() {
        let prices: TicketPrices =
            serde_json::from_str(r#"{"economyClass":"25.0","confortClass":"40.0"}"#).unwrap();
        assert!((prices.economy_class - 25.0).abs() < f64::EPSILON);
        assert!((prices.comfort_class - 40.0).abs() < f64::EPSILON);

        let numeric: TicketPrices =
            serde_json::from_str(r#"{"economyClass":25.0,"confortClass":40}"#).unwrap();
        assert_eq!(numeric, prices);

        assert!(
            serde_json::from_str::<TicketPrices>(r#"{"economyClass":"cheap","confortClass":"40.0"}"#)
                .is_err()
        );
    }

    #[test]
    fn trip_response_reads_legacy_comfort_spelling() {
        let json = r#"{
            "tripId": "G1234",
            "trainTypeId": "GaoTieOne",
            "startingStation": "shanghai",
            "terminalStation": "beijing",
            "startingTime": "2025-01-01T08:00:00Z",
            "endTime": "2025-01-01T13:00:00Z",
            "economyClass": 120,
            "confortClass": 0
        }"#;
        let response: TripResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.comfort_class, 0);
        assert_eq!(response.economy_class, 120);
    }
}
