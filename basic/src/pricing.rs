//! Distance × rate price computation.
//!
//! `price = (distance[destination] - distance[origin]) × rate` for each class.
//! Any fault in the inputs replaces *both* prices with [`FALLBACK_PRICES`].

use thiserror::Error;
use trainticket_core::types::{PriceConfig, Route, TicketPrices};

/// Prices used whenever the computation cannot be carried out.
pub const FALLBACK_PRICES: TicketPrices = TicketPrices {
    economy_class: 95.0,
    comfort_class: 120.0,
};

/// Why prices could not be computed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingFault {
    /// The route lookup produced nothing
    #[error("route not found")]
    MissingRoute,

    /// A station id did not resolve, or is not on the route
    #[error("station {0:?} is not on the route")]
    StationNotOnRoute(Option<String>),

    /// The route has fewer distances than stations
    #[error("no distance recorded for station index {0}")]
    IndexOutOfRange(usize),

    /// The rate lookup produced nothing
    #[error("price rates not found")]
    MissingRates,

    /// The distance between the stations does not fit the distance type
    #[error("distance from {origin} to {destination} overflows")]
    Arithmetic {
        /// Distance recorded for the origin
        origin: i32,
        /// Distance recorded for the destination
        destination: i32,
    },
}

/// Compute prices for travelling from `origin_id` to `destination_id`.
///
/// # Errors
///
/// Returns the first [`PricingFault`] encountered.
pub fn compute_prices(
    route: Option<&Route>,
    rates: Option<&PriceConfig>,
    origin_id: Option<&str>,
    destination_id: Option<&str>,
) -> Result<TicketPrices, PricingFault> {
    let route = route.ok_or(PricingFault::MissingRoute)?;
    let origin = distance_of(route, origin_id)?;
    let destination = distance_of(route, destination_id)?;
    let rates = rates.ok_or(PricingFault::MissingRates)?;

    let distance = destination
        .checked_sub(origin)
        .map(f64::from)
        .ok_or(PricingFault::Arithmetic { origin, destination })?;
    Ok(TicketPrices {
        economy_class: distance * rates.basic_price_rate,
        comfort_class: distance * rates.first_class_price_rate,
    })
}

/// Prices, or [`FALLBACK_PRICES`] with the fault that forced them.
#[must_use]
pub fn prices_or_fallback(
    route: Option<&Route>,
    rates: Option<&PriceConfig>,
    origin_id: Option<&str>,
    destination_id: Option<&str>,
) -> (TicketPrices, Option<PricingFault>) {
    match compute_prices(route, rates, origin_id, destination_id) {
        Ok(prices) => (prices, None),
        Err(fault) => (FALLBACK_PRICES, Some(fault)),
    }
}

fn distance_of(route: &Route, station_id: Option<&str>) -> Result<i32, PricingFault> {
    let index = station_id
        .and_then(|id| route.stations.iter().position(|station| station == id))
        .ok_or_else(|| PricingFault::StationNotOnRoute(station_id.map(str::to_string)))?;
    route
        .distances
        .get(index)
        .copied()
        .ok_or(PricingFault::IndexOutOfRange(index))
}
