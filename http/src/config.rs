//! Where the downstream services live.
//!
//! Loads base URLs from environment variables, defaulting to the in-cluster
//! host names and ports of the railway deployment.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use trainticket_core::remote::services;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A base URL could not be parsed or cannot carry a path
    #[error("invalid base URL for {service}: {url}")]
    InvalidUrl {
        /// Service the URL belongs to
        service: &'static str,
        /// The offending URL
        url: String,
    },

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Base URL of every downstream service, plus the per-request timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoints {
    /// Station service (`TS_STATION_URL`)
    pub station: String,
    /// Train service (`TS_TRAIN_URL`)
    pub train: String,
    /// Route service (`TS_ROUTE_URL`)
    pub route: String,
    /// Price service (`TS_PRICE_URL`)
    pub price: String,
    /// Security service (`TS_SECURITY_URL`)
    pub security: String,
    /// Contacts service (`TS_CONTACTS_URL`)
    pub contacts: String,
    /// Travel service (`TS_TRAVEL_URL`)
    pub travel: String,
    /// Ticket-info service (`TS_TICKETINFO_URL`)
    pub ticket_info: String,
    /// Seat service (`TS_SEAT_URL`)
    pub seat: String,
    /// Order service (`TS_ORDER_URL`)
    pub order: String,
    /// Assurance service (`TS_ASSURANCE_URL`)
    pub assurance: String,
    /// Food service (`TS_FOOD_URL`)
    pub food: String,
    /// Consign service (`TS_CONSIGN_URL`)
    pub consign: String,
    /// User service (`TS_USER_URL`)
    pub user: String,
    /// Notification service (`TS_NOTIFICATION_URL`)
    pub notification: String,
    /// Transport timeout of a single HTTP request in seconds (`TS_HTTP_TIMEOUT_SECS`)
    pub request_timeout_secs: u64,
}

impl ServiceEndpoints {
    /// Load endpoints from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let url = |var: &str, default: &str| env::var(var).unwrap_or_else(|_| default.to_string());
        Self {
            station: url("TS_STATION_URL", "http://ts-station-service:12345"),
            train: url("TS_TRAIN_URL", "http://ts-train-service:14567"),
            route: url("TS_ROUTE_URL", "http://ts-route-service:11178"),
            price: url("TS_PRICE_URL", "http://ts-price-service:16579"),
            security: url("TS_SECURITY_URL", "http://ts-security-service:11188"),
            contacts: url("TS_CONTACTS_URL", "http://ts-contacts-service:12347"),
            travel: url("TS_TRAVEL_URL", "http://ts-travel-service:12346"),
            ticket_info: url("TS_TICKETINFO_URL", "http://ts-ticketinfo-service:15681"),
            seat: url("TS_SEAT_URL", "http://ts-seat-service:18898"),
            order: url("TS_ORDER_URL", "http://ts-order-service:12031"),
            assurance: url("TS_ASSURANCE_URL", "http://ts-assurance-service:18888"),
            food: url("TS_FOOD_URL", "http://ts-food-service:18856"),
            consign: url("TS_CONSIGN_URL", "http://ts-consign-service:16111"),
            user: url("TS_USER_URL", "http://ts-user-service:12342"),
            notification: url("TS_NOTIFICATION_URL", "http://ts-notification-service:17853"),
            request_timeout_secs: env::var("TS_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Every service behind one base URL (a gateway, or a test server).
    #[must_use]
    pub fn uniform(base_url: &str) -> Self {
        let url = base_url.to_string();
        Self {
            station: url.clone(),
            train: url.clone(),
            route: url.clone(),
            price: url.clone(),
            security: url.clone(),
            contacts: url.clone(),
            travel: url.clone(),
            ticket_info: url.clone(),
            seat: url.clone(),
            order: url.clone(),
            assurance: url.clone(),
            food: url.clone(),
            consign: url.clone(),
            user: url.clone(),
            notification: url,
            request_timeout_secs: 30,
        }
    }

    /// Override the request timeout
    #[must_use]
    pub const fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Transport timeout of a single HTTP request
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `(service name, base URL)` for every service
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 15] {
        [
            (services::STATION, &self.station),
            (services::TRAIN, &self.train),
            (services::ROUTE, &self.route),
            (services::PRICE, &self.price),
            (services::SECURITY, &self.security),
            (services::CONTACTS, &self.contacts),
            (services::TRAVEL, &self.travel),
            (services::TICKET_INFO, &self.ticket_info),
            (services::SEAT, &self.seat),
            (services::ORDER, &self.order),
            (services::ASSURANCE, &self.assurance),
            (services::FOOD, &self.food),
            (services::CONSIGN, &self.consign),
            (services::USER, &self.user),
            (services::NOTIFICATION, &self.notification),
        ]
    }
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_points_every_service_at_one_base() {
        let endpoints = ServiceEndpoints::uniform("http://127.0.0.1:8080");
        assert!(endpoints.entries().iter().all(|(_, url)| *url == "http://127.0.0.1:8080"));
        assert_eq!(endpoints.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn entries_cover_each_service_once() {
        let endpoints = ServiceEndpoints::uniform("http://localhost");
        let mut names: Vec<_> = endpoints.entries().iter().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 15);
    }
}
