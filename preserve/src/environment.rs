//! Everything a reservation depends on but does not own.

use std::sync::Arc;
use trainticket_core::environment::{Clock, IdGenerator, SystemClock, UuidIdGenerator};
use trainticket_core::remote::{
    AssuranceService, ConsignService, ContactsService, FoodService, NotificationService,
    OrderService, SeatService, SecurityService, StationService, TicketInfoService, TravelService,
    UserService,
};

/// Injected clock, id generator and downstream services.
#[derive(Clone)]
pub struct PreserveEnvironment {
    /// Bought dates, price-query departure times, notification dates
    pub clock: Arc<dyn Clock>,
    /// Correlation ids, one per reservation
    pub ids: Arc<dyn IdGenerator>,
    /// Scalper check
    pub security: Arc<dyn SecurityService>,
    /// Billing contacts
    pub contacts: Arc<dyn ContactsService>,
    /// Trip capacity
    pub travel: Arc<dyn TravelService>,
    /// Station ids
    pub stations: Arc<dyn StationService>,
    /// Ticket prices
    pub ticket_info: Arc<dyn TicketInfoService>,
    /// Seat allocation
    pub seats: Arc<dyn SeatService>,
    /// Order commit
    pub orders: Arc<dyn OrderService>,
    /// Assurance add-on
    pub assurance: Arc<dyn AssuranceService>,
    /// Food add-on
    pub food: Arc<dyn FoodService>,
    /// Consignment add-on
    pub consign: Arc<dyn ConsignService>,
    /// Account lookup for notifications
    pub users: Arc<dyn UserService>,
    /// Notifications
    pub notifications: Arc<dyn NotificationService>,
}

/// A single value answering every service a reservation calls.
pub trait RailwayServices:
    SecurityService
    + ContactsService
    + TravelService
    + StationService
    + TicketInfoService
    + SeatService
    + OrderService
    + AssuranceService
    + FoodService
    + ConsignService
    + UserService
    + NotificationService
{
}

impl<T> RailwayServices for T where
    T: SecurityService
        + ContactsService
        + TravelService
        + StationService
        + TicketInfoService
        + SeatService
        + OrderService
        + AssuranceService
        + FoodService
        + ConsignService
        + UserService
        + NotificationService
{
}

impl PreserveEnvironment {
    /// Environment whose services are all answered by `railway`, using the
    /// wall clock and UUID correlation ids.
    pub fn from_provider<P>(railway: Arc<P>) -> Self
    where
        P: RailwayServices + 'static,
    {
        Self::with_parts(railway, Arc::new(SystemClock), Arc::new(UuidIdGenerator))
    }

    /// Environment over `railway` with an explicit clock and id generator.
    pub fn with_parts<P>(railway: Arc<P>, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self
    where
        P: RailwayServices + 'static,
    {
        Self {
            clock,
            ids,
            security: railway.clone(),
            contacts: railway.clone(),
            travel: railway.clone(),
            stations: railway.clone(),
            ticket_info: railway.clone(),
            seats: railway.clone(),
            orders: railway.clone(),
            assurance: railway.clone(),
            food: railway.clone(),
            consign: railway.clone(),
            users: railway.clone(),
            notifications: railway,
        }
    }
}
