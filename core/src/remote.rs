//! Ports to the downstream services.
//!
//! One trait per service. Each call takes the request's [`RequestContext`]
//! and answers either an envelope ([`Response`]) or a [`RemoteError`] when no
//! envelope could be obtained at all.
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of being `async fn` so the
//! ports can be held as `Arc<dyn ...>` and captured by cache fetchers.
//!
//! # Implementations
//!
//! - `HttpGateway` (in `trainticket-http`): production `reqwest` client
//! - `InMemoryRailway` (in `trainticket-testing`): deterministic fakes

use crate::context::RequestContext;
use crate::envelope::Response;
use crate::error::RemoteError;
use crate::types::{
    Consign, Contacts, FoodOrder, NotifyInfo, Order, PriceConfig, Route, SeatRequest, Ticket,
    TrainType, Travel, TravelResult, TripAllDetail, TripAllDetailInfo, User,
};
use std::future::Future;
use std::pin::Pin;

/// Service names used in errors, logs and metric labels.
pub mod services {
    /// Station service
    pub const STATION: &str = "station";
    /// Train service
    pub const TRAIN: &str = "train";
    /// Route service
    pub const ROUTE: &str = "route";
    /// Price service
    pub const PRICE: &str = "price";
    /// Security service
    pub const SECURITY: &str = "security";
    /// Contacts service
    pub const CONTACTS: &str = "contacts";
    /// Travel service
    pub const TRAVEL: &str = "travel";
    /// Ticket-info service
    pub const TICKET_INFO: &str = "ticketinfo";
    /// Seat service
    pub const SEAT: &str = "seat";
    /// Order service
    pub const ORDER: &str = "order";
    /// Assurance service
    pub const ASSURANCE: &str = "assurance";
    /// Food service
    pub const FOOD: &str = "food";
    /// Consign service
    pub const CONSIGN: &str = "consign";
    /// User service
    pub const USER: &str = "user";
    /// Notification service
    pub const NOTIFICATION: &str = "notification";
}

/// Future returned by every port method.
pub type RemoteFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<Response<T>, RemoteError>> + Send + 'a>>;

/// Station service: station name → station id.
///
/// A failure status means the station does not exist.
pub trait StationService: Send + Sync {
    /// Resolve a station name to its id
    fn station_id<'a>(&'a self, name: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, String>;
}

/// Train service: train type records.
pub trait TrainService: Send + Sync {
    /// Look up a train type
    fn train_type<'a>(&'a self, id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, TrainType>;
}

/// Route service: station sequences and cumulative distances.
pub trait RouteService: Send + Sync {
    /// Look up a route
    fn route<'a>(&'a self, id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, Route>;
}

/// Price service: per-class rates.
pub trait PriceService: Send + Sync {
    /// Look up the rates for a (route, train type) pair
    fn price_config<'a>(
        &'a self,
        route_id: &'a str,
        train_type: &'a str,
        ctx: &'a RequestContext,
    ) -> RemoteFuture<'a, PriceConfig>;
}

/// Security service: fraud / scalper checks.
pub trait SecurityService: Send + Sync {
    /// Check whether the account may book
    fn check<'a>(&'a self, account_id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, ()>;
}

/// Contacts service: billing contacts.
pub trait ContactsService: Send + Sync {
    /// Look up a contact
    fn contacts<'a>(&'a self, id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, Contacts>;
}

/// Travel service: capacity and schedule of a trip.
pub trait TravelService: Send + Sync {
    /// Trip detail including remaining seats per class
    fn trip_detail<'a>(
        &'a self,
        query: &'a TripAllDetailInfo,
        ctx: &'a RequestContext,
    ) -> RemoteFuture<'a, TripAllDetail>;
}

/// Ticket-info service: prices of a trip segment.
pub trait TicketInfoService: Send + Sync {
    /// Price query for a segment
    fn ticket_info<'a>(&'a self, query: &'a Travel, ctx: &'a RequestContext) -> RemoteFuture<'a, TravelResult>;
}

/// Seat service: allocates, and on forced refetch finalizes, seats.
pub trait SeatService: Send + Sync {
    /// Allocate (or, with a forced-refetch context, finalize) a seat
    fn dispatch<'a>(&'a self, request: &'a SeatRequest, ctx: &'a RequestContext) -> RemoteFuture<'a, Ticket>;
}

/// Order service: the durable order ledger.
pub trait OrderService: Send + Sync {
    /// Persist an order
    fn create<'a>(&'a self, order: &'a Order, ctx: &'a RequestContext) -> RemoteFuture<'a, Order>;
}

/// Assurance service.
pub trait AssuranceService: Send + Sync {
    /// Attach an assurance of `assurance_type` to an order
    fn add<'a>(
        &'a self,
        assurance_type: i32,
        order_id: &'a str,
        ctx: &'a RequestContext,
    ) -> RemoteFuture<'a, ()>;
}

/// Food service.
pub trait FoodService: Send + Sync {
    /// Create a food order
    fn create<'a>(&'a self, order: &'a FoodOrder, ctx: &'a RequestContext) -> RemoteFuture<'a, ()>;
}

/// Consign service.
pub trait ConsignService: Send + Sync {
    /// Create a consignment
    fn create<'a>(&'a self, consign: &'a Consign, ctx: &'a RequestContext) -> RemoteFuture<'a, ()>;
}

/// User service.
pub trait UserService: Send + Sync {
    /// Look up an account
    fn account<'a>(&'a self, account_id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, User>;
}

/// Notification service.
pub trait NotificationService: Send + Sync {
    /// Send the "reservation succeeded" notification
    fn preserve_success<'a>(&'a self, info: &'a NotifyInfo, ctx: &'a RequestContext) -> RemoteFuture<'a, ()>;
}
