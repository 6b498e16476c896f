//! In-memory railway: every downstream service as a deterministic fake.
//!
//! [`InMemoryRailway`] implements all remote ports from
//! `trainticket_core::remote` over shared in-memory state. It records each
//! call (service, correlation id, forced-refetch marker) so tests can assert
//! on what reached the "network".
//!
//! The seat service models the two-phase protocol: a plain dispatch only
//! *proposes* the next free seat and is idempotent; a dispatch whose context
//! carries the forced-refetch marker *finalizes* the seat, consuming it and
//! reducing the trip's remaining capacity.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use trainticket_core::context::RequestContext;
use trainticket_core::correlation::CorrelationId;
use trainticket_core::envelope::Response;
use trainticket_core::error::RemoteError;
use trainticket_core::remote::{
    AssuranceService, ConsignService, ContactsService, FoodService, NotificationService,
    OrderService, PriceService, RemoteFuture, RouteService, SeatService, SecurityService,
    StationService, TicketInfoService, TrainService, TravelService, UserService, services,
};
use trainticket_core::types::{
    Consign, Contacts, FoodOrder, NotifyInfo, Order, PriceConfig, Route, SeatClass, SeatRequest,
    Ticket, TicketPrices, TrainType, Travel, TravelResult, Trip, TripAllDetail, TripAllDetailInfo,
    TripResponse, User,
};

/// One call observed by the railway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    /// Service name (see `trainticket_core::remote::services`)
    pub service: &'static str,
    /// Correlation id carried by the call
    pub correlation_id: Option<CorrelationId>,
    /// Whether the call carried the forced-refetch marker
    pub forced_refetch: bool,
    /// Credentials forwarded with the call
    pub authorization: Option<String>,
}

#[derive(Debug)]
struct TripRecord {
    trip: Trip,
    response: TripResponse,
    next_seat: i32,
}

#[derive(Debug, Default)]
struct RailwayState {
    stations: HashMap<String, String>,
    train_types: HashMap<String, TrainType>,
    routes: HashMap<String, Route>,
    prices: HashMap<(String, String), PriceConfig>,
    contacts: HashMap<String, Contacts>,
    trips: HashMap<String, TripRecord>,
    hollow_trips: HashSet<String>,
    ticket_prices: HashMap<String, TicketPrices>,
    users: HashMap<String, User>,

    rejections: HashMap<&'static str, String>,
    outages: HashSet<&'static str>,
    refetch_outages: HashSet<&'static str>,
    stalls: HashSet<&'static str>,

    orders: Vec<Order>,
    assurances: Vec<(i32, String)>,
    food_orders: Vec<FoodOrder>,
    consigns: Vec<Consign>,
    notifications: Vec<NotifyInfo>,
    calls: Vec<RecordedCall>,
}

/// Shared in-memory state behind every railway service.
///
/// Cloning is cheap; clones share state.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRailway {
    state: Arc<RwLock<RailwayState>>,
}

impl InMemoryRailway {
    /// Empty railway: every lookup fails until populated
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    //
    // ===== Setup =====
    //

    /// Register a station
    #[must_use]
    pub fn with_station(self, name: &str, id: &str) -> Self {
        self.write().stations.insert(name.to_string(), id.to_string());
        self
    }

    /// Register a train type
    #[must_use]
    pub fn with_train_type(self, train_type: TrainType) -> Self {
        self.write().train_types.insert(train_type.id.clone(), train_type);
        self
    }

    /// Register a route
    #[must_use]
    pub fn with_route(self, route: Route) -> Self {
        self.write().routes.insert(route.id.clone(), route);
        self
    }

    /// Register a price config for its (route, train type) pair
    #[must_use]
    pub fn with_price_config(self, config: PriceConfig) -> Self {
        self.write()
            .prices
            .insert((config.route_id.clone(), config.train_type.clone()), config);
        self
    }

    /// Register a contact
    #[must_use]
    pub fn with_contacts(self, contacts: Contacts) -> Self {
        self.write().contacts.insert(contacts.id.clone(), contacts);
        self
    }

    /// Register a trip with its capacity. Seats are numbered from 1.
    #[must_use]
    pub fn with_trip(self, trip: Trip, response: TripResponse) -> Self {
        self.write().trips.insert(
            trip.trip_id.clone(),
            TripRecord {
                trip,
                response,
                next_seat: 1,
            },
        );
        self
    }

    /// Register prices answered by the ticket-info service for a trip
    #[must_use]
    pub fn with_ticket_prices(self, trip_id: &str, prices: TicketPrices) -> Self {
        self.write().ticket_prices.insert(trip_id.to_string(), prices);
        self
    }

    /// Register an account
    #[must_use]
    pub fn with_user(self, user: User) -> Self {
        self.write().users.insert(user.user_id.to_string(), user);
        self
    }

    //
    // ===== Mid-test changes =====
    //

    /// Make `service` answer with a failure envelope carrying `message`
    pub fn reject(&self, service: &'static str, message: &str) {
        self.write().rejections.insert(service, message.to_string());
    }

    /// Make `service` unreachable
    pub fn take_down(&self, service: &'static str) {
        self.write().outages.insert(service);
    }

    /// Make `service` unreachable for forced-refetch calls only
    pub fn take_down_refetches(&self, service: &'static str) {
        self.write().refetch_outages.insert(service);
    }

    /// Make every call to `service` hang without answering
    pub fn stall(&self, service: &'static str) {
        self.write().stalls.insert(service);
    }

    /// Undo [`Self::reject`], [`Self::take_down`],
    /// [`Self::take_down_refetches`] and [`Self::stall`] for `service`
    pub fn restore(&self, service: &'static str) {
        let mut state = self.write();
        state.rejections.remove(service);
        state.outages.remove(service);
        state.refetch_outages.remove(service);
        state.stalls.remove(service);
    }

    /// Make the travel service answer a trip with an empty payload
    pub fn hollow_out_trip(&self, trip_id: &str) {
        self.write().hollow_trips.insert(trip_id.to_string());
    }

    /// Overwrite the remaining seats of a trip
    pub fn set_remaining_seats(&self, trip_id: &str, economy: i32, comfort: i32) {
        if let Some(record) = self.write().trips.get_mut(trip_id) {
            record.response.economy_class = economy;
            record.response.comfort_class = comfort;
        }
    }

    /// Remove a route
    pub fn remove_route(&self, route_id: &str) {
        self.write().routes.remove(route_id);
    }

    //
    // ===== Inspection =====
    //

    /// Every call observed so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.read().calls.clone()
    }

    /// Calls made to `service`
    #[must_use]
    pub fn calls_to(&self, service: &'static str) -> Vec<RecordedCall> {
        self.read()
            .calls
            .iter()
            .filter(|call| call.service == service)
            .cloned()
            .collect()
    }

    /// Orders committed so far
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.read().orders.clone()
    }

    /// Number of committed orders
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.read().orders.len()
    }

    /// Assurances attached so far as `(type, order id)`
    #[must_use]
    pub fn assurances(&self) -> Vec<(i32, String)> {
        self.read().assurances.clone()
    }

    /// Food orders created so far
    #[must_use]
    pub fn food_orders(&self) -> Vec<FoodOrder> {
        self.read().food_orders.clone()
    }

    /// Consignments created so far
    #[must_use]
    pub fn consigns(&self) -> Vec<Consign> {
        self.read().consigns.clone()
    }

    /// Notifications sent so far
    #[must_use]
    pub fn notifications(&self) -> Vec<NotifyInfo> {
        self.read().notifications.clone()
    }

    /// Remaining seats of `class` on a trip
    #[must_use]
    pub fn remaining_seats(&self, trip_id: &str, class: SeatClass) -> Option<i32> {
        self.read().trips.get(trip_id).map(|record| match class {
            SeatClass::FirstClass => record.response.comfort_class,
            SeatClass::SecondClass => record.response.economy_class,
        })
    }

    //
    // ===== Internals =====
    //

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RailwayState> {
        self.state.read().unwrap()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RailwayState> {
        self.state.write().unwrap()
    }

    /// Record the call and apply any configured outage or rejection.
    fn admit<T>(
        &self,
        service: &'static str,
        ctx: &RequestContext,
    ) -> Result<(), Result<Response<T>, RemoteError>> {
        let mut state = self.write();
        state.calls.push(RecordedCall {
            service,
            correlation_id: ctx.correlation_id().cloned(),
            forced_refetch: ctx.is_forced_refetch(),
            authorization: ctx.authorization().map(str::to_string),
        });

        let refetch_down = ctx.is_forced_refetch() && state.refetch_outages.contains(service);
        if refetch_down || state.outages.contains(service) {
            return Err(Err(RemoteError::Unavailable {
                service,
                message: "connection refused".to_string(),
            }));
        }
        if let Some(message) = state.rejections.get(service) {
            return Err(Ok(Response::failure(message.clone())));
        }
        Ok(())
    }
}

/// Record the call, short-circuiting with a configured failure.
macro_rules! admit {
    ($railway:expr, $service:expr, $ctx:expr) => {
        if let Err(answer) = $railway.admit($service, $ctx) {
            return answer;
        }
    };
}

impl StationService for InMemoryRailway {
    fn station_id<'a>(&'a self, name: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, String> {
        Box::pin(async move {
            admit!(self, services::STATION, ctx);
            Ok(match self.read().stations.get(name) {
                Some(id) => Response::success("Success", id.clone()),
                None => Response::failure(format!("Station not exist: {name}")),
            })
        })
    }
}

impl TrainService for InMemoryRailway {
    fn train_type<'a>(&'a self, id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, TrainType> {
        Box::pin(async move {
            admit!(self, services::TRAIN, ctx);
            Ok(match self.read().train_types.get(id) {
                Some(train_type) => Response::success("Success", train_type.clone()),
                None => Response::failure(format!("Train type not found: {id}")),
            })
        })
    }
}

impl RouteService for InMemoryRailway {
    fn route<'a>(&'a self, id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, Route> {
        Box::pin(async move {
            admit!(self, services::ROUTE, ctx);
            Ok(match self.read().routes.get(id) {
                Some(route) => Response::success("Success", route.clone()),
                None => Response::failure(format!("No route with id {id}")),
            })
        })
    }
}

impl PriceService for InMemoryRailway {
    fn price_config<'a>(
        &'a self,
        route_id: &'a str,
        train_type: &'a str,
        ctx: &'a RequestContext,
    ) -> RemoteFuture<'a, PriceConfig> {
        Box::pin(async move {
            admit!(self, services::PRICE, ctx);
            let key = (route_id.to_string(), train_type.to_string());
            Ok(match self.read().prices.get(&key) {
                Some(config) => Response::success("Success", config.clone()),
                None => Response::failure("No price config"),
            })
        })
    }
}

impl SecurityService for InMemoryRailway {
    fn check<'a>(&'a self, _account_id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            admit!(self, services::SECURITY, ctx);
            Ok(Response::success_empty("Success.r"))
        })
    }
}

impl ContactsService for InMemoryRailway {
    fn contacts<'a>(&'a self, id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, Contacts> {
        Box::pin(async move {
            admit!(self, services::CONTACTS, ctx);
            Ok(match self.read().contacts.get(id) {
                Some(contacts) => Response::success("Found Contacts", contacts.clone()),
                None => Response::failure("No contacts according to contacts id"),
            })
        })
    }
}

impl TravelService for InMemoryRailway {
    fn trip_detail<'a>(
        &'a self,
        query: &'a TripAllDetailInfo,
        ctx: &'a RequestContext,
    ) -> RemoteFuture<'a, TripAllDetail> {
        Box::pin(async move {
            admit!(self, services::TRAVEL, ctx);
            let state = self.read();
            if state.hollow_trips.contains(&query.trip_id) {
                return Ok(Response::success("Success", TripAllDetail::default()));
            }
            Ok(match state.trips.get(&query.trip_id) {
                Some(record) => {
                    let response = TripResponse {
                        starting_station: query.from.clone(),
                        terminal_station: query.to.clone(),
                        ..record.response.clone()
                    };
                    Response::success(
                        "Success",
                        TripAllDetail {
                            trip_response: Some(response),
                            trip: Some(record.trip.clone()),
                        },
                    )
                },
                None => Response::failure(format!("Trip {} not found", query.trip_id)),
            })
        })
    }
}

impl TicketInfoService for InMemoryRailway {
    fn ticket_info<'a>(&'a self, query: &'a Travel, ctx: &'a RequestContext) -> RemoteFuture<'a, TravelResult> {
        Box::pin(async move {
            admit!(self, services::TICKET_INFO, ctx);
            let state = self.read();
            Ok(match state.ticket_prices.get(&query.trip.trip_id) {
                Some(prices) => Response::success(
                    "Success",
                    TravelResult {
                        status: true,
                        percent: 1.0,
                        train_type: state.train_types.get(&query.trip.train_type_id).cloned(),
                        prices: *prices,
                    },
                ),
                None => Response::failure("Ticket info not found"),
            })
        })
    }
}

impl SeatService for InMemoryRailway {
    fn dispatch<'a>(&'a self, request: &'a SeatRequest, ctx: &'a RequestContext) -> RemoteFuture<'a, Ticket> {
        Box::pin(async move {
            admit!(self, services::SEAT, ctx);
            let mut state = self.write();
            let Some(record) = state.trips.get_mut(&request.train_number) else {
                return Ok(Response::failure("Trip not found for seat request"));
            };

            let ticket = Ticket {
                seat_no: record.next_seat,
                start_station: request.start_station.clone(),
                dest_station: request.dest_station.clone(),
            };

            if ctx.is_forced_refetch() {
                let remaining = match request.seat_type {
                    SeatClass::FirstClass => &mut record.response.comfort_class,
                    SeatClass::SecondClass => &mut record.response.economy_class,
                };
                if *remaining <= 0 {
                    return Ok(Response::failure("No seat left"));
                }
                *remaining -= 1;
                record.next_seat += 1;
                return Ok(Response::success("Seat finalized", ticket));
            }

            Ok(Response::success("Use a new seat number!", ticket))
        })
    }
}

impl OrderService for InMemoryRailway {
    fn create<'a>(&'a self, order: &'a Order, ctx: &'a RequestContext) -> RemoteFuture<'a, Order> {
        Box::pin(async move {
            admit!(self, services::ORDER, ctx);
            self.write().orders.push(order.clone());
            Ok(Response::success("Success", order.clone()))
        })
    }
}

impl AssuranceService for InMemoryRailway {
    fn add<'a>(
        &'a self,
        assurance_type: i32,
        order_id: &'a str,
        ctx: &'a RequestContext,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            admit!(self, services::ASSURANCE, ctx);
            self.write().assurances.push((assurance_type, order_id.to_string()));
            Ok(Response::success_empty("Success"))
        })
    }
}

impl FoodService for InMemoryRailway {
    fn create<'a>(&'a self, order: &'a FoodOrder, ctx: &'a RequestContext) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            admit!(self, services::FOOD, ctx);
            self.write().food_orders.push(order.clone());
            Ok(Response::success_empty("Success"))
        })
    }
}

impl ConsignService for InMemoryRailway {
    fn create<'a>(&'a self, consign: &'a Consign, ctx: &'a RequestContext) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            admit!(self, services::CONSIGN, ctx);
            self.write().consigns.push(consign.clone());
            Ok(Response::success_empty("You have consigned successfully!"))
        })
    }
}

impl UserService for InMemoryRailway {
    fn account<'a>(&'a self, account_id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, User> {
        Box::pin(async move {
            admit!(self, services::USER, ctx);
            Ok(match self.read().users.get(account_id) {
                Some(user) => Response::success("Success", user.clone()),
                None => Response::failure("No User"),
            })
        })
    }
}

impl NotificationService for InMemoryRailway {
    fn preserve_success<'a>(&'a self, info: &'a NotifyInfo, ctx: &'a RequestContext) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            admit!(self, services::NOTIFICATION, ctx);
            self.write().notifications.push(info.clone());
            Ok(Response::success_empty("Success"))
        })
    }
}
