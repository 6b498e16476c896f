//! The reservation saga.
//!
//! One call to [`ReservationSaga::preserve`] books one ticket:
//!
//! ```text
//! Init ─► SecurityChecked ─► ContactsResolved ─► CapacityChecked ─► SeatSpeculated
//!                                                                        │
//!            (any failure above aborts, nothing to compensate)           ▼
//!                                                                 OrderCommitted
//!                                                                        │
//!        forced invalidation of the trip and seat entries ◄──────────────┤
//!                                                                        ▼
//!     AssuranceApplied ─► FoodApplied ─► ConsignApplied ─► Notified ─► Done
//!                   (best effort, failures only reported)
//! ```
//!
//! Every lookup before the commit goes through a [`ConsistencyCheckedCache`]
//! under the reservation's correlation id. The seat is only *proposed* while
//! planning; after the commit the trip and seat entries remembered for the
//! correlation id are invalidated with a forced-refetch context, which makes
//! the seat service finalize the seat and the travel service recount
//! capacity.
//!
//! Each stage produces an immutable value the next stage consumes, so the
//! forced-refetch marker exists only on the context built for the
//! invalidation calls.

use crate::advisory::{AdvisoryReport, AdvisoryStep};
use crate::config::{ConfigError, PreserveConfig};
use crate::environment::PreserveEnvironment;
use crate::error::ReservationError;
use crate::phase::SagaPhase;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use trainticket_cache::{CacheMetrics, ConsistencyCheckedCache, FnFetcher, Invalidation};
use trainticket_core::context::RequestContext;
use trainticket_core::correlation::CorrelationId;
use trainticket_core::envelope::Response;
use trainticket_core::error::RemoteError;
use trainticket_core::remote::services;
use trainticket_core::types::{
    Consign, Contacts, FoodOrder, NotifyInfo, Order, OrderStatus, OrderTicketsInfo, SeatClass,
    SeatRequest, Ticket, TicketPrices, Travel, TravelResult, Trip, TripAllDetail,
    TripAllDetailInfo, TripResponse,
};
use trainticket_runtime::{CallDeadline, ReservationMetrics, ReservationOutcomeLabel};

/// Messages of reservations rejected before commit.
pub mod messages {
    /// The requested class has no room
    pub const SEAT_NOT_ENOUGH: &str = "Seat Not Enough";
    /// The travel service sent no trip detail
    pub const TRIP_DETAIL_MISSING: &str = "Get TripAllDetail failed.";
    /// The trip detail had no capacity record
    pub const TRIP_RESPONSE_MISSING: &str = "Get TripResponse from TripAllDetail failed.";
    /// The contacts service sent no contact
    pub const CONTACTS_MISSING: &str = "Contacts not found";
    /// A station name did not resolve
    pub const STATION_MISSING: &str = "Station not found";
    /// The ticket-info service sent no prices
    pub const TICKET_PRICE_MISSING: &str = "Ticket price not found";
    /// The seat service sent no ticket
    pub const SEAT_MISSING: &str = "Seat not assigned";
    /// The user service sent no account
    pub const USER_MISSING: &str = "No User";
}

/// Names of the reservation caches, used as metric labels.
pub mod caches {
    /// Account id → security verdict
    pub const SECURITY: &str = "preserve.security";
    /// Contacts id → contact
    pub const CONTACTS: &str = "preserve.contacts";
    /// Trip query → capacity and schedule
    pub const TRIPS: &str = "preserve.trips";
    /// Station name → station id
    pub const STATION_IDS: &str = "preserve.station_ids";
    /// Travel query → prices
    pub const TICKET_INFO: &str = "preserve.ticket_info";
    /// Seat request → proposed seat
    pub const SEATS: &str = "preserve.seats";
}

type Cache<K, V> = ConsistencyCheckedCache<K, RequestContext, V, RemoteError>;

/// The caches a reservation reads through.
pub struct ReservationCaches {
    /// Security verdicts
    pub security: Cache<String, Response<()>>,
    /// Billing contacts
    pub contacts: Cache<String, Response<Contacts>>,
    /// Trip capacity, invalidated after commit
    pub trips: Cache<TripAllDetailInfo, Response<TripAllDetail>>,
    /// Station ids
    pub station_ids: Cache<String, Option<String>>,
    /// Ticket prices
    pub ticket_info: Cache<Travel, Option<TravelResult>>,
    /// Proposed seats, invalidated after commit
    pub seats: Cache<SeatRequest, Response<Ticket>>,
}

fn cache<K, V, F, Fut>(name: &str, capacity: usize, fetch: F) -> Cache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + PartialEq + Debug + Send + Sync + 'static,
    F: Fn(K, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, RemoteError>> + Send + 'static,
{
    ConsistencyCheckedCache::new(name, capacity, FnFetcher::new(fetch))
}

impl ReservationCaches {
    fn new(env: &PreserveEnvironment, capacity: usize, deadline: CallDeadline) -> Self {
        let security = env.security.clone();
        let contacts = env.contacts.clone();
        let travel = env.travel.clone();
        let stations = env.stations.clone();
        let ticket_info = env.ticket_info.clone();
        let seats = env.seats.clone();

        Self {
            security: cache(caches::SECURITY, capacity, move |account: String, ctx| {
                let security = security.clone();
                async move { deadline.run(services::SECURITY, security.check(&account, &ctx)).await }
            }),
            contacts: cache(caches::CONTACTS, capacity, move |id: String, ctx| {
                let contacts = contacts.clone();
                async move { deadline.run(services::CONTACTS, contacts.contacts(&id, &ctx)).await }
            }),
            trips: cache(caches::TRIPS, capacity, move |query: TripAllDetailInfo, ctx| {
                let travel = travel.clone();
                async move { deadline.run(services::TRAVEL, travel.trip_detail(&query, &ctx)).await }
            }),
            station_ids: cache(caches::STATION_IDS, capacity, move |name: String, ctx| {
                let stations = stations.clone();
                async move {
                    deadline
                        .run(services::STATION, stations.station_id(&name, &ctx))
                        .await
                        .map(|answer| answer.data)
                }
            }),
            ticket_info: cache(caches::TICKET_INFO, capacity, move |query: Travel, ctx| {
                let ticket_info = ticket_info.clone();
                async move {
                    deadline
                        .run(services::TICKET_INFO, ticket_info.ticket_info(&query, &ctx))
                        .await
                        .map(|answer| answer.data)
                }
            }),
            seats: cache(caches::SEATS, capacity, move |request: SeatRequest, ctx| {
                let seats = seats.clone();
                async move { deadline.run(services::SEAT, seats.dispatch(&request, &ctx)).await }
            }),
        }
    }

    /// Counter snapshots, labelled by cache name
    pub async fn metrics(&self) -> Vec<(&str, CacheMetrics)> {
        vec![
            (self.security.name(), self.security.metrics().await),
            (self.contacts.name(), self.contacts.metrics().await),
            (self.trips.name(), self.trips.metrics().await),
            (self.station_ids.name(), self.station_ids.metrics().await),
            (self.ticket_info.name(), self.ticket_info.metrics().await),
            (self.seats.name(), self.seats.metrics().await),
        ]
    }

    /// Correlation ids still remembered across all caches
    pub async fn pending_correlations(&self) -> usize {
        self.security.ledger_len().await
            + self.contacts.ledger_len().await
            + self.trips.ledger_len().await
            + self.station_ids.ledger_len().await
            + self.ticket_info.ledger_len().await
            + self.seats.ledger_len().await
    }

    async fn forget(&self, id: &CorrelationId) {
        self.security.forget(id).await;
        self.contacts.forget(id).await;
        self.trips.forget(id).await;
        self.station_ids.forget(id).await;
        self.ticket_info.forget(id).await;
        self.seats.forget(id).await;
    }
}

/// A committed reservation.
#[derive(Clone, Debug, PartialEq)]
pub struct ReservationOutcome {
    /// Correlation id the reservation ran under
    pub correlation_id: CorrelationId,
    /// The committed order
    pub order: Order,
    /// `"Success."` or `"Success.But ..."`
    pub message: String,
    /// Advisory steps that failed
    pub failed_steps: Vec<AdvisoryStep>,
}

impl ReservationOutcome {
    /// Whether an advisory step failed
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failed_steps.is_empty()
    }

    /// Success envelope carrying the order
    #[must_use]
    pub fn into_response(self) -> Response<Order> {
        Response::success(self.message, self.order)
    }

    fn outcome_label(&self) -> ReservationOutcomeLabel {
        if self.failed_steps.is_empty() {
            ReservationOutcomeLabel::Success
        } else {
            ReservationOutcomeLabel::Partial
        }
    }
}

/// Whether `capacity` admits a request for `class`.
///
/// Comfort requests need a non-zero comfort count. Economy requests are only
/// turned away when exactly as many economy seats remain as the economy class
/// code *and* no comfort seats remain; any other economy request is admitted.
#[must_use]
pub fn has_room(class: SeatClass, capacity: &TripResponse) -> bool {
    match class {
        SeatClass::FirstClass => capacity.comfort_class != 0,
        SeatClass::SecondClass => {
            !(capacity.economy_class == SeatClass::SecondClass.code() && capacity.comfort_class == 0)
        },
    }
}

/// Payload of an envelope, or the reservation error its absence means.
fn required<T>(answer: Response<T>, missing: &'static str) -> Result<T, ReservationError> {
    if !answer.is_success() {
        return Err(ReservationError::Business(answer.message));
    }
    answer.data.ok_or(ReservationError::MissingData(missing))
}

/// Capacity check result.
struct CheckedTrip {
    query: TripAllDetailInfo,
    trip: Trip,
    capacity: TripResponse,
}

/// Everything decided before the commit.
struct SeatPlan {
    from_id: String,
    to_id: String,
    prices: TicketPrices,
    request: SeatRequest,
    ticket: Ticket,
}

/// Books tickets.
pub struct ReservationSaga {
    env: PreserveEnvironment,
    deadline: CallDeadline,
    caches: ReservationCaches,
}

impl ReservationSaga {
    /// Build the saga and its caches.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config` is unusable.
    pub fn new(env: PreserveEnvironment, config: &PreserveConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let deadline = config.call_deadline();
        let caches = ReservationCaches::new(&env, config.cache_capacity, deadline);
        Ok(Self {
            env,
            deadline,
            caches,
        })
    }

    /// The caches, for diagnostics
    #[must_use]
    pub const fn caches(&self) -> &ReservationCaches {
        &self.caches
    }

    /// Book the ticket described by `info`.
    ///
    /// A fresh correlation id is minted and attached to `ctx` for every call
    /// the reservation makes. Credentials already on `ctx` are forwarded.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError`] when the reservation aborts before the
    /// order is committed. Nothing after the commit fails the reservation.
    pub async fn preserve(
        &self,
        info: &OrderTicketsInfo,
        ctx: &RequestContext,
    ) -> Result<ReservationOutcome, ReservationError> {
        let id = self.env.ids.next_id();
        let ctx = ctx.clone().with_correlation_id(id.clone());

        let outcome = self.run(&id, info, &ctx).await;
        self.caches.forget(&id).await;

        match &outcome {
            Ok(reservation) => {
                tracing::info!(
                    correlation_id = %id,
                    order_id = %reservation.order.id,
                    message = %reservation.message,
                    "Reservation completed"
                );
                ReservationMetrics::record_outcome(reservation.outcome_label());
            },
            Err(error) => {
                tracing::warn!(correlation_id = %id, error = %error, "Reservation aborted");
                ReservationMetrics::record_outcome(error.outcome_label());
            },
        }
        outcome
    }

    /// [`Self::preserve`] folded into a response envelope.
    pub async fn preserve_response(&self, info: &OrderTicketsInfo, ctx: &RequestContext) -> Response<Order> {
        match self.preserve(info, ctx).await {
            Ok(reservation) => reservation.into_response(),
            Err(error) => error.into_response(),
        }
    }

    async fn run(
        &self,
        id: &CorrelationId,
        info: &OrderTicketsInfo,
        ctx: &RequestContext,
    ) -> Result<ReservationOutcome, ReservationError> {
        advance(id, SagaPhase::Init);

        self.check_security(id, info, ctx).await?;
        advance(id, SagaPhase::SecurityChecked);

        let contacts = self.resolve_contacts(id, info, ctx).await?;
        advance(id, SagaPhase::ContactsResolved);

        let trip = self.check_capacity(id, info, ctx).await?;
        advance(id, SagaPhase::CapacityChecked);

        let plan = self.plan_seat(id, info, &trip, ctx).await?;
        advance(id, SagaPhase::SeatSpeculated);

        let order = self.commit(info, &contacts, &trip, &plan, ctx).await?;
        advance(id, SagaPhase::OrderCommitted);

        self.invalidate_speculation(id, &trip.query, &plan.request, ctx).await;

        let report = self.run_advisory_steps(id, info, &order, ctx).await;
        advance(id, SagaPhase::Done);

        Ok(ReservationOutcome {
            correlation_id: id.clone(),
            message: report.message(),
            failed_steps: report.into_failed_steps(),
            order,
        })
    }

    //
    // ===== Pre-commit =====
    //

    async fn check_security(
        &self,
        id: &CorrelationId,
        info: &OrderTicketsInfo,
        ctx: &RequestContext,
    ) -> Result<(), ReservationError> {
        let verdict = self
            .caches
            .security
            .get_or_insert(id, &info.account_id.to_string(), ctx)
            .await?;
        if verdict.is_success() {
            Ok(())
        } else {
            Err(ReservationError::Business(verdict.message))
        }
    }

    async fn resolve_contacts(
        &self,
        id: &CorrelationId,
        info: &OrderTicketsInfo,
        ctx: &RequestContext,
    ) -> Result<Contacts, ReservationError> {
        let answer = self
            .caches
            .contacts
            .get_or_insert(id, &info.contacts_id, ctx)
            .await?;
        required(answer, messages::CONTACTS_MISSING)
    }

    async fn check_capacity(
        &self,
        id: &CorrelationId,
        info: &OrderTicketsInfo,
        ctx: &RequestContext,
    ) -> Result<CheckedTrip, ReservationError> {
        let query = TripAllDetailInfo {
            trip_id: info.trip_id.clone(),
            travel_date: info.date,
            from: info.from.clone(),
            to: info.to.clone(),
        };

        let answer = self.caches.trips.get_or_insert(id, &query, ctx).await?;
        let detail = required(answer, messages::TRIP_DETAIL_MISSING)?;
        let capacity = detail
            .trip_response
            .ok_or(ReservationError::MissingData(messages::TRIP_RESPONSE_MISSING))?;
        let trip = detail
            .trip
            .ok_or(ReservationError::MissingData(messages::TRIP_DETAIL_MISSING))?;

        if !has_room(info.seat_type, &capacity) {
            tracing::info!(
                correlation_id = %id,
                seat_class = %info.seat_type,
                economy = capacity.economy_class,
                comfort = capacity.comfort_class,
                "No room in requested class"
            );
            return Err(ReservationError::Business(messages::SEAT_NOT_ENOUGH.to_string()));
        }

        Ok(CheckedTrip {
            query,
            trip,
            capacity,
        })
    }

    async fn plan_seat(
        &self,
        id: &CorrelationId,
        info: &OrderTicketsInfo,
        trip: &CheckedTrip,
        ctx: &RequestContext,
    ) -> Result<SeatPlan, ReservationError> {
        let from_id = self.station_id(id, &info.from, ctx).await?;
        let to_id = self.station_id(id, &info.to, ctx).await?;

        let travel = Travel {
            trip: trip.trip.clone(),
            starting_place: info.from.clone(),
            end_place: info.to.clone(),
            departure_time: self.env.clock.now(),
        };
        let prices = self
            .caches
            .ticket_info
            .get_or_insert(id, &travel, ctx)
            .await?
            .ok_or(ReservationError::MissingData(messages::TICKET_PRICE_MISSING))?
            .prices;

        let request = SeatRequest {
            travel_date: info.date,
            train_number: info.trip_id.clone(),
            start_station: from_id.clone(),
            dest_station: to_id.clone(),
            seat_type: info.seat_type,
        };
        let answer = self.caches.seats.get_or_insert(id, &request, ctx).await?;
        let ticket = required(answer, messages::SEAT_MISSING)?;

        tracing::debug!(
            correlation_id = %id,
            seat_no = ticket.seat_no,
            price = prices.for_class(info.seat_type),
            "Seat proposed"
        );

        Ok(SeatPlan {
            from_id,
            to_id,
            prices,
            request,
            ticket,
        })
    }

    async fn station_id(
        &self,
        id: &CorrelationId,
        name: &str,
        ctx: &RequestContext,
    ) -> Result<String, ReservationError> {
        self.caches
            .station_ids
            .get_or_insert(id, &name.to_string(), ctx)
            .await?
            .ok_or(ReservationError::MissingData(messages::STATION_MISSING))
    }

    //
    // ===== Commit =====
    //

    fn draft_order(
        &self,
        info: &OrderTicketsInfo,
        contacts: &Contacts,
        trip: &CheckedTrip,
        plan: &SeatPlan,
    ) -> Order {
        Order {
            id: self.env.ids.next_order_id(),
            bought_date: self.env.clock.now(),
            travel_date: info.date,
            travel_time: trip.capacity.starting_time,
            account_id: info.account_id,
            contacts_name: contacts.name.clone(),
            document_type: contacts.document_type,
            contacts_document_number: contacts.document_number.clone(),
            train_number: info.trip_id.clone(),
            seat_class: info.seat_type,
            seat_number: plan.ticket.seat_no.to_string(),
            from: plan.from_id.clone(),
            to: plan.to_id.clone(),
            status: OrderStatus::NotPaid,
            price: plan.prices.for_class(info.seat_type),
        }
    }

    async fn commit(
        &self,
        info: &OrderTicketsInfo,
        contacts: &Contacts,
        trip: &CheckedTrip,
        plan: &SeatPlan,
        ctx: &RequestContext,
    ) -> Result<Order, ReservationError> {
        let draft = self.draft_order(info, contacts, trip, plan);
        let answer = self
            .deadline
            .run(services::ORDER, self.env.orders.create(&draft, ctx))
            .await?;
        if !answer.is_success() {
            return Err(ReservationError::Business(answer.message));
        }
        Ok(answer.data.unwrap_or(draft))
    }

    //
    // ===== Post-commit =====
    //

    async fn invalidate_speculation(
        &self,
        id: &CorrelationId,
        trip_query: &TripAllDetailInfo,
        seat_request: &SeatRequest,
        ctx: &RequestContext,
    ) {
        let forced = ctx.forced_refetch();

        let trips = self.caches.trips.invalidate(id, trip_query, &forced, true).await;
        note_invalidation(id, self.caches.trips.name(), trips);

        let seats = self.caches.seats.invalidate(id, seat_request, &forced, true).await;
        note_invalidation(id, self.caches.seats.name(), seats);
    }

    async fn run_advisory_steps(
        &self,
        id: &CorrelationId,
        info: &OrderTicketsInfo,
        order: &Order,
        ctx: &RequestContext,
    ) -> AdvisoryReport {
        let mut report = AdvisoryReport::default();
        let order_id = order.id.to_string();

        if info.assurance == 0 {
            skip(id, AdvisoryStep::Assurance);
        } else {
            let answer = self
                .deadline
                .run(
                    services::ASSURANCE,
                    self.env.assurance.add(info.assurance, &order_id, ctx),
                )
                .await;
            settle(id, AdvisoryStep::Assurance, answer, &mut report);
        }
        advance(id, SagaPhase::AssuranceApplied);

        if info.food_type == 0 {
            skip(id, AdvisoryStep::Food);
        } else {
            let food = food_order(info, order);
            let answer = self
                .deadline
                .run(services::FOOD, self.env.food.create(&food, ctx))
                .await;
            settle(id, AdvisoryStep::Food, answer, &mut report);
        }
        advance(id, SagaPhase::FoodApplied);

        if info.consignee_name.is_empty() {
            skip(id, AdvisoryStep::Consign);
        } else {
            let consign = consignment(info, order);
            let answer = self
                .deadline
                .run(services::CONSIGN, self.env.consign.create(&consign, ctx))
                .await;
            settle(id, AdvisoryStep::Consign, answer, &mut report);
        }
        advance(id, SagaPhase::ConsignApplied);

        let answer = self.notify(order, ctx).await;
        settle(id, AdvisoryStep::Notification, answer, &mut report);
        advance(id, SagaPhase::Notified);

        report
    }

    async fn notify(&self, order: &Order, ctx: &RequestContext) -> Result<Response<()>, RemoteError> {
        let account = self
            .deadline
            .run(
                services::USER,
                self.env.users.account(&order.account_id.to_string(), ctx),
            )
            .await?;
        if !account.is_success() {
            return Ok(Response::failure(account.message));
        }
        let Some(user) = account.data else {
            return Ok(Response::failure(messages::USER_MISSING));
        };

        let notice = NotifyInfo {
            email: user.email,
            order_number: order.id.to_string(),
            username: user.user_name,
            starting_place: order.from.clone(),
            end_place: order.to.clone(),
            starting_time: order.travel_time.to_rfc3339(),
            date: self.env.clock.now().date_naive().to_string(),
            seat_class: order.seat_class.name().to_string(),
            seat_number: order.seat_number.clone(),
            price: order.price.to_string(),
        };
        self.deadline
            .run(
                services::NOTIFICATION,
                self.env.notifications.preserve_success(&notice, ctx),
            )
            .await
    }
}

impl std::fmt::Debug for ReservationSaga {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationSaga")
            .field("deadline", &self.deadline)
            .field("capacity", &self.caches.seats.capacity())
            .finish_non_exhaustive()
    }
}

fn advance(id: &CorrelationId, phase: SagaPhase) {
    tracing::info!(correlation_id = %id, phase = %phase, "Reservation advanced");
}

fn skip(id: &CorrelationId, step: AdvisoryStep) {
    tracing::debug!(correlation_id = %id, step = %step, "Advisory step not requested");
}

fn settle(
    id: &CorrelationId,
    step: AdvisoryStep,
    answer: Result<Response<()>, RemoteError>,
    report: &mut AdvisoryReport,
) {
    let failure = match answer {
        Ok(response) if response.is_success() => {
            tracing::debug!(correlation_id = %id, step = %step, "Advisory step succeeded");
            return;
        },
        Ok(response) => response.message,
        Err(error) => error.to_string(),
    };
    tracing::warn!(correlation_id = %id, step = %step, reason = %failure, "Advisory step failed");
    ReservationMetrics::record_advisory_failure(step.as_str());
    report.record_failure(step);
}

fn note_invalidation<K: Debug>(id: &CorrelationId, cache: &str, result: Result<Invalidation<K>, RemoteError>) {
    match result {
        Ok(Invalidation::Effective {
            remembered_key,
            entry_was_present,
        }) => {
            tracing::debug!(
                correlation_id = %id,
                cache,
                key = ?remembered_key,
                entry_was_present,
                "Invalidated after commit"
            );
        },
        Ok(Invalidation::Redundant) => {
            tracing::debug!(correlation_id = %id, cache, "Nothing remembered to invalidate");
        },
        Err(error) => {
            tracing::warn!(correlation_id = %id, cache, error = %error, "Post-commit refetch failed");
            ReservationMetrics::record_invalidation_failure(cache);
        },
    }
}

fn food_order(info: &OrderTicketsInfo, order: &Order) -> FoodOrder {
    let at_station = info.food_type == 2;
    FoodOrder {
        order_id: order.id,
        food_type: info.food_type,
        station_name: at_station.then(|| info.station_name.clone()),
        store_name: at_station.then(|| info.store_name.clone()),
        food_name: info.food_name.clone(),
        price: info.food_price,
    }
}

fn consignment(info: &OrderTicketsInfo, order: &Order) -> Consign {
    Consign {
        order_id: order.id,
        account_id: order.account_id,
        handle_date: info.handle_date.clone(),
        target_date: order.travel_date.to_string(),
        from: order.from.clone(),
        to: order.to.clone(),
        consignee: info.consignee_name.clone(),
        phone: info.consignee_phone.clone(),
        weight: info.consignee_weight,
        within: info.is_within,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainticket_testing::fixtures;
    use uuid::Uuid;

    fn capacity(economy: i32, comfort: i32) -> TripResponse {
        TripResponse {
            economy_class: economy,
            comfort_class: comfort,
            ..fixtures::trip_response()
        }
    }

    #[test]
    fn comfort_needs_comfort_seats() {
        assert!(!has_room(SeatClass::FirstClass, &capacity(120, 0)));
        assert!(has_room(SeatClass::FirstClass, &capacity(0, 1)));
    }

    #[test]
    fn economy_is_only_refused_in_the_legacy_combination() {
        assert!(!has_room(SeatClass::SecondClass, &capacity(3, 0)));
        assert!(has_room(SeatClass::SecondClass, &capacity(0, 0)));
        assert!(has_room(SeatClass::SecondClass, &capacity(3, 1)));
        assert!(has_room(SeatClass::SecondClass, &capacity(2, 0)));
    }

    #[test]
    fn required_checks_status_before_payload() {
        let refused: Response<i32> = Response::failure("nope");
        assert_eq!(
            required(refused, "missing"),
            Err(ReservationError::Business("nope".to_string()))
        );

        let empty: Response<i32> = Response::success_empty("Success");
        assert_eq!(required(empty, "missing"), Err(ReservationError::MissingData("missing")));
    }

    #[test]
    fn station_food_carries_store() {
        let mut info = fixtures::order_request(SeatClass::SecondClass);
        info.food_type = 2;
        info.station_name = "Nan Jing".to_string();
        info.store_name = "KFC".to_string();
        let order = Order {
            id: Uuid::nil(),
            bought_date: fixtures::starting_time(),
            travel_date: fixtures::travel_date(),
            travel_time: fixtures::starting_time(),
            account_id: fixtures::account_id(),
            contacts_name: String::new(),
            document_type: 1,
            contacts_document_number: String::new(),
            train_number: fixtures::TRIP_ID.to_string(),
            seat_class: SeatClass::SecondClass,
            seat_number: "1".to_string(),
            from: fixtures::SUZHOU_ID.to_string(),
            to: fixtures::NANJING_ID.to_string(),
            status: OrderStatus::NotPaid,
            price: 25.0,
        };

        let food = food_order(&info, &order);
        assert_eq!(food.store_name.as_deref(), Some("KFC"));

        info.food_type = 1;
        assert_eq!(food_order(&info, &order).station_name, None);
    }
}
