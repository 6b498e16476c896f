//! The pricing query.
//!
//! [`BasicService`] composes five consistency-checked caches (station
//! existence, station id, train type, route, price rates) into a ticket-price
//! answer for one trip segment. Every lookup is keyed by the request's
//! correlation id, or the anonymous id when the request carries none, and
//! the ledger entries are released once the answer is built.
//!
//! Lookup failures reported by the services do not fail the query: a missing
//! station or train type turns the envelope into a failure but prices are
//! still computed, and pricing faults fall back to
//! [`FALLBACK_PRICES`](crate::pricing::FALLBACK_PRICES). Only transport
//! failures (no envelope at all, or no answer within
//! [`BasicConfig::call_deadline`](crate::config::BasicConfig::call_deadline))
//! surface as errors.

use crate::config::BasicConfig;
use crate::pricing::prices_or_fallback;
use std::sync::Arc;
use trainticket_cache::{CacheMetrics, ConsistencyCheckedCache, FnFetcher};
use trainticket_core::context::RequestContext;
use trainticket_core::correlation::CorrelationId;
use trainticket_core::envelope::{Response, Status};
use trainticket_core::error::RemoteError;
use trainticket_core::remote::{
    PriceService, RouteService, StationService, TrainService, services,
};
use trainticket_core::types::{PriceConfig, Route, TrainType, Travel, TravelResult};

/// Message of a query whose lookups all resolved.
pub const SUCCESS_MESSAGE: &str = "Success";

/// Message when the origin or destination station does not exist.
pub const STATION_MISSING_MESSAGE: &str = "Start place or end place not exist!";

/// Message when the trip's train type does not exist.
pub const TRAIN_TYPE_MISSING_MESSAGE: &str = "Train type doesn't exist";

/// Names of the pricing caches, used as metric labels.
pub mod caches {
    /// Station name → exists
    pub const STATION_EXISTS: &str = "basic.station_exists";
    /// Station name → id envelope
    pub const STATION_IDS: &str = "basic.station_ids";
    /// Train type id → train type
    pub const TRAIN_TYPES: &str = "basic.train_types";
    /// Route id → route
    pub const ROUTES: &str = "basic.routes";
    /// (route id, train type id) → rates
    pub const PRICES: &str = "basic.prices";
}

type Cache<K, V> = ConsistencyCheckedCache<K, RequestContext, V, RemoteError>;

/// Downstream services the pricing query reads from.
#[derive(Clone)]
pub struct BasicEnvironment {
    /// Station name resolution
    pub stations: Arc<dyn StationService>,
    /// Train types
    pub trains: Arc<dyn TrainService>,
    /// Routes
    pub routes: Arc<dyn RouteService>,
    /// Price rates
    pub prices: Arc<dyn PriceService>,
}

impl BasicEnvironment {
    /// Environment whose four services are all answered by `railway`.
    pub fn from_provider<P>(railway: Arc<P>) -> Self
    where
        P: StationService + TrainService + RouteService + PriceService + 'static,
    {
        Self {
            stations: railway.clone(),
            trains: railway.clone(),
            routes: railway.clone(),
            prices: railway,
        }
    }
}

/// Ticket-price query over consistency-checked caches.
pub struct BasicService {
    station_exists: Cache<String, bool>,
    station_ids: Cache<String, Response<String>>,
    train_types: Cache<String, Option<TrainType>>,
    routes: Cache<String, Option<Route>>,
    prices: Cache<(String, String), Option<PriceConfig>>,
}

impl BasicService {
    /// Build the service and its caches.
    #[must_use]
    pub fn new(environment: BasicEnvironment, config: &BasicConfig) -> Self {
        let capacity = config.cache_capacity;
        let deadline = config.call_deadline();
        let BasicEnvironment {
            stations,
            trains,
            routes,
            prices,
        } = environment;

        let exists_source = stations.clone();
        let station_exists = Cache::new(
            caches::STATION_EXISTS,
            capacity,
            FnFetcher::new(move |name: String, ctx: RequestContext| {
                let stations = exists_source.clone();
                async move {
                    deadline
                        .run(services::STATION, stations.station_id(&name, &ctx))
                        .await
                        .map(|answer| answer.is_success())
                }
            }),
        );

        let station_ids = Cache::new(
            caches::STATION_IDS,
            capacity,
            FnFetcher::new(move |name: String, ctx: RequestContext| {
                let stations = stations.clone();
                async move { deadline.run(services::STATION, stations.station_id(&name, &ctx)).await }
            }),
        );

        let train_types = Cache::new(
            caches::TRAIN_TYPES,
            capacity,
            FnFetcher::new(move |id: String, ctx: RequestContext| {
                let trains = trains.clone();
                async move {
                    deadline
                        .run(services::TRAIN, trains.train_type(&id, &ctx))
                        .await
                        .map(|answer| answer.data)
                }
            }),
        );

        let routes = Cache::new(
            caches::ROUTES,
            capacity,
            FnFetcher::new(move |id: String, ctx: RequestContext| {
                let routes = routes.clone();
                async move {
                    deadline
                        .run(services::ROUTE, routes.route(&id, &ctx))
                        .await
                        .map(|answer| if answer.is_success() { answer.data } else { None })
                }
            }),
        );

        let prices = Cache::new(
            caches::PRICES,
            capacity,
            FnFetcher::new(move |(route_id, train_type): (String, String), ctx: RequestContext| {
                let prices = prices.clone();
                async move {
                    deadline
                        .run(services::PRICE, prices.price_config(&route_id, &train_type, &ctx))
                        .await
                        .map(|answer| answer.data)
                }
            }),
        );

        Self {
            station_exists,
            station_ids,
            train_types,
            routes,
            prices,
        }
    }

    /// Price a trip segment for both classes.
    ///
    /// The envelope fails with [`STATION_MISSING_MESSAGE`] or
    /// [`TRAIN_TYPE_MISSING_MESSAGE`] (the latter wins when both apply) but
    /// always carries a [`TravelResult`].
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when a downstream service could not be reached.
    pub async fn query_for_travel(
        &self,
        travel: &Travel,
        ctx: &RequestContext,
    ) -> Result<Response<TravelResult>, RemoteError> {
        let id = ctx.correlation_id_or_anonymous();
        let answer = self.price_travel(&id, travel, ctx).await;
        self.release(&id).await;
        answer
    }

    /// Resolve a station name to its id through the station-id cache.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the station service could not be reached.
    pub async fn query_for_station_id(
        &self,
        name: &str,
        ctx: &RequestContext,
    ) -> Result<Response<String>, RemoteError> {
        let id = ctx.correlation_id_or_anonymous();
        let answer = self.station_id(&id, name, ctx).await;
        self.station_ids.forget(&id).await;
        answer
    }

    /// Snapshots of every cache's counters, labelled by cache name
    pub async fn cache_metrics(&self) -> Vec<(&str, CacheMetrics)> {
        vec![
            (self.station_exists.name(), self.station_exists.metrics().await),
            (self.station_ids.name(), self.station_ids.metrics().await),
            (self.train_types.name(), self.train_types.metrics().await),
            (self.routes.name(), self.routes.metrics().await),
            (self.prices.name(), self.prices.metrics().await),
        ]
    }

    /// Correlation ids still remembered across all caches
    pub async fn pending_correlations(&self) -> usize {
        self.station_exists.ledger_len().await
            + self.station_ids.ledger_len().await
            + self.train_types.ledger_len().await
            + self.routes.ledger_len().await
            + self.prices.ledger_len().await
    }

    async fn price_travel(
        &self,
        id: &CorrelationId,
        travel: &Travel,
        ctx: &RequestContext,
    ) -> Result<Response<TravelResult>, RemoteError> {
        let mut message = SUCCESS_MESSAGE;

        let origin_exists = self
            .station_exists
            .get_or_insert(id, &travel.starting_place, ctx)
            .await?;
        let destination_exists = self
            .station_exists
            .get_or_insert(id, &travel.end_place, ctx)
            .await?;
        if !origin_exists || !destination_exists {
            tracing::debug!(
                correlation_id = %id,
                from = %travel.starting_place,
                to = %travel.end_place,
                "Station missing"
            );
            message = STATION_MISSING_MESSAGE;
        }

        let train_type = self
            .train_types
            .get_or_insert(id, &travel.trip.train_type_id, ctx)
            .await?;
        if train_type.is_none() {
            tracing::debug!(
                correlation_id = %id,
                train_type = %travel.trip.train_type_id,
                "Train type missing"
            );
            message = TRAIN_TYPE_MISSING_MESSAGE;
        }

        let route = self
            .routes
            .get_or_insert(id, &travel.trip.route_id, ctx)
            .await?;

        let rate_key = (
            travel.trip.route_id.clone(),
            train_type
                .as_ref()
                .map(|train_type| train_type.id.clone())
                .unwrap_or_default(),
        );
        let rates = self.prices.get_or_insert(id, &rate_key, ctx).await?;

        let origin_id = self.station_id(id, &travel.starting_place, ctx).await?.data;
        let destination_id = self.station_id(id, &travel.end_place, ctx).await?.data;

        let (prices, fault) = prices_or_fallback(
            route.as_ref(),
            rates.as_ref(),
            origin_id.as_deref(),
            destination_id.as_deref(),
        );
        if let Some(fault) = fault {
            tracing::warn!(
                correlation_id = %id,
                trip = %travel.trip.trip_id,
                error = %fault,
                "Pricing fell back to default prices"
            );
        }

        let resolved = message == SUCCESS_MESSAGE;
        let result = TravelResult {
            status: resolved,
            percent: 1.0,
            train_type,
            prices,
        };

        tracing::info!(
            correlation_id = %id,
            trip = %travel.trip.trip_id,
            economy = prices.economy_class,
            comfort = prices.comfort_class,
            resolved,
            "Travel priced"
        );

        Ok(Response {
            status: if resolved { Status::Success } else { Status::Failure },
            message: message.to_string(),
            data: Some(result),
        })
    }

    async fn station_id(
        &self,
        id: &CorrelationId,
        name: &str,
        ctx: &RequestContext,
    ) -> Result<Response<String>, RemoteError> {
        self.station_ids.get_or_insert(id, &name.to_string(), ctx).await
    }

    async fn release(&self, id: &CorrelationId) {
        self.station_exists.forget(id).await;
        self.station_ids.forget(id).await;
        self.train_types.forget(id).await;
        self.routes.forget(id).await;
        self.prices.forget(id).await;
    }
}

impl std::fmt::Debug for BasicService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicService")
            .field("capacity", &self.station_exists.capacity())
            .finish_non_exhaustive()
    }
}
