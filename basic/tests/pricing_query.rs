//! Pricing query against the in-memory railway.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;
use trainticket_basic::service::{
    STATION_MISSING_MESSAGE, SUCCESS_MESSAGE, TRAIN_TYPE_MISSING_MESSAGE, caches,
};
use trainticket_basic::{BasicConfig, BasicEnvironment, BasicService, FALLBACK_PRICES};
use trainticket_core::context::RequestContext;
use trainticket_core::correlation::CorrelationId;
use trainticket_core::error::RemoteError;
use trainticket_core::remote::services;
use trainticket_testing::{InMemoryRailway, helpers};
use trainticket_testing::fixtures::{self, NANJING, NANJING_ID, ROUTE_ID};

fn service_over(railway: &InMemoryRailway) -> BasicService {
    helpers::init_tracing();
    BasicService::new(
        BasicEnvironment::from_provider(Arc::new(railway.clone())),
        &BasicConfig::default().with_cache_capacity(8),
    )
}

fn request(id: &str) -> RequestContext {
    RequestContext::for_request(CorrelationId::new(id))
}

#[tokio::test]
async fn prices_follow_distance_and_rates() {
    let railway = fixtures::railway();
    let service = service_over(&railway);

    let answer = service
        .query_for_travel(&fixtures::travel(fixtures::starting_time()), &request("7"))
        .await
        .unwrap();

    assert!(answer.is_success());
    assert_eq!(answer.message, SUCCESS_MESSAGE);
    let result = answer.data.unwrap();
    assert!(result.status);
    assert!((result.percent - 1.0).abs() < f64::EPSILON);
    assert_eq!(result.train_type, Some(fixtures::train_type()));
    assert!((result.prices.economy_class - 25.0).abs() < 1e-9);
    assert!((result.prices.comfort_class - 40.0).abs() < 1e-9);
}

#[tokio::test]
async fn absent_route_uses_fallback_prices() {
    let railway = fixtures::railway();
    railway.remove_route(ROUTE_ID);
    let service = service_over(&railway);

    let answer = service
        .query_for_travel(&fixtures::travel(fixtures::starting_time()), &request("8"))
        .await
        .unwrap();

    assert!(answer.is_success());
    assert_eq!(answer.data.unwrap().prices, FALLBACK_PRICES);
}

#[tokio::test]
async fn unknown_station_fails_envelope_but_still_prices() {
    let railway = fixtures::railway();
    let service = service_over(&railway);
    let mut travel = fixtures::travel(fixtures::starting_time());
    travel.end_place = "Atlantis".to_string();

    let answer = service.query_for_travel(&travel, &request("9")).await.unwrap();

    assert!(!answer.is_success());
    assert_eq!(answer.message, STATION_MISSING_MESSAGE);
    let result = answer.data.unwrap();
    assert!(!result.status);
    assert_eq!(result.prices, FALLBACK_PRICES);
}

#[tokio::test]
async fn missing_train_type_message_takes_precedence() {
    let railway = fixtures::railway();
    let service = service_over(&railway);
    let mut travel = fixtures::travel(fixtures::starting_time());
    travel.trip.train_type_id = "Maglev".to_string();
    travel.starting_place = "Atlantis".to_string();

    let answer = service.query_for_travel(&travel, &request("10")).await.unwrap();

    assert_eq!(answer.message, TRAIN_TYPE_MISSING_MESSAGE);
    let result = answer.data.unwrap();
    assert_eq!(result.train_type, None);
    assert_eq!(result.prices, FALLBACK_PRICES);
}

#[tokio::test]
async fn unreachable_service_is_an_error() {
    let railway = fixtures::railway();
    railway.take_down(services::ROUTE);
    let service = service_over(&railway);

    let error = service
        .query_for_travel(&fixtures::travel(fixtures::starting_time()), &request("11"))
        .await
        .unwrap_err();

    assert!(matches!(error, RemoteError::Unavailable { service: "route", .. }));
    assert_eq!(service.pending_correlations().await, 0);
}

#[tokio::test]
async fn stalled_service_times_out() {
    let railway = fixtures::railway();
    railway.stall(services::STATION);
    helpers::init_tracing();
    let service = BasicService::new(
        BasicEnvironment::from_provider(Arc::new(railway.clone())),
        &BasicConfig::default()
            .with_cache_capacity(8)
            .with_call_timeout(Duration::from_millis(50)),
    );

    let error = service
        .query_for_travel(&fixtures::travel(fixtures::starting_time()), &request("14"))
        .await
        .unwrap_err();

    assert_eq!(
        error,
        RemoteError::Timeout {
            service: services::STATION,
            after: Duration::from_millis(50),
        }
    );
    assert_eq!(service.pending_correlations().await, 0);
    let metrics = service.cache_metrics().await;
    let (_, exists) = metrics
        .iter()
        .find(|(name, _)| *name == caches::STATION_EXISTS)
        .unwrap();
    assert_eq!(exists.fetch_failures, 1);
    assert_eq!(exists.queries, 0);
}

#[tokio::test]
async fn every_lookup_carries_the_correlation_id() {
    let railway = fixtures::railway();
    let service = service_over(&railway);

    service
        .query_for_travel(&fixtures::travel(fixtures::starting_time()), &request("12"))
        .await
        .unwrap();

    let calls = railway.calls();
    // two existence checks, train type, route, rates, two station ids
    assert_eq!(calls.len(), 7);
    assert!(calls.iter().all(|call| call.correlation_id == Some(CorrelationId::new("12"))));
    assert!(calls.iter().all(|call| !call.forced_refetch));
    assert_eq!(railway.calls_to(services::STATION).len(), 4);
}

#[tokio::test]
async fn ledgers_are_released_after_each_query() {
    let railway = fixtures::railway();
    let service = service_over(&railway);

    service
        .query_for_travel(&fixtures::travel(fixtures::starting_time()), &request("13"))
        .await
        .unwrap();
    service
        .query_for_travel(&fixtures::travel(fixtures::starting_time()), &RequestContext::anonymous())
        .await
        .unwrap();

    assert_eq!(service.pending_correlations().await, 0);
}

#[tokio::test]
async fn repeated_queries_hit_the_caches() {
    let railway = fixtures::railway();
    let service = service_over(&railway);
    let travel = fixtures::travel(fixtures::starting_time());

    service.query_for_travel(&travel, &request("14")).await.unwrap();
    service.query_for_travel(&travel, &request("15")).await.unwrap();

    let metrics = service.cache_metrics().await;
    let (_, routes) = metrics.iter().find(|(name, _)| *name == caches::ROUTES).unwrap();
    assert_eq!(routes.queries, 2);
    assert_eq!(routes.cold_misses, 1);
    assert_eq!(routes.hits, 1);

    let (_, station_ids) = metrics
        .iter()
        .find(|(name, _)| *name == caches::STATION_IDS)
        .unwrap();
    assert_eq!(station_ids.queries, 4);
    assert_eq!(station_ids.cold_misses, 2);
}

#[tokio::test]
async fn route_change_is_served_stale_once() {
    let railway = fixtures::railway();
    let service = service_over(&railway);
    let travel = fixtures::travel(fixtures::starting_time());

    service.query_for_travel(&travel, &request("16")).await.unwrap();
    railway.remove_route(ROUTE_ID);

    let stale = service.query_for_travel(&travel, &request("17")).await.unwrap();
    assert!((stale.data.unwrap().prices.economy_class - 25.0).abs() < 1e-9);

    let fresh = service.query_for_travel(&travel, &request("18")).await.unwrap();
    assert_eq!(fresh.data.unwrap().prices, FALLBACK_PRICES);

    let metrics = service.cache_metrics().await;
    let (_, routes) = metrics.iter().find(|(name, _)| *name == caches::ROUTES).unwrap();
    assert_eq!(routes.inconsistencies, 1);
}

#[tokio::test]
async fn station_id_query_resolves_names() {
    let railway = fixtures::railway();
    let service = service_over(&railway);

    let found = service.query_for_station_id(NANJING, &request("19")).await.unwrap();
    assert!(found.is_success());
    assert_eq!(found.data.as_deref(), Some(NANJING_ID));

    let missing = service.query_for_station_id("Atlantis", &request("19")).await.unwrap();
    assert!(!missing.is_success());
    assert_eq!(missing.data, None);

    assert_eq!(service.pending_correlations().await, 0);
    assert_eq!(railway.calls_to(services::STATION).len(), 2);
}
