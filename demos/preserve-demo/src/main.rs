//! Reservation demo.
//!
//! Books one ticket with food and a consignment, then prices the same trip.
//! By default every downstream service is the in-memory railway; set
//! `TS_DEMO_LIVE=1` to talk to the services configured by the `TS_*_URL`
//! variables instead.
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=debug cargo run -p preserve-demo
//! ```
//!
//! The Prometheus scrape output is printed at the end.

#![allow(missing_docs)]

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trainticket_basic::{BasicConfig, BasicEnvironment, BasicService};
use trainticket_core::context::RequestContext;
use trainticket_core::environment::{AtomicIdGenerator, Clock, SystemClock};
use trainticket_core::types::{OrderTicketsInfo, SeatClass};
use trainticket_http::{HttpGateway, ServiceEndpoints};
use trainticket_preserve::{PreserveConfig, PreserveEnvironment, ReservationSaga};
use trainticket_runtime::MetricsServer;
use trainticket_testing::fixtures;

fn environments() -> anyhow::Result<(PreserveEnvironment, BasicEnvironment)> {
    if std::env::var_os("TS_DEMO_LIVE").is_some() {
        let endpoints = ServiceEndpoints::from_env();
        let gateway = Arc::new(HttpGateway::new(&endpoints).context("invalid service endpoint")?);
        tracing::info!("Using live services");
        return Ok((
            PreserveEnvironment::from_provider(gateway.clone()),
            BasicEnvironment::from_provider(gateway),
        ));
    }

    let railway = Arc::new(fixtures::railway());
    tracing::info!("Using the in-memory railway");
    Ok((
        PreserveEnvironment::with_parts(
            railway.clone(),
            Arc::new(SystemClock),
            Arc::new(AtomicIdGenerator::new()),
        ),
        BasicEnvironment::from_provider(railway),
    ))
}

fn request() -> OrderTicketsInfo {
    OrderTicketsInfo {
        food_type: 2,
        food_name: "Noodles".to_string(),
        food_price: 12.0,
        station_name: fixtures::NANJING.to_string(),
        store_name: "Noodle Bar".to_string(),
        consignee_name: "Li Lei".to_string(),
        consignee_phone: "13800000000".to_string(),
        consignee_weight: 8.5,
        handle_date: fixtures::travel_date().to_string(),
        ..fixtures::order_request(SeatClass::SecondClass)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,trainticket_preserve=debug,trainticket_cache=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut metrics = MetricsServer::new(([0, 0, 0, 0], 9000).into());
    metrics.start().context("installing metrics recorder")?;

    let (preserve_env, basic_env) = environments()?;
    let saga = ReservationSaga::new(preserve_env, &PreserveConfig::from_env())
        .context("invalid reservation configuration")?;
    let pricing = BasicService::new(basic_env, &BasicConfig::from_env());

    let ctx = RequestContext::anonymous();

    let reservation = saga.preserve_response(&request(), &ctx).await;
    println!("{}", serde_json::to_string_pretty(&reservation)?);

    let travel = fixtures::travel(SystemClock.now());
    let prices = pricing
        .query_for_travel(&travel, &ctx)
        .await
        .context("pricing query failed")?;
    println!("{}", serde_json::to_string_pretty(&prices)?);

    for (cache, snapshot) in saga.caches().metrics().await {
        tracing::info!(
            cache,
            queries = snapshot.queries,
            hits = snapshot.hits,
            invalidations = snapshot.effective_invalidations(),
            "Cache summary"
        );
    }

    if let Some(scrape) = metrics.render() {
        println!("{scrape}");
    }
    Ok(())
}
