//! End-to-end tests against a one-shot HTTP responder on localhost.

#![allow(clippy::unwrap_used)]

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use trainticket_core::context::RequestContext;
use trainticket_core::correlation::CorrelationId;
use trainticket_core::environment::Clock;
use trainticket_core::error::RemoteError;
use trainticket_core::remote::{StationService, TicketInfoService, services};
use trainticket_http::{HttpGateway, ServiceEndpoints};
use trainticket_testing::{fixtures, test_clock};

/// Accept one connection, answer with `status` and `body`, and hand back the
/// raw request head.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buffer = [0u8; 1024];
        while !received.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = socket.read(&mut buffer).await.unwrap();
            if read == 0 {
                break;
            }
            received.extend_from_slice(&buffer[..read]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        String::from_utf8_lossy(&received).into_owned()
    });

    (base, handle)
}

#[tokio::test]
async fn station_lookup_sends_correlation_headers() {
    let (base, server) = serve_once("200 OK", r#"{"status":1,"msg":"Success","data":"suzhou"}"#).await;
    let gateway = HttpGateway::new(&ServiceEndpoints::uniform(&base)).unwrap();
    let ctx = RequestContext::for_request(CorrelationId::new("31")).forced_refetch();

    let answer = gateway.station_id("Su Zhou", &ctx).await.unwrap();
    let request = server.await.unwrap();

    assert!(answer.is_success());
    assert_eq!(answer.data.as_deref(), Some("suzhou"));
    assert!(request.starts_with("GET /api/v1/stationservice/stations/id/Su%20Zhou HTTP/1.1"));
    assert!(request.contains("invalidation_id: 31"));
    assert!(request.contains("invalidation: true"));
}

#[tokio::test]
async fn failure_envelope_is_not_a_transport_error() {
    let (base, server) = serve_once("200 OK", r#"{"status":0,"msg":"Station not exist","data":null}"#).await;
    let gateway = HttpGateway::new(&ServiceEndpoints::uniform(&base)).unwrap();

    let answer = gateway
        .station_id("Atlantis", &RequestContext::anonymous())
        .await
        .unwrap();
    let request = server.await.unwrap();

    assert!(!answer.is_success());
    assert_eq!(answer.message, "Station not exist");
    assert!(!request.contains("invalidation_id"));
}

#[tokio::test]
async fn server_error_status_becomes_remote_error() {
    let (base, server) = serve_once("503 Service Unavailable", "{}").await;
    let gateway = HttpGateway::new(&ServiceEndpoints::uniform(&base)).unwrap();

    let error = gateway
        .station_id("Su Zhou", &RequestContext::anonymous())
        .await
        .unwrap_err();
    server.await.unwrap();

    assert_eq!(
        error,
        RemoteError::Status {
            service: services::STATION,
            code: 503,
        }
    );
}

#[tokio::test]
async fn garbage_body_becomes_decode_error() {
    let (base, server) = serve_once("200 OK", "not json").await;
    let gateway = HttpGateway::new(&ServiceEndpoints::uniform(&base)).unwrap();

    let error = gateway
        .station_id("Su Zhou", &RequestContext::anonymous())
        .await
        .unwrap_err();
    server.await.unwrap();

    assert!(matches!(error, RemoteError::Decode { service: "station", .. }));
}

#[tokio::test]
async fn ticket_info_reads_prices_sent_as_strings() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"status":1,"msg":"Success","data":{"status":true,"percent":1.0,"trainType":null,"prices":{"economyClass":"25.0","confortClass":"40.0"}}}"#,
    )
    .await;
    let gateway = HttpGateway::new(&ServiceEndpoints::uniform(&base)).unwrap();

    let answer = gateway
        .ticket_info(&fixtures::travel(test_clock().now()), &RequestContext::anonymous())
        .await
        .unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("POST /api/v1/ticketinfoservice/ticketinfo HTTP/1.1"));
    let prices = answer.data.unwrap().prices;
    assert!((prices.economy_class - fixtures::ECONOMY_PRICE).abs() < f64::EPSILON);
    assert!((prices.comfort_class - fixtures::COMFORT_PRICE).abs() < f64::EPSILON);
}
