//! `reqwest` client for every railway service.

use crate::config::{ConfigError, ServiceEndpoints};
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use trainticket_core::context::RequestContext;
use trainticket_core::envelope::Response;
use trainticket_core::error::RemoteError;
use trainticket_core::remote::{
    AssuranceService, ConsignService, ContactsService, FoodService, NotificationService,
    OrderService, PriceService, RemoteFuture, RouteService, SeatService, SecurityService,
    StationService, TicketInfoService, TrainService, TravelService, UserService, services,
};
use trainticket_core::types::{
    Consign, Contacts, FoodOrder, NotifyInfo, Order, PriceConfig, Route, SeatRequest, Ticket,
    TrainType, Travel, TravelResult, TripAllDetail, TripAllDetailInfo, User,
};

/// Header carrying the correlation id.
pub const CORRELATION_HEADER: &str = "invalidation_id";

/// Header marking a forced refetch issued by an invalidation.
pub const FORCED_REFETCH_HEADER: &str = "invalidation";

type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'a>>;

/// HTTP gateway implementing every remote port.
///
/// Each call carries the request's correlation id, the forced-refetch marker
/// when set, and the caller's credential. Non-2xx statuses, transport errors
/// and undecodable bodies become [`RemoteError`]s; business failures come
/// back as failure envelopes.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    bases: HashMap<&'static str, Url>,
    request_timeout: Duration,
}

impl HttpGateway {
    /// Build a gateway for `endpoints`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] for a base URL that cannot carry a
    /// path, or [`ConfigError::HttpClient`] if the client cannot be built.
    pub fn new(endpoints: &ServiceEndpoints) -> Result<Self, ConfigError> {
        let mut bases = HashMap::new();
        for (service, raw) in endpoints.entries() {
            let url = Url::parse(raw)
                .ok()
                .filter(|url| !url.cannot_be_a_base())
                .ok_or_else(|| ConfigError::InvalidUrl {
                    service,
                    url: raw.to_string(),
                })?;
            bases.insert(service, url);
        }

        let request_timeout = endpoints.request_timeout();
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            bases,
            request_timeout,
        })
    }

    /// Full URL for `service` with `segments` appended to its base path.
    ///
    /// Each segment is percent-encoded, so station names with spaces are safe.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Unavailable`] if `service` has no base URL.
    pub fn url(&self, service: &'static str, segments: &[&str]) -> Result<Url, RemoteError> {
        let unavailable = || RemoteError::Unavailable {
            service,
            message: "no base URL configured".to_string(),
        };
        let mut url = self.bases.get(service).cloned().ok_or_else(unavailable)?;
        url.path_segments_mut()
            .map_err(|()| unavailable())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get<'a, T>(&'a self, service: &'static str, segments: &[&str], ctx: &RequestContext) -> HttpFuture<'a, T>
    where
        T: DeserializeOwned + Send + 'a,
    {
        match self.url(service, segments) {
            Ok(url) => {
                tracing::debug!(service, %url, "GET");
                self.send(service, with_context_headers(self.client.get(url), ctx))
            },
            Err(error) => Box::pin(std::future::ready(Err(error))),
        }
    }

    fn post<'a, B, T>(
        &'a self,
        service: &'static str,
        segments: &[&str],
        body: &B,
        ctx: &RequestContext,
    ) -> HttpFuture<'a, T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Send + 'a,
    {
        match self.url(service, segments) {
            Ok(url) => {
                tracing::debug!(service, %url, "POST");
                self.send(service, with_context_headers(self.client.post(url).json(body), ctx))
            },
            Err(error) => Box::pin(std::future::ready(Err(error))),
        }
    }

    fn send<'a, T>(&'a self, service: &'static str, request: RequestBuilder) -> HttpFuture<'a, T>
    where
        T: DeserializeOwned + Send + 'a,
    {
        Box::pin(async move {
            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Timeout {
                        service,
                        after: self.request_timeout,
                    }
                } else {
                    RemoteError::Unavailable {
                        service,
                        message: e.to_string(),
                    }
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                tracing::warn!(service, status = status.as_u16(), "Non-success HTTP status");
                return Err(RemoteError::Status {
                    service,
                    code: status.as_u16(),
                });
            }

            response.json::<T>().await.map_err(|e| RemoteError::Decode {
                service,
                message: e.to_string(),
            })
        })
    }
}

/// Attach the correlation id, forced-refetch marker and credential of `ctx`.
#[must_use]
pub fn with_context_headers(mut request: RequestBuilder, ctx: &RequestContext) -> RequestBuilder {
    if let Some(id) = ctx.correlation_id() {
        request = request.header(CORRELATION_HEADER, id.as_str());
    }
    if ctx.is_forced_refetch() {
        request = request.header(FORCED_REFETCH_HEADER, "true");
    }
    if let Some(token) = ctx.authorization() {
        request = request.header(reqwest::header::AUTHORIZATION, token);
    }
    request
}

/// The notification service answers a bare boolean instead of an envelope.
fn notification_envelope(sent: bool) -> Response<()> {
    if sent {
        Response::success_empty("Notification sent")
    } else {
        Response::failure("Notification not sent")
    }
}

impl StationService for HttpGateway {
    fn station_id<'a>(&'a self, name: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, String> {
        self.get(
            services::STATION,
            &["api", "v1", "stationservice", "stations", "id", name],
            ctx,
        )
    }
}

impl TrainService for HttpGateway {
    fn train_type<'a>(&'a self, id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, TrainType> {
        self.get(services::TRAIN, &["api", "v1", "trainservice", "trains", id], ctx)
    }
}

impl RouteService for HttpGateway {
    fn route<'a>(&'a self, id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, Route> {
        self.get(services::ROUTE, &["api", "v1", "routeservice", "routes", id], ctx)
    }
}

impl PriceService for HttpGateway {
    fn price_config<'a>(
        &'a self,
        route_id: &'a str,
        train_type: &'a str,
        ctx: &'a RequestContext,
    ) -> RemoteFuture<'a, PriceConfig> {
        self.get(
            services::PRICE,
            &["api", "v1", "priceservice", "prices", route_id, train_type],
            ctx,
        )
    }
}

impl SecurityService for HttpGateway {
    fn check<'a>(&'a self, account_id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            // The payload is an arbitrary object; only status and message matter.
            let response: Response<serde::de::IgnoredAny> = self
                .get(
                    services::SECURITY,
                    &["api", "v1", "securityservice", "securityConfigs", account_id],
                    ctx,
                )
                .await?;
            Ok(response.map(|_| ()))
        })
    }
}

impl ContactsService for HttpGateway {
    fn contacts<'a>(&'a self, id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, Contacts> {
        self.get(
            services::CONTACTS,
            &["api", "v1", "contactservice", "contacts", id],
            ctx,
        )
    }
}

impl TravelService for HttpGateway {
    fn trip_detail<'a>(
        &'a self,
        query: &'a TripAllDetailInfo,
        ctx: &'a RequestContext,
    ) -> RemoteFuture<'a, TripAllDetail> {
        self.post(
            services::TRAVEL,
            &["api", "v1", "travelservice", "trip_detail"],
            query,
            ctx,
        )
    }
}

impl TicketInfoService for HttpGateway {
    fn ticket_info<'a>(&'a self, query: &'a Travel, ctx: &'a RequestContext) -> RemoteFuture<'a, TravelResult> {
        self.post(
            services::TICKET_INFO,
            &["api", "v1", "ticketinfoservice", "ticketinfo"],
            query,
            ctx,
        )
    }
}

impl SeatService for HttpGateway {
    fn dispatch<'a>(&'a self, request: &'a SeatRequest, ctx: &'a RequestContext) -> RemoteFuture<'a, Ticket> {
        self.post(services::SEAT, &["api", "v1", "seatservice", "seats"], request, ctx)
    }
}

impl OrderService for HttpGateway {
    fn create<'a>(&'a self, order: &'a Order, ctx: &'a RequestContext) -> RemoteFuture<'a, Order> {
        self.post(services::ORDER, &["api", "v1", "orderservice", "order"], order, ctx)
    }
}

impl AssuranceService for HttpGateway {
    fn add<'a>(
        &'a self,
        assurance_type: i32,
        order_id: &'a str,
        ctx: &'a RequestContext,
    ) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let assurance_type = assurance_type.to_string();
            let response: Response<serde::de::IgnoredAny> = self
                .get(
                    services::ASSURANCE,
                    &["api", "v1", "assuranceservice", "assurances", &assurance_type, order_id],
                    ctx,
                )
                .await?;
            Ok(response.map(|_| ()))
        })
    }
}

impl FoodService for HttpGateway {
    fn create<'a>(&'a self, order: &'a FoodOrder, ctx: &'a RequestContext) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let response: Response<serde::de::IgnoredAny> = self
                .post(services::FOOD, &["api", "v1", "foodservice", "orders"], order, ctx)
                .await?;
            Ok(response.map(|_| ()))
        })
    }
}

impl ConsignService for HttpGateway {
    fn create<'a>(&'a self, consign: &'a Consign, ctx: &'a RequestContext) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let response: Response<serde::de::IgnoredAny> = self
                .post(
                    services::CONSIGN,
                    &["api", "v1", "consignservice", "consigns"],
                    consign,
                    ctx,
                )
                .await?;
            Ok(response.map(|_| ()))
        })
    }
}

impl UserService for HttpGateway {
    fn account<'a>(&'a self, account_id: &'a str, ctx: &'a RequestContext) -> RemoteFuture<'a, User> {
        self.get(
            services::USER,
            &["api", "v1", "userservice", "users", "id", account_id],
            ctx,
        )
    }
}

impl NotificationService for HttpGateway {
    fn preserve_success<'a>(&'a self, info: &'a NotifyInfo, ctx: &'a RequestContext) -> RemoteFuture<'a, ()> {
        Box::pin(async move {
            let sent: bool = self
                .post(
                    services::NOTIFICATION,
                    &["api", "v1", "notifyservice", "notification", "preserve_success"],
                    info,
                    ctx,
                )
                .await?;
            Ok(notification_envelope(sent))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use trainticket_core::correlation::CorrelationId;

    fn gateway() -> HttpGateway {
        HttpGateway::new(&ServiceEndpoints::uniform("http://railway.test/base/")).unwrap()
    }

    #[test]
    fn url_segments_are_percent_encoded() {
        let url = gateway()
            .url(services::STATION, &["api", "v1", "stationservice", "stations", "id", "Shang Hai"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://railway.test/base/api/v1/stationservice/stations/id/Shang%20Hai"
        );
    }

    #[test]
    fn rejects_base_url_without_path_support() {
        let mut endpoints = ServiceEndpoints::uniform("http://railway.test");
        endpoints.seat = "mailto:seats@railway.test".to_string();

        let error = HttpGateway::new(&endpoints).unwrap_err();
        assert_eq!(
            error,
            ConfigError::InvalidUrl {
                service: services::SEAT,
                url: "mailto:seats@railway.test".to_string(),
            }
        );
    }

    #[test]
    fn context_headers_carry_correlation_and_marker() {
        let ctx = RequestContext::for_request(CorrelationId::new("17"))
            .with_authorization("Bearer token")
            .forced_refetch();
        let request = with_context_headers(Client::new().get("http://railway.test/"), &ctx)
            .build()
            .unwrap();

        let headers = request.headers();
        assert_eq!(headers.get(CORRELATION_HEADER).unwrap(), "17");
        assert_eq!(headers.get(FORCED_REFETCH_HEADER).unwrap(), "true");
        assert_eq!(headers.get(reqwest::header::AUTHORIZATION).unwrap(), "Bearer token");
    }

    #[test]
    fn plain_context_has_no_marker() {
        let ctx = RequestContext::for_request(CorrelationId::new("17"));
        let request = with_context_headers(Client::new().get("http://railway.test/"), &ctx)
            .build()
            .unwrap();
        assert!(request.headers().get(FORCED_REFETCH_HEADER).is_none());
    }

    #[test]
    fn notification_boolean_maps_to_envelope() {
        assert!(notification_envelope(true).is_success());
        assert!(!notification_envelope(false).is_success());
    }
}
