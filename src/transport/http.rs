//! HTTP surface of the hub.
//!
//! Two endpoints drive the browser client: `GET /api/sse-connect` upgrades
//! to a long-lived `text/event-stream` response, and
//! `POST /api/sse-broadcast` submits a chat message. Identity is correlated
//! across the two with an `sse_client` cookie set on connect.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use futures_util::Stream;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::config::Settings;
use crate::hub::BroadcastHub;
use crate::transport::encoder;
use crate::utils::error::HubError;

/// Cookie correlating submit requests with an SSE connection.
const CLIENT_COOKIE: &str = "sse_client";

#[derive(Clone)]
struct AppState {
    hub: Arc<BroadcastHub>,
    keep_alive: Duration,
}

#[derive(Debug, Deserialize)]
struct ConnectParams {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    message: String,
}

/// Builds the application router. Split from [`serve`] so handler tests can
/// drive it without binding a socket.
pub fn app(hub: Arc<BroadcastHub>, settings: &Settings) -> Router {
    let state = AppState {
        hub,
        keep_alive: Duration::from_secs(settings.hub.keep_alive_secs),
    };

    // The browser client lives on another origin and sends credentials, so
    // the origin must be listed explicitly; wildcards are rejected by the
    // browser when credentials are included.
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);
    if let Ok(origin) = settings.server.cors_origin.parse::<HeaderValue>() {
        cors = cors.allow_origin(origin);
    }

    Router::new()
        .route("/health", get(health))
        .route("/api/sse-connect", get(sse_connect))
        .route("/api/sse-broadcast", post(sse_broadcast))
        .layer(cors)
        .with_state(state)
}

/// Binds and serves until ctrl-c, then drops every session so connected
/// clients observe their stream ending.
pub async fn serve(
    addr: SocketAddr,
    hub: Arc<BroadcastHub>,
    settings: &Settings,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);

    let router = app(hub.clone(), settings);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(hub))
        .await
}

async fn shutdown_signal(hub: Arc<BroadcastHub>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
    hub.shutdown();
}

async fn health() -> &'static str {
    "ok"
}

/// `GET /api/sse-connect?name=<display name>`
///
/// Registers the client and answers with a `text/event-stream` body that
/// first carries the private `init` event, then every broadcast. The
/// assigned client id is also handed back as the `sse_client` cookie for
/// the submit endpoint.
async fn sse_connect(
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
) -> Result<Response, HubError> {
    let (client_id, receiver) = state.hub.subscribe(&params.name)?;
    debug!(client = %client_id, "stream opened");

    let stream = SessionStream::new(
        state.hub.clone(),
        client_id.clone(),
        receiver,
        state.keep_alive,
    );

    let mut response = Response::new(Body::from_stream(stream));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    let cookie = format!("{CLIENT_COOKIE}={client_id}; Path=/; HttpOnly; SameSite=Lax");
    if let Ok(value) = cookie.parse() {
        headers.insert(SET_COOKIE, value);
    }
    Ok(response)
}

/// `POST /api/sse-broadcast` with JSON body `{"message": "..."}`.
///
/// The sender is resolved from the `sse_client` cookie; a request without a
/// resolvable identity is indistinguishable from a stale client and gets
/// the same 404.
async fn sse_broadcast(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SubmitRequest>,
) -> Result<StatusCode, HubError> {
    let client_id = client_id_from_cookies(&headers)
        .ok_or_else(|| HubError::NotFound("no client credential".to_string()))?;
    state.hub.submit(&client_id, &request.message)?;
    Ok(StatusCode::ACCEPTED)
}

/// Extracts the stream credential set by [`sse_connect`].
fn client_id_from_cookies(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(CLIENT_COOKIE)?
            .strip_prefix('=')
            .map(str::to_string)
    })
}

/// Adapts a session's outbound queue into an HTTP body.
///
/// Yields each encoded frame as one body chunk, interleaving SSE comment
/// frames while idle so half-dead transports eventually fail the write and
/// get reaped. Dropping the stream (hyper does so when the client goes
/// away or the server shuts down) unsubscribes the session; idempotence
/// in the hub makes the double-invocation case safe.
struct SessionStream {
    hub: Arc<BroadcastHub>,
    client_id: String,
    receiver: mpsc::Receiver<Bytes>,
    keep_alive: Interval,
}

impl SessionStream {
    fn new(
        hub: Arc<BroadcastHub>,
        client_id: String,
        receiver: mpsc::Receiver<Bytes>,
        period: Duration,
    ) -> Self {
        let mut keep_alive = interval(period);
        keep_alive.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the immediate first tick; the init frame is already queued.
        keep_alive.reset();
        Self {
            hub,
            client_id,
            receiver,
            keep_alive,
        }
    }
}

impl Stream for SessionStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.receiver.poll_recv(cx) {
            Poll::Ready(Some(frame)) => {
                this.keep_alive.reset();
                Poll::Ready(Some(Ok(frame)))
            }
            // The hub dropped the sender: the session is gone, end the body.
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => match this.keep_alive.poll_tick(cx) {
                Poll::Ready(_) => Poll::Ready(Some(Ok(encoder::keep_alive_frame()))),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

impl Drop for SessionStream {
    fn drop(&mut self) {
        self.hub.unsubscribe(&self.client_id);
    }
}
