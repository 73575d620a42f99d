//! End-to-end exercise of the HTTP surface: two browsers connect, one
//! posts a message using the cookie it was handed, then leaves.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use ssecast::config::Settings;
use ssecast::hub::BroadcastHub;
use ssecast::hub::payload::{InitPayload, Payload};
use ssecast::transport::encoder;
use ssecast::transport::http::app;

async fn next_frame(body: &mut Body) -> Bytes {
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await
        .expect("timed out waiting for a frame")
        .expect("stream ended early")
        .expect("body error");
    frame.into_data().expect("expected a data frame")
}

async fn connect(router: &axum::Router, name: &str) -> (String, String, Body) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/sse-connect?name={name}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("connect must set the client cookie")
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let mut body = response.into_body();
    let frame = next_frame(&mut body).await;
    let (event, init): (String, InitPayload) = encoder::decode(&frame).unwrap();
    assert_eq!(event, "init");

    (init.client_id, cookie, body)
}

#[tokio::test]
async fn chat_session_end_to_end() {
    let hub = Arc::new(BroadcastHub::new(64));
    let router = app(hub.clone(), &Settings::default());

    // Alice joins and sees her own connected event.
    let (alice_id, alice_cookie, mut alice_body) = connect(&router, "Alice").await;
    let frame = next_frame(&mut alice_body).await;
    let (event, payload): (String, Payload) = encoder::decode(&frame).unwrap();
    assert_eq!(event, "connected");
    assert_eq!(payload.client_id, alice_id);

    // Bob joins; Alice is notified, Bob only sees his own join.
    let (bob_id, _bob_cookie, mut bob_body) = connect(&router, "Bob").await;
    let frame = next_frame(&mut alice_body).await;
    let (_, payload): (String, Payload) = encoder::decode(&frame).unwrap();
    assert_eq!(payload.client_id, bob_id);

    let frame = next_frame(&mut bob_body).await;
    let (event, payload): (String, Payload) = encoder::decode(&frame).unwrap();
    assert_eq!(event, "connected");
    assert_eq!(payload.client_id, bob_id);

    // Alice posts a message with her cookie; both streams carry it.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/sse-broadcast")
                .method("POST")
                .header(CONTENT_TYPE, "application/json")
                .header(COOKIE, &alice_cookie)
                .body(Body::from(r#"{"message":"hello everyone"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    for body in [&mut alice_body, &mut bob_body] {
        let frame = next_frame(body).await;
        let (event, payload): (String, Payload) = encoder::decode(&frame).unwrap();
        assert_eq!(event, "message");
        assert_eq!(payload.client_id, alice_id);
        assert_eq!(payload.user_name, "Alice");
        assert_eq!(payload.message.as_deref(), Some("hello everyone"));
    }

    // Alice's tab closes: her stream drops, Bob hears about it, and her
    // cookie stops working.
    drop(alice_body);
    let frame = next_frame(&mut bob_body).await;
    let (event, payload): (String, Payload) = encoder::decode(&frame).unwrap();
    assert_eq!(event, "disconnected");
    assert_eq!(payload.client_id, alice_id);
    assert_eq!(hub.client_count(), 1);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/sse-broadcast")
                .method("POST")
                .header(CONTENT_TYPE, "application/json")
                .header(COOKIE, &alice_cookie)
                .body(Body::from(r#"{"message":"late"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
