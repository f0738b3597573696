//! Gateway Integration Tests
//!
//! Real WebSocket sessions against an in-process server: handshake, live
//! pushes triggered over REST, socket-originated chat and presence.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use carpool_common::AppConfig;
use integration_tests::{
    assert_json, assert_status, fixtures::*, GatewayClient, TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite};

/// Skip frames until the status change of `user_id` with the given state
async fn expect_status(client: &mut GatewayClient, user_id: &str, online: bool) -> Value {
    loop {
        let d = client.expect_dispatch("UserStatusChanged").await.unwrap();
        if d["userId"] == user_id && d["isOnline"] == online {
            return d;
        }
    }
}

/// Skip frames until a bare op arrives
async fn expect_op(client: &mut GatewayClient, op: u64) -> Value {
    loop {
        let frame = client.next_frame().await.unwrap();
        if frame["op"] == op {
            return frame;
        }
    }
}

// ============================================================================
// Handshake Tests
// ============================================================================

#[tokio::test]
async fn test_upgrade_without_token_is_rejected() {
    let server = TestServer::start().await.unwrap();

    let url = format!("ws://{}/gateway", server.addr);
    match connect_async(url).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED.as_u16());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("upgrade without a token succeeded"),
    }

    match connect_async(server.gateway_url("garbage")).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED.as_u16());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("upgrade with a bad token succeeded"),
    }
}

#[tokio::test]
async fn test_hello_then_heartbeat_ack() {
    let server = TestServer::start().await.unwrap();
    let user = TestUser::student(&server, "Ayse").await.unwrap();

    let mut client = server.connect_gateway(&user.token).await.unwrap();

    // Hello is always the first frame
    let hello = client.next_frame().await.unwrap();
    assert_eq!(hello["op"], 10);
    assert_eq!(hello["d"]["heartbeatInterval"], 41_250);

    client.send(&json!({ "op": 1 })).await.unwrap();
    let ack = expect_op(&mut client, 11).await;
    assert!(ack.get("d").is_none());

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_missed_heartbeats_time_out() {
    let mut config = AppConfig::for_memory(0);
    config.gateway.heartbeat_interval_ms = 200;
    let server = TestServer::start_with_config(config).await.unwrap();
    let user = TestUser::student(&server, "Ayse").await.unwrap();

    let mut client = server.connect_gateway(&user.token).await.unwrap();
    let hello = client.next_frame().await.unwrap();
    assert_eq!(hello["d"]["heartbeatInterval"], 200);

    let code = client.expect_close().await.unwrap();
    assert_eq!(code, Some(4009));
}

// ============================================================================
// Protocol Error Tests
// ============================================================================

#[tokio::test]
async fn test_invalid_json_closes_with_decode_error() {
    let server = TestServer::start().await.unwrap();
    let user = TestUser::student(&server, "Ayse").await.unwrap();

    let mut client = server.connect_gateway(&user.token).await.unwrap();
    client.next_frame().await.unwrap();

    client.send_text("{not json").await.unwrap();
    assert_eq!(client.expect_close().await.unwrap(), Some(4002));
}

#[tokio::test]
async fn test_server_opcode_from_client_closes() {
    let server = TestServer::start().await.unwrap();
    let user = TestUser::student(&server, "Ayse").await.unwrap();

    let mut client = server.connect_gateway(&user.token).await.unwrap();
    client.next_frame().await.unwrap();

    client.send(&json!({ "op": 10 })).await.unwrap();
    assert_eq!(client.expect_close().await.unwrap(), Some(4001));
}

#[tokio::test]
async fn test_rejected_message_keeps_socket_open() {
    let server = TestServer::start().await.unwrap();
    let alice = TestUser::student(&server, "Ayse").await.unwrap();

    let mut client = server.connect_gateway(&alice.token).await.unwrap();
    client.next_frame().await.unwrap();

    // Unknown receiver is a business rejection, not a protocol error
    client
        .send(&json!({ "op": 2, "d": { "receiverId": "999999", "content": "hello?" } }))
        .await
        .unwrap();

    client.send(&json!({ "op": 1 })).await.unwrap();
    expect_op(&mut client, 11).await;
}

// ============================================================================
// Live Delivery Tests
// ============================================================================

#[tokio::test]
async fn test_rest_message_is_pushed_to_receiver() {
    let server = TestServer::start().await.unwrap();
    let alice = TestUser::student(&server, "Ayse").await.unwrap();
    let bob = TestUser::student(&server, "Can").await.unwrap();

    let mut bob_socket = server.connect_gateway(&bob.token).await.unwrap();
    bob_socket.next_frame().await.unwrap();

    let response = server
        .post_auth(
            "/chat/messages",
            &alice.token,
            &json!({ "receiverId": bob.id, "content": "Leaving at five" }),
        )
        .await
        .unwrap();
    let sent: MessageResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let d = bob_socket.expect_dispatch("ReceiveMessage").await.unwrap();
    assert_eq!(d["id"], sent.id.as_str());
    assert_eq!(d["senderId"], alice.id.as_str());
    assert_eq!(d["content"], "Leaving at five");
    assert_eq!(d["isRead"], false);
}

#[tokio::test]
async fn test_socket_message_and_mark_read() {
    let server = TestServer::start().await.unwrap();
    let alice = TestUser::student(&server, "Ayse").await.unwrap();
    let bob = TestUser::student(&server, "Can").await.unwrap();

    let mut alice_socket = server.connect_gateway(&alice.token).await.unwrap();
    alice_socket.next_frame().await.unwrap();
    let mut bob_socket = server.connect_gateway(&bob.token).await.unwrap();
    bob_socket.next_frame().await.unwrap();

    alice_socket
        .send(&json!({ "op": 2, "d": { "receiverId": bob.id, "content": "  See you at the gate  " } }))
        .await
        .unwrap();

    let d = bob_socket.expect_dispatch("ReceiveMessage").await.unwrap();
    assert_eq!(d["content"], "See you at the gate");
    assert_eq!(d["receiverId"], bob.id.as_str());

    bob_socket
        .send(&json!({ "op": 3, "d": { "userId": alice.id } }))
        .await
        .unwrap();
    // The heartbeat ack orders after the mark-read on the same session
    bob_socket.send(&json!({ "op": 1 })).await.unwrap();
    expect_op(&mut bob_socket, 11).await;

    let response = server
        .get_auth(&format!("/chat/history/{}", alice.id), &bob.token)
        .await
        .unwrap();
    let history: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].is_read);
}

#[tokio::test]
async fn test_reservation_pushes_to_driver() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let passenger = TestUser::student(&server, "Ayse").await.unwrap();
    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 2))
        .await
        .unwrap();

    let mut driver_socket = server.connect_gateway(&driver.token).await.unwrap();
    driver_socket.next_frame().await.unwrap();

    passenger.reserve(&server, &ride.id).await.unwrap();

    let d = driver_socket.expect_dispatch("ReceiveNotification").await.unwrap();
    assert_eq!(d["title"], "New reservation");
    assert_eq!(d["type"], "success");
    assert_eq!(d["rideId"], ride.id.as_str());

    let text = driver_socket
        .expect_dispatch("ReceiveBookingNotification")
        .await
        .unwrap();
    assert!(text.as_str().unwrap().contains("reserved a seat"));
}

#[tokio::test]
async fn test_cancellation_pushes_to_passengers() {
    let server = TestServer::start().await.unwrap();
    let driver = TestUser::driver(&server, "Ali").await.unwrap();
    let passenger = TestUser::student(&server, "Ayse").await.unwrap();
    let ride = driver
        .post_ride(&server, &RideRequest::departing_in(48, 2))
        .await
        .unwrap();
    passenger.reserve(&server, &ride.id).await.unwrap();

    let mut passenger_socket = server.connect_gateway(&passenger.token).await.unwrap();
    passenger_socket.next_frame().await.unwrap();

    let response = server
        .post_auth(
            &format!("/rides/{}/cancel", ride.id),
            &driver.token,
            &json!({ "reason": "Flat tyre" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let d = passenger_socket.expect_dispatch("ReceiveNotification").await.unwrap();
    assert_eq!(d["title"], "Ride cancelled");
    let text = passenger_socket
        .expect_dispatch("ReceiveCancellationNotification")
        .await
        .unwrap();
    assert!(text.as_str().unwrap().contains("Flat tyre"));
}

// ============================================================================
// Presence Tests
// ============================================================================

#[tokio::test]
async fn test_presence_is_broadcast_and_stored() {
    let server = TestServer::start().await.unwrap();
    let alice = TestUser::student(&server, "Ayse").await.unwrap();
    let bob = TestUser::student(&server, "Can").await.unwrap();

    let mut bob_socket = server.connect_gateway(&bob.token).await.unwrap();
    bob_socket.next_frame().await.unwrap();

    let alice_socket = server.connect_gateway(&alice.token).await.unwrap();
    expect_status(&mut bob_socket, &alice.id, true).await;

    let response = server
        .get_auth(&format!("/users/{}", alice.id), &bob.token)
        .await
        .unwrap();
    let profile: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(profile["isOnline"], true);

    alice_socket.close().await.unwrap();
    expect_status(&mut bob_socket, &alice.id, false).await;

    let response = server
        .get_auth(&format!("/users/{}", alice.id), &bob.token)
        .await
        .unwrap();
    let profile: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(profile["isOnline"], false);
    assert!(profile["lastActiveAt"].is_string());
}

#[tokio::test]
async fn test_second_tab_does_not_flap_presence() {
    let server = TestServer::start().await.unwrap();
    let alice = TestUser::student(&server, "Ayse").await.unwrap();
    let bob = TestUser::student(&server, "Can").await.unwrap();

    let mut bob_socket = server.connect_gateway(&bob.token).await.unwrap();
    bob_socket.next_frame().await.unwrap();

    let first_tab = server.connect_gateway(&alice.token).await.unwrap();
    expect_status(&mut bob_socket, &alice.id, true).await;
    let second_tab = server.connect_gateway(&alice.token).await.unwrap();

    // Closing one of two tabs leaves alice online
    first_tab.close().await.unwrap();

    let response = server
        .get_auth(&format!("/users/{}", alice.id), &bob.token)
        .await
        .unwrap();
    let profile: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(profile["isOnline"], true);

    second_tab.close().await.unwrap();
    expect_status(&mut bob_socket, &alice.id, false).await;
}
