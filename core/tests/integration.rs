//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `HopTripClient` over
//! real HTTP through `UreqTransport`. Validates request building, auth
//! injection and response classification against an actual server.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::sync::mpsc;

use hoptrip_core::{
    ApiError, AuthorTravelsPage, CallIntent, ClientConfig, Error, HopTripClient, TransportFailure,
    UreqTransport,
};
use mock_server::{CODE_INVALID_CREDENTIALS, CODE_UNAUTHENTICATED, DEMO_EMAIL, DEMO_PASSWORD};
use serde_json::json;

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// Accept one connection, capture the raw request and answer with `reply`.
fn capture_one(reply: &'static str) -> (SocketAddr, mpsc::Receiver<String>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut raw = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            if request_complete(&raw) {
                break;
            }
        }
        stream.write_all(reply.as_bytes()).unwrap();
        tx.send(String::from_utf8_lossy(&raw).into_owned()).unwrap();
    });

    (addr, rx)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(head_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let head = text[..head_end].to_ascii_lowercase();
    let body = &text[head_end + 4..];
    if let Some(len) = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
    {
        return body.len() >= len;
    }
    if head.contains("transfer-encoding: chunked") {
        return body.ends_with("0\r\n\r\n");
    }
    true
}

const NO_CONTENT: &str = "HTTP/1.1 204 No Content\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

fn client() -> HopTripClient<UreqTransport> {
    let addr = start_server();
    HopTripClient::from_config(&ClientConfig::new(format!("http://{addr}")))
}

#[test]
fn travel_lifecycle() {
    let client = client();

    // Step 1: anonymous calls to protected endpoints are structured API errors.
    let err = client.current_user().unwrap_err();
    assert!(
        matches!(&err, Error::Api(ApiError { code, .. }) if *code == CODE_UNAUTHENTICATED),
        "unexpected {err:?}"
    );

    // Step 2: wrong password.
    let err = client.token_by_email(DEMO_EMAIL, "wrong").unwrap_err();
    assert_eq!(
        err,
        Error::Api(ApiError::new("invalid credentials", CODE_INVALID_CREDENTIALS))
    );

    // Step 3: log in and install the token.
    let token = client.token_by_email(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
    assert!(!token.is_empty());
    client.set_auth_token(Some(token));

    let me = client.current_user().unwrap();
    assert_eq!(me["email"], DEMO_EMAIL);
    let author = me["id"].as_i64().unwrap();

    // Step 4: create a travel.
    let id = client
        .create_travel(&json!({"title": "Lisbon", "description": "tiles"}))
        .unwrap();

    let travel = client.travel(id).unwrap();
    assert_eq!(travel["title"], "Lisbon");

    // Step 5: list it through the query-string endpoint.
    let page = AuthorTravelsPage {
        minimized: true,
        limit: 1,
        offset: 0,
    };
    let listed = client.published_by_author(author, page).unwrap();
    assert_eq!(listed, vec![json!({"id": id, "title": "Lisbon"})]);

    // Step 6: update and comment.
    let updated = client.update_travel(id, &json!({"title": "Porto"})).unwrap();
    assert_eq!(updated["title"], "Porto");

    let comment_id = client.add_travel_comment(id, "lovely").unwrap();
    assert!(comment_id > id);
    let comments = client.travel_comments(id, 10, 0).unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "lovely");

    // Step 7: delete returns an empty 204, which resolves to null.
    let deleted = client.delete_travel(id).unwrap();
    assert!(deleted.is_null());

    // Step 8: the travel is gone.
    let err = client.travel(id).unwrap_err();
    assert!(matches!(err, Error::Api(ApiError { .. })), "unexpected {err:?}");

    // Step 9: dropping the token makes calls anonymous again.
    client.set_auth_token(None::<String>);
    assert!(client.current_user().unwrap_err().is_api());
}

#[test]
fn email_in_path_reaches_server_decoded() {
    let client = client();
    let reply = client.confirm_email("user@example.com").unwrap();
    assert_eq!(reply["confirmed"], "user@example.com");
}

#[test]
fn raw_upload_is_sent_verbatim() {
    let client = client();
    let reply = client.upload_image(vec![0x89, b'P', b'N', b'G', 0xff, 0x00]).unwrap();
    assert_eq!(reply["size"], 6);
}

#[test]
fn unstructured_failure_is_transport_status() {
    let client = client();
    let err = client
        .call(hoptrip_core::CallIntent::get("/debug/status/%s").arg(500))
        .unwrap_err();
    match err {
        Error::Transport(failure @ TransportFailure::Status { .. }) => {
            assert_eq!(failure.status(), Some(500));
            assert_eq!(failure.body(), Some("debug status 500"));
        }
        other => panic!("expected transport status failure, got {other:?}"),
    }
}

#[test]
fn unknown_route_is_transport_status() {
    let client = client();
    let err = client.cab_estimates(38.72, -9.14, 38.77, -9.13).unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.is_transport());
}

#[test]
fn refused_connection_is_transport_failure() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = HopTripClient::from_config(&ClientConfig::new(format!("http://{addr}")));

    let err = client.stats().unwrap_err();
    assert!(
        matches!(err, Error::Transport(TransportFailure::Connection(_))),
        "unexpected {err:?}"
    );
}

#[test]
fn json_body_on_delete_reaches_the_wire() {
    let (addr, captured) = capture_one(NO_CONTENT);
    let client = HopTripClient::from_config(&ClientConfig::new(format!("http://{addr}")));

    let reply = client
        .call(CallIntent::delete("/travel/%s").arg(3).json_value(json!({"reason": "dup"})))
        .unwrap();
    assert!(reply.is_null());

    let raw = captured.recv().unwrap();
    assert!(raw.starts_with("DELETE /travel/3 HTTP/1.1"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains("content-type: application/json"), "{raw}");
    assert!(raw.contains(r#"{"reason":"dup"}"#), "json body missing: {raw}");
}

#[test]
fn json_body_on_get_reaches_the_wire() {
    let (addr, captured) = capture_one(NO_CONTENT);
    let client = HopTripClient::from_config(&ClientConfig::new(format!("http://{addr}")));

    client
        .call(CallIntent::get("/travel/search").json_value(json!({"q": "porto"})))
        .unwrap();

    let raw = captured.recv().unwrap();
    assert!(raw.starts_with("GET /travel/search HTTP/1.1"), "{raw}");
    assert!(raw.contains(r#"{"q":"porto"}"#), "json body missing: {raw}");
}

#[test]
fn oversized_body_keeps_response_context() {
    let (addr, _captured) = capture_one(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 13\r\nconnection: close\r\n\r\n[1,2,3,4,5,6]",
    );
    let transport = UreqTransport::default().with_body_limit(4);
    let client = HopTripClient::new(&format!("http://{addr}"), transport);

    let err = client.call(CallIntent::get("/stats")).unwrap_err();
    match err {
        Error::Transport(failure @ TransportFailure::MalformedBody { .. }) => {
            assert_eq!(failure.status(), Some(200));
            assert!(failure
                .headers()
                .iter()
                .any(|(k, v)| k == "content-type" && v == "application/json"));
        }
        other => panic!("expected malformed body, got {other:?}"),
    }
}
