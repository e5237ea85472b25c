use super::mock::{Script, client, client_on_port};
use libiot_http::network::application::http::{MAX_HEADERS, MAX_RESPONSE_BODY_LEN, Request};
use libiot_http::network::error::{
    Error, STATUS_CONNECTION_FAILED, STATUS_INVALID_RESPONSE, STATUS_TIMED_OUT,
};

const OK_EMPTY: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n";

#[test]
fn test_post_end_to_end() {
    let (mut client, wire) = client(vec![Script::Respond(
        b"HTTP/1.1 200 OK\r\nX-Req-Id: abc\r\n\r\n{\"ok\":true}",
    )]);

    let mut request = Request::new();
    request.add_header("Authorization", "token123");
    request.add_param("id", "42");
    request.set_body(r#"{"x":1}"#).unwrap();

    let response = client.post("/device_1/shadow", &request);

    let wire = wire.borrow();
    let sent = wire.request(0);
    assert_eq!(wire.request_line(0), "POST /device_1/shadow?id=42 HTTP/1.1");
    assert!(sent.contains("\r\nAuthorization: token123\r\n"));
    assert!(sent.contains("\r\nContent-Length: 7\r\n"));
    assert!(sent.contains("\r\nHost: api.example.com\r\n"));
    assert!(sent.ends_with("\r\n\r\n{\"x\":1}"));

    assert!(response.success());
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header_count(), 1);
    assert_eq!(response.header("x-req-id"), Some("abc"));
    assert_eq!(response.text(), Some("{\"ok\":true}"));
    assert_eq!(response.content_length(), None);
    assert!(!response.is_truncated());
    assert_eq!(wire.closed, 1);
}

#[test]
fn test_post_without_body_sends_zero_length() {
    let (mut client, wire) = client(vec![Script::Respond(OK_EMPTY)]);
    let response = client.post("/ping", &Request::new());

    assert!(response.success());
    let sent = wire.borrow().request(0);
    assert!(sent.contains("\r\nContent-Length: 0\r\n"));
    assert!(sent.ends_with("\r\n\r\n"));
}

#[test]
fn test_get_without_request() {
    let (mut client, wire) = client(vec![Script::Respond(
        b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n1.2.3",
    )]);
    let response = client.get("/version", None);

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body(), b"1.2.3");
    assert_eq!(response.content_length(), Some(5));

    let sent = wire.borrow().request(0);
    assert!(sent.starts_with("GET /version HTTP/1.1\r\n"));
    assert!(!sent.contains("Content-Length"));
    assert!(sent.contains("\r\nUser-Agent: libiot-http/"));
}

#[test]
fn test_get_keeps_existing_query() {
    let (mut client, wire) = client(vec![Script::Respond(OK_EMPTY)]);
    let mut request = Request::new();
    request.add_param("id", "42");

    client.get("/items?page=2", Some(&request));
    assert_eq!(wire.borrow().request_line(0), "GET /items?page=2 HTTP/1.1");
}

#[test]
fn test_host_header_carries_non_default_port() {
    let (mut client, wire) = client_on_port(8080, vec![Script::Respond(OK_EMPTY)]);
    client.get("/", None);

    let wire = wire.borrow();
    assert_eq!(wire.connects, ["api.example.com:8080"]);
    assert!(wire.request(0).contains("\r\nHost: api.example.com:8080\r\n"));
}

#[test]
fn test_same_host_redirect() {
    let (mut client, wire) = client(vec![
        Script::Respond(b"HTTP/1.1 302 Found\r\nLocation: /new/path\r\nContent-Length: 0\r\n\r\n"),
        Script::Respond(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok"),
    ]);

    let response = client.get_with("/old", None, false, 1);

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), Some("ok"));

    let wire = wire.borrow();
    assert_eq!(wire.connects, ["api.example.com:80", "api.example.com:80"]);
    assert_eq!(wire.request_line(1), "GET /new/path HTTP/1.1");
    assert!(wire.delays.is_empty());
    assert_eq!(wire.closed, 2);
}

#[test]
fn test_cross_host_redirect() {
    let (mut client, wire) = client(vec![
        Script::Respond(
            b"HTTP/1.1 301 Moved Permanently\r\nLocation: https://other.example/p\r\n\r\n",
        ),
        Script::Respond(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nmoved"),
    ]);

    let response = client.get("/start", None);

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), Some("move"));

    let wire = wire.borrow();
    assert_eq!(wire.connects, ["api.example.com:80", "other.example:443"]);
    assert_eq!(wire.request_line(1), "GET /p HTTP/1.1");
    assert!(wire.request(1).contains("\r\nHost: other.example\r\n"));
    assert_eq!(wire.delays, [100]);
    assert_eq!(client.host(), "api.example.com");
}

#[test]
fn test_redirect_host_comparison_ignores_case() {
    let (mut client, wire) = client(vec![
        Script::Respond(b"HTTP/1.1 307 Temporary Redirect\r\nLocation: http://API.Example.com/b\r\n\r\n"),
        Script::Respond(OK_EMPTY),
    ]);

    let response = client.get("/a", None);

    assert_eq!(response.status_code(), 200);
    assert!(wire.borrow().delays.is_empty());
}

#[test]
fn test_same_host_redirect_keeps_port() {
    let (mut client, wire) = client(vec![
        Script::Respond(
            b"HTTP/1.1 302 Found\r\nLocation: https://api.example.com/secure#top\r\n\r\n",
        ),
        Script::Respond(OK_EMPTY),
    ]);

    let response = client.get("/plain", None);

    assert_eq!(response.status_code(), 200);
    let wire = wire.borrow();
    assert_eq!(wire.connects, ["api.example.com:80", "api.example.com:80"]);
    assert_eq!(wire.request_line(1), "GET /secure HTTP/1.1");
    assert!(wire.delays.is_empty());
}

#[test]
fn test_no_hops_returns_redirect() {
    let (mut client, wire) = client(vec![Script::Respond(
        b"HTTP/1.1 308 Permanent Redirect\r\nLocation: /elsewhere\r\nContent-Length: 0\r\n\r\n",
    )]);

    let response = client.get_with("/here", None, false, 0);

    assert_eq!(response.status_code(), 308);
    assert!(!response.success());
    assert_eq!(response.header("Location"), Some("/elsewhere"));
    assert_eq!(wire.borrow().connects.len(), 1);
}

#[test]
fn test_hop_budget_is_exhausted() {
    let redirect: &[u8] = b"HTTP/1.1 302 Found\r\nLocation: /loop\r\nContent-Length: 0\r\n\r\n";
    let (mut client, wire) = client(vec![
        Script::Respond(redirect),
        Script::Respond(redirect),
        Script::Respond(redirect),
        Script::Respond(redirect),
    ]);

    let response = client.get_with("/loop", None, false, 2);

    assert_eq!(response.status_code(), 302);
    assert_eq!(wire.borrow().connects.len(), 3);
}

#[test]
fn test_redirect_without_location_is_returned() {
    let (mut client, wire) = client(vec![Script::Respond(
        b"HTTP/1.1 302 Found\r\nContent-Length: 0\r\n\r\n",
    )]);

    let response = client.get("/a", None);

    assert_eq!(response.status_code(), 302);
    assert_eq!(wire.borrow().connects.len(), 1);
}

#[test]
fn test_empty_location_is_returned() {
    let (mut client, wire) = client(vec![Script::Respond(
        b"HTTP/1.1 301 Moved\r\nLocation: \r\nContent-Length: 0\r\n\r\n",
    )]);

    let response = client.get("/a", None);

    assert_eq!(response.status_code(), 301);
    assert_eq!(wire.borrow().connects.len(), 1);
}

#[test]
fn test_post_is_not_redirected() {
    let (mut client, wire) = client(vec![
        Script::Respond(b"HTTP/1.1 302 Found\r\nLocation: /other\r\nContent-Length: 0\r\n\r\n"),
        Script::Respond(OK_EMPTY),
    ]);

    let response = client.post("/submit", &Request::new());

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("Location"), Some("/other"));
    assert_eq!(wire.borrow().connects.len(), 1);
}

#[test]
fn test_location_after_header_cap_is_followed() {
    let mut first = String::from("HTTP/1.1 302 Found\r\n");
    for i in 0..MAX_HEADERS + 5 {
        first.push_str(&format!("X-Filler-{i}: {i}\r\n"));
    }
    first.push_str("Location: /after-flood\r\nContent-Length: 0\r\n\r\n");

    let (mut client, wire) = client(vec![
        Script::RespondOwned(first.into_bytes()),
        Script::Respond(OK_EMPTY),
    ]);

    let response = client.get("/flood", None);
    assert_eq!(response.status_code(), 200);
    assert_eq!(wire.borrow().request_line(1), "GET /after-flood HTTP/1.1");
}

#[test]
fn test_header_flood_is_capped() {
    let mut flood = String::from("HTTP/1.1 200 OK\r\n");
    for i in 0..MAX_HEADERS + 5 {
        flood.push_str(&format!("X-Filler-{i}: {i}\r\n"));
    }
    flood.push_str("Content-Length: 2\r\n\r\nhi");

    let (mut client, _wire) = client(vec![Script::RespondOwned(flood.into_bytes())]);
    let response = client.get("/", None);

    assert_eq!(response.header_count(), MAX_HEADERS);
    assert_eq!(response.headers().get(0).unwrap().key.as_str(), "X-Filler-0");
    assert_eq!(
        response.headers().get(MAX_HEADERS - 1).unwrap().value.as_str(),
        (MAX_HEADERS - 1).to_string()
    );
    // Framing headers past the cap still apply.
    assert_eq!(response.content_length(), Some(2));
    assert_eq!(response.text(), Some("hi"));
}

#[test]
fn test_redirect_replays_params_unless_query_present() {
    let (mut client, wire) = client(vec![
        Script::Respond(b"HTTP/1.1 302 Found\r\nLocation: /next\r\n\r\n"),
        Script::Respond(b"HTTP/1.1 302 Found\r\nLocation: /last?token=abc\r\n\r\n"),
        Script::Respond(OK_EMPTY),
    ]);
    let mut request = Request::new();
    request.add_header("Authorization", "token123");
    request.add_param("id", "42");

    let response = client.get("/first", Some(&request));

    assert!(response.success());
    let wire = wire.borrow();
    assert_eq!(wire.request_line(0), "GET /first?id=42 HTTP/1.1");
    assert_eq!(wire.request_line(1), "GET /next?id=42 HTTP/1.1");
    assert_eq!(wire.request_line(2), "GET /last?token=abc HTTP/1.1");
    assert!(wire.request(2).contains("\r\nAuthorization: token123\r\n"));
}

#[test]
fn test_connection_refused() {
    let (mut client, wire) = client(vec![Script::Refuse]);
    let response = client.get("/", None);

    assert_eq!(response.status_code(), STATUS_CONNECTION_FAILED);
    assert!(!response.success());
    assert!(wire.borrow().sent.is_empty());
}

#[test]
fn test_connect_timeout_passes_through() {
    let (mut client, wire) = client(vec![Script::Fail(Error::Timeout)]);
    let response = client.get("/", None);

    assert_eq!(response.status_code(), STATUS_TIMED_OUT);
    assert_eq!(wire.borrow().connects.len(), 1);
    assert!(wire.borrow().sent.is_empty());
}

#[test]
fn test_connect_bad_address_passes_through() {
    let (mut client, _wire) = client(vec![Script::Fail(Error::InvalidAddress)]);
    let response = client.get("/", None);
    assert_eq!(response.status_code(), Error::InvalidAddress.status_code());
}

#[test]
fn test_write_fault_reports_timeout() {
    let (mut client, wire) = client(vec![Script::FailWrites]);

    let mut request = Request::new();
    request.set_body("data").unwrap();
    let response = client.post("/upload", &request);

    assert_eq!(response.status_code(), STATUS_TIMED_OUT);
    assert_eq!(response.header_count(), 0);
    assert_eq!(wire.borrow().closed, 1);
}

#[test]
fn test_silent_server_is_invalid_response() {
    let (mut client, wire) = client(vec![Script::Respond(b"")]);
    let response = client.get("/", None);

    assert_eq!(response.status_code(), STATUS_INVALID_RESPONSE);
    assert_eq!(wire.borrow().closed, 1);
}

#[test]
fn test_garbage_status_line_is_invalid_response() {
    let (mut client, _wire) = client(vec![Script::Respond(b"HELLO THERE\r\n\r\n")]);
    let response = client.get("/", None);
    assert_eq!(response.status_code(), STATUS_INVALID_RESPONSE);
}

#[test]
fn test_server_errors_are_statuses() {
    let (mut client, _wire) = client(vec![Script::Respond(
        b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\n\r\nbusy",
    )]);
    let response = client.get("/", None);

    assert_eq!(response.status_code(), 503);
    assert!(!response.success());
    assert_eq!(response.text(), Some("busy"));
}

#[test]
fn test_overlong_header_line_is_dropped() {
    let mut head = String::from("HTTP/1.1 200 OK\r\nX-Long: ");
    head.push_str(&"v".repeat(500));
    head.push_str("\r\nX-After: yes\r\nContent-Length: 2\r\n\r\nok");

    let (mut client, _wire) = client(vec![Script::RespondOwned(head.into_bytes())]);
    let response = client.get("/", None);

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("X-Long"), None);
    assert_eq!(response.header("X-After"), Some("yes"));
    assert_eq!(response.header_count(), 2);
    assert_eq!(response.text(), Some("ok"));
}

#[test]
fn test_interim_continue_is_skipped() {
    let (mut client, _wire) = client(vec![Script::Respond(
        b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 201 Created\r\nContent-Length: 0\r\n\r\n",
    )]);
    let response = client.post("/items", &Request::new());
    assert_eq!(response.status_code(), 201);
}

#[test]
fn test_chunked_body() {
    let (mut client, _wire) = client(vec![Script::Respond(
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n5;x=y\r\npedia\r\n0\r\nX-Trailer: 1\r\n\r\n",
    )]);
    let response = client.get("/wiki", None);

    assert!(response.is_chunked());
    assert_eq!(response.text(), Some("Wikipedia"));
    assert!(!response.is_truncated());
}

#[test]
fn test_short_body_is_truncated() {
    let (mut client, _wire) = client(vec![Script::Respond(
        b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc",
    )]);
    let response = client.get("/", None);

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.text(), Some("abc"));
    assert!(response.is_truncated());
}

#[test]
fn test_oversized_body_is_truncated() {
    let mut big = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n",
        MAX_RESPONSE_BODY_LEN + 100
    )
    .into_bytes();
    big.extend(std::iter::repeat_n(b'z', MAX_RESPONSE_BODY_LEN + 100));

    let (mut client, _wire) = client(vec![Script::RespondOwned(big)]);
    let response = client.get("/big", None);

    assert!(response.success());
    assert_eq!(response.body().len(), MAX_RESPONSE_BODY_LEN);
    assert!(response.is_truncated());
}

#[test]
fn test_skip_body_streams_on_demand() {
    let (mut client, wire) = client(vec![Script::Respond(
        b"HTTP/1.1 200 OK\r\nContent-Length: 11\r\n\r\nfirmware-v2",
    )]);

    let response = client.get_with("/fw.bin", None, true, 0);
    assert_eq!(response.status_code(), 200);
    assert!(response.body().is_empty());
    assert_eq!(response.content_length(), Some(11));
    assert_eq!(wire.borrow().closed, 0);

    let mut image = Vec::new();
    let mut buf = [0u8; 4];
    loop {
        let n = client.read_body(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        image.extend_from_slice(&buf[..n]);
    }
    client.stop();

    assert_eq!(image, b"firmware-v2");
    assert_eq!(wire.borrow().closed, 1);
}

#[test]
fn test_client_is_reusable() {
    let (mut client, wire) = client(vec![
        Script::Respond(b"HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\na"),
        Script::Respond(b"HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\nb"),
    ]);
    let mut request = Request::new();
    request.add_header("Authorization", "token123");
    request.add_param("seq", "1");

    let first = client.get("/poll", Some(&request));
    request.clear(true);
    request.add_param("seq", "2");
    let second = client.get("/poll", Some(&request));

    assert_eq!(first.text(), Some("a"));
    assert_eq!(second.text(), Some("b"));
    let wire = wire.borrow();
    assert_eq!(wire.request_line(1), "GET /poll?seq=2 HTTP/1.1");
    assert!(wire.request(1).contains("Authorization: token123"));
}
