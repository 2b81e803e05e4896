use std::sync::{Arc, Mutex};

use onp_portal::client::admin::{AdminError, AdminScreen};
use onp_portal::client::pharmacies::ProximityQuery;
use onp_portal::client::retry::RetryPolicy;
use onp_portal::client::session::Session;
use onp_portal::client::{ClientConfig, FetchOutcome, ResourceClient, ResourceData};
use onp_portal::domain::auth::{ADMIN_ROLE, AuthenticatedUser};
use onp_portal::domain::types::Coordinates;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

type Requests = Arc<Mutex<Vec<String>>>;

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        409 => "Conflict",
        503 => "Service Unavailable",
        _ => "Internal Server Error",
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            let body_len = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Answers each connection with the next scripted response, then 500s.
async fn scripted_server(responses: Vec<(u16, Value)>) -> (String, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("addr");
    let requests: Requests = Arc::default();

    let seen = Arc::clone(&requests);
    tokio::spawn(async move {
        let mut script = responses.into_iter();
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(v) => v,
                Err(_) => break,
            };
            let request = read_request(&mut stream).await;
            seen.lock().unwrap().push(request);

            let (status, body) = script.next().unwrap_or((500, Value::Null));
            let body = if body.is_null() {
                String::new()
            } else {
                body.to_string()
            };
            let response = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                reason(status),
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}/api"), requests)
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_backoff_ms: 1,
        max_backoff_ms: 5,
    }
}

fn client(api_url: &str) -> ResourceClient {
    ResourceClient::new(ClientConfig::new(api_url).with_retry(fast_retry())).unwrap()
}

fn request_lines(requests: &Requests) -> Vec<String> {
    requests
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.lines().next().unwrap_or_default().to_string())
        .collect()
}

fn admin_session() -> Session {
    Session::new(
        "tok",
        AuthenticatedUser {
            sub: "1".to_string(),
            name: "Admin".to_string(),
            email: "admin@onp.sn".to_string(),
            roles: vec![ADMIN_ROLE.to_string()],
            exp: u64::MAX,
        },
    )
}

async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

#[tokio::test]
async fn unsuccessful_envelope_yields_null_for_singletons() {
    let (url, requests) =
        scripted_server(vec![(200, json!({"success": false, "message": "inconnu"}))]).await;

    let data = client(&url).fetch_resource_data("unknown-collection").await;
    assert_eq!(data, ResourceData::Null);
    assert_eq!(
        request_lines(&requests),
        vec!["GET /api/public/unknown-collection HTTP/1.1"]
    );
}

#[tokio::test]
async fn singleton_takes_first_and_videos_stay_lists() {
    let (url, _) = scripted_server(vec![
        (
            200,
            json!({"success": true, "data": [{"title": "Premier"}, {"title": "Second"}]}),
        ),
        (
            200,
            json!({"success": true, "data": {"title": "Seule", "videoUrl": "https://v/1"}}),
        ),
    ])
    .await;
    let client = client(&url);

    match client.fetch_resource_data("actualites").await {
        ResourceData::Document(doc) => assert_eq!(doc.title(), Some("Premier")),
        other => panic!("expected a document, got {other:?}"),
    }
    match client.fetch_resource_data("videos").await {
        ResourceData::Documents(docs) => assert_eq!(docs.len(), 1),
        other => panic!("expected a list, got {other:?}"),
    }
}

#[tokio::test]
async fn failures_degrade_by_cardinality() {
    let url = unreachable_url().await;
    let client = client(&url);

    assert_eq!(
        client.fetch_resource_data("videos").await,
        ResourceData::Documents(Vec::new())
    );
    assert_eq!(client.fetch_resource_data("lois").await, ResourceData::Null);
    assert!(client.fetch_resource_by_id("lois", "abc").await.is_none());
}

#[tokio::test]
async fn server_errors_are_retried_then_reported_unavailable() {
    let (url, requests) = scripted_server(Vec::new()).await;

    let outcome = client(&url).fetch_collection("photos").await;
    assert_eq!(outcome, FetchOutcome::Unavailable);
    assert_eq!(requests.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn transient_failure_then_success() {
    let (url, requests) = scripted_server(vec![
        (503, Value::Null),
        (200, json!({"success": true, "data": [{"title": "Photo"}]})),
    ])
    .await;

    match client(&url).fetch_collection("photos").await {
        FetchOutcome::Loaded(docs) => assert_eq!(docs.len(), 1),
        FetchOutcome::Unavailable => panic!("retry should have succeeded"),
    }
    assert_eq!(requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (url, requests) = scripted_server(vec![
        (404, json!({"success": false, "message": "Document not found"})),
        (200, json!({"success": false})),
    ])
    .await;
    let client = client(&url);

    assert!(client.fetch_resource_by_id("lois", "missing").await.is_none());
    assert_eq!(
        client.fetch_collection("lois").await,
        FetchOutcome::Loaded(Vec::new())
    );
    assert_eq!(requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_delete_waits_for_the_refetch() {
    let row = |title: &str, id: &str| json!({"_id": id, "title": title, "version": 1});
    let (url, requests) = scripted_server(vec![
        (
            200,
            json!({"success": true, "data": [row("Loi 1", "a"), row("Loi 2", "b")]}),
        ),
        (200, json!({"success": true, "message": "Document deleted"})),
        (500, Value::Null),
        (500, Value::Null),
        (500, Value::Null),
        (200, json!({"success": true, "data": [row("Loi 2", "b")]})),
    ])
    .await;

    let mut screen = AdminScreen::new(client(&url), admin_session(), "lois");
    screen.refresh().await.unwrap();
    assert_eq!(screen.rows().len(), 2);
    assert!(!screen.is_stale());

    screen.delete("a").await.unwrap();
    // The reload failed, so the deleted row is still shown.
    assert_eq!(screen.rows().len(), 2);
    assert!(screen.is_stale());

    screen.refresh().await.unwrap();
    assert_eq!(screen.rows().len(), 1);
    assert_eq!(screen.rows()[0].id.as_deref(), Some("b"));

    let lines = request_lines(&requests);
    assert_eq!(lines[1], "DELETE /api/admin/lois/a HTTP/1.1");
    assert!(
        requests.lock().unwrap()[1]
            .to_ascii_lowercase()
            .contains("authorization: bearer tok")
    );
}

#[tokio::test]
async fn admin_conflict_is_typed_and_rows_untouched() {
    let (url, requests) = scripted_server(vec![
        (200, json!({"success": true, "data": [{"_id": "a", "title": "Loi"}]})),
        (
            409,
            json!({"success": false, "message": "Version conflict: document is at version 3, not 1"}),
        ),
    ])
    .await;

    let mut screen = AdminScreen::new(client(&url), admin_session(), "lois");
    screen.refresh().await.unwrap();

    let result = screen
        .update("a", &json!({"title": "Loi modifiée", "version": 1}))
        .await;
    assert!(matches!(result, Err(AdminError::Conflict(message)) if message.contains("version 3")));
    assert_eq!(screen.rows()[0].title(), Some("Loi"));
    assert_eq!(requests.lock().unwrap().len(), 2);
    assert!(requests.lock().unwrap()[1].contains("\"version\":1"));
}

#[tokio::test]
async fn admin_write_without_server_is_a_transport_error() {
    let url = unreachable_url().await;
    let mut screen = AdminScreen::new(client(&url), admin_session(), "lois");

    let result = screen.create(&json!({"title": "Nouvelle loi"})).await;
    assert!(matches!(result, Err(AdminError::Transport(_))));
    assert!(screen.rows().is_empty());
}

#[tokio::test]
async fn pharmacy_finder_sends_only_set_filters() {
    let (url, requests) = scripted_server(vec![(
        200,
        json!({"success": true, "data": [
            {"name": "Pharmacie Guigon", "distance": 2890.0},
            {"name": "Pharmacie Mame Diarra", "distance": 19050.0}
        ]}),
    )])
    .await;

    let query = ProximityQuery::new()
        .ville("Dakar")
        .near(Coordinates::new(14.7, -17.45).unwrap());
    match client(&url).fetch_pharmacies(&query).await {
        FetchOutcome::Loaded(docs) => assert_eq!(docs.len(), 2),
        FetchOutcome::Unavailable => panic!("finder should have answered"),
    }

    assert_eq!(
        request_lines(&requests),
        vec!["GET /api/public/pharmacies?ville=Dakar&latitude=14.7&longitude=-17.45 HTTP/1.1"]
    );
}
