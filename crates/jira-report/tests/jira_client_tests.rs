//! Jira client tests against a local scripted HTTP responder.

use jira_report::source::{IssueSource, JiraClient, JiraSettings, SourceError};
use jira_report::traversal::{traverse, TraversalOptions};
use serde_json::json;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Serves one scripted response per connection, then stops.
///
/// Returns the base URL and a handle yielding the raw request heads received.
fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            requests.push(read_head(&mut stream));

            let response = format!(
                "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
        requests
    });

    (url, handle)
}

fn read_head(stream: &mut impl Read) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&head).into_owned()
}

fn client(url: &str, page_size: usize) -> JiraClient {
    let mut settings = JiraSettings::new(url, "me", "secret");
    settings.page_size = page_size;
    settings.timeout = Duration::from_secs(5);
    JiraClient::new(&settings)
}

fn issue(key: &str, summary: &str, status: &str, points: Option<f64>) -> serde_json::Value {
    json!({
        "key": key,
        "fields": {
            "summary": summary,
            "status": { "name": status },
            "customfield_10003": points,
            "issuelinks": []
        }
    })
}

fn page(total: usize, issues: Vec<serde_json::Value>) -> (u16, String) {
    let body = json!({ "startAt": 0, "maxResults": 50, "total": total, "issues": issues });
    (200, body.to_string())
}

#[test]
fn test_single_page_search() {
    let (url, server) = serve(vec![page(
        1,
        vec![issue("ECO-1", "Fix bug", "Open", Some(2.0))],
    )]);

    let records = client(&url, 50).search(r#"key="ECO-1""#).unwrap();
    let requests = server.join().unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "ECO-1");
    assert_eq!(records[0].summary, "Fix bug");
    assert_eq!(records[0].status, "Open");
    assert_eq!(records[0].estimate, Some(2.0));

    let head = &requests[0];
    assert!(head.starts_with("GET /rest/api/2/search?"));
    assert!(head.contains("startAt=0"));
    assert!(head.contains("maxResults=50"));
    assert!(head.contains("customfield_10003"));
    assert!(head
        .to_lowercase()
        .contains("authorization: basic bwu6c2vjcmv0"));
}

#[test]
fn test_trailing_slash_in_url() {
    let (url, server) = serve(vec![page(0, vec![])]);

    let records = client(&format!("{}/", url), 50).search("project = ECO").unwrap();
    let requests = server.join().unwrap();

    assert!(records.is_empty());
    assert!(requests[0].starts_with("GET /rest/api/2/search?"));
}

#[test]
fn test_pages_are_followed_until_total() {
    let (url, server) = serve(vec![
        page(3, vec![issue("ECO-1", "One", "Open", None), issue("ECO-2", "Two", "Open", None)]),
        page(3, vec![issue("ECO-3", "Three", "Open", Some(1.0))]),
    ]);

    let records = client(&url, 2).search("project = ECO").unwrap();
    let requests = server.join().unwrap();

    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["ECO-1", "ECO-2", "ECO-3"]);
    assert_eq!(requests.len(), 2);
    assert!(requests[0].contains("startAt=0"));
    assert!(requests[1].contains("startAt=2"));
    assert!(requests[1].contains("maxResults=2"));
}

#[test]
fn test_unauthorized() {
    let (url, server) = serve(vec![(401, String::new())]);

    let err = client(&url, 50).search("project = ECO").unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, SourceError::Unauthorized { status: 401 }));
}

#[test]
fn test_forbidden_is_unauthorized() {
    let (url, server) = serve(vec![(403, "{}".to_string())]);

    let err = client(&url, 50).search("project = ECO").unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, SourceError::Unauthorized { status: 403 }));
}

#[test]
fn test_bad_query_carries_jira_messages() {
    let body = json!({
        "errorMessages": ["Field 'sprnt' does not exist or you do not have permission to view it."],
        "errors": {}
    });
    let (url, server) = serve(vec![(400, body.to_string())]);

    let err = client(&url, 50).search("sprnt = 5").unwrap_err();
    server.join().unwrap();

    match err {
        SourceError::InvalidQuery { query, message } => {
            assert_eq!(query, "sprnt = 5");
            assert!(message.contains("Field 'sprnt' does not exist"));
        }
        other => panic!("expected InvalidQuery, got {:?}", other),
    }
}

#[test]
fn test_server_error_is_unexpected_status() {
    let (url, server) = serve(vec![(500, "oops".to_string())]);

    let err = client(&url, 50).search("project = ECO").unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, SourceError::UnexpectedStatus { status: 500, .. }));
}

#[test]
fn test_non_json_body_is_decode_error() {
    let (url, server) = serve(vec![(200, "<html>login</html>".to_string())]);

    let err = client(&url, 50).search("project = ECO").unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, SourceError::Decode(_)));
}

#[test]
fn test_connection_refused_is_http_error() {
    let url = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let err = client(&url, 50).search("project = ECO").unwrap_err();
    assert!(matches!(err, SourceError::Http(_)));
}

#[test]
fn test_traversal_over_http() {
    let first = json!({
        "total": 1,
        "issues": [{
            "key": "ECO-1",
            "fields": {
                "summary": "Build",
                "status": { "name": "Open" },
                "customfield_10003": 3,
                "issuelinks": [{
                    "type": { "name": "Blocks" },
                    "outwardIssue": {
                        "key": "ECO-2",
                        "fields": { "summary": "Ship", "status": { "name": "Open" } }
                    }
                }]
            }
        }]
    });
    let (url, server) = serve(vec![
        (200, first.to_string()),
        page(1, vec![issue("ECO-2", "Ship", "Open", Some(8.0))]),
    ]);

    let options = TraversalOptions {
        max_depth: 2,
        ..TraversalOptions::default()
    };
    let graph = traverse(&client(&url, 50), "project = ECO", &options).unwrap();
    let requests = server.join().unwrap();

    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(requests.len(), 2);
    // key="ECO-2", percent-encoded
    assert!(requests[1].contains("ECO-2"));
}
