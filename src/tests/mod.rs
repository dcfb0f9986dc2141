use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::{ClientOptions, InventoryClient};
use crate::display::{Dashboard, DisplayContent, SequencingPolicy, Update};

async fn dashboard_for(server: &MockServer, policy: SequencingPolicy) -> Dashboard {
    let client = InventoryClient::new(ClientOptions {
        url: format!("{}/inventory", server.uri()),
        ..ClientOptions::default()
    })
    .unwrap();
    Dashboard::new(client, policy)
}

async fn fetch_once(server: &MockServer) -> DisplayContent {
    let mut dash = dashboard_for(server, SequencingPolicy::LastResolved).await;
    dash.trigger();
    assert!(dash.region().is_loading());
    let updates = dash.settle().await;
    assert_eq!(updates, vec![Update::Shown { generation: 1 }]);
    dash.region().clone()
}

async fn wait_for_requests(server: &MockServer, count: usize) {
    for _ in 0..200 {
        let seen = server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0);
        if seen >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("mock server never saw {count} request(s)");
}

fn message(content: &DisplayContent) -> &str {
    match content {
        DisplayContent::Message(text) => text,
        other => panic!("expected an error message, got {other:?}"),
    }
}

#[tokio::test]
async fn scenario_a_renders_vpc_row_and_empty_subnets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"timestamp":"2024-01-01T00:00:00Z","vpcs":[{"VpcId":"vpc-1","CidrBlock":"10.0.0.0/16","IsDefault":true,"State":"available","Tags":{"Name":"main"}}],"subnets":[]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let markup = match fetch_once(&server).await {
        DisplayContent::Markup(markup) => markup,
        other => panic!("expected markup, got {other:?}"),
    };
    assert!(markup.starts_with("<p>Fetched at: 2024-01-01T00:00:00Z</p>"));
    assert_eq!(markup.matches("<td>").count(), 5);
    assert!(markup.contains(r#"<td>{"Name":"main"}</td>"#));
    assert!(markup.ends_with("<th>MapPublicIpOnLaunch</th></tr></thead><tbody></tbody></table>"));
}

#[tokio::test]
async fn scenario_b_http_500_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let content = fetch_once(&server).await;
    assert_eq!(
        message(&content),
        "Error fetching inventory: HTTP 500: Internal Server Error"
    );
}

/// Answers a single connection with a hand-written status line and no body.
async fn serve_status_line_once(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response =
            format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{addr}/inventory")
}

async fn fetch_once_from(url: String) -> DisplayContent {
    let client = InventoryClient::new(ClientOptions {
        url,
        ..ClientOptions::default()
    })
    .unwrap();
    let mut dash = Dashboard::new(client, SequencingPolicy::LastResolved);
    dash.trigger();
    dash.settle().await;
    dash.region().clone()
}

#[tokio::test]
async fn http_failure_shows_server_reason_phrase() {
    let url = serve_status_line_once("HTTP/1.1 500 Boom").await;
    let content = fetch_once_from(url).await;
    assert_eq!(message(&content), "Error fetching inventory: HTTP 500: Boom");
}

#[tokio::test]
async fn http_failure_with_unregistered_code_and_no_phrase() {
    let url = serve_status_line_once("HTTP/1.1 599 ").await;
    let content = fetch_once_from(url).await;
    assert_eq!(message(&content), "Error fetching inventory: HTTP 599");
}

#[tokio::test]
async fn http_failure_with_unregistered_code_keeps_custom_phrase() {
    let url = serve_status_line_once("HTTP/1.1 599 Custom").await;
    let content = fetch_once_from(url).await;
    assert_eq!(message(&content), "Error fetching inventory: HTTP 599: Custom");
}

#[tokio::test]
async fn scenario_c_non_json_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let content = fetch_once(&server).await;
    let text = message(&content);
    assert!(text.starts_with("Error fetching inventory: Invalid JSON: "));
    assert!(text.contains("line 1 column"));
}

#[tokio::test]
async fn scenario_d_missing_arrays_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"timestamp": "t"})))
        .expect(1)
        .mount(&server)
        .await;

    let content = fetch_once(&server).await;
    assert_eq!(
        message(&content),
        "Error fetching inventory: Response missing expected vpcs or subnets arrays"
    );
}

async fn mount_slow_then_fast(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"timestamp": "first", "vpcs": [{"VpcId": "vpc-first"}], "subnets": []}))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"timestamp": "second", "vpcs": [{"VpcId": "vpc-second"}], "subnets": []}),
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn scenario_e_last_resolved_wins() {
    let server = MockServer::start().await;
    mount_slow_then_fast(&server).await;
    let mut dash = dashboard_for(&server, SequencingPolicy::LastResolved).await;

    let first = dash.trigger();
    wait_for_requests(&server, 1).await;
    let second = dash.trigger();
    assert_eq!(dash.in_flight(), 2);

    let updates = dash.settle().await;
    assert_eq!(
        updates,
        vec![
            Update::Shown { generation: second },
            Update::Shown { generation: first },
        ]
    );
    let html = dash.region().to_html();
    assert!(html.contains("vpc-first"));
    assert!(!html.contains("vpc-second"));
}

#[tokio::test]
async fn latest_request_policy_keeps_newest_trigger() {
    let server = MockServer::start().await;
    mount_slow_then_fast(&server).await;
    let mut dash = dashboard_for(&server, SequencingPolicy::LatestRequest).await;

    let first = dash.trigger();
    wait_for_requests(&server, 1).await;
    let second = dash.trigger();

    let updates = dash.settle().await;
    assert_eq!(
        updates,
        vec![
            Update::Shown { generation: second },
            Update::Stale { generation: first },
        ]
    );
    let html = dash.region().to_html();
    assert!(html.contains("vpc-second"));
    assert!(!html.contains("vpc-first"));
}

#[tokio::test]
async fn each_trigger_issues_exactly_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let mut dash = dashboard_for(&server, SequencingPolicy::LastResolved).await;
    dash.trigger();
    dash.trigger();
    dash.trigger();
    let updates = dash.settle().await;
    assert_eq!(updates.len(), 3);
    assert_eq!(
        message(dash.region()),
        "Error fetching inventory: HTTP 503: Service Unavailable"
    );
}

#[tokio::test]
async fn missing_columns_render_blank_cells_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timestamp": "t",
            "vpcs": [],
            "subnets": [{"SubnetId": "subnet-1", "Extra": "ignored"}]
        })))
        .mount(&server)
        .await;

    let html = fetch_once(&server).await.to_html();
    assert!(html.contains("<tr><td>subnet-1</td><td></td><td></td><td></td><td></td><td></td></tr>"));
    assert!(!html.contains("ignored"));
}
