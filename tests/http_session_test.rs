//! HTTP session tests against a mock analytics server.

#![allow(clippy::expect_used, clippy::panic)]

use gw_search::cli::commands::run_search;
use gw_search::config::ClientConfig;
use gw_search::core::{CHART_RENDERERS, ResultSet, SEARCH_RENDERERS, SearchEntry, TimeWindow};
use gw_search::error::{Error, SearchError, SessionError};
use gw_search::search::{SearchOrchestrator, SearchRequest, WaitOptions};
use gw_search::session::{HttpSession, SearchHandle, SearchState, SessionService};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-jwt";

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        server: server.uri(),
        poll_interval: Duration::from_millis(10),
        ..ClientConfig::default()
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({"User": "admin", "Pass": "changeme"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "LoginStatus": true,
            "JWT": TOKEN,
        })))
        .mount(server)
        .await;
}

async fn mount_search(server: &MockServer, renderer: &str) {
    Mock::given(method("POST"))
        .and(path("/api/parse"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "RenderModule": renderer,
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/searchctrl/launch"))
        .and(body_partial_json(json!({"SearchString": "tag=syslog", "Background": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"SearchID": "777"})))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/searchctrl/777/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn logged_in(server: &MockServer) -> HttpSession {
    mount_login(server).await;
    let mut session = HttpSession::new(&config_for(server)).expect("session");
    session.login("admin", "changeme").await.expect("login");
    session
}

fn request(accepted: &'static [gw_search::core::RendererKind], count: u64) -> SearchRequest<'static> {
    SearchRequest {
        query: "tag=syslog",
        window: TimeWindow::parse("-1h").expect("window"),
        accepted,
        count,
        wait: WaitOptions::with_deadline(Duration::from_secs(5)),
        background: false,
    }
}

#[tokio::test]
async fn test_login_stores_token() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    assert!(session.is_logged_in());
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "LoginStatus": false,
            "Reason": "invalid username or password",
        })))
        .mount(&server)
        .await;

    let mut session = HttpSession::new(&config_for(&server)).expect("session");
    let err = session.login("admin", "wrong").await.expect_err("login accepted");
    assert!(matches!(err, SessionError::Login { ref reason } if reason == "invalid username or password"));
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn test_login_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut session = HttpSession::new(&config_for(&server)).expect("session");
    let err = session.login("admin", "changeme").await.expect_err("login accepted");
    assert!(matches!(err, SessionError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_sync_and_logout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/info/whoami"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"UID": 1, "User": "admin"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = logged_in(&server).await;
    session.sync().await.expect("sync");
    session.logout().await.expect("logout");
    assert!(!session.is_logged_in());
}

#[tokio::test]
async fn test_text_search_decodes_entries() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    mount_search(&server, "text").await;
    mount_status(&server, json!({"State": "completed", "Error": null})).await;
    Mock::given(method("GET"))
        .and(path("/api/searchctrl/777/text"))
        .and(query_param("first", "0"))
        .and(query_param("last", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Entries": [{"Data": "aGVsbG8gd29ybGQ="}, {"Data": "c2Vjb25k"}],
        })))
        .mount(&server)
        .await;

    let results = run_search(&session, &request(SEARCH_RENDERERS, 2), std::future::pending())
        .await
        .expect("search");
    assert_eq!(
        results,
        ResultSet::Entries {
            entries: vec![
                SearchEntry::new(b"hello world".to_vec()),
                SearchEntry::new(b"second".to_vec()),
            ],
        }
    );
}

#[tokio::test]
async fn test_wait_polls_until_completed() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/searchctrl/777/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"State": "running"})))
        .up_to_n_times(3)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_status(&server, json!({"State": "completed"})).await;

    let handle = SearchHandle::new("777");
    session.wait_for_search(&handle).await.expect("wait");

    let status = session.search_status(&handle).await.expect("status");
    assert_eq!(status.state, SearchState::Completed);
}

#[tokio::test]
async fn test_wait_keeps_polling_unknown_states() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/searchctrl/777/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"State": "paused"})))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    mount_status(&server, json!({"State": "error", "Error": null})).await;

    let err = session
        .wait_for_search(&SearchHandle::new("777"))
        .await
        .expect_err("error state succeeded");
    assert!(matches!(
        err,
        SessionError::JobFailed { ref reason, .. } if reason == "search ended in error state"
    ));
}

#[tokio::test]
async fn test_error_state_fails_search() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    mount_search(&server, "table").await;
    mount_status(&server, json!({"State": "error", "Error": "syntax error near |"})).await;

    let err = run_search(&session, &request(SEARCH_RENDERERS, 10), std::future::pending())
        .await
        .expect_err("errored search succeeded");
    match err {
        Error::Search(SearchError::SearchFailed { id, reason }) => {
            assert_eq!(id, "777");
            assert_eq!(reason, "syntax error near |");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_status_rejection_is_a_session_error() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    mount_search(&server, "text").await;
    Mock::given(method("GET"))
        .and(path("/api/searchctrl/777/status"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let err = run_search(&session, &request(SEARCH_RENDERERS, 10), std::future::pending())
        .await
        .expect_err("rejected status poll succeeded");
    match err {
        Error::Session(SessionError::Status { status, message }) => {
            assert_eq!(status, 401);
            assert!(message.contains("token expired"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_status_server_error_is_not_search_failed() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/searchctrl/9/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    let err = SearchOrchestrator::new(&session)
        .await_completion(&SearchHandle::new("9"), WaitOptions::unbounded())
        .await
        .expect_err("failed status poll succeeded");
    assert!(!matches!(err, Error::Search(SearchError::SearchFailed { .. })));
    assert!(matches!(err, Error::Session(SessionError::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_table_search() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    mount_search(&server, "table").await;
    mount_status(&server, json!({"State": "completed"})).await;
    Mock::given(method("GET"))
        .and(path("/api/searchctrl/777/table"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Entries": {
                "Columns": ["src", "count"],
                "Rows": [{"Row": ["10.0.0.1", "4"]}, {"Row": ["10.0.0.2", "1"]}],
            },
        })))
        .mount(&server)
        .await;

    let results = run_search(&session, &request(SEARCH_RENDERERS, 10), std::future::pending())
        .await
        .expect("search");
    let ResultSet::Table(table) = results else {
        panic!("expected table results");
    };
    assert_eq!(table.columns, vec!["src", "count"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1], vec!["10.0.0.2", "1"]);
}

#[tokio::test]
async fn test_chart_search_requests_one_bucket() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    mount_search(&server, "chart").await;
    mount_status(&server, json!({"State": "completed"})).await;
    Mock::given(method("GET"))
        .and(path("/api/searchctrl/777/chart"))
        .and(query_param("first", "0"))
        .and(query_param("last", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Entries": {
                "Names": ["GET", "POST"],
                "Values": [{"Name": "count", "Data": [10.0, 2.0]}],
            },
        })))
        .mount(&server)
        .await;

    let results = run_search(&session, &request(CHART_RENDERERS, 1), std::future::pending())
        .await
        .expect("search");
    let ResultSet::Chart(chart) = results else {
        panic!("expected chart results");
    };
    assert_eq!(chart.names, vec!["GET", "POST"]);
    assert_eq!(chart.values[0].data, vec![10.0, 2.0]);
}

#[tokio::test]
async fn test_launch_failure_is_submission_error() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"RenderModule": "text"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/searchctrl/launch"))
        .respond_with(ResponseTemplate::new(500).set_body_string("search limit reached"))
        .mount(&server)
        .await;

    let err = run_search(&session, &request(SEARCH_RENDERERS, 10), std::future::pending())
        .await
        .expect_err("launch succeeded");
    assert!(matches!(err, Error::Search(SearchError::Submission(_))));
    assert!(err.to_string().contains("search limit reached"));
}

#[tokio::test]
async fn test_backup_streams_to_sink() {
    let server = MockServer::start().await;
    let session = logged_in(&server).await;
    let archive: Vec<u8> = (0..=255).cycle().take(64 * 1024).collect();
    Mock::given(method("GET"))
        .and(path("/api/backup"))
        .and(query_param("omit_cache", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive.clone()))
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join("gravwell.bak");
    let mut file = tokio::fs::File::create(&path).await.expect("create");

    let written = session.backup(&mut file, true).await.expect("backup");
    drop(file);

    assert_eq!(written, archive.len() as u64);
    assert_eq!(std::fs::read(&path).expect("read back"), archive);
}

#[tokio::test]
async fn test_calls_require_login() {
    let server = MockServer::start().await;
    let session = HttpSession::new(&config_for(&server)).expect("session");
    let err = session.parse_query("tag=x").await.expect_err("parsed without login");
    assert!(matches!(err, SessionError::NotLoggedIn));
}

mod cli_tests {
    use super::*;
    use gw_search::cli::commands::execute;
    use gw_search::cli::parser::{Cli, Commands};
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Helper to create a CLI struct pointed at the mock server.
    fn make_cli(server: &MockServer, command: Commands) -> Cli {
        Cli {
            server: server.uri(),
            username: "admin".to_string(),
            password: "changeme".to_string(),
            https: false,
            insecure: false,
            poll_interval_ms: 10,
            verbose: false,
            command,
        }
    }

    async fn mount_session(server: &MockServer) {
        mount_login(server).await;
        Mock::given(method("GET"))
            .and(path("/api/info/whoami"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"UID": 1})))
            .mount(server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/logout"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_cmd_search_table_to_file() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        mount_search(&server, "table").await;
        mount_status(&server, json!({"State": "completed"})).await;
        Mock::given(method("GET"))
            .and(path("/api/searchctrl/777/table"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Entries": {
                    "Columns": ["host", "msg"],
                    "Rows": [{"Row": ["web1", "said \"hi\""]}],
                },
            })))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().expect("temp dir");
        let output = temp_dir.path().join("out.csv");
        let cli = make_cli(
            &server,
            Commands::Search {
                query: "tag=syslog".to_string(),
                duration: "-15m".to_string(),
                count: 10,
                output: Some(output.clone()),
                timeout: Some(5),
            },
        );

        execute(&cli).await.expect("search command");
        assert_eq!(
            std::fs::read_to_string(&output).expect("read output"),
            "host,msg\nweb1,\"said \"\"hi\"\"\"\n"
        );
    }

    #[tokio::test]
    async fn test_cmd_chart_to_file() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        mount_search(&server, "chart").await;
        mount_status(&server, json!({"State": "completed"})).await;
        Mock::given(method("GET"))
            .and(path("/api/searchctrl/777/chart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Entries": {
                    "Names": ["a", "b", "c"],
                    "Values": [{"Name": "count", "Data": [1.0, 2.0, 3.0]}],
                },
            })))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().expect("temp dir");
        let output = temp_dir.path().join("chart.gp");
        let cli = make_cli(
            &server,
            Commands::Chart {
                query: "tag=syslog".to_string(),
                duration: "-1h".to_string(),
                title: "Letters".to_string(),
                output: Some(output.clone()),
                timeout: None,
            },
        );

        execute(&cli).await.expect("chart command");
        let script = std::fs::read_to_string(&output).expect("read output");
        assert!(script.contains("set title \"Letters\"\n"));
        assert!(script.contains("0 a 1\n1 b 2\n2 c 3\n"));
        assert!(script.ends_with("plot $data using 1:3:xtic(2) with boxes\n"));
    }

    #[tokio::test]
    async fn test_cmd_search_rejects_chart_renderer() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/parse"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"RenderModule": "chart"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/searchctrl/launch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"SearchID": "1"})))
            .expect(0)
            .mount(&server)
            .await;

        let cli = make_cli(
            &server,
            Commands::Search {
                query: "tag=syslog".to_string(),
                duration: "-1h".to_string(),
                count: 10,
                output: None,
                timeout: None,
            },
        );

        let err = execute(&cli).await.expect_err("chart accepted by search");
        assert!(err.to_string().contains("\"chart\" isn't supported"));
    }

    #[tokio::test]
    async fn test_cmd_backup() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/backup"))
            .and(query_param("omit_cache", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"BACKUP".to_vec()))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().expect("temp dir");
        let output: PathBuf = temp_dir.path().join("gravwell.bak");
        let cli = make_cli(
            &server,
            Commands::Backup {
                output: output.clone(),
                include_cache: true,
            },
        );

        execute(&cli).await.expect("backup command");
        assert_eq!(std::fs::read(&output).expect("read backup"), b"BACKUP");
    }
}
