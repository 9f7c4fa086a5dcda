//! End-to-end tests of the listener against a mock Hyperion node.

use hyperion_streamer_connector::{
    config::{Backoff, ChannelConfig, ConnectorConfig, Hyperion},
    Filter, Storage, Streamer,
};
use hyperion_streamer_listener::{
    config::{ListenerConfig, ListenerSpecificConfig, StorageBackend},
    consumer::consume,
    run_listener,
    storage::FileStorage,
};
use mockito::{Matcher, Server};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

const GET_ACTIONS: &str = "/v2/history/get_actions";

fn range_after(lower_bound: u64) -> Matcher {
    Matcher::UrlEncoded(
        "global_sequence".into(),
        format!("{}-9223372036854775807", lower_bound + 1),
    )
}

fn connector_config(url: &str) -> ConnectorConfig {
    ConnectorConfig {
        hyperion: Hyperion {
            endpoint: url.to_string(),
            page_limit: 1000,
            request_timeout_secs: Some(5),
        },
        backoff: Backoff {
            sleep_base_ms: 1_000,
            rate_limit_wait_ms: 1_000,
        },
        channels: ChannelConfig::default(),
    }
}

fn listener_config(url: &str, state_path: &std::path::Path, filter: &str) -> ListenerConfig {
    ListenerConfig {
        connector: connector_config(url),
        listener: ListenerSpecificConfig {
            state_path: state_path.to_string_lossy().into_owned(),
            storage: StorageBackend::File,
            filter: filter.to_string(),
            ..ListenerSpecificConfig::default()
        },
    }
}

#[tokio::test]
async fn consume_prints_actions_and_stores_head_until_failure() {
    //* Given
    let mut server = Server::new_async().await;
    let _first = server
        .mock("GET", GET_ACTIONS)
        .match_query(Matcher::AllOf(vec![
            range_after(0),
            Matcher::UrlEncoded("account".into(), "eosio".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"actions": [
                {"block_num": 10, "global_sequence": "100", "act": {"name":"buyrambytes"}},
                {"block_num": 10, "global_sequence": 105, "act": {"name":"sellram"}}
            ]}"#,
        )
        .create_async()
        .await;
    let _broken = server
        .mock("GET", GET_ACTIONS)
        .match_query(range_after(105))
        .with_status(500)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join(".state"));
    let shutdown = CancellationToken::new();
    let streamer = Streamer::new(Arc::new(connector_config(&server.url()))).unwrap();
    let stream = streamer.start(0, vec![Filter::new("account", "eosio")], &shutdown);
    let mut out = Vec::new();

    //* When
    let err = consume(stream, &storage, &mut out, 500, &shutdown)
        .await
        .unwrap_err();

    //* Then
    assert_eq!(err.to_string(), "loader stopped: http error: status=500");
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "{\"name\":\"buyrambytes\"}\n{\"name\":\"sellram\"}\n"
    );
    assert_eq!(storage.get_last_global_sequence().await.unwrap(), Some(105));
}

#[tokio::test]
async fn run_listener_resumes_from_state_file() {
    let mut server = Server::new_async().await;
    let resumed = server
        .mock("GET", GET_ACTIONS)
        .match_query(range_after(104))
        .with_status(200)
        .with_body(r#"{"actions": [{"block_num": 11, "global_sequence": "110", "act": {}}]}"#)
        .expect(1)
        .create_async()
        .await;
    let _broken = server
        .mock("GET", GET_ACTIONS)
        .match_query(range_after(110))
        .with_status(502)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join(".state");
    FileStorage::new(&state_path)
        .set_last_global_sequence(104)
        .await
        .unwrap();

    let err = run_listener(
        listener_config(&server.url(), &state_path, "account=eosio"),
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("status=502"));
    resumed.assert_async().await;
    assert_eq!(
        FileStorage::new(&state_path)
            .get_last_global_sequence()
            .await
            .unwrap(),
        Some(110)
    );
}

#[tokio::test]
async fn run_listener_stops_cleanly_on_shutdown() {
    let mut server = Server::new_async().await;
    let caught_up = server
        .mock("GET", GET_ACTIONS)
        .match_query(range_after(0))
        .with_status(200)
        .with_body(r#"{"actions": []}"#)
        .expect_at_least(1)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join(".state");
    let shutdown = CancellationToken::new();

    let listener = tokio::spawn(run_listener(
        listener_config(&server.url(), &state_path, "account=eosio"),
        shutdown.clone(),
    ));
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), listener)
        .await
        .expect("listener did not stop")
        .unwrap();
    assert!(result.is_ok());
    caught_up.assert_async().await;
    assert!(!state_path.exists());
}

#[tokio::test]
async fn run_listener_requires_a_filter() {
    let dir = tempfile::tempdir().unwrap();

    let err = run_listener(
        listener_config("http://127.0.0.1:1", &dir.path().join(".state"), ""),
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert_eq!(format!("{err:#}"), "get filter: at least one filter is required");
}

#[tokio::test]
async fn run_listener_rejects_short_sleep_base() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = listener_config("http://127.0.0.1:1", &dir.path().join(".state"), "account=eosio");
    config.connector.backoff.sleep_base_ms = 10;

    let err = run_listener(config, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("sleep-time-base must be at least"));
}
