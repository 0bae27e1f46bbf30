// Keepalive sweeps against a mocked host.

use chrono::{DateTime, TimeZone, Utc};
use mockito::Server;
use pxlkeep::api::HostClient;
use pxlkeep::config::Config;
use pxlkeep::store::StateStore;
use pxlkeep::sweeper::{Outcome, SweepReport, Sweeper};
use pxlkeep::ui;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

fn config(base: &str, state_file: PathBuf) -> Config {
    Config {
        upload_url: format!("{base}/api/file"),
        view_url: format!("{base}/api/file"),
        visit_interval_days: 120,
        state_file,
        api_key: "key".into(),
        request_timeout: Duration::from_secs(5),
    }
}

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn outcome_of<'a>(report: &'a SweepReport, id: &str) -> &'a Outcome {
    match report {
        SweepReport::Swept { entries, .. } => {
            &entries
                .iter()
                .find(|e| e.id == id)
                .unwrap_or_else(|| panic!("no entry for {id}"))
                .outcome
        }
        other => panic!("unexpected report {other:?}"),
    }
}

#[test]
fn stale_entry_from_old_store_is_visited() {
    let mut server = Server::new();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("state.json");
    fs::write(&path, r#"{"abc123": "2023-01-01T00:00:00"}"#).unwrap();

    let mock = server
        .mock("GET", "/api/file/abc123/info")
        .match_header("authorization", "Basic OmtleQ==")
        .with_status(200)
        .with_body(r#"{"id": "abc123"}"#)
        .create();

    let cfg = config(&server.url(), path.clone());
    let client = HostClient::from_config(&cfg).unwrap();
    let store = StateStore::new(&path);
    let report = Sweeper::new(&client, &store, 120)
        .sweep_at(day(2023, 6, 1))
        .unwrap();

    mock.assert();
    assert_eq!(outcome_of(&report, "abc123"), &Outcome::Visited);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "{\n  \"abc123\": \"2023-06-01T00:00:00Z\"\n}\n"
    );
}

#[test]
fn visited_entry_moves_to_now() {
    let mut server = Server::new();
    let tmp = tempfile::tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("state.json"));
    store.update("abc123", day(2020, 1, 1)).unwrap();

    server
        .mock("GET", "/api/file/abc123/info")
        .with_status(200)
        .create();

    let client = HostClient::from_config(&config(&server.url(), store.path().into())).unwrap();
    let started = Utc::now();
    let report = Sweeper::new(&client, &store, 120).sweep().unwrap();

    assert!(matches!(report, SweepReport::Swept { saved: true, .. }));
    let stored = store.load().unwrap().unwrap()["abc123"].instant().unwrap();
    assert!((stored - started).num_seconds().abs() <= 5, "stored {stored}");
}

#[test]
fn failures_are_isolated_per_entry() {
    let mut server = Server::new();
    let tmp = tempfile::tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("state.json"));
    store.update("alive", day(2023, 1, 1)).unwrap();
    store.update("gone", day(2023, 1, 2)).unwrap();
    store.update("fresh", day(2023, 5, 20)).unwrap();

    let gone = server
        .mock("GET", "/api/file/gone/info")
        .with_status(404)
        .create();
    let alive = server
        .mock("GET", "/api/file/alive/info")
        .with_status(200)
        .create();
    let fresh = server
        .mock("GET", "/api/file/fresh/info")
        .with_status(200)
        .expect(0)
        .create();

    let client = HostClient::from_config(&config(&server.url(), store.path().into())).unwrap();
    let now = day(2023, 6, 1);
    let report = Sweeper::new(&client, &store, 120).sweep_at(now).unwrap();

    gone.assert();
    alive.assert();
    fresh.assert();

    assert_eq!(outcome_of(&report, "alive"), &Outcome::Visited);
    assert!(matches!(
        outcome_of(&report, "gone"),
        Outcome::Failed { reason } if reason.contains("404")
    ));
    assert_eq!(
        outcome_of(&report, "fresh"),
        &Outcome::Skipped {
            last_visit: day(2023, 5, 20)
        }
    );

    let entries = store.load().unwrap().unwrap();
    assert_eq!(entries["alive"], now);
    assert_eq!(entries["gone"], day(2023, 1, 2));
    assert_eq!(entries["fresh"], day(2023, 5, 20));
}

#[test]
fn nothing_written_when_every_visit_fails() {
    let mut server = Server::new();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("state.json");
    fs::write(&path, r#"{"abc123": "Sun, 01 Jan 2023 00:00:00 GMT"}"#).unwrap();

    server
        .mock("GET", "/api/file/abc123/info")
        .with_status(500)
        .create();

    let client = HostClient::from_config(&config(&server.url(), path.clone())).unwrap();
    let store = StateStore::new(&path);
    let report = Sweeper::new(&client, &store, 120)
        .sweep_at(day(2023, 6, 1))
        .unwrap();

    assert!(matches!(report, SweepReport::Swept { saved: false, .. }));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        r#"{"abc123": "Sun, 01 Jan 2023 00:00:00 GMT"}"#
    );
}

#[test]
fn unreachable_host_is_a_per_entry_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("state.json"));
    store.update("abc123", day(2023, 1, 1)).unwrap();

    // Port 9 (discard) is not expected to accept connections.
    let client =
        HostClient::from_config(&config("http://127.0.0.1:9", store.path().into())).unwrap();
    let report = Sweeper::new(&client, &store, 120)
        .sweep_at(day(2023, 6, 1))
        .unwrap();

    assert!(matches!(
        outcome_of(&report, "abc123"),
        Outcome::Failed { .. }
    ));
    assert_eq!(store.load().unwrap().unwrap()["abc123"], day(2023, 1, 1));
}

#[test]
fn threshold_is_inclusive() {
    let mut server = Server::new();
    let tmp = tempfile::tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("state.json"));
    store.update("edge", day(2023, 1, 1)).unwrap();

    let mock = server
        .mock("GET", "/api/file/edge/info")
        .with_status(200)
        .create();

    let client = HostClient::from_config(&config(&server.url(), store.path().into())).unwrap();
    let now = day(2023, 1, 1) + chrono::Duration::days(10);
    let report = Sweeper::new(&client, &store, 10).sweep_at(now).unwrap();

    mock.assert();
    assert_eq!(outcome_of(&report, "edge"), &Outcome::Visited);
}

#[test]
fn unreadable_value_does_not_block_due_entries() {
    let mut server = Server::new();
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("state.json");
    fs::write(
        &path,
        r#"{"keep1": "2023-01-01T00:00:00", "odd": "not a date", "keep2": "2023-03-01"}"#,
    )
    .unwrap();

    let keep1 = server
        .mock("GET", "/api/file/keep1/info")
        .with_status(200)
        .create();
    let keep2 = server
        .mock("GET", "/api/file/keep2/info")
        .with_status(200)
        .create();
    let odd = server
        .mock("GET", "/api/file/odd/info")
        .with_status(200)
        .expect(0)
        .create();

    let client = HostClient::from_config(&config(&server.url(), path.clone())).unwrap();
    let store = StateStore::new(&path);
    let now = day(2023, 8, 1);
    let report = Sweeper::new(&client, &store, 120).sweep_at(now).unwrap();

    keep1.assert();
    keep2.assert();
    odd.assert();
    assert_eq!(outcome_of(&report, "keep1"), &Outcome::Visited);
    assert_eq!(outcome_of(&report, "keep2"), &Outcome::Visited);
    assert!(matches!(outcome_of(&report, "odd"), Outcome::Failed { .. }));

    let entries = store.load().unwrap().unwrap();
    assert_eq!(entries["keep1"], now);
    assert_eq!(entries["keep2"], now);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains(r#""odd": "not a date""#), "file was {text}");
}

#[test]
fn keepalive_flow_succeeds_when_visits_fail() {
    let mut server = Server::new();
    let tmp = tempfile::tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("state.json"));
    store.update("abc123", day(2020, 1, 1)).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    let mock = server
        .mock("GET", "/api/file/abc123/info")
        .with_status(500)
        .create();

    let client = HostClient::from_config(&config(&server.url(), store.path().into())).unwrap();
    ui::keepalive(&client, &store, 120).unwrap();

    mock.assert();
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn keepalive_flow_succeeds_without_state() {
    let tmp = tempfile::tempdir().unwrap();
    let store = StateStore::new(tmp.path().join("state.json"));
    let client =
        HostClient::from_config(&config("http://127.0.0.1:9", store.path().into())).unwrap();

    ui::keepalive(&client, &store, 120).unwrap();
    assert!(!store.path().exists());
}
