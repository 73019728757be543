#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the autosync building blocks.
//!
//! A recording client stands in for rclone and stamps every call with its
//! entry and exit time, so the tests can check debounce coalescing, mutual
//! exclusion between push and pull, and daemon startup and shutdown.
//! Timings are generous to stay stable on loaded machines.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::*;
use dotdav::config::IgnoreSet;
use dotdav::logging::Log;
use dotdav::sync::{
    AutoSyncDaemon, Debouncer, Direction, RemoteSyncClient, ShutdownSignal, SyncGate, Syncer,
};

const REMOTE: &str = "gdrive:dotfiles";

fn syncer(env: &TestEnv, client: &Arc<RecordingClient>) -> Syncer {
    Syncer::new(
        Arc::clone(client) as Arc<dyn RemoteSyncClient>,
        SyncGate::default(),
        &env.repo(),
        REMOTE.to_string(),
        vec!["*.swp".to_string()],
    )
}

fn counting_debouncer(delay: Duration) -> (Debouncer, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);
    let debouncer = Debouncer::spawn(delay, move || {
        inner.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    (debouncer, count)
}

// ---------------------------------------------------------------------------
// Debounce
// ---------------------------------------------------------------------------

#[test]
fn burst_of_events_coalesces_into_one_firing() {
    let (debouncer, count) = counting_debouncer(Duration::from_millis(300));
    for _ in 0..5 {
        debouncer.trigger();
        std::thread::sleep(Duration::from_millis(30));
    }
    std::thread::sleep(Duration::from_millis(900));
    debouncer.shutdown();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn spaced_events_fire_once_each() {
    let (debouncer, count) = counting_debouncer(Duration::from_millis(50));
    for _ in 0..3 {
        debouncer.trigger();
        std::thread::sleep(Duration::from_millis(400));
    }
    debouncer.shutdown();
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

// ---------------------------------------------------------------------------
// Mutual exclusion
// ---------------------------------------------------------------------------

#[test]
fn concurrent_transfers_never_overlap() {
    let env = TestEnv::new();
    let client = RecordingClient::new(Duration::from_millis(15));
    let syncer = syncer(&env, &client);

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let syncer = syncer.clone();
            std::thread::spawn(move || {
                let direction = if i % 2 == 0 {
                    Direction::Push
                } else {
                    Direction::Pull
                };
                for _ in 0..5 {
                    syncer.transfer(direction).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let mut calls = client.calls();
    assert_eq!(calls.len(), 20);
    calls.sort_by_key(|c| c.started);
    for pair in calls.windows(2) {
        assert!(
            pair[1].started >= pair[0].finished,
            "transfers overlapped: {:?} and {:?}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn push_and_pull_swap_endpoints() {
    let env = TestEnv::new();
    let client = RecordingClient::new(Duration::ZERO);
    let syncer = syncer(&env, &client);
    syncer.transfer(Direction::Push).unwrap();
    syncer.transfer(Direction::Pull).unwrap();

    let calls = client.calls();
    let repo = env.repo().to_string_lossy().into_owned();
    assert_eq!((calls[0].source.as_str(), calls[0].destination.as_str()), (repo.as_str(), REMOTE));
    assert_eq!((calls[1].source.as_str(), calls[1].destination.as_str()), (REMOTE, repo.as_str()));
}

// ---------------------------------------------------------------------------
// Daemon
// ---------------------------------------------------------------------------

/// Build a daemon over `env`'s repository. The profile directory is created
/// up front so the watcher already covers it when files appear.
fn daemon(env: &TestEnv, client: &Arc<RecordingClient>, debounce: Duration) -> AutoSyncDaemon {
    std::fs::create_dir_all(env.repo().join("default")).unwrap();
    let log: Arc<dyn Log> = Arc::new(logger());
    AutoSyncDaemon::new(
        syncer(env, client),
        env.repo(),
        IgnoreSet::new(vec!["*.swp".to_string()]).unwrap(),
        Duration::from_secs(3600),
        debounce,
        log,
    )
}

#[test]
fn daemon_pulls_at_start_and_pushes_after_change() {
    let env = TestEnv::new();
    let client = RecordingClient::new(Duration::ZERO);
    let handle = daemon(&env, &client, Duration::from_millis(200))
        .start(ShutdownSignal::new())
        .unwrap();

    let repo = env.repo().to_string_lossy().into_owned();
    assert!(
        client.wait_for(Duration::from_secs(5), |calls| !calls.is_empty()),
        "initial pull never ran"
    );
    assert_eq!(client.calls()[0].source, REMOTE);

    write_file(&env.repo().join("default/.bashrc"), "export A=1\n");
    let pushed = client.wait_for(Duration::from_secs(10), |calls| {
        calls.iter().any(|c| c.destination == REMOTE)
    });
    handle.stop();

    assert!(pushed, "change never triggered a push");
    assert_eq!(client.calls_to(&repo), 1, "interval is long, only one pull");
}

#[test]
fn stop_discards_pending_push_and_joins() {
    let env = TestEnv::new();
    let client = RecordingClient::new(Duration::ZERO);
    let handle = daemon(&env, &client, Duration::from_secs(60))
        .start(ShutdownSignal::new())
        .unwrap();
    assert!(client.wait_for(Duration::from_secs(5), |calls| !calls.is_empty()));

    write_file(&env.repo().join("default/.vimrc"), "set nu\n");
    std::thread::sleep(Duration::from_millis(300));

    let started = std::time::Instant::now();
    handle.stop();
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "stop must not wait for the debounce delay or the pull interval"
    );
    assert_eq!(client.calls_to(REMOTE), 0, "pending push must be discarded");
}

#[test]
fn ignored_changes_do_not_push() {
    let env = TestEnv::new();
    let client = RecordingClient::new(Duration::ZERO);
    let handle = daemon(&env, &client, Duration::from_millis(100))
        .start(ShutdownSignal::new())
        .unwrap();
    assert!(client.wait_for(Duration::from_secs(5), |calls| !calls.is_empty()));

    write_file(&env.repo().join("default/.vimrc.swp"), "swap");
    std::thread::sleep(Duration::from_millis(800));
    handle.stop();

    assert_eq!(client.calls_to(REMOTE), 0);
}

#[test]
fn shutdown_signal_stops_waiting_daemon() {
    let env = TestEnv::new();
    let client = RecordingClient::new(Duration::ZERO);
    let shutdown = ShutdownSignal::new();
    let handle = daemon(&env, &client, Duration::from_millis(100))
        .start(shutdown.clone())
        .unwrap();

    let waiter = std::thread::spawn(move || handle.wait());
    assert!(client.wait_for(Duration::from_secs(5), |calls| !calls.is_empty()));
    shutdown.trigger();
    waiter.join().unwrap();
    assert!(shutdown.is_triggered());
}
