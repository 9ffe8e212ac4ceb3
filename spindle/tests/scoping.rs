//! Sessions are bound and released on the thread that runs the hook.

use spindle::std::testing::{CountingSessions, Recorder, SessionEvent, db_command};
use spindle::std::transport::channel_transport;
use spindle::{EventType, HookArg, HookDescriptor, PluginRegistry, Worker};
use std::sync::Arc;
use std::thread::{self, ThreadId};

mod common;
use common::{run_to_end, settings};

async fn run_with_sessions(
    builder: spindle::PluginRegistryBuilder,
    sessions: &CountingSessions,
    events: impl FnOnce(&spindle::std::transport::ChannelHandle),
) {
    let (transport, handle) = channel_transport();
    let mut worker = Worker::new(transport, builder.build().unwrap(), settings())
        .unwrap()
        .with_sessions(Arc::new(sessions.clone()));
    worker.connect().await.unwrap();
    events(&handle);
    run_to_end(&mut worker, handle).await;
}

fn open_close_thread(sessions: &CountingSessions) -> ThreadId {
    match sessions.events().as_slice() {
        [SessionEvent::Opened(opened), SessionEvent::Closed(closed)] => {
            assert_eq!(opened, closed, "session released on another thread");
            *opened
        }
        other => panic!("expected one open and one close, got {other:?}"),
    }
}

#[tokio::test]
async fn test_offloaded_session_stays_on_worker_thread() {
    let recorder = Recorder::new();
    let sessions = CountingSessions::new();
    run_with_sessions(
        PluginRegistry::builder().register(db_command("note"), recorder.hook()),
        &sessions,
        |h| h.message("c1", ".note hi"),
    )
    .await;

    let call = &recorder.invocations()[0];
    assert!(call.had_session);
    assert_eq!(open_close_thread(&sessions), call.thread);
    assert_ne!(call.thread, thread::current().id());
}

#[tokio::test]
async fn test_inline_session_stays_on_loop_thread() {
    let recorder = Recorder::new();
    let sessions = CountingSessions::new();
    run_with_sessions(
        PluginRegistry::builder().register(db_command("note").threaded(false), recorder.hook()),
        &sessions,
        |h| h.message("c1", ".note hi"),
    )
    .await;

    assert!(recorder.invocations()[0].had_session);
    assert_eq!(open_close_thread(&sessions), thread::current().id());
}

#[tokio::test]
async fn test_ready_hook_session_on_loop_thread() {
    let recorder = Recorder::new();
    let sessions = CountingSessions::new();
    run_with_sessions(
        PluginRegistry::builder().register(
            HookDescriptor::event("load", EventType::Ready).requires(HookArg::Db),
            recorder.hook(),
        ),
        &sessions,
        |h| h.ready(),
    )
    .await;

    assert_eq!(recorder.names(), vec!["load"]);
    assert_eq!(open_close_thread(&sessions), thread::current().id());
}

#[tokio::test]
async fn test_hook_without_db_opens_nothing() {
    let recorder = Recorder::new();
    let sessions = CountingSessions::new();
    run_with_sessions(
        PluginRegistry::builder().register(HookDescriptor::command("ping"), recorder.hook()),
        &sessions,
        |h| h.message("c1", ".ping"),
    )
    .await;

    assert!(!recorder.invocations()[0].had_session);
    assert_eq!(sessions.opens(), 0);
}

#[tokio::test]
async fn test_failing_hook_still_releases_session() {
    let recorder = Recorder::new();
    let sessions = CountingSessions::new();
    run_with_sessions(
        PluginRegistry::builder().register(db_command("note"), recorder.failing("disk full")),
        &sessions,
        |h| h.message("c1", ".note hi"),
    )
    .await;

    assert_eq!(recorder.count(), 1);
    assert_eq!(sessions.opens(), 1);
    assert_eq!(sessions.closes(), 1);
}

#[tokio::test]
async fn test_session_open_failure_skips_hook_only() {
    let recorder = Recorder::new();
    let sessions = CountingSessions::new();
    sessions.fail_open("database locked");
    run_with_sessions(
        PluginRegistry::builder()
            .register(db_command("note"), recorder.hook())
            .register(HookDescriptor::command("ping"), recorder.hook()),
        &sessions,
        |h| {
            h.message("c1", ".note hi");
            h.message("c1", ".ping");
        },
    )
    .await;

    assert_eq!(recorder.names(), vec!["ping"]);
}
