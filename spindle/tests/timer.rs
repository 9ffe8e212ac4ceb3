//! Lifecycle rounds on the paused clock.

use spindle::std::testing::Recorder;
use spindle::{EventType, HookDescriptor, PluginRegistry};
use std::time::Duration;
use tokio::time::timeout;

mod common;
use common::{connected, rounds};

fn timer(name: &str) -> HookDescriptor {
    HookDescriptor::event(name, EventType::Timer)
}

#[tokio::test(start_paused = true)]
async fn test_ready_hooks_run_before_first_tick() {
    let recorder = Recorder::new();
    let (mut worker, handle) = connected(
        PluginRegistry::builder()
            .register(timer("t1"), recorder.hook())
            .register(HookDescriptor::event("r1", EventType::Ready), recorder.hook())
            .register(timer("t2"), recorder.hook())
            .register(HookDescriptor::event("r2", EventType::Ready), recorder.hook()),
    )
    .await;

    handle.ready();
    let _ = timeout(Duration::from_millis(2500), worker.run()).await;

    assert_eq!(
        rounds(&recorder),
        vec![
            ("r1".to_string(), None),
            ("r2".to_string(), None),
            ("t1".to_string(), Some(1)),
            ("t2".to_string(), Some(1)),
            ("t1".to_string(), Some(2)),
            ("t2".to_string(), Some(2)),
        ]
    );
    assert_eq!(worker.ticks(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_no_ticks_before_ready() {
    let recorder = Recorder::new();
    let (mut worker, handle) =
        connected(PluginRegistry::builder().register(timer("t1"), recorder.hook())).await;

    // A remote timer event does not stand in for the local schedule.
    handle.timer();
    let _ = timeout(Duration::from_secs(5), worker.run()).await;

    assert_eq!(recorder.count(), 0);
    assert_eq!(worker.ticks(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failing_timer_hook_does_not_skip_the_rest() {
    let recorder = Recorder::new();
    let (mut worker, handle) = connected(
        PluginRegistry::builder()
            .register(timer("t1"), recorder.failing("tick failed"))
            .register(timer("t2"), recorder.hook()),
    )
    .await;

    handle.ready();
    let _ = timeout(Duration::from_millis(3500), worker.run()).await;

    assert_eq!(recorder.names(), vec!["t1", "t2", "t1", "t2", "t1", "t2"]);
}

#[tokio::test(start_paused = true)]
async fn test_messages_between_ticks() {
    let recorder = Recorder::new();
    let (mut worker, handle) = connected(
        PluginRegistry::builder()
            .register(timer("t1"), recorder.hook())
            .register(HookDescriptor::command("now").threaded(false), recorder.hook()),
    )
    .await;

    handle.ready();
    let sender = handle.clone();
    let feed = async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        sender.message("c1", ".now");
    };
    let (_, _) = tokio::join!(timeout(Duration::from_millis(2500), worker.run()), feed);

    assert_eq!(recorder.names(), vec!["t1", "now", "t1"]);
}
