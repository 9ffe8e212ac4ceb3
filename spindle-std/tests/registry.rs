//! Registry building and lifecycle rounds.

use spindle_std::registry::PluginRegistry;
use spindle_std::spindle_core::{
    BoxError, ConfigurationError, EventContext, EventPayload, EventType, HookDescriptor,
    HookRegistry, InvocationScope, Server,
};
use spindle_std::testing::{PanickingHook, Recorder};
use std::sync::Arc;

fn noop(_ctx: &mut EventContext) -> Result<(), BoxError> {
    Ok(())
}

#[test]
fn test_lifecycle_hooks_keep_registration_order() {
    let recorder = Recorder::new();
    let registry = PluginRegistry::builder()
        .register(HookDescriptor::event("t1", EventType::Timer), recorder.hook())
        .register(HookDescriptor::command("ping"), recorder.hook())
        .register(HookDescriptor::event("r1", EventType::Ready), recorder.hook())
        .register(HookDescriptor::event("t2", EventType::Timer), recorder.hook())
        .build()
        .unwrap();

    let names: Vec<_> = registry
        .hooks_by_event(EventType::Timer)
        .iter()
        .map(|h| h.name().to_string())
        .collect();
    assert_eq!(names, vec!["t1", "t2"]);
    assert_eq!(registry.command_hooks().len(), 1);
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_rejects_threaded_lifecycle_hook() {
    let err = PluginRegistry::builder()
        .register_fn(
            HookDescriptor::event("warmup", EventType::Ready).threaded(true),
            noop,
        )
        .build()
        .err()
        .unwrap();

    assert_eq!(err, ConfigurationError::ThreadedLifecycleHook("warmup".into()));
}

#[test]
fn test_rejects_duplicate_alias() {
    let err = PluginRegistry::builder()
        .register_fn(HookDescriptor::command("roll"), noop)
        .register_fn(HookDescriptor::command("dice").alias("roll"), noop)
        .build()
        .err()
        .unwrap();

    assert_eq!(err, ConfigurationError::DuplicateCommand("roll".into()));
}

#[test]
fn test_help_is_registered_as_command() {
    let registry = PluginRegistry::builder()
        .register_fn(HookDescriptor::command("ping"), noop)
        .with_help("help")
        .build()
        .unwrap();

    let table = registry.command_table().unwrap();
    assert_eq!(table.names(), vec!["help", "ping"]);
    assert!(!table.get("help").unwrap().descriptor().is_threaded());
}

#[test]
fn test_add_server_dedups() {
    let registry = PluginRegistry::builder().build().unwrap();
    registry.add_server(&Server::new("1", "one"));
    registry.add_server(&Server::new("1", "one again"));
    registry.add_server(&Server::new("2", "two"));

    let ids: Vec<_> = registry.servers().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[test]
fn test_round_survives_panicking_hook() {
    let recorder = Recorder::new();
    let registry = Arc::new(
        PluginRegistry::builder()
            .register(HookDescriptor::event("t1", EventType::Timer), recorder.hook())
            .register(HookDescriptor::event("boom", EventType::Timer), PanickingHook("boom"))
            .register(HookDescriptor::event("t3", EventType::Timer), recorder.hook())
            .build()
            .unwrap(),
    );

    let report = registry.launch_hooks_by_event(
        EventType::Timer,
        &EventPayload::Timer { tick: 1 },
        &InvocationScope::default(),
    );

    assert_eq!(report.ran, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].hook(), "boom");
    assert_eq!(recorder.names(), vec!["t1", "t3"]);
}
