//! The hook registry contract and the command table built from it.

use crate::{
    context::{EventContext, EventPayload},
    error::{BoxError, ConfigurationError, HookError},
    event::{EventType, Server},
    hook::HookEntry,
    scope::InvocationScope,
};
use std::{collections::HashMap, sync::Arc};

/// Maps command names and lifecycle events to hooks, and knows how to run
/// them.
///
/// Implementations are shared between the event loop and offload workers, so
/// they must be thread-safe. Permission checks, if any, belong in
/// [`launch_command`](Self::launch_command).
pub trait HookRegistry: Send + Sync + 'static {
    /// Every command hook, in registration order.
    fn command_hooks(&self) -> Vec<Arc<HookEntry>>;

    /// Lifecycle hooks for `kind`, in registration order.
    fn hooks_by_event(&self, kind: EventType) -> Vec<Arc<HookEntry>>;

    /// Called once per server when the worker becomes ready.
    fn add_server(&self, _server: &Server) {}

    /// Run a hook body against a prepared context.
    fn launch_command(&self, hook: &HookEntry, ctx: &mut EventContext) -> Result<(), BoxError> {
        hook.hook().call(ctx)
    }

    /// Build the command table.
    fn command_table(&self) -> Result<CommandTable, ConfigurationError> {
        CommandTable::from_entries(self.command_hooks())
    }

    /// Run every lifecycle hook for `kind`, one after the other.
    ///
    /// A failing hook is logged and recorded; the remaining hooks still run.
    fn launch_hooks_by_event(
        &self,
        kind: EventType,
        payload: &EventPayload,
        scope: &InvocationScope,
    ) -> RoundReport {
        let mut report = RoundReport::new(kind);
        for hook in self.hooks_by_event(kind) {
            report.ran += 1;
            if let Err(e) = scope.invoke(self, &hook, payload.clone()) {
                tracing::error!(hook = e.hook(), event = %kind, error = %e, "lifecycle hook failed");
                report.failures.push(e);
            }
        }
        report
    }
}

impl<R: HookRegistry> HookRegistry for Arc<R> {
    fn command_hooks(&self) -> Vec<Arc<HookEntry>> {
        (**self).command_hooks()
    }

    fn hooks_by_event(&self, kind: EventType) -> Vec<Arc<HookEntry>> {
        (**self).hooks_by_event(kind)
    }

    fn add_server(&self, server: &Server) {
        (**self).add_server(server)
    }

    fn launch_command(&self, hook: &HookEntry, ctx: &mut EventContext) -> Result<(), BoxError> {
        (**self).launch_command(hook, ctx)
    }
}

/// Outcome of one lifecycle round.
#[derive(Debug)]
pub struct RoundReport {
    /// The event type of the round.
    pub kind: EventType,
    /// Number of hooks that were run.
    pub ran: usize,
    /// Hooks that failed, in execution order.
    pub failures: Vec<HookError>,
}

impl RoundReport {
    /// An empty report for `kind`.
    pub fn new(kind: EventType) -> Self {
        Self {
            kind,
            ran: 0,
            failures: Vec::new(),
        }
    }

    /// Whether every hook succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Read-only mapping from command name to hook.
///
/// Built once at connect time and shared with offload workers.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: HashMap<String, Arc<HookEntry>>,
}

impl CommandTable {
    /// Build a table from command hooks, indexing every alias.
    pub fn from_entries<I>(entries: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = Arc<HookEntry>>,
    {
        let mut commands = HashMap::new();
        for entry in entries {
            for name in entry.descriptor().command_names() {
                if commands.insert(name.clone(), Arc::clone(&entry)).is_some() {
                    return Err(ConfigurationError::DuplicateCommand(name.clone()));
                }
            }
        }
        Ok(Self { commands })
    }

    /// Look up a command.
    pub fn get(&self, name: &str) -> Option<&Arc<HookEntry>> {
        self.commands.get(name)
    }

    /// Check if a command is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Command names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of command names.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
