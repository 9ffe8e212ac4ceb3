//! Registration-ordered hook registry.
//!
//! Use [`PluginRegistryBuilder`] to register hooks, then call `.build()` to
//! validate them and produce an immutable, thread-safe [`PluginRegistry`].

use crate::hooks::HelpHook;
use spindle_core::{
    BoxError, CommandTable, ConfigurationError, EventContext, EventType, Hook, HookDescriptor,
    HookEntry, HookRegistry, Server,
};
use std::sync::{Arc, PoisonError, RwLock};

/// An immutable registry of command and lifecycle hooks.
///
/// Lifecycle hooks are kept in registration order; that order is the order
/// the worker runs them in.
pub struct PluginRegistry {
    commands: Vec<Arc<HookEntry>>,
    lifecycle: Vec<Arc<HookEntry>>,
    servers: RwLock<Vec<Server>>,
}

impl PluginRegistry {
    /// Start building a registry.
    pub fn builder() -> PluginRegistryBuilder {
        PluginRegistryBuilder::new()
    }

    /// Servers announced when the worker became ready.
    pub fn servers(&self) -> Vec<Server> {
        self.servers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get the number of registered hooks.
    pub fn len(&self) -> usize {
        self.commands.len() + self.lifecycle.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.lifecycle.is_empty()
    }
}

impl HookRegistry for PluginRegistry {
    fn command_hooks(&self) -> Vec<Arc<HookEntry>> {
        self.commands.clone()
    }

    fn hooks_by_event(&self, kind: EventType) -> Vec<Arc<HookEntry>> {
        self.lifecycle
            .iter()
            .filter(|e| e.descriptor().event_type() == Some(kind))
            .cloned()
            .collect()
    }

    fn add_server(&self, server: &Server) {
        let mut servers = self.servers.write().unwrap_or_else(PoisonError::into_inner);
        if servers.iter().any(|s| s.id == server.id) {
            tracing::debug!(server = %server.id, "server already known");
            return;
        }
        tracing::info!(server = %server.id, name = %server.name, "added server");
        servers.push(server.clone());
    }
}

/// Builder for constructing a [`PluginRegistry`].
///
/// # Example
/// ```ignore
/// let registry = PluginRegistry::builder()
///     .register(HookDescriptor::command("ping"), PingHook)
///     .register(HookDescriptor::event("warmup", EventType::Ready), warmup)
///     .with_help("help")
///     .build()?;
/// ```
pub struct PluginRegistryBuilder {
    entries: Vec<HookEntry>,
    help: Option<String>,
}

impl PluginRegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            help: None,
        }
    }

    /// Register a hook.
    pub fn register<H: Hook>(mut self, descriptor: HookDescriptor, hook: H) -> Self {
        self.register_mut(descriptor, hook);
        self
    }

    /// Register a hook (mutable version).
    pub fn register_mut<H: Hook>(&mut self, descriptor: HookDescriptor, hook: H) {
        self.entries.push(HookEntry::new(descriptor, hook));
    }

    /// Register a closure as a hook.
    pub fn register_fn<F>(self, descriptor: HookDescriptor, hook: F) -> Self
    where
        F: Fn(&mut EventContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register(descriptor, hook)
    }

    /// Add a help command under `name` that lists every registered command.
    pub fn with_help(mut self, name: impl Into<String>) -> Self {
        self.help = Some(name.into());
        self
    }

    /// Validate the hooks and build the registry.
    ///
    /// Fails if two hooks share a command name or a lifecycle hook is
    /// marked threaded.
    pub fn build(mut self) -> Result<PluginRegistry, ConfigurationError> {
        if let Some(name) = self.help.take() {
            let help = HelpHook::from_descriptors(
                self.entries
                    .iter()
                    .map(HookEntry::descriptor)
                    .chain(std::iter::once(&HelpHook::descriptor(&name))),
            );
            self.entries
                .push(HookEntry::new(HelpHook::descriptor(&name), help));
        }

        let mut commands = Vec::new();
        let mut lifecycle = Vec::new();
        for entry in self.entries {
            let entry = Arc::new(entry);
            if entry.descriptor().event_type().is_some() {
                if entry.descriptor().is_threaded() {
                    return Err(ConfigurationError::ThreadedLifecycleHook(
                        entry.name().to_string(),
                    ));
                }
                lifecycle.push(entry);
            } else {
                commands.push(entry);
            }
        }

        // Reject duplicate names up front instead of at connect time.
        CommandTable::from_entries(commands.iter().cloned())?;

        tracing::debug!(
            commands = commands.len(),
            lifecycle = lifecycle.len(),
            "built plugin registry"
        );
        Ok(PluginRegistry {
            commands,
            lifecycle,
            servers: RwLock::new(Vec::new()),
        })
    }

    /// Get the number of registered hooks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the builder has no hooks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PluginRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
