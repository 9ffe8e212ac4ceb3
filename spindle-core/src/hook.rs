//! # Hooks
//!
//! A hook is a registered handler bound either to one or more command names
//! or to a lifecycle [`EventType`]. Each hook is described by an immutable
//! [`HookDescriptor`] and executed through the [`Hook`] trait.
//!
//! Hook bodies are synchronous. Anything that blocks belongs in a threaded
//! command hook, which the worker runs off the event loop. Lifecycle hooks
//! (`ready`, `timer`) run inline and should stay cheap.

use crate::{context::EventContext, error::BoxError, event::EventType};
use std::{collections::BTreeSet, fmt};

/// An argument a hook declares it needs.
///
/// Only [`HookArg::Db`] changes how the hook is scoped: it makes
/// [`EventContext::prepare`] open a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookArg {
    /// A database session bound for the duration of the call.
    Db,
    /// The text following the command name.
    Text,
    /// The originating event.
    Event,
    /// The server the event came from.
    Server,
    /// The reply side-channel.
    Reply,
}

/// What causes a hook to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// One or more command names (aliases share a hook).
    Command(Vec<String>),
    /// A lifecycle event.
    Event(EventType),
}

/// Immutable metadata describing a registered hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookDescriptor {
    name: String,
    doc: Option<String>,
    required: BTreeSet<HookArg>,
    threaded: bool,
    trigger: Trigger,
}

impl HookDescriptor {
    /// Describe a command hook. Command hooks are threaded by default.
    pub fn command(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            trigger: Trigger::Command(vec![name.clone()]),
            name,
            doc: None,
            required: BTreeSet::new(),
            threaded: true,
        }
    }

    /// Describe a lifecycle hook for the given event type.
    pub fn event(name: impl Into<String>, kind: EventType) -> Self {
        Self {
            name: name.into(),
            doc: None,
            required: BTreeSet::new(),
            threaded: false,
            trigger: Trigger::Event(kind),
        }
    }

    /// Add an alias command name. Ignored for lifecycle hooks.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if let Trigger::Command(names) = &mut self.trigger {
            names.push(alias.into());
        }
        self
    }

    /// Set the documentation text.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Declare a required argument.
    pub fn requires(mut self, arg: HookArg) -> Self {
        self.required.insert(arg);
        self
    }

    /// Set the threading flag.
    pub fn threaded(mut self, threaded: bool) -> Self {
        self.threaded = threaded;
        self
    }

    /// The hook's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The hook's documentation text, if any.
    pub fn documentation(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// The declared argument set.
    pub fn required_args(&self) -> &BTreeSet<HookArg> {
        &self.required
    }

    /// Whether the hook declared `arg`.
    pub fn needs(&self, arg: HookArg) -> bool {
        self.required.contains(&arg)
    }

    /// Whether the worker must run this hook off the event loop.
    pub fn is_threaded(&self) -> bool {
        self.threaded
    }

    /// What triggers this hook.
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Command names, empty for lifecycle hooks.
    pub fn command_names(&self) -> &[String] {
        match &self.trigger {
            Trigger::Command(names) => names,
            Trigger::Event(_) => &[],
        }
    }

    /// The lifecycle event this hook listens to, if any.
    pub fn event_type(&self) -> Option<EventType> {
        match self.trigger {
            Trigger::Event(kind) => Some(kind),
            Trigger::Command(_) => None,
        }
    }
}

/// The body of a hook.
///
/// Closures of the form `Fn(&mut EventContext) -> Result<(), BoxError>`
/// implement this trait.
pub trait Hook: Send + Sync + 'static {
    /// Run the hook against a prepared context.
    fn call(&self, ctx: &mut EventContext) -> Result<(), BoxError>;
}

impl<F> Hook for F
where
    F: Fn(&mut EventContext) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut EventContext) -> Result<(), BoxError> {
        self(ctx)
    }
}

/// A hook body together with its descriptor.
pub struct HookEntry {
    descriptor: HookDescriptor,
    hook: Box<dyn Hook>,
}

impl HookEntry {
    /// Create a new hook entry.
    pub fn new<H: Hook>(descriptor: HookDescriptor, hook: H) -> Self {
        Self {
            descriptor,
            hook: Box::new(hook),
        }
    }

    /// The hook's descriptor.
    pub fn descriptor(&self) -> &HookDescriptor {
        &self.descriptor
    }

    /// The hook's name.
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Get the hook reference.
    pub fn hook(&self) -> &dyn Hook {
        &*self.hook
    }
}

impl fmt::Debug for HookEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
