//! The event loop.

use super::{
    pool::OffloadPool,
    readiness::{Readiness, ReadinessState},
    timer::TimerSchedule,
};
use crate::{command::parse_command, config::WorkerSettings};
use spindle_core::{
    CommandTable, ConfigurationError, Event, EventPayload, HookRegistry,
    InvocationScope, NoSessions, RoundReport, SessionFactory, SpindleError, TextMessage,
    Transport, TransportError,
};
use std::sync::Arc;
use tokio::time::{Instant, sleep_until};

/// What woke the loop.
enum Step {
    Tick,
    Event(Result<Option<Event>, TransportError>),
}

/// Drives a [`Transport`] and dispatches its events to a [`HookRegistry`].
///
/// # Example
///
/// ```rust,ignore
/// let mut worker = Worker::new(transport, registry, WorkerSettings::default())?
///     .with_sessions(Arc::new(SqliteSessions::open_path("worker.db")));
/// worker.connect().await?;
/// worker.run().await?;
/// worker.drain().await;
/// ```
pub struct Worker<T: Transport> {
    transport: T,
    registry: Arc<dyn HookRegistry>,
    scope: InvocationScope,
    settings: WorkerSettings,
    commands: CommandTable,
    readiness: Readiness,
    timer: TimerSchedule,
    pool: OffloadPool,
}

impl<T: Transport> Worker<T> {
    /// Create a worker. Hooks needing a session fail until
    /// [`with_sessions`](Self::with_sessions) is called.
    pub fn new<R: HookRegistry>(
        transport: T,
        registry: R,
        settings: WorkerSettings,
    ) -> Result<Self, ConfigurationError> {
        settings.validate()?;
        let scope = InvocationScope::new(Arc::new(NoSessions))
            .with_reply_sink(transport.reply_sink());
        Ok(Self {
            timer: TimerSchedule::new(settings.timer_interval),
            pool: OffloadPool::new(settings.max_workers),
            transport,
            registry: Arc::new(registry),
            scope,
            settings,
            commands: CommandTable::default(),
            readiness: Readiness::new(),
        })
    }

    /// Open sessions for hooks that declare `HookArg::Db` from `sessions`.
    pub fn with_sessions(mut self, sessions: Arc<dyn SessionFactory>) -> Self {
        self.scope = InvocationScope::new(sessions).with_reply_sink(self.transport.reply_sink());
        self
    }

    /// Connect the transport and publish the command list.
    pub async fn connect(&mut self) -> Result<(), SpindleError> {
        self.transport.connect().await?;

        let table = self.registry.command_table()?;
        let names = table.names();
        tracing::info!(commands = names.len(), "publishing command list");
        self.transport.set_command_list(names).await?;
        self.commands = table;
        Ok(())
    }

    /// Process events until the transport stream ends.
    ///
    /// Hook failures are logged and never end the loop. Transport failures
    /// and a repeated readiness signal do.
    pub async fn run(&mut self) -> Result<(), SpindleError> {
        loop {
            let deadline = self.timer.deadline();
            let step = tokio::select! {
                biased;
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Step::Tick,
                event = self.transport.next_event() => Step::Event(event),
            };

            match step {
                Step::Tick => {
                    self.run_timer_round();
                    self.timer.arm();
                }
                Step::Event(Ok(Some(event))) => self.handle_event(event).await?,
                Step::Event(Ok(None)) => {
                    tracing::info!("event stream ended");
                    return Ok(());
                }
                Step::Event(Err(e)) => {
                    tracing::error!(error = %e, "transport failed");
                    return Err(e.into());
                }
            }
        }
    }

    /// Classify and dispatch one event.
    pub async fn handle_event(&mut self, event: Event) -> Result<(), SpindleError> {
        match event {
            Event::Message(message) => {
                self.dispatch_message(message).await;
                Ok(())
            }
            Event::Ready => {
                let report = self.run_on_ready_work().await?;
                tracing::info!(hooks = report.ran, failed = report.failures.len(), "ready");
                Ok(())
            }
            Event::Timer => {
                tracing::debug!("ignoring remote timer event");
                Ok(())
            }
        }
    }

    /// Make the once-only readiness transition.
    ///
    /// Registers the transport's servers, runs every ready hook inline in
    /// registration order, then arms the timer. Calling this again fails
    /// with [`ConfigurationError::AlreadyReady`].
    pub async fn run_on_ready_work(&mut self) -> Result<RoundReport, SpindleError> {
        self.readiness.begin()?;

        let servers = self.transport.get_servers().await?;
        for server in &servers {
            self.registry.add_server(server);
        }

        let report = self.run_round(EventPayload::Ready { servers });
        self.readiness.complete();
        self.timer.arm();
        Ok(report)
    }

    /// Wait for every offloaded command to finish.
    pub async fn drain(&self) {
        self.pool.drain().await;
    }

    /// Current readiness state.
    pub fn readiness(&self) -> ReadinessState {
        self.readiness.state()
    }

    /// The command table published at connect.
    pub fn command_table(&self) -> &CommandTable {
        &self.commands
    }

    /// Timer rounds run so far.
    pub fn ticks(&self) -> u64 {
        self.timer.ticks()
    }

    /// Offloaded commands still running.
    pub fn in_flight(&self) -> usize {
        self.pool.in_flight()
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn run_timer_round(&mut self) -> RoundReport {
        let tick = self.timer.fire();
        self.run_round(EventPayload::Timer { tick })
    }

    fn run_round(&self, payload: EventPayload) -> RoundReport {
        let kind = payload.kind();
        let span = match &payload {
            EventPayload::Timer { tick } => tracing::debug_span!("round", event = %kind, tick),
            _ => tracing::info_span!("round", event = %kind),
        };
        let _enter = span.enter();
        self.registry.launch_hooks_by_event(kind, &payload, &self.scope)
    }

    async fn dispatch_message(&mut self, message: TextMessage) {
        let Some(parsed) = parse_command(&self.settings.command_prefix, &message.content) else {
            tracing::trace!(channel = %message.channel_id, "not a command");
            return;
        };
        let Some(hook) = self.commands.get(parsed.name).cloned() else {
            tracing::debug!(command = parsed.name, "unknown command, dropping");
            return;
        };

        let command = parsed.name.to_string();
        let text = parsed.text.to_string();
        tracing::debug!(command = %command, channel = %message.channel_id, "dispatching command");
        let payload = EventPayload::Command {
            command: command.clone(),
            text,
            message,
        };

        if !hook.descriptor().is_threaded() {
            if let Err(e) = self.scope.invoke(&*self.registry, &hook, payload) {
                tracing::error!(hook = e.hook(), command = %command, error = %e, "command failed");
            }
            return;
        }

        let span = tracing::info_span!("offload", hook = hook.name(), command = %command);
        let registry = Arc::clone(&self.registry);
        let scope = self.scope.clone();
        self.pool
            .submit(span, move || {
                if let Err(e) = scope.invoke(&*registry, &hook, payload) {
                    tracing::error!(hook = e.hook(), error = %e, "command failed");
                }
            })
            .await;
    }
}
