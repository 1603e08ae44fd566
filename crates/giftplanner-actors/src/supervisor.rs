//! Per-entity-kind supervisor: lazy actor registry, routing, enumeration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use giftplanner_core::aggregate::AggregateRoot;
use giftplanner_core::clock::Clock;
use giftplanner_core::command::{Command, CommandEnvelope, CommandSuccess};
use giftplanner_core::event_log::EventLog;
use giftplanner_core::rng::{DeterministicRng, StdRandom};
use giftplanner_core::stream::{parse_stream_id, stream_id};
use tokio::sync::{RwLock, mpsc};
use tokio::task::AbortHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::actor::{ActorContext, run_actor};
use crate::error::ActorError;
use crate::handle::EntityHandle;
use crate::policy::RestartPolicy;

/// Builds the random source handed to each newly spawned actor.
pub type RngFactory = Arc<dyn Fn() -> Box<dyn DeterministicRng> + Send + Sync>;

/// Runtime knobs shared by every actor of one supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Upper bound a caller waits for any reply.
    pub ask_timeout: Duration,
    /// Bounded mailbox size per actor.
    pub mailbox_capacity: usize,
    /// Restart budget per actor.
    pub restart_policy: RestartPolicy,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            ask_timeout: Duration::from_secs(5),
            mailbox_capacity: 64,
            restart_policy: RestartPolicy::default(),
        }
    }
}

/// Owns every live actor of aggregate kind `A`.
///
/// At most one actor exists per entity id at any time. Actors are spawned
/// on first reference and cached; a cached handle whose actor has exited is
/// replaced on the next reference, which replays the stream from the log.
pub struct Supervisor<A: AggregateRoot> {
    log: Arc<dyn EventLog>,
    clock: Arc<dyn Clock>,
    rng_factory: RngFactory,
    config: SupervisorConfig,
    registry: RwLock<HashMap<Uuid, Registered<A>>>,
}

/// A running actor: the handle callers clone, and the task it feeds.
struct Registered<A: AggregateRoot> {
    handle: EntityHandle<A>,
    task: AbortHandle,
}

impl<A: AggregateRoot> fmt::Debug for Supervisor<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("entity_kind", &A::STREAM_PREFIX)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<A: AggregateRoot> Supervisor<A> {
    /// Creates a supervisor whose actors draw randomness from OS entropy.
    #[must_use]
    pub fn new(log: Arc<dyn EventLog>, clock: Arc<dyn Clock>, config: SupervisorConfig) -> Self {
        Self::with_rng_factory(
            log,
            clock,
            config,
            Arc::new(|| Box::new(StdRandom::from_entropy())),
        )
    }

    /// Creates a supervisor with an injected random source, for reproducible
    /// raffle draws.
    #[must_use]
    pub fn with_rng_factory(
        log: Arc<dyn EventLog>,
        clock: Arc<dyn Clock>,
        config: SupervisorConfig,
        rng_factory: RngFactory,
    ) -> Self {
        Self {
            log,
            clock,
            rng_factory,
            config,
            registry: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the handle for `id`, spawning its actor if needed.
    pub async fn handle(&self, id: Uuid) -> EntityHandle<A> {
        // Fast path: read lock only.
        {
            let registry = self.registry.read().await;
            if let Some(entry) = registry.get(&id)
                && entry.handle.is_alive()
            {
                return entry.handle.clone();
            }
        }

        // Slow path: another caller may have spawned it meanwhile.
        let mut registry = self.registry.write().await;
        if let Some(entry) = registry.get(&id)
            && entry.handle.is_alive()
        {
            return entry.handle.clone();
        }

        let entry = self.spawn(id);
        let handle = entry.handle.clone();
        registry.insert(id, entry);
        handle
    }

    fn spawn(&self, id: Uuid) -> Registered<A> {
        let (sender, rx) = mpsc::channel(self.config.mailbox_capacity);
        let ctx = ActorContext {
            entity_id: id,
            stream: stream_id(A::STREAM_PREFIX, id),
            log: Arc::clone(&self.log),
            clock: Arc::clone(&self.clock),
            rng: (self.rng_factory)(),
            policy: self.config.restart_policy,
        };
        info!(entity_kind = A::STREAM_PREFIX, entity_id = %id, "spawning actor");
        let task = tokio::spawn(run_actor::<A>(ctx, rx)).abort_handle();
        Registered {
            handle: EntityHandle::new(id, sender, self.config.ask_timeout),
            task,
        }
    }

    /// Routes a command to the actor named by its target id.
    ///
    /// # Errors
    ///
    /// See [`EntityHandle::execute`].
    pub async fn execute(
        &self,
        envelope: CommandEnvelope<A::Command>,
    ) -> Result<CommandSuccess, ActorError> {
        let id = envelope.command.target_id();
        debug!(
            entity_kind = A::STREAM_PREFIX,
            entity_id = %id,
            command_type = envelope.command.command_type(),
            correlation_id = %envelope.correlation_id,
            "routing command"
        );
        self.handle(id).await.execute(envelope).await
    }

    /// Shorthand for [`execute`](Self::execute) with a fresh envelope.
    ///
    /// # Errors
    ///
    /// See [`EntityHandle::execute`].
    pub async fn send(&self, command: A::Command) -> Result<CommandSuccess, ActorError> {
        self.execute(CommandEnvelope::new(command)).await
    }

    /// Fetches the read model of `id`, `None` if it was never created.
    ///
    /// # Errors
    ///
    /// See [`EntityHandle::state`].
    pub async fn query(&self, id: Uuid) -> Result<Option<A::View>, ActorError> {
        self.handle(id).await.state().await
    }

    /// Lists the ids of every entity of this kind that has a stream.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Infrastructure`] if the log cannot be queried.
    pub async fn list_ids(&self) -> Result<Vec<Uuid>, ActorError> {
        let prefix = format!("{}-", A::STREAM_PREFIX);
        let streams = self.log.list_stream_ids(&prefix).await?;
        Ok(streams
            .iter()
            .filter_map(|stream| {
                let id = parse_stream_id(A::STREAM_PREFIX, stream);
                if id.is_none() {
                    debug!(
                        entity_kind = A::STREAM_PREFIX,
                        stream = %stream,
                        "skipping malformed stream name"
                    );
                }
                id
            })
            .collect())
    }

    /// Evicts and stops the actor for `id`. The next reference spawns a
    /// fresh one that replays the stream and starts with a full restart
    /// budget. Handles cloned from the old actor answer
    /// [`ActorError::Stopped`] from then on; a command it was appending may
    /// or may not have landed. Returns `false` if no actor was registered.
    pub async fn reset(&self, id: Uuid) -> bool {
        let removed = self.registry.write().await.remove(&id);
        match removed {
            Some(entry) => {
                entry.task.abort();
                info!(entity_kind = A::STREAM_PREFIX, entity_id = %id, "actor reset");
                true
            }
            None => false,
        }
    }

    /// Number of registered actors that are still running.
    pub async fn live_actors(&self) -> usize {
        self.registry
            .read()
            .await
            .values()
            .filter(|entry| entry.handle.is_alive())
            .count()
    }
}
