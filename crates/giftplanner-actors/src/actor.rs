//! The per-entity actor loop.
//!
//! Each actor runs on its own Tokio task and goes through two states:
//!
//! - **Loading**: the stream is read and folded into a fresh aggregate.
//!   Messages arriving meanwhile are held in a FIFO.
//! - **Ready**: the held messages are handled oldest first, then the mailbox
//!   is drained one message at a time. Every command runs validate, append,
//!   fold, reply before the next message is taken.
//!
//! An infrastructure fault or a panic ends the current incarnation. The loop then
//! consults the restart budget and either reloads from the log or parks the
//! actor in a failed state that answers every message with
//! [`ActorError::Unavailable`].

use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use giftplanner_core::aggregate::AggregateRoot;
use giftplanner_core::clock::Clock;
use giftplanner_core::command::{Command, CommandEnvelope, CommandSuccess};
use giftplanner_core::error::DomainError;
use giftplanner_core::event::Event;
use giftplanner_core::event_log::{AppendOutcome, EventLog};
use giftplanner_core::rng::DeterministicRng;
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ActorError;
use crate::policy::{Directive, RestartBudget, RestartPolicy, decide};

/// Reply sent back for an `Execute` message.
pub(crate) type ExecuteReply = oneshot::Sender<Result<CommandSuccess, ActorError>>;

/// Reply sent back for a `GetState` message.
pub(crate) type StateReply<A> =
    oneshot::Sender<Result<Option<<A as AggregateRoot>::View>, ActorError>>;

/// Messages sent from an `EntityHandle` to the actor loop.
pub(crate) enum ActorMessage<A: AggregateRoot> {
    /// Validate and apply a command.
    Execute {
        envelope: CommandEnvelope<A::Command>,
        reply: ExecuteReply,
    },
    /// Snapshot the read model.
    GetState { reply: StateReply<A> },
}

impl<A: AggregateRoot> ActorMessage<A> {
    fn reject(self, error: ActorError) {
        // A dropped receiver means the caller gave up waiting.
        match self {
            Self::Execute { reply, .. } => {
                let _ = reply.send(Err(error));
            }
            Self::GetState { reply } => {
                let _ = reply.send(Err(error));
            }
        }
    }
}

/// Everything an actor needs besides its mailbox.
pub(crate) struct ActorContext {
    pub(crate) entity_id: Uuid,
    pub(crate) stream: String,
    pub(crate) log: Arc<dyn EventLog>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) rng: Box<dyn DeterministicRng>,
    pub(crate) policy: RestartPolicy,
}

/// The replayed aggregate plus the ids of every event folded into it.
struct Loaded<A> {
    aggregate: A,
    applied: HashSet<Uuid>,
}

/// How one incarnation of the actor ended.
enum Exit {
    /// Every sender is gone. Normal shutdown.
    MailboxClosed,
    /// An infrastructure failure; the aggregate can no longer be trusted.
    Fault(ActorError),
}

/// Runs the actor until its mailbox closes.
pub(crate) async fn run_actor<A: AggregateRoot>(
    mut ctx: ActorContext,
    mut rx: mpsc::Receiver<ActorMessage<A>>,
) {
    let entity_kind = A::STREAM_PREFIX;
    let mut pending = VecDeque::new();
    let mut budget = RestartBudget::new(ctx.policy);

    loop {
        // The aggregate is rebuilt from the log after a panic, so nothing
        // half-updated survives the unwind.
        let incarnation = AssertUnwindSafe(run_incarnation::<A>(&mut ctx, &mut rx, &mut pending))
            .catch_unwind()
            .await;
        let fault = match incarnation {
            Ok(Exit::MailboxClosed) => break,
            Ok(Exit::Fault(fault)) => fault,
            Err(payload) => {
                let fault = panicked(payload.as_ref());
                error!(entity_kind, entity_id = %ctx.entity_id, error = %fault, "actor panicked");
                fault
            }
        };

        // Nobody left to serve: a reload would only be thrown away.
        if pending.is_empty() && rx.is_closed() && rx.is_empty() {
            break;
        }

        if !budget.try_acquire(Instant::now()) {
            error!(
                entity_kind,
                entity_id = %ctx.entity_id,
                error = %fault,
                "restart budget exhausted, actor parked until reset"
            );
            drain_failed(ctx.entity_id, &mut rx, &mut pending).await;
            break;
        }

        warn!(
            entity_kind,
            entity_id = %ctx.entity_id,
            error = %fault,
            backoff_ms = u64::try_from(ctx.policy.backoff.as_millis()).unwrap_or(u64::MAX),
            "restarting actor"
        );
        tokio::time::sleep(ctx.policy.backoff).await;
    }

    debug!(entity_kind, entity_id = %ctx.entity_id, "actor stopped");
}

/// One pass through Loading and Ready.
async fn run_incarnation<A: AggregateRoot>(
    ctx: &mut ActorContext,
    rx: &mut mpsc::Receiver<ActorMessage<A>>,
    pending: &mut VecDeque<ActorMessage<A>>,
) -> Exit {
    let entity_kind = A::STREAM_PREFIX;

    // Loading: keep accepting mail while the replay is in flight.
    let mut mailbox_open = true;
    let loaded = {
        let load = load::<A>(ctx.log.as_ref(), &ctx.stream);
        tokio::pin!(load);
        loop {
            tokio::select! {
                biased;
                result = &mut load => break result,
                message = rx.recv(), if mailbox_open => match message {
                    Some(message) => pending.push_back(message),
                    None => mailbox_open = false,
                },
            }
        }
    };

    let mut state = match loaded {
        Ok(state) => state,
        Err(err) => {
            error!(
                entity_kind,
                entity_id = %ctx.entity_id,
                stream = %ctx.stream,
                error = %err,
                "load failed"
            );
            return Exit::Fault(err.into());
        }
    };
    info!(
        entity_kind,
        entity_id = %ctx.entity_id,
        version = state.aggregate.version(),
        held = pending.len(),
        "actor ready"
    );

    // Ready: held messages first, in arrival order.
    while let Some(message) = pending.pop_front() {
        if let Err(fault) = supervise(handle_message(ctx, &mut state, message).await) {
            return Exit::Fault(fault);
        }
    }
    if !mailbox_open {
        return Exit::MailboxClosed;
    }

    while let Some(message) = rx.recv().await {
        if let Err(fault) = supervise(handle_message(ctx, &mut state, message).await) {
            return Exit::Fault(fault);
        }
    }
    Exit::MailboxClosed
}

/// Applies the supervision directive to the outcome of one message. Only
/// failures that call for a restart survive.
fn supervise(outcome: Result<(), ActorError>) -> Result<(), ActorError> {
    match outcome {
        Err(err) if decide(&err) == Directive::Restart => Err(err),
        _ => Ok(()),
    }
}

/// Reads the whole stream and folds it into a fresh aggregate.
async fn load<A: AggregateRoot>(
    log: &dyn EventLog,
    stream: &str,
) -> Result<Loaded<A>, DomainError> {
    let stored = log.read(stream).await?;
    let mut aggregate = A::default();
    let mut applied = HashSet::with_capacity(stored.len());
    let mut last_sequence = 0;

    for record in &stored {
        if record.sequence_number <= last_sequence {
            return Err(DomainError::CorruptStream {
                stream_id: stream.to_owned(),
                reason: format!(
                    "sequence {} follows {last_sequence}",
                    record.sequence_number
                ),
            });
        }
        last_sequence = record.sequence_number;
        let event = Event::<A::EventKind>::from_stored(record)?;
        aggregate.apply(&event);
        applied.insert(record.event_id);
    }

    Ok(Loaded { aggregate, applied })
}

/// Handles one message. The caller is always answered before this returns;
/// an `Err` is handed to the supervision directive.
async fn handle_message<A: AggregateRoot>(
    ctx: &mut ActorContext,
    state: &mut Loaded<A>,
    message: ActorMessage<A>,
) -> Result<(), ActorError> {
    match message {
        ActorMessage::Execute { envelope, reply } => execute(ctx, state, envelope, reply).await,
        ActorMessage::GetState { reply } => {
            let _ = reply.send(Ok(state.aggregate.to_view()));
            Ok(())
        }
    }
}

async fn execute<A: AggregateRoot>(
    ctx: &mut ActorContext,
    state: &mut Loaded<A>,
    envelope: CommandEnvelope<A::Command>,
    reply: ExecuteReply,
) -> Result<(), ActorError> {
    let entity_kind = A::STREAM_PREFIX;
    let CommandEnvelope {
        command,
        correlation_id,
        idempotency_key,
    } = envelope;
    let command_type = command.command_type();

    if let Some(key) = idempotency_key
        && state.applied.contains(&key)
    {
        debug!(
            entity_kind,
            entity_id = %ctx.entity_id,
            command_type,
            %key,
            "command already applied"
        );
        let _ = reply.send(Ok(CommandSuccess::new("command already applied")));
        return Ok(());
    }

    let accepted = match state.aggregate.handle(command, &mut *ctx.rng) {
        Ok(accepted) => accepted,
        Err(failure) => {
            warn!(
                entity_kind,
                entity_id = %ctx.entity_id,
                command_type,
                %correlation_id,
                reason = %failure.reason,
                "command rejected"
            );
            let rejection = ActorError::Rejected(failure);
            let _ = reply.send(Err(rejection.clone()));
            return Err(rejection);
        }
    };

    let mut event = Event::new(
        &ctx.stream,
        idempotency_key.unwrap_or_else(Uuid::new_v4),
        correlation_id,
        ctx.clock.now(),
        accepted.event,
    );

    let outcome = match ctx.log.append(&ctx.stream, event.to_new_event()).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(
                entity_kind,
                entity_id = %ctx.entity_id,
                command_type,
                %correlation_id,
                error = %err,
                "append failed"
            );
            let fault = ActorError::Infrastructure(err);
            let _ = reply.send(Err(fault.clone()));
            return Err(fault);
        }
    };

    let expected = state.aggregate.version() + 1;
    match outcome {
        AppendOutcome::Appended(sequence_number) if sequence_number == expected => {
            event.metadata.sequence_number = sequence_number;
            state.aggregate.apply(&event);
            state.applied.insert(event.metadata.event_id);
            debug!(
                entity_kind,
                entity_id = %ctx.entity_id,
                stream = %ctx.stream,
                event_type = %event.metadata.event_type,
                sequence_number,
                %correlation_id,
                "event appended"
            );
            let _ = reply.send(Ok(CommandSuccess::new(accepted.message)));
            Ok(())
        }
        AppendOutcome::Appended(sequence_number) => {
            // Written, but another writer got there first: reload to catch up.
            let _ = reply.send(Ok(CommandSuccess::new(accepted.message)));
            let reason = format!("append landed at {sequence_number}, expected {expected}");
            Err(diverged(&ctx.stream, reason))
        }
        AppendOutcome::Duplicate(sequence_number) => {
            let _ = reply.send(Ok(CommandSuccess::new("command already applied")));
            let reason = format!(
                "event {} already stored at {sequence_number} but not folded",
                event.metadata.event_id
            );
            Err(diverged(&ctx.stream, reason))
        }
    }
}

/// Turns a panic payload into a fault that counts against the restart budget.
/// The caller whose message was in flight sees [`ActorError::Stopped`].
fn panicked(payload: &(dyn Any + Send)) -> ActorError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());
    ActorError::Infrastructure(DomainError::Infrastructure(format!("actor panicked: {message}")))
}

fn diverged(stream: &str, reason: String) -> ActorError {
    ActorError::Infrastructure(DomainError::CorruptStream {
        stream_id: stream.to_owned(),
        reason,
    })
}

/// Answers every held and future message with `Unavailable` until the
/// mailbox closes.
async fn drain_failed<A: AggregateRoot>(
    entity_id: Uuid,
    rx: &mut mpsc::Receiver<ActorMessage<A>>,
    pending: &mut VecDeque<ActorMessage<A>>,
) {
    for message in pending.drain(..) {
        message.reject(ActorError::Unavailable { entity_id });
    }
    while let Some(message) = rx.recv().await {
        message.reject(ActorError::Unavailable { entity_id });
    }
}
