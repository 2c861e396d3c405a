//! Standard event handlers.
//!
//! - [`kill_reward_handler`]: grants the configured kill reward (XP to the
//!   killer, mana to its owner) and resolves immediate evolutions.
//! - [`notification_handler`]: turns events into [`Notification`]s and
//!   pushes them to a [`NotificationSink`].
//!
//! [`standard_dispatcher`] wires both for a session.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dispatcher::{EventDispatcher, Outbox};
use super::event::{DomainEvent, EventKind, EventTag};
use crate::config::BalanceConfig;
use crate::error::Result;
use crate::rules::evolution::resolve_immediate;
use crate::session::Board;

/// Push target for client-facing notifications.
///
/// Delivery is fire-and-forget from the engine's side.
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification.
    fn push(&self, notification: Notification);
}

/// Client-facing payload built from a domain event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Topic clients subscribe to.
    pub topic: EventTag,
    /// When the underlying event happened.
    pub occurred_at: DateTime<Utc>,
    /// Human-readable summary.
    pub message: String,
    /// The event payload.
    pub event: EventKind,
}

impl Notification {
    /// Build a notification for `event`.
    #[must_use]
    pub fn from_event(event: &DomainEvent) -> Self {
        let message = match &event.kind {
            EventKind::PieceKilled { killer, victim } => format!(
                "{} {} destroyed {} {}",
                killer.piece_type, killer.id, victim.piece_type, victim.id
            ),
            EventKind::PieceEvolved { piece, from } => {
                format!("{} evolved from {} into {}", piece.id, from, piece.piece_type)
            }
            EventKind::AbilityUsed { caster, ability, targets } => {
                format!("{} used {} on {} target(s)", caster.id, ability, targets.len())
            }
            EventKind::TurnEnded { team, turn } => format!("{team} ended turn {turn}"),
        };
        Self {
            topic: event.tag(),
            occurred_at: event.occurred_at,
            message,
            event: event.kind.clone(),
        }
    }
}

/// Sink that keeps every notification in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    received: Mutex<Vec<Notification>>,
}

impl CollectingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far.
    #[must_use]
    pub fn received(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSink for CollectingSink {
    fn push(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// Grant kill rewards on [`EventKind::PieceKilled`].
///
/// A killer that is no longer on the board gets no XP; its owner still
/// gets the mana. Evolutions flagged immediate resolve here and raise
/// [`EventKind::PieceEvolved`] for the next pass.
pub fn kill_reward_handler(
    config: Arc<BalanceConfig>,
) -> impl Fn(&DomainEvent, &mut Board, &mut Outbox) -> Result<()> + Send + Sync + Clone + 'static {
    move |event, board, outbox| {
        let EventKind::PieceKilled { killer, victim } = &event.kind else {
            return Ok(());
        };
        let Some(reward) = config.kill_reward(&victim.piece_type).copied() else {
            return Ok(());
        };

        if let Some(piece) = board.piece_mut(killer.id) {
            piece.gain_xp(reward.xp);
            for step in resolve_immediate(piece, &config)? {
                outbox.publish(DomainEvent::new(EventKind::PieceEvolved {
                    piece: piece.to_ref(),
                    from: step.from,
                }));
            }
        }

        if let Some(owner) = killer.owner {
            board
                .mana_ledger()
                .grant(owner, reward.mana, config.player_mana.max);
        }

        debug!(killer = %killer.id, victim = %victim.id, xp = reward.xp, mana = reward.mana, "Granted kill reward");
        Ok(())
    }
}

/// Forward every event to `sink`.
pub fn notification_handler(
    sink: Arc<dyn NotificationSink>,
) -> impl Fn(&DomainEvent, &mut Board, &mut Outbox) -> Result<()> + Send + Sync + Clone + 'static {
    move |event, _board, _outbox| {
        sink.push(Notification::from_event(event));
        Ok(())
    }
}

/// Dispatcher with the kill-reward handler and, if given, notifications.
///
/// Rewards are registered first, so notifications for a kill go out after
/// the reward has been applied.
#[must_use]
pub fn standard_dispatcher(
    config: Arc<BalanceConfig>,
    sink: Option<Arc<dyn NotificationSink>>,
) -> EventDispatcher<Board> {
    let builder = EventDispatcher::<Board>::builder().on(
        EventTag::PieceKilled,
        "kill_reward",
        kill_reward_handler(config),
    );
    match sink {
        Some(sink) => builder
            .on_each(&EventTag::ALL, "notify", notification_handler(sink))
            .build(),
        None => builder.build(),
    }
}
