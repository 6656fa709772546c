//! Deferred events
//!
//! A decision made now can leave a follow-up that runs later without the
//! tick loop waiting on it. Each event fires exactly once: as soon as its
//! readiness condition holds, or when its expiration tick is reached,
//! whichever comes first. Actions and conditions are plain data; side
//! effects go through the [`PresentationSink`] handed to
//! [`DeferredEventRegistry::advance`].

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{Tick, TilePosition};
use crate::host::{Host, UnitType};
use crate::render::colors::Color;
use crate::render::{OverlayShape, PresentationSink};

/// Handle for a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

/// What to do when an event fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Outline the footprint of a planned structure
    HighlightBuildSite {
        kind: UnitType,
        location: TilePosition,
        color: Color,
    },
}

/// Condition that lets an event fire before it expires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    /// An owned structure of `kind` has been placed at `location`
    ConstructionStarted { kind: UnitType, location: TilePosition },
    /// At least `count` completed units of `kind` are owned
    UnitCountAtLeast { kind: UnitType, count: usize },
    /// The given tick has been reached
    TickReached(Tick),
}

impl Readiness {
    pub fn is_met(&self, now: Tick, host: &dyn Host) -> bool {
        match self {
            Readiness::ConstructionStarted { kind, location } => host
                .own_units()
                .iter()
                .any(|u| u.kind == *kind && u.tile() == *location),
            Readiness::UnitCountAtLeast { kind, count } => {
                host.own_units()
                    .iter()
                    .filter(|u| u.kind == *kind && u.status.completed)
                    .count()
                    >= *count
            }
            Readiness::TickReached(tick) => now >= *tick,
        }
    }
}

/// A pending follow-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredEvent {
    pub id: EventId,
    pub action: DeferredAction,
    pub readiness: Option<Readiness>,
    pub scheduled_at: Tick,
    pub expires_at: Tick,
}

impl DeferredEvent {
    fn due_reason(&self, now: Tick, host: &dyn Host) -> Option<FireReason> {
        if self.readiness.as_ref().is_some_and(|r| r.is_met(now, host)) {
            Some(FireReason::Ready)
        } else if now >= self.expires_at {
            Some(FireReason::Expired)
        } else {
            None
        }
    }
}

/// Why an event fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireReason {
    /// Readiness condition held before expiration
    Ready,
    /// Expiration tick reached
    Expired,
}

/// Record of a fired event, returned by a sweep
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredEvent {
    pub id: EventId,
    pub action: DeferredAction,
    pub reason: FireReason,
    pub tick: Tick,
    /// Whether the action's side effect succeeded
    pub delivered: bool,
}

/// Pending deferred events
#[derive(Debug, Default)]
pub struct DeferredEventRegistry {
    pending: Vec<DeferredEvent>,
    next_id: u64,
}

impl DeferredEventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to run `ticks_from_now` ticks after `now`, or
    /// earlier once `readiness` holds
    pub fn schedule(
        &mut self,
        action: DeferredAction,
        readiness: Option<Readiness>,
        now: Tick,
        ticks_from_now: u64,
    ) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;

        let expires_at = now.saturating_add(ticks_from_now);
        tracing::debug!(?id, ?action, expires_at, "deferred event scheduled");

        self.pending.push(DeferredEvent {
            id,
            action,
            readiness,
            scheduled_at: now,
            expires_at,
        });
        id
    }

    /// Fire and remove every due event
    ///
    /// Due events leave the pending set before any action runs, so no
    /// event can fire twice. A failing action is logged and the remaining
    /// due events still run.
    pub fn advance(
        &mut self,
        now: Tick,
        host: &dyn Host,
        sink: &mut dyn PresentationSink,
    ) -> Vec<FiredEvent> {
        let mut due = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());
        for event in self.pending.drain(..) {
            match event.due_reason(now, host) {
                Some(reason) => due.push((event, reason)),
                None => waiting.push(event),
            }
        }
        self.pending = waiting;

        due.into_iter()
            .map(|(event, reason)| {
                let delivered = match execute(&event, reason, now, sink) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(id = ?event.id, error = %e, "deferred action failed");
                        false
                    }
                };
                FiredEvent {
                    id: event.id,
                    action: event.action,
                    reason,
                    tick: now,
                    delivered,
                }
            })
            .collect()
    }

    /// Drop a pending event without firing it
    pub fn cancel(&mut self, id: EventId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|e| e.id != id);
        self.pending.len() != before
    }

    pub fn pending(&self) -> &[DeferredEvent] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

fn execute(
    event: &DeferredEvent,
    reason: FireReason,
    now: Tick,
    sink: &mut dyn PresentationSink,
) -> Result<()> {
    match &event.action {
        DeferredAction::HighlightBuildSite { kind, location, color } => {
            let unconfirmed = reason == FireReason::Expired && event.readiness.is_some();
            if unconfirmed {
                tracing::warn!(%kind, %location, "construction never started at planned site");
            } else {
                tracing::debug!(%kind, %location, ?reason, "highlighting build site");
            }

            let frames = event.expires_at.saturating_sub(now).max(1);
            sink.draw(
                OverlayShape::Box {
                    top_left: location.to_position(),
                    bottom_right: (*location + kind.tile_size()).to_position(),
                    color: if unconfirmed { color.darken(0.5) } else { *color },
                },
                frames,
            )
        }
    }
}
