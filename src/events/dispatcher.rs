//! Event dispatcher.
//!
//! Handlers are registered per [`EventTag`] when the dispatcher is built and
//! never change afterwards. Dispatch is two-phase:
//!
//! 1. `publish` only appends to the buffer.
//! 2. `publish_all` runs one pass: every buffered event, in publish order,
//!    goes to every handler for its tag, in registration order.
//!
//! Events a handler raises go to an [`Outbox`] and are dispatched in the
//! next pass, never the current one. A failing handler does not stop the
//! pass; failures come back together in a [`DispatchReport`].
//!
//! ## Example
//!
//! ```
//! use tactics_engine::core::TeamId;
//! use tactics_engine::events::{DomainEvent, EventDispatcher, EventTag};
//!
//! let mut dispatcher = EventDispatcher::<Vec<u32>>::builder()
//!     .on(EventTag::TurnEnded, "log_turn", |event, log: &mut Vec<u32>, _outbox| {
//!         if let tactics_engine::events::EventKind::TurnEnded { turn, .. } = event.kind {
//!             log.push(turn);
//!         }
//!         Ok(())
//!     })
//!     .build();
//!
//! dispatcher.publish(DomainEvent::turn_ended(TeamId::new(0), 1));
//! dispatcher.publish(DomainEvent::turn_ended(TeamId::new(1), 2));
//!
//! let mut log = Vec::new();
//! let report = dispatcher.publish_all(&mut log);
//! assert!(report.is_clean());
//! assert_eq!(log, vec![1, 2]);
//! ```

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, warn};

use super::event::{DomainEvent, EventTag};
use crate::error::{EngineError, Result};

/// Passes `drain` runs before giving up on handlers that keep raising events.
pub const DEFAULT_MAX_PASSES: usize = 8;

/// Events raised by handlers during a pass.
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<DomainEvent>,
}

impl Outbox {
    /// Queue an event for the next pass.
    pub fn publish(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing was queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// A handler over context `C`.
pub type Handler<C> = Box<dyn Fn(&DomainEvent, &mut C, &mut Outbox) -> Result<()> + Send + Sync>;

struct NamedHandler<C> {
    name: String,
    handler: Handler<C>,
}

/// One handler failure.
#[derive(Debug, Error)]
#[error("handler '{handler}' failed on {event}: {source}")]
pub struct HandlerError {
    /// Registered handler name.
    pub handler: String,
    /// Tag of the event being handled.
    pub event: EventTag,
    /// What went wrong.
    #[source]
    pub source: EngineError,
}

/// Outcome of one or more dispatch passes.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Passes run.
    pub passes: usize,
    /// Events dispatched.
    pub dispatched: usize,
    /// Handler failures, in the order they happened.
    pub failures: Vec<HandlerError>,
    /// Events still buffered when dispatch stopped.
    pub undelivered: usize,
}

impl DispatchReport {
    /// Check if every handler succeeded and nothing was left behind.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.undelivered == 0
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: DispatchReport) {
        self.passes += other.passes;
        self.dispatched += other.dispatched;
        self.failures.extend(other.failures);
        self.undelivered = other.undelivered;
    }
}

/// Builder for [`EventDispatcher`].
pub struct EventDispatcherBuilder<C> {
    handlers: FxHashMap<EventTag, Vec<NamedHandler<C>>>,
}

impl<C> EventDispatcherBuilder<C> {
    /// Register `handler` for `tag` (builder pattern).
    ///
    /// Handlers for the same tag run in registration order.
    #[must_use]
    pub fn on<F>(mut self, tag: EventTag, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&DomainEvent, &mut C, &mut Outbox) -> Result<()> + Send + Sync + 'static,
    {
        self.handlers.entry(tag).or_default().push(NamedHandler {
            name: name.into(),
            handler: Box::new(handler),
        });
        self
    }

    /// Register one handler for several tags (builder pattern).
    #[must_use]
    pub fn on_each<F>(mut self, tags: &[EventTag], name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&DomainEvent, &mut C, &mut Outbox) -> Result<()> + Send + Sync + Clone + 'static,
    {
        let name = name.into();
        for tag in tags {
            self = self.on(*tag, name.clone(), handler.clone());
        }
        self
    }

    /// Finish composition.
    #[must_use]
    pub fn build(self) -> EventDispatcher<C> {
        EventDispatcher {
            handlers: self.handlers,
            buffer: Vec::new(),
        }
    }
}

/// Buffered, registry-driven event dispatcher.
pub struct EventDispatcher<C> {
    handlers: FxHashMap<EventTag, Vec<NamedHandler<C>>>,
    buffer: Vec<DomainEvent>,
}

impl<C> EventDispatcher<C> {
    /// Start composing a dispatcher.
    #[must_use]
    pub fn builder() -> EventDispatcherBuilder<C> {
        EventDispatcherBuilder {
            handlers: FxHashMap::default(),
        }
    }

    /// A dispatcher with no handlers. Events are buffered and discarded.
    #[must_use]
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Buffer an event. Never dispatches.
    pub fn publish(&mut self, event: DomainEvent) {
        self.buffer.push(event);
    }

    /// Buffered events, in publish order.
    #[must_use]
    pub fn pending(&self) -> &[DomainEvent] {
        &self.buffer
    }

    /// Number of handlers registered for `tag`.
    #[must_use]
    pub fn handler_count(&self, tag: EventTag) -> usize {
        self.handlers.get(&tag).map_or(0, Vec::len)
    }

    /// Run one dispatch pass over everything buffered.
    ///
    /// The buffer is cleared; events raised by handlers during the pass
    /// become the new buffer.
    pub fn publish_all(&mut self, ctx: &mut C) -> DispatchReport {
        let events = std::mem::take(&mut self.buffer);
        let mut outbox = Outbox::default();
        let mut report = DispatchReport {
            passes: 1,
            dispatched: events.len(),
            ..DispatchReport::default()
        };

        for event in &events {
            let tag = event.tag();
            let Some(handlers) = self.handlers.get(&tag) else {
                continue;
            };
            for named in handlers {
                if let Err(source) = (named.handler)(event, ctx, &mut outbox) {
                    warn!(handler = %named.name, event = %tag, error = %source, "Event handler failed");
                    report.failures.push(HandlerError {
                        handler: named.name.clone(),
                        event: tag,
                        source,
                    });
                }
            }
        }

        debug!(dispatched = events.len(), raised = outbox.len(), "Dispatch pass complete");
        self.buffer = outbox.events;
        report.undelivered = self.buffer.len();
        report
    }

    /// Run passes until the buffer is empty or `max_passes` is reached.
    pub fn drain(&mut self, ctx: &mut C, max_passes: usize) -> DispatchReport {
        let mut report = DispatchReport::default();
        while !self.buffer.is_empty() && report.passes < max_passes {
            report.merge(self.publish_all(ctx));
        }
        if !self.buffer.is_empty() {
            warn!(remaining = self.buffer.len(), max_passes, "Event drain stopped with events pending");
        }
        report.undelivered = self.buffer.len();
        report
    }
}

impl<C> Default for EventDispatcher<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C> std::fmt::Debug for EventDispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self
            .handlers
            .iter()
            .map(|(tag, hs)| (tag.to_string(), hs.len()))
            .collect();
        tags.sort();
        f.debug_struct("EventDispatcher")
            .field("handlers", &tags)
            .field("pending", &self.buffer.len())
            .finish()
    }
}
