//! Domain event pipeline.
//!
//! Turns buffer events while they mutate the board; the session flushes
//! them to handlers once every mutation for the turn is done, so handlers
//! never observe a half-applied turn.

pub mod event;
pub mod dispatcher;
pub mod handlers;

pub use dispatcher::{
    DispatchReport, EventDispatcher, EventDispatcherBuilder, Handler, HandlerError, Outbox,
    DEFAULT_MAX_PASSES,
};
pub use event::{DomainEvent, EventKind, EventTag};
pub use handlers::{
    kill_reward_handler, notification_handler, standard_dispatcher, CollectingSink, Notification,
    NotificationSink,
};
