//! # tactics-engine
//!
//! A turn-based tactical rules engine driven by versioned balance
//! configuration.
//!
//! ## Design Principles
//!
//! 1. **Data-Driven**: Piece types and abilities are string keys into the
//!    active [`BalanceConfig`]. A missing key is always an error, never a
//!    default.
//!
//! 2. **One Rules Path**: Human turns, the AI service and tutorial lessons
//!    all act through [`Rules`]. Scenarios may restrict actions, never
//!    loosen them.
//!
//! 3. **Mutate, Then Notify**: A turn buffers domain events while it
//!    mutates the board; handlers run only after every mutation is done.
//!
//! 4. **Explicit Configuration**: Sessions receive a resolved
//!    configuration snapshot from a [`ConfigProvider`] they are handed,
//!    never from global state.
//!
//! ## Modules
//!
//! - `core`: Piece ids, teams, positions, actions, RNG
//! - `config`: Balance payload schema, versioning, cached provider
//! - `pieces`: Piece entity and factory
//! - `rules`: Movement, combat, ability, shield and evolution rules
//! - `events`: Domain events, dispatcher, standard handlers
//! - `session`: Board, mana ledger, turn processing
//! - `ai`: Deterministic AI turn service
//! - `tutorial`: Tutorial stages, scenarios and hints
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tactics_engine::config::{
//!     ConfigProvider, ConfigVersioning, InMemoryVersionStore, VersionStore,
//! };
//! use tactics_engine::core::PieceIdGenerator;
//! use tactics_engine::pieces::PieceFactory;
//!
//! let store: Arc<dyn VersionStore> = Arc::new(InMemoryVersionStore::new());
//! let provider = Arc::new(ConfigProvider::new(Arc::clone(&store)));
//! let versioning = ConfigVersioning::new(store, Arc::clone(&provider));
//!
//! let draft = versioning.create_draft("launch", None).unwrap();
//! versioning
//!     .edit_draft(draft, r#"{ "pieces": { "Pawn": { "hp": 10, "attack": 2 } } }"#)
//!     .unwrap();
//! versioning.publish(draft).unwrap();
//!
//! let config = provider.get_active().unwrap();
//! let factory = PieceFactory::new(config, Arc::new(PieceIdGenerator::new()));
//! let pawn = factory
//!     .create_piece("Pawn", tactics_engine::TeamId::new(0), tactics_engine::Position::new(0, 0), None)
//!     .unwrap();
//! assert_eq!(pawn.hp(), 10);
//! ```

pub mod core;
pub mod error;
pub mod config;
pub mod pieces;
pub mod rules;
pub mod events;
pub mod session;
pub mod ai;
pub mod tutorial;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionKind, ActionRecord, Controller, GameRng, ParticipantId, PieceId,
    PieceIdGenerator, Position, TeamId, TeamMap,
};

pub use crate::error::{EngineError, IllegalAction, Result};

pub use crate::config::{
    AbilitySpec, BalanceConfig, ConfigProvider, ConfigVersion, ConfigVersioning,
    InMemoryVersionStore, PieceStats, VersionId, VersionStatus, VersionStore,
};

pub use crate::pieces::{Piece, PieceFactory, PieceRef};

pub use crate::rules::{ActionFilter, ActionOutcome, AllowAll, GameResult, Rules};

pub use crate::events::{
    DispatchReport, DomainEvent, EventDispatcher, EventKind, EventTag, Notification,
    NotificationSink,
};

pub use crate::session::{Board, GameSession, ManaLedger, ManaPools, TurnPhase, TurnSummary};

pub use crate::ai::{AiConfig, AiTurnService, CancelFlag};

pub use crate::tutorial::{Scenario, TutorialMode, TutorialStage};
