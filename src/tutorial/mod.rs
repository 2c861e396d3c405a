//! Guided tutorial: ordered stages, scenario overlays, and hints.
//!
//! Tutorial actions go through [`GameSession::perform_filtered`] with the
//! active [`Scenario`] as the filter, so lessons use the same rules as
//! real games.
//!
//! [`GameSession::perform_filtered`]: crate::session::GameSession::perform_filtered

pub mod stage;
pub mod scenario;
pub mod mode;

pub use mode::TutorialMode;
pub use scenario::Scenario;
pub use stage::TutorialStage;
