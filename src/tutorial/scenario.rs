//! Scenario overlays for guided lessons.
//!
//! A scenario restricts which action kinds and which piece types may act,
//! and carries lesson hints. It never loosens the standard rules.

use serde::{Deserialize, Serialize};

use super::stage::TutorialStage;
use crate::core::{Action, ActionKind};
use crate::rules::ActionFilter;
use crate::session::Board;

/// Legality overlay plus hints for one lesson.
///
/// ## Example
///
/// ```
/// use tactics_engine::core::ActionKind;
/// use tactics_engine::tutorial::Scenario;
///
/// let lesson = Scenario::new("Knights only")
///     .allow_actions(&[ActionKind::Move])
///     .allow_piece_types(&["Knight"])
///     .with_hint("Move your Knight toward the enemy.");
///
/// assert!(lesson.allows_kind(ActionKind::Move));
/// assert!(!lesson.allows_kind(ActionKind::Attack));
/// assert!(lesson.allows_piece_type("Knight"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scenario {
    /// Lesson name.
    pub name: String,
    /// Allowed action kinds (`None` = all).
    pub allowed_actions: Option<Vec<ActionKind>>,
    /// Piece types that may act (`None` = all).
    pub allowed_piece_types: Option<Vec<String>>,
    /// Lesson hints.
    pub hints: Vec<String>,
}

impl Scenario {
    /// An unrestricted scenario.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The default lesson for a stage.
    #[must_use]
    pub fn for_stage(stage: TutorialStage) -> Self {
        let scenario = Self::new(stage.to_string());
        match stage {
            TutorialStage::Welcome | TutorialStage::Movement => {
                scenario.allow_actions(&[ActionKind::Move])
            }
            TutorialStage::Combat => scenario.allow_actions(&[ActionKind::Move, ActionKind::Attack]),
            TutorialStage::Abilities
            | TutorialStage::Evolution
            | TutorialStage::Shields
            | TutorialStage::FreePlay => scenario,
        }
    }

    /// Restrict to these action kinds (builder pattern).
    #[must_use]
    pub fn allow_actions(mut self, kinds: &[ActionKind]) -> Self {
        self.allowed_actions = Some(kinds.to_vec());
        self
    }

    /// Restrict to these piece types (builder pattern).
    #[must_use]
    pub fn allow_piece_types(mut self, types: &[&str]) -> Self {
        self.allowed_piece_types = Some(types.iter().map(|t| (*t).to_string()).collect());
        self
    }

    /// Add a lesson hint (builder pattern).
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Check if an action kind is allowed.
    #[must_use]
    pub fn allows_kind(&self, kind: ActionKind) -> bool {
        self.allowed_actions.as_ref().map_or(true, |k| k.contains(&kind))
    }

    /// Check if a piece type may act.
    #[must_use]
    pub fn allows_piece_type(&self, piece_type: &str) -> bool {
        self.allowed_piece_types
            .as_ref()
            .map_or(true, |types| types.iter().any(|t| t == piece_type))
    }
}

impl ActionFilter for Scenario {
    fn permits(&self, board: &Board, action: &Action) -> bool {
        if !self.allows_kind(action.kind()) {
            return false;
        }
        // Unknown actors are left for the rules to reject.
        board
            .piece(action.actor())
            .map_or(true, |p| self.allows_piece_type(&p.piece_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_defaults() {
        let movement = Scenario::for_stage(TutorialStage::Movement);
        assert!(movement.allows_kind(ActionKind::Move));
        assert!(!movement.allows_kind(ActionKind::Ability));

        let combat = Scenario::for_stage(TutorialStage::Combat);
        assert!(combat.allows_kind(ActionKind::Attack));
        assert!(!combat.allows_kind(ActionKind::Ability));

        let free = Scenario::for_stage(TutorialStage::FreePlay);
        assert!(free.allows_kind(ActionKind::Ability));
        assert!(free.allows_piece_type("Anything"));
    }

    #[test]
    fn test_parses_from_json() {
        let lesson: Scenario = serde_json::from_str(
            r#"{ "name": "Pawn drill", "allowedActions": ["attack"], "allowedPieceTypes": ["Pawn"] }"#,
        )
        .unwrap();
        assert!(lesson.allows_kind(ActionKind::Attack));
        assert!(!lesson.allows_kind(ActionKind::Move));
        assert!(!lesson.allows_piece_type("King"));
        assert!(lesson.hints.is_empty());
    }
}
