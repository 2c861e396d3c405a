//! Tutorial state machine.
//!
//! Stages advance one way only. Advancing from the last stage completes
//! the tutorial; after that every mutator is a no-op. Progress is derived
//! from the stage index and never goes down.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::scenario::Scenario;
use super::stage::TutorialStage;
use crate::core::{Action, TeamId};
use crate::error::Result;
use crate::rules::ActionOutcome;
use crate::session::GameSession;

/// Evolution progress at which the "close to evolving" hint appears.
const NEAR_EVOLUTION: f64 = 0.75;

/// A player's tutorial state.
///
/// ## Example
///
/// ```
/// use tactics_engine::tutorial::{TutorialMode, TutorialStage};
///
/// let mut tutorial = TutorialMode::new();
/// assert_eq!(tutorial.stage(), TutorialStage::Welcome);
///
/// while !tutorial.is_completed() {
///     tutorial.advance_to_next_stage();
/// }
/// assert_eq!(tutorial.progress(), 100);
/// assert!(!tutorial.advance_to_next_stage());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorialMode {
    stage: TutorialStage,
    progress: u8,
    show_hints: bool,
    completed: bool,
    scenario: Scenario,
}

impl Default for TutorialMode {
    fn default() -> Self {
        Self::new()
    }
}

impl TutorialMode {
    /// Start at the first stage with hints on.
    #[must_use]
    pub fn new() -> Self {
        let stage = TutorialStage::first();
        Self {
            stage,
            progress: 0,
            show_hints: true,
            completed: false,
            scenario: Scenario::for_stage(stage),
        }
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> TutorialStage {
        self.stage
    }

    /// Progress, 0-100.
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Check if the tutorial is finished.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Check if hints are shown.
    #[must_use]
    pub fn show_hints(&self) -> bool {
        self.show_hints
    }

    /// The active scenario.
    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Show or hide hints. Ignored once completed.
    pub fn set_show_hints(&mut self, show: bool) {
        if !self.completed {
            self.show_hints = show;
        }
    }

    /// Move to the next stage, completing the tutorial after the last one.
    ///
    /// Returns `false` (and changes nothing) if already completed.
    pub fn advance_to_next_stage(&mut self) -> bool {
        if self.completed {
            debug!("Tutorial already completed; advance ignored");
            return false;
        }

        match self.stage.next() {
            Some(next) => {
                self.stage = next;
                self.scenario = Scenario::for_stage(next);
                let derived = next.index() * 100 / TutorialStage::ALL.len();
                self.progress = self.progress.max(derived as u8);
                info!(stage = %next, progress = self.progress, "Tutorial advanced");
            }
            None => {
                self.completed = true;
                self.progress = 100;
                info!("Tutorial completed");
            }
        }
        true
    }

    /// Replace the active scenario. Returns `false` if already completed.
    pub fn set_active_scenario(&mut self, scenario: Scenario) -> bool {
        if self.completed {
            return false;
        }
        debug!(scenario = %scenario.name, "Tutorial scenario set");
        self.scenario = scenario;
        true
    }

    /// Perform an action under the active scenario's restrictions.
    pub fn perform(&self, session: &mut GameSession, action: Action) -> Result<ActionOutcome> {
        session.perform_filtered(action, &self.scenario)
    }

    /// Fixed hints for `stage`.
    #[must_use]
    pub fn hints_for_stage(&self, stage: TutorialStage) -> Vec<String> {
        stage.hints().iter().map(|h| (*h).to_string()).collect()
    }

    /// Scenario hints plus hints about `team`'s situation in `session`.
    ///
    /// Empty when hints are hidden or the tutorial is completed.
    #[must_use]
    pub fn contextual_hints(&self, session: &GameSession, team: TeamId) -> Vec<String> {
        if !self.show_hints || self.completed {
            return Vec::new();
        }

        let board = session.board();
        let config = session.config();
        let mut hints = self.scenario.hints.clone();
        let mut push = |hint: String| {
            if !hints.contains(&hint) {
                hints.push(hint);
            }
        };

        for piece in board.pieces_of(team) {
            if piece.xp_to_evolve() > 0 && piece.evolution_progress() >= NEAR_EVOLUTION {
                push(format!("Your {} is close to evolving.", piece.piece_type));
            }

            let in_reach = board
                .pieces()
                .filter(|e| e.team != team && e.is_alive())
                .find(|e| piece.position.distance(e.position) <= piece.range);
            if let Some(enemy) = in_reach {
                push(format!("Your {} can attack the enemy {}.", piece.piece_type, enemy.piece_type));
            }

            if piece.piece_type == config.shield_system.king_type
                && piece.max_shield_hp() > 0
                && piece.shield_hp() * 2 < piece.max_shield_hp()
            {
                push("Keep allies near your King to rebuild its shield.".to_string());
            }
        }

        if board.side_to_move == team {
            let rules = session.rules();
            for id in board.piece_ids_of(team) {
                for action in rules.legal_actions_for(board, id) {
                    if let Action::UseAbility { ability, .. } = action {
                        push(format!("{ability} is ready to use."));
                    }
                }
            }
        }

        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic() {
        let mut tutorial = TutorialMode::new();
        let mut last = tutorial.progress();
        while tutorial.advance_to_next_stage() {
            assert!(tutorial.progress() >= last);
            last = tutorial.progress();
        }
        assert!(tutorial.is_completed());
        assert_eq!(tutorial.stage(), TutorialStage::FreePlay);
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut tutorial = TutorialMode::new();
        while tutorial.advance_to_next_stage() {}
        let before = tutorial.clone();

        assert!(!tutorial.set_active_scenario(Scenario::new("late")));
        tutorial.set_show_hints(false);
        assert!(!tutorial.advance_to_next_stage());
        assert_eq!(tutorial, before);
    }

    #[test]
    fn test_advance_swaps_scenario() {
        let mut tutorial = TutorialMode::new();
        tutorial.set_active_scenario(Scenario::new("custom"));
        tutorial.advance_to_next_stage();
        assert_eq!(tutorial.scenario().name, "Movement");
        assert_eq!(tutorial.progress(), 14);
    }
}
