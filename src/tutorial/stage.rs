//! Tutorial stages.

use serde::{Deserialize, Serialize};

/// Ordered tutorial stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TutorialStage {
    /// Board and turn basics.
    Welcome,
    /// Moving pieces.
    Movement,
    /// Basic attacks and kills.
    Combat,
    /// Mana, abilities and cooldowns.
    Abilities,
    /// Experience and evolution.
    Evolution,
    /// King shields and formations.
    Shields,
    /// Unrestricted play.
    FreePlay,
}

impl TutorialStage {
    /// Every stage, in order.
    pub const ALL: [TutorialStage; 7] = [
        TutorialStage::Welcome,
        TutorialStage::Movement,
        TutorialStage::Combat,
        TutorialStage::Abilities,
        TutorialStage::Evolution,
        TutorialStage::Shields,
        TutorialStage::FreePlay,
    ];

    /// The first stage.
    #[must_use]
    pub const fn first() -> Self {
        TutorialStage::Welcome
    }

    /// Position in [`TutorialStage::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The following stage, or `None` at the last one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Fixed hints shown for this stage.
    #[must_use]
    pub fn hints(self) -> &'static [&'static str] {
        match self {
            TutorialStage::Welcome => &[
                "Each turn you may act once with every piece.",
                "End your turn when you are done; the other side moves next.",
            ],
            TutorialStage::Movement => &[
                "Pieces move up to their movement value in any direction, diagonals included.",
                "A piece's first move may go further than later ones.",
            ],
            TutorialStage::Combat => &[
                "Attack enemies within your piece's range.",
                "Shields absorb damage before health does.",
                "Killing an enemy earns experience and mana.",
            ],
            TutorialStage::Abilities => &[
                "Abilities cost mana from your shared pool.",
                "After use, an ability cools down for a few turns.",
                "Area abilities hit every enemy around the target.",
            ],
            TutorialStage::Evolution => &[
                "Pieces that gather enough experience evolve into stronger types.",
                "Extra experience carries over after evolving.",
            ],
            TutorialStage::Shields => &[
                "Your King regenerates shield each turn.",
                "Allies close to the King make its shield regenerate faster.",
            ],
            TutorialStage::FreePlay => &["All rules are active. Good luck!"],
        }
    }
}

impl std::fmt::Display for TutorialStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order() {
        assert_eq!(TutorialStage::first().next(), Some(TutorialStage::Movement));
        assert_eq!(TutorialStage::FreePlay.next(), None);
        assert!(TutorialStage::Combat < TutorialStage::Shields);
        for (i, stage) in TutorialStage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
            assert!(!stage.hints().is_empty());
        }
    }
}
