//! Piece factory.
//!
//! Builds pieces from the active configuration's piece table. The type is
//! looked up by exact key before an id is allocated, so a failed lookup
//! never consumes an id.

use std::sync::Arc;

use tracing::debug;

use super::piece::Piece;
use crate::config::BalanceConfig;
use crate::core::{ParticipantId, PieceIdGenerator, Position, TeamId};
use crate::error::Result;

/// Creates fully-initialized pieces.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use tactics_engine::config::{BalanceConfig, PieceStats};
/// use tactics_engine::core::{PieceIdGenerator, Position, TeamId};
/// use tactics_engine::pieces::PieceFactory;
///
/// let config = Arc::new(BalanceConfig::new().with_piece("Pawn", PieceStats::new(10, 2)));
/// let factory = PieceFactory::new(config, Arc::new(PieceIdGenerator::new()));
///
/// let pawn = factory.create_piece("Pawn", TeamId::new(0), Position::new(0, 0), None).unwrap();
/// assert_eq!(pawn.hp(), 10);
/// assert!(factory.create_piece("Dragon", TeamId::new(0), Position::new(1, 0), None).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct PieceFactory {
    config: Arc<BalanceConfig>,
    ids: Arc<PieceIdGenerator>,
}

impl PieceFactory {
    /// Create a factory over a configuration snapshot and the shared id source.
    pub fn new(config: Arc<BalanceConfig>, ids: Arc<PieceIdGenerator>) -> Self {
        Self { config, ids }
    }

    /// Build a piece of `piece_type`.
    ///
    /// Fails with `ConfigurationLookup` if the type is not configured.
    pub fn create_piece(
        &self,
        piece_type: &str,
        team: TeamId,
        position: Position,
        owner: Option<ParticipantId>,
    ) -> Result<Piece> {
        let stats = self.config.piece_stats(piece_type)?;
        let xp_to_evolve = self.config.xp_to_evolve(piece_type)?;

        let id = self.ids.next_id()?;
        debug!(piece = %id, piece_type, team = %team, position = %position, "Created piece");

        Ok(Piece::from_stats(id, piece_type, team, position, owner, stats, xp_to_evolve))
    }

    /// The configuration snapshot pieces are built from.
    #[must_use]
    pub fn config(&self) -> &Arc<BalanceConfig> {
        &self.config
    }
}
