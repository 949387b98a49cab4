//! Crate-level error type
//!
//! Only *configuration* failures live here: an unregistered mode, a missing
//! asset, a map file that does not parse, or a broken save directory. These are
//! fatal and propagate to `main` with `?`.
//!
//! Expected negative outcomes (not enough gold, item already owned, no save file)
//! are NOT errors. They are explicit sub-states of the shop and title screens.

use crate::game::ModeId;
use crate::save::SaveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// A mode asked to switch to an id the controller has no instance for
    #[error("unknown mode: {0}")]
    UnknownMode(ModeId),

    /// A mode signalled `done` without naming where to go next
    #[error("mode {0} finished without a next mode")]
    MissingNextMode(ModeId),

    #[error("missing asset: {0}")]
    MissingAsset(String),

    #[error("malformed map '{name}': {reason}")]
    MalformedMap { name: String, reason: String },

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GameError::UnknownMode(ModeId::Castle);
        assert_eq!(err.to_string(), "unknown mode: castle");

        let err = GameError::MalformedMap {
            name: "town".to_string(),
            reason: "no start point".to_string(),
        };
        assert_eq!(err.to_string(), "malformed map 'town': no start point");
    }
}
