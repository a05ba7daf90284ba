//! Error types for the town layer.

use covey_protocol::{PlayerId, TownId};
use covey_session::SessionError;

/// Why a conversation area was not created.
///
/// Checks run in declaration order and stop at the first failure; a
/// rejected area leaves the town untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AreaRejection {
    /// Another area already uses this label.
    #[error("conversation area {0:?} already exists")]
    DuplicateLabel(String),

    #[error("conversation area topic must not be empty")]
    EmptyTopic,

    /// The bounding box overlaps the named existing area.
    #[error("bounding box overlaps conversation area {0:?}")]
    Overlaps(String),
}

/// Errors that can occur during town operations.
#[derive(Debug, thiserror::Error)]
pub enum TownError {
    /// The town does not exist.
    #[error("town {0} not found")]
    NotFound(TownId),

    /// The player is not on this town's roster.
    #[error("player {0} not in town")]
    PlayerNotFound(PlayerId),

    /// The session token does not belong to any session in this town.
    #[error("invalid session token")]
    InvalidSession,

    /// The update password did not match.
    #[error("invalid password for town {0}")]
    InvalidPassword(TownId),

    /// A settings change was malformed (e.g. an empty friendly name).
    #[error("invalid town settings: {0}")]
    InvalidSettings(String),

    /// Session creation or credential provisioning failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    AreaRejected(#[from] AreaRejection),

    /// The town's command channel is full or closed.
    #[error("town {0} is unavailable")]
    Unavailable(TownId),
}

/// Errors raised while loading [`TownManagerConfig`](crate::TownManagerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}
