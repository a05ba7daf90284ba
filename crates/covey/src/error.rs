//! Unified error type for Covey.

use covey_session::SessionError;
use covey_town::{ConfigError, TownError};

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `covey` meta-crate, you deal with this single error type
/// instead of importing errors from each sub-crate.
#[derive(Debug, thiserror::Error)]
pub enum CoveyError {
    /// A session-level error (credential, duplicate player, unknown token).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A town-level error (not found, bad password, rejected area).
    #[error(transparent)]
    Town(#[from] TownError),

    /// Malformed configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
