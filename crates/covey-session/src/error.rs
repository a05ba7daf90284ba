//! Error types for the session layer.

use covey_protocol::PlayerId;

/// Errors that can occur while creating or provisioning a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The external video service could not issue a credential.
    #[error("credential provisioning failed: {0}")]
    CredentialProvisioningFailed(String),

    /// The player already holds a session in this town.
    #[error("player {0} already has a session")]
    AlreadyConnected(PlayerId),

    /// No session matches the given token. It was never issued or has
    /// already been destroyed.
    #[error("unknown session token")]
    UnknownToken,
}
