//! Session types: the server's record of a player admitted to a town.
//!
//! A session ties a [`PlayerId`] to the secret token the client presents on
//! every later request, plus the video credential fetched for it.

use covey_protocol::PlayerId;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where a session is in the join handshake.
///
/// ```text
///   Provisioning ──(credential issued)──→ Active
///        │
///        └──(credential failed / session destroyed)──→ removed
/// ```
///
/// A session is registered in `Provisioning` as soon as the player joins,
/// so the rest of the town can already see the player while the video
/// credential is being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting on the credential provider.
    Provisioning,
    /// Credential issued; the join has been announced.
    Active,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single player's session in a town.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Which player this session belongs to.
    pub player_id: PlayerId,

    /// The secret the client sends to identify itself. Unique within the
    /// town; a 32-character hex string.
    pub token: String,

    /// Opaque video credential. `None` until provisioning finishes.
    pub video_token: Option<String>,

    pub state: SessionState,
}

impl Session {
    pub(crate) fn provisioning(player_id: PlayerId, token: String) -> Self {
        Self {
            player_id,
            token,
            video_token: None,
            state: SessionState::Provisioning,
        }
    }

    /// Returns `true` once the credential has been issued.
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }
}
