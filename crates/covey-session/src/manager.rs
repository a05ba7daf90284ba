//! The session manager: the token registry for one town.
//!
//! It is responsible for:
//! - Minting a unique token when a player joins
//! - Moving a session from `Provisioning` to `Active` once its credential
//!   arrives
//! - Resolving tokens back to sessions
//! - Forgetting sessions when players leave
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself. Each town actor owns one
//! and is the only code that touches it, so plain `HashMap`s suffice.

use std::collections::HashMap;

use covey_protocol::PlayerId;

use crate::token::generate_session_token;
use crate::{Session, SessionError, SessionState};

/// Tracks every session in a town.
///
/// ## Lifecycle
///
/// ```text
/// create() ──→ [Provisioning] ──activate()──→ [Active]
///                    │                           │
///                    └────────── remove() ───────┘
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    /// All sessions, keyed by token.
    sessions: HashMap<String, Session>,

    /// Index from player to their token, kept in sync with `sessions`.
    players: HashMap<PlayerId, String>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new `Provisioning` session for a player.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyConnected`] if the player already
    /// holds a session in this town.
    pub fn create(&mut self, player_id: PlayerId) -> Result<&Session, SessionError> {
        if self.players.contains_key(&player_id) {
            return Err(SessionError::AlreadyConnected(player_id));
        }

        let mut token = generate_session_token();
        while self.sessions.contains_key(&token) {
            token = generate_session_token();
        }

        self.players.insert(player_id, token.clone());
        let session = self
            .sessions
            .entry(token.clone())
            .or_insert(Session::provisioning(player_id, token));

        tracing::debug!(%player_id, "session registered, awaiting credential");
        Ok(&*session)
    }

    /// Stores the video credential and marks the session `Active`.
    ///
    /// # Errors
    /// Returns [`SessionError::UnknownToken`] if the session was removed
    /// while its credential was in flight.
    pub fn activate(&mut self, token: &str, video_token: String) -> Result<&Session, SessionError> {
        let session = self
            .sessions
            .get_mut(token)
            .ok_or(SessionError::UnknownToken)?;

        session.video_token = Some(video_token);
        session.state = SessionState::Active;
        Ok(&*session)
    }

    /// Removes a session. Returns `None` if it was already gone.
    pub fn remove(&mut self, token: &str) -> Option<Session> {
        let session = self.sessions.remove(token)?;
        self.players.remove(&session.player_id);
        Some(session)
    }

    /// Looks up a session by token.
    pub fn get(&self, token: &str) -> Option<&Session> {
        self.sessions.get(token)
    }

    /// Looks up a session by the player that owns it.
    pub fn get_by_player(&self, player_id: &PlayerId) -> Option<&Session> {
        let token = self.players.get(player_id)?;
        self.sessions.get(token)
    }

    /// Returns the number of sessions (any state).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionManager`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.

    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    // =====================================================================
    // create()
    // =====================================================================

    #[test]
    fn test_create_new_player_returns_provisioning_session() {
        let mut mgr = SessionManager::new();

        let session = mgr.create(pid(1)).expect("should succeed");

        assert_eq!(session.state, SessionState::Provisioning);
        assert_eq!(session.player_id, pid(1));
        assert_eq!(session.token.len(), 32);
        assert!(session.video_token.is_none());
    }

    #[test]
    fn test_create_multiple_players_each_gets_unique_token() {
        let mut mgr = SessionManager::new();

        let token1 = mgr.create(pid(1)).unwrap().token.clone();
        let token2 = mgr.create(pid(2)).unwrap().token.clone();

        assert_ne!(token1, token2, "tokens must be unique per player");
    }

    #[test]
    fn test_create_same_player_twice_returns_already_connected() {
        let mut mgr = SessionManager::new();
        mgr.create(pid(1)).unwrap();

        let result = mgr.create(pid(1));

        assert!(matches!(result, Err(SessionError::AlreadyConnected(p)) if p == pid(1)));
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_create_after_remove_is_allowed() {
        let mut mgr = SessionManager::new();
        let token = mgr.create(pid(1)).unwrap().token.clone();
        mgr.remove(&token);

        assert!(mgr.create(pid(1)).is_ok());
    }

    // =====================================================================
    // activate()
    // =====================================================================

    #[test]
    fn test_activate_stores_credential_and_marks_active() {
        let mut mgr = SessionManager::new();
        let token = mgr.create(pid(1)).unwrap().token.clone();

        let session = mgr.activate(&token, "video".into()).expect("should succeed");

        assert!(session.is_active());
        assert_eq!(session.video_token.as_deref(), Some("video"));
    }

    #[test]
    fn test_activate_removed_session_returns_unknown_token() {
        let mut mgr = SessionManager::new();
        let token = mgr.create(pid(1)).unwrap().token.clone();
        mgr.remove(&token);

        let result = mgr.activate(&token, "late".into());

        assert!(matches!(result, Err(SessionError::UnknownToken)));
        assert!(mgr.is_empty(), "late credential must not resurrect the session");
    }

    // =====================================================================
    // remove() / get()
    // =====================================================================

    #[test]
    fn test_remove_twice_returns_none_second_time() {
        let mut mgr = SessionManager::new();
        let token = mgr.create(pid(1)).unwrap().token.clone();

        assert!(mgr.remove(&token).is_some());
        assert!(mgr.remove(&token).is_none());
    }

    #[test]
    fn test_remove_clears_player_index() {
        let mut mgr = SessionManager::new();
        let token = mgr.create(pid(1)).unwrap().token.clone();

        mgr.remove(&token);

        assert!(mgr.get_by_player(&pid(1)).is_none());
    }

    #[test]
    fn test_get_unknown_token_returns_none() {
        let mgr = SessionManager::new();
        assert!(mgr.get("nope").is_none());
    }

    #[test]
    fn test_get_by_player_finds_session() {
        let mut mgr = SessionManager::new();
        let token = mgr.create(pid(3)).unwrap().token.clone();

        let session = mgr.get_by_player(&pid(3)).expect("should exist");

        assert_eq!(session.token, token);
        assert_eq!(mgr.get(&token), Some(session));
    }
}
