//! The town state machine: roster, sessions and metadata.
//!
//! `Town` is plain synchronous state. It is owned by exactly one actor
//! task (see [`crate::TownHandle`]), which is what serializes every
//! mutation; the methods here never await.
//!
//! The conversation area engine and the movement pipeline are further
//! `impl Town` blocks in `areas.rs` and `movement.rs`.

use covey_protocol::{ConversationArea, Player, PlayerId, TownId};
use covey_session::{Session, SessionError, SessionManager};
use serde::Serialize;

use crate::listener::Notice;
use crate::{ListenerId, ListenerRegistry, TownConfig, TownError, TownListener};

/// A summary of a town returned in town listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TownListing {
    pub town_id: TownId,
    pub friendly_name: String,
    pub current_occupancy: usize,
    pub maximum_occupancy: usize,
}

/// A full copy of a town's observable state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TownSnapshot {
    pub town_id: TownId,
    pub friendly_name: String,
    pub is_publicly_listed: bool,
    pub capacity: usize,
    pub occupancy: usize,
    pub players: Vec<Player>,
    pub conversation_areas: Vec<ConversationArea>,
}

/// One coordination domain: its players, their sessions, the live
/// conversation areas and the listeners watching them.
///
/// Invariants, holding between any two method calls:
/// - session tokens and area labels are unique;
/// - no two area bounding boxes overlap;
/// - an area's occupant list is exactly the set of players whose
///   `active_conversation_area` names it;
/// - an area that loses its last occupant is removed in the same call.
///
/// An area created with nobody inside it is kept until it gains and then
/// loses an occupant.
#[derive(Debug)]
pub struct Town {
    town_id: TownId,
    update_password: String,
    pub(crate) config: TownConfig,
    /// Roster in join order.
    pub(crate) players: Vec<Player>,
    pub(crate) sessions: SessionManager,
    /// Live areas in creation order.
    pub(crate) areas: Vec<ConversationArea>,
    pub(crate) listeners: ListenerRegistry,
}

impl Town {
    pub fn new(town_id: TownId, update_password: impl Into<String>, config: TownConfig) -> Self {
        Self {
            town_id,
            update_password: update_password.into(),
            config,
            players: Vec::new(),
            sessions: SessionManager::new(),
            areas: Vec::new(),
            listeners: ListenerRegistry::new(),
        }
    }

    // -- Metadata ---------------------------------------------------------

    pub fn town_id(&self) -> &TownId {
        &self.town_id
    }

    pub fn friendly_name(&self) -> &str {
        &self.config.friendly_name
    }

    pub fn is_publicly_listed(&self) -> bool {
        self.config.is_publicly_listed
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Number of subscribed listeners. The transport layer registers one
    /// per connected client, so this is the number of open connections.
    pub fn occupancy(&self) -> usize {
        self.listeners.len()
    }

    pub fn verify_password(&self, password: &str) -> bool {
        self.update_password == password
    }

    /// Changes the friendly name and/or listing flag.
    ///
    /// # Errors
    /// - [`TownError::InvalidPassword`]: `password` does not match
    /// - [`TownError::InvalidSettings`]: the new friendly name is empty
    pub fn update_settings(
        &mut self,
        password: &str,
        friendly_name: Option<String>,
        is_publicly_listed: Option<bool>,
    ) -> Result<(), TownError> {
        if !self.verify_password(password) {
            return Err(TownError::InvalidPassword(self.town_id.clone()));
        }
        if friendly_name.as_deref().is_some_and(str::is_empty) {
            return Err(TownError::InvalidSettings(
                "friendly name must not be empty".into(),
            ));
        }

        if let Some(name) = friendly_name {
            self.config.friendly_name = name;
        }
        if let Some(public) = is_publicly_listed {
            self.config.is_publicly_listed = public;
        }
        tracing::info!(town_id = %self.town_id, "town settings updated");
        Ok(())
    }

    pub fn listing(&self) -> TownListing {
        TownListing {
            town_id: self.town_id.clone(),
            friendly_name: self.config.friendly_name.clone(),
            current_occupancy: self.occupancy(),
            maximum_occupancy: self.config.capacity,
        }
    }

    pub fn snapshot(&self) -> TownSnapshot {
        TownSnapshot {
            town_id: self.town_id.clone(),
            friendly_name: self.config.friendly_name.clone(),
            is_publicly_listed: self.config.is_publicly_listed,
            capacity: self.config.capacity,
            occupancy: self.occupancy(),
            players: self.players.clone(),
            conversation_areas: self.areas.clone(),
        }
    }

    // -- Lookups ----------------------------------------------------------

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub(crate) fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn conversation_areas(&self) -> &[ConversationArea] {
        &self.areas
    }

    pub fn conversation_area(&self, label: &str) -> Option<&ConversationArea> {
        self.areas.iter().find(|a| a.label == label)
    }

    /// Fetches a session by token. Returns `None` for unknown tokens.
    pub fn session_by_token(&self, token: &str) -> Option<&Session> {
        self.sessions.get(token)
    }

    // -- Listeners --------------------------------------------------------

    pub fn add_listener(&mut self, listener: Box<dyn TownListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Unsubscribes a listener. A handle that is not registered is a no-op.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // -- Roster & sessions ------------------------------------------------

    /// Phase one of a join: puts the player on the roster and registers a
    /// `Provisioning` session for them.
    ///
    /// From here until [`complete_join`](Self::complete_join) or
    /// [`abort_join`](Self::abort_join) the player is visible to area
    /// seeding and can move, but no join event has fired.
    ///
    /// # Errors
    /// [`SessionError::AlreadyConnected`] if the player id is already on
    /// the roster.
    pub fn begin_join(&mut self, player: Player) -> Result<Session, SessionError> {
        let session = self.sessions.create(player.id)?.clone();
        tracing::info!(
            town_id = %self.town_id,
            player_id = %player.id,
            "player registered, provisioning credential"
        );
        self.players.push(player);
        Ok(session)
    }

    /// Phase two of a join: stores the video credential, activates the
    /// session and announces the player to every listener.
    ///
    /// # Errors
    /// [`SessionError::UnknownToken`] if the session was destroyed while
    /// the credential was in flight. Nothing fires in that case.
    pub fn complete_join(&mut self, token: &str, video_token: String) -> Result<Session, SessionError> {
        let session = self.sessions.activate(token, video_token)?.clone();

        if let Some(player) = self.players.iter().find(|p| p.id == session.player_id) {
            tracing::info!(
                town_id = %self.town_id,
                player_id = %player.id,
                players = self.players.len(),
                "player joined"
            );
            self.listeners.notify(Notice::PlayerJoined(player));
        }
        Ok(session)
    }

    /// Rolls back a join whose credential could not be provisioned.
    ///
    /// Removes the session and the player, and takes the player out of any
    /// area they entered meanwhile. No disconnect event fires: the join
    /// was never announced. Returns `None` if the session was already gone.
    pub fn abort_join(&mut self, token: &str) -> Option<Player> {
        let session = self.sessions.remove(token)?;
        let player = self.take_player(session.player_id)?;
        tracing::warn!(
            town_id = %self.town_id,
            player_id = %player.id,
            "join rolled back after credential failure"
        );
        if let Some(label) = player.active_conversation_area.as_deref() {
            self.remove_player_from_conversation_area(player.id, label);
        }
        Some(player)
    }

    /// Destroys a session and its player.
    ///
    /// Fires "player disconnected" to every listener, then takes the
    /// player out of their conversation area, if any. Destroying a session
    /// that is already gone does nothing and returns `None`.
    pub fn destroy_session(&mut self, token: &str) -> Option<Player> {
        let Some(session) = self.sessions.remove(token) else {
            tracing::debug!(town_id = %self.town_id, "destroy_session on unknown token ignored");
            return None;
        };
        let player = self.take_player(session.player_id)?;

        tracing::info!(
            town_id = %self.town_id,
            player_id = %player.id,
            players = self.players.len(),
            "player left"
        );
        self.listeners.notify(Notice::PlayerDisconnected(&player));

        if let Some(label) = player.active_conversation_area.as_deref() {
            self.remove_player_from_conversation_area(player.id, label);
        }
        Some(player)
    }

    /// Tells every listener the town is closing.
    ///
    /// State is left as is; the owner drops the town right after.
    pub fn disconnect_all_players(&mut self) {
        tracing::info!(town_id = %self.town_id, "town closing, disconnecting listeners");
        self.listeners.notify(Notice::TownDestroyed);
    }

    fn take_player(&mut self, player_id: PlayerId) -> Option<Player> {
        let pos = self.players.iter().position(|p| p.id == player_id)?;
        Some(self.players.remove(pos))
    }
}

// =========================================================================
// Tests
// =========================================================================
