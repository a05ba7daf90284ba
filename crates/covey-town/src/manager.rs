//! Town manager: creates, tracks, and routes requests to towns.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use covey_protocol::{ConversationArea, Player, PlayerId, TownId, UserLocation};
use covey_session::{CredentialProvider, token};
use serde::Serialize;

use crate::actor::spawn_town;
use crate::{Town, TownConfig, TownError, TownHandle, TownListing, TownManagerConfig};

/// Counter for generating unique player IDs across all towns.
static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// What the creator of a town gets back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TownCreated {
    pub town_id: TownId,
    /// Required to rename, relist or delete the town.
    pub update_password: String,
}

/// Everything a client needs right after joining a town.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub user_id: PlayerId,
    pub session_token: String,
    pub provider_video_token: Option<String>,
    pub current_players: Vec<Player>,
    pub friendly_name: String,
    pub is_publicly_listed: bool,
    pub conversation_areas: Vec<ConversationArea>,
}

/// Manages all live towns.
///
/// This is the entry point for the request layer: it owns one
/// [`TownHandle`] per town and checks passwords and session tokens before
/// forwarding work to the town's actor.
pub struct TownManager<P: CredentialProvider> {
    towns: HashMap<TownId, TownHandle>,
    provider: Arc<P>,
    config: TownManagerConfig,
}

impl<P: CredentialProvider> TownManager<P> {
    pub fn new(provider: P, config: TownManagerConfig) -> Self {
        Self {
            towns: HashMap::new(),
            provider: Arc::new(provider),
            config,
        }
    }

    pub fn config(&self) -> &TownManagerConfig {
        &self.config
    }

    /// Creates a town and spawns its actor.
    ///
    /// The id is random unless `friendly_name` equals the configured demo
    /// town id and that id is still free.
    ///
    /// # Errors
    /// [`TownError::InvalidSettings`] if `friendly_name` is empty.
    pub fn create_town(
        &mut self,
        friendly_name: &str,
        is_publicly_listed: bool,
    ) -> Result<TownCreated, TownError> {
        if friendly_name.is_empty() {
            return Err(TownError::InvalidSettings(
                "friendly name must not be empty".into(),
            ));
        }

        let town_id = self.allocate_town_id(friendly_name);
        let update_password = token::generate_update_password();
        let config = TownConfig {
            capacity: self.config.default_capacity,
            ..TownConfig::new(friendly_name, is_publicly_listed)
        };

        let town = Town::new(town_id.clone(), update_password.clone(), config);
        let handle = spawn_town(town, Arc::clone(&self.provider), self.config.channel_size);
        self.towns.insert(town_id.clone(), handle);
        tracing::info!(%town_id, friendly_name, is_publicly_listed, "town created");

        Ok(TownCreated {
            town_id,
            update_password,
        })
    }

    fn allocate_town_id(&self, friendly_name: &str) -> TownId {
        if let Some(demo) = self.config.demo_town_id.as_deref() {
            let demo = TownId::from(demo);
            if demo.as_str() == friendly_name && !self.towns.contains_key(&demo) {
                return demo;
            }
        }
        loop {
            let id = TownId(token::generate_town_id());
            if !self.towns.contains_key(&id) {
                return id;
            }
        }
    }

    /// Returns a handle to a town.
    pub fn town(&self, town_id: &TownId) -> Result<TownHandle, TownError> {
        self.towns
            .get(town_id)
            .cloned()
            .ok_or_else(|| TownError::NotFound(town_id.clone()))
    }

    /// Lists every publicly listed town.
    ///
    /// Towns that fail to respond (e.g., shutting down) are skipped.
    pub async fn list_public_towns(&self) -> Vec<TownListing> {
        let mut listings = Vec::with_capacity(self.towns.len());
        for handle in self.towns.values() {
            match handle.snapshot().await {
                Ok(snapshot) if snapshot.is_publicly_listed => listings.push(TownListing {
                    town_id: snapshot.town_id,
                    friendly_name: snapshot.friendly_name,
                    current_occupancy: snapshot.occupancy,
                    maximum_occupancy: snapshot.capacity,
                }),
                Ok(_) => {}
                Err(e) => tracing::warn!(town_id = %handle.town_id(), error = %e, "skipping town"),
            }
        }
        listings
    }

    /// Renames and/or relists a town.
    ///
    /// # Errors
    /// - [`TownError::NotFound`]
    /// - [`TownError::InvalidPassword`]
    /// - [`TownError::InvalidSettings`] if the new name is empty
    pub async fn update_town(
        &self,
        town_id: &TownId,
        password: &str,
        friendly_name: Option<String>,
        is_publicly_listed: Option<bool>,
    ) -> Result<(), TownError> {
        self.town(town_id)?
            .update_settings(password, friendly_name, is_publicly_listed)
            .await
    }

    /// Closes a town: every listener hears "town destroyed", then the
    /// actor stops and the town is forgotten.
    pub async fn delete_town(&mut self, town_id: &TownId, password: &str) -> Result<(), TownError> {
        let handle = self.town(town_id)?;
        if !handle.verify_password(password).await? {
            tracing::debug!(%town_id, "delete rejected: wrong password");
            return Err(TownError::InvalidPassword(town_id.clone()));
        }

        handle.disconnect_all_players().await?;
        let _ = handle.shutdown().await;
        self.towns.remove(town_id);

        tracing::info!(%town_id, "town deleted");
        Ok(())
    }

    /// Admits a new player under `user_name` and waits for their video
    /// credential.
    ///
    /// On success the player is active and every listener has heard
    /// "player joined". If the credential cannot be issued, the player is
    /// rolled back and the provider's error is returned.
    pub async fn join_town(&self, town_id: &TownId, user_name: &str) -> Result<JoinResponse, TownError> {
        let handle = self.town(town_id)?;
        let player_id = PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed));

        let session = handle.add_player(Player::new(player_id, user_name)).await?;
        let snapshot = handle.snapshot().await?;
        tracing::info!(%town_id, %player_id, user_name, "player joined town");

        Ok(JoinResponse {
            user_id: player_id,
            session_token: session.token,
            provider_video_token: session.video_token,
            current_players: snapshot.players,
            friendly_name: snapshot.friendly_name,
            is_publicly_listed: snapshot.is_publicly_listed,
            conversation_areas: snapshot.conversation_areas,
        })
    }

    /// Creates a conversation area on behalf of a connected client.
    ///
    /// # Errors
    /// [`TownError::InvalidSession`] if `session_token` is unknown, otherwise
    /// whatever the area engine rejects.
    pub async fn create_conversation_area(
        &self,
        town_id: &TownId,
        session_token: &str,
        area: ConversationArea,
    ) -> Result<(), TownError> {
        let handle = self.town(town_id)?;
        if handle.get_session(session_token).await?.is_none() {
            tracing::debug!(%town_id, label = %area.label, "area rejected: unknown session");
            return Err(TownError::InvalidSession);
        }
        handle.add_conversation_area(area).await
    }

    /// Applies a movement report from the client holding `session_token`.
    pub async fn apply_movement(
        &self,
        town_id: &TownId,
        session_token: &str,
        location: UserLocation,
    ) -> Result<(), TownError> {
        let handle = self.town(town_id)?;
        let session = handle
            .get_session(session_token)
            .await?
            .ok_or(TownError::InvalidSession)?;
        handle.update_player_location(session.player_id, location).await
    }

    /// Ends the session behind `session_token`. Returns the departed
    /// player, or `None` if the session was already gone.
    pub async fn leave_town(
        &self,
        town_id: &TownId,
        session_token: &str,
    ) -> Result<Option<Player>, TownError> {
        let left = self.town(town_id)?.destroy_session(session_token).await?;
        if let Some(player) = &left {
            tracing::info!(%town_id, player_id = %player.id, "player left town");
        }
        Ok(left)
    }

    /// Returns the number of live towns.
    pub fn town_count(&self) -> usize {
        self.towns.len()
    }

    /// Lists all live town IDs.
    pub fn town_ids(&self) -> Vec<TownId> {
        self.towns.keys().cloned().collect()
    }
}
