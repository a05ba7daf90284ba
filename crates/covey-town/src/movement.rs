//! Movement pipeline: location updates and label-driven membership.

use covey_protocol::{PlayerId, UserLocation};

use crate::listener::Notice;
use crate::{Town, TownError};

impl Town {
    /// Stores a player's new location and reconciles their conversation
    /// area.
    ///
    /// The area is resolved from `location.conversation_label` alone; an
    /// absent or unknown label means "no area". Coordinates are never
    /// consulted here. When the resolved area differs from the previous
    /// one, the player leaves the old area (which may destroy it) and
    /// joins the new one, which fires "conversation area updated".
    /// "Player moved" fires on every call.
    ///
    /// # Errors
    /// [`TownError::PlayerNotFound`] if the player is not on the roster.
    pub fn update_player_location(
        &mut self,
        player_id: PlayerId,
        location: UserLocation,
    ) -> Result<(), TownError> {
        let resolved = location
            .conversation_label
            .as_deref()
            .and_then(|label| self.conversation_area(label))
            .map(|area| area.label.clone());

        let player = self
            .player_mut(player_id)
            .ok_or(TownError::PlayerNotFound(player_id))?;
        player.location = location;
        let previous = std::mem::replace(&mut player.active_conversation_area, resolved.clone());

        if resolved != previous {
            if let Some(previous) = previous.as_deref() {
                self.remove_player_from_conversation_area(player_id, previous);
            }
            if let Some(label) = resolved.as_deref() {
                if let Some(area) = self.areas.iter_mut().find(|a| a.label == label) {
                    if !area.is_occupied_by(player_id) {
                        area.occupants_by_id.push(player_id);
                    }
                    tracing::debug!(%player_id, label, "player entered conversation area");
                    self.listeners.notify(Notice::AreaUpdated(&*area));
                }
            }
        }

        if let Some(player) = self.players.iter().find(|p| p.id == player_id) {
            self.listeners.notify(Notice::PlayerMoved(player));
        }
        Ok(())
    }
}
