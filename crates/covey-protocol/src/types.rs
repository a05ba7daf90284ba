//! Identity and wire data types shared by every Covey layer.
//!
//! Everything here derives `Serialize`/`Deserialize` so the transport
//! layer can forward snapshots to clients without a second set of DTOs.
//! Field names are camelCase on the wire to match the browser client.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::BoundingBox;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Serialized as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The identifier of a town (one coordination room).
///
/// Town ids are short random strings handed out by the town registry,
/// so unlike [`PlayerId`] this wraps a `String`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TownId(pub String);

impl TownId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TownId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TownId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Which way a player's avatar is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Front,
    Back,
    Left,
    Right,
}

/// A player's position as reported by their client.
///
/// `conversation_label` is the client's claim about which conversation
/// area it is standing in. Movement resolves membership from this label
/// only, never from `x`/`y`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocation {
    pub x: f64,
    pub y: f64,
    pub rotation: Direction,
    pub moving: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_label: Option<String>,
}

impl UserLocation {
    /// A stationary, front-facing location at `(x, y)` outside any area.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Returns this location tagged with a conversation label.
    pub fn in_conversation(mut self, label: impl Into<String>) -> Self {
        self.conversation_label = Some(label.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A participant in a town.
///
/// `active_conversation_area` is a label lookup into the town's area
/// collection, not an owning reference. The town keeps it consistent with
/// each area's occupant list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub user_name: String,
    pub location: UserLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_conversation_area: Option<String>,
}

impl Player {
    /// Creates a player standing at the origin, outside any area.
    pub fn new(id: PlayerId, user_name: impl Into<String>) -> Self {
        Self {
            id,
            user_name: user_name.into(),
            location: UserLocation::default(),
            active_conversation_area: None,
        }
    }

    /// Returns `true` if the player's current position is strictly inside
    /// the area's bounding box.
    pub fn is_within(&self, area: &ConversationArea) -> bool {
        area.bounding_box.contains(self.location.x, self.location.y)
    }
}

// ---------------------------------------------------------------------------
// ConversationArea
// ---------------------------------------------------------------------------

/// A labeled rectangular region that players can gather in.
///
/// `occupants_by_id` keeps insertion order and never holds the same id
/// twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationArea {
    pub label: String,
    pub topic: String,
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub occupants_by_id: Vec<PlayerId>,
}

impl ConversationArea {
    /// Creates an empty area.
    pub fn new(label: impl Into<String>, topic: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            label: label.into(),
            topic: topic.into(),
            bounding_box,
            occupants_by_id: Vec::new(),
        }
    }

    pub fn is_occupied_by(&self, player_id: PlayerId) -> bool {
        self.occupants_by_id.contains(&player_id)
    }
}
