//! Shared data types for Covey towns.
//!
//! This crate defines the values that every other layer passes around:
//!
//! - **Identity** ([`PlayerId`], [`TownId`]): newtype wrappers so a town
//!   id can never be confused with a player id.
//! - **Wire data** ([`Player`], [`UserLocation`], [`ConversationArea`]):
//!   serializable snapshots that the transport layer forwards to clients.
//! - **Geometry** ([`BoundingBox`], [`boxes_overlap`]): the rectangle
//!   math used to keep conversation areas apart.
//!
//! # Architecture
//!
//! ```text
//! Town (above)      ← owns players, sessions, areas, listeners
//!     ↕
//! Session (above)   ← pairs a PlayerId with a token and a credential
//!     ↕
//! Protocol (this crate) ← plain data, no behavior beyond geometry
//! ```

mod geometry;
mod types;

pub use geometry::{boxes_overlap, BoundingBox};
pub use types::{ConversationArea, Direction, Player, PlayerId, TownId, UserLocation};
