//! Per-town coordination engine for Covey.
//!
//! Each town runs as an isolated Tokio task (actor model) that owns its
//! roster, sessions, conversation areas and listeners. All mutation goes
//! through the actor's command channel, so no locks guard town state.
//!
//! # Key types
//!
//! - [`Town`]: the synchronous state machine; every invariant lives here
//! - [`TownListener`]: the six callbacks a transport layer implements
//! - [`TownHandle`]: send commands to a running town actor
//! - [`TownManager`]: creates, finds and deletes towns
//! - [`TownConfig`] / [`TownManagerConfig`]: settings

mod actor;
mod areas;
mod config;
mod error;
mod listener;
mod manager;
mod movement;
mod town;

pub use actor::TownHandle;
pub use config::{TownConfig, TownManagerConfig};
pub use error::{AreaRejection, ConfigError, TownError};
pub use listener::{ChannelListener, ListenerId, ListenerRegistry, TownEvent, TownListener};
pub use manager::{JoinResponse, TownCreated, TownManager};
pub use town::{Town, TownListing, TownSnapshot};
