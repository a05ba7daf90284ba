//! # Covey
//!
//! Coordination engine for shared 2D virtual towns.
//!
//! Players join a town, walk around, and gather in conversation areas:
//! labeled rectangles whose occupants share a video call. Covey keeps each
//! town's roster, sessions and areas consistent and tells every subscribed
//! listener what changed. Transports (WebSocket, HTTP) sit on top and are
//! not part of this crate.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covey::prelude::*;
//!
//! # async fn run() -> Result<(), CoveyError> {
//! covey::telemetry::init_tracing();
//! let mut towns = covey::bootstrap(DevCredentialProvider)?;
//!
//! let created = towns.create_town("Plaza", true)?;
//! let joined = towns.join_town(&created.town_id, "ada").await?;
//! towns
//!     .apply_movement(&created.town_id, &joined.session_token, UserLocation::at(10.0, 10.0))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod telemetry;

pub use error::CoveyError;

use covey_session::CredentialProvider;
use covey_town::{TownManager, TownManagerConfig};

/// Builds a [`TownManager`] configured from the environment.
///
/// See [`TownManagerConfig::from_env`] for the variables read. Must be
/// called inside a Tokio runtime when `DEMO_TOWN_ID` is set.
pub fn bootstrap<P: CredentialProvider>(provider: P) -> Result<TownManager<P>, CoveyError> {
    let config = TownManagerConfig::from_env()?;
    bootstrap_with(provider, config)
}

/// Builds a [`TownManager`] from explicit settings.
///
/// When a demo town id is configured, a public town of that name is
/// created up front, so it is reachable under the well-known id.
pub fn bootstrap_with<P: CredentialProvider>(
    provider: P,
    config: TownManagerConfig,
) -> Result<TownManager<P>, CoveyError> {
    let demo = config.demo_town_id.clone();
    let mut manager = TownManager::new(provider, config);

    if let Some(name) = demo {
        let created = manager.create_town(&name, true)?;
        tracing::info!(town_id = %created.town_id, "demo town ready");
    }
    Ok(manager)
}

/// Re-exports everything needed to embed Covey.
pub mod prelude {
    pub use crate::CoveyError;
    pub use covey_protocol::{
        BoundingBox, ConversationArea, Direction, Player, PlayerId, TownId, UserLocation,
        boxes_overlap,
    };
    pub use covey_session::{
        CredentialProvider, DevCredentialProvider, Session, SessionError, SessionState,
    };
    pub use covey_town::{
        AreaRejection, ChannelListener, JoinResponse, ListenerId, TownConfig, TownCreated,
        TownError, TownEvent, TownHandle, TownListener, TownListing, TownManager,
        TownManagerConfig, TownSnapshot,
    };
}
