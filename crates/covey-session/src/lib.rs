//! Player session management for Covey towns.
//!
//! This crate handles the lifecycle of a player's membership in a town:
//!
//! 1. **Credentials**: fetching a video token from an external service
//!    ([`CredentialProvider`] trait)
//! 2. **Session tracking**: knowing which token belongs to which player
//!    ([`SessionManager`])
//! 3. **Token generation**: random session tokens, town ids and update
//!    passwords ([`token`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Town Layer (above)  ← registers a session per joining player
//!     ↕
//! Session Layer (this crate)  ← token ↔ player bookkeeping
//!     ↕
//! Protocol Layer (below)  ← provides PlayerId, TownId
//! ```

#![allow(async_fn_in_trait)]

mod credential;
mod error;
mod manager;
mod session;
pub mod token;

pub use credential::{CredentialProvider, DevCredentialProvider};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionState};
