//! Hook for provisioning per-player video credentials.
//!
//! Covey doesn't talk to a video service itself. Instead it defines the
//! [`CredentialProvider`] trait: a single async method that takes a town
//! and a player and returns an opaque token the client uses to join the
//! town's video room. Production code wraps the real service; tests use a
//! mock that can be made to fail or to stall.

use covey_protocol::{PlayerId, TownId};

use crate::token;
use crate::SessionError;

/// Issues video credentials for players joining a town.
///
/// # Trait bounds
///
/// - `Send + Sync` → the provider is shared across the town actors and the
///   tasks that await credentials on their behalf.
/// - `'static` → it lives as long as the town registry.
///
/// # Example
///
/// ```rust
/// use covey_protocol::{PlayerId, TownId};
/// use covey_session::{CredentialProvider, SessionError};
///
/// /// Refuses every request. Handy for exercising the failure path.
/// struct Offline;
///
/// impl CredentialProvider for Offline {
///     async fn issue_credential(
///         &self,
///         _town_id: &TownId,
///         _player_id: PlayerId,
///     ) -> Result<String, SessionError> {
///         Err(SessionError::CredentialProvisioningFailed(
///             "video service offline".into(),
///         ))
///     }
/// }
/// ```
pub trait CredentialProvider: Send + Sync + 'static {
    /// Requests a credential for `player_id` in `town_id`.
    ///
    /// # Returns
    /// - `Ok(token)`: the opaque credential to hand to the client
    /// - `Err(SessionError::CredentialProvisioningFailed)`: the service
    ///   refused or could not be reached
    fn issue_credential(
        &self,
        town_id: &TownId,
        player_id: PlayerId,
    ) -> impl std::future::Future<Output = Result<String, SessionError>> + Send;
}

/// Mints local, random credentials without calling any service.
///
/// Only for development and tests: the tokens it returns are not
/// accepted by any real video backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevCredentialProvider;

impl CredentialProvider for DevCredentialProvider {
    async fn issue_credential(
        &self,
        town_id: &TownId,
        player_id: PlayerId,
    ) -> Result<String, SessionError> {
        Ok(format!(
            "dev-{town_id}-{}-{}",
            player_id.0,
            token::generate_session_token()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dev_provider_embeds_town_and_player() {
        let town = TownId::from("ABCD1234");

        let credential = DevCredentialProvider
            .issue_credential(&town, PlayerId(7))
            .await
            .expect("dev provider never fails");

        assert!(credential.starts_with("dev-ABCD1234-7-"));
    }

    #[tokio::test]
    async fn test_dev_provider_tokens_differ_per_call() {
        let town = TownId::from("T");
        let a = DevCredentialProvider.issue_credential(&town, PlayerId(1)).await.unwrap();
        let b = DevCredentialProvider.issue_credential(&town, PlayerId(1)).await.unwrap();
        assert_ne!(a, b);
    }
}
