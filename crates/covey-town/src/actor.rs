//! Town actor: an isolated Tokio task that owns one [`Town`].
//!
//! Each town runs in its own task, communicating with the outside world
//! through an mpsc channel. Commands are handled one at a time and run to
//! completion, so the town never sees interleaved mutations.
//!
//! The one exception is `add_player`. Phase one runs inline, then the
//! credential request is handed to a spawned task and the actor goes back
//! to its mailbox. When the credential arrives, the spawned task posts a
//! `CredentialResolved` command and phase two runs like any other command.
//! Movement, disconnects and area changes therefore keep flowing while a
//! join is provisioning.

use std::sync::Arc;

use covey_protocol::{ConversationArea, Player, PlayerId, TownId, UserLocation};
use covey_session::{CredentialProvider, Session, SessionError};
use tokio::sync::{mpsc, oneshot};

use crate::{ListenerId, Town, TownError, TownListener, TownListing, TownSnapshot};

type Reply<T> = oneshot::Sender<T>;

/// Commands sent to a town actor through its channel.
///
/// Most variants carry a `oneshot::Sender` reply channel: the caller
/// sends the command and waits on the other end.
pub(crate) enum TownCommand {
    AddPlayer {
        player: Player,
        reply: Reply<Result<Session, TownError>>,
    },

    /// Posted by the credential task, never by a handle.
    CredentialResolved {
        token: String,
        result: Result<String, SessionError>,
        reply: Reply<Result<Session, TownError>>,
    },

    DestroySession {
        token: String,
        reply: Reply<Option<Player>>,
    },

    GetSession {
        token: String,
        reply: Reply<Option<Session>>,
    },

    UpdateLocation {
        player_id: PlayerId,
        location: UserLocation,
        reply: Reply<Result<(), TownError>>,
    },

    AddConversationArea {
        area: ConversationArea,
        reply: Reply<Result<(), TownError>>,
    },

    AddListener {
        listener: Box<dyn TownListener>,
        reply: Reply<ListenerId>,
    },

    RemoveListener {
        id: ListenerId,
        reply: Reply<bool>,
    },

    DisconnectAll {
        reply: Reply<()>,
    },

    VerifyPassword {
        password: String,
        reply: Reply<bool>,
    },

    UpdateSettings {
        password: String,
        friendly_name: Option<String>,
        is_publicly_listed: Option<bool>,
        reply: Reply<Result<(), TownError>>,
    },

    Listing {
        reply: Reply<TownListing>,
    },

    Snapshot {
        reply: Reply<TownSnapshot>,
    },

    /// Stop the actor.
    Shutdown,
}

/// Handle to a running town actor.
///
/// Cheap to clone; it is just an `mpsc::Sender` wrapper. The
/// [`TownManager`](crate::TownManager) holds one per town and hands out
/// clones to request handlers.
#[derive(Clone)]
pub struct TownHandle {
    town_id: TownId,
    sender: mpsc::Sender<TownCommand>,
}

impl std::fmt::Debug for TownHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TownHandle")
            .field("town_id", &self.town_id)
            .finish()
    }
}

impl TownHandle {
    pub fn town_id(&self) -> &TownId {
        &self.town_id
    }

    fn unavailable(&self) -> TownError {
        TownError::Unavailable(self.town_id.clone())
    }

    /// Sends a command built around a fresh reply channel and waits for
    /// the answer.
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> TownCommand,
    ) -> Result<T, TownError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Adds a player and waits until their video credential is issued.
    ///
    /// The player is on the roster as soon as the actor handles the
    /// command; this future resolves only after the credential arrives
    /// and the join has been announced.
    ///
    /// # Errors
    /// - [`TownError::Session`] wrapping `CredentialProvisioningFailed`:
    ///   the provider failed; the player and session were rolled back
    /// - [`TownError::Session`] wrapping `UnknownToken`: the session was
    ///   destroyed before the credential arrived
    /// - [`TownError::Session`] wrapping `AlreadyConnected`
    pub async fn add_player(&self, player: Player) -> Result<Session, TownError> {
        self.request(|reply| TownCommand::AddPlayer { player, reply })
            .await?
    }

    /// Destroys a session. Returns the removed player, or `None` if the
    /// session was already gone.
    pub async fn destroy_session(&self, token: &str) -> Result<Option<Player>, TownError> {
        let token = token.to_string();
        self.request(|reply| TownCommand::DestroySession { token, reply })
            .await
    }

    pub async fn get_session(&self, token: &str) -> Result<Option<Session>, TownError> {
        let token = token.to_string();
        self.request(|reply| TownCommand::GetSession { token, reply })
            .await
    }

    pub async fn update_player_location(
        &self,
        player_id: PlayerId,
        location: UserLocation,
    ) -> Result<(), TownError> {
        self.request(|reply| TownCommand::UpdateLocation {
            player_id,
            location,
            reply,
        })
        .await?
    }

    /// Creates a conversation area. Validation failures come back as
    /// [`TownError::AreaRejected`].
    pub async fn add_conversation_area(&self, area: ConversationArea) -> Result<(), TownError> {
        self.request(|reply| TownCommand::AddConversationArea { area, reply })
            .await?
    }

    pub async fn add_listener(&self, listener: impl TownListener) -> Result<ListenerId, TownError> {
        let listener: Box<dyn TownListener> = Box::new(listener);
        self.request(|reply| TownCommand::AddListener { listener, reply })
            .await
    }

    pub async fn remove_listener(&self, id: ListenerId) -> Result<bool, TownError> {
        self.request(|reply| TownCommand::RemoveListener { id, reply })
            .await
    }

    /// Fires "town destroyed" to every listener.
    pub async fn disconnect_all_players(&self) -> Result<(), TownError> {
        self.request(|reply| TownCommand::DisconnectAll { reply })
            .await
    }

    pub async fn verify_password(&self, password: &str) -> Result<bool, TownError> {
        let password = password.to_string();
        self.request(|reply| TownCommand::VerifyPassword { password, reply })
            .await
    }

    pub async fn update_settings(
        &self,
        password: &str,
        friendly_name: Option<String>,
        is_publicly_listed: Option<bool>,
    ) -> Result<(), TownError> {
        let password = password.to_string();
        self.request(|reply| TownCommand::UpdateSettings {
            password,
            friendly_name,
            is_publicly_listed,
            reply,
        })
        .await?
    }

    pub async fn listing(&self) -> Result<TownListing, TownError> {
        self.request(|reply| TownCommand::Listing { reply }).await
    }

    pub async fn snapshot(&self) -> Result<TownSnapshot, TownError> {
        self.request(|reply| TownCommand::Snapshot { reply }).await
    }

    /// Tells the actor to stop.
    pub async fn shutdown(&self) -> Result<(), TownError> {
        self.sender
            .send(TownCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct TownActor<P: CredentialProvider> {
    town: Town,
    provider: Arc<P>,
    receiver: mpsc::Receiver<TownCommand>,
    /// Used by credential tasks to post back. Weak, so dropping every
    /// handle still closes the mailbox.
    mailbox: mpsc::WeakSender<TownCommand>,
}

impl<P: CredentialProvider> TownActor<P> {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        let town_id = self.town.town_id().clone();
        tracing::info!(%town_id, "town actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                TownCommand::AddPlayer { player, reply } => {
                    self.handle_add_player(player, reply);
                }
                TownCommand::CredentialResolved {
                    token,
                    result,
                    reply,
                } => {
                    let outcome = self.handle_credential(&token, result);
                    let _ = reply.send(outcome);
                }
                TownCommand::DestroySession { token, reply } => {
                    let _ = reply.send(self.town.destroy_session(&token));
                }
                TownCommand::GetSession { token, reply } => {
                    let _ = reply.send(self.town.session_by_token(&token).cloned());
                }
                TownCommand::UpdateLocation {
                    player_id,
                    location,
                    reply,
                } => {
                    let _ = reply.send(self.town.update_player_location(player_id, location));
                }
                TownCommand::AddConversationArea { area, reply } => {
                    let result = self.town.add_conversation_area(area).map_err(TownError::from);
                    let _ = reply.send(result);
                }
                TownCommand::AddListener { listener, reply } => {
                    let _ = reply.send(self.town.add_listener(listener));
                }
                TownCommand::RemoveListener { id, reply } => {
                    let _ = reply.send(self.town.remove_listener(id));
                }
                TownCommand::DisconnectAll { reply } => {
                    self.town.disconnect_all_players();
                    let _ = reply.send(());
                }
                TownCommand::VerifyPassword { password, reply } => {
                    let _ = reply.send(self.town.verify_password(&password));
                }
                TownCommand::UpdateSettings {
                    password,
                    friendly_name,
                    is_publicly_listed,
                    reply,
                } => {
                    let result =
                        self.town
                            .update_settings(&password, friendly_name, is_publicly_listed);
                    let _ = reply.send(result);
                }
                TownCommand::Listing { reply } => {
                    let _ = reply.send(self.town.listing());
                }
                TownCommand::Snapshot { reply } => {
                    let _ = reply.send(self.town.snapshot());
                }
                TownCommand::Shutdown => {
                    tracing::info!(%town_id, "town shutting down");
                    break;
                }
            }
        }

        tracing::info!(%town_id, "town actor stopped");
    }

    /// Phase one inline; phase two is posted back by a spawned task.
    fn handle_add_player(&mut self, player: Player, reply: Reply<Result<Session, TownError>>) {
        let player_id = player.id;
        let session = match self.town.begin_join(player) {
            Ok(session) => session,
            Err(e) => {
                let _ = reply.send(Err(e.into()));
                return;
            }
        };
        let Some(mailbox) = self.mailbox.upgrade() else {
            // Every handle is gone; nobody can observe the join.
            self.town.abort_join(&session.token);
            let _ = reply.send(Err(TownError::Unavailable(self.town.town_id().clone())));
            return;
        };

        let provider = Arc::clone(&self.provider);
        let town_id = self.town.town_id().clone();
        tokio::spawn(async move {
            let result = provider.issue_credential(&town_id, player_id).await;
            let resolved = TownCommand::CredentialResolved {
                token: session.token,
                result,
                reply,
            };
            if mailbox.send(resolved).await.is_err() {
                tracing::warn!(%town_id, %player_id, "town stopped before credential arrived");
            }
        });
    }

    fn handle_credential(
        &mut self,
        token: &str,
        result: Result<String, SessionError>,
    ) -> Result<Session, TownError> {
        match result {
            Ok(video_token) => self.town.complete_join(token, video_token).map_err(|e| {
                tracing::warn!(
                    town_id = %self.town.town_id(),
                    "credential arrived for a destroyed session, discarding"
                );
                TownError::from(e)
            }),
            Err(e) => {
                tracing::warn!(
                    town_id = %self.town.town_id(),
                    error = %e,
                    "credential provisioning failed"
                );
                self.town.abort_join(token);
                Err(e.into())
            }
        }
    }
}

/// Spawns a new town actor task and returns a handle to communicate with
/// it.
///
/// `channel_size` controls backpressure: if the channel fills up, senders
/// wait.
pub(crate) fn spawn_town<P: CredentialProvider>(
    town: Town,
    provider: Arc<P>,
    channel_size: usize,
) -> TownHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let town_id = town.town_id().clone();

    let actor = TownActor {
        town,
        provider,
        receiver: rx,
        mailbox: tx.downgrade(),
    };

    tokio::spawn(actor.run());

    TownHandle {
        town_id,
        sender: tx,
    }
}
