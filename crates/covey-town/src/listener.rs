//! Listener fan-out: the town's synchronous event bus.
//!
//! The transport layer subscribes a [`TownListener`] per connected client.
//! Every state change the town makes is reported to every registered
//! listener, inline, in subscription order. There is no retry and no
//! buffering beyond what a listener does itself, so a slow listener stalls
//! its town.

use std::collections::BTreeMap;

use covey_protocol::{ConversationArea, Player};
use serde::Serialize;
use tokio::sync::mpsc;

/// Receives domain events from one town.
///
/// Callbacks run on the town's actor task and must not block.
pub trait TownListener: Send + 'static {
    /// A player finished joining (their credential was issued).
    fn on_player_joined(&mut self, player: &Player);

    /// A player reported a new location.
    fn on_player_moved(&mut self, player: &Player);

    /// A player's session was destroyed.
    fn on_player_disconnected(&mut self, player: &Player);

    /// An area was created or its occupant list changed.
    fn on_conversation_area_updated(&mut self, area: &ConversationArea);

    /// An area lost its last occupant and was removed.
    fn on_conversation_area_destroyed(&mut self, area: &ConversationArea);

    /// The town is closing; the listener will receive nothing further.
    fn on_town_destroyed(&mut self);
}

/// Stable handle returned by [`ListenerRegistry::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Borrowed view of an event, dispatched without cloning.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Notice<'a> {
    PlayerJoined(&'a Player),
    PlayerMoved(&'a Player),
    PlayerDisconnected(&'a Player),
    AreaUpdated(&'a ConversationArea),
    AreaDestroyed(&'a ConversationArea),
    TownDestroyed,
}

/// The set of listeners subscribed to a town.
///
/// Ids grow monotonically, so iterating the `BTreeMap` in key order is
/// iterating in subscription order.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Box<dyn TownListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a listener and returns the handle that removes it.
    pub fn add(&mut self, listener: Box<dyn TownListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    /// Unsubscribes a listener. Unknown handles are ignored.
    ///
    /// Returns `true` if a listener was removed.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn notify(&mut self, notice: Notice<'_>) {
        for listener in self.listeners.values_mut() {
            match notice {
                Notice::PlayerJoined(p) => listener.on_player_joined(p),
                Notice::PlayerMoved(p) => listener.on_player_moved(p),
                Notice::PlayerDisconnected(p) => listener.on_player_disconnected(p),
                Notice::AreaUpdated(a) => listener.on_conversation_area_updated(a),
                Notice::AreaDestroyed(a) => listener.on_conversation_area_destroyed(a),
                Notice::TownDestroyed => listener.on_town_destroyed(),
            }
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Owned events for transport layers
// ---------------------------------------------------------------------------

/// An owned, serializable copy of a town event.
///
/// Variant names match the socket messages the browser client listens
/// for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum TownEvent {
    #[serde(rename = "newPlayer")]
    PlayerJoined(Player),
    #[serde(rename = "playerMoved")]
    PlayerMoved(Player),
    #[serde(rename = "playerDisconnect")]
    PlayerDisconnected(Player),
    #[serde(rename = "conversationUpdated")]
    ConversationAreaUpdated(ConversationArea),
    #[serde(rename = "conversationDestroyed")]
    ConversationAreaDestroyed(ConversationArea),
    #[serde(rename = "townClosing")]
    TownDestroyed,
}

/// A listener that forwards every event into an unbounded channel.
///
/// The usual bridge to a socket task: the town pushes, the socket task
/// drains at its own pace. Events are dropped silently once the receiver
/// is gone.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<TownEvent>,
}

impl ChannelListener {
    pub fn new(sender: mpsc::UnboundedSender<TownEvent>) -> Self {
        Self { sender }
    }

    /// Creates a listener together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TownEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: TownEvent) {
        let _ = self.sender.send(event);
    }
}

impl TownListener for ChannelListener {
    fn on_player_joined(&mut self, player: &Player) {
        self.send(TownEvent::PlayerJoined(player.clone()));
    }

    fn on_player_moved(&mut self, player: &Player) {
        self.send(TownEvent::PlayerMoved(player.clone()));
    }

    fn on_player_disconnected(&mut self, player: &Player) {
        self.send(TownEvent::PlayerDisconnected(player.clone()));
    }

    fn on_conversation_area_updated(&mut self, area: &ConversationArea) {
        self.send(TownEvent::ConversationAreaUpdated(area.clone()));
    }

    fn on_conversation_area_destroyed(&mut self, area: &ConversationArea) {
        self.send(TownEvent::ConversationAreaDestroyed(area.clone()));
    }

    fn on_town_destroyed(&mut self) {
        self.send(TownEvent::TownDestroyed);
    }
}
