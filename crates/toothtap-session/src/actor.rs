//! The per-player session actor and the registry that owns them.
//!
//! Each active player gets exactly one tokio task that holds their
//! [`PlayerSession`] and drains a command mailbox, so every mutation of
//! a player's economy is serialized without locks around the record
//! itself. Connections talk to the actor through a [`SessionHandle`];
//! the actor fans authoritative updates back out on a broadcast channel
//! so every socket of the same player stays converged.
//!
//! Lifecycle: the actor is spawned on the first
//! [`SessionRegistry::attach`], counts connections via
//! [`SessionCommand::ConnectionOpened`] / `ConnectionClosed`, and when
//! the count hits zero it persists the economy, removes itself from the
//! registry, and exits. That exit IS the `Active -> Idle` transition;
//! an idle player costs nothing but their database row.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tracing::{debug, error, info, warn};

use toothtap_economy::Catalog;
use toothtap_types::{
    ConnectionId, EconomySnapshot, PlayerId, PurchaseEvent, ServerMessage, TapEvent,
};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::session::{PlayerSession, PurchaseOutcome, TapOutcome};
use crate::store::{DurableStore, StoreError};

/// Capacity of the per-player broadcast channel. A lagging socket
/// misses intermediate snapshots and resynchronizes from the next one.
const BROADCAST_CAPACITY: usize = 32;

/// A message pushed to every connection of a player after a mutation.
#[derive(Debug, Clone)]
pub struct SessionBroadcast {
    /// Connection whose request caused the update; it already got a
    /// direct reply and skips the broadcast copy.
    pub origin: ConnectionId,
    /// The update to deliver.
    pub message: ServerMessage,
}

/// Commands a connection can send to its player's actor.
#[derive(Debug)]
pub enum SessionCommand {
    /// Apply a tap batch and reply with the outcome and fresh snapshot.
    TapBatch {
        /// The batch.
        event: TapEvent,
        /// Requesting connection.
        origin: ConnectionId,
        /// Reply channel.
        reply: oneshot::Sender<Result<(TapOutcome, EconomySnapshot), SessionError>>,
    },
    /// Execute a purchase and reply with the outcome and fresh snapshot.
    Purchase {
        /// The request.
        event: PurchaseEvent,
        /// Requesting connection.
        origin: ConnectionId,
        /// Reply channel.
        reply: oneshot::Sender<(PurchaseOutcome, EconomySnapshot)>,
    },
    /// Set a temporary tap-bonus multiplier.
    ActivateBonus {
        /// Multiplier to apply on top of the base per-tap value.
        multiplier: u32,
        /// Lifetime in seconds.
        duration_seconds: u32,
        /// Requesting connection.
        origin: ConnectionId,
        /// Reply channel.
        reply: oneshot::Sender<EconomySnapshot>,
    },
    /// Read a fresh snapshot without mutating anything the player can
    /// see (lazy advancement still runs).
    Snapshot {
        /// Reply channel.
        reply: oneshot::Sender<EconomySnapshot>,
    },
    /// A connection for this player opened.
    ConnectionOpened,
    /// A connection for this player closed.
    ConnectionClosed,
}

/// Cheap cloneable handle to one player's actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Command mailbox.
    pub commands: mpsc::Sender<SessionCommand>,
    /// Fan-out channel; subscribe per connection.
    pub broadcasts: broadcast::Sender<SessionBroadcast>,
}

impl SessionHandle {
    /// Subscribe to updates caused by this player's other connections.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionBroadcast> {
        self.broadcasts.subscribe()
    }
}

/// Owns the map of live actors and spawns them on demand.
pub struct SessionRegistry {
    live: Mutex<HashMap<PlayerId, SessionHandle>>,
    store: Arc<dyn DurableStore>,
    catalog: Arc<Catalog>,
    config: SessionConfig,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry").finish_non_exhaustive()
    }
}

impl SessionRegistry {
    /// Build a registry over a durable store and upgrade catalog.
    pub fn new(store: Arc<dyn DurableStore>, catalog: Arc<Catalog>, config: SessionConfig) -> Self {
        Self { live: Mutex::new(HashMap::new()), store, catalog, config }
    }

    /// Attach a connection to the player's actor, spawning it (and
    /// running `Idle -> Active` catch-up) if the player has none.
    ///
    /// Returns a handle with the connection already counted. Retries
    /// internally if it races an actor that is shutting down.
    pub async fn attach(self: &Arc<Self>, player_id: PlayerId) -> Result<SessionHandle, SessionError> {
        loop {
            let mut mailbox = None;
            let handle = {
                let mut live = self.live.lock().await;
                match live.get(&player_id) {
                    Some(handle) => handle.clone(),
                    None => {
                        let (commands, receiver) = mpsc::channel(self.config.mailbox_capacity);
                        let (broadcasts, _) = broadcast::channel(BROADCAST_CAPACITY);
                        let handle = SessionHandle { commands, broadcasts };
                        live.insert(player_id, handle.clone());
                        mailbox = Some(receiver);
                        handle
                    }
                }
            };

            // Activation I/O runs outside the registry lock, so one
            // player's slow load never stalls another's attach. A
            // concurrent attach for the same player queues into the
            // buffered mailbox until the actor starts draining it.
            if let Some(mailbox) = mailbox {
                if let Err(err) = self.spawn_actor(player_id, &handle, mailbox).await {
                    let mut live = self.live.lock().await;
                    let ours = live
                        .get(&player_id)
                        .is_some_and(|h| h.commands.same_channel(&handle.commands));
                    if ours {
                        live.remove(&player_id);
                    }
                    return Err(err);
                }
            }

            match handle.commands.send(SessionCommand::ConnectionOpened).await {
                Ok(()) => return Ok(handle),
                // The actor exited between lookup and send; it has
                // already removed itself, so the next pass respawns.
                Err(_) => {
                    debug!(player = %player_id, "raced a terminating actor, retrying attach");
                }
            }
        }
    }

    /// Number of players currently active.
    pub async fn active_players(&self) -> usize {
        self.live.lock().await.len()
    }

    async fn spawn_actor(
        self: &Arc<Self>,
        player_id: PlayerId,
        handle: &SessionHandle,
        mailbox: mpsc::Receiver<SessionCommand>,
    ) -> Result<(), SessionError> {
        let loaded = self.store.load(player_id).await.map_err(|err| match err {
            StoreError::Corrupt { player_id, detail } => {
                SessionError::CorruptState { player_id, detail }
            }
            other => SessionError::Store(other),
        })?;
        let now = Utc::now();
        let (session, report) =
            PlayerSession::activate(loaded, player_id, &self.catalog, self.config, now)?;

        if report.idle_ms > 0 {
            info!(
                player = %player_id,
                idle_ms = report.idle_ms,
                idle_coins = %report.idle_coins,
                "idle earnings credited on activation"
            );
        }
        // Catch-up results must survive a crash before the first tap.
        self.store.save(session.economy()).await?;

        let broadcasts = handle.broadcasts.clone();
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            SessionActor {
                player_id,
                session,
                store: Arc::clone(&registry.store),
                catalog: Arc::clone(&registry.catalog),
                registry,
                broadcasts,
                connections: 0,
            }
            .run(mailbox)
            .await;
        });

        Ok(())
    }
}

struct SessionActor {
    player_id: PlayerId,
    session: PlayerSession,
    store: Arc<dyn DurableStore>,
    catalog: Arc<Catalog>,
    registry: Arc<SessionRegistry>,
    broadcasts: broadcast::Sender<SessionBroadcast>,
    connections: usize,
}

impl SessionActor {
    async fn run(mut self, mut mailbox: mpsc::Receiver<SessionCommand>) {
        debug!(player = %self.player_id, "session actor started");
        let linger = Duration::from_millis(self.registry.config.actor_linger_ms);
        loop {
            let command = if self.connections == 0 {
                // With no connections, linger so the ledger's replay
                // window survives quick reconnects, then exit.
                match tokio::time::timeout(linger, mailbox.recv()).await {
                    Ok(Some(command)) => command,
                    Ok(None) => break,
                    Err(_) => {
                        // Take the registry lock before deciding to
                        // exit so a concurrent attach either reaches
                        // the mailbox first (drained below) or finds
                        // the entry gone and respawns.
                        let mut live = self.registry.live.lock().await;
                        match mailbox.try_recv() {
                            Ok(pending) => {
                                drop(live);
                                pending
                            }
                            Err(_) => {
                                live.remove(&self.player_id);
                                break;
                            }
                        }
                    }
                }
            } else {
                match mailbox.recv().await {
                    Some(command) => command,
                    None => break,
                }
            };
            self.handle(command).await;
        }
        self.persist().await;
        info!(player = %self.player_id, "session actor stopped, player idle");
    }

    async fn handle(&mut self, command: SessionCommand) {
        let now = Utc::now();
        match command {
            SessionCommand::TapBatch { event, origin, reply } => {
                let result = self.session.handle_tap_batch(&event, now);
                let applied = match &result {
                    Ok(TapOutcome::Applied(applied)) => Some(*applied),
                    _ => None,
                };
                let response = result.map(|outcome| (outcome, self.session.snapshot(now)));
                if let (Some(applied), Ok((_, snapshot))) = (applied, &response) {
                    // Other connections get a lightweight energy update
                    // per batch, or the full snapshot on a level-up.
                    let message = if applied.levels_gained > 0 {
                        ServerMessage::State { state: snapshot.clone() }
                    } else {
                        ServerMessage::EnergyUpdate {
                            energy_current: snapshot.energy_current,
                            energy_max: snapshot.energy_max,
                        }
                    };
                    self.fan_out(origin, message);
                }
                let _ = reply.send(response);
                if applied.is_some() {
                    self.persist().await;
                }
            }
            SessionCommand::Purchase { event, origin, reply } => {
                let catalog = Arc::clone(&self.catalog);
                let (outcome, replayed) = self.session.handle_purchase(&catalog, &event, now);
                let mutated = !replayed && outcome == PurchaseOutcome::Purchased;
                let snapshot = self.session.snapshot(now);
                if mutated {
                    self.fan_out(origin, ServerMessage::State { state: snapshot.clone() });
                }
                let _ = reply.send((outcome, snapshot));
                if mutated {
                    self.persist().await;
                }
            }
            SessionCommand::ActivateBonus { multiplier, duration_seconds, origin, reply } => {
                self.session.activate_bonus(multiplier, duration_seconds, now);
                let snapshot = self.session.snapshot(now);
                self.fan_out(origin, ServerMessage::State { state: snapshot.clone() });
                let _ = reply.send(snapshot);
                self.persist().await;
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot(now));
            }
            SessionCommand::ConnectionOpened => {
                self.connections = self.connections.saturating_add(1);
                debug!(player = %self.player_id, connections = self.connections, "connection opened");
            }
            SessionCommand::ConnectionClosed => {
                self.connections = self.connections.saturating_sub(1);
                debug!(player = %self.player_id, connections = self.connections, "connection closed");
            }
        }
    }

    fn fan_out(&self, origin: ConnectionId, message: ServerMessage) {
        // No receivers just means the player has a single connection.
        let _ = self.broadcasts.send(SessionBroadcast { origin, message });
    }

    /// Write-through persistence. A failed save is logged and the actor
    /// keeps serving; the economy stays correct in memory and the next
    /// successful save catches up.
    async fn persist(&self) {
        if let Err(err) = self.store.save(self.session.economy()).await {
            error!(player = %self.player_id, %err, "failed to persist economy, continuing");
        }
    }
}

/// Convenience wrappers that pair a command with its oneshot reply.
impl SessionHandle {
    /// Apply a tap batch.
    pub async fn tap_batch(
        &self,
        event: TapEvent,
        origin: ConnectionId,
    ) -> Result<(TapOutcome, EconomySnapshot), SessionError> {
        let player_id = event.player_id;
        let (reply, response) = oneshot::channel();
        self.commands
            .send(SessionCommand::TapBatch { event, origin, reply })
            .await
            .map_err(|_| SessionError::MailboxClosed { player_id })?;
        response.await.map_err(|_| SessionError::MailboxClosed { player_id })?
    }

    /// Execute a purchase.
    pub async fn purchase(
        &self,
        event: PurchaseEvent,
        origin: ConnectionId,
    ) -> Result<(PurchaseOutcome, EconomySnapshot), SessionError> {
        let player_id = event.player_id;
        let (reply, response) = oneshot::channel();
        self.commands
            .send(SessionCommand::Purchase { event, origin, reply })
            .await
            .map_err(|_| SessionError::MailboxClosed { player_id })?;
        response.await.map_err(|_| SessionError::MailboxClosed { player_id })
    }

    /// Set a temporary tap-bonus multiplier.
    pub async fn activate_bonus(
        &self,
        player_id: PlayerId,
        multiplier: u32,
        duration_seconds: u32,
        origin: ConnectionId,
    ) -> Result<EconomySnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(SessionCommand::ActivateBonus { multiplier, duration_seconds, origin, reply })
            .await
            .map_err(|_| SessionError::MailboxClosed { player_id })?;
        response.await.map_err(|_| SessionError::MailboxClosed { player_id })
    }

    /// Read a fresh snapshot.
    pub async fn snapshot(&self, player_id: PlayerId) -> Result<EconomySnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(SessionCommand::Snapshot { reply })
            .await
            .map_err(|_| SessionError::MailboxClosed { player_id })?;
        response.await.map_err(|_| SessionError::MailboxClosed { player_id })
    }

    /// Signal that a connection closed; the actor exits when the last
    /// one does. Errors are ignored because a closed mailbox means the
    /// actor is already gone.
    pub async fn detach(&self) {
        if self.commands.send(SessionCommand::ConnectionClosed).await.is_err() {
            warn!("detach raced an already-terminated actor");
        }
    }
}
