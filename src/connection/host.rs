use std::boxed::Box;
use std::string::ToString;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{oneshot, watch};
use tokio::time::timeout;

use super::{ConnectionState, ShotError, ShotPhase, ShotReply};
use crate::board::{Board, SquareContent};
use crate::index::BoardIndex;
use crate::protocol::{GameId, Message};
use crate::transport::MessageSink;

type SharedSink = Arc<tokio::sync::Mutex<Box<dyn MessageSink>>>;

struct PendingShot {
    seq: u64,
    game_id: GameId,
    reply: oneshot::Sender<Result<BoardIndex, ShotError>>,
}

#[derive(Default)]
struct Shared {
    sink: Option<SharedSink>,
    pending: Option<PendingShot>,
    next_seq: u64,
}

/// Coordinator's handle on the connected battle host.
///
/// Issues shot requests and routes the host's answers back to the waiting
/// caller. Cloning yields another handle on the same connection, so the
/// reader task and the battle loop can share it.
#[derive(Clone)]
pub struct HostConnection {
    shared: Arc<Mutex<Shared>>,
    state: Arc<watch::Sender<ConnectionState>>,
    shot_timeout: Duration,
}

/// Clears the pending slot when a shot exchange ends, however it ends.
struct PendingGuard<'a> {
    connection: &'a HostConnection,
    seq: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut shared = self.connection.shared();
        if shared.pending.as_ref().is_some_and(|p| p.seq == self.seq) {
            shared.pending = None;
        }
    }
}

impl HostConnection {
    pub fn new(shot_timeout: Duration) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            shared: Arc::new(Mutex::new(Shared::default())),
            state: Arc::new(state),
            shot_timeout,
        }
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn shot_timeout(&self) -> Duration {
        self.shot_timeout
    }

    /// Another handle on the same connection with its own shot timeout.
    pub fn with_shot_timeout(&self, shot_timeout: Duration) -> Self {
        Self {
            shot_timeout,
            ..self.clone()
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.shared().sink.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn phase(&self) -> ShotPhase {
        if self.shared().pending.is_some() {
            ShotPhase::AwaitingShot
        } else {
            ShotPhase::Idle
        }
    }

    /// Watch connection state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Wait until a host is attached.
    pub async fn wait_connected(&self) {
        let mut state = self.subscribe();
        // The sender lives as long as `self`, so this only ends on connect.
        let _ = state.wait_for(|s| *s == ConnectionState::Connected).await;
    }

    /// Bind the sending half of a freshly accepted host stream.
    pub fn attach(&self, sink: Box<dyn MessageSink>) -> Result<(), ShotError> {
        {
            let mut shared = self.shared();
            if shared.sink.is_some() {
                return Err(ShotError::AlreadyConnected);
            }
            shared.sink = Some(Arc::new(tokio::sync::Mutex::new(sink)));
        }
        self.state.send_replace(ConnectionState::Connected);
        Ok(())
    }

    /// Drop the stream. A caller waiting for a shot gets [`ShotError::Cancelled`].
    pub fn detach(&self) {
        let pending = {
            let mut shared = self.shared();
            shared.sink = None;
            shared.pending.take()
        };
        self.state.send_replace(ConnectionState::Disconnected);
        if let Some(pending) = pending {
            warn!(
                "Cancelling shot request {} of game {}, battle host went away",
                pending.seq, pending.game_id
            );
            let _ = pending.reply.send(Err(ShotError::Cancelled));
        }
    }

    /// Ask the host where `shooter` fires next.
    ///
    /// At most one request is outstanding per connection; a second concurrent
    /// call fails with [`ShotError::ShotInFlight`] without sending anything.
    pub async fn issue_shot(
        &self,
        game_id: GameId,
        shooter: u32,
        opponent: u32,
        shots: &Board,
    ) -> Result<ShotReply, ShotError> {
        let (seq, sink, reply) = {
            let mut shared = self.shared();
            let sink = shared.sink.clone().ok_or(ShotError::NotConnected)?;
            if shared.pending.is_some() {
                return Err(ShotError::ShotInFlight);
            }
            let seq = shared.next_seq;
            shared.next_seq += 1;
            let (tx, rx) = oneshot::channel();
            shared.pending = Some(PendingShot {
                seq,
                game_id,
                reply: tx,
            });
            (seq, sink, rx)
        };
        let _guard = PendingGuard {
            connection: self,
            seq,
        };

        info!(
            "Requesting shot {} for player {} against player {} in game {}",
            seq, shooter, opponent, game_id
        );
        let request = Message::RequestShot {
            seq,
            shooter,
            opponent,
            game_id,
            board: shots.to_bytes().to_vec(),
        };
        let sent = sink.lock().await.send(request).await;
        if let Err(e) = sent {
            error!("Error while talking to battle host: {:#}", e);
            return Err(ShotError::Transport(e.to_string()));
        }

        match timeout(self.shot_timeout, reply).await {
            Ok(Ok(result)) => result.map(|location| ShotReply { seq, location }),
            Ok(Err(_)) => Err(ShotError::Cancelled),
            Err(_) => {
                warn!(
                    "No shot received for request {} of game {} within {:?}",
                    seq, game_id, self.shot_timeout
                );
                Err(ShotError::Timeout(self.shot_timeout))
            }
        }
    }

    /// Report what the shot with `seq` revealed.
    pub async fn send_shot_result(
        &self,
        game_id: GameId,
        seq: u64,
        content: SquareContent,
    ) -> Result<(), ShotError> {
        let sink = self.shared().sink.clone().ok_or(ShotError::NotConnected)?;
        let msg = Message::ShotResult {
            seq,
            game_id,
            square_content: content.code(),
        };
        let sent = sink.lock().await.send(msg).await;
        sent.map_err(|e| {
            error!("Error while sending shot result: {:#}", e);
            ShotError::Transport(e.to_string())
        })
    }

    /// Route an incoming message from the host.
    pub fn handle(&self, msg: Message) {
        match msg {
            Message::Shot {
                seq,
                game_id,
                location,
            } => {
                debug!("Received shot to {} for game {}", location, game_id);
                let result = location
                    .parse::<BoardIndex>()
                    .map_err(ShotError::InvalidLocation);
                self.resolve(seq, game_id, result);
            }
            Message::Crash {
                seq,
                game_id,
                reason,
            } => {
                warn!("Player crashed on request {} of game {}: {}", seq, game_id, reason);
                self.resolve(seq, game_id, Err(ShotError::PlayerCrashed { game_id, reason }));
            }
            other => {
                warn!("Received unexpected {} from battle host, discarding", other.kind());
            }
        }
    }

    /// Complete the pending request if `seq` and `game_id` match it;
    /// anything else is late or unsolicited and dropped.
    fn resolve(&self, seq: u64, game_id: GameId, result: Result<BoardIndex, ShotError>) {
        let pending = {
            let mut shared = self.shared();
            let expected = shared.pending.as_ref().map(|p| (p.seq, p.game_id));
            match expected {
                None => {
                    warn!("Received answer for game {} while no shot is pending, discarding", game_id);
                    return;
                }
                Some((pending_seq, pending_game))
                    if pending_game != game_id || seq != pending_seq =>
                {
                    warn!(
                        "Discarding stale answer for game {} (waiting for request {} of game {})",
                        game_id, pending_seq, pending_game
                    );
                    return;
                }
                Some(_) => shared.pending.take(),
            }
        };
        if let Some(pending) = pending {
            if pending.reply.send(result).is_err() {
                debug!("Shot requester for request {} is gone", pending.seq);
            }
        }
    }
}
