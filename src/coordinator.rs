//! Coordinator service: admits one battle host and runs matches through it.

use std::string::ToString;
use std::time::Duration;

use anyhow::bail;
use log::{info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::battle::{Battle, BattleOutcome, MatchError};
use crate::config::CoordinatorConfig;
use crate::connection::{HostConnection, RunnerSlot};
use crate::filler::RandomBoardFiller;
use crate::lifecycle::{Shutdown, ShutdownListener};
use crate::player::PlayerRegistry;
use crate::protocol::{GameId, Message, PROTOCOL_VERSION};
use crate::transport::{Listener, Transport};

/// Pause after a failed accept, e.g. while out of file descriptors.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

const RUNNER_BUSY: &str =
    "A battle runner is already connected. Currently, multiple battle runners are not supported.";

#[derive(Clone)]
pub struct Coordinator {
    config: CoordinatorConfig,
    players: PlayerRegistry,
    connection: HostConnection,
    slot: RunnerSlot,
    shutdown: Shutdown,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, players: PlayerRegistry) -> Self {
        let connection = HostConnection::new(config.shot_timeout);
        Self {
            config,
            players,
            connection,
            slot: RunnerSlot::new(),
            shutdown: Shutdown::new(),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn players(&self) -> PlayerRegistry {
        self.players
    }

    pub fn connection(&self) -> &HostConnection {
        &self.connection
    }

    pub fn shutdown_listener(&self) -> ShutdownListener {
        self.shutdown.listener()
    }

    /// Run the handshake on a new host stream and start reading from it.
    ///
    /// A host is refused with `Rejected` when it speaks another protocol
    /// version or while another host holds the runner slot. On success the
    /// returned task forwards host messages to the connection until the
    /// stream fails or the coordinator shuts down.
    pub async fn accept_host<T: Transport + 'static>(&self, mut transport: T) -> anyhow::Result<JoinHandle<()>> {
        let version = match transport.recv().await? {
            Message::Handshake { version } => version,
            other => bail!("Expected Handshake, got {}", other.kind()),
        };
        if version != PROTOCOL_VERSION {
            let reason = format!(
                "Protocol version mismatch: expected {}, got {}",
                PROTOCOL_VERSION, version
            );
            let _ = transport.send(Message::Rejected { reason: reason.clone() }).await;
            bail!(reason);
        }
        if self.shutdown.is_triggered() {
            let _ = transport
                .send(Message::Rejected {
                    reason: "Coordinator is shutting down".to_string(),
                })
                .await;
            bail!("Coordinator is shutting down");
        }
        let Some(lease) = self.slot.try_acquire() else {
            warn!("Another battle runner tried to connect, declining");
            let _ = transport
                .send(Message::Rejected {
                    reason: RUNNER_BUSY.to_string(),
                })
                .await;
            bail!("Battle runner already connected");
        };

        transport
            .send(Message::HandshakeAck {
                version: PROTOCOL_VERSION,
            })
            .await?;
        let (sink, mut stream) = transport.split();
        self.connection.attach(sink)?;
        info!("New battle runner connected");

        let connection = self.connection.clone();
        let mut shutdown = self.shutdown.listener();
        Ok(tokio::spawn(async move {
            let _lease = lease;
            loop {
                tokio::select! {
                    msg = stream.recv() => match msg {
                        Ok(msg) => connection.handle(msg),
                        Err(e) => {
                            info!("Battle runner disconnected: {:#}", e);
                            break;
                        }
                    },
                    _ = shutdown.wait() => {
                        info!("Closing battle runner connection");
                        break;
                    }
                }
            }
            connection.detach();
        }))
    }

    /// Accept hosts on `listener` until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        info!("Coordinator listening on {}", listener.local_addr()?);
        self.serve_from(listener).await
    }

    /// Accept hosts from any [`Listener`] until shutdown. A failed accept is
    /// logged and the loop carries on after a short pause.
    pub async fn serve_from<L: Listener>(&self, mut listener: L) -> anyhow::Result<()> {
        let mut shutdown = self.shutdown.listener();
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (link, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!("Failed to accept battle runner: {}", e);
                            tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                            continue;
                        }
                    };
                    info!("Incoming connection from {}", peer);
                    let this = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = this.accept_host(link).await {
                            warn!("Declined battle runner at {}: {:#}", peer, e);
                        }
                    });
                }
                _ = shutdown.wait() => {
                    info!("Coordinator stops accepting battle runners");
                    return Ok(());
                }
            }
        }
    }

    /// Play the registered players at `first` and `second` against each other.
    ///
    /// Preconditions are checked before any board is created.
    pub async fn start_match<R: Rng>(
        &self,
        first: usize,
        second: usize,
        rng: &mut R,
    ) -> Result<BattleOutcome, MatchError> {
        if self.players.len() < 2 {
            return Err(MatchError::TooFewPlayers {
                registered: self.players.len(),
            });
        }
        for index in [first, second] {
            if self.players.get(index).is_none() {
                return Err(MatchError::UnknownPlayer(index));
            }
        }
        if !self.connection.is_connected() {
            return Err(MatchError::NoHostConnected);
        }

        let game_id = GameId::random(rng);
        let mut filler = RandomBoardFiller::new(SmallRng::from_rng(rng));
        let mut battle = Battle::new(game_id, [first as u32, second as u32], &mut filler)?
            .with_max_rounds(self.config.max_rounds);
        battle.run(&self.connection).await
    }

    /// Stop accepting hosts and cancel any outstanding shot request.
    pub fn shutdown(&self) {
        info!("Coordinator shutting down");
        self.shutdown.trigger();
        self.connection.detach();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_triggered()
    }
}
