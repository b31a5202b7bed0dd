use std::boxed::Box;
use std::collections::HashMap;
use std::format;
use std::string::{String, ToString};
use std::vec::Vec;

use anyhow::anyhow;
use log::{debug, info, warn};
use rand::rngs::SmallRng;

use super::{ConnectionState, ShotError};
use crate::board::{Board, SquareContent};
use crate::index::BoardIndex;
use crate::player::{Player, PlayerRegistry};
use crate::protocol::{GameId, Message};
use crate::transport::MessageSink;

struct AwaitingResult {
    seq: u64,
    game_id: GameId,
    shooter: u32,
    location: BoardIndex,
}

/// Battle host's handle on the coordinator.
///
/// Answers shot requests by asking the registered player and feeds the
/// coordinator's shot results back to that player. One player instance is
/// kept per shooter for the lifetime of a game.
pub struct CoordinatorConnection {
    sink: Option<Box<dyn MessageSink>>,
    registry: PlayerRegistry,
    rng: SmallRng,
    game: Option<GameId>,
    players: HashMap<u32, Box<dyn Player>>,
    awaiting: Option<AwaitingResult>,
}

impl CoordinatorConnection {
    pub fn new(registry: PlayerRegistry, rng: SmallRng) -> Self {
        Self {
            sink: None,
            registry,
            rng,
            game: None,
            players: HashMap::new(),
            awaiting: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.sink.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// True between sending a shot and receiving its result.
    pub fn is_awaiting_result(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn attach(&mut self, sink: Box<dyn MessageSink>) -> Result<(), ShotError> {
        if self.sink.is_some() {
            return Err(ShotError::AlreadyConnected);
        }
        self.sink = Some(sink);
        Ok(())
    }

    pub fn detach(&mut self) {
        self.sink = None;
        self.awaiting = None;
        self.players.clear();
        self.game = None;
    }

    /// Process one message from the coordinator.
    ///
    /// Errors mean the stream can no longer be written to.
    pub async fn handle(&mut self, msg: Message) -> anyhow::Result<()> {
        if self.sink.is_none() {
            return Err(anyhow!("Not connected to a coordinator"));
        }
        match msg {
            Message::RequestShot {
                seq,
                shooter,
                opponent,
                game_id,
                board,
            } => self.answer_shot_request(seq, shooter, opponent, game_id, board).await,
            Message::ShotResult {
                seq,
                game_id,
                square_content,
            } => {
                self.process_shot_result(seq, game_id, square_content);
                Ok(())
            }
            other => {
                info!("Received unknown payload type {}, ignoring", other.kind());
                Ok(())
            }
        }
    }

    async fn answer_shot_request(
        &mut self,
        seq: u64,
        shooter: u32,
        opponent: u32,
        game_id: GameId,
        board: Vec<u8>,
    ) -> anyhow::Result<()> {
        if let Some(previous) = self.awaiting.take() {
            warn!(
                "Shot request {} of game {} arrives before the result of request {}, dropping the old one",
                seq, game_id, previous.seq
            );
        }
        if self.game != Some(game_id) {
            debug!("Starting players for game {}", game_id);
            self.players.clear();
            self.game = Some(game_id);
        }

        let shots = match Board::from_bytes(&board) {
            Ok(shots) => shots,
            Err(e) => return self.crash(seq, game_id, format!("invalid shot board: {}", e)).await,
        };
        if !self.players.contains_key(&shooter) {
            match self.registry.create(shooter as usize) {
                Some(player) => {
                    self.players.insert(shooter, player);
                }
                None => {
                    return self
                        .crash(seq, game_id, format!("player {} is not registered", shooter))
                        .await
                }
            }
        }
        let choice = match self.players.get_mut(&shooter) {
            Some(player) => player.choose_shot(&mut self.rng, &shots),
            None => return self.crash(seq, game_id, format!("player {} is not registered", shooter)).await,
        };
        let location = match choice {
            Ok(location) => location,
            Err(e) => return self.crash(seq, game_id, e.to_string()).await,
        };

        info!(
            "Player {} fires at {} against player {} in game {}",
            shooter, location, opponent, game_id
        );
        self.send(Message::Shot {
            seq,
            game_id,
            location: location.to_string(),
        })
        .await?;
        self.awaiting = Some(AwaitingResult {
            seq,
            game_id,
            shooter,
            location,
        });
        Ok(())
    }

    fn process_shot_result(&mut self, seq: u64, game_id: GameId, square_content: u8) {
        let expected = self.awaiting.as_ref().map(|a| (a.seq, a.game_id));
        match expected {
            None => {
                warn!("Received shot result for game {} while no shot is pending, discarding", game_id);
                return;
            }
            Some((awaiting_seq, awaiting_game)) if awaiting_seq != seq || awaiting_game != game_id => {
                warn!(
                    "Discarding stale shot result {} of game {} (waiting for {} of game {})",
                    seq, game_id, awaiting_seq, awaiting_game
                );
                return;
            }
            Some(_) => {}
        }
        let Some(awaiting) = self.awaiting.take() else {
            return;
        };

        match SquareContent::try_from(square_content) {
            Ok(content) => {
                debug!("Shot at {} revealed {:?}", awaiting.location, content);
                if let Some(player) = self.players.get_mut(&awaiting.shooter) {
                    player.handle_shot_result(awaiting.location, content);
                }
            }
            Err(e) => warn!("Received invalid shot result: {}", e),
        }
    }

    async fn crash(&mut self, seq: u64, game_id: GameId, reason: String) -> anyhow::Result<()> {
        warn!("Player crashed on request {} of game {}: {}", seq, game_id, reason);
        self.send(Message::Crash { seq, game_id, reason }).await
    }

    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| anyhow!("Not connected to a coordinator"))?;
        sink.send(msg).await
    }
}
