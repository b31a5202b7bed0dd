//! Two-player match loop.
//!
//! The battle owns both truth boards and both shot views. Shot choices come
//! from a [`ShotSource`], normally the connected battle host; the battle is
//! the only writer of its boards and finishes recording one shot before it
//! asks for the next.

use log::{debug, info};

use crate::board::{Board, SquareContent};
use crate::common::{BoardError, FillError};
use crate::config::DEFAULT_MAX_ROUNDS;
use crate::connection::{HostConnection, ShotError, ShotReply};
use crate::filler::BoardFiller;
use crate::protocol::GameId;

/// Where shot decisions come from.
#[async_trait::async_trait]
pub trait ShotSource: Send + Sync {
    async fn request_shot(
        &self,
        game_id: GameId,
        shooter: u32,
        opponent: u32,
        shots: &Board,
    ) -> Result<ShotReply, ShotError>;

    async fn report_result(
        &self,
        game_id: GameId,
        reply: ShotReply,
        content: SquareContent,
    ) -> Result<(), ShotError>;
}

#[async_trait::async_trait]
impl ShotSource for HostConnection {
    async fn request_shot(
        &self,
        game_id: GameId,
        shooter: u32,
        opponent: u32,
        shots: &Board,
    ) -> Result<ShotReply, ShotError> {
        self.issue_shot(game_id, shooter, opponent, shots).await
    }

    async fn report_result(
        &self,
        game_id: GameId,
        reply: ShotReply,
        content: SquareContent,
    ) -> Result<(), ShotError> {
        self.send_shot_result(game_id, reply.seq, content).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("at least two players must be registered, found {registered}")]
    TooFewPlayers { registered: usize },
    #[error("no player registered at index {0}")]
    UnknownPlayer(usize),
    #[error("no battle host connected")]
    NoHostConnected,
    #[error("could not place fleet: {0}")]
    Fill(#[from] FillError),
    #[error("board update failed: {0}")]
    Board(#[from] BoardError),
    #[error("shot of player {shooter} failed: {source}")]
    Shot {
        shooter: u32,
        #[source]
        source: ShotError,
    },
    #[error("game {game_id} undecided after {rounds} rounds")]
    RoundLimit { game_id: GameId, rounds: usize },
}

/// Result of a finished match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleOutcome {
    pub game_id: GameId,
    /// Side (0 or 1) that sank the other fleet.
    pub winner: usize,
    /// Registry index of the winning player.
    pub winner_player: u32,
    pub rounds: usize,
    /// Shots fired by each side.
    pub shots: [usize; 2],
}

pub struct Battle {
    game_id: GameId,
    players: [u32; 2],
    boards: [Board; 2],
    shots: [Board; 2],
    max_rounds: usize,
}

impl Battle {
    /// New match with a randomly placed fleet on each truth board.
    pub fn new<F: BoardFiller + ?Sized>(
        game_id: GameId,
        players: [u32; 2],
        filler: &mut F,
    ) -> Result<Self, FillError> {
        let first = Board::with_fleet(filler)?;
        let second = Board::with_fleet(filler)?;
        Ok(Self::from_boards(game_id, players, [first, second]))
    }

    /// New match on prepared truth boards.
    pub fn from_boards(game_id: GameId, players: [u32; 2], boards: [Board; 2]) -> Self {
        Self {
            game_id,
            players,
            boards,
            shots: [Board::unknown(), Board::unknown()],
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn players(&self) -> [u32; 2] {
        self.players
    }

    /// Truth board of `side`.
    pub fn board(&self, side: usize) -> &Board {
        &self.boards[side]
    }

    /// What `side` has observed of its opponent's board.
    pub fn shot_view(&self, side: usize) -> &Board {
        &self.shots[side]
    }

    /// Side whose opponent has no ship square left, if any.
    pub fn winner(&self) -> Option<usize> {
        (0..2).find(|&side| self.boards[1 - side].has_lost())
    }

    /// Alternate shots until one fleet is sunk.
    ///
    /// The first player shoots first in every round; a round ends early when
    /// a shot sinks the last ship square.
    pub async fn run<S: ShotSource + ?Sized>(&mut self, source: &S) -> Result<BattleOutcome, MatchError> {
        info!(
            "Starting game {} between players {} and {}",
            self.game_id, self.players[0], self.players[1]
        );
        let mut shots_fired = [0usize; 2];
        let mut rounds = 0;
        loop {
            if rounds >= self.max_rounds {
                return Err(MatchError::RoundLimit {
                    game_id: self.game_id,
                    rounds,
                });
            }
            rounds += 1;
            for shooter in 0..2 {
                self.shoot(shooter, source).await?;
                shots_fired[shooter] += 1;
                if let Some(winner) = self.winner() {
                    info!(
                        "Game {} won by player {} after {} rounds",
                        self.game_id, self.players[winner], rounds
                    );
                    debug!("Final board of player {}:\n{}", self.players[1 - winner], self.boards[1 - winner]);
                    return Ok(BattleOutcome {
                        game_id: self.game_id,
                        winner,
                        winner_player: self.players[winner],
                        rounds,
                        shots: shots_fired,
                    });
                }
            }
        }
    }

    async fn shoot<S: ShotSource + ?Sized>(&mut self, shooter: usize, source: &S) -> Result<(), MatchError> {
        let opponent = 1 - shooter;
        let shooter_id = self.players[shooter];
        let reply = source
            .request_shot(self.game_id, shooter_id, self.players[opponent], &self.shots[shooter])
            .await
            .map_err(|source| MatchError::Shot {
                shooter: shooter_id,
                source,
            })?;

        let content = self.boards[opponent].shoot_at(reply.location);
        self.shots[shooter].set(reply.location, content)?;
        debug!("Player {} shot at {}: {:?}", shooter_id, reply.location, content);

        source
            .report_result(self.game_id, reply, content)
            .await
            .map_err(|source| MatchError::Shot {
                shooter: shooter_id,
                source,
            })
    }
}
