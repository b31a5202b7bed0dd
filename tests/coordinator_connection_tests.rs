use std::sync::Mutex;

use battleship_contest::{
    Board, BoardIndex, ConnectionState, CoordinatorConnection, GameId, InMemoryTransport, Message, MessageStream,
    Player, PlayerError, PlayerInfo, PlayerRegistry, SquareContent, Transport,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

static RESULTS: Mutex<Vec<(BoardIndex, SquareContent)>> = Mutex::new(Vec::new());

/// Fires at A1, B1, C1, ... regardless of the board.
struct Counting {
    next: usize,
}

impl Player for Counting {
    fn choose_shot(&mut self, _: &mut SmallRng, _: &Board) -> Result<BoardIndex, PlayerError> {
        let ix = BoardIndex::new(self.next).map_err(|_| PlayerError::NoUnknownSquare)?;
        self.next += 1;
        Ok(ix)
    }

    fn handle_shot_result(&mut self, location: BoardIndex, content: SquareContent) {
        RESULTS.lock().unwrap().push((location, content));
    }
}

fn create_counting() -> Box<dyn Player> {
    Box::new(Counting { next: 0 })
}

static COUNTING: [PlayerInfo; 1] = [PlayerInfo {
    name: "counting",
    create: create_counting,
}];

fn connected(registry: PlayerRegistry) -> (CoordinatorConnection, InMemoryTransport) {
    let (host_end, coordinator_end) = InMemoryTransport::pair();
    let (sink, _stream) = host_end.split();
    let mut connection = CoordinatorConnection::new(registry, SmallRng::seed_from_u64(1));
    connection.attach(sink).unwrap();
    (connection, coordinator_end)
}

fn request(seq: u64, shooter: u32, game: u128, board: &Board) -> Message {
    Message::RequestShot {
        seq,
        shooter,
        opponent: 1 - shooter.min(1),
        game_id: GameId(game),
        board: board.to_bytes().to_vec(),
    }
}

async fn shot_location(coordinator_end: &mut InMemoryTransport) -> (u64, String) {
    match coordinator_end.recv().await.unwrap() {
        Message::Shot { seq, location, .. } => (seq, location),
        other => panic!("expected Shot, got {:?}", other),
    }
}

#[tokio::test]
async fn refuses_messages_when_detached() {
    let mut connection = CoordinatorConnection::new(PlayerRegistry::builtin(), SmallRng::seed_from_u64(1));
    assert_eq!(connection.state(), ConnectionState::Disconnected);
    assert!(connection.handle(request(0, 0, 1, &Board::unknown())).await.is_err());
}

#[tokio::test]
async fn answers_shot_request() -> anyhow::Result<()> {
    let (mut connection, mut coordinator_end) = connected(PlayerRegistry::builtin());
    let mut shots = Board::unknown();
    shots.set("A1".parse()?, SquareContent::Water)?;

    connection.handle(request(5, 0, 1, &shots)).await?;
    match coordinator_end.recv().await? {
        Message::Shot { seq, game_id, location } => {
            assert_eq!(seq, 5);
            assert_eq!(game_id, GameId(1));
            assert_eq!(location, "B1");
        }
        other => panic!("expected Shot, got {:?}", other),
    }
    assert!(connection.is_awaiting_result());

    connection
        .handle(Message::ShotResult {
            seq: 5,
            game_id: GameId(1),
            square_content: SquareContent::Water.code(),
        })
        .await?;
    assert!(!connection.is_awaiting_result());
    Ok(())
}

#[tokio::test]
async fn mismatched_result_is_discarded() -> anyhow::Result<()> {
    let (mut connection, mut coordinator_end) = connected(PlayerRegistry::builtin());
    connection.handle(request(2, 1, 9, &Board::unknown())).await?;
    shot_location(&mut coordinator_end).await;

    for (seq, game) in [(1, 9), (2, 8)] {
        connection
            .handle(Message::ShotResult {
                seq,
                game_id: GameId(game),
                square_content: 0,
            })
            .await?;
        assert!(connection.is_awaiting_result());
    }
    Ok(())
}

#[tokio::test]
async fn unknown_player_crashes() -> anyhow::Result<()> {
    let (mut connection, mut coordinator_end) = connected(PlayerRegistry::builtin());
    connection.handle(request(0, 17, 3, &Board::unknown())).await?;
    match coordinator_end.recv().await? {
        Message::Crash { seq, game_id, reason } => {
            assert_eq!(seq, 0);
            assert_eq!(game_id, GameId(3));
            assert!(reason.contains("17"));
        }
        other => panic!("expected Crash, got {:?}", other),
    }
    assert!(!connection.is_awaiting_result());
    Ok(())
}

#[tokio::test]
async fn malformed_board_crashes() -> anyhow::Result<()> {
    let (mut connection, mut coordinator_end) = connected(PlayerRegistry::builtin());
    connection
        .handle(Message::RequestShot {
            seq: 0,
            shooter: 0,
            opponent: 1,
            game_id: GameId(4),
            board: vec![3; 12],
        })
        .await?;
    assert!(matches!(coordinator_end.recv().await?, Message::Crash { .. }));
    Ok(())
}

#[tokio::test]
async fn player_without_moves_crashes() -> anyhow::Result<()> {
    let (mut connection, mut coordinator_end) = connected(PlayerRegistry::builtin());
    // all water: nothing left to shoot at
    connection.handle(request(0, 2, 5, &Board::new())).await?;
    match coordinator_end.recv().await? {
        Message::Crash { reason, .. } => assert!(reason.contains("no unknown square")),
        other => panic!("expected Crash, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn player_state_lives_for_one_game() -> anyhow::Result<()> {
    let (mut connection, mut coordinator_end) = connected(PlayerRegistry::new(&COUNTING));
    let shots = Board::unknown();

    connection.handle(request(0, 0, 1, &shots)).await?;
    assert_eq!(shot_location(&mut coordinator_end).await.1, "A1");
    connection
        .handle(Message::ShotResult {
            seq: 0,
            game_id: GameId(1),
            square_content: SquareContent::HitShip.code(),
        })
        .await?;
    connection.handle(request(1, 0, 1, &shots)).await?;
    assert_eq!(shot_location(&mut coordinator_end).await.1, "B1");

    // a new game starts with fresh players
    connection.handle(request(2, 0, 2, &shots)).await?;
    assert_eq!(shot_location(&mut coordinator_end).await.1, "A1");

    let results = RESULTS.lock().unwrap().clone();
    assert_eq!(results, vec![("A1".parse::<BoardIndex>()?, SquareContent::HitShip)]);
    Ok(())
}

#[tokio::test]
async fn new_request_supersedes_unanswered_shot() -> anyhow::Result<()> {
    let (mut connection, mut coordinator_end) = connected(PlayerRegistry::builtin());
    connection.handle(request(0, 0, 1, &Board::unknown())).await?;
    shot_location(&mut coordinator_end).await;
    connection.handle(request(1, 0, 1, &Board::unknown())).await?;
    let (seq, _) = shot_location(&mut coordinator_end).await;
    assert_eq!(seq, 1);

    // result for the superseded shot is stale now
    connection
        .handle(Message::ShotResult {
            seq: 0,
            game_id: GameId(1),
            square_content: 0,
        })
        .await?;
    assert!(connection.is_awaiting_result());
    Ok(())
}

#[tokio::test]
async fn write_failure_is_reported() {
    let (mut connection, coordinator_end) = connected(PlayerRegistry::builtin());
    drop(coordinator_end);
    let result = connection.handle(request(0, 0, 1, &Board::unknown())).await;
    assert!(result.is_err());
    assert!(!connection.is_awaiting_result());
}

#[tokio::test]
async fn other_messages_are_ignored() -> anyhow::Result<()> {
    let (mut connection, _coordinator_end) = connected(PlayerRegistry::builtin());
    connection.handle(Message::HandshakeAck { version: 1 }).await?;
    connection.detach();
    assert_eq!(connection.state(), ConnectionState::Disconnected);
    Ok(())
}
