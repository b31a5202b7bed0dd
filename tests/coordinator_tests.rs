use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use battleship_contest::{
    run_local_match, BattleHost, Coordinator, CoordinatorConfig, HostConfig, InMemoryTransport, Listener, MatchError,
    Message, MessageSink, MessageStream, Player, PlayerInfo, PlayerRegistry, Sequential, ShotError, Shutdown, TcpTransport,
    PROTOCOL_VERSION,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::net::TcpListener;

/// Hands out scripted accept results, then waits forever.
struct ScriptedListener {
    script: VecDeque<io::Result<(InMemoryTransport, String)>>,
}

#[async_trait::async_trait]
impl Listener for ScriptedListener {
    type Link = InMemoryTransport;

    async fn accept(&mut self) -> io::Result<(InMemoryTransport, String)> {
        match self.script.pop_front() {
            Some(next) => next,
            None => std::future::pending().await,
        }
    }
}

fn create_sequential() -> Box<dyn Player> {
    Box::new(Sequential)
}

static ONLY_ONE: [PlayerInfo; 1] = [PlayerInfo {
    name: "lonely",
    create: create_sequential,
}];

fn coordinator() -> Coordinator {
    Coordinator::new(CoordinatorConfig::default(), PlayerRegistry::builtin())
}

fn host(seed: u64) -> BattleHost {
    BattleHost::new(PlayerRegistry::builtin(), SmallRng::seed_from_u64(seed))
}

#[tokio::test]
async fn match_preconditions_are_checked_first() {
    let mut rng = SmallRng::seed_from_u64(1);

    let lonely = Coordinator::new(CoordinatorConfig::default(), PlayerRegistry::new(&ONLY_ONE));
    assert!(matches!(
        lonely.start_match(0, 0, &mut rng).await,
        Err(MatchError::TooFewPlayers { registered: 1 })
    ));

    let coordinator = coordinator();
    assert!(matches!(
        coordinator.start_match(0, 9, &mut rng).await,
        Err(MatchError::UnknownPlayer(9))
    ));
    assert!(matches!(
        coordinator.start_match(0, 1, &mut rng).await,
        Err(MatchError::NoHostConnected)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn plays_a_match_through_the_host() -> anyhow::Result<()> {
    let coordinator = coordinator();
    let (coordinator_end, host_end) = InMemoryTransport::pair();
    let host_shutdown = Shutdown::new();
    let host_task = tokio::spawn(host(2).run(host_end, host_shutdown.listener()));

    let reader = coordinator.accept_host(coordinator_end).await?;
    assert!(coordinator.connection().is_connected());

    let mut rng = SmallRng::seed_from_u64(9);
    let outcome = coordinator.start_match(2, 1, &mut rng).await?;
    assert!(outcome.winner < 2);
    assert!(outcome.rounds > 0 && outcome.rounds <= 100);

    // a second match on the same connection
    let again = coordinator.start_match(0, 0, &mut rng).await?;
    assert_ne!(again.game_id, outcome.game_id);

    coordinator.shutdown();
    reader.await?;
    host_task.await??;
    assert!(!coordinator.connection().is_connected());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn second_host_is_rejected() -> anyhow::Result<()> {
    let coordinator = coordinator();
    let shutdown = Shutdown::new();

    let (first_end, first_host_end) = InMemoryTransport::pair();
    let first_host = tokio::spawn(host(1).run(first_host_end, shutdown.listener()));
    let first_reader = coordinator.accept_host(first_end).await?;

    let (second_end, second_host_end) = InMemoryTransport::pair();
    let second_host = tokio::spawn(host(2).run(second_host_end, shutdown.listener()));
    let accepted = coordinator.accept_host(second_end).await;
    assert!(accepted.is_err());

    let err = second_host.await?.unwrap_err();
    assert!(err.to_string().contains("already connected"), "{:#}", err);
    assert!(coordinator.connection().is_connected());

    // once the first host leaves the slot is free again
    shutdown.trigger();
    first_host.await??;
    first_reader.await?;
    assert!(!coordinator.connection().is_connected());

    let (third_end, third_host_end) = InMemoryTransport::pair();
    let third_shutdown = Shutdown::new();
    let third_host = tokio::spawn(host(3).run(third_host_end, third_shutdown.listener()));
    let third_reader = coordinator.accept_host(third_end).await?;
    assert!(coordinator.connection().is_connected());

    coordinator.shutdown();
    third_reader.await?;
    third_host.await??;
    Ok(())
}

#[tokio::test]
async fn version_mismatch_is_rejected() -> anyhow::Result<()> {
    let coordinator = coordinator();
    let (coordinator_end, mut peer) = InMemoryTransport::pair();
    peer.send(Message::Handshake {
        version: PROTOCOL_VERSION + 1,
    })
    .await?;
    assert!(coordinator.accept_host(coordinator_end).await.is_err());
    assert!(matches!(peer.recv().await?, Message::Rejected { .. }));
    assert!(!coordinator.connection().is_connected());
    Ok(())
}

#[tokio::test]
async fn handshake_must_come_first() -> anyhow::Result<()> {
    let coordinator = coordinator();
    let (coordinator_end, mut peer) = InMemoryTransport::pair();
    peer.send(Message::HandshakeAck { version: 1 }).await?;
    assert!(coordinator.accept_host(coordinator_end).await.is_err());

    // the slot was never taken
    let (coordinator_end, mut peer) = InMemoryTransport::pair();
    peer.send(Message::Handshake {
        version: PROTOCOL_VERSION,
    })
    .await?;
    let reader = coordinator.accept_host(coordinator_end).await?;
    assert_eq!(
        peer.recv().await?,
        Message::HandshakeAck {
            version: PROTOCOL_VERSION
        }
    );
    drop(peer);
    reader.await?;
    assert!(!coordinator.connection().is_connected());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_cancels_an_unanswered_shot() -> anyhow::Result<()> {
    let coordinator = coordinator();
    let (coordinator_end, mut silent_host) = InMemoryTransport::pair();
    silent_host
        .send(Message::Handshake {
            version: PROTOCOL_VERSION,
        })
        .await?;
    let reader = coordinator.accept_host(coordinator_end).await?;
    assert!(matches!(silent_host.recv().await?, Message::HandshakeAck { .. }));

    let running = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            let mut rng = SmallRng::seed_from_u64(4);
            coordinator.start_match(0, 1, &mut rng).await
        })
    };
    assert!(matches!(silent_host.recv().await?, Message::RequestShot { .. }));

    coordinator.shutdown();
    let result = tokio::time::timeout(Duration::from_secs(5), running).await??;
    match result {
        Err(MatchError::Shot {
            source: ShotError::Cancelled,
            ..
        }) => {}
        other => panic!("expected cancelled shot, got {:?}", other),
    }
    reader.await?;
    assert!(coordinator.is_shutting_down());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn host_disconnect_fails_the_running_match() -> anyhow::Result<()> {
    let coordinator = coordinator();
    let (coordinator_end, mut vanishing_host) = InMemoryTransport::pair();
    vanishing_host
        .send(Message::Handshake {
            version: PROTOCOL_VERSION,
        })
        .await?;
    let reader = coordinator.accept_host(coordinator_end).await?;
    vanishing_host.recv().await?;

    let running = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            let mut rng = SmallRng::seed_from_u64(4);
            coordinator.start_match(0, 1, &mut rng).await
        })
    };
    vanishing_host.recv().await?;
    drop(vanishing_host);

    let result = tokio::time::timeout(Duration::from_secs(5), running).await??;
    assert!(matches!(
        result,
        Err(MatchError::Shot {
            source: ShotError::Cancelled,
            ..
        })
    ));
    reader.await?;
    assert!(!coordinator.is_shutting_down());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn match_over_tcp() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let coordinator = coordinator();
    let server = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.serve(listener).await })
    };

    let host_shutdown = Shutdown::new();
    let config = HostConfig {
        connect: addr.to_string(),
    };
    let host_task = {
        let listener = host_shutdown.listener();
        tokio::spawn(async move { host(5).connect(&config, listener).await })
    };

    tokio::time::timeout(Duration::from_secs(5), coordinator.connection().wait_connected()).await?;
    let mut rng = SmallRng::seed_from_u64(6);
    let outcome = coordinator.start_match(1, 2, &mut rng).await?;
    assert!(outcome.shots[outcome.winner] == outcome.rounds);

    coordinator.shutdown();
    server.await??;
    host_task.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn second_tcp_host_gets_rejected_message() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let coordinator = coordinator();
    let server = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.serve(listener).await })
    };

    let mut first = TcpTransport::connect(addr).await?;
    first
        .send(Message::Handshake {
            version: PROTOCOL_VERSION,
        })
        .await?;
    assert!(matches!(first.recv().await?, Message::HandshakeAck { .. }));

    let mut second = TcpTransport::connect(addr).await?;
    second
        .send(Message::Handshake {
            version: PROTOCOL_VERSION,
        })
        .await?;
    match second.recv().await? {
        Message::Rejected { reason } => assert!(reason.contains("already connected")),
        other => panic!("expected Rejected, got {:?}", other),
    }

    coordinator.shutdown();
    server.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn local_match_is_reproducible() -> anyhow::Result<()> {
    let first = run_local_match("hunter", "random", Some(3)).await?;
    let second = run_local_match("hunter", "random", Some(3)).await?;
    assert_eq!(first, second);
    assert!(run_local_match("hunter", "nobody", Some(3)).await.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_accept_does_not_stop_serving() -> anyhow::Result<()> {
    let coordinator = coordinator();
    let (coordinator_end, host_end) = InMemoryTransport::pair();
    let listener = ScriptedListener {
        script: VecDeque::from([
            Err(io::Error::other("too many open files")),
            Ok((coordinator_end, "in-memory".to_string())),
        ]),
    };
    let server = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.serve_from(listener).await })
    };

    let host_shutdown = Shutdown::new();
    let host_task = tokio::spawn(host(8).run(host_end, host_shutdown.listener()));

    tokio::time::timeout(Duration::from_secs(5), coordinator.connection().wait_connected()).await?;
    let mut rng = SmallRng::seed_from_u64(8);
    let outcome = coordinator.start_match(0, 1, &mut rng).await?;
    assert!(outcome.winner < 2);

    coordinator.shutdown();
    server.await??;
    host_task.await??;
    Ok(())
}
