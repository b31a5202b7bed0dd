use battleship_contest::{Board, GameId, Message, MessageSink, MessageStream, TcpTransport, Transport};
use tokio::net::TcpListener;
use tokio::time::Duration;

fn request() -> Message {
    Message::RequestShot {
        seq: 3,
        shooter: 0,
        opponent: 1,
        game_id: GameId(0xdead_beef),
        board: Board::unknown().to_bytes().to_vec(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn frames_arrive_in_order() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let mut transport = TcpTransport::new(socket);
        let mut received = Vec::new();
        for _ in 0..3 {
            received.push(transport.recv().await?);
        }
        transport
            .send(Message::Shot {
                seq: 3,
                game_id: GameId(0xdead_beef),
                location: "J10".into(),
            })
            .await?;
        anyhow::Ok(received)
    });

    let mut client = TcpTransport::connect(addr).await?;
    client.send(Message::Handshake { version: 1 }).await?;
    client.send(request()).await?;
    client
        .send(Message::Crash {
            seq: 4,
            game_id: GameId(1),
            reason: "gone".into(),
        })
        .await?;
    let answer = client.recv().await?;

    let received = server.await??;
    assert_eq!(received[0], Message::Handshake { version: 1 });
    assert_eq!(received[1], request());
    assert_eq!(received[1].kind(), "RequestShot");
    assert!(matches!(received[2], Message::Crash { .. }));
    assert!(matches!(answer, Message::Shot { ref location, .. } if location == "J10"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn split_halves_work_independently() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let mut transport = TcpTransport::new(socket);
        // echo until the client goes away
        while let Ok(msg) = transport.recv().await {
            transport.send(msg).await?;
        }
        anyhow::Ok(())
    });

    let (mut sink, mut stream) = TcpTransport::connect(addr).await?.split();
    let reader = tokio::spawn(async move {
        let mut seen = Vec::new();
        for _ in 0..2 {
            seen.push(stream.recv().await?);
        }
        anyhow::Ok(seen)
    });
    sink.send(Message::HandshakeAck { version: 1 }).await?;
    sink.send(request()).await?;

    let seen = reader.await??;
    assert_eq!(seen, vec![Message::HandshakeAck { version: 1 }, request()]);
    drop(sink);
    server.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn receive_timeout_is_reported() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        tokio::time::sleep(Duration::from_millis(500)).await;
        drop(socket);
        anyhow::Ok(())
    });

    let stream = tokio::net::TcpStream::connect(addr).await?;
    let mut transport = TcpTransport::with_timeout(stream, Duration::from_millis(50));
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("Receive timeout"), "{}", err);
    server.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn outgoing_frames_respect_size_limit() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (_socket, _) = listener.accept().await?;
        anyhow::Ok(())
    });

    let mut transport = TcpTransport::connect(addr).await?.with_max_message_size(64);
    let err = transport.send(request()).await.unwrap_err();
    assert!(err.to_string().contains("Message too large"), "{}", err);
    server.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn peer_close_is_reported() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        drop(socket);
        anyhow::Ok(())
    });

    let mut transport = TcpTransport::connect(addr).await?;
    server.await??;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("Connection"), "{}", err);
    Ok(())
}
