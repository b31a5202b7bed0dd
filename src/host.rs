//! Battle host service: runs players on behalf of a coordinator.

use anyhow::bail;
use log::{error, info};
use rand::rngs::SmallRng;

use crate::config::HostConfig;
use crate::connection::CoordinatorConnection;
use crate::lifecycle::ShutdownListener;
use crate::player::PlayerRegistry;
use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::transport::tcp::TcpTransport;
use crate::transport::Transport;

pub struct BattleHost {
    registry: PlayerRegistry,
    rng: SmallRng,
}

impl BattleHost {
    pub fn new(registry: PlayerRegistry, rng: SmallRng) -> Self {
        Self { registry, rng }
    }

    /// Connect to the coordinator named in `config` and serve it.
    pub async fn connect(self, config: &HostConfig, shutdown: ShutdownListener) -> anyhow::Result<()> {
        info!("Connecting to coordinator at {}", config.connect);
        let transport = TcpTransport::connect(config.connect.as_str()).await?;
        self.run(transport, shutdown).await
    }

    /// Handshake, then answer coordinator messages until the stream closes
    /// or `shutdown` fires.
    pub async fn run<T: Transport>(self, mut transport: T, mut shutdown: ShutdownListener) -> anyhow::Result<()> {
        transport
            .send(Message::Handshake {
                version: PROTOCOL_VERSION,
            })
            .await?;
        match transport.recv().await? {
            Message::HandshakeAck { version } if version == PROTOCOL_VERSION => {}
            Message::HandshakeAck { version } => bail!(
                "Protocol version mismatch in HandshakeAck: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            ),
            Message::Rejected { reason } => bail!("Coordinator rejected this battle host: {}", reason),
            other => bail!("Expected HandshakeAck, got {}", other.kind()),
        }
        info!("Connected to coordinator");

        let (sink, mut stream) = transport.split();
        let mut connection = CoordinatorConnection::new(self.registry, self.rng);
        connection.attach(sink)?;

        let result = loop {
            tokio::select! {
                msg = stream.recv() => match msg {
                    Ok(msg) => {
                        if let Err(e) = connection.handle(msg).await {
                            error!("Error while talking to coordinator: {:#}", e);
                            break Err(e);
                        }
                    }
                    Err(e) => {
                        info!("Coordinator closed the connection: {:#}", e);
                        break Ok(());
                    }
                },
                _ = shutdown.wait() => {
                    info!("Battle host shutting down");
                    break Ok(());
                }
            }
        };
        connection.detach();
        result
    }
}
