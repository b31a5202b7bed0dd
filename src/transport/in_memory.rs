use std::boxed::Box;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::protocol::Message;
use crate::transport::{MessageSink, MessageStream, Transport};

/// One end of an in-process link.
pub struct InMemoryTransport {
    sender: InMemorySender,
    receiver: InMemoryReceiver,
}

pub struct InMemorySender {
    tx: UnboundedSender<Message>,
}

pub struct InMemoryReceiver {
    rx: UnboundedReceiver<Message>,
}

impl InMemoryTransport {
    /// Two connected ends: what one sends, the other receives.
    pub fn pair() -> (Self, Self) {
        let (tx1, rx1) = unbounded_channel();
        let (tx2, rx2) = unbounded_channel();
        (
            Self {
                sender: InMemorySender { tx: tx2 },
                receiver: InMemoryReceiver { rx: rx1 },
            },
            Self {
                sender: InMemorySender { tx: tx1 },
                receiver: InMemoryReceiver { rx: rx2 },
            },
        )
    }
}

#[async_trait::async_trait]
impl MessageSink for InMemorySender {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        self.tx
            .send(msg)
            .map_err(|_| anyhow::anyhow!("Channel closed"))
    }
}

#[async_trait::async_trait]
impl MessageStream for InMemoryReceiver {
    async fn recv(&mut self) -> anyhow::Result<Message> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Channel closed"))
    }
}

#[async_trait::async_trait]
impl MessageSink for InMemoryTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        self.sender.send(msg).await
    }
}

#[async_trait::async_trait]
impl MessageStream for InMemoryTransport {
    async fn recv(&mut self) -> anyhow::Result<Message> {
        self.receiver.recv().await
    }
}

impl Transport for InMemoryTransport {
    fn split(self) -> (Box<dyn MessageSink>, Box<dyn MessageStream>) {
        (Box::new(self.sender), Box::new(self.receiver))
    }
}
