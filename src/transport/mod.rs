//! Ordered, reliable message streams between coordinator and host.

use std::boxed::Box;
use std::string::String;

use crate::protocol::Message;

/// Sending half of a link.
#[async_trait::async_trait]
pub trait MessageSink: Send {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
}

/// Receiving half of a link. An error means the link is unusable.
#[async_trait::async_trait]
pub trait MessageStream: Send {
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

/// A full duplex link that can be split so that one task reads while
/// another writes.
pub trait Transport: MessageSink + MessageStream {
    fn split(self) -> (Box<dyn MessageSink>, Box<dyn MessageStream>)
    where
        Self: Sized;
}

/// Source of incoming links, each with a printable peer name.
#[async_trait::async_trait]
pub trait Listener: Send {
    type Link: Transport + 'static;

    async fn accept(&mut self) -> std::io::Result<(Self::Link, String)>;
}

pub mod in_memory;
pub mod tcp;
