use std::boxed::Box;
use std::string::{String, ToString};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::Message;
use crate::transport::{Listener, MessageSink, MessageStream, Transport};

/// Default timeout for writing one frame (30 seconds).
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest frame payload accepted in either direction (10 MB).
const MAX_MESSAGE_SIZE: u32 = 10_000_000;

/// Length-prefixed bincode frames over TCP.
///
/// Every frame is a 4-byte big-endian payload length followed by the
/// bincode-encoded [`Message`]. Receiving waits indefinitely unless a receive
/// timeout is configured, since a host may idle between matches.
pub struct TcpTransport {
    stream: TcpStream,
    limits: FrameLimits,
}

#[derive(Debug, Clone, Copy)]
struct FrameLimits {
    send_timeout: Duration,
    recv_timeout: Option<Duration>,
    max_message_size: u32,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            send_timeout: DEFAULT_SEND_TIMEOUT,
            recv_timeout: None,
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}

pub struct TcpSender {
    writer: OwnedWriteHalf,
    limits: FrameLimits,
}

pub struct TcpReceiver {
    reader: OwnedReadHalf,
    limits: FrameLimits,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            limits: FrameLimits::default(),
        }
    }

    /// Transport whose sends and receives both give up after `timeout_duration`.
    pub fn with_timeout(stream: TcpStream, timeout_duration: Duration) -> Self {
        Self {
            stream,
            limits: FrameLimits {
                send_timeout: timeout_duration,
                recv_timeout: Some(timeout_duration),
                ..FrameLimits::default()
            },
        }
    }

    pub fn with_max_message_size(mut self, max_message_size: u32) -> Self {
        self.limits.max_message_size = max_message_size;
        self
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }
}

fn write_error(e: std::io::Error) -> anyhow::Error {
    if e.kind() == std::io::ErrorKind::BrokenPipe || e.kind() == std::io::ErrorKind::ConnectionReset {
        anyhow::anyhow!("Connection closed by peer")
    } else {
        anyhow::anyhow!("Write error: {}", e)
    }
}

fn read_error(e: std::io::Error) -> anyhow::Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        anyhow::anyhow!("Connection closed by peer")
    } else if e.kind() == std::io::ErrorKind::ConnectionReset {
        anyhow::anyhow!("Connection reset by peer")
    } else {
        anyhow::anyhow!("Read error: {}", e)
    }
}

async fn write_frame<W>(writer: &mut W, msg: &Message, limits: FrameLimits) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let send_op = async {
        let data = bincode::serialize(msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
        if data.len() as u64 > limits.max_message_size as u64 {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                data.len(),
                limits.max_message_size
            ));
        }

        let len = (data.len() as u32).to_be_bytes();
        writer.write_all(&len).await.map_err(write_error)?;
        writer.write_all(&data).await.map_err(write_error)?;
        writer.flush().await.map_err(write_error)?;
        anyhow::Ok(())
    };

    timeout(limits.send_timeout, send_op)
        .await
        .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", limits.send_timeout))?
}

async fn read_frame<R>(reader: &mut R, limits: FrameLimits) -> anyhow::Result<Message>
where
    R: AsyncRead + Unpin + Send,
{
    let recv_op = async {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf).await.map_err(read_error)?;

        let len = u32::from_be_bytes(len_buf);
        if len > limits.max_message_size {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                len,
                limits.max_message_size
            ));
        }
        if len == 0 {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }

        let mut buf = vec![0u8; len as usize];
        reader.read_exact(&mut buf).await.map_err(read_error)?;

        let msg: Message = bincode::deserialize(&buf).map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))?;
        anyhow::Ok(msg)
    };

    match limits.recv_timeout {
        Some(limit) => timeout(limit, recv_op)
            .await
            .map_err(|_| anyhow::anyhow!("Receive timeout after {:?}", limit))?,
        None => recv_op.await,
    }
}

#[async_trait::async_trait]
impl MessageSink for TcpTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        write_frame(&mut self.stream, &msg, self.limits).await
    }
}

#[async_trait::async_trait]
impl MessageStream for TcpTransport {
    async fn recv(&mut self) -> anyhow::Result<Message> {
        read_frame(&mut self.stream, self.limits).await
    }
}

#[async_trait::async_trait]
impl MessageSink for TcpSender {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        write_frame(&mut self.writer, &msg, self.limits).await
    }
}

#[async_trait::async_trait]
impl MessageStream for TcpReceiver {
    async fn recv(&mut self) -> anyhow::Result<Message> {
        read_frame(&mut self.reader, self.limits).await
    }
}

impl Transport for TcpTransport {
    fn split(self) -> (Box<dyn MessageSink>, Box<dyn MessageStream>) {
        let (reader, writer) = self.stream.into_split();
        (
            Box::new(TcpSender {
                writer,
                limits: self.limits,
            }),
            Box::new(TcpReceiver {
                reader,
                limits: self.limits,
            }),
        )
    }
}

#[async_trait::async_trait]
impl Listener for TcpListener {
    type Link = TcpTransport;

    async fn accept(&mut self) -> std::io::Result<(TcpTransport, String)> {
        let (stream, addr) = TcpListener::accept(self).await?;
        Ok((TcpTransport::new(stream), addr.to_string()))
    }
}
