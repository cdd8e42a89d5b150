use super::{Channel, ChannelError};
use async_trait::async_trait;
use lib::protocol::{Event, Intent};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::instrument;

/// A [`Channel`] that exchanges one JSON message per line.
#[derive(Debug)]
pub struct Pipe<W: AsyncWrite, R: AsyncRead> {
    writer: W,
    reader: Lines<BufReader<R>>,
}

impl<W: AsyncWrite, R: AsyncRead> Pipe<W, R> {
    pub fn new(writer: W, reader: R) -> Self {
        Pipe {
            writer,
            reader: BufReader::new(reader).lines(),
        }
    }
}

impl<W: AsyncWrite, R: AsyncRead> From<(W, R)> for Pipe<W, R> {
    fn from((writer, reader): (W, R)) -> Self {
        Pipe::new(writer, reader)
    }
}

#[async_trait]
impl<W: AsyncWrite + Send + Unpin, R: AsyncRead + Send + Unpin> Channel for Pipe<W, R> {
    #[instrument(level = "trace", skip(self), ret, err)]
    async fn recv(&mut self) -> Result<Intent, ChannelError> {
        loop {
            let line = self.reader.next_line().await.map_err(ChannelError::Io)?;
            let line = line.ok_or(ChannelError::Closed)?;

            if !line.trim().is_empty() {
                break line.parse().map_err(ChannelError::Malformed);
            }
        }
    }

    #[instrument(level = "trace", skip(self, event), err)]
    async fn send(&mut self, event: &Event) -> Result<(), ChannelError> {
        let msg = serde_json::to_string(event).map_err(|e| ChannelError::Io(e.into()))?;
        self.writer.write_all(msg.as_bytes()).await.map_err(ChannelError::Io)?;
        self.writer.write_u8(b'\n').await.map_err(ChannelError::Io)?;
        self.writer.flush().await.map_err(ChannelError::Io)?;
        Ok(())
    }
}
