use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};
use tracing::trace;

use crate::error::{AppError, AppResult, DistributedError};

use super::codec::Frame;
use super::types::{
    PrepareMessage, PrimaryParameters, ResultMessage, SecondaryParameters, StartMessage,
};

/// Buffered, frame-oriented view of one primary/secondary connection.
///
/// Frames are buffered on write; callers flush at the protocol's sync
/// points.
pub(crate) struct FramedStream<S> {
    stream: BufStream<S>,
    peer: String,
    scratch: Vec<u8>,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub(crate) fn new(stream: S, peer: String) -> Self {
        Self {
            stream: BufStream::new(stream),
            peer,
            scratch: Vec::with_capacity(256),
        }
    }

    pub(crate) fn peer(&self) -> &str {
        &self.peer
    }

    pub(crate) async fn send<F>(&mut self, frame: &F) -> AppResult<()>
    where
        F: Frame + Sync,
    {
        self.scratch.clear();
        frame.encode(&mut self.scratch).map_err(AppError::wire)?;
        self.stream.write_all(&self.scratch).await.map_err(|err| {
            AppError::distributed(DistributedError::Io {
                context: "send frame",
                source: err,
            })
        })
    }

    pub(crate) async fn flush(&mut self) -> AppResult<()> {
        self.stream.flush().await.map_err(|err| {
            AppError::distributed(DistributedError::Io {
                context: "flush frames",
                source: err,
            })
        })
    }

    pub(crate) async fn recv<F>(&mut self) -> AppResult<F>
    where
        F: Frame,
    {
        F::decode(&mut self.stream).await.map_err(AppError::wire)
    }

    pub(crate) async fn shutdown(&mut self) -> AppResult<()> {
        self.stream.shutdown().await.map_err(|err| {
            AppError::distributed(DistributedError::Io {
                context: "close connection",
                source: err,
            })
        })
    }
}

/// The primary's end of a secondary connection.
pub(crate) struct SecondaryLink<S> {
    framed: FramedStream<S>,
}

impl<S> SecondaryLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub(crate) fn new(stream: S, peer: String) -> Self {
        Self {
            framed: FramedStream::new(stream, peer),
        }
    }

    pub(crate) fn peer(&self) -> &str {
        self.framed.peer()
    }

    pub(crate) async fn negotiate(
        &mut self,
        params: &PrimaryParameters,
    ) -> AppResult<SecondaryParameters> {
        self.framed.send(params).await?;
        self.framed.flush().await?;
        self.framed.recv::<SecondaryParameters>().await
    }

    pub(crate) async fn send_prepare(&mut self, message: &PrepareMessage) -> AppResult<()> {
        self.framed.send(message).await
    }

    #[cfg(test)]
    pub(crate) async fn flush(&mut self) -> AppResult<()> {
        self.framed.flush().await
    }

    /// Terminates the prepare stream and waits for the secondary's ready
    /// marker.
    pub(crate) async fn sync_ready(&mut self) -> AppResult<()> {
        self.framed.send(&PrepareMessage::Done).await?;
        self.framed.flush().await?;
        trace!("wait for {} to be ready", self.framed.peer());
        match self.framed.recv::<PrepareMessage>().await? {
            PrepareMessage::Done => Ok(()),
            PrepareMessage::Client(_) | PrepareMessage::Interaction(_) => {
                Err(AppError::distributed(DistributedError::UnexpectedMessage {
                    peer: self.framed.peer().to_owned(),
                    expected: "ready marker",
                }))
            }
        }
    }

    /// Releases the secondary once every secondary reported ready.
    pub(crate) async fn release(&mut self) -> AppResult<()> {
        self.framed.send(&PrepareMessage::Done).await?;
        self.framed.flush().await
    }

    pub(crate) async fn start(&mut self, message: &StartMessage) -> AppResult<()> {
        self.framed.send(message).await?;
        self.framed.flush().await
    }

    pub(crate) async fn pull_result(&mut self) -> AppResult<ResultMessage> {
        self.framed.recv::<ResultMessage>().await
    }

    pub(crate) async fn close(&mut self) -> AppResult<()> {
        self.framed.shutdown().await
    }
}

/// A secondary's end of its primary connection.
pub(crate) struct PrimaryLink<S> {
    framed: FramedStream<S>,
}

impl<S> PrimaryLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub(crate) fn new(stream: S, peer: String) -> Self {
        Self {
            framed: FramedStream::new(stream, peer),
        }
    }

    pub(crate) fn peer(&self) -> &str {
        self.framed.peer()
    }

    pub(crate) async fn negotiate(
        &mut self,
        params: &SecondaryParameters,
    ) -> AppResult<PrimaryParameters> {
        let primary = self.framed.recv::<PrimaryParameters>().await?;
        self.framed.send(params).await?;
        self.framed.flush().await?;
        Ok(primary)
    }

    pub(crate) async fn wait_prepare(&mut self) -> AppResult<PrepareMessage> {
        self.framed.recv::<PrepareMessage>().await
    }

    /// Reports readiness, then blocks until the primary releases every
    /// secondary.
    pub(crate) async fn sync_ready(&mut self) -> AppResult<()> {
        self.framed.send(&PrepareMessage::Done).await?;
        self.framed.flush().await?;
        match self.framed.recv::<PrepareMessage>().await? {
            PrepareMessage::Done => Ok(()),
            PrepareMessage::Client(_) | PrepareMessage::Interaction(_) => {
                Err(AppError::distributed(DistributedError::UnexpectedMessage {
                    peer: self.framed.peer().to_owned(),
                    expected: "release marker",
                }))
            }
        }
    }

    pub(crate) async fn wait_start(&mut self) -> AppResult<StartMessage> {
        self.framed.recv::<StartMessage>().await
    }

    pub(crate) async fn push_result(&mut self, message: &ResultMessage) -> AppResult<()> {
        self.framed.send(message).await?;
        if matches!(message, ResultMessage::Done) {
            self.framed.flush().await?;
        }
        Ok(())
    }

    pub(crate) async fn close(&mut self) -> AppResult<()> {
        self.framed.shutdown().await
    }
}
