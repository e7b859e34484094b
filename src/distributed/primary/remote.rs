use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

use crate::distributed::protocol::{
    MAX_KINDS_PER_CLIENT, PrepareClient, PrepareInteraction, PrepareMessage, PrimaryParameters,
    ResultMessage, SecondaryLink, StartMessage,
};
use crate::error::{AppError, AppResult, DistributedError};
use crate::results::SecondaryResult;

/// Primary-side bookkeeping for one client hosted on a secondary.
#[derive(Debug)]
pub(crate) struct RemoteClient {
    kind: String,
    /// Interaction kinds in first-seen order; the position is the wire index.
    kinds: Vec<String>,
    end: f64,
}

impl RemoteClient {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_owned(),
            kinds: Vec::new(),
            end: 0.0,
        }
    }

    fn kind_index(&mut self, index: usize, kind: &str) -> AppResult<usize> {
        if let Some(position) = self.kinds.iter().position(|known| known == kind) {
            return Ok(position);
        }
        if self.kinds.len() >= MAX_KINDS_PER_CLIENT {
            return Err(AppError::distributed(DistributedError::TooManyKinds {
                index,
                max: MAX_KINDS_PER_CLIENT,
            }));
        }
        self.kinds.push(kind.to_owned());
        Ok(self.kinds.len().saturating_sub(1))
    }
}

pub(crate) struct RemoteSecondary<S> {
    link: SecondaryLink<S>,
    tags: Vec<String>,
    clients: Vec<RemoteClient>,
}

impl<S> RemoteSecondary<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Exchanges parameters; the secondary's tags gain its own address.
    pub(crate) async fn negotiate(
        mut link: SecondaryLink<S>,
        params: &PrimaryParameters,
    ) -> AppResult<Self> {
        let reply = link.negotiate(params).await?;
        let mut tags = reply.tags;
        tags.push(link.peer().to_owned());
        debug!("secondary {} tags: {:?}", link.peer(), tags);
        Ok(Self {
            link,
            tags,
            clients: Vec::new(),
        })
    }

    pub(crate) fn addr(&self) -> &str {
        self.link.peer()
    }

    pub(crate) fn tags(&self) -> &[String] {
        &self.tags
    }

    pub(crate) async fn create_client(&mut self, kind: &str, view: Vec<String>) -> AppResult<usize> {
        let index = self.clients.len();
        trace!("prepare client {} ({}) on secondary {}", index, kind, self.addr());
        self.link
            .send_prepare(&PrepareMessage::Client(PrepareClient { index, view }))
            .await?;
        self.clients.push(RemoteClient::new(kind));
        Ok(index)
    }

    pub(crate) async fn send_interaction(
        &mut self,
        secondary: usize,
        client: usize,
        kind: &str,
        offset: f64,
        payload: Vec<u8>,
    ) -> AppResult<()> {
        if !offset.is_finite() || offset < 0.0 {
            return Err(AppError::distributed(DistributedError::InvalidOffset {
                index: client,
                offset,
            }));
        }
        let remote = self.clients.get_mut(client).ok_or_else(|| {
            AppError::distributed(DistributedError::UnknownClient { secondary, client })
        })?;
        let kind = remote.kind_index(client, kind)?;
        remote.end = remote.end.max(offset);
        self.link
            .send_prepare(&PrepareMessage::Interaction(PrepareInteraction {
                client,
                kind,
                offset,
                payload,
            }))
            .await
    }

    /// Largest scheduled offset over every client of this secondary.
    pub(crate) fn end(&self) -> f64 {
        self.clients
            .iter()
            .map(|client| client.end)
            .fold(0.0, f64::max)
    }

    pub(crate) async fn ready(&mut self) -> AppResult<()> {
        self.link.sync_ready().await
    }

    pub(crate) async fn release(&mut self) -> AppResult<()> {
        self.link.release().await
    }

    pub(crate) async fn start(&mut self, duration: f64) -> AppResult<()> {
        self.link.start(&StartMessage { duration }).await
    }

    /// Pulls every result record, resolving kind indices back to names.
    pub(crate) async fn collect(&mut self) -> AppResult<SecondaryResult> {
        let mut result = SecondaryResult::new(self.addr().to_owned(), self.tags.clone());
        loop {
            let record = match self.link.pull_result().await? {
                ResultMessage::Done => break,
                ResultMessage::Interaction(record) => record,
            };
            let client = self.clients.get(record.client).ok_or_else(|| {
                AppError::distributed(DistributedError::InvalidResultClient {
                    addr: self.addr().to_owned(),
                    index: record.client,
                })
            })?;
            let kind = client.kinds.get(record.kind).ok_or_else(|| {
                AppError::distributed(DistributedError::InvalidResultKind {
                    addr: self.addr().to_owned(),
                    index: record.client,
                    kind: record.kind,
                })
            })?;
            result.add_result(&record, &client.kind, kind);
        }
        trace!("end of results for {}", self.addr());
        Ok(result)
    }

    pub(crate) async fn close(&mut self) -> AppResult<()> {
        self.link.close().await
    }
}
