use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{FrameFamily, WireError, WireField};

use super::types::{
    InteractionRecord, MAX_PAYLOAD_BYTES, MAX_SHORT_COUNT, MAX_SHORT_STRING,
    MAX_VIEW_ADDRESSES, PREPARE_TAG_CLIENT, PREPARE_TAG_DONE, PREPARE_TAG_INTERACTION,
    PrepareClient, PrepareInteraction, PrepareMessage, PrimaryParameters, RESULT_TAG_DONE,
    RESULT_TAG_INTERACTION, ResultMessage, SecondaryParameters, StartMessage,
};

/// Wire value standing for "did not happen" in result records.
const ABSENT_TIME: f64 = -1.0;

/// A control-plane message with a fixed binary layout.
///
/// Encoding validates every limit before writing, so a failed encode leaves
/// `out` untouched.
#[async_trait]
pub trait Frame: Sized + Send {
    const FAMILY: FrameFamily;

    /// Appends the encoded frame to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error when a field exceeds its wire limit.
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), WireError>;

    /// Reads exactly one frame from `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error when the frame is truncated or malformed.
    async fn decode<R>(reader: &mut R) -> Result<Self, WireError>
    where
        R: AsyncRead + Unpin + Send;
}

#[async_trait]
impl Frame for PrimaryParameters {
    const FAMILY: FrameFamily = FrameFamily::Parameters;

    fn encode(&self, out: &mut Vec<u8>) -> Result<(), WireError> {
        let sysname_len = short_len(WireField::SystemName, &self.sysname)?;
        let count = short_count(WireField::Parameters, self.params.len())?;
        let mut pairs = Vec::with_capacity(self.params.len());
        for (key, value) in &self.params {
            let key_len = short_len(WireField::ParameterKey, key)?;
            let value_len = short_len(WireField::ParameterValue, value)?;
            pairs.push((key_len, value_len, key, value));
        }

        out.push(sysname_len);
        out.extend_from_slice(self.sysname.as_bytes());
        out.push(count);
        for (key_len, value_len, key, value) in pairs {
            out.push(key_len);
            out.push(value_len);
            out.extend_from_slice(key.as_bytes());
            out.extend_from_slice(value.as_bytes());
        }
        out.extend_from_slice(&self.max_delay.to_le_bytes());
        out.extend_from_slice(&self.max_skew.to_le_bytes());
        Ok(())
    }

    async fn decode<R>(reader: &mut R) -> Result<Self, WireError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut frame = FrameReader::new(reader, Self::FAMILY);
        let sysname_len = frame.u8().await?;
        let sysname = frame.string(WireField::SystemName, sysname_len.into()).await?;
        let count = frame.u8().await?;
        let mut params = BTreeMap::new();
        for _ in 0..count {
            let key_len = frame.u8().await?;
            let value_len = frame.u8().await?;
            let key = frame.string(WireField::ParameterKey, key_len.into()).await?;
            let value = frame
                .string(WireField::ParameterValue, value_len.into())
                .await?;
            params.insert(key, value);
        }
        let max_delay = frame.f64().await?;
        let max_skew = frame.f64().await?;
        Ok(Self {
            sysname,
            params,
            max_delay,
            max_skew,
        })
    }
}

#[async_trait]
impl Frame for SecondaryParameters {
    const FAMILY: FrameFamily = FrameFamily::Parameters;

    fn encode(&self, out: &mut Vec<u8>) -> Result<(), WireError> {
        let count = short_count(WireField::Tags, self.tags.len())?;
        let lens = self
            .tags
            .iter()
            .map(|tag| short_len(WireField::Tag, tag))
            .collect::<Result<Vec<u8>, WireError>>()?;

        out.push(count);
        for (len, tag) in lens.into_iter().zip(&self.tags) {
            out.push(len);
            out.extend_from_slice(tag.as_bytes());
        }
        Ok(())
    }

    async fn decode<R>(reader: &mut R) -> Result<Self, WireError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut frame = FrameReader::new(reader, Self::FAMILY);
        let count = frame.u8().await?;
        let mut tags = Vec::with_capacity(count.into());
        for _ in 0..count {
            let len = frame.u8().await?;
            tags.push(frame.string(WireField::Tag, len.into()).await?);
        }
        Ok(Self { tags })
    }
}

#[async_trait]
impl Frame for PrepareMessage {
    const FAMILY: FrameFamily = FrameFamily::Prepare;

    fn encode(&self, out: &mut Vec<u8>) -> Result<(), WireError> {
        match self {
            PrepareMessage::Done => {
                out.push(PREPARE_TAG_DONE);
                Ok(())
            }
            PrepareMessage::Client(client) => encode_prepare_client(client, out),
            PrepareMessage::Interaction(interaction) => {
                encode_prepare_interaction(interaction, out)
            }
        }
    }

    async fn decode<R>(reader: &mut R) -> Result<Self, WireError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut frame = FrameReader::new(reader, Self::FAMILY);
        match frame.u8().await? {
            PREPARE_TAG_DONE => Ok(PrepareMessage::Done),
            PREPARE_TAG_CLIENT => {
                let view_count = frame.u16().await?;
                let mut view = Vec::with_capacity(view_count.into());
                for _ in 0..view_count {
                    let len = frame.u8().await?;
                    view.push(frame.string(WireField::ViewAddress, len.into()).await?);
                }
                let index = widen(frame.u32().await?);
                Ok(PrepareMessage::Client(PrepareClient { index, view }))
            }
            PREPARE_TAG_INTERACTION => {
                let client = widen(frame.u32().await?);
                let kind = usize::from(frame.u8().await?);
                let offset = frame.f64().await?;
                let len = frame.u16().await?;
                let payload = frame.bytes(len.into()).await?;
                Ok(PrepareMessage::Interaction(PrepareInteraction {
                    client,
                    kind,
                    offset,
                    payload,
                }))
            }
            tag => Err(WireError::UnknownTag {
                family: Self::FAMILY,
                tag,
            }),
        }
    }
}

fn encode_prepare_client(client: &PrepareClient, out: &mut Vec<u8>) -> Result<(), WireError> {
    let view_count = u16::try_from(client.view.len()).map_err(|_err| WireError::TooManyEntries {
        field: WireField::View,
        count: client.view.len(),
        max: MAX_VIEW_ADDRESSES,
    })?;
    let lens = client
        .view
        .iter()
        .map(|addr| short_len(WireField::ViewAddress, addr))
        .collect::<Result<Vec<u8>, WireError>>()?;
    let index = client_index(client.index)?;

    out.push(PREPARE_TAG_CLIENT);
    out.extend_from_slice(&view_count.to_le_bytes());
    for (len, addr) in lens.into_iter().zip(&client.view) {
        out.push(len);
        out.extend_from_slice(addr.as_bytes());
    }
    out.extend_from_slice(&index.to_le_bytes());
    Ok(())
}

fn encode_prepare_interaction(
    interaction: &PrepareInteraction,
    out: &mut Vec<u8>,
) -> Result<(), WireError> {
    let index = client_index(interaction.client)?;
    let kind = kind_index(interaction.kind)?;
    let payload_len =
        u16::try_from(interaction.payload.len()).map_err(|_err| WireError::PayloadTooLarge {
            len: interaction.payload.len(),
            max: MAX_PAYLOAD_BYTES,
        })?;

    out.push(PREPARE_TAG_INTERACTION);
    out.extend_from_slice(&index.to_le_bytes());
    out.push(kind);
    out.extend_from_slice(&interaction.offset.to_le_bytes());
    out.extend_from_slice(&payload_len.to_le_bytes());
    out.extend_from_slice(&interaction.payload);
    Ok(())
}

#[async_trait]
impl Frame for StartMessage {
    const FAMILY: FrameFamily = FrameFamily::Start;

    fn encode(&self, out: &mut Vec<u8>) -> Result<(), WireError> {
        out.extend_from_slice(&self.duration.to_le_bytes());
        Ok(())
    }

    async fn decode<R>(reader: &mut R) -> Result<Self, WireError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut frame = FrameReader::new(reader, Self::FAMILY);
        let duration = frame.f64().await?;
        Ok(Self { duration })
    }
}

#[async_trait]
impl Frame for ResultMessage {
    const FAMILY: FrameFamily = FrameFamily::Result;

    fn encode(&self, out: &mut Vec<u8>) -> Result<(), WireError> {
        let record = match self {
            ResultMessage::Done => {
                out.push(RESULT_TAG_DONE);
                return Ok(());
            }
            ResultMessage::Interaction(record) => record,
        };
        let index = client_index(record.client)?;
        let kind = kind_index(record.kind)?;

        out.push(RESULT_TAG_INTERACTION);
        out.extend_from_slice(&index.to_le_bytes());
        out.push(kind);
        out.extend_from_slice(&time_to_wire(record.submit_time).to_le_bytes());
        out.extend_from_slice(&time_to_wire(record.commit_time).to_le_bytes());
        out.extend_from_slice(&time_to_wire(record.abort_time).to_le_bytes());
        out.push(u8::from(record.has_error));
        Ok(())
    }

    async fn decode<R>(reader: &mut R) -> Result<Self, WireError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut frame = FrameReader::new(reader, Self::FAMILY);
        match frame.u8().await? {
            RESULT_TAG_DONE => Ok(ResultMessage::Done),
            RESULT_TAG_INTERACTION => {
                let client = widen(frame.u32().await?);
                let kind = usize::from(frame.u8().await?);
                let submit_time = time_from_wire(frame.f64().await?);
                let commit_time = time_from_wire(frame.f64().await?);
                let abort_time = time_from_wire(frame.f64().await?);
                let has_error = frame.u8().await? == 1;
                Ok(ResultMessage::Interaction(InteractionRecord {
                    client,
                    kind,
                    submit_time,
                    commit_time,
                    abort_time,
                    has_error,
                }))
            }
            tag => Err(WireError::UnknownTag {
                family: Self::FAMILY,
                tag,
            }),
        }
    }
}

fn short_len(field: WireField, value: &str) -> Result<u8, WireError> {
    u8::try_from(value.len()).map_err(|_err| WireError::StringTooLong {
        field,
        len: value.len(),
        max: MAX_SHORT_STRING,
    })
}

fn short_count(field: WireField, count: usize) -> Result<u8, WireError> {
    u8::try_from(count).map_err(|_err| WireError::TooManyEntries {
        field,
        count,
        max: MAX_SHORT_COUNT,
    })
}

fn client_index(index: usize) -> Result<u32, WireError> {
    u32::try_from(index).map_err(|_err| WireError::ClientIndexOutOfRange { index })
}

fn kind_index(index: usize) -> Result<u8, WireError> {
    u8::try_from(index).map_err(|_err| WireError::KindIndexOutOfRange { index })
}

fn time_to_wire(time: Option<f64>) -> f64 {
    time.unwrap_or(ABSENT_TIME)
}

fn time_from_wire(time: f64) -> Option<f64> {
    (time >= 0.0).then_some(time)
}

fn widen(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

struct FrameReader<'reader, R> {
    reader: &'reader mut R,
    family: FrameFamily,
}

impl<'reader, R> FrameReader<'reader, R>
where
    R: AsyncRead + Unpin + Send,
{
    const fn new(reader: &'reader mut R, family: FrameFamily) -> Self {
        Self { reader, family }
    }

    async fn u8(&mut self) -> Result<u8, WireError> {
        let family = self.family;
        self.reader
            .read_u8()
            .await
            .map_err(|source| WireError::Truncated { family, source })
    }

    async fn u16(&mut self) -> Result<u16, WireError> {
        let family = self.family;
        self.reader
            .read_u16_le()
            .await
            .map_err(|source| WireError::Truncated { family, source })
    }

    async fn u32(&mut self) -> Result<u32, WireError> {
        let family = self.family;
        self.reader
            .read_u32_le()
            .await
            .map_err(|source| WireError::Truncated { family, source })
    }

    async fn f64(&mut self) -> Result<f64, WireError> {
        let family = self.family;
        self.reader
            .read_f64_le()
            .await
            .map_err(|source| WireError::Truncated { family, source })
    }

    async fn bytes(&mut self, len: usize) -> Result<Vec<u8>, WireError> {
        let family = self.family;
        let mut buffer = vec![0_u8; len];
        self.reader
            .read_exact(&mut buffer)
            .await
            .map_err(|source| WireError::Truncated { family, source })?;
        Ok(buffer)
    }

    async fn string(&mut self, field: WireField, len: usize) -> Result<String, WireError> {
        let bytes = self.bytes(len).await?;
        String::from_utf8(bytes).map_err(|err| WireError::InvalidUtf8 { field, source: err })
    }
}
