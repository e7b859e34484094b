use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::AdapterError;

use super::{
    Endpoints, InteractionInfo, InteractionReporter, PayloadBuilder, PreparedInteraction,
    SystemParams, TargetClient, TargetSystem,
};

const NAME: &str = "mock";
const DEFAULT_DELAY_SECS: f64 = 1.0;
const WORD: usize = 8;
const INVOKE_LEN: usize = 16;
const TRANSFER_LEN: usize = 24;

/// In-process target system that commits every interaction after a fixed
/// delay.
///
/// Parameters: `delay` (seconds from submit to commit, default 1),
/// `pre-sign` (sign while decoding instead of when triggered) and
/// `sign-delay` (seconds spent signing, default 0).
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSystem;

impl TargetSystem for MockSystem {
    fn name(&self) -> &'static str {
        NAME
    }

    fn builder(
        &self,
        params: &SystemParams,
        env: &[String],
        endpoints: &Endpoints,
    ) -> Result<Box<dyn PayloadBuilder>, AdapterError> {
        let settings = MockSettings::from_params(params)?;
        debug!(
            "new {} builder: {:?} env={:?} endpoints={}",
            NAME,
            settings,
            env,
            endpoints.len()
        );
        Ok(Box::new(MockBuilder))
    }

    fn client(
        &self,
        params: &SystemParams,
        env: &[String],
        view: &[String],
    ) -> Result<Arc<dyn TargetClient>, AdapterError> {
        let settings = MockSettings::from_params(params)?;
        debug!(
            "new {} client: {:?} env={:?} view={:?}",
            NAME, settings, env, view
        );
        Ok(Arc::new(MockClient { settings }))
    }
}

#[derive(Debug, Clone, Copy)]
struct MockSettings {
    delay: Duration,
    pre_sign: bool,
    sign_delay: Duration,
}

impl MockSettings {
    fn from_params(params: &SystemParams) -> Result<Self, AdapterError> {
        Ok(Self {
            delay: seconds_param(params, "delay", DEFAULT_DELAY_SECS)?,
            pre_sign: flag_param(params, "pre-sign")?,
            sign_delay: seconds_param(params, "sign-delay", 0.0)?,
        })
    }
}

fn seconds_param(
    params: &SystemParams,
    name: &'static str,
    default: f64,
) -> Result<Duration, AdapterError> {
    let Some(value) = params.get(name) else {
        return Ok(Duration::from_secs_f64(default));
    };
    value
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| AdapterError::InvalidParameter {
            system: NAME,
            name,
            value: value.clone(),
        })
}

fn flag_param(params: &SystemParams, name: &'static str) -> Result<bool, AdapterError> {
    let Some(value) = params.get(name) else {
        return Ok(false);
    };
    match value.trim() {
        "1" | "t" | "T" | "true" | "True" | "TRUE" => Ok(true),
        "0" | "f" | "F" | "false" | "False" | "FALSE" => Ok(false),
        _ => Err(AdapterError::InvalidParameter {
            system: NAME,
            name,
            value: value.clone(),
        }),
    }
}

struct MockBuilder;

impl PayloadBuilder for MockBuilder {
    fn encode_interaction(
        &mut self,
        itype: &str,
        info: &InteractionInfo,
    ) -> Result<Vec<u8>, AdapterError> {
        let from = u64::try_from(info.client).unwrap_or(u64::MAX);
        let words = match itype {
            "transfer" => vec![1, from, from.wrapping_add(1)],
            "invoke" => vec![from, 0],
            _ => {
                return Err(AdapterError::UnsupportedInteraction {
                    system: NAME,
                    itype: itype.to_owned(),
                });
            }
        };
        trace!("encode {} #{} for client {}", itype, info.sequence, info.client);
        Ok(words.into_iter().flat_map(u64::to_le_bytes).collect())
    }
}

struct MockClient {
    settings: MockSettings,
}

#[async_trait]
impl TargetClient for MockClient {
    async fn decode(&self, payload: &[u8]) -> Result<Box<dyn PreparedInteraction>, AdapterError> {
        let words: Vec<u64> = payload
            .chunks_exact(WORD)
            .filter_map(|chunk| <[u8; WORD]>::try_from(chunk).ok())
            .map(u64::from_le_bytes)
            .collect();
        let description = match (payload.len(), words.as_slice()) {
            (INVOKE_LEN, [from, contract]) => format!("invoke({} -> {})", from, contract),
            (TRANSFER_LEN, [stake, from, to]) => {
                format!("transfer({} : {} -> {})", stake, from, to)
            }
            _ => {
                return Err(AdapterError::InvalidPayload { len: payload.len() });
            }
        };

        let signed = self.settings.pre_sign;
        if signed {
            sign(&description, self.settings.sign_delay).await;
        }
        Ok(Box::new(MockTransaction {
            description,
            signed,
            settings: self.settings,
        }))
    }
}

struct MockTransaction {
    description: String,
    signed: bool,
    settings: MockSettings,
}

#[async_trait]
impl PreparedInteraction for MockTransaction {
    async fn trigger(&self, reporter: &dyn InteractionReporter) -> Result<(), AdapterError> {
        if !self.signed {
            sign(&self.description, self.settings.sign_delay).await;
        }
        trace!("submit interaction '{}'", self.description);
        reporter.report_submit();
        pause(self.settings.delay).await;
        trace!("commit interaction '{}'", self.description);
        reporter.report_commit();
        Ok(())
    }
}

async fn sign(description: &str, delay: Duration) {
    trace!("sign interaction '{}'", description);
    pause(delay).await;
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
