use std::collections::BTreeMap;

use serde::Deserialize;

/// A benchmark plan as written in a `.toml` or `.json` file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    pub system: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,
    #[serde(default)]
    pub endpoints: Vec<EndpointGroupConfig>,
    #[serde(default)]
    pub workloads: Vec<WorkloadConfig>,
}

/// Backend parameters may be written as any scalar; they travel as strings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParameterValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl ParameterValue {
    #[must_use]
    pub fn to_param_string(&self) -> String {
        match self {
            ParameterValue::Text(value) => value.clone(),
            ParameterValue::Integer(value) => value.to_string(),
            ParameterValue::Float(value) => value.to_string(),
            ParameterValue::Flag(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointGroupConfig {
    pub addresses: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadConfig {
    pub name: String,
    #[serde(default = "default_number")]
    pub number: usize,
    /// Tags a secondary must carry to host these clients.
    #[serde(default)]
    pub location: Vec<String>,
    /// Tags an endpoint must carry to appear in a client view.
    #[serde(default)]
    pub endpoints: Vec<String>,
    /// Endpoints per client view; all matching endpoints when absent.
    pub view: Option<usize>,
    #[serde(default)]
    pub behaviors: Vec<BehaviorConfig>,
}

const fn default_number() -> usize {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BehaviorConfig {
    pub interaction: String,
    /// Seconds (as keys) to events per second.
    pub load: BTreeMap<String, f64>,
}
