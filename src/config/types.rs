use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::args::parse_duration_arg;
use crate::error::ValidationError;
use crate::workload::HttpVerb;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub iterations: Option<u64>,
    #[serde(alias = "concurrency")]
    pub max_concurrency: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub redirect: Option<u32>,
    pub insecure: Option<bool>,
    pub proxy: Option<String>,
    pub no_ua: Option<bool>,
    pub session_id: Option<String>,
    pub progress_interval: Option<u64>,
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
    #[serde(default)]
    pub users: Vec<UserConfig>,
    #[serde(default)]
    pub requests: Vec<RequestConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceConfig {
    pub name: String,
    pub base_url: Option<String>,
    pub session_id: Option<String>,
    pub user_token: Option<String>,
    pub client_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserConfig {
    pub user_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    pub path: String,
    #[serde(default = "default_method")]
    pub method: HttpVerb,
    pub body: Option<String>,
    #[serde(default)]
    pub requires_client_token: bool,
    /// `Key: Value` strings.
    #[serde(default)]
    pub headers: Vec<String>,
}

const fn default_method() -> HttpVerb {
    HttpVerb::Get
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    pub console: Option<bool>,
    pub csv: Option<String>,
    pub include_content: Option<bool>,
    pub summary_json: Option<String>,
    pub no_color: Option<bool>,
}

/// Either whole seconds or a `500ms`/`10s`/`2m`/`1h` string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
