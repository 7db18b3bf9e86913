use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ValidationError};

/// HTTP verbs a request template may use.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Merge,
    Copy,
}

impl HttpVerb {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Merge => "MERGE",
            HttpVerb::Copy => "COPY",
        }
    }

    /// Whether a request with this verb carries the body template.
    #[must_use]
    pub const fn carries_body(self) -> bool {
        match self {
            HttpVerb::Post | HttpVerb::Put | HttpVerb::Patch | HttpVerb::Merge => true,
            HttpVerb::Get
            | HttpVerb::Delete
            | HttpVerb::Head
            | HttpVerb::Options
            | HttpVerb::Copy => false,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpVerb {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "GET" => Ok(HttpVerb::Get),
            "POST" => Ok(HttpVerb::Post),
            "PUT" => Ok(HttpVerb::Put),
            "DELETE" => Ok(HttpVerb::Delete),
            "HEAD" => Ok(HttpVerb::Head),
            "OPTIONS" => Ok(HttpVerb::Options),
            "PATCH" => Ok(HttpVerb::Patch),
            "MERGE" => Ok(HttpVerb::Merge),
            "COPY" => Ok(HttpVerb::Copy),
            _ => Err(AppError::validation(ValidationError::UnknownVerb {
                value: s.to_owned(),
            })),
        }
    }
}

impl TryFrom<String> for HttpVerb {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A named REST target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instance {
    pub name: String,
    pub base_url: Option<String>,
    pub session_id: Option<String>,
    pub user_token: Option<String>,
    pub client_token: Option<String>,
}

impl Instance {
    #[must_use]
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.base_url.as_deref().unwrap_or(""))
    }
}

/// An identity whose name, password and properties feed placeholder substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub user_name: String,
    pub password: String,
    pub properties: BTreeMap<String, String>,
}

impl User {
    #[must_use]
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTemplate {
    pub path: String,
    pub verb: HttpVerb,
    pub body: Option<String>,
    pub requires_client_token: bool,
    pub headers: Vec<(String, String)>,
}

impl RequestTemplate {
    #[must_use]
    pub fn new(verb: HttpVerb, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            verb,
            body: None,
            requires_client_token: false,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// One (instance, user, request, iteration) combination. Shares its inputs read-only.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub instance: Arc<Instance>,
    pub user: Arc<User>,
    pub request: Arc<RequestTemplate>,
    pub iteration: u64,
}

/// The materialized matrix inputs handed over by the configuration layer.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    pub instances: Vec<Arc<Instance>>,
    pub users: Vec<Arc<User>>,
    pub requests: Vec<Arc<RequestTemplate>>,
}

impl Runner {
    #[must_use]
    pub fn new(instances: Vec<Instance>, users: Vec<User>, requests: Vec<RequestTemplate>) -> Self {
        Self {
            instances: instances.into_iter().map(Arc::new).collect(),
            users: users.into_iter().map(Arc::new).collect(),
            requests: requests.into_iter().map(Arc::new).collect(),
        }
    }

    /// Number of work items a single iteration expands to.
    #[must_use]
    pub fn items_per_iteration(&self) -> u64 {
        let instances = u64::try_from(self.instances.len()).unwrap_or(u64::MAX);
        let users = u64::try_from(self.users.len()).unwrap_or(u64::MAX);
        let requests = u64::try_from(self.requests.len()).unwrap_or(u64::MAX);
        instances.saturating_mul(users).saturating_mul(requests)
    }
}
