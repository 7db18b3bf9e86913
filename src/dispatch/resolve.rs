use url::Url;

use crate::error::DispatchError;
use crate::http::TransportRequest;
use crate::workload::{HttpVerb, WorkItem, merge_placeholders};

pub const SESSION_HEADER: &str = "X-Session-Id";
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A work item with every placeholder substituted, owned by that item alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub verb: HttpVerb,
    pub path: String,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ResolvedRequest {
    /// Builds the outbound request for `item` without touching the shared template.
    ///
    /// # Errors
    ///
    /// Returns an error when the instance has no base URL or the joined URL does not parse.
    pub fn resolve(item: &WorkItem) -> Result<Self, DispatchError> {
        let instance = &item.instance;
        let template = &item.request;
        let user = &item.user;

        let path = merge_placeholders(Some(template.path.as_str()), user);
        let base_url =
            instance
                .base_url
                .as_deref()
                .ok_or_else(|| DispatchError::MissingBaseUrl {
                    instance: instance.name.clone(),
                })?;
        let joined = format!("{}{}", base_url, path);
        let url = Url::parse(&joined).map_err(|err| DispatchError::InvalidUrl {
            url: joined.clone(),
            source: err,
        })?;

        let mut headers: Vec<(String, String)> = template
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), merge_placeholders(Some(value.as_str()), user)))
            .collect();
        if let Some(session_id) = instance.session_id.as_deref() {
            headers.push((SESSION_HEADER.to_owned(), session_id.to_owned()));
        }
        let token = if template.requires_client_token {
            instance.client_token.as_deref()
        } else {
            instance.user_token.as_deref()
        };
        if let Some(token) = token {
            headers.push((AUTHORIZATION_HEADER.to_owned(), format!("Bearer {}", token)));
        }

        let body = if template.verb.carries_body() {
            template
                .body
                .as_deref()
                .map(|body| merge_placeholders(Some(body), user))
        } else {
            None
        };
        if body.is_some() && !has_header(&headers, CONTENT_TYPE_HEADER) {
            headers.push((CONTENT_TYPE_HEADER.to_owned(), JSON_CONTENT_TYPE.to_owned()));
        }

        Ok(Self {
            verb: template.verb,
            path,
            url,
            headers,
            body,
        })
    }

    #[must_use]
    pub fn into_transport_request(self) -> TransportRequest {
        TransportRequest {
            verb: self.verb,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers
        .iter()
        .any(|(key, _)| key.eq_ignore_ascii_case(name))
}
