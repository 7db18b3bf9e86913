use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Method, Proxy,
    header::{HeaderMap, HeaderName, HeaderValue},
    redirect,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::HttpError;

use super::transport::{Transport, TransportRequest, TransportResponse};

pub const DEFAULT_USER_AGENT: &str = concat!("restrun/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REDIRECT_LIMIT: u32 = 10;

/// Knobs for the pooled client shared by every work item of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub redirect_limit: u32,
    pub insecure: bool,
    pub proxy: Option<String>,
    pub no_ua: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
            insecure: false,
            proxy: None,
            no_ua: false,
        }
    }
}

/// [`Transport`] backed by a single pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the pooled client.
    ///
    /// # Errors
    ///
    /// Returns an error when the proxy URL is invalid or the client cannot be built.
    pub fn new(settings: &ClientSettings) -> Result<Self, HttpError> {
        let mut client_builder = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout);

        if !settings.no_ua {
            client_builder = client_builder.user_agent(DEFAULT_USER_AGENT);
        }

        if settings.redirect_limit == 0 {
            client_builder = client_builder.redirect(redirect::Policy::none());
        } else {
            client_builder = client_builder.redirect(redirect::Policy::limited(
                usize::try_from(settings.redirect_limit).unwrap_or(10),
            ));
        }

        if settings.insecure {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        if let Some(proxy_url) = settings.proxy.as_deref() {
            let proxy = Proxy::all(proxy_url).map_err(|err| HttpError::InvalidProxy {
                url: proxy_url.to_owned(),
                source: err,
            })?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;
        Ok(Self { client })
    }

    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    /// Admitted exchanges run to completion; the client timeout bounds them.
    async fn send(
        &self,
        request: TransportRequest,
        _cancel: &CancellationToken,
    ) -> Result<TransportResponse, HttpError> {
        let method = Method::from_bytes(request.verb.as_str().as_bytes()).map_err(|_err| {
            HttpError::InvalidMethod {
                method: request.verb.as_str().to_owned(),
            }
        })?;
        let headers = build_header_map(&request.headers)?;

        let mut builder = self.client.request(method, request.url).headers(headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| HttpError::Transport { source: err })?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|err| HttpError::ReadBody { source: err })?;
        debug!("Received {} with {} body bytes", status.as_u16(), body.len());

        Ok(TransportResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_owned),
            headers,
            body: Some(body),
        })
    }
}

fn build_header_map(headers: &[(String, String)]) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|err| HttpError::InvalidHeader {
                name: name.clone(),
                message: err.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| HttpError::InvalidHeader {
            name: name.clone(),
            message: err.to_string(),
        })?;
        map.append(header_name, header_value);
    }
    Ok(map)
}
