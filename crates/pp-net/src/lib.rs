//! Client side of the same-origin page proxy.
//!
//! The proxy relays `GET <endpoint>?url=<target>` to the target site and
//! answers with the raw HTML body. Only plain HTTP is spoken on this hop; the
//! proxy owns any TLS towards the target.

mod charset;
mod http;
mod transport;
mod url;

pub use charset::decode_page_text;
pub use http::GetRequest;
pub use http::Header;
pub use crate::url::ProxyEndpoint;
pub use crate::url::TargetUrl;
pub use http::HttpResponse;

use pp_core::EngineConfig;
use pp_core::LocatorError;
use pp_core::LocatorResult;
use std::time::Duration;
use tracing::debug;
use tracing::info;
use tracing::warn;

const ERROR_EXCERPT_CHARS: usize = 200;

/// Source of page HTML. `url` is the operator-entered page address.
pub trait PageFetcher {
    fn fetch(&mut self, url: &str) -> LocatorResult<String>;
}

/// Fetches pages through the configured proxy endpoint.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    endpoint: ProxyEndpoint,
    timeout: Duration,
}

impl ProxyClient {
    pub fn new(endpoint: ProxyEndpoint, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    pub fn from_config(config: &EngineConfig) -> LocatorResult<Self> {
        config.validate()?;
        Ok(Self::new(
            ProxyEndpoint::parse(&config.proxy_endpoint)?,
            config.fetch_timeout,
        ))
    }

    pub fn endpoint(&self) -> &ProxyEndpoint {
        &self.endpoint
    }

    /// Performs the GET and returns the decoded response regardless of status.
    pub fn get(&self, target: &TargetUrl) -> LocatorResult<HttpResponse> {
        let request = GetRequest::new(
            self.endpoint.request_target(target),
            &self.endpoint.authority(),
        )?;
        let addresses = transport::resolve(self.endpoint.host(), self.endpoint.port())?;
        let mut stream = transport::connect_first_available(&addresses, self.timeout)?;

        http::write_request(&mut stream, &request)?;
        http::read_response(&mut stream)
    }
}

impl PageFetcher for ProxyClient {
    fn fetch(&mut self, url: &str) -> LocatorResult<String> {
        let target = TargetUrl::parse(url)?;
        info!(
            page = target.as_str(),
            proxy = %self.endpoint.authority(),
            "fetching page through proxy"
        );

        let response = self.get(&target)?;
        let text = decode_page_text(&response.body, response.header("content-type"));
        if !response.is_success() {
            warn!(
                status = response.status,
                page = target.as_str(),
                "proxy returned an error status"
            );
            return Err(status_error(response.status, &text));
        }

        debug!(bytes = response.body.len(), chars = text.len(), "page body decoded");
        Ok(text)
    }
}

fn status_error(status: u16, body: &str) -> LocatorError {
    let excerpt = body.trim().chars().take(ERROR_EXCERPT_CHARS).collect::<String>();
    let message = if excerpt.is_empty() {
        format!("HTTP error! status: {status}")
    } else {
        format!("HTTP error! status: {status} ({excerpt})")
    };
    LocatorError::fetch("fetch.http_status", message)
}
