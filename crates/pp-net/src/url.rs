//! Target and proxy URL handling.

use pp_core::LocatorError;
use pp_core::LocatorResult;
use url::Url;

/// Page URL the operator asked to preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    parsed: Url,
}

impl TargetUrl {
    pub fn parse(input: &str) -> LocatorResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(LocatorError::input("input.url_empty", "Please enter a URL."));
        }

        let mut parsed = Url::parse(input).map_err(|error| {
            LocatorError::input(
                "input.url_invalid",
                format!("failed to parse URL `{input}`: {error}"),
            )
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LocatorError::input(
                "input.url_scheme_unsupported",
                format!("unsupported scheme `{}`", parsed.scheme()),
            ));
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(LocatorError::input(
                "input.url_host_missing",
                "URL must include a host",
            ));
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(LocatorError::input(
                "input.url_credentials_disallowed",
                "URL userinfo (`username:password@`) is not allowed",
            ));
        }

        // The proxy fetches server-side; fragments only matter to the browser.
        parsed.set_fragment(None);

        Ok(Self { parsed })
    }

    pub fn as_str(&self) -> &str {
        self.parsed.as_str()
    }
}

/// Same-origin relay that fetches `?url=<target>` on our behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    parsed: Url,
    host: String,
    port: u16,
}

impl ProxyEndpoint {
    pub fn parse(input: &str) -> LocatorResult<Self> {
        let parsed = Url::parse(input.trim()).map_err(|error| {
            LocatorError::fetch(
                "fetch.proxy_endpoint_invalid",
                format!("failed to parse proxy endpoint `{input}`: {error}"),
            )
        })?;

        if parsed.scheme() != "http" {
            return Err(LocatorError::fetch(
                "fetch.proxy_scheme_unsupported",
                format!(
                    "proxy endpoint must be plain http, got `{}`",
                    parsed.scheme()
                ),
            ));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| {
                LocatorError::fetch("fetch.proxy_endpoint_invalid", "proxy endpoint must include a host")
            })?
            .to_ascii_lowercase();
        let port = parsed.port_or_known_default().unwrap_or(80);

        Ok(Self { parsed, host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn authority(&self) -> String {
        if self.port == 80 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Full proxy URL carrying `target` in its `url` query parameter.
    pub fn request_url(&self, target: &TargetUrl) -> Url {
        let mut url = self.parsed.clone();
        url.set_fragment(None);
        url.query_pairs_mut().append_pair("url", target.as_str());
        url
    }

    /// Origin-form request target (`/proxy?url=...`) for the request line.
    pub fn request_target(&self, target: &TargetUrl) -> String {
        let url = self.request_url(target);
        match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_owned(),
        }
    }
}
