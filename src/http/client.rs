//! Ethereum JSON RPC HTTP client.

use crate::{error::Error, transport::Transport};
use reqwest::{header, Url};
use std::{env, future::Future, net::IpAddr, time::Duration};

/// An Ethereum JSON RPC HTTP transport.
#[derive(Clone, Debug)]
pub struct Client {
    client: reqwest::Client,
    url: Url,
}

impl Client {
    /// Creates a new JSON RPC HTTP client for the specified URL with the
    /// default configuration.
    pub fn new(url: Url) -> Result<Self, Error> {
        Self::with_config(url, &Configuration::default())
    }

    /// Creates a new JSON RPC HTTP client for the specified URL, building the
    /// underlying HTTP client from the provided configuration.
    pub fn with_config(url: Url, config: &Configuration) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Self::with_client(builder.build()?, url)
    }

    /// Creates a new JSON RPC HTTP client for the specified client instance and
    /// URL.
    pub fn with_client(client: reqwest::Client, url: Url) -> Result<Self, Error> {
        check_endpoint(&url)?;
        Ok(Self { client, url })
    }

    /// Creates a new JSON RPC HTTP client from the environment. This method
    /// uses the `ETHRPC` environment variable. This is useful for testing.
    ///
    /// # Panics
    ///
    /// This method panics if the environment variable is not present, or if it
    /// is not a valid endpoint URL.
    pub fn from_env() -> Self {
        let url = env::var("ETHRPC").expect("missing ETHRPC environment variable");
        Self::new(parse_url(&url).unwrap()).unwrap()
    }

    /// Returns the endpoint URL of this client.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Transport for Client {
    fn roundtrip(&self, request: String) -> impl Future<Output = Result<String, Error>> + Send {
        async move {
            tracing::debug!(url = %self.url, bytes = request.len(), "sending JSON RPC request");
            let response = self
                .client
                .post(self.url.clone())
                .header(header::CONTENT_TYPE, "application/json")
                .body(request)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                tracing::warn!(url = %self.url, %status, "JSON RPC request failed");
                return Err(Error::Status(status, body));
            }

            tracing::debug!(url = %self.url, bytes = body.len(), "received JSON RPC response");
            Ok(body)
        }
    }
}

/// HTTP client configuration.
#[derive(Clone, Debug)]
pub struct Configuration {
    /// The total time allowed for a request, from connecting until the
    /// response body has been read.
    ///
    /// Specifying `None` means no timeout.
    pub timeout: Option<Duration>,
    /// The `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// Parses an endpoint URL.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    url.parse()
        .map_err(|err| Error::InvalidArgument(format!("invalid URL {url:?}: {err}")))
}

/// Endpoints must use HTTPS. Plain HTTP is only allowed for loopback hosts,
/// which is what local development nodes listen on.
fn check_endpoint(url: &Url) -> Result<(), Error> {
    match url.scheme() {
        "https" => Ok(()),
        "http" if url.host_str().is_some_and(is_loopback) => Ok(()),
        scheme => Err(Error::InvalidArgument(format!(
            "unsupported endpoint {url}: expected an https URL but got {scheme:?}"
        ))),
    }
}

fn is_loopback(host: &str) -> bool {
    host == "localhost"
        || host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}
