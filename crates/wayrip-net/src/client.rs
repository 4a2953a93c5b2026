use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::{
    error::{NetError, NetResult},
    traits::Net,
    types::NetOptions,
};

/// HTTP client backed by reqwest.
///
/// Sends a fixed User-Agent on every request and optionally sleeps after
/// each successful fetch, keeping request pressure on the upstream service
/// low regardless of how the caller schedules fetches.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: reqwest::Client,
    options: NetOptions,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns [`NetError`] if the underlying reqwest client cannot be built.
    pub fn new(options: NetOptions) -> NetResult<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.request_timeout)
            .build()
            .map_err(NetError::from_reqwest)?;

        Ok(Self { inner, options })
    }

    /// # Errors
    ///
    /// Returns [`NetError`] if the default client cannot be built.
    pub fn with_defaults() -> NetResult<Self> {
        Self::new(NetOptions::default())
    }

    fn handle_response(response: reqwest::Response) -> NetResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let url = response.url().to_string();
            Err(NetError::http_status(status.as_u16(), url))
        }
    }
}

#[async_trait]
impl Net for HttpClient {
    async fn get_bytes(&self, url: Url) -> Result<Bytes, NetError> {
        let response = self.inner.get(url).send().await?;
        let response = Self::handle_response(response)?;
        let bytes = response.bytes().await?;

        if let Some(delay) = self.options.fetch_delay {
            tokio::time::sleep(delay).await;
        }

        Ok(bytes)
    }
}
