use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::{
    error::NetError,
    retry::{DefaultRetryClassifier, RetryNet},
    types::RetryPolicy,
};

#[cfg_attr(test, unimock::unimock(api = NetMock))]
#[async_trait]
pub trait Net: Send + Sync {
    /// Get all bytes from a URL.
    async fn get_bytes(&self, url: Url) -> Result<Bytes, NetError>;
}

pub trait NetExt: Net + Sized {
    /// Add retry layer.
    fn with_retry(self, policy: RetryPolicy) -> RetryNet<Self, DefaultRetryClassifier> {
        RetryNet::new(self, policy, DefaultRetryClassifier)
    }
}

impl<T: Net> NetExt for T {}

#[async_trait]
impl<T: Net + ?Sized> Net for std::sync::Arc<T> {
    async fn get_bytes(&self, url: Url) -> Result<Bytes, NetError> {
        (**self).get_bytes(url).await
    }
}

#[async_trait]
impl<T: Net + ?Sized> Net for &T {
    async fn get_bytes(&self, url: Url) -> Result<Bytes, NetError> {
        (**self).get_bytes(url).await
    }
}
