use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::sleep;
use url::Url;

use crate::{error::NetError, traits::Net, types::RetryPolicy};

/// Decides whether a failed request is worth re-issuing.
#[cfg_attr(test, unimock::unimock(api = RetryClassifierMock))]
pub trait RetryClassifier: Send + Sync {
    fn should_retry(&self, error: &NetError) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRetryClassifier;

impl RetryClassifier for DefaultRetryClassifier {
    fn should_retry(&self, error: &NetError) -> bool {
        error.is_retryable()
    }
}

/// Retry decorator for Net implementations.
pub struct RetryNet<N, C> {
    inner: N,
    policy: RetryPolicy,
    classifier: C,
}

impl<N: Net, C: RetryClassifier> RetryNet<N, C> {
    pub fn new(inner: N, policy: RetryPolicy, classifier: C) -> Self {
        Self {
            inner,
            policy,
            classifier,
        }
    }
}

#[async_trait]
impl<N: Net, C: RetryClassifier> Net for RetryNet<N, C> {
    async fn get_bytes(&self, url: Url) -> Result<Bytes, NetError> {
        let mut last_error = None;

        for attempt in 0..=self.policy.max_retries {
            match self.inner.get_bytes(url.clone()).await {
                Ok(bytes) => return Ok(bytes),
                Err(error) => {
                    if !self.classifier.should_retry(&error) {
                        return Err(error);
                    }
                    last_error = Some(error);

                    if attempt < self.policy.max_retries {
                        sleep(self.policy.delay_for_attempt(attempt + 1)).await;
                    }
                }
            }
        }

        let source = last_error.unwrap_or(NetError::Timeout);
        Err(NetError::RetryExhausted {
            max_retries: self.policy.max_retries,
            source: Box::new(source),
        })
    }
}
