#![forbid(unsafe_code)]

mod client;
mod error;
mod retry;
mod traits;
mod types;

pub use crate::{
    client::HttpClient,
    error::{NetError, NetResult},
    retry::{DefaultRetryClassifier, RetryClassifier, RetryNet},
    traits::{Net, NetExt},
    types::{NetOptions, RetryPolicy},
};
