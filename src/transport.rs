//! The transport abstraction used by the [`Provider`](crate::Provider).

use crate::error::Error;
use std::{future::Future, sync::Arc};

/// A JSON RPC transport.
///
/// A transport takes a serialized JSON RPC request and returns the raw
/// response body. It makes a single attempt per call; it does not retry,
/// cache or rate limit.
pub trait Transport {
    /// Sends a serialized request and returns the serialized response.
    fn roundtrip(&self, request: String) -> impl Future<Output = Result<String, Error>> + Send;
}

impl<T> Transport for &'_ T
where
    T: Transport + ?Sized,
{
    fn roundtrip(&self, request: String) -> impl Future<Output = Result<String, Error>> + Send {
        (**self).roundtrip(request)
    }
}

impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    fn roundtrip(&self, request: String) -> impl Future<Output = Result<String, Error>> + Send {
        (**self).roundtrip(request)
    }
}
