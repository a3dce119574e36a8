//! Module containing serializable JSON RPC data types.

use crate::{error::Error as ClientError, method::Method};
use serde::{
    de::{self, Deserializer},
    Deserialize, Serialize,
};
use serde_json::Value;
use std::{
    fmt::{self, Formatter},
    future::Future,
    marker::PhantomData,
    sync::atomic::{self, AtomicU32},
};
use thiserror::Error;

/// Executes a JSON RPC call with the provided `async` roundtrip implementation.
///
/// The response must echo the request `id` (or omit it, as some nodes do for
/// errors); any other `id` is treated as a decoding failure.
pub async fn call_async<M, F, Fut>(
    method: M,
    params: M::Params,
    id: Id,
    roundtrip: F,
) -> Result<M::Result, ClientError>
where
    M: Method + Serialize,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<String, ClientError>>,
{
    if method.name().is_empty() {
        return Err(ClientError::InvalidArgument(
            "JSON RPC method name must not be empty".to_owned(),
        ));
    }

    let request = serde_json::to_string(&Request {
        jsonrpc: Version::V2,
        method,
        params,
        id,
    })?;
    tracing::trace!(%request, "JSON RPC request");

    let body = roundtrip(request).await?;
    tracing::trace!(response = %body, "JSON RPC response");

    let response = serde_json::from_str::<Response<M>>(&body)?;
    match response.id {
        Some(actual) if actual != id => Err(ClientError::IdMismatch {
            expected: id,
            actual,
        }),
        _ => Ok(response.result?),
    }
}

/// JSON RPC supported version.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Version {
    /// Version 2.0 of the JSON RPC specification.
    #[serde(rename = "2.0")]
    V2,
}

/// Request and response ID.
///
/// Note that `u32` is used. This is so it always fits in a `f64` and obeys the
/// "SHOULD NOT have fractional parts" rule from the specification.  Since the
/// ID is set by the client, we shouldn't run into issues where a numerical ID
/// does not fit into this value or a string ID is used.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, Hash, PartialEq)]
#[serde(transparent)]
pub struct Id(pub u32);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A monotonically increasing source of request IDs.
#[derive(Debug, Default)]
pub struct IdCounter(AtomicU32);

impl IdCounter {
    /// Returns the next request ID.
    pub fn next(&self) -> Id {
        Id(self.0.fetch_add(1, atomic::Ordering::Relaxed))
    }
}

/// A request object.
#[derive(Debug, Serialize)]
pub struct Request<M>
where
    M: Method,
{
    pub jsonrpc: Version,
    pub method: M,
    #[serde(serialize_with = "M::serialize_params")]
    pub params: M::Params,
    pub id: Id,
}

/// Response object.
#[derive(Debug)]
pub struct Response<M>
where
    M: Method,
{
    pub jsonrpc: Version,
    pub result: Result<M::Result, Error>,
    pub id: Option<Id>,
}

impl<'de, M> Deserialize<'de> for Response<M>
where
    M: Method,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "lowercase")]
        enum Key {
            JsonRpc,
            Result,
            Error,
            Id,
            #[serde(other)]
            Unknown,
        }

        struct Visitor<M>(PhantomData<M>);

        impl<'de, M> de::Visitor<'de> for Visitor<M>
        where
            M: Method,
        {
            type Value = Response<M>;

            fn expecting(&self, f: &mut Formatter) -> fmt::Result {
                f.write_str("JSON RPC response")
            }

            fn visit_map<V>(self, mut map: V) -> Result<Self::Value, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut jsonrpc = None;
                let mut result = None;
                let mut error = None;
                let mut id = None;

                while let Some(key) = map.next_key()? {
                    match key {
                        Key::JsonRpc => {
                            if jsonrpc.is_some() {
                                return Err(de::Error::duplicate_field("jsonrpc"));
                            }
                            jsonrpc = Some(map.next_value()?);
                        }
                        Key::Result => {
                            if result.is_some() {
                                return Err(de::Error::duplicate_field("result"));
                            }
                            result = Some(map.next_value::<Value>()?);
                        }
                        Key::Error => {
                            if error.is_some() {
                                return Err(de::Error::duplicate_field("error"));
                            }
                            error = Some(map.next_value::<Option<Error>>()?);
                        }
                        Key::Id => {
                            if id.is_some() {
                                return Err(de::Error::duplicate_field("id"));
                            }
                            id = Some(map.next_value()?);
                        }
                        Key::Unknown => {
                            map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }

                // The result is only decoded once we know the response is not
                // an error, since nodes may send `"result": null` alongside an
                // error object.
                let result = match (result, error.flatten()) {
                    (Some(Value::Null) | None, Some(error)) => Err(error),
                    (Some(_), Some(_)) => {
                        return Err(de::Error::custom(
                            "response contains both 'result' and 'error' fields",
                        ))
                    }
                    (Some(result), None) => {
                        Ok(M::deserialize_result(result).map_err(de::Error::custom)?)
                    }
                    (None, None) => {
                        return Err(de::Error::custom("missing 'result' or 'error' field"))
                    }
                };

                Ok(Response {
                    jsonrpc: jsonrpc.ok_or_else(|| de::Error::missing_field("jsonrpc"))?,
                    result,
                    id: id.flatten(),
                })
            }
        }

        deserializer.deserialize_struct(
            "Response",
            &["jsonrpc", "result", "error", "id"],
            Visitor::<M>(PhantomData),
        )
    }
}

/// An RPC error that may be produced on a response.
#[derive(Clone, Debug, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl Error {
    /// Creates an internal error with a custom message.
    pub fn custom(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: message.into(),
            data: Value::Null,
        }
    }
}

/// An error code.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Error, PartialEq)]
#[serde(from = "i32")]
pub enum ErrorCode {
    #[error("parse error")]
    ParseError,
    #[error("invalid request")]
    InvalidRequest,
    #[error("method not found")]
    MethodNotFound,
    #[error("invalid params")]
    InvalidParams,
    #[error("internal error")]
    InternalError,
    #[error("server error ({0})")]
    ServerError(i32),
    #[error("reserved ({0})")]
    Reserved(i32),
    #[error("{0}")]
    Other(i32),
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        #[allow(clippy::match_overlapping_arm)]
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32099..=-32000 => Self::ServerError(code),
            -32768..=-32000 => Self::Reserved(code),
            _ => Self::Other(code),
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::ServerError(code) => code,
            ErrorCode::Reserved(code) => code,
            ErrorCode::Other(code) => code,
        }
    }
}
