//! HTTP JSON RPC transport.

mod client;
#[cfg(test)]
pub(crate) mod testing;

pub use self::client::{parse_url, Client, Configuration};
pub use reqwest;
