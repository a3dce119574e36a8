//! An asynchronous Ethereum JSON RPC client and a runtime-agnostic task
//! bridge.
//!
//! The crate exposes a small host-facing surface:
//!
//! - [`get_latest_block`] and [`fetch_block`] query an Ethereum node over
//!   HTTPS;
//! - [`sleep_for`] suspends the caller on a timer;
//! - [`sum_as_string`] completes immediately.
//!
//! Deferred operations run on a dedicated worker runtime and return a
//! [`Deferred`] handle which can be awaited from any executor, without ever
//! blocking it.
//!
//! Documentation for the Ethereum RPC APIs can be found here:
//! <https://ethereum.github.io/execution-apis/>

pub mod bridge;
mod error;
pub mod http;
pub mod jsonrpc;
#[macro_use]
pub mod method;
mod provider;
pub mod transport;
pub mod types;

pub use self::{
    bridge::{fetch_block, get_latest_block, sleep_for, sum_as_string, Bridge, Deferred, TaskState},
    error::{Error, ErrorKind},
    provider::Provider,
};

use self::types::*;

module! {
    /// The `eth` namespace.
    pub mod eth {
        /// Returns the number of most recent block.
        pub struct BlockNumber as "eth_blockNumber"
            Empty => types::BlockNumber;

        /// Returns information about a block by number.
        pub struct GetBlockByNumber as "eth_getBlockByNumber"
            (BlockSpec, Hydrated) => Option<BlockSummary>;
    }
}
