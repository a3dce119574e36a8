//! Ethereum JSON RPC client over an arbitrary [`Transport`].

use crate::{
    error::Error,
    eth, http,
    jsonrpc::{self, IdCounter},
    method::Method,
    transport::Transport,
    types::{BlockNumber, BlockSpec, BlockSummary, Empty, Hydrated},
};
use serde::Serialize;

/// An Ethereum JSON RPC client.
///
/// Each provider numbers its requests with its own monotonically increasing
/// ID, so responses to concurrent calls can be told apart.
#[derive(Debug)]
pub struct Provider<T> {
    transport: T,
    id: IdCounter,
}

impl<T> Provider<T>
where
    T: Transport,
{
    /// Creates a new provider for the specified transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            id: IdCounter::default(),
        }
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Executes a JSON RPC call.
    pub async fn call<M>(&self, method: M, params: M::Params) -> Result<M::Result, Error>
    where
        M: Method + Serialize,
    {
        jsonrpc::call_async(method, params, self.id.next(), |request| {
            self.transport.roundtrip(request)
        })
        .await
    }

    /// Executes a JSON RPC call with no parameters.
    pub async fn call_np<M>(&self, method: M) -> Result<M::Result, Error>
    where
        M: Method<Params = Empty> + Serialize,
    {
        self.call(method, Empty).await
    }

    /// Returns the number of the most recent block.
    pub async fn get_latest_block(&self) -> Result<BlockNumber, Error> {
        let number = self.call_np(eth::BlockNumber).await?;
        tracing::debug!(%number, "fetched latest block number");
        Ok(number)
    }

    /// Returns the identifying fields of a block, or `None` if the node does
    /// not know about it.
    pub async fn get_block_by_number(
        &self,
        block: impl Into<BlockSpec>,
    ) -> Result<Option<BlockSummary>, Error> {
        self.call(eth::GetBlockByNumber, (block.into(), Hydrated::No))
            .await
    }
}

impl Provider<http::Client> {
    /// Creates a new provider for an HTTPS endpoint with the default HTTP
    /// configuration.
    pub fn http(url: &str) -> Result<Self, Error> {
        Ok(Self::new(http::Client::new(http::parse_url(url)?)?))
    }
}
