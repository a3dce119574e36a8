//! Prints the latest block number of an Ethereum node.
//!
//! The node URL is read from the `ETHRPC` environment variable, falling back
//! to a public endpoint.

use std::env;
use tracing_subscriber::EnvFilter;

const DEFAULT_RPC_URL: &str = "https://eth.llamarpc.com";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = env::var("ETHRPC").unwrap_or_else(|_| DEFAULT_RPC_URL.to_owned());
    println!("Connecting to {url}...");
    match ethlake::get_latest_block(&url).await {
        Ok(number) => println!("Latest Block Number: {number}"),
        Err(err) => println!("ERROR: {err}"),
    }
}
