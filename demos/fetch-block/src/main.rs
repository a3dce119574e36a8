//! Prints a summary of an Ethereum block.
//!
//! The block number is taken from the first argument, defaulting to the
//! latest block. The node URL is read from the `ETHRPC` environment variable,
//! falling back to a public endpoint.

use std::env;
use tracing_subscriber::EnvFilter;

const DEFAULT_RPC_URL: &str = "https://eth.llamarpc.com";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = env::var("ETHRPC").unwrap_or_else(|_| DEFAULT_RPC_URL.to_owned());
    let number = match env::args().nth(1) {
        Some(arg) => match arg.parse::<u64>() {
            Ok(number) => number,
            Err(err) => {
                println!("ERROR: invalid block number {arg:?}: {err}");
                return;
            }
        },
        None => match ethlake::get_latest_block(&url).await {
            Ok(number) => number,
            Err(err) => {
                println!("ERROR: {err}");
                return;
            }
        },
    };

    println!("Fetching block {number} from {url}...");
    match ethlake::fetch_block(&url, number).await {
        Ok(block) => println!("{block}"),
        Err(err) => println!("ERROR: {err}"),
    }
}
