//! Exercises the immediate and deferred bridge operations from a host Tokio
//! runtime that is separate from the bridge worker runtime.

use std::{error::Error, time::Instant};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Starting async operations...");

    let sum = ethlake::sum_as_string(3, 4);
    println!("Result: {sum}");

    println!("Calling async sleep for 2 seconds...");
    let start = Instant::now();
    ethlake::sleep_for(2.0).await?;
    println!("Slept for {:.2} seconds", start.elapsed().as_secs_f64());

    Ok(())
}
