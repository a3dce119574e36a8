//! Bridge between a host executor and the worker runtime.
//!
//! Operations come in two kinds:
//!
//! - immediate operations, like [`sum_as_string`], return their result
//!   directly and never suspend;
//! - deferred operations, like [`sleep_for`] and [`get_latest_block`], are
//!   spawned on a worker runtime and return a [`Deferred`] handle.
//!
//! The worker runtime owns all timers and sockets, so awaiting a deferred
//! handle never blocks the host executor, whichever executor that is.

mod task;

pub use self::task::{Deferred, TaskState};

use self::task::State;
use crate::{
    error::Error,
    provider::Provider,
    types::{BlockNumber, BlockSummary},
};
use futures::channel::oneshot;
use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, OnceLock,
    },
    time::Duration,
};
use tokio::runtime::{self, Handle, Runtime};
use tracing::Instrument as _;

/// Spawns deferred operations onto a Tokio runtime.
#[derive(Clone, Debug)]
pub struct Bridge {
    handle: Handle,
}

impl Bridge {
    /// Returns the process-wide bridge, starting its worker runtime on first
    /// use.
    ///
    /// # Panics
    ///
    /// This method panics if the worker runtime fails to start.
    pub fn global() -> &'static Self {
        static RUNTIME: OnceLock<Runtime> = OnceLock::new();
        static BRIDGE: OnceLock<Bridge> = OnceLock::new();

        BRIDGE.get_or_init(|| {
            let runtime = RUNTIME.get_or_init(|| {
                runtime::Builder::new_multi_thread()
                    .thread_name("ethlake-worker")
                    .enable_all()
                    .build()
                    .expect("failed to start bridge worker runtime")
            });
            Self::with_handle(runtime.handle().clone())
        })
    }

    /// Creates a bridge that spawns operations onto an existing runtime. The
    /// runtime must have its time and I/O drivers enabled.
    pub fn with_handle(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawns a future onto the worker runtime.
    pub fn spawn<F, T>(&self, future: F) -> Deferred<T>
    where
        F: Future<Output = Result<T, Error>> + Send + 'static,
        T: Send + 'static,
    {
        static TASK_ID: AtomicU64 = AtomicU64::new(0);
        let id = TASK_ID.fetch_add(1, Ordering::Relaxed);

        let state = Arc::new(State::pending());
        let (sender, receiver) = oneshot::channel();
        let task = self.handle.spawn({
            let state = state.clone();
            async move {
                if !state.start() {
                    return;
                }
                tracing::debug!("task running");
                let result = future.await;
                if state.complete() {
                    tracing::debug!(ok = result.is_ok(), "task completed");
                    let _ = sender.send(result);
                }
            }
            .instrument(tracing::debug_span!("bridge_task", id))
        });

        Deferred::spawned(state, receiver, task)
    }

    /// Suspends the awaiting task for the specified number of seconds.
    ///
    /// Fails with [`Error::InvalidArgument`] without scheduling any work if
    /// `seconds` is negative, not finite, or too large.
    pub fn sleep_for(&self, seconds: f64) -> Deferred<()> {
        let duration = match Duration::try_from_secs_f64(seconds) {
            Ok(duration) => duration,
            Err(err) => {
                return Deferred::ready(Err(Error::InvalidArgument(format!(
                    "invalid sleep duration {seconds}: {err}"
                ))))
            }
        };

        self.spawn(async move {
            tokio::time::sleep(duration).await;
            Ok(())
        })
    }

    /// Fetches the number of the most recent block from the node at `url`.
    pub fn get_latest_block(&self, url: &str) -> Deferred<u64> {
        let provider = match Provider::http(url) {
            Ok(provider) => provider,
            Err(err) => return Deferred::ready(Err(err)),
        };

        self.spawn(async move { provider.get_latest_block().await.map(BlockNumber::get) })
    }

    /// Fetches the identifying fields of the block with the specified number
    /// from the node at `url`.
    pub fn fetch_block(&self, url: &str, number: u64) -> Deferred<BlockSummary> {
        let provider = match Provider::http(url) {
            Ok(provider) => provider,
            Err(err) => return Deferred::ready(Err(err)),
        };

        self.spawn(async move {
            provider
                .get_block_by_number(number)
                .await?
                .ok_or(Error::BlockNotFound(number))
        })
    }
}

/// Returns the decimal representation of `a + b`.
///
/// The sum is computed with enough precision that it never overflows.
pub fn sum_as_string(a: i64, b: i64) -> String {
    (i128::from(a) + i128::from(b)).to_string()
}

/// Suspends the awaiting task for the specified number of seconds, using the
/// [global](Bridge::global) bridge.
pub fn sleep_for(seconds: f64) -> Deferred<()> {
    Bridge::global().sleep_for(seconds)
}

/// Fetches the number of the most recent block from the node at `url`, using
/// the [global](Bridge::global) bridge.
pub fn get_latest_block(url: &str) -> Deferred<u64> {
    Bridge::global().get_latest_block(url)
}

/// Fetches a block summary from the node at `url`, using the
/// [global](Bridge::global) bridge.
pub fn fetch_block(url: &str, number: u64) -> Deferred<BlockSummary> {
    Bridge::global().fetch_block(url, number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, http::testing::serve_once};
    use futures::FutureExt as _;
    use std::{sync::atomic::AtomicBool, time::Instant};

    #[test]
    fn sums_as_strings() {
        assert_eq!(sum_as_string(3, 4), "7");
        assert_eq!(sum_as_string(0, 0), "0");
        assert_eq!(sum_as_string(-10, 3), "-7");
        assert_eq!(sum_as_string(-5, -6), "-11");
        assert_eq!(sum_as_string(i64::MAX, 1), "9223372036854775808");
        assert_eq!(sum_as_string(i64::MIN, i64::MIN), "-18446744073709551616");
    }

    #[test]
    fn invalid_sleeps_fail_without_suspending() {
        for seconds in [-1.0, -0.001, f64::NAN, f64::INFINITY, f64::MAX] {
            let deferred = sleep_for(seconds);
            assert_eq!(deferred.state(), TaskState::Completed);
            let err = deferred.now_or_never().unwrap().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{seconds}");
        }
    }

    #[tokio::test]
    async fn sleeps_for_at_least_the_requested_duration() {
        let start = Instant::now();
        let mut deferred = sleep_for(0.2);
        (&mut deferred).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");
        assert_eq!(deferred.state(), TaskState::Completed);
    }

    #[tokio::test]
    async fn sleeping_does_not_block_the_host() {
        let start = Instant::now();
        let (slept, ticked) = tokio::join!(sleep_for(0.5), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            start.elapsed()
        });

        slept.unwrap();
        assert!(ticked < Duration::from_millis(400), "{ticked:?}");
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn deferred_handles_can_be_awaited_from_any_executor() {
        futures::executor::block_on(sleep_for(0.05)).unwrap();
    }

    /// Sets a flag when dropped, used to check that cancelled work is released.
    struct Released(Arc<AtomicBool>);

    impl Drop for Released {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not met in time");
    }

    fn sleep_with_guard(released: &Arc<AtomicBool>) -> Deferred<()> {
        let guard = Released(released.clone());
        Bridge::global().spawn(async move {
            let _guard = guard;
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
    }

    #[tokio::test]
    async fn cancelling_a_sleep_releases_it() {
        let released = Arc::new(AtomicBool::new(false));
        let mut deferred = sleep_with_guard(&released);
        wait_for(|| deferred.state() == TaskState::Running).await;

        deferred.cancel();
        assert_eq!(deferred.state(), TaskState::Cancelled);

        let err = (&mut deferred).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        wait_for(|| released.load(Ordering::SeqCst)).await;

        // Cancelling again is a no-op.
        deferred.cancel();
        assert_eq!(deferred.state(), TaskState::Cancelled);
    }

    #[tokio::test]
    async fn dropping_a_handle_cancels_it() {
        let released = Arc::new(AtomicBool::new(false));
        let deferred = sleep_with_guard(&released);
        wait_for(|| deferred.state() == TaskState::Running).await;

        drop(deferred);
        wait_for(|| released.load(Ordering::SeqCst)).await;
    }

    #[tokio::test]
    async fn timing_out_the_awaiting_task_cancels_the_sleep() {
        let released = Arc::new(AtomicBool::new(false));
        let deferred = sleep_with_guard(&released);

        let result = tokio::time::timeout(Duration::from_millis(50), deferred).await;
        assert!(result.is_err());
        wait_for(|| released.load(Ordering::SeqCst)).await;
    }

    #[test]
    fn tasks_start_pending() {
        let runtime = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let bridge = Bridge::with_handle(runtime.handle().clone());

        let mut deferred = bridge.spawn(async { Ok(1) });
        assert_eq!(deferred.state(), TaskState::Pending);
        assert_eq!(runtime.block_on(&mut deferred).unwrap(), 1);
        assert_eq!(deferred.state(), TaskState::Completed);

        let mut deferred = bridge.sleep_for(0.0);
        deferred.cancel();
        assert_eq!(deferred.state(), TaskState::Cancelled);
        assert!(matches!(
            runtime.block_on(&mut deferred),
            Err(Error::Cancelled)
        ));
    }

    #[tokio::test]
    async fn gets_latest_block_over_http() {
        let (url, server) =
            serve_once(200, r#"{"jsonrpc":"2.0","id":0,"result":"0x1312d00"}"#).await;

        let number = get_latest_block(url.as_str()).await.unwrap();
        assert_eq!(number, 20_000_000);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn fetching_an_unknown_block_fails() {
        let (url, server) = serve_once(200, r#"{"jsonrpc":"2.0","id":0,"result":null}"#).await;

        let err = fetch_block(url.as_str(), 1 << 40).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.to_string(), format!("block {} not found", 1_u64 << 40));
        server.await.unwrap();
    }

    #[test]
    fn invalid_endpoints_fail_without_suspending() {
        for url in ["not a url", "http://eth.llamarpc.com"] {
            let err = get_latest_block(url).now_or_never().unwrap().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{url}");
        }
    }

    #[tokio::test]
    #[ignore]
    async fn gets_latest_block_from_node() {
        let url = std::env::var("ETHRPC").expect("missing ETHRPC environment variable");
        let first = get_latest_block(&url).await.unwrap();
        let second = get_latest_block(&url).await.unwrap();
        println!("latest block: {second}");
        assert!(second >= first);

        let block = fetch_block(&url, first).await.unwrap();
        println!("{block}");
        assert_eq!(block.number, BlockNumber(first));
    }
}
