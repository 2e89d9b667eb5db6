//! Example: pacing a flaky poll with the backoff supplier and retry loop
//!
//! This example demonstrates:
//! 1. The delay sequence produced by feeding each delay back in
//! 2. A retry loop that rides out transient failures
//! 3. A fatal failure that stops the loop after one attempt
//! 4. Cancelling a loop while it is backing off
//!
//! Run with:
//! ```bash
//! cargo run -p zeebe-core --example retry_example
//! ```

use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use zeebe_core::prelude::*;

/// A simulated gateway that is unavailable for the first few polls
struct FlakyGateway {
    polls: Arc<AtomicU32>,
    unavailable_for: u32,
}

impl FlakyGateway {
    fn new(unavailable_for: u32) -> Self {
        Self {
            polls: Arc::new(AtomicU32::new(0)),
            unavailable_for,
        }
    }

    async fn poll(&self) -> Result<Vec<u64>, std::io::Error> {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst);

        if poll < self.unavailable_for {
            println!("  Poll {}: UNAVAILABLE", poll + 1);
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "gateway unavailable",
            ))
        } else {
            println!("  Poll {}: 3 jobs activated", poll + 1);
            Ok(vec![1, 2, 3])
        }
    }
}

fn is_fatal(_ctx: &AttemptContext, err: &std::io::Error) -> bool {
    err.kind() != std::io::ErrorKind::ConnectionRefused
}

/// Example 1: the delay sequence
fn example_delay_sequence() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Delay Sequence (no jitter) ===\n");

    let backoff = ExponentialBackoff::builder()
        .min_delay(Duration::from_millis(50))
        .max_delay(Duration::from_secs(5))
        .backoff_factor(1.6)
        .jitter_factor(0.0)
        .build()?;

    let mut delay = Duration::ZERO;
    for step in 0..12 {
        delay = backoff.supply_retry_delay(delay);
        println!("  Step {:>2}: {:?}", step, delay);
    }

    Ok(())
}

/// Example 2: transient failures
async fn example_transient_failures() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Transient Failures ===\n");

    let backoff = ExponentialBackoff::builder()
        .min_delay(Duration::from_millis(100))
        .jitter_factor(0.0)
        .build()?;
    let retry = RetryLoop::new(backoff, is_fatal);
    let gateway = FlakyGateway::new(2);
    let token = CancellationToken::new();

    let start = Instant::now();
    let jobs = retry.run(&token, |_ctx| gateway.poll()).await?;

    println!("\nActivated jobs: {:?}", jobs);
    println!("Total time: {:?}", start.elapsed());
    println!("Expected delays: 100ms + 160ms = ~260ms");

    Ok(())
}

/// Example 3: fatal failure
async fn example_fatal_failure() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Fatal Failure ===\n");

    let retry = RetryLoop::new(ExponentialBackoff::default(), is_fatal);
    let token = CancellationToken::new();

    let result = retry
        .run(&token, |_ctx| async {
            Err::<(), _>(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "unauthenticated",
            ))
        })
        .await;

    match result {
        Err(RetryError::Fatal(err)) => println!("  Stopped with: {}", err),
        other => println!("  Unexpected outcome: {:?}", other),
    }

    Ok(())
}

/// Example 4: cancellation during backoff
async fn example_cancellation() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 4: Cancellation During Backoff ===\n");

    let backoff = ExponentialBackoff::builder()
        .min_delay(Duration::from_secs(30))
        .max_delay(Duration::from_secs(30))
        .build()?;
    let retry = RetryLoop::new(backoff, is_fatal);
    let gateway = FlakyGateway::new(u32::MAX);
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        println!("  Shutting down...");
        canceller.cancel();
    });

    let start = Instant::now();
    let result = retry.run(&token, |_ctx| gateway.poll()).await;
    println!(
        "  Cancelled: {} after {:?}",
        result.is_err_and(|err| err.is_cancelled()),
        start.elapsed()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("==============================================");
    println!("   Zeebe Core: Backoff and Retry Examples");
    println!("==============================================");

    example_delay_sequence()?;
    example_transient_failures().await?;
    example_fatal_failure().await?;
    example_cancellation().await?;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}
