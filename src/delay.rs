//! Pre-render delay with liveness feedback

use crate::Console;
use std::io::Write;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, Interval};

/// Delays longer than this print a dot every [`FEEDBACK_INTERVAL`]
pub const FEEDBACK_THRESHOLD: Duration = Duration::from_millis(2000);

pub const FEEDBACK_INTERVAL: Duration = Duration::from_secs(1);

/// Wait `delay` before the capture starts.
///
/// Returns immediately for a zero delay. The feedback ticker only lives inside this
/// call, so it is stopped as soon as the delay elapses.
pub async fn wait_before_capture<W: Write>(delay: Duration, console: &mut Console<W>) {
    if delay.is_zero() {
        return;
    }

    console.waiting(delay);

    let elapsed = sleep(delay);
    tokio::pin!(elapsed);

    let mut feedback = (delay > FEEDBACK_THRESHOLD)
        .then(|| interval_at(Instant::now() + FEEDBACK_INTERVAL, FEEDBACK_INTERVAL));

    loop {
        tokio::select! {
            biased;
            _ = &mut elapsed => break,
            _ = next_tick(&mut feedback) => console.tick(),
        }
    }

    console.end_line();
}

async fn next_tick(feedback: &mut Option<Interval>) {
    match feedback {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
