//! Page loading with progress feedback

use crate::{CaptureError, Console, RenderingEngine};
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Navigate `engine` to `url`, echoing progress to `console`.
///
/// Fails with [`CaptureError::LoadFailed`] when the engine reports a failed load and
/// with [`CaptureError::LoadTimeout`] when loading takes longer than `load_timeout`.
pub async fn load_page<E, W>(
    engine: &E,
    url: &str,
    console: &mut Console<W>,
    load_timeout: Duration,
) -> Result<(), CaptureError>
where
    E: RenderingEngine + ?Sized,
    W: Write,
{
    debug!("Loading {}", url);
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();

    let navigation = timeout(load_timeout, engine.load(url, progress_tx));
    tokio::pin!(navigation);

    let outcome = loop {
        tokio::select! {
            biased;
            Some(percent) = progress_rx.recv() => console.load_progress(url, percent),
            result = &mut navigation => break result,
        }
    };

    while let Ok(percent) = progress_rx.try_recv() {
        console.load_progress(url, percent);
    }
    console.load_finished();

    match outcome {
        Ok(Ok(())) => {
            debug!("Loaded {}", url);
            Ok(())
        }
        Ok(Err(e)) => {
            warn!("Failed loading {}: {}", url, e);
            Err(match e {
                CaptureError::LoadFailed(_) => e,
                other => CaptureError::LoadFailed(other.to_string()),
            })
        }
        Err(_) => {
            warn!("Loading {} timed out after {:?}", url, load_timeout);
            Err(CaptureError::LoadTimeout(load_timeout))
        }
    }
}
