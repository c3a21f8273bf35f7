//! Progress indicator that runs beside the generation call.
//!
//! The indicator lives in its own task and is driven by a one-shot completion
//! signal. [`run_with_progress`] only returns after the indicator task has
//! acknowledged the stop, so nothing is drawn once result handling starts.

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::oneshot;
use tracing::{debug, warn};

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Something that can be animated while a call is in flight.
pub trait ProgressIndicator: Send + 'static {
    /// Draws the next frame.
    fn tick(&mut self);

    /// Stops drawing and clears whatever was rendered.
    fn finish(&mut self);
}

/// Terminal spinner on stderr.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.set_message(message.to_string());
        Self { bar }
    }
}

impl ProgressIndicator for Spinner {
    fn tick(&mut self) {
        self.bar.tick();
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Indicator that draws nothing, for non-interactive runs.
pub struct NoProgress;

impl ProgressIndicator for NoProgress {
    fn tick(&mut self) {}

    fn finish(&mut self) {}
}

/// Awaits `work` while `indicator` animates in a separate task.
///
/// Ctrl-C only stops the animation; `work` keeps running until it finishes
/// or fails, because the backend call cannot be cancelled.
pub async fn run_with_progress<I, F, T>(mut indicator: I, work: F) -> T
where
    I: ProgressIndicator,
    F: Future<Output = T>,
{
    let (done_tx, mut done_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut done_rx => break,
                _ = &mut ctrl_c => {
                    debug!("Interrupted, hiding progress indicator");
                    break;
                }
                _ = interval.tick() => indicator.tick(),
            }
        }
        indicator.finish();
    });

    let result = work.await;

    // The receiver may already be gone after an interrupt.
    let _ = done_tx.send(());
    if let Err(e) = handle.await {
        warn!("Progress indicator task failed: {}", e);
    }

    result
}
