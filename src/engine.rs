//! The rendering engine seam
//!
//! Everything the capture needs from a browser goes through [`RenderingEngine`]:
//! navigation with progress notifications, script evaluation, sizing and
//! rasterization. [`crate::ChromeEngine`] implements it over the Chrome DevTools
//! Protocol; tests substitute their own engines.

use crate::{CaptureError, Dimensions};
use async_trait::async_trait;
use image::RgbaImage;
use tokio::sync::mpsc;

/// Receives load progress, in percent, while a page loads
pub type ProgressSender = mpsc::UnboundedSender<u8>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RenderingEngine: Send + Sync {
    /// Navigate to `url` and resolve once loading finished.
    ///
    /// Progress values (0-100) are sent on `progress` while loading. An `Err` means
    /// the page failed to load.
    async fn load(&self, url: &str, progress: ProgressSender) -> Result<(), CaptureError>;

    /// Turn off scrollbar rendering on both axes.
    async fn hide_scrollbars(&self) -> Result<(), CaptureError>;

    /// Zoom the whole page.
    async fn set_zoom_factor(&self, factor: f64) -> Result<(), CaptureError>;

    /// Zoom text only.
    async fn set_text_size_multiplier(&self, factor: f64) -> Result<(), CaptureError>;

    /// Evaluate a script in the page and return its JSON value (`Null` for `undefined`).
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, CaptureError>;

    /// Run a user-supplied script, returning a printable description of its result.
    ///
    /// Unlike [`evaluate`](Self::evaluate) the result need not be JSON-serializable.
    async fn run_script(&self, script: &str) -> Result<String, CaptureError>;

    /// Natural size of the document content.
    async fn content_size(&self) -> Result<Dimensions, CaptureError>;

    async fn set_viewport_size(&self, size: Dimensions) -> Result<(), CaptureError>;

    /// Rasterize the current viewport.
    async fn render(&self) -> Result<RgbaImage, CaptureError>;
}

/// Derives a load percentage from network and document events
///
/// Chrome has no notion of load progress, so one is estimated: 0 when navigation
/// starts, 10-70 from the share of settled network requests, 80-95 once the DOM is
/// ready and 100 on completion. Reported values never decrease.
#[derive(Debug, Default)]
pub struct LoadProgress {
    requested: usize,
    settled: usize,
    dom_ready: bool,
    reported: Option<u8>,
}

impl LoadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_started(&mut self) {
        self.requested += 1;
    }

    pub fn request_settled(&mut self) {
        self.settled = (self.settled + 1).min(self.requested);
    }

    pub fn dom_content_loaded(&mut self) {
        self.dom_ready = true;
    }

    pub fn percent(&self) -> u8 {
        let network = if self.requested == 0 {
            0
        } else {
            self.settled * 100 / self.requested
        };

        let estimate = if self.dom_ready {
            80 + network * 15 / 100
        } else if self.requested == 0 {
            0
        } else {
            10 + network * 60 / 100
        };

        estimate.min(99) as u8
    }

    /// The current percentage, if it moved past the last reported one.
    pub fn advance(&mut self) -> Option<u8> {
        self.report(self.percent())
    }

    /// 100, unless it was already reported.
    pub fn complete(&mut self) -> Option<u8> {
        self.report(100)
    }

    fn report(&mut self, percent: u8) -> Option<u8> {
        match self.reported {
            Some(last) if last >= percent => None,
            _ => {
                self.reported = Some(percent);
                Some(percent)
            }
        }
    }
}
