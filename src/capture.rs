//! The capture pipeline: zoom, inject, size, render, crop and resize
//!
//! Runs once the page has loaded (and the optional delay elapsed). Every step is a
//! call into the [`RenderingEngine`] or the imaging helpers; the pipeline itself
//! only sequences them.

use crate::imaging::{self, CropRegion, ResizeMode};
use crate::{script, CaptureError, CaptureOptions, Dimensions, Offset, RenderingEngine};
use image::RgbaImage;
use tracing::{debug, info, warn};

pub struct CapturePipeline<'a, E: RenderingEngine + ?Sized> {
    engine: &'a E,
    options: &'a CaptureOptions,
}

impl<'a, E: RenderingEngine + ?Sized> CapturePipeline<'a, E> {
    pub fn new(engine: &'a E, options: &'a CaptureOptions) -> Self {
        Self { engine, options }
    }

    /// Produce the final, cropped and resized, image.
    pub async fn capture(&self) -> Result<RgbaImage, CaptureError> {
        self.prepare_page().await?;

        let viewport = self.viewport_size().await?;
        if viewport.is_empty() {
            return Err(CaptureError::EmptyCapture(viewport));
        }
        self.engine.set_viewport_size(viewport).await?;

        let frame = self.engine.render().await?;
        debug!("Rendered frame {}x{}", frame.width(), frame.height());

        let cropped = imaging::crop(&frame, CropRegion::from_viewport(viewport, self.options.offset));
        let resized = imaging::resize(cropped, ResizeMode::from(self.options.target_size));

        info!(
            "Captured {} at {}x{}",
            self.options.source_url,
            resized.width(),
            resized.height()
        );
        Ok(resized)
    }

    async fn prepare_page(&self) -> Result<(), CaptureError> {
        self.engine.hide_scrollbars().await?;

        if self.options.zoom != 1.0 {
            self.engine.set_zoom_factor(self.options.zoom).await?;
        }
        if self.options.text_zoom != 1.0 {
            self.engine.set_text_size_multiplier(self.options.text_zoom).await?;
        }

        if !self.options.script.is_empty() {
            match self.engine.run_script(&self.options.script).await {
                Ok(result) => debug!("Script returned {}", result),
                Err(CaptureError::ScriptError(message)) => {
                    warn!("Custom script threw: {}", message)
                }
                Err(e) => return Err(e),
            }
        }

        if !self.options.css.is_empty() {
            // A quote in the CSS breaks the generated snippet; the page is captured unstyled
            match self.engine.evaluate(&script::inject_style(&self.options.css)).await {
                Ok(_) => {}
                Err(CaptureError::ScriptError(message)) => {
                    warn!("Custom CSS could not be injected: {}", message)
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    async fn viewport_size(&self) -> Result<Dimensions, CaptureError> {
        let capture = self.options.capture_size;
        let content = if capture.width == 0 || capture.height == 0 {
            self.engine.content_size().await?
        } else {
            capture
        };

        Ok(viewport_for(capture, content, self.options.offset))
    }
}

/// Viewport needed to grab `capture` (or `content` where `capture` is zero) below and
/// right of `offset`.
pub fn viewport_for(capture: Dimensions, content: Dimensions, offset: Offset) -> Dimensions {
    let width = if capture.width != 0 { capture.width } else { content.width };
    let height = if capture.height != 0 { capture.height } else { content.height };

    Dimensions::new(width.saturating_add(offset.x), height.saturating_add(offset.y))
}
