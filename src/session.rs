//! One capture from start to finish
//!
//! A [`CaptureSession`] drives a single page through loading, the optional delay,
//! the capture pipeline and the final save, tracking where it is with an explicit
//! [`CaptureState`].

use crate::capture::CapturePipeline;
use crate::delay::wait_before_capture;
use crate::loader::load_page;
use crate::{imaging, utils, CaptureError, CaptureOptions, Console, Dimensions, RenderingEngine};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Loading,
    Loaded,
    Rendering,
    Saved,
    Failed,
}

impl CaptureState {
    pub fn can_transition_to(self, next: CaptureState) -> bool {
        use CaptureState::*;

        matches!(
            (self, next),
            (Idle, Loading)
                | (Loading, Loaded)
                | (Loading, Failed)
                | (Loaded, Rendering)
                | (Rendering, Saved)
                | (Rendering, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CaptureState::Saved | CaptureState::Failed)
    }
}

/// What a successful run produced
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureReport {
    pub output: PathBuf,
    pub dimensions: Dimensions,
    pub elapsed: Duration,
}

pub struct CaptureSession<'a, E: RenderingEngine + ?Sized, W: Write> {
    engine: &'a E,
    options: &'a CaptureOptions,
    console: Console<W>,
    load_timeout: Duration,
    state: CaptureState,
}

impl<'a, E: RenderingEngine + ?Sized, W: Write> CaptureSession<'a, E, W> {
    pub fn new(
        engine: &'a E,
        options: &'a CaptureOptions,
        console: Console<W>,
        load_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            options,
            console,
            load_timeout,
            state: CaptureState::Idle,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn into_console(self) -> Console<W> {
        self.console
    }

    /// Load, wait, capture and save.
    ///
    /// A session runs once; calling `run` again returns
    /// [`CaptureError::InvalidTransition`].
    pub async fn run(&mut self) -> Result<CaptureReport, CaptureError> {
        let started = Instant::now();
        self.transition(CaptureState::Loading)?;

        let options = self.options;
        let url = options.source_url.as_str();
        if let Err(e) = load_page(self.engine, url, &mut self.console, self.load_timeout).await {
            self.console.load_failed();
            self.transition(CaptureState::Failed)?;
            return Err(e);
        }
        self.transition(CaptureState::Loaded)?;

        wait_before_capture(options.delay, &mut self.console).await;

        self.transition(CaptureState::Rendering)?;
        let dimensions = match self.render_and_save().await {
            Ok(dimensions) => dimensions,
            Err(e) => {
                error!("Capture of {} failed: {}", url, e);
                self.transition(CaptureState::Failed)?;
                return Err(e);
            }
        };
        self.transition(CaptureState::Saved)?;

        self.console.saved(&options.output_path);

        let elapsed = started.elapsed();
        info!(
            "Saved {} ({}) in {}",
            options.output_path.display(),
            dimensions,
            utils::format_duration(elapsed)
        );

        Ok(CaptureReport {
            output: options.output_path.clone(),
            dimensions,
            elapsed,
        })
    }

    async fn render_and_save(&self) -> Result<Dimensions, CaptureError> {
        let image = CapturePipeline::new(self.engine, self.options).capture().await?;
        let dimensions = Dimensions::new(image.width(), image.height());
        imaging::save_image(image, &self.options.output_path)?;
        Ok(dimensions)
    }

    fn transition(&mut self, next: CaptureState) -> Result<(), CaptureError> {
        if !self.state.can_transition_to(next) {
            return Err(CaptureError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }
}
