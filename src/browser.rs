//! Headless Chrome implementation of the rendering engine
//!
//! One browser process and one page per run. The Chrome DevTools Protocol
//! handler is polled on a background task for as long as the engine lives.

use crate::{
    create_browser_config, script, CaptureError, Dimensions, EngineConfig, LoadProgress,
    ProgressSender, RenderingEngine,
};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventDomContentEventFired,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use image::RgbaImage;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A running headless Chrome with a single page
pub struct ChromeEngine {
    browser: Browser,
    page: Page,
    /// Background task handling Chrome DevTools Protocol communication
    handler: JoinHandle<()>,
    /// Throwaway profile directory, removed on shutdown
    user_data_dir: PathBuf,
}

impl ChromeEngine {
    pub async fn launch(config: &EngineConfig) -> Result<Self, CaptureError> {
        let user_data_dir = std::env::temp_dir().join(format!(
            "webscreenie-{}-{}",
            std::process::id(),
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&user_data_dir).map_err(|e| {
            CaptureError::BrowserLaunchFailed(format!("Failed to create user data dir: {e}"))
        })?;

        let browser_config = create_browser_config(config, &user_data_dir)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CaptureError::BrowserLaunchFailed(e.to_string()))?;

        // The handler implements Stream and must be polled for the browser to make progress
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Handler error: {}", e);
                }
            }
            debug!("Handler stream ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CaptureError::BrowserLaunchFailed(e.to_string()))?;

        info!("Chrome launched with profile {}", user_data_dir.display());

        Ok(Self {
            browser,
            page,
            handler,
            user_data_dir,
        })
    }

    pub async fn shutdown(self) {
        let ChromeEngine {
            mut browser,
            page,
            handler,
            user_data_dir,
        } = self;
        drop(page);

        match browser.close().await {
            Ok(_) => {
                let _ = browser.wait().await;
            }
            Err(e) => warn!("Failed to close browser: {}", e),
        }
        handler.abort();

        if let Err(e) = std::fs::remove_dir_all(&user_data_dir) {
            debug!("Could not remove {}: {}", user_data_dir.display(), e);
        }
        info!("Chrome shut down");
    }
}

#[async_trait]
impl RenderingEngine for ChromeEngine {
    async fn load(&self, url: &str, progress: ProgressSender) -> Result<(), CaptureError> {
        let mut requested = self.page.event_listener::<EventRequestWillBeSent>().await?;
        let mut finished = self.page.event_listener::<EventLoadingFinished>().await?;
        let mut failed = self.page.event_listener::<EventLoadingFailed>().await?;
        let mut dom_ready = self.page.event_listener::<EventDomContentEventFired>().await?;

        let mut tracker = LoadProgress::new();
        if let Some(percent) = tracker.advance() {
            let _ = progress.send(percent);
        }

        let navigation = self.page.goto(url);
        tokio::pin!(navigation);

        loop {
            tokio::select! {
                result = &mut navigation => {
                    return match result {
                        Ok(_) => {
                            if let Some(percent) = tracker.complete() {
                                let _ = progress.send(percent);
                            }
                            Ok(())
                        }
                        Err(e) => Err(CaptureError::LoadFailed(e.to_string())),
                    };
                }
                Some(_) = requested.next() => tracker.request_started(),
                Some(_) = finished.next() => tracker.request_settled(),
                Some(_) = failed.next() => tracker.request_settled(),
                Some(_) = dom_ready.next() => tracker.dom_content_loaded(),
            }

            if let Some(percent) = tracker.advance() {
                let _ = progress.send(percent);
            }
        }
    }

    async fn hide_scrollbars(&self) -> Result<(), CaptureError> {
        self.evaluate(script::HIDE_SCROLLBARS).await.map(|_| ())
    }

    async fn set_zoom_factor(&self, factor: f64) -> Result<(), CaptureError> {
        self.evaluate(&script::page_zoom(factor)).await.map(|_| ())
    }

    async fn set_text_size_multiplier(&self, factor: f64) -> Result<(), CaptureError> {
        self.evaluate(&script::text_zoom(factor)).await.map(|_| ())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, CaptureError> {
        // Built explicitly so that scripts are never mistaken for function declarations
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(CaptureError::ChromeError)?;

        let result = self.page.evaluate_expression(params).await?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn run_script(&self, script: &str) -> Result<String, CaptureError> {
        // By reference: the result may be a DOM node or `window`, which has no JSON form
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(false)
            .await_promise(true)
            .build()
            .map_err(CaptureError::ChromeError)?;

        let result = self.page.evaluate_expression(params).await?;
        let object = result.object();
        Ok(match (&object.description, &object.value) {
            (Some(description), _) => description.clone(),
            (None, Some(value)) => value.to_string(),
            (None, None) => format!("{:?}", object.r#type).to_lowercase(),
        })
    }

    async fn content_size(&self) -> Result<Dimensions, CaptureError> {
        let value = self.evaluate(script::CONTENT_SIZE).await?;
        let size: Dimensions = serde_json::from_value(value)?;
        debug!("Content size: {}", size);
        Ok(size)
    }

    async fn set_viewport_size(&self, size: Dimensions) -> Result<(), CaptureError> {
        self.page
            .execute(SetDeviceMetricsOverrideParams::new(
                size.width as i64,
                size.height as i64,
                1.0,
                false,
            ))
            .await?;
        Ok(())
    }

    async fn render(&self) -> Result<RgbaImage, CaptureError> {
        let screenshot_params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let png_data = self.page.screenshot(screenshot_params).await?;
        let frame = image::load_from_memory(&png_data)
            .map_err(|e| CaptureError::ImageError(e.to_string()))?
            .to_rgba8();

        Ok(frame)
    }
}
