//! Configuration management with serde serialization/deserialization
//!
//! Two records live here: [`CaptureOptions`], filled once from the command line and
//! read-only afterwards, and [`EngineConfig`], which controls how Chrome is launched
//! and can be loaded from a JSON file.

use crate::CaptureError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// URL captured when none is given on the command line
pub const DEFAULT_URL: &str = "http://www.example.com";

/// Output file written when none is given on the command line
pub const DEFAULT_OUTPUT: &str = "webscreenie.png";

/// A `WxH` pixel pair
///
/// Parsed with a strict `digits` + `x` + `digits` pattern; the whole token must match.
///
/// ```rust
/// use webscreenie::Dimensions;
///
/// let size: Dimensions = "640x480".parse().unwrap();
/// assert_eq!(size, Dimensions::new(640, 480));
/// assert!("640 x 480".parse::<Dimensions>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_zero(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            CaptureError::InvalidArgument(format!(
                "{s:?} must be in format \"100x100\""
            ))
        };

        let (width, height) = s.split_once('x').ok_or_else(invalid)?;
        let is_number = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !is_number(width) || !is_number(height) {
            return Err(invalid());
        }

        Ok(Self {
            width: width.parse().map_err(|_| invalid())?,
            height: height.parse().map_err(|_| invalid())?,
        })
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Distance, in pixels, from the upper-left corner of the page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Offset {
    pub x: u32,
    pub y: u32,
}

impl Offset {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<Dimensions> for Offset {
    fn from(d: Dimensions) -> Self {
        Self {
            x: d.width,
            y: d.height,
        }
    }
}

/// Everything one capture needs to know
///
/// Populated by the CLI parser and consumed once by the capture session.
///
/// # Examples
///
/// ```rust
/// use webscreenie::{CaptureOptions, Dimensions};
///
/// let options = CaptureOptions {
///     source_url: "https://example.com".to_string(),
///     target_size: Dimensions::new(640, 480),
///     ..Default::default()
/// };
/// assert_eq!(options.zoom, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Page to load (default: `http://www.example.com`)
    pub source_url: String,

    /// Image file to write; the extension selects the format (default: `webscreenie.png`)
    pub output_path: PathBuf,

    /// Crop offset from the upper-left corner (default: 0,0)
    pub offset: Offset,

    /// Size of the area to grab; a zero component means "use the content size"
    pub capture_size: Dimensions,

    /// Size of the final image; a zero component is left free
    pub target_size: Dimensions,

    /// Zoom factor for the whole page (default: 1.0)
    pub zoom: f64,

    /// Zoom factor applied to text only (default: 1.0)
    pub text_zoom: f64,

    /// JavaScript evaluated before rendering
    pub script: String,

    /// CSS injected before rendering
    pub css: String,

    /// Wait between load completion and rendering
    pub delay: Duration,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_URL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            offset: Offset::default(),
            capture_size: Dimensions::default(),
            target_size: Dimensions::default(),
            zoom: 1.0,
            text_zoom: 1.0,
            script: String::new(),
            css: String::new(),
            delay: Duration::ZERO,
        }
    }
}

/// Settings for the headless Chrome instance
///
/// # Examples
///
/// ```rust
/// use webscreenie::EngineConfig;
/// use std::time::Duration;
///
/// let config = EngineConfig {
///     load_timeout: Duration::from_secs(10),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to Chrome/Chromium executable (default: auto-detect)
    pub chrome_path: Option<String>,

    /// Maximum time the page may take to load (default: 30 seconds)
    pub load_timeout: Duration,

    /// Layout viewport used while the page loads, before the capture size is applied
    /// (default: 1024x768)
    pub window: Dimensions,

    /// Custom User-Agent string (default: Chrome default)
    pub user_agent: Option<String>,

    /// Accept invalid TLS certificates (default: true)
    pub ignore_certificate_errors: bool,

    /// Additional command-line switches passed to Chrome verbatim
    pub extra_args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            load_timeout: Duration::from_secs(30),
            window: Dimensions::new(1024, 768),
            user_agent: None,
            ignore_certificate_errors: true,
            extra_args: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON configuration file; missing fields keep their defaults
    pub async fn from_file(path: &Path) -> Result<Self, CaptureError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            CaptureError::ConfigurationError(format!("{}: {e}", path.display()))
        })?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.load_timeout.is_zero() {
            return Err(CaptureError::ConfigurationError(
                "Load timeout must be greater than 0".to_string(),
            ));
        }

        if self.window.is_empty() {
            return Err(CaptureError::ConfigurationError(
                "Window dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Generate Chrome command-line arguments for a single headless capture
///
/// `user_data_dir` isolates the profile so that concurrent invocations do not
/// share a Chrome singleton.
pub fn get_chrome_args(config: &EngineConfig, user_data_dir: &Path) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--hide-scrollbars".to_string(),
        "--disable-background-timer-throttling".to_string(),
        "--disable-backgrounding-occluded-windows".to_string(),
        "--disable-renderer-backgrounding".to_string(),
        "--disable-features=TranslateUI".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        format!("--window-size={},{}", config.window.width, config.window.height),
        format!("--user-data-dir={}", user_data_dir.display()),
    ];

    if config.ignore_certificate_errors {
        args.push("--ignore-certificate-errors".to_string());
    }

    if let Some(user_agent) = &config.user_agent {
        args.push(format!("--user-agent={user_agent}"));
    }

    args.extend(config.extra_args.iter().cloned());
    args
}

pub fn create_browser_config(
    config: &EngineConfig,
    user_data_dir: &Path,
) -> Result<chromiumoxide::browser::BrowserConfig, CaptureError> {
    use chromiumoxide::browser::BrowserConfig;
    use chromiumoxide::handler::viewport::Viewport;

    let mut builder = BrowserConfig::builder()
        .window_size(config.window.width, config.window.height)
        .viewport(Viewport {
            width: config.window.width,
            height: config.window.height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: config.window.width > config.window.height,
            has_touch: false,
        })
        .args(get_chrome_args(config, user_data_dir));

    if let Some(chrome_path) = &config.chrome_path {
        builder = builder.chrome_executable(chrome_path);
    }

    builder.build().map_err(CaptureError::BrowserLaunchFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_parse() {
        assert_eq!("100x200".parse::<Dimensions>().unwrap(), Dimensions::new(100, 200));
        assert_eq!("0x0".parse::<Dimensions>().unwrap(), Dimensions::default());
        assert_eq!("007x08".parse::<Dimensions>().unwrap(), Dimensions::new(7, 8));
    }

    #[test]
    fn test_dimensions_parse_rejects_malformed() {
        for token in [
            "", "x", "100", "100x", "x100", "100X100", "-1x10", "+1x10", "10x10x10", " 10x10",
            "10x10 ", "abc10x20", "1.5x2", "99999999999x1",
        ] {
            assert!(token.parse::<Dimensions>().is_err(), "accepted {token:?}");
        }
    }

    #[test]
    fn test_dimensions_display() {
        assert_eq!(Dimensions::new(640, 480).to_string(), "640x480");
    }

    #[test]
    fn test_offset_from_dimensions() {
        assert_eq!(Offset::from(Dimensions::new(10, 20)), Offset::new(10, 20));
    }

    #[test]
    fn test_capture_options_default() {
        let options = CaptureOptions::default();
        assert_eq!(options.source_url, DEFAULT_URL);
        assert_eq!(options.output_path, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(options.offset, Offset::new(0, 0));
        assert!(options.capture_size.is_zero());
        assert!(options.target_size.is_zero());
        assert_eq!(options.zoom, 1.0);
        assert_eq!(options.text_zoom, 1.0);
        assert!(options.script.is_empty());
        assert!(options.css.is_empty());
        assert_eq!(options.delay, Duration::ZERO);
    }

    #[test]
    fn test_engine_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());

        let config = EngineConfig {
            load_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CaptureError::ConfigurationError(_))
        ));

        let config = EngineConfig {
            window: Dimensions::new(0, 768),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_config_partial_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "chrome_path": "/usr/bin/chromium", "window": { "width": 800, "height": 600 } }"#)
                .unwrap();
        assert_eq!(config.chrome_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(config.window, Dimensions::new(800, 600));
        assert_eq!(config.load_timeout, Duration::from_secs(30));
        assert!(config.ignore_certificate_errors);
    }

    #[test]
    fn test_chrome_args_generation() {
        let config = EngineConfig {
            user_agent: Some("webscreenie-test".to_string()),
            extra_args: vec!["--lang=fr".to_string()],
            ..Default::default()
        };
        let args = get_chrome_args(&config, Path::new("/tmp/profile"));

        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--hide-scrollbars".to_string()));
        assert!(args.contains(&"--window-size=1024,768".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
        assert!(args.contains(&"--user-agent=webscreenie-test".to_string()));
        assert_eq!(args.last(), Some(&"--lang=fr".to_string()));
    }

    #[test]
    fn test_chrome_args_without_certificate_override() {
        let config = EngineConfig {
            ignore_certificate_errors: false,
            ..Default::default()
        };
        let args = get_chrome_args(&config, Path::new("/tmp/profile"));
        assert!(!args.contains(&"--ignore-certificate-errors".to_string()));
    }
}
