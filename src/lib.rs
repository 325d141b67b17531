//! # WebScreenie
//!
//! Loads a web page in headless Chrome, waits for it to finish loading, optionally runs
//! custom JavaScript and CSS and waits a fixed delay, then renders the page to a bitmap,
//! crops and rescales it and saves it to an image file.
//!
//! ## Pipeline
//!
//! | Step | Module | Notes |
//! |------|--------|-------|
//! | Argument parsing | [`cli`] | clap derive, `WxH` values parsed strictly |
//! | Page load | [`loader`] | progress percentage printed in place |
//! | Delay | [`delay`] | a dot per second when longer than 2 s |
//! | Capture | [`capture`] | zoom, inject, size, render, crop, resize |
//! | Save | [`imaging`] | format chosen from the file extension |
//!
//! [`session`] ties these together as an explicit state machine
//! (`Idle → Loading → Loaded → Rendering → Saved`, or `Failed`).
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use webscreenie::{CaptureOptions, ChromeEngine, Console, CaptureSession, EngineConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let options = CaptureOptions {
//!         source_url: "https://example.com/".to_string(),
//!         output_path: "example.png".into(),
//!         ..Default::default()
//!     };
//!
//!     let engine = ChromeEngine::launch(&config).await?;
//!     let result = CaptureSession::new(&engine, &options, Console::stdout(), config.load_timeout)
//!         .run()
//!         .await;
//!     engine.shutdown().await;
//!
//!     println!("Captured {}", result?.dimensions);
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! webscreenie --url http://www.example.com --file example.png --target_size 640x480
//! webscreenie --size 1280x0 --css_file print.css --delay 3000 https://example.com shot.jpg
//! ```

/// Headless Chrome rendering engine
pub mod browser;

/// Zoom, injection, render, crop and resize
pub mod capture;

/// Command-line interface implementation
pub mod cli;

/// Configuration and settings
pub mod config;

/// User-facing progress and result messages
pub mod console;

/// Pre-render delay with progress dots
pub mod delay;

/// Rendering engine abstraction and load progress estimation
pub mod engine;

/// Error types and error handling utilities
pub mod error;

/// Image crop, resize and encoding
pub mod imaging;

/// Page loading with progress feedback
pub mod loader;

/// JavaScript snippets evaluated in the page
pub mod script;

/// Capture state machine
pub mod session;

/// Utility functions and helpers
pub mod utils;


pub use browser::*;
pub use capture::*;
pub use cli::*;
pub use config::*;
pub use console::*;
pub use delay::*;
pub use engine::*;
pub use error::*;
pub use imaging::*;
pub use loader::*;
pub use session::*;
pub use utils::*;
