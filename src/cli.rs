use crate::{
    imaging, normalize_url, read_text_file, CaptureError, CaptureOptions, CaptureReport,
    CaptureSession, ChromeEngine, Console, Dimensions, EngineConfig, Offset, RenderingEngine,
    DEFAULT_OUTPUT, DEFAULT_URL,
};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "webscreenie")]
#[command(about = "Converts a html page to an image")]
#[command(version)]
#[command(override_usage = "webscreenie [OPTIONS]... [<input url> [<output file>]]")]
#[command(
    after_help = "Example:\n  webscreenie --url http://www.example.com --file example.png --target_size 640x480"
)]
#[command(disable_help_flag = true)]
pub struct Cli {
    #[arg(short = '?', long, action = ArgAction::Help, help = "Show this help / usage message")]
    pub help: Option<bool>,

    #[arg(short, long, value_name = "URL", help = "URL to open")]
    pub url: Option<String>,

    #[arg(short, long, value_name = "FILE", help = "Output image; the extension selects the format")]
    pub file: Option<PathBuf>,

    #[arg(value_name = "INPUT_URL", help = "URL to open, when --url is not given")]
    pub input_url: Option<String>,

    #[arg(value_name = "OUTPUT_FILE", help = "Output image, when --file is not given")]
    pub output_file: Option<PathBuf>,

    #[arg(long, value_name = "WxH", help_heading = "Image Options", help = "Offset from the upper-left corner to crop")]
    pub offset: Option<Dimensions>,

    #[arg(long, value_name = "WxH", help_heading = "Image Options", help = "Dimension of the web page capture")]
    pub size: Option<Dimensions>,

    #[arg(long = "target_size", value_name = "WxH", help_heading = "Image Options", help = "Target dimension of the output image")]
    pub target_size: Option<Dimensions>,

    #[arg(long, value_name = "FACTOR", value_parser = parse_zoom_factor, help_heading = "Image Options", help = "Zoom factor for the whole page")]
    pub zoom: Option<f64>,

    #[arg(long, value_name = "FACTOR", value_parser = parse_zoom_factor, help_heading = "Image Options", help = "Text zoom factor")]
    pub textzoom: Option<f64>,

    #[arg(long, value_name = "SCRIPT", allow_hyphen_values = true, help_heading = "Advanced Options", help = "Custom JavaScript to execute before render")]
    pub script: Option<String>,

    #[arg(long = "script_file", value_name = "FILE", help_heading = "Advanced Options", help = "Custom JavaScript file to execute before render")]
    pub script_file: Option<PathBuf>,

    #[arg(long, value_name = "CSS", allow_hyphen_values = true, help_heading = "Advanced Options", help = "Custom CSS to change render style")]
    pub css: Option<String>,

    #[arg(long = "css_file", value_name = "FILE", help_heading = "Advanced Options", help = "Custom CSS file")]
    pub css_file: Option<PathBuf>,

    #[arg(long, value_name = "MS", help_heading = "Advanced Options", help = "Delay, in milliseconds, before render")]
    pub delay: Option<u64>,

    #[arg(long, hide = true)]
    pub interactive: bool,

    #[arg(long, visible_alias = "options", value_name = "FILE", help_heading = "Engine Options", help = "Engine configuration file (JSON)")]
    pub config: Option<PathBuf>,

    #[arg(long = "chrome_path", value_name = "PATH", help_heading = "Engine Options", help = "Chrome executable path")]
    pub chrome_path: Option<String>,

    #[arg(long, value_name = "SECONDS", help_heading = "Engine Options", help = "Page load timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help_heading = "Engine Options", help = "Enable verbose logging")]
    pub verbose: bool,
}

fn parse_zoom_factor(s: &str) -> Result<f64, String> {
    let factor: f64 = s
        .parse()
        .map_err(|_| format!("{s:?} is not a floating point number"))?;
    if !factor.is_finite() || factor <= 0.0 {
        return Err(format!("zoom factor must be greater than 0, got {s}"));
    }
    Ok(factor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    Help,
    Version,
    Usage,
}

/// Why argument parsing stopped the program
#[derive(Debug)]
pub struct CliExit {
    pub kind: ExitKind,
    pub message: String,
}

impl CliExit {
    pub fn exit_code(&self) -> ExitCode {
        match self.kind {
            ExitKind::Help | ExitKind::Version => ExitCode::SUCCESS,
            ExitKind::Usage => ExitCode::from(1),
        }
    }

    /// Help and version go to stdout; usage errors go to stderr followed by the full usage.
    pub fn print(&self) {
        match self.kind {
            ExitKind::Help | ExitKind::Version => print!("{}", self.message),
            ExitKind::Usage => {
                eprint!("{}", self.message);
                eprintln!();
                eprint!("{}", usage());
            }
        }
    }
}

pub fn parse_args<I, T>(args: I) -> Result<Cli, CliExit>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|e| {
        let kind = match e.kind() {
            ErrorKind::DisplayHelp => ExitKind::Help,
            ErrorKind::DisplayVersion => ExitKind::Version,
            _ => ExitKind::Usage,
        };
        CliExit {
            kind,
            message: e.render().to_string(),
        }
    })
}

pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

pub struct CliRunner {
    pub options: CaptureOptions,
    pub engine_config: EngineConfig,
}

impl CliRunner {
    /// Resolve files, URLs and configuration named on the command line.
    pub async fn from_args(args: &Cli) -> Result<Self, CaptureError> {
        if args.interactive {
            warn!("--interactive is no longer supported and is ignored");
        }

        let mut script = args.script.clone().unwrap_or_default();
        if let Some(path) = &args.script_file {
            script.push_str(&read_text_file(path).await?);
        }

        let mut css = args.css.clone().unwrap_or_default();
        if let Some(path) = &args.css_file {
            css.push_str(&read_text_file(path).await?);
        }

        let mut engine_config = match &args.config {
            Some(path) => EngineConfig::from_file(path).await?,
            None => EngineConfig::default(),
        };
        if let Some(chrome_path) = &args.chrome_path {
            engine_config.chrome_path = Some(chrome_path.clone());
        }
        if let Some(timeout) = args.timeout {
            engine_config.load_timeout = Duration::from_secs(timeout);
        }
        engine_config.validate()?;

        let url = args
            .url
            .as_deref()
            .or(args.input_url.as_deref())
            .unwrap_or(DEFAULT_URL);

        let output_path = args
            .file
            .clone()
            .or_else(|| args.output_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
        imaging::output_format(&output_path)?;

        let options = CaptureOptions {
            source_url: normalize_url(url)?,
            output_path,
            offset: args.offset.map(Offset::from).unwrap_or_default(),
            capture_size: args.size.unwrap_or_default(),
            target_size: args.target_size.unwrap_or_default(),
            zoom: args.zoom.unwrap_or(1.0),
            text_zoom: args.textzoom.unwrap_or(1.0),
            script,
            css,
            delay: Duration::from_millis(args.delay.unwrap_or(0)),
        };
        debug!("Capture options: {:?}", options);

        Ok(Self {
            options,
            engine_config,
        })
    }

    /// Launch Chrome, capture and shut Chrome down again, whatever the outcome.
    pub async fn run(&self) -> Result<CaptureReport, CaptureError> {
        let engine = ChromeEngine::launch(&self.engine_config).await?;
        let result = self.run_with(&engine, Console::stdout()).await;
        engine.shutdown().await;
        result
    }

    pub async fn run_with<E, W>(&self, engine: &E, console: Console<W>) -> Result<CaptureReport, CaptureError>
    where
        E: RenderingEngine + ?Sized,
        W: Write,
    {
        info!("Capturing {} to {}", self.options.source_url, self.options.output_path.display());
        CaptureSession::new(engine, &self.options, console, self.engine_config.load_timeout)
            .run()
            .await
    }
}

/// Log to stderr; stdout carries progress and results.
pub fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, CliExit> {
        parse_args(std::iter::once("webscreenie").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_full_command_line() {
        let cli = parse(&[
            "--url", "http://localhost/", "--file", "out.jpg", "--offset", "10x20", "--size",
            "800x600", "--target_size", "400x0", "--zoom", "1.5", "--textzoom", "2", "--delay",
            "3000", "--script", "-1", "--css", "body{}",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("http://localhost/"));
        assert_eq!(cli.file, Some(PathBuf::from("out.jpg")));
        assert_eq!(cli.offset, Some(Dimensions::new(10, 20)));
        assert_eq!(cli.size, Some(Dimensions::new(800, 600)));
        assert_eq!(cli.target_size, Some(Dimensions::new(400, 0)));
        assert_eq!(cli.zoom, Some(1.5));
        assert_eq!(cli.textzoom, Some(2.0));
        assert_eq!(cli.delay, Some(3000));
        assert_eq!(cli.script.as_deref(), Some("-1"));
        assert_eq!(cli.css.as_deref(), Some("body{}"));
    }

    #[test]
    fn test_parse_positional_arguments() {
        let cli = parse(&["http://localhost/", "shot.png"]).unwrap();
        assert_eq!(cli.input_url.as_deref(), Some("http://localhost/"));
        assert_eq!(cli.output_file, Some(PathBuf::from("shot.png")));
    }

    #[test]
    fn test_parse_short_flags() {
        let cli = parse(&["-u", "example.org", "-f", "a.png"]).unwrap();
        assert_eq!(cli.url.as_deref(), Some("example.org"));
        assert_eq!(cli.file, Some(PathBuf::from("a.png")));
    }

    #[test]
    fn test_help_and_version() {
        for flag in ["--help", "-?"] {
            let exit = parse(&[flag]).unwrap_err();
            assert_eq!(exit.kind, ExitKind::Help);
            assert!(exit.message.contains("--target_size"));
        }

        assert_eq!(parse(&["--version"]).unwrap_err().kind, ExitKind::Version);
    }

    #[test]
    fn test_usage_errors() {
        for args in [
            vec!["--bogus"],
            vec!["--delay"],
            vec!["--url"],
            vec!["--size", "100"],
            vec!["--offset", "10 x 10"],
            vec!["--target_size", "ax1"],
            vec!["--zoom", "0"],
            vec!["--textzoom", "-2"],
            vec!["--delay", "-5"],
        ] {
            let exit = parse(&args).unwrap_err();
            assert_eq!(exit.kind, ExitKind::Usage, "accepted {args:?}");
        }
    }

    #[test]
    fn test_usage_text() {
        let text = usage();
        assert!(text.contains("webscreenie [OPTIONS]... [<input url> [<output file>]]"));
        assert!(text.contains("--script_file"));
        assert!(!text.contains("--interactive"));
    }

    #[test]
    fn test_zoom_factor_parser() {
        assert_eq!(parse_zoom_factor("0.5"), Ok(0.5));
        assert!(parse_zoom_factor("NaN").is_err());
        assert!(parse_zoom_factor("inf").is_err());
        assert!(parse_zoom_factor("zoom").is_err());
    }

    #[tokio::test]
    async fn test_runner_defaults() {
        let runner = CliRunner::from_args(&parse(&[]).unwrap()).await.unwrap();
        assert_eq!(runner.options.source_url, "http://www.example.com/");
        assert_eq!(runner.options.output_path, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(runner.options.delay, Duration::ZERO);
        assert_eq!(runner.engine_config.load_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_runner_flag_url_wins_over_positional() {
        let cli = parse(&["--url", "https://flag.example/", "https://positional.example/"]).unwrap();
        let runner = CliRunner::from_args(&cli).await.unwrap();
        assert_eq!(runner.options.source_url, "https://flag.example/");
    }

    #[tokio::test]
    async fn test_runner_reads_script_and_css_files() {
        let dir = std::env::temp_dir().join(format!("webscreenie-cli-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let script = dir.join("tweak.js");
        let css = dir.join("tweak.css");
        tokio::fs::write(&script, "document.title = 'a';\ndocument.title += 'b';").await.unwrap();
        tokio::fs::write(&css, "body { color: red; }").await.unwrap();

        let cli = parse(&[
            "--script",
            "var x = 1;",
            "--script_file",
            script.to_str().unwrap(),
            "--css_file",
            css.to_str().unwrap(),
        ])
        .unwrap();
        let runner = CliRunner::from_args(&cli).await.unwrap();

        assert_eq!(
            runner.options.script,
            "var x = 1;document.title = 'a';\ndocument.title += 'b';\n"
        );
        assert_eq!(runner.options.css, "body { color: red; }\n");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_runner_missing_script_file() {
        let cli = parse(&["--script_file", "nonexistent.js"]).unwrap();
        let err = CliRunner::from_args(&cli).await.err().unwrap();
        assert!(matches!(err, CaptureError::FileRead { .. }));
        assert!(err.prints_usage());
    }

    #[tokio::test]
    async fn test_runner_applies_engine_overrides() {
        let cli = parse(&["--chrome_path", "/opt/chrome", "--timeout", "7"]).unwrap();
        let runner = CliRunner::from_args(&cli).await.unwrap();
        assert_eq!(runner.engine_config.chrome_path.as_deref(), Some("/opt/chrome"));
        assert_eq!(runner.engine_config.load_timeout, Duration::from_secs(7));

        let cli = parse(&["--timeout", "0"]).unwrap();
        assert!(matches!(
            CliRunner::from_args(&cli).await,
            Err(CaptureError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn test_runner_rejects_unknown_extension() {
        let cli = parse(&["--file", "shot.unknown"]).unwrap();
        assert!(matches!(
            CliRunner::from_args(&cli).await,
            Err(CaptureError::UnsupportedFormat(_))
        ));
    }
}
