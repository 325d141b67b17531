use crate::CaptureError;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Turn what the user typed into something the browser can navigate to.
///
/// Absolute URLs are kept as they are, paths to existing files become `file://`
/// URLs and anything else is assumed to be a host name served over HTTP.
pub fn normalize_url(input: &str) -> Result<String, CaptureError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CaptureError::InvalidArgument("empty URL".to_string()));
    }

    if let Ok(url) = Url::parse(input) {
        // "localhost:8080" parses with "localhost" as its scheme
        if !url.cannot_be_a_base() || matches!(url.scheme(), "about" | "data" | "javascript") {
            return Ok(url.to_string());
        }
    }

    let path = Path::new(input);
    if path.exists() {
        let absolute = std::fs::canonicalize(path)?;
        return Url::from_file_path(&absolute)
            .map(|url| url.to_string())
            .map_err(|_| {
                CaptureError::InvalidArgument(format!("cannot express {} as a URL", absolute.display()))
            });
    }

    let url = Url::parse(&format!("http://{input}"))
        .map_err(|e| CaptureError::InvalidArgument(format!("invalid URL {input:?}: {e}")))?;
    Ok(url.to_string())
}

/// Read a script or stylesheet, one `\n`-terminated line at a time.
pub async fn read_text_file(path: &Path) -> Result<String, CaptureError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CaptureError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    // Invalid UTF-8 sequences become U+FFFD
    let content = String::from_utf8_lossy(&bytes);

    Ok(content.lines().fold(String::with_capacity(content.len() + 1), |mut text, line| {
        text.push_str(line);
        text.push('\n');
        text
    }))
}

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else if seconds > 0 {
        format!("{}.{}s", seconds, millis / 100)
    } else {
        format!("{millis}ms")
    }
}
