use anyhow::Result;
use std::path::Path;
use url::Url;

/// Escape text for safe inclusion in HTML element content.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Serialize a value as JSON safe to embed inside a `<script>` element.
///
/// A literal `</script>` inside a JSON string would end the element early,
/// so close-tag sequences are broken with a backslash escape.
pub fn json_for_script<T: serde::Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace("</", "<\\/"))
}

/// Validate an image `src` entry: either an absolute http(s) URL or a
/// non-empty relative path.
pub fn validate_image_src(src: &str) -> Result<()> {
    if src.trim().is_empty() {
        anyhow::bail!("Image src must not be empty");
    }

    if let Ok(parsed) = Url::parse(src) {
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Image URL must use HTTP or HTTPS protocol: {}", src);
        }
    }

    Ok(())
}

/// Check if a file exists and is readable
pub fn check_file_accessible(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("Path is not a file: {}", path.display());
    }

    // Try to read metadata to check permissions
    std::fs::metadata(path)
        .map_err(|e| anyhow::anyhow!("Cannot access file {}: {}", path.display(), e))?;

    Ok(())
}

/// Guess the audio MIME type for a file name, for the `<source>` element.
pub fn audio_mime_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "m4a" | "aac" => "audio/mp4",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        _ => "audio/mpeg",
    }
}
