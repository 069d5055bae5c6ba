// PNG export pipeline
//
// The page rasterizes the rendered preview and posts the capture here as a
// data URL. This module decides what gets rendered for export (full question
// vs. math-only), names the file, validates the capture and writes it out.

use crate::latex::extract_math_segments;
use crate::paths::resolve_export_dir;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tauri::AppHandle;
use tracing::info;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Selects the markup to render for export. Math-only export strips inline
/// text regions via segmentation; otherwise the expression goes out as-is.
pub(crate) fn export_content(latex: &str, math_only: bool) -> Result<String, String> {
    let trimmed = latex.trim();
    if trimmed.is_empty() {
        return Err("Please enter a LaTeX expression first.".to_string());
    }
    if math_only {
        Ok(extract_math_segments(trimmed))
    } else {
        Ok(trimmed.to_string())
    }
}

pub(crate) fn export_file_name(math_only: bool, now: &DateTime<Local>) -> String {
    let stamp = now.format("%Y%m%d-%H%M%S");
    if math_only {
        format!("math-only-{}.png", stamp)
    } else {
        format!("full-question-{}.png", stamp)
    }
}

/// Decodes a `data:image/png;base64,` capture and verifies it really is a
/// PNG before anything touches disk.
pub(crate) fn decode_png_data_url(data_url: &str) -> Result<Vec<u8>, String> {
    let payload = data_url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| "Capture is not a PNG data URL.".to_string())?;
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| format!("Capture decode failed: {}", e))?;
    if bytes.is_empty() {
        return Err("Capture is empty.".to_string());
    }
    image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
        .map_err(|e| format!("Capture is not a valid PNG: {}", e))?;
    Ok(bytes)
}

/// Validates the capture and writes it under a user-chosen path. Returns the
/// saved path, or an error when the capture is unusable, the dialog is
/// cancelled or the write fails.
pub(crate) fn save_export(
    app: &AppHandle,
    data_url: &str,
    math_only: bool,
) -> Result<PathBuf, String> {
    let bytes = decode_png_data_url(data_url)?;
    let default_name = export_file_name(math_only, &Local::now());

    let file_path = rfd::FileDialog::new()
        .set_directory(resolve_export_dir(app))
        .set_file_name(&default_name)
        .add_filter("PNG image", &["png"])
        .save_file()
        .ok_or("Export cancelled")?;

    std::fs::write(&file_path, &bytes)
        .map_err(|e| format!("Failed to write {}: {}", file_path.display(), e))?;

    info!("Exported {} bytes to {}", bytes.len(), file_path.display());
    Ok(file_path)
}
