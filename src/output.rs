//! PNG input/output and file path generation

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Load an image file as 8-bit RGBA.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, OutputError> {
    Ok(image::open(path)?.to_rgba8())
}

/// Save an RGBA image to a PNG file, creating parent directories as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save(path)?;
    Ok(())
}

/// Generate the output path for a processed frame.
///
/// # Output Naming Rules
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o` | `{input_dir}/{stem}_fx.png` |
/// | With `-o output.png` (single input) | `output.png` |
/// | With `-o output.png` (multiple) | `output_{stem}.png` |
/// | With `-o dir/` | `dir/{stem}.png` |
pub fn generate_output_path(input: &Path, output_arg: Option<&Path>, is_single_input: bool) -> PathBuf {
    let input_stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("frame");

    match output_arg {
        Some(output) => {
            // Check if output is a directory (ends with / or is existing directory)
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();

            if is_dir {
                output.join(format!("{}.png", input_stem))
            } else if is_single_input {
                output.to_path_buf()
            } else {
                let stem = output
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("output");
                let parent = output.parent().unwrap_or(Path::new(""));
                parent.join(format!("{}_{}.png", stem, input_stem))
            }
        }
        None => {
            let parent = input.parent().unwrap_or(Path::new(""));
            parent.join(format!("{}_fx.png", input_stem))
        }
    }
}
