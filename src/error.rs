use std::path::PathBuf;
use thiserror::Error;

use crate::image_processing::format::SUPPORTED_FORMAT_NAMES;

/// Everything that can end a conversion run.
///
/// Every variant is terminal: the top-level handler shows exactly one notice
/// for it and exits with code 1.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{}Usage: image-converter <input_path_or_dir> <output_format>", usage_prefix(.detail))]
    Usage { detail: String },

    #[error("Unsupported format: {format}. Supported formats are {}.", SUPPORTED_FORMAT_NAMES.join(", "))]
    UnsupportedFormat { format: String },

    #[error("Error: The provided path does not exist: {}", .path.display())]
    PathNotFound { path: PathBuf },

    #[error("Failed to read directory {}: {source}", .path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to convert {}: {message}", .input_path.display())]
    Codec { input_path: PathBuf, message: String },

    #[error("Invalid configuration {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl ConversionError {
    /// Title shown on the notice for this error
    pub fn title(&self) -> &'static str {
        match self {
            ConversionError::Usage { .. } => "Usage Error",
            ConversionError::UnsupportedFormat { .. } => "Format Error",
            ConversionError::PathNotFound { .. } | ConversionError::DirectoryRead { .. } => {
                "Path Error"
            }
            ConversionError::Codec { .. } => "Error",
            ConversionError::Config { .. } => "Config Error",
        }
    }

    /// Process exit code. All failures share one code.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Usage error carrying what clap rejected, without its help footer
    pub fn usage(err: &clap::Error) -> Self {
        let rendered = err.to_string();
        let detail = rendered
            .lines()
            .take_while(|line| !line.starts_with("Usage:"))
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        ConversionError::Usage {
            detail: detail.trim_start_matches("error:").trim().to_string(),
        }
    }

    pub(crate) fn codec(input_path: &std::path::Path, err: anyhow::Error) -> Self {
        ConversionError::Codec {
            input_path: input_path.to_path_buf(),
            message: format!("{:#}", err),
        }
    }
}

fn usage_prefix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!("{}\n", detail)
    }
}
