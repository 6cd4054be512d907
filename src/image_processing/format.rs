use std::str::FromStr;
use strum_macros::{Display, EnumString};

use crate::error::ConversionError;

/// Format names accepted on the command line, in the order they are listed to users
pub const SUPPORTED_FORMAT_NAMES: [&str; 6] = ["png", "jpeg", "jpg", "webp", "heic", "ico"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum OutputFormat {
    #[strum(to_string = "png")]
    Png,
    #[strum(to_string = "jpeg", serialize = "jpg")]
    Jpeg,
    #[strum(to_string = "webp")]
    Webp,
    #[strum(to_string = "heic")]
    Heic,
    #[strum(to_string = "ico")]
    Ico,
}

impl OutputFormat {
    /// Whether the source is flattened to 3-channel RGB before encoding
    pub fn normalizes_to_rgb(self) -> bool {
        !matches!(self, OutputFormat::Ico)
    }

    /// Whether the encode options' quality setting applies
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg | OutputFormat::Heic)
    }
}

/// A validated format together with the extension its outputs get.
///
/// The extension keeps the spelling that was asked for, so `JPG` writes
/// `.jpg` and `jpeg` writes `.jpeg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedFormat {
    pub format: OutputFormat,
    pub extension: String,
}

/// Validate a user-supplied format name. Pure: never touches the filesystem.
pub fn validate_format(name: &str) -> Result<RequestedFormat, ConversionError> {
    let format = OutputFormat::from_str(name).map_err(|_| ConversionError::UnsupportedFormat {
        format: name.to_lowercase(),
    })?;

    Ok(RequestedFormat {
        format,
        extension: name.to_lowercase(),
    })
}
