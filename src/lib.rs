// Library exports for the binary and the integration tests
pub mod cli;
pub mod config_file;
pub mod error;
pub mod image_processing;
pub mod json_output;
pub mod notify;
pub mod utils;

// Re-export commonly used types
pub use config_file::Settings;
pub use error::ConversionError;
pub use image_processing::codec::{EncodeOptions, ImageCodec, ImageRsCodec};
pub use image_processing::format::OutputFormat;
pub use image_processing::{
    ConversionConfig, ConversionDriver, ConversionRequest, ConversionSummary, DriverEvent,
};
pub use json_output::JsonMessage;
pub use notify::{build_notifier, Notifier, NotifyMode, Severity};
