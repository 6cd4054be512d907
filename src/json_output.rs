//! JSON output for tool integration
//!
//! When --json-progress is enabled, all progress and status information
//! is emitted as JSON lines to stdout, suppressing all other output.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Last progress emission timestamp (milliseconds since epoch)
/// Used for throttling progress updates to ~25 FPS (40ms between updates)
static LAST_PROGRESS_MS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonMessage {
    /// Progress update
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    /// File conversion completed
    FileCompleted {
        input_path: String,
        output_path: String,
        processing_time_ms: u128,
    },
    /// Dry run: file would be converted to `output_path`
    FilePlanned {
        input_path: String,
        output_path: String,
    },
    /// File conversion failed; the run stops here
    FileFailed { input_path: String, error: String },
    /// Run summary
    Summary {
        total_files: usize,
        converted: usize,
        dry_run: bool,
        duration_secs: f64,
    },
    /// User-facing notice (errors and the final success message)
    Notice {
        severity: String,
        title: String,
        message: String,
    },
}

impl JsonMessage {
    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Create and emit progress message (throttled to ~25 FPS)
    ///
    /// The final progress (current == total) is always emitted to ensure 100% completion.
    pub fn progress(current: usize, total: usize, message: impl Into<String>) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let last_ms = LAST_PROGRESS_MS.load(Ordering::Relaxed);

        if now_ms.saturating_sub(last_ms) >= 40 || current == total {
            LAST_PROGRESS_MS.store(now_ms, Ordering::Relaxed);
            Self::Progress {
                current,
                total,
                message: message.into(),
            }
            .emit();
        }
    }

    pub fn file_completed(input_path: &Path, output_path: &Path, processing_time_ms: u128) {
        Self::FileCompleted {
            input_path: input_path.display().to_string(),
            output_path: output_path.display().to_string(),
            processing_time_ms,
        }
        .emit();
    }

    pub fn file_planned(input_path: &Path, output_path: &Path) {
        Self::FilePlanned {
            input_path: input_path.display().to_string(),
            output_path: output_path.display().to_string(),
        }
        .emit();
    }

    pub fn file_failed(input_path: &Path, error: impl Into<String>) {
        Self::FileFailed {
            input_path: input_path.display().to_string(),
            error: error.into(),
        }
        .emit();
    }

    pub fn summary(total_files: usize, converted: usize, dry_run: bool, duration_secs: f64) {
        Self::Summary {
            total_files,
            converted,
            dry_run,
            duration_secs,
        }
        .emit();
    }
}
