use clap::Parser;
use std::path::PathBuf;

use crate::notify::NotifyMode;

#[derive(Parser, Debug)]
#[command(
    name = "image-converter",
    version,
    about = "Convert an image, or every image in a directory, to another format",
    long_about = "
Image Converter

Converts a single image file, or every regular file directly inside a directory,
to PNG, JPEG, WEBP, HEIC or ICO. Converted files are written next to their source.
Existing files are never overwritten: when the output name is taken, a numeric
suffix is added (photo.webp, photo_1.webp, photo_2.webp, ...).

Conversion stops at the first file that fails; files converted before it are kept.

Supported output formats: png, jpeg, jpg, webp, heic, ico (case-insensitive)
  - png, jpeg, jpg, webp and heic are written as RGB
  - ico keeps transparency and is written as a 256x256 icon

Example Usage:
  # Convert one image to WEBP
  image-converter ~/Pictures/photo.png webp

  # Convert a whole directory to JPEG at quality 90
  image-converter ~/Pictures/holiday jpg --quality 90

  # Build an icon, showing a dialog when done (requires the gui feature)
  image-converter logo.png ico --notify dialog

  # See which files would be written without converting anything
  image-converter ~/Pictures/holiday png --dry-run --report

  # Machine-readable output for tool integration
  image-converter ~/Pictures/holiday webp --json-progress"
)]
pub struct Args {
    /// Image file, or directory whose files should all be converted
    #[arg(value_name = "INPUT_PATH_OR_DIR")]
    pub input: PathBuf,

    /// Target format: png, jpeg, jpg, webp, heic or ico
    #[arg(value_name = "OUTPUT_FORMAT")]
    pub output_format: String,

    /// Quality for lossy formats (JPEG, HEIC), 1-100 [default: 75]
    #[arg(
        short = 'q',
        long = "quality",
        value_name = "1-100",
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub quality: Option<u8>,

    /// How errors and the final notice are shown
    #[arg(long = "notify", value_name = "MODE")]
    pub notify: Option<NotifyMode>,

    /// Resolve output names and report them without writing any file
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print a table of the converted files when done
    #[arg(long = "report")]
    pub report: bool,

    /// Emit progress and notices as JSON lines on stdout
    #[arg(long = "json-progress")]
    pub json_progress: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// JSON configuration file [default: <config dir>/image-converter/config.json]
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["image-converter", "photos", "WEBP"]).unwrap();
        assert_eq!(args.input, PathBuf::from("photos"));
        assert_eq!(args.output_format, "WEBP");
        assert_eq!(args.quality, None);
        assert_eq!(args.notify, None);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_missing_format_is_an_error() {
        let err = Args::try_parse_from(["image-converter", "photo.png"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_extra_positional_is_an_error() {
        assert!(Args::try_parse_from(["image-converter", "a.png", "png", "extra"]).is_err());
    }

    #[test]
    fn test_quality_range() {
        let args = Args::try_parse_from(["image-converter", "a.png", "jpg", "-q", "90"]).unwrap();
        assert_eq!(args.quality, Some(90));

        assert!(Args::try_parse_from(["image-converter", "a.png", "jpg", "-q", "0"]).is_err());
        assert!(Args::try_parse_from(["image-converter", "a.png", "jpg", "--quality", "101"]).is_err());
    }

    #[test]
    fn test_options() {
        let args = Args::try_parse_from([
            "image-converter",
            "dir",
            "ico",
            "--notify",
            "console",
            "--dry-run",
            "--report",
            "--json-progress",
            "-v",
            "--config",
            "settings.json",
        ])
        .unwrap();

        assert_eq!(args.notify, Some(NotifyMode::Console));
        assert!(args.dry_run && args.report && args.json_progress && args.verbose);
        assert_eq!(args.config_file, Some(PathBuf::from("settings.json")));
    }

    #[test]
    fn test_unknown_notify_mode() {
        assert!(Args::try_parse_from(["image-converter", "a.png", "png", "--notify", "email"]).is_err());
    }
}
