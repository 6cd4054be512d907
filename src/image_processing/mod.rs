pub mod codec;
pub mod format;
pub mod path_resolver;
pub mod report;
pub mod resize;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::error::ConversionError;
use codec::{EncodeOptions, ImageCodec};
use format::{validate_format, OutputFormat};
use path_resolver::{split_extension, OutputTarget};

#[derive(Debug, Clone, Default)]
pub struct ConversionConfig {
    pub encode: EncodeOptions,
    /// Resolve and report output paths without writing anything
    pub dry_run: bool,
}

/// One validated invocation: what to convert and into which format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub output_format: OutputFormat,
    /// Lower-cased format name as requested; becomes the output extension
    pub extension: String,
}

impl ConversionRequest {
    /// Validate the format name. Never touches the filesystem.
    pub fn new(input_path: impl Into<PathBuf>, format_name: &str) -> Result<Self, ConversionError> {
        let requested = validate_format(format_name)?;
        Ok(Self {
            input_path: input_path.into(),
            output_format: requested.format,
            extension: requested.extension,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Validating,
    Resolving,
    Converting,
    Done,
    Failed,
}

/// Progress notifications emitted while a run executes
#[derive(Debug, Clone, Copy)]
pub enum DriverEvent<'a> {
    /// Inputs were enumerated
    Discovered { total: usize },
    /// The codec is about to be invoked
    Converting {
        index: usize,
        input: &'a Path,
        output: &'a Path,
    },
    /// The codec finished writing `output`
    Converted {
        index: usize,
        input: &'a Path,
        output: &'a Path,
        duration: Duration,
    },
    /// Dry run only: `output` would have been written
    Planned {
        index: usize,
        input: &'a Path,
        output: &'a Path,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub request: ConversionRequest,
    pub files: Vec<ConvertedFile>,
    pub dry_run: bool,
    pub elapsed: Duration,
}

/// Runs one conversion request against an [`ImageCodec`].
///
/// Strictly sequential. The first codec failure ends the run; files
/// converted before it are left in place.
pub struct ConversionDriver<C: ImageCodec> {
    codec: C,
    config: ConversionConfig,
    state: DriverState,
}

impl<C: ImageCodec> ConversionDriver<C> {
    pub fn new(codec: C, config: ConversionConfig) -> Self {
        Self {
            codec,
            config,
            state: DriverState::Validating,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn run(&mut self, input: &Path, format_name: &str) -> Result<ConversionSummary, ConversionError> {
        self.run_with(input, format_name, |_| {})
    }

    /// Like [`run`](Self::run), reporting progress through `on_event`
    pub fn run_with<F>(
        &mut self,
        input: &Path,
        format_name: &str,
        mut on_event: F,
    ) -> Result<ConversionSummary, ConversionError>
    where
        F: FnMut(DriverEvent<'_>),
    {
        let started = Instant::now();
        self.state = DriverState::Validating;

        let result = self.execute(input, format_name, &mut on_event, started);
        self.state = match result {
            Ok(_) => DriverState::Done,
            Err(_) => DriverState::Failed,
        };
        result
    }

    fn execute<F>(
        &mut self,
        input: &Path,
        format_name: &str,
        on_event: &mut F,
        started: Instant,
    ) -> Result<ConversionSummary, ConversionError>
    where
        F: FnMut(DriverEvent<'_>),
    {
        let request = ConversionRequest::new(input, format_name)?;

        self.state = DriverState::Resolving;
        let inputs = discover_inputs(&request.input_path)?;
        on_event(DriverEvent::Discovered { total: inputs.len() });

        self.state = DriverState::Converting;
        let dry_run = self.config.dry_run;
        let mut planned: HashSet<PathBuf> = HashSet::new();
        let mut files = Vec::with_capacity(inputs.len());

        for (index, source) in inputs.iter().enumerate() {
            let target = output_target_for(source, &request.extension, &planned);
            let output = target.resolved_path;

            if dry_run {
                on_event(DriverEvent::Planned {
                    index,
                    input: source,
                    output: &output,
                });
                files.push(ConvertedFile {
                    input_path: source.clone(),
                    output_path: output.clone(),
                    duration: Duration::ZERO,
                });
                planned.insert(output);
                continue;
            }

            on_event(DriverEvent::Converting {
                index,
                input: source,
                output: &output,
            });

            let file_started = Instant::now();
            self.codec
                .convert(source, &output, request.output_format, &self.config.encode)
                .map_err(|err| ConversionError::codec(source, err))?;
            let duration = file_started.elapsed();

            on_event(DriverEvent::Converted {
                index,
                input: source,
                output: &output,
                duration,
            });
            files.push(ConvertedFile {
                input_path: source.clone(),
                output_path: output,
                duration,
            });
        }

        Ok(ConversionSummary {
            request,
            files,
            dry_run,
            elapsed: started.elapsed(),
        })
    }
}

/// List the files a request covers.
///
/// A directory yields its direct regular-file entries (symlinks followed) in
/// filesystem order; a regular file yields itself. Anything else is
/// [`ConversionError::PathNotFound`].
pub fn discover_inputs(path: &Path) -> Result<Vec<PathBuf>, ConversionError> {
    if path.is_dir() {
        let mut files = Vec::new();
        for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| ConversionError::DirectoryRead {
                path: path.to_path_buf(),
                source,
            })?;
            if entry.path().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    } else if path.is_file() {
        Ok(vec![path.to_path_buf()])
    } else {
        Err(ConversionError::PathNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Output goes next to the source, named after the source's stem
fn output_target_for(source: &Path, extension: &str, planned: &HashSet<PathBuf>) -> OutputTarget {
    let directory = source.parent().unwrap_or_else(|| Path::new(""));
    let file_name = source.file_name().unwrap_or(source.as_os_str());
    let (base_name, _) = split_extension(file_name);

    OutputTarget::resolve_with(directory, &base_name, extension, |candidate| {
        candidate.exists() || planned.contains(candidate)
    })
}
