use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::ProgressBar;
use std::ffi::OsString;
use std::process::ExitCode;

use image_converter::cli::Args;
use image_converter::image_processing::format::validate_format;
use image_converter::image_processing::{report, ConversionSummary, DriverEvent};
use image_converter::utils::{create_progress_bar, format_duration, verbose_println, warn_println};
use image_converter::{
    build_notifier, ConversionDriver, ConversionError, ImageRsCodec, JsonMessage, Notifier,
    NotifyMode, Settings,
};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => return handle_parse_error(err),
    };

    let settings = match Settings::resolve(&args) {
        Ok(settings) => settings,
        Err(err) => {
            let notifier = build_notifier(args.notify.unwrap_or_default(), args.json_progress);
            notifier.error(err.title(), &err.to_string());
            return ExitCode::from(err.exit_code());
        }
    };

    let notifier = build_notifier(settings.notify, settings.json_progress);

    if !settings.json_progress {
        println!("{}", style("Image Converter").bold().blue());
        println!();
    }

    if settings.verbose && !settings.json_progress {
        print_configuration(&settings);
    }

    if args.quality.is_some() && !settings.json_progress {
        if let Ok(requested) = validate_format(&settings.output_format) {
            if !requested.format.is_lossy() {
                warn_println(&format!(
                    "--quality has no effect on {} output",
                    requested.format.to_string().to_uppercase()
                ));
            }
        }
    }

    match run(&settings) {
        Ok(summary) => {
            finish(&settings, &summary);
            let message = if summary.dry_run {
                "Dry run completed!"
            } else {
                "Conversion completed!"
            };
            notifier.info("Success", message);
            ExitCode::SUCCESS
        }
        Err(err) => {
            if settings.json_progress {
                if let ConversionError::Codec { input_path, message } = &err {
                    JsonMessage::file_failed(input_path, message.as_str());
                }
            }
            notifier.error(err.title(), &err.to_string());
            ExitCode::from(err.exit_code())
        }
    }
}

/// `--help` and `--version` exit 0; anything else is a usage error
fn handle_parse_error(err: clap::Error) -> ExitCode {
    if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        // Nothing useful to do if stdout is gone
        let _ = err.print();
        return ExitCode::SUCCESS;
    }

    // args_os: a non-UTF-8 path argument must not panic here
    let raw_args: Vec<OsString> = std::env::args_os().collect();
    let json_progress = raw_args.iter().any(|a| a == "--json-progress");
    let usage = ConversionError::usage(&err);
    let notifier = build_notifier(raw_notify_mode(&raw_args), json_progress);
    notifier.error(usage.title(), &usage.to_string());
    ExitCode::from(usage.exit_code())
}

/// `--notify` as given on a command line clap rejected, else the default
fn raw_notify_mode(raw_args: &[OsString]) -> NotifyMode {
    let value = raw_args.iter().enumerate().find_map(|(i, arg)| {
        let arg = arg.to_str()?;
        if arg == "--notify" {
            raw_args.get(i + 1)?.to_str()
        } else {
            arg.strip_prefix("--notify=")
        }
    });

    value
        .and_then(|v| NotifyMode::from_str(v, true).ok())
        .unwrap_or_default()
}

fn print_configuration(settings: &Settings) {
    println!("{}", style("Configuration:").bold());
    println!("  Input: {}", settings.input.display());
    println!("  Output format: {}", settings.output_format);
    println!("  Quality: {}", settings.conversion.encode.quality);
    println!("  ICO sizes: {:?}", settings.conversion.encode.ico_sizes);
    println!("  Notify: {:?}", settings.notify);
    println!("  Dry run: {}", settings.conversion.dry_run);
    match &settings.config_path {
        Some(path) => println!("  Config file: {}", path.display()),
        None => println!("  Config file: none"),
    }
    println!();
}

fn run(settings: &Settings) -> Result<ConversionSummary, ConversionError> {
    let verbose = settings.verbose;
    let json = settings.json_progress;
    let show_bar = settings.input.is_dir() && !verbose && !json;

    let mut progress: Option<ProgressBar> = None;
    let mut total = 0;

    let mut driver = ConversionDriver::new(ImageRsCodec, settings.conversion.clone());
    let result = driver.run_with(&settings.input, &settings.output_format, |event| match event {
        DriverEvent::Discovered { total: found } => {
            total = found;
            if show_bar {
                let pb = create_progress_bar(found as u64);
                pb.set_message("Converting");
                progress = Some(pb);
            }
            verbose_println(verbose, &format!("Found {} file(s) to convert", found));
        }
        DriverEvent::Converting { input, output, .. } => {
            if let Some(pb) = &progress {
                pb.set_message(
                    input
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
            }
            verbose_println(
                verbose,
                &format!("Converting {} -> {}", input.display(), output.display()),
            );
        }
        DriverEvent::Converted {
            index,
            input,
            output,
            duration,
        } => {
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            if json {
                JsonMessage::file_completed(input, output, duration.as_millis());
                JsonMessage::progress(index + 1, total, "Converting");
            }
            verbose_println(
                verbose,
                &format!("Wrote {} in {}", output.display(), format_duration(duration)),
            );
        }
        DriverEvent::Planned {
            index,
            input,
            output,
        } => {
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            if json {
                JsonMessage::file_planned(input, output);
                JsonMessage::progress(index + 1, total, "Planning");
            }
            verbose_println(
                verbose,
                &format!("Would convert {} -> {}", input.display(), output.display()),
            );
        }
    });

    if let Some(pb) = progress {
        if result.is_ok() {
            pb.finish_with_message("Done");
        } else {
            pb.abandon();
        }
    }

    result
}

fn finish(settings: &Settings, summary: &ConversionSummary) {
    if settings.json_progress {
        let converted = if summary.dry_run { 0 } else { summary.files.len() };
        JsonMessage::summary(
            summary.files.len(),
            converted,
            summary.dry_run,
            summary.elapsed.as_secs_f64(),
        );
        return;
    }

    if settings.report {
        report::print(summary);
    }

    let verb = if summary.dry_run { "Planned" } else { "Converted" };
    println!(
        "{} {} file(s) to {} in {}",
        style(verb).bold().green(),
        summary.files.len(),
        summary.request.output_format.to_string().to_uppercase(),
        style(format_duration(summary.elapsed)).bold()
    );
    verbose_println(
        settings.verbose,
        &format!("Total elapsed time: {}", format_duration(summary.elapsed)),
    );
}
