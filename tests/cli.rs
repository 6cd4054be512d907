use image::{GenericImageView, ImageBuffer, Rgba};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn converter(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_image-converter"))
        .args(args)
        // Keep a user's config file out of the run
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .output()
        .expect("failed to launch image-converter")
}

fn write_png(path: &Path, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, if x < width / 2 { 255 } else { 64 }])
    });
    img.save(path).unwrap();
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn no_arguments_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    let output = converter(home.path(), &["--json-progress"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""type":"notice""#));
    assert!(stdout.contains("Usage Error"));
}

#[test]
fn usage_error_is_reported_once() {
    let home = TempDir::new().unwrap();
    let output = converter(home.path(), &["photo.png", "--notify", "console"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Usage Error").count(), 1);
    assert!(stderr.contains("<OUTPUT_FORMAT>"));
}

#[cfg(unix)]
#[test]
fn non_utf8_argument_is_a_usage_error() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let home = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_image-converter"))
        .arg(OsStr::from_bytes(b"photo\xff.png"))
        .arg("--json-progress")
        .env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .output()
        .expect("failed to launch image-converter");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage Error"));
}

#[test]
fn help_exits_zero() {
    let home = TempDir::new().unwrap();
    let output = converter(home.path(), &["--help"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("OUTPUT_FORMAT"));
}

#[test]
fn unsupported_format_leaves_directory_untouched() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("a.png"), 8, 8);
    let before = listing(dir.path());

    let input = dir.path().to_string_lossy().into_owned();
    let output = converter(home.path(), &[&input, "bmp", "--notify", "console"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported format: bmp"));
    assert_eq!(listing(dir.path()), before);
}

#[test]
fn missing_path_exits_one() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.png").to_string_lossy().into_owned();

    let output = converter(home.path(), &[&missing, "png", "--notify", "console"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("The provided path does not exist"));
}

#[test]
fn single_png_to_webp() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let photo = dir.path().join("photo.png");
    write_png(&photo, 32, 16);

    let input = photo.to_string_lossy().into_owned();
    let output = converter(home.path(), &[&input, "WEBP", "--notify", "console"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(listing(dir.path()), vec!["photo.png", "photo.webp"]);

    let converted = image::open(dir.path().join("photo.webp")).unwrap();
    assert_eq!(converted.dimensions(), (32, 16));
}

#[test]
fn repeated_ico_runs_pick_fresh_names() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let icon = dir.path().join("icon.png");
    write_png(&icon, 64, 40);

    let input = icon.to_string_lossy().into_owned();
    for _ in 0..2 {
        let output = converter(home.path(), &[&input, "ico", "--notify", "console"]);
        assert_eq!(output.status.code(), Some(0));
    }

    assert_eq!(listing(dir.path()), vec!["icon.ico", "icon.png", "icon_1.ico"]);
    for name in ["icon.ico", "icon_1.ico"] {
        let decoded = image::open(dir.path().join(name)).unwrap();
        assert_eq!(decoded.dimensions(), (256, 256));
    }
}

#[test]
fn batch_stops_on_undecodable_file() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("good.png"), 4, 4);
    fs::write(dir.path().join("broken.png"), b"not an image").unwrap();

    let input = dir.path().to_string_lossy().into_owned();
    let output = converter(home.path(), &[&input, "jpg", "--notify", "console"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to convert"));
    assert!(!dir.path().join("broken.jpg").exists());
}

#[test]
fn dry_run_writes_nothing() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("a.png"), 4, 4);
    let before = listing(dir.path());

    let input = dir.path().to_string_lossy().into_owned();
    let output = converter(home.path(), &[&input, "jpeg", "--dry-run", "--json-progress"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""type":"fileplanned""#));
    assert!(stdout.contains(r#""dry_run":true"#));
    assert_eq!(listing(dir.path()), before);
}
