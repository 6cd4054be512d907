use prettytable::{format, Cell, Row, Table};
use std::path::Path;

use super::ConversionSummary;
use crate::utils::{format_duration, format_file_size};

/// Build the per-file table printed by `--report`
pub fn build_table(summary: &ConversionSummary) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    let output_header = if summary.dry_run { "Planned output" } else { "Output" };
    table.add_row(Row::new(vec![
        Cell::new("#"),
        Cell::new("Input"),
        Cell::new(output_header),
        Cell::new("Size"),
        Cell::new("Time"),
    ]));

    for (i, file) in summary.files.iter().enumerate() {
        let size = if summary.dry_run {
            "-".to_string()
        } else {
            std::fs::metadata(&file.output_path)
                .map(|m| format_file_size(m.len()))
                .unwrap_or_else(|_| "?".to_string())
        };

        table.add_row(Row::new(vec![
            Cell::new(&(i + 1).to_string()),
            Cell::new(&truncate(&display_name(&file.input_path), 40)),
            Cell::new(&truncate(&display_name(&file.output_path), 40)),
            Cell::new(&size),
            Cell::new(&format_duration(file.duration)),
        ]));
    }

    table
}

/// Print the report for a finished run
pub fn print(summary: &ConversionSummary) {
    let title = if summary.dry_run { "DRY RUN" } else { "REPORT" };
    println!(
        "\n{} - {} file(s) to {}\n",
        title,
        summary.files.len(),
        summary.request.output_format.to_string().to_uppercase()
    );
    build_table(summary).printstd();
    println!();
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Truncate on char boundaries, marking the cut with an ellipsis
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
