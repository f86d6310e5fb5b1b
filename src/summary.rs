//! End-of-run summary printed to stderr

use std::io;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::tree::WalkStats;

/// Format a size in bytes to human-readable format.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1}T", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Write the summary line, e.g. `3 directories, 12 files, 4.2M -> ncdu.json`.
pub fn write_summary<W: WriteColor>(
    out: &mut W,
    stats: &WalkStats,
    destination: &str,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
    write!(out, "{}", stats.directories)?;
    out.reset()?;
    write!(out, " directories, ")?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::White)).set_bold(true))?;
    write!(out, "{}", stats.files)?;
    out.reset()?;
    write!(out, " files, ")?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "{}", format_size(stats.bytes))?;
    out.reset()?;
    writeln!(out, " -> {}", destination)?;
    Ok(())
}

/// Print the summary to stderr.
pub fn print_summary(stats: &WalkStats, destination: &str, use_color: bool) -> io::Result<()> {
    let choice = if use_color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stderr = StandardStream::stderr(choice);
    write_summary(&mut stderr, stats, destination)
}
