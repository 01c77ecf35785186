use std::io::Write;

use artgrid_core::{BulkReport, Record, SelectionSet};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

/// First line of a multi-line field (artist_display carries nationality on line 2).
fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}

fn date_range(record: &Record) -> String {
    match (record.date_start, record.date_end) {
        (Some(s), Some(e)) if s == e => s.to_string(),
        (Some(s), Some(e)) => format!("{s}-{e}"),
        (Some(s), None) => s.to_string(),
        (None, Some(e)) => e.to_string(),
        (None, None) => "-".to_string(),
    }
}

pub fn print_page_header(
    w: &mut dyn Write,
    page: u32,
    page_size: usize,
    total: u64,
    color: ColorMode,
) -> std::io::Result<()> {
    let pages = total.div_ceil(page_size.max(1) as u64);
    let line = format!("Page {page} of {pages} ({total} artworks, {page_size} per page)");
    if color.enabled() {
        writeln!(w, "{}", line.bold())?;
    } else {
        writeln!(w, "{line}")?;
    }
    writeln!(w)
}

/// Print one line per record. With `selection`, each line gets a checkbox.
pub fn print_records(
    w: &mut dyn Write,
    records: &[Record],
    selection: Option<&SelectionSet>,
    color: ColorMode,
) -> std::io::Result<()> {
    for record in records {
        let check = match selection {
            Some(sel) if sel.contains(record.id) => "[x] ",
            Some(_) => "[ ] ",
            None => "",
        };
        let title = clip(or_dash(Some(record.title.as_str())), 48);
        let artist = clip(first_line(or_dash(record.artist_display.as_deref())), 32);
        let origin = or_dash(record.place_of_origin.as_deref());
        let dates = date_range(record);

        if color.enabled() {
            writeln!(
                w,
                "{}{:>8}  {:<48}  {:<32}  {:<16}  {}",
                check,
                record.id.dimmed(),
                title.bold(),
                artist,
                origin.cyan(),
                dates.dimmed()
            )?;
        } else {
            writeln!(
                w,
                "{}{:>8}  {:<48}  {:<32}  {:<16}  {}",
                check, record.id, title, artist, origin, dates
            )?;
        }
    }
    Ok(())
}

pub fn print_selection_summary(
    w: &mut dyn Write,
    report: &BulkReport,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    let line = format!("Selected rows: {}", report.selected);
    if color.enabled() {
        writeln!(w, "{}", line.green().bold())?;
    } else {
        writeln!(w, "{line}")?;
    }
    if report.selected < report.requested {
        let note = format!(
            "(catalog holds only {} of the {} requested rows)",
            report.selected, report.requested
        );
        if color.enabled() {
            writeln!(w, "{}", note.yellow())?;
        } else {
            writeln!(w, "{note}")?;
        }
    }
    if !report.fetched_pages.is_empty() {
        writeln!(w, "Fetched pages: {:?}", report.fetched_pages)?;
    }
    Ok(())
}
