use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use artgrid_core::{Notice, Record};

use crate::app::App;
use crate::theme::Theme;
use crate::view::{spinner_char, truncate};

/// Render the catalog table screen: header, table, paginator, footer.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Min(5),    // table
        Constraint::Length(1), // paginator
        Constraint::Length(1), // footer / status
    ])
    .split(f.area());

    render_header(f, chunks[0], app);
    render_table(f, chunks[1], app);
    render_paginator(f, chunks[2], app);
    render_footer(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![
        Span::styled(" artgrid ", theme.header_style()),
        Span::styled(
            format!(" {}", app.source_name),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  Selected rows: {}", app.controller.selected_count()),
            Style::default().fg(theme.checked),
        ),
    ];

    if app.controller.is_loading() {
        spans.push(Span::styled(
            format!("  {} Loading artworks", spinner_char(app.tick)),
            Style::default()
                .fg(theme.spinner)
                .add_modifier(Modifier::BOLD),
        ));
    }
    if app.controller.bulk_in_flight() {
        spans.push(Span::styled(
            format!("  {} Selecting rows", spinner_char(app.tick)),
            Style::default()
                .fg(theme.spinner)
                .add_modifier(Modifier::BOLD),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Header checkbox: all, some or none of the visible rows checked.
fn header_checkbox(app: &App) -> &'static str {
    let visible = app.controller.visible_records().len();
    let checked = app.controller.visible_selection().len();
    match checked {
        0 => "[ ]",
        n if n == visible => "[x]",
        _ => "[-]",
    }
}

fn dates(record: &Record) -> (String, String) {
    let fmt = |d: Option<i32>| d.map_or_else(|| "\u{2014}".to_string(), |y| y.to_string());
    (fmt(record.date_start), fmt(record.date_end))
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let wide = area.width >= 100;

    let mut header_cells = vec![header_checkbox(app), "Title", "Place of origin", "Artist"];
    if wide {
        header_cells.extend(["Inscriptions", "Start", "End"]);
    }
    let header = Row::new(header_cells.into_iter().map(|h| {
        Cell::from(h).style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
    }))
    .height(1);

    let title_width = if wide {
        (area.width as usize).saturating_sub(80)
    } else {
        (area.width as usize).saturating_sub(44)
    }
    .max(10);

    let rows: Vec<Row> = app
        .controller
        .visible_records()
        .iter()
        .map(|record| {
            let checked = app.controller.selection().contains(record.id);
            let mut cells = vec![
                Cell::from(if checked { "[x]" } else { "[ ]" }).style(theme.checkbox_style(checked)),
                Cell::from(truncate(&record.title, title_width)),
                Cell::from(record.place_of_origin.clone().unwrap_or_default())
                    .style(Style::default().fg(theme.dim)),
                Cell::from(
                    record
                        .artist_display
                        .as_deref()
                        .and_then(|a| a.lines().next())
                        .unwrap_or_default()
                        .to_string(),
                ),
            ];
            if wide {
                let (start, end) = dates(record);
                cells.push(
                    Cell::from(truncate(&record.inscriptions, 20))
                        .style(Style::default().fg(theme.dim)),
                );
                cells.push(Cell::from(start));
                cells.push(Cell::from(end));
            }
            Row::new(cells)
        })
        .collect();

    let widths = if wide {
        vec![
            Constraint::Length(3),  // checkbox
            Constraint::Min(10),    // Title
            Constraint::Length(16), // Place of origin
            Constraint::Length(24), // Artist
            Constraint::Length(20), // Inscriptions
            Constraint::Length(6),  // Start
            Constraint::Length(6),  // End
        ]
    } else {
        vec![
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(14),
            Constraint::Length(20),
        ]
    };

    let table = Table::new(rows, &widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(" Artworks "),
        )
        .row_highlight_style(theme.highlight_style());

    let mut state = TableState::default();
    if !app.controller.visible_records().is_empty() {
        state.select(Some(app.cursor));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn render_paginator(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let view = app.controller.view();

    let pages = app
        .controller
        .page_count()
        .map_or_else(|| "?".to_string(), |n| n.to_string());
    let range = if view.displayed.is_empty() {
        "no rows".to_string()
    } else {
        format!(
            "rows {}\u{2013}{}",
            view.offset + 1,
            view.offset + view.displayed.len()
        )
    };
    let total = view
        .total_records
        .map_or_else(String::new, |t| format!(" of {t}"));

    let mut spans = vec![
        Span::styled(
            format!(" Page {} of {pages} ", view.page),
            Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {range}{total} "), Style::default().fg(theme.text)),
        Span::styled(" Rows per page:", Style::default().fg(theme.dim)),
    ];
    for &size in &app.page_size_options {
        let style = if size == view.page_size {
            Style::default().fg(theme.active).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim)
        };
        spans.push(Span::styled(format!(" {size}"), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let line = match app.controller.notice() {
        Some(notice) => notice_line(notice, theme),
        None => Line::from(Span::styled(
            " Space:toggle  a:all  n:select first N  x:clear  \u{2190}/\u{2192}:page  p:page size  ?:help  q:quit",
            theme.footer_style(),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn notice_line<'a>(notice: &'a Notice, theme: &Theme) -> Line<'a> {
    let (text, color) = match notice {
        Notice::Info(msg) => (msg.as_str(), theme.checked),
        Notice::Error(msg) => (msg.as_str(), theme.error),
    };
    Line::from(vec![
        Span::styled(format!(" {text}"), Style::default().fg(color)),
        Span::styled("  (Esc to dismiss)", theme.footer_style()),
    ])
}
