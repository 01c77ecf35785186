use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::overlay::RowSelectorState;
use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the "select first N rows" input as a centered popup.
pub fn render(f: &mut Frame, state: &RowSelectorState, theme: &Theme) {
    let popup = centered_rect(52, 8, f.area());

    let error = state.error();
    let can_submit = state.parsed().is_ok();

    let button_style = if can_submit {
        Style::default()
            .fg(theme.header_fg)
            .bg(theme.active)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.dim)
    };

    let lines = vec![
        Line::from(Span::styled(
            "  Number of rows to select",
            Style::default().fg(theme.text),
        )),
        Line::from(vec![
            Span::styled("  > ", Style::default().fg(theme.active)),
            Span::styled(
                state.input.as_str(),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled("\u{2588}", Style::default().fg(theme.active)),
        ]),
        Line::from(Span::styled(
            format!("  {}", error.unwrap_or_default()),
            Style::default().fg(theme.error),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(format!(" {} ", state.submit_label()), button_style),
            Span::styled("  Enter: submit   Esc: cancel", Style::default().fg(theme.dim)),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.active))
            .title(" Select rows "),
    );

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
