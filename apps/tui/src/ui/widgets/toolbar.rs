use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// `N drawn feature(s)`, or nothing while the count is zero.
pub fn drawn_features_label(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 drawn feature".to_string()),
        n => Some(format!("{n} drawn features")),
    }
}

pub fn render_toolbar(f: &mut Frame<'_>, area: Rect, drawn_features: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(24)])
        .split(inner);

    let brand = Paragraph::new(TextLine::from(vec![
        Span::styled("⚡ ", Style::default().fg(Color::Yellow)),
        Span::styled(
            "Energy Grid Explorer",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  European HV Network", Style::default().fg(Color::Gray)),
    ]));
    f.render_widget(brand, columns[0]);

    if let Some(label) = drawn_features_label(drawn_features) {
        let stat = Paragraph::new(Span::styled(label, Style::default().fg(Color::Magenta)))
            .alignment(Alignment::Right);
        f.render_widget(stat, columns[1]);
    }
}
