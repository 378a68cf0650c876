use crate::ui::layout::popup_close_rect;
use grid_explorer::domain::{PopupInfo, PopupProperties};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::Buffer;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use ratatui::Frame;

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);

    horizontal_layout[1]
}

pub struct ClearWidget;

impl Widget for ClearWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
    }
}

fn row(label: &'static str, value: String) -> TextLine<'static> {
    TextLine::from(vec![
        Span::styled(format!("{label:<10}"), Style::default().fg(Color::Gray)),
        Span::styled(
            value,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Body of the feature info panel, one entry per row.
pub fn popup_lines(info: &PopupInfo) -> Vec<TextLine<'static>> {
    let kind = TextLine::from(Span::styled(
        info.kind().label().to_uppercase(),
        Style::default().fg(Color::Cyan),
    ));
    let mut lines = vec![kind];

    match &info.properties {
        PopupProperties::Substation(props) => {
            lines.push(TextLine::from(Span::styled(
                props.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(row("Voltage", format!("{} kV", props.voltage_kv)));
            if let Some(country) = &props.country {
                lines.push(row("Country", country.clone()));
            }
        }
        PopupProperties::Line(props) => {
            if let Some(name) = &props.name {
                lines.push(TextLine::from(Span::styled(
                    name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            }
            lines.push(row("Voltage", format!("{} kV", props.voltage_kv)));
            if let Some(capacity) = props.capacity_mw {
                lines.push(row("Capacity", format!("{capacity} MW")));
            }
            if let Some(length) = props.length_km {
                lines.push(row("Length", format!("{length:.1} km")));
            }
        }
    }
    lines
}

/// Rows including borders.
pub fn popup_height(info: &PopupInfo) -> u16 {
    u16::try_from(popup_lines(info).len()).map_or(u16::MAX, |rows| rows.saturating_add(2))
}

pub fn render_feature_popup(f: &mut Frame<'_>, area: Rect, info: &PopupInfo) {
    f.render_widget(ClearWidget, area);

    let body = Paragraph::new(Text::from(popup_lines(info))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .style(Style::default().bg(Color::Black)),
    );
    f.render_widget(body, area);

    let close = Paragraph::new(Span::styled(
        "[x]",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ));
    f.render_widget(close, popup_close_rect(area));
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_explorer::domain::{LngLat, SubstationProperties, TransmissionLineProperties};

    fn text(lines: &[TextLine<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn substation_shows_name_voltage_and_country() {
        let info = PopupInfo {
            lng_lat: LngLat::new(8.0, 50.0),
            properties: PopupProperties::Substation(SubstationProperties {
                id: "s1".to_string(),
                name: "Grohnde".to_string(),
                voltage_kv: 380.0,
                country: Some("DE".to_string()),
                operator: None,
            }),
        };
        let rows = text(&popup_lines(&info));
        assert_eq!(rows[0], "SUBSTATION");
        assert_eq!(rows[1], "Grohnde");
        assert!(rows[2].contains("380 kV"));
        assert!(rows[3].contains("DE"));
        assert_eq!(popup_height(&info), 6);
    }

    #[test]
    fn line_without_optional_fields_is_short() {
        let info = PopupInfo {
            lng_lat: LngLat::new(8.0, 50.0),
            properties: PopupProperties::Line(TransmissionLineProperties {
                voltage_kv: 220.0,
                ..Default::default()
            }),
        };
        let rows = text(&popup_lines(&info));
        assert_eq!(rows, vec!["TRANSMISSION LINE".to_string(), "Voltage   220 kV".to_string()]);
        assert_eq!(popup_height(&info), 4);
    }
}
