use crate::app::state::{App, Focus, StyleRow};
use grid_explorer::domain::{DrawMode, LayerKey, SidebarTab};
use grid_explorer::store::{StyleState, LINE_WIDTH_STEP, MAX_LINE_WIDTH, MIN_LINE_WIDTH};
use grid_explorer::style::legend::{layer_swatch, legend_entries, legend_title};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const SWATCH: &str = "■";

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn row_style(selected: bool, focused: bool) -> Style {
    if selected && focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    }
}

fn prefix(selected: bool) -> &'static str {
    if selected {
        ">"
    } else {
        " "
    }
}

fn toggle(on: bool) -> Span<'static> {
    if on {
        Span::styled("[on] ", Style::default().fg(Color::Green))
    } else {
        Span::styled("[off]", Style::default().fg(Color::DarkGray))
    }
}

fn description(text: &'static str) -> TextLine<'static> {
    TextLine::from(Span::styled(text, Style::default().fg(Color::Gray)))
}

pub fn render_tabs(app: &App, f: &mut Frame<'_>, area: Rect) {
    let active = app.store.active_tab();
    let mut spans = Vec::new();
    for (index, tab) in SidebarTab::ALL.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled("|", Style::default().fg(Color::DarkGray)));
        }
        let style = if *tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", tab.label()), style));
    }

    let tabs = Paragraph::new(TextLine::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(app.focus == Focus::Sidebar)),
    );
    f.render_widget(tabs, area);
}

pub fn render_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    let tab = app.store.active_tab();
    let lines = match tab {
        SidebarTab::Layers => layers_lines(app),
        SidebarTab::Style => style_lines(app),
        SidebarTab::Draw => draw_lines(app),
    };

    let panel = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(format!(" {} ", tab.label()))
                .title_style(Style::default().fg(Color::Cyan))
                .borders(Borders::ALL)
                .border_style(border_style(app.focus == Focus::Sidebar)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(panel, area);
}

fn layers_lines(app: &App) -> Vec<TextLine<'static>> {
    let focused = app.focus == Focus::Sidebar;
    let visibility = app.store.layer_visibility();

    let mut lines = vec![
        description("Toggle visibility of each voltage tier independently."),
        TextLine::from(""),
    ];
    for (index, key) in LayerKey::ALL.iter().enumerate() {
        let selected = index == app.layer_selection_index;
        lines.push(TextLine::from(vec![
            Span::styled(format!("{} ", prefix(selected)), row_style(selected, focused)),
            Span::styled(SWATCH, Style::default().fg(Color::from(layer_swatch(*key)))),
            Span::styled(format!(" {:<16}", key.label()), row_style(selected, focused)),
            toggle(visibility.get(*key)),
        ]));
    }
    lines
}

/// `1px ───●──── 5px` with the knob at the current width.
pub fn width_slider(width: f64) -> String {
    let stops = ((MAX_LINE_WIDTH - MIN_LINE_WIDTH) / LINE_WIDTH_STEP).round() as usize;
    let knob = (((width - MIN_LINE_WIDTH) / LINE_WIDTH_STEP).round().max(0.0) as usize).min(stops);
    format!(
        "{MIN_LINE_WIDTH}px {}●{} {MAX_LINE_WIDTH}px",
        "─".repeat(knob),
        "─".repeat(stops - knob)
    )
}

fn style_lines(app: &App) -> Vec<TextLine<'static>> {
    let focused = app.focus == Focus::Sidebar;
    let style: &StyleState = app.store.style();

    let mut lines = vec![
        description("Dynamically restyle the grid layers by attribute."),
        TextLine::from(""),
    ];
    for (index, row) in StyleRow::ALL.iter().enumerate() {
        let selected = index == app.style_selection_index;
        let label = match row {
            StyleRow::ColorBy => format!("Color by    < {} >", style.color_by.label()),
            StyleRow::LineWidth => format!("Line width  {}px", style.line_width),
            StyleRow::ShowLabels => "Show labels ".to_string(),
        };
        let mut spans = vec![Span::styled(
            format!("{} {label}", prefix(selected)),
            row_style(selected, focused),
        )];
        if *row == StyleRow::ShowLabels {
            spans.push(toggle(style.show_labels));
        }
        lines.push(TextLine::from(spans));
        if *row == StyleRow::LineWidth {
            lines.push(TextLine::from(Span::styled(
                format!("  {}", width_slider(style.line_width)),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        legend_title(style.color_by),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for entry in legend_entries(style.color_by) {
        lines.push(TextLine::from(vec![
            Span::styled(format!("  {SWATCH} "), Style::default().fg(Color::from(entry.color))),
            Span::raw(entry.label),
        ]));
    }
    lines
}

fn draw_lines(app: &App) -> Vec<TextLine<'static>> {
    let focused = app.focus == Focus::Sidebar;
    let active = app.store.draw_mode();

    let mut lines = vec![
        description("Draw new infrastructure. Double-click to finish a line."),
        TextLine::from(""),
    ];
    for (index, mode) in DrawMode::ALL.iter().enumerate() {
        let selected = index == app.draw_selection_index;
        let marker = if *mode == active { "●" } else { "○" };
        lines.push(TextLine::from(Span::styled(
            format!("{} {marker} {}", prefix(selected), mode.label()),
            row_style(selected, focused),
        )));
        lines.push(TextLine::from(Span::styled(
            format!("    {}", mode.description()),
            Style::default().fg(Color::Gray),
        )));
    }

    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    lines.extend([
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Keyboard shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        TextLine::from(vec![
            Span::styled("  Esc    ", key_style),
            Span::raw("Cancel drawing"),
        ]),
        TextLine::from(vec![
            Span::styled("  Delete ", key_style),
            Span::raw("Remove selected"),
        ]),
    ]);
    lines
}
