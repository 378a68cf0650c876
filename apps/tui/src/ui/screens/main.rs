use crate::app::state::{App, Focus};
use crate::ui::layout::AppLayout;
use crate::ui::widgets::map_canvas::render_map;
use crate::ui::widgets::popup::{centered_rect, ClearWidget};
use crate::ui::widgets::sidebar::{render_panel, render_tabs};
use crate::ui::widgets::toolbar::render_toolbar;
use grid_explorer::engine::MapEngine;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_main(app: &App, f: &mut Frame<'_>, layout: &AppLayout) {
    render_toolbar(f, layout.toolbar, app.store.drawn_features_count());
    render_tabs(app, f, layout.tabs);
    render_panel(app, f, layout.panel);
    render_map(app, f, layout);
    render_status_line(app, f, layout.status);

    if app.show_help {
        let area = f.area();
        render_help_popup(f, area);
    }
}

fn key_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

/// Right-hand side of the status line: focus, tool, zoom and hover state.
pub fn status_hint(app: &App) -> String {
    let focus = match app.focus {
        Focus::Map => "Map",
        Focus::Sidebar => "Sidebar",
    };
    let mut hint = format!("{focus} | {}", app.store.draw_mode().label());
    if let Some(engine) = app.map.engine() {
        hint.push_str(&format!(" | z{:.1}", engine.camera().zoom));
    }
    if app.hovering {
        hint.push_str(" | click for details");
    }
    hint
}

fn render_status_line(app: &App, f: &mut Frame<'_>, area: Rect) {
    let message_style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };

    let left = Paragraph::new(TextLine::from(vec![
        Span::styled(format!(" {}", app.status_message), message_style),
        Span::styled("  ", Style::default()),
        Span::styled("?", key_style()),
        Span::styled(": Help ", Style::default().fg(Color::Gray)),
        Span::styled("q", key_style()),
        Span::styled(": Quit", Style::default().fg(Color::Gray)),
    ]));
    f.render_widget(left, area);

    let right = Paragraph::new(Span::styled(
        format!("{} ", status_hint(app)),
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Right);
    f.render_widget(right, area);
}

fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(80, 80, area);
    f.render_widget(ClearWidget, popup_area);

    let help_block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(help_block)
        .wrap(Wrap { trim: true });

    f.render_widget(help_paragraph, popup_area);

    let hint = Paragraph::new(Text::from(TextLine::from(vec![Span::styled(
        "Press ? or Esc to close",
        Style::default().fg(Color::Gray),
    )])))
    .alignment(Alignment::Center);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };

    f.render_widget(hint, hint_area);
}

fn shortcut(key: &'static str, text: &'static str) -> TextLine<'static> {
    TextLine::from(vec![
        Span::styled(format!("  {key:<10}"), key_style()),
        Span::styled(format!(" - {text}"), Style::default()),
    ])
}

fn heading(text: &'static str) -> TextLine<'static> {
    TextLine::from(vec![Span::styled(
        text,
        Style::default().add_modifier(Modifier::BOLD),
    )])
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let mut lines = vec![
        TextLine::from(vec![Span::styled(
            "Energy Grid Explorer",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        TextLine::from(""),
        TextLine::from(
            "Browse the European high-voltage transmission grid, restyle it by attribute and sketch new infrastructure.",
        ),
        TextLine::from(""),
        heading("Global:"),
        shortcut("?, F1", "Toggle this help popup"),
        shortcut("Tab", "Switch focus between sidebar and map"),
        shortcut("1 2 3", "Open the Layers, Style or Draw panel"),
        shortcut("q", "Quit application"),
        TextLine::from(""),
        heading("Sidebar:"),
        shortcut("Up/Down", "Move the selection"),
        shortcut("Enter", "Toggle or pick the selected row"),
        shortcut("Left/Right", "Change color mode or line width"),
        shortcut("Esc", "Back to the map"),
        TextLine::from(""),
        heading("Map:"),
        shortcut("Arrows", "Pan"),
        shortcut("+ / -", "Zoom in / out"),
        shortcut("Enter", "Click at the crosshair (twice to double-click)"),
        shortcut("Esc", "Cancel drawing or close the info panel"),
        shortcut("Delete", "Remove the selected drawn feature"),
        shortcut("x", "Remove the selected vertex"),
        shortcut("Mouse", "Click, drag to pan, wheel to zoom"),
        TextLine::from(""),
        heading("CLI Options:"),
    ];

    let help_text = crate::cli::CliArgs::help_text();
    for line in help_text.lines() {
        if line.starts_with("Usage") || line.starts_with("Options") || line.trim().is_empty() {
            continue;
        }
        lines.push(TextLine::from(line.to_string()));
    }

    lines
}
