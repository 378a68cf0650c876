use crate::app::state::{App, Focus};
use crate::ui::layout::AppLayout;
use crate::ui::widgets::popup::{popup_height, render_feature_popup};
use grid_explorer::engine::controls::{nav_control_rect, nav_label, scale_bar, ScaleBar};
use grid_explorer::engine::{Scene, Shape};
use grid_explorer::style::palette::BASEMAP_LAND;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Map, Points};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

pub fn render_map(app: &App, f: &mut Frame<'_>, layout: &AppLayout) {
    let border = if app.focus == Focus::Map {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(" Map ")
        .title_style(Style::default().fg(Color::Cyan))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    f.render_widget(block, layout.map_block);

    let area = layout.map;
    if area.width < 4 || area.height < 2 {
        return;
    }

    let Some(engine) = app.map.engine() else {
        let paragraph = Paragraph::new("Map unavailable")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, area);
        return;
    };

    render_scene(f, area, &engine.scene());

    if app.focus == Focus::Map {
        let center = Rect::new(area.x + area.width / 2, area.y + area.height / 2, 1, 1);
        f.render_widget(
            Paragraph::new(Span::styled("+", Style::default().fg(Color::Yellow))),
            center,
        );
    }

    let options = engine.options();
    if options.navigation_control {
        f.render_widget(
            Paragraph::new(Span::styled(
                nav_label(),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )),
            nav_control_rect(area),
        );
    }
    if options.scale_control {
        if let Some(bar) = scale_bar(engine.viewport()) {
            render_scale_bar(f, area, &bar);
        }
    }

    if let Some(info) = app.store.popup() {
        if let Some(popup) = app.popup_area(popup_height(info)) {
            render_feature_popup(f, popup, info);
        }
    }
}

fn render_scene(f: &mut Frame<'_>, area: Rect, scene: &Scene) {
    let bounds = scene.bounds;
    f.render_widget(
        Canvas::default()
            .background_color(scene.background.into())
            .marker(Marker::Braille)
            .paint(|ctx| {
                if let Some(resolution) = scene.basemap {
                    ctx.draw(&Map {
                        resolution,
                        color: BASEMAP_LAND.into(),
                    });
                    ctx.layer();
                }

                for shape in &scene.shapes {
                    match shape {
                        Shape::Segment { from, to, color } => ctx.draw(&CanvasLine {
                            x1: from.0,
                            y1: from.1,
                            x2: to.0,
                            y2: to.1,
                            color: (*color).into(),
                        }),
                        Shape::Dots { coords, color } => ctx.draw(&Points {
                            coords,
                            color: (*color).into(),
                        }),
                        Shape::Label { .. } => {}
                    }
                }

                // Text goes last so strokes never cover it.
                for shape in &scene.shapes {
                    if let Shape::Label { at, text, color } = shape {
                        let style = Style::default().fg(Color::from(*color));
                        ctx.print(at.0, at.1, Span::styled(text.clone(), style));
                    }
                }
            })
            .x_bounds([bounds.west, bounds.east])
            .y_bounds([bounds.south, bounds.north]),
        area,
    );
}

/// `├──────┤ 200 km` in the bottom-left corner of the map.
pub fn scale_text(bar: &ScaleBar) -> String {
    let inner = usize::from(bar.width_cells.saturating_sub(2));
    format!("├{}┤ {}", "─".repeat(inner), bar.label)
}

fn render_scale_bar(f: &mut Frame<'_>, area: Rect, bar: &ScaleBar) {
    let text = scale_text(bar);
    let width = u16::try_from(text.chars().count())
        .unwrap_or(u16::MAX)
        .min(area.width.saturating_sub(1));
    let rect = Rect::new(area.x + 1, area.bottom() - 1, width, 1);
    f.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(Color::Gray))),
        rect,
    );
}
