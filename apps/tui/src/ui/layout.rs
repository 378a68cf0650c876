use grid_explorer::domain::SidebarTab;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

const SIDEBAR_WIDTH: u16 = 34;
pub const POPUP_WIDTH: u16 = 30;
const CLOSE_LABEL_WIDTH: u16 = 3;

/// Screen regions shared by rendering and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub toolbar: Rect,
    pub tabs: Rect,
    pub panel: Rect,
    pub map_block: Rect,
    /// Drawable map area inside the border.
    pub map: Rect,
    pub status: Rect,
}

pub fn compute(area: Rect) -> AppLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Toolbar
            Constraint::Min(5),    // Sidebar and map
            Constraint::Length(1), // Status line
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
        .split(rows[1]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(body[0]);

    let map_block = body[1];
    AppLayout {
        toolbar: rows[0],
        tabs: sidebar[0],
        panel: sidebar[1],
        map_block,
        map: inner(map_block),
        status: rows[2],
    }
}

fn inner(area: Rect) -> Rect {
    Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    )
}

/// Cell ranges of the tab titles, in order, as the tab bar renders them:
/// ` Layers | Style | Draw `.
pub fn tab_spans(tabs: Rect) -> Vec<(SidebarTab, u16, u16)> {
    let mut x = tabs.x.saturating_add(1);
    SidebarTab::ALL
        .iter()
        .map(|tab| {
            // One space of padding on either side of each title.
            let width = tab.label().len() as u16 + 2;
            let span = (*tab, x, x + width);
            x += width + 1;
            span
        })
        .collect()
}

pub fn tab_at(tabs: Rect, column: u16, row: u16) -> Option<SidebarTab> {
    if row != tabs.y + 1 {
        return None;
    }
    tab_spans(tabs)
        .into_iter()
        .find(|(_, start, end)| column >= *start && column < *end)
        .map(|(tab, _, _)| tab)
}

/// Places a popup of `height` rows next to `anchor`, kept inside `map`.
pub fn popup_rect(map: Rect, anchor: (u16, u16), height: u16) -> Rect {
    let width = POPUP_WIDTH.min(map.width);
    let height = height.min(map.height);
    let (column, row) = anchor;

    let x = column
        .saturating_add(1)
        .min(map.right().saturating_sub(width))
        .max(map.x);
    let y = row
        .saturating_sub(height)
        .min(map.bottom().saturating_sub(height))
        .max(map.y);
    Rect::new(x, y, width, height)
}

/// The `[x]` in the popup's top border.
pub fn popup_close_rect(popup: Rect) -> Rect {
    let width = CLOSE_LABEL_WIDTH.min(popup.width);
    Rect::new(
        popup.right().saturating_sub(width + 1).max(popup.x),
        popup.y,
        width,
        1,
    )
}

pub const fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_tile_the_screen() {
        let layout = compute(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.toolbar.height, 3);
        assert_eq!(layout.status.y, 39);
        assert_eq!(layout.tabs.width, SIDEBAR_WIDTH);
        assert_eq!(layout.map_block.x, SIDEBAR_WIDTH);
        assert_eq!(layout.map, Rect::new(35, 4, 84, 34));
    }

    #[test]
    fn tab_titles_are_clickable() {
        let tabs = Rect::new(0, 3, 34, 3);
        assert_eq!(tab_at(tabs, 2, 4), Some(SidebarTab::Layers));
        assert_eq!(tab_at(tabs, 11, 4), Some(SidebarTab::Style));
        assert_eq!(tab_at(tabs, 18, 4), Some(SidebarTab::Draw));
        assert_eq!(tab_at(tabs, 2, 3), None);
        assert_eq!(tab_at(tabs, 30, 4), None);
    }

    #[test]
    fn popup_stays_inside_the_map() {
        let map = Rect::new(35, 4, 84, 34);
        let popup = popup_rect(map, (117, 5), 6);
        assert!(popup.right() <= map.right());
        assert!(popup.y >= map.y);
        assert_eq!(popup.height, 6);

        let close = popup_close_rect(popup);
        assert_eq!(close.y, popup.y);
        assert!(contains(popup, close.x, close.y));
    }
}
