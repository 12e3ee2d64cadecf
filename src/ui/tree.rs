use crate::app::App;
use crate::catalog::{CategoryRow, ViewMode};
use crate::util::{display_width, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Indentation plus the expand marker for one row.
pub(super) fn row_prefix(row: &CategoryRow) -> String {
    let indent = "  ".repeat(row.level);
    let icon = if row.has_children {
        if row.is_expanded {
            "v "
        } else {
            "> "
        }
    } else {
        "  "
    };
    format!("{}{}", indent, icon)
}

/// Render the category tree panel for the current page.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    // Two rows of border; the rest is one page
    app.page_size = usize::from(area.height - 2).max(1);
    app.clamp_selection();

    let page = app.visible_page();
    let offset = (page.page - 1) * app.page_size;
    let selected_on_page = app.selected.checked_sub(offset);
    let inner_width = usize::from(area.width - 2);

    let style_normal = Style::default();
    let style_inactive = Style::default().fg(Color::DarkGray);
    let style_selected = Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let items: Vec<ListItem> = page
        .items
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if Some(i) == selected_on_page {
                style_selected
            } else if row.status.is_empty() || row.is_active() {
                style_normal
            } else {
                style_inactive
            };

            let prefix = row_prefix(row);
            let title_width = inner_width.saturating_sub(display_width(&prefix));
            ListItem::new(Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(truncate_to_width(&row.title, title_width).into_owned(), style),
            ]))
        })
        .collect();

    let query = app.browser.query();
    let mode = match query.mode {
        ViewMode::Tree => "tree",
        ViewMode::Flat => "flat",
    };
    let title = format!(
        "Categories ({}, {} {}, status {}) page {}/{}",
        mode,
        query.sort_field.label(),
        query.direction.label(),
        query.status.label(),
        page.page,
        page.total_pages
    );

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default());

    let mut state = ListState::default().with_selected(selected_on_page);
    f.render_stateful_widget(list, area, &mut state);
}
