use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

const HINTS: &str =
    "[j/k]move [Enter]toggle [e/c]expand/collapse [/]search [s]tatus [o]rder [r]everse [t]ree/flat [n/p]age [R]eload [q]uit";

/// Text shown in the status bar, highest priority first: search prompt,
/// view error, transient message, last failure, breadcrumb, key hints.
pub(super) fn status_text(app: &mut App) -> (Cow<'static, str>, bool) {
    if app.search_mode {
        return (
            Cow::Owned(format!("/{}  (ENTER confirm, ESC cancel)", app.search_input)),
            false,
        );
    }
    if let Some(error) = &app.view_error {
        return (Cow::Owned(format!("Error: {}", error)), true);
    }
    if let Some((msg, _)) = &app.status_message {
        return (msg.clone(), false);
    }
    if let Some(error) = &app.last_error {
        return (Cow::Owned(format!("Error: {}", error)), true);
    }
    match app.selected_breadcrumb() {
        Some(Ok(path)) => (Cow::Owned(path), false),
        Some(Err(error)) => (Cow::Owned(format!("Error: {}", error)), true),
        None => (Cow::Borrowed(HINTS), false),
    }
}

/// Render the status bar
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let (text, is_error) = status_text(app);
    let style = if is_error {
        Style::default().bg(Color::Red).fg(Color::White)
    } else {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CategoryBrowser, CategoryRecord};

    fn test_app() -> App {
        App::new(CategoryBrowser::new(vec![
            CategoryRecord::new("1", "Shoes"),
            CategoryRecord::new("2", "Boots").with_parent("Shoes"),
            CategoryRecord::new("3", "Loop A").with_parent("Loop B"),
            CategoryRecord::new("4", "Loop B").with_parent("Loop A"),
        ]))
    }

    #[test]
    fn test_breadcrumb_shown_for_selection() {
        let mut app = test_app();
        app.expand_all();
        app.status_message = None;
        // Rows: Loop A, Loop B, Shoes, Boots
        app.selected = 3;
        assert_eq!(status_text(&mut app), (Cow::Borrowed("Shoes > Boots"), false));
    }

    #[test]
    fn test_cycle_breadcrumb_is_error() {
        let mut app = test_app();
        app.selected = 0;
        let (text, is_error) = status_text(&mut app);
        assert!(is_error);
        assert!(text.contains("Cyclic"));
    }

    #[test]
    fn test_hints_when_empty() {
        let mut app = App::new(CategoryBrowser::default());
        assert_eq!(status_text(&mut app).0, HINTS);
    }

    #[test]
    fn test_status_message_wins_over_breadcrumb() {
        let mut app = test_app();
        app.selected = 2;
        app.set_status("Loaded 4 categories");
        assert_eq!(status_text(&mut app).0, "Loaded 4 categories");
    }

    #[test]
    fn test_search_prompt() {
        let mut app = test_app();
        app.search_mode = true;
        app.search_input = "bo".to_string();
        assert!(status_text(&mut app).0.starts_with("/bo"));
    }
}
