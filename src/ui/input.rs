//! Keyboard input handling for the browser.

use crate::app::{App, AppEvent};
use crate::util::MAX_KEYWORD_LENGTH;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::spawn_reload;
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(Action::Quit);
    }

    if app.search_mode {
        handle_search_input(app, code);
        return Ok(Action::Continue);
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('e') => app.expand_all(),
        KeyCode::Char('c') => app.collapse_all(),
        KeyCode::Char('/') => enter_search_mode(app),
        KeyCode::Char('s') => app.cycle_status_filter(),
        KeyCode::Char('o') => app.cycle_sort_field(),
        KeyCode::Char('r') => app.reverse_direction(),
        KeyCode::Char('t') => app.toggle_mode(),
        KeyCode::Char('n') | KeyCode::PageDown => app.next_page(),
        KeyCode::Char('p') | KeyCode::PageUp => app.prev_page(),
        KeyCode::Char('R') | KeyCode::F(5) => spawn_reload(app, event_tx),
        _ => {}
    }

    Ok(Action::Continue)
}

fn enter_search_mode(app: &mut App) {
    app.search_mode = true;
    app.search_previous = app.browser.query().keyword.clone();
    app.search_input = app.search_previous.clone();
}

/// Typing filters live; Enter keeps the keyword, Esc restores the previous one.
fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.search_mode = false;
            let previous = std::mem::take(&mut app.search_previous);
            app.search_input.clear();
            app.apply_keyword(&previous);
        }
        KeyCode::Enter => {
            app.search_mode = false;
            app.search_previous.clear();
            let keyword = std::mem::take(&mut app.search_input);
            let matches = app.row_count();
            if keyword.trim().is_empty() {
                app.set_status("Filter cleared");
            } else {
                app.set_status(format!("{} rows match '{}'", matches, keyword.trim()));
            }
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            let keyword = app.search_input.clone();
            app.apply_keyword(&keyword);
        }
        KeyCode::Char(c) => {
            if app.search_input.len() + c.len_utf8() > MAX_KEYWORD_LENGTH {
                app.set_status(format!(
                    "Search keyword too long (max {} bytes)",
                    MAX_KEYWORD_LENGTH
                ));
                return;
            }
            app.search_input.push(c);
            let keyword = app.search_input.clone();
            app.apply_keyword(&keyword);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CategoryBrowser, CategoryRecord};

    fn test_app() -> App {
        App::new(CategoryBrowser::new(vec![
            CategoryRecord::new("1", "Shoes"),
            CategoryRecord::new("2", "Sneakers").with_parent("Shoes"),
            CategoryRecord::new("3", "Boots").with_parent("Shoes"),
            CategoryRecord::new("4", "Hats"),
        ]))
    }

    fn press(app: &mut App, code: KeyCode) -> Action {
        let (tx, _rx) = mpsc::channel(4);
        handle_input(app, code, KeyModifiers::NONE, &tx).unwrap()
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        assert!(matches!(press(&mut app, KeyCode::Char('q')), Action::Quit));
        assert!(matches!(press(&mut app, KeyCode::Esc), Action::Quit));

        let (tx, _rx) = mpsc::channel(4);
        let action = handle_input(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &tx).unwrap();
        assert!(matches!(action, Action::Quit));
    }

    #[test]
    fn test_navigation_and_toggle() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('j')); // Shoes (Hats sorts first)
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.row_count(), 4);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.row_count(), 2);
    }

    #[test]
    fn test_expand_and_collapse_all() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.row_count(), 4);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.row_count(), 2);
    }

    #[test]
    fn test_search_filters_live_and_confirms() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('/'));
        assert!(app.search_mode);

        // 'q' is text while searching, not quit
        type_str(&mut app, "hat");
        assert!(matches!(press(&mut app, KeyCode::Char('q')), Action::Continue));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.browser.query().keyword, "hat");
        assert_eq!(app.row_count(), 1);

        press(&mut app, KeyCode::Enter);
        assert!(!app.search_mode);
        assert_eq!(app.browser.query().keyword, "hat");
    }

    #[test]
    fn test_search_escape_restores_previous_keyword() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "boot");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "zzz");
        assert_eq!(app.row_count(), 0);
        press(&mut app, KeyCode::Esc);

        assert!(!app.search_mode);
        assert_eq!(app.browser.query().keyword, "boot");
    }

    #[test]
    fn test_search_length_limit() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, &"a".repeat(MAX_KEYWORD_LENGTH + 5));
        assert_eq!(app.search_input.len(), MAX_KEYWORD_LENGTH);
    }

    #[test]
    fn test_query_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('t'));
        press(&mut app, KeyCode::Char('r'));
        let titles: Vec<String> = app
            .browser
            .rows()
            .unwrap()
            .iter()
            .map(|r| r.title.clone())
            .collect();
        assert_eq!(titles, vec!["Sneakers", "Shoes", "Hats", "Boots"]);

        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('s'));
        let query = app.browser.query();
        assert_eq!(query.sort_field.label(), "status");
        assert_eq!(query.status.label(), "active");
    }
}
