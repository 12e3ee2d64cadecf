use crate::catalog::{
    paginate, CategoryBrowser, CategoryId, CategoryRecord, CategoryRow, Page, ViewMode,
};
use crate::source::RecordSource;
use crate::util::ImageResolver;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::time::Instant;

/// Rows per page before the first render measures the terminal.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Separator between breadcrumb titles.
pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// Seconds a transient status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

/// Completion events sent by background tasks to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// A reload finished. Errors are pre-rendered so the event stays `Send`-cheap.
    SnapshotLoaded(Result<Vec<CategoryRecord>, String>),
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

/// Terminal browser state.
///
/// `selected` indexes the full row list; the visible page is derived from it
/// so paging and cursor movement never disagree.
pub struct App {
    pub browser: CategoryBrowser,
    pub source: Option<Arc<RecordSource>>,
    pub images: ImageResolver,
    pub thumbnail_size: u32,

    pub selected: usize,
    /// Updated from the list height on every render.
    pub page_size: usize,

    pub search_mode: bool,
    pub search_input: String,
    /// Keyword to restore when a search is cancelled.
    pub search_previous: String,

    pub loading: bool,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    /// Why the current query cannot be projected (strict title mode).
    pub view_error: Option<String>,
    /// Last reload or task failure, cleared by the next successful reload.
    pub last_error: Option<String>,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(browser: CategoryBrowser) -> Self {
        Self {
            browser,
            source: None,
            images: ImageResolver::default(),
            thumbnail_size: 48,
            selected: 0,
            page_size: DEFAULT_PAGE_SIZE,
            search_mode: false,
            search_input: String::new(),
            search_previous: String::new(),
            loading: false,
            status_message: None,
            view_error: None,
            last_error: None,
            needs_redraw: true,
        }
    }

    pub fn with_source(mut self, source: RecordSource) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn with_images(mut self, images: ImageResolver, thumbnail_size: u32) -> Self {
        self.images = images;
        self.thumbnail_size = thumbnail_size;
        self
    }

    // ------------------------------------------------------------------------
    // Rows and selection
    // ------------------------------------------------------------------------

    /// Number of rows in the current projection. Build errors are reported
    /// and count as an empty view.
    pub fn row_count(&mut self) -> usize {
        let result = self.browser.rows().map(<[CategoryRow]>::len);
        match result {
            Ok(len) => {
                self.view_error = None;
                len
            }
            Err(e) => {
                self.set_view_error(e.to_string());
                0
            }
        }
    }

    /// 1-based page containing the selection.
    pub fn current_page(&self) -> usize {
        self.selected / self.page_size.max(1) + 1
    }

    pub fn visible_page(&mut self) -> Page<CategoryRow> {
        let page = self.current_page();
        let result = self.browser.page(page, self.page_size);
        match result {
            Ok(page) => {
                self.view_error = None;
                page
            }
            Err(e) => {
                self.set_view_error(e.to_string());
                paginate(&[], 1, self.page_size)
            }
        }
    }

    pub fn selected_row(&mut self) -> Option<CategoryRow> {
        let idx = self.selected;
        self.browser.rows().ok().and_then(|rows| rows.get(idx).cloned())
    }

    pub fn selected_record(&mut self) -> Option<CategoryRecord> {
        let row = self.selected_row()?;
        self.browser.records().iter().find(|r| r.id == row.id).cloned()
    }

    pub fn nav_down(&mut self) {
        if self.selected + 1 < self.row_count() {
            self.selected += 1;
        }
    }

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Jump to the first row of the next page, if there is one.
    pub fn next_page(&mut self) {
        let next = self.current_page() * self.page_size.max(1);
        if next < self.row_count() {
            self.selected = next;
        }
    }

    pub fn prev_page(&mut self) {
        let page = self.current_page();
        if page > 1 {
            self.selected = (page - 2) * self.page_size.max(1);
        }
    }

    pub fn clamp_selection(&mut self) {
        let count = self.row_count();
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    /// Run `change`, then keep the cursor on the same category when it is
    /// still visible.
    fn preserving_selection(&mut self, change: impl FnOnce(&mut Self)) {
        let selected_id = self.selected_row().map(|row| row.id);
        change(self);
        self.reselect(selected_id);
    }

    fn reselect(&mut self, id: Option<CategoryId>) {
        let found = id.and_then(|id| {
            self.browser
                .rows()
                .ok()
                .and_then(|rows| rows.iter().position(|row| row.id == id))
        });
        match found {
            Some(idx) => self.selected = idx,
            None => self.clamp_selection(),
        }
    }

    // ------------------------------------------------------------------------
    // Expand state
    // ------------------------------------------------------------------------

    /// Toggle the selected node. Rows before it never move, so the cursor stays put.
    pub fn toggle_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if self.browser.query().mode == ViewMode::Flat {
            self.set_status("Flat view: press t for the tree");
            return;
        }
        if !row.has_children {
            self.set_status(format!("'{}' has no subcategories", row.title));
            return;
        }
        let expanded = self.browser.toggle(&row.id);
        tracing::debug!(id = %row.id, expanded, "Toggled category");
    }

    pub fn expand_all(&mut self) {
        let mut outcome = Ok(0);
        self.preserving_selection(|app| outcome = app.browser.expand_all());
        match outcome {
            Ok(count) => self.set_status(format!("Expanded {} categories", count)),
            Err(e) => self.set_view_error(e.to_string()),
        }
    }

    pub fn collapse_all(&mut self) {
        self.preserving_selection(|app| app.browser.collapse_all());
        self.set_status("Collapsed all categories");
    }

    // ------------------------------------------------------------------------
    // Query
    // ------------------------------------------------------------------------

    pub fn apply_keyword(&mut self, keyword: &str) {
        self.preserving_selection(|app| app.browser.set_keyword(keyword));
    }

    pub fn cycle_status_filter(&mut self) {
        let next = self.browser.query().status.cycle();
        self.preserving_selection(|app| app.browser.set_status(next));
        self.set_status(format!("Status: {}", next.label()));
    }

    pub fn cycle_sort_field(&mut self) {
        let query = self.browser.query();
        let (field, direction) = (query.sort_field.cycle(), query.direction);
        self.preserving_selection(|app| app.browser.set_sort(field, direction));
        self.set_status(format!("Sort: {} {}", field.label(), direction.label()));
    }

    pub fn reverse_direction(&mut self) {
        let query = self.browser.query();
        let (field, direction) = (query.sort_field, query.direction.reversed());
        self.preserving_selection(|app| app.browser.set_sort(field, direction));
        self.set_status(format!("Sort: {} {}", field.label(), direction.label()));
    }

    pub fn toggle_mode(&mut self) {
        let mode = self.browser.query().mode.toggled();
        self.preserving_selection(|app| app.browser.set_mode(mode));
        self.set_status(match mode {
            ViewMode::Tree => "Tree view",
            ViewMode::Flat => "Flat view",
        });
    }

    // ------------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------------

    /// Swap in reloaded records, keeping expand state and the cursor's category.
    pub fn replace_snapshot(&mut self, records: Vec<CategoryRecord>) {
        let count = records.len();
        self.preserving_selection(|app| app.browser.replace_snapshot(records));
        self.last_error = None;
        self.set_status(format!("Loaded {} categories", count));
    }

    /// Titles from the root down to the selection, or the walk's error.
    pub fn selected_breadcrumb(&mut self) -> Option<Result<String, String>> {
        let row = self.selected_row()?;
        Some(
            self.browser
                .breadcrumb(&row.id)
                .map(|titles| titles.join(BREADCRUMB_SEPARATOR))
                .map_err(|e| e.to_string()),
        )
    }

    /// Display URL for the selected thumbnail, falling back to the placeholder.
    pub fn selected_thumbnail(&mut self) -> Option<String> {
        let row = self.selected_row()?;
        Some(
            self.images
                .resolve(row.thumbnail_ref.as_deref(), self.thumbnail_size),
        )
    }

    // ------------------------------------------------------------------------
    // Status line
    // ------------------------------------------------------------------------

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired (older than 3 seconds).
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    pub fn report_error(&mut self, error: String) {
        tracing::warn!(error = %error, "Category browser error");
        self.last_error = Some(error);
    }

    fn set_view_error(&mut self, error: String) {
        // Logged once per distinct error, not on every frame
        if self.view_error.as_deref() != Some(error.as_str()) {
            tracing::warn!(error = %error, "Cannot project category rows");
        }
        self.view_error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BuildOptions, DEFAULT_MAX_PATH_DEPTH};
    use tokio::time::{self, Duration};

    fn catalog() -> Vec<CategoryRecord> {
        vec![
            CategoryRecord::new("1", "Shoes").with_status("active"),
            CategoryRecord::new("2", "Sneakers").with_parent("Shoes").with_status("active"),
            CategoryRecord::new("3", "Boots").with_parent("Shoes").with_status("inactive"),
            CategoryRecord::new("4", "Bags").with_status("active"),
            CategoryRecord::new("5", "Totes").with_parent("Bags"),
        ]
    }

    fn test_app() -> App {
        App::new(CategoryBrowser::new(catalog()))
    }

    fn titles(app: &mut App) -> Vec<String> {
        app.browser
            .rows()
            .unwrap()
            .iter()
            .map(|r| r.title.clone())
            .collect()
    }

    #[test]
    fn test_nav_bounds() {
        let mut app = test_app();
        assert_eq!(app.row_count(), 2);
        app.nav_up();
        assert_eq!(app.selected, 0);
        app.nav_down();
        app.nav_down();
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_nav_empty_list() {
        let mut app = App::new(CategoryBrowser::default());
        app.nav_down();
        assert_eq!(app.selected, 0);
        assert!(app.selected_row().is_none());
        assert!(app.selected_breadcrumb().is_none());
    }

    #[test]
    fn test_toggle_keeps_cursor() {
        let mut app = test_app();
        app.nav_down(); // Shoes (Bags sorts first)
        app.toggle_selected();
        assert_eq!(titles(&mut app), vec!["Bags", "Shoes", "Boots", "Sneakers"]);
        assert_eq!(app.selected_row().unwrap().title, "Shoes");
    }

    #[test]
    fn test_toggle_leaf_sets_status() {
        let mut app = test_app();
        app.expand_all();
        app.selected = 1; // Totes
        app.toggle_selected();
        let (msg, _) = app.status_message.clone().unwrap();
        assert!(msg.contains("no subcategories"));
    }

    #[test]
    fn test_expand_all_keeps_selected_category() {
        let mut app = test_app();
        app.nav_down(); // Shoes
        app.expand_all();
        assert_eq!(app.row_count(), 5);
        assert_eq!(app.selected_row().unwrap().title, "Shoes");
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn test_collapse_hidden_selection_clamps() {
        let mut app = test_app();
        app.expand_all();
        app.selected = 4; // Sneakers
        app.collapse_all();
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_paging() {
        let mut app = test_app();
        app.expand_all();
        app.page_size = 2;

        assert_eq!(app.current_page(), 1);
        app.next_page();
        assert_eq!(app.selected, 2);
        assert_eq!(app.current_page(), 2);
        app.next_page();
        assert_eq!(app.selected, 4);
        app.next_page();
        assert_eq!(app.selected, 4);

        let page = app.visible_page();
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 1);

        app.prev_page();
        assert_eq!(app.selected, 2);
        app.prev_page();
        app.prev_page();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_keyword_and_mode() {
        let mut app = test_app();
        app.toggle_mode();
        app.apply_keyword("s");
        // Flat view: every match at level 0 in title order
        assert_eq!(
            titles(&mut app),
            vec!["Bags", "Boots", "Shoes", "Sneakers", "Totes"]
        );
        app.apply_keyword("boo");
        assert_eq!(titles(&mut app), vec!["Boots"]);
    }

    #[test]
    fn test_status_filter_cycle() {
        let mut app = test_app();
        app.toggle_mode();
        app.cycle_status_filter(); // active
        assert_eq!(titles(&mut app), vec!["Bags", "Shoes", "Sneakers"]);
        app.cycle_status_filter(); // inactive
        assert_eq!(titles(&mut app), vec!["Boots", "Totes"]);
    }

    #[test]
    fn test_reverse_direction_in_flat_mode() {
        let mut app = test_app();
        app.toggle_mode();
        app.reverse_direction();
        assert_eq!(
            titles(&mut app),
            vec!["Totes", "Sneakers", "Shoes", "Boots", "Bags"]
        );
    }

    #[test]
    fn test_breadcrumb_of_selection() {
        let mut app = test_app();
        app.expand_all();
        app.selected = 4; // Sneakers
        assert_eq!(
            app.selected_breadcrumb(),
            Some(Ok("Shoes > Sneakers".to_string()))
        );
    }

    #[test]
    fn test_replace_snapshot_keeps_selection_and_expand_state() {
        let mut app = test_app();
        app.expand_all();
        app.selected = 2; // Shoes

        let mut records = catalog();
        records.insert(0, CategoryRecord::new("6", "Accessories"));
        app.replace_snapshot(records);

        assert_eq!(app.selected_row().unwrap().title, "Shoes");
        assert_eq!(app.row_count(), 6);
    }

    #[test]
    fn test_strict_mode_error_reported() {
        let records = vec![
            CategoryRecord::new("1", "Sale"),
            CategoryRecord::new("2", "Sale"),
            CategoryRecord::new("3", "Hats").with_parent("Sale"),
        ];
        let browser = CategoryBrowser::with_options(
            records,
            BuildOptions {
                strict_titles: true,
                ..BuildOptions::default()
            },
            DEFAULT_MAX_PATH_DEPTH,
        );
        let mut app = App::new(browser);

        assert_eq!(app.row_count(), 0);
        assert!(app.view_error.as_deref().unwrap().contains("Ambiguous"));
        assert!(app.visible_page().items.is_empty());
    }

    #[test]
    fn test_thumbnail_placeholder() {
        let mut app = test_app();
        let url = app.selected_thumbnail().unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }
}
