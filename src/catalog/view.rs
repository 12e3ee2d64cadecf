//! Per-surface browsing session: snapshot + query + expand state, with the
//! projected rows cached until one of them changes.

use std::sync::Arc;

use super::builder::{build_forest, BuildOptions, Forest};
use super::compare::{sort_records, SortDirection, SortField};
use super::expanded::{expandable_ids, ExpandedSet};
use super::filter::{filter, StatusFilter};
use super::flatten::{breadcrumb, project_rows, DEFAULT_MAX_PATH_DEPTH};
use super::page::{paginate, Page};
use super::types::{BuildDiagnostic, CategoryId, CategoryRecord, CategoryRow, HierarchyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Nested rows honoring expand state, alphabetical per level.
    #[default]
    Tree,
    /// Every matching record at level 0, in comparator order.
    Flat,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Tree => Self::Flat,
            Self::Flat => Self::Tree,
        }
    }
}

/// Filter and sort parameters for one surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub keyword: String,
    pub status: StatusFilter,
    pub sort_field: SortField,
    pub direction: SortDirection,
    pub mode: ViewMode,
}

/// One tree surface (admin table, navigation menu) over a category snapshot.
///
/// Derived state is rebuilt lazily: the forest is dropped whenever the
/// snapshot or query changes, the row cache also whenever expand state
/// changes. `ExpandedSet` survives snapshot replacement.
#[derive(Debug, Clone)]
pub struct CategoryBrowser {
    records: Arc<Vec<CategoryRecord>>,
    query: Query,
    expanded: ExpandedSet,
    options: BuildOptions,
    max_path_depth: usize,
    forest: Option<Forest>,
    cached_rows: Option<Vec<CategoryRow>>,
}

impl Default for CategoryBrowser {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CategoryBrowser {
    pub fn new(records: Vec<CategoryRecord>) -> Self {
        Self::with_options(records, BuildOptions::default(), DEFAULT_MAX_PATH_DEPTH)
    }

    pub fn with_options(
        records: Vec<CategoryRecord>,
        options: BuildOptions,
        max_path_depth: usize,
    ) -> Self {
        Self {
            records: Arc::new(records),
            query: Query::default(),
            expanded: ExpandedSet::new(),
            options,
            max_path_depth,
            forest: None,
            cached_rows: None,
        }
    }

    pub fn records(&self) -> &[CategoryRecord] {
        &self.records
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn expanded(&self) -> &ExpandedSet {
        &self.expanded
    }

    /// Swap in a new snapshot. Expand state is kept; everything derived is dropped.
    pub fn replace_snapshot(&mut self, records: Vec<CategoryRecord>) {
        tracing::info!(
            records = records.len(),
            expanded = self.expanded.len(),
            "Replacing category snapshot"
        );
        self.records = Arc::new(records);
        self.invalidate_forest();
    }

    pub fn set_query(&mut self, query: Query) {
        if self.query != query {
            self.query = query;
            self.invalidate_forest();
        }
    }

    pub fn set_keyword(&mut self, keyword: &str) {
        if self.query.keyword != keyword {
            self.query.keyword = keyword.to_owned();
            self.invalidate_forest();
        }
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        if self.query.status != status {
            self.query.status = status;
            self.invalidate_forest();
        }
    }

    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        if self.query.sort_field != field || self.query.direction != direction {
            self.query.sort_field = field;
            self.query.direction = direction;
            self.invalidate_forest();
        }
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.query.mode != mode {
            self.query.mode = mode;
            self.invalidate_rows();
        }
    }

    /// Flip one node. Returns `true` if it is now expanded.
    pub fn toggle(&mut self, id: &CategoryId) -> bool {
        let expanded = self.expanded.toggle(id);
        self.invalidate_rows();
        expanded
    }

    /// Expand every node that has children in the current forest.
    /// Returns the number of expanded nodes.
    pub fn expand_all(&mut self) -> Result<usize, HierarchyError> {
        let ids = expandable_ids(&self.forest()?.roots);
        let count = ids.len();
        self.expanded.expand_all(ids);
        self.invalidate_rows();
        Ok(count)
    }

    pub fn collapse_all(&mut self) {
        self.expanded.collapse_all();
        self.invalidate_rows();
    }

    /// Forest for the current snapshot and query.
    pub fn forest(&mut self) -> Result<&Forest, HierarchyError> {
        let forest = match self.forest.take() {
            Some(forest) => forest,
            None => self.build()?,
        };
        let forest: &Forest = self.forest.insert(forest);
        Ok(forest)
    }

    pub fn diagnostics(&mut self) -> Result<&[BuildDiagnostic], HierarchyError> {
        Ok(&self.forest()?.diagnostics)
    }

    /// Rows to render, rebuilt only after a change.
    pub fn rows(&mut self) -> Result<&[CategoryRow], HierarchyError> {
        let rows = match self.cached_rows.take() {
            Some(rows) => rows,
            None => self.compute_rows()?,
        };
        let rows: &[CategoryRow] = self.cached_rows.insert(rows);
        Ok(rows)
    }

    pub fn page(&mut self, page: usize, page_size: usize) -> Result<Page<CategoryRow>, HierarchyError> {
        Ok(paginate(self.rows()?, page, page_size))
    }

    /// Breadcrumb over the whole snapshot, ignoring the active filters.
    pub fn breadcrumb(&self, id: &CategoryId) -> Result<Vec<String>, HierarchyError> {
        breadcrumb(&self.records, id, self.max_path_depth)
    }

    fn invalidate_forest(&mut self) {
        self.forest = None;
        self.invalidate_rows();
    }

    fn invalidate_rows(&mut self) {
        self.cached_rows = None;
    }

    /// Filtered then sorted copy of the snapshot.
    fn prepared_records(&self) -> Vec<CategoryRecord> {
        let mut records = filter(&self.records, &self.query.keyword, self.query.status);
        sort_records(&mut records, self.query.sort_field, self.query.direction);
        records
    }

    fn build(&self) -> Result<Forest, HierarchyError> {
        let records = self.prepared_records();
        let forest = build_forest(&records, &self.options)?;
        tracing::debug!(
            matched = records.len(),
            roots = forest.roots.len(),
            diagnostics = forest.diagnostics.len(),
            "Rebuilt category forest"
        );
        Ok(forest)
    }

    fn compute_rows(&mut self) -> Result<Vec<CategoryRow>, HierarchyError> {
        match self.query.mode {
            ViewMode::Flat => Ok(self
                .prepared_records()
                .into_iter()
                .map(|rec| CategoryRow {
                    id: rec.id,
                    title: rec.title,
                    level: 0,
                    status: rec.status,
                    has_children: false,
                    is_expanded: false,
                    thumbnail_ref: rec.thumbnail_ref,
                })
                .collect()),
            ViewMode::Tree => {
                let forest = match self.forest.take() {
                    Some(forest) => forest,
                    None => self.build()?,
                };
                let rows = project_rows(&forest.roots, &self.expanded);
                self.forest = Some(forest);
                Ok(rows)
            }
        }
    }
}
