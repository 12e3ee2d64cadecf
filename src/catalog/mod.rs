//! Category hierarchy engine.
//!
//! Turns a flat snapshot of category records, linked to their parents by
//! title, into an ordered, expandable view:
//!
//! - [`filter`] - keyword and status predicates over the flat list
//! - [`compare`] - title/status/createdAt comparators and stable sort
//! - [`builder`] - forest construction with orphan, duplicate and cycle handling
//! - [`flatten`] - pre-order projection honoring expand state, breadcrumbs
//! - [`expanded`] - per-surface expand/collapse state
//! - [`view`] - a cached browsing session tying the pieces together
//!
//! # Example
//!
//! ```
//! use category_tree::catalog::{build, flatten, CategoryId, CategoryRecord, ExpandedSet};
//!
//! let records = vec![
//!     CategoryRecord::new("1", "Shoes"),
//!     CategoryRecord::new("2", "Sneakers").with_parent("Shoes"),
//!     CategoryRecord::new("3", "Boots").with_parent("Shoes"),
//! ];
//! let roots = build(&records);
//! let expanded = ExpandedSet::from_ids([CategoryId::from("1")]);
//! let titles: Vec<&str> = flatten(&roots, &expanded).iter().map(|n| n.title()).collect();
//! assert_eq!(titles, vec!["Shoes", "Boots", "Sneakers"]);
//! ```

pub mod builder;
pub mod compare;
pub mod expanded;
pub mod filter;
pub mod flatten;
mod page;
mod types;
pub mod view;

pub use builder::{build, build_forest, BuildOptions, Forest, TitleIndex};
pub use compare::{compare, compare_titles, sort_records, SortDirection, SortField};
pub use expanded::{expandable_ids, ExpandedSet};
pub use filter::{filter, StatusFilter};
pub use flatten::{breadcrumb, flatten, project_rows, DEFAULT_MAX_PATH_DEPTH};
pub use page::{paginate, Page};
pub use types::{
    BuildDiagnostic, CategoryId, CategoryNode, CategoryRecord, CategoryRow, HierarchyError,
    ACTIVE_STATUS_ALIASES,
};
pub use view::{CategoryBrowser, Query, ViewMode};
