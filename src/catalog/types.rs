use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by the hierarchy engine.
///
/// Most data problems are recoverable and surface as [`BuildDiagnostic`]s
/// instead. These variants are the cases where a caller asked for something
/// the data cannot answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// Two or more records share a title that another record uses as its
    /// parent reference. Only raised when strict title checking is enabled.
    #[error("Ambiguous parent title '{title}' matches {} categories", .candidates.len())]
    AmbiguousParent {
        title: String,
        candidates: Vec<CategoryId>,
    },

    /// The ancestor walk for a breadcrumb revisited a record or ran past the
    /// depth limit.
    #[error("Cyclic category hierarchy detected at '{title}' after {depth} hops")]
    CyclicHierarchy { title: String, depth: usize },

    /// No record with the requested id exists in the snapshot.
    #[error("Unknown category: {0}")]
    UnknownCategory(CategoryId),
}

/// Non-fatal observations made while building a forest.
///
/// Each one indicates upstream data the backend should eventually fix. The
/// builder logs every diagnostic and returns them alongside the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildDiagnostic {
    /// `parent_ref` did not match any title, so the record was promoted to root.
    OrphanRecovered {
        id: CategoryId,
        parent_ref: String,
    },
    /// `parent_ref` matched several records; the first in input order won.
    AmbiguousParent {
        child: CategoryId,
        title: String,
        chosen: CategoryId,
        candidates: Vec<CategoryId>,
    },
    /// A parent chain looped back on itself; `promoted` was cut loose and made a root.
    CycleBroken {
        promoted: CategoryId,
        members: Vec<CategoryId>,
    },
    /// The record sat deeper than the configured limit and was made a root.
    DepthLimited { id: CategoryId, depth: usize },
}

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque category identifier assigned by the backend.
///
/// Backends send either strings or integers; both normalize to a string so
/// expand state keys stay stable across snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for CategoryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for CategoryId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// Records
// ============================================================================

/// Status strings the backend uses for an active category.
///
/// The admin console stores the Vietnamese label verbatim on some records.
pub const ACTIVE_STATUS_ALIASES: &[&str] = &["active", "hoạt động"];

fn is_active_status(status: &str) -> bool {
    let status = status.trim().to_lowercase();
    ACTIVE_STATUS_ALIASES.contains(&status.as_str())
}

/// A category as delivered by the record source, after envelope normalization.
///
/// Children reference their parent by `title`, not by `id`. Renaming a parent
/// orphans its children and duplicate titles make resolution ambiguous; the
/// builder handles both without failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub title: String,
    #[serde(default)]
    pub parent_ref: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_ref: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_by_name: Option<String>,
}

impl CategoryRecord {
    /// Create a root record with an empty status and no optional fields.
    pub fn new(id: impl Into<CategoryId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parent_ref: None,
            status: String::new(),
            description: None,
            thumbnail_ref: None,
            created_at: None,
            created_by_name: None,
        }
    }

    pub fn with_parent(mut self, parent_title: impl Into<String>) -> Self {
        self.parent_ref = Some(parent_title.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail_ref: impl Into<String>) -> Self {
        self.thumbnail_ref = Some(thumbnail_ref.into());
        self
    }

    /// Parent title, or `None` when the reference is absent or blank.
    pub fn parent_title(&self) -> Option<&str> {
        self.parent_ref
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Whether the raw status is one of the active aliases (case-insensitive).
    pub fn is_active(&self) -> bool {
        is_active_status(&self.status)
    }
}

// ============================================================================
// Derived Tree
// ============================================================================

/// A record placed in the forest.
///
/// Rebuilt from scratch whenever the snapshot or query changes. `children`
/// keeps input order; display ordering is applied by the flattener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub record: CategoryRecord,
    /// Root = 0, +1 per ancestor hop.
    pub level: usize,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn id(&self) -> &CategoryId {
        &self.record.id
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// A single row of the projected view, ready for a table or dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub title: String,
    pub level: usize,
    pub status: String,
    pub has_children: bool,
    pub is_expanded: bool,
    pub thumbnail_ref: Option<String>,
}

impl CategoryRow {
    pub fn is_active(&self) -> bool {
        is_active_status(&self.status)
    }
}
