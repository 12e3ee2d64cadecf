//! Forest to ordered display rows, plus the breadcrumb ancestor walk.

use std::collections::HashSet;

use super::builder::TitleIndex;
use super::compare::compare_titles;
use super::expanded::ExpandedSet;
use super::types::{CategoryId, CategoryNode, CategoryRecord, CategoryRow, HierarchyError};

/// Ancestor hops allowed before a breadcrumb walk is declared cyclic.
pub const DEFAULT_MAX_PATH_DEPTH: usize = 50;

/// Pre-order walk that only descends into expanded nodes.
///
/// Siblings are ordered by title (natural, case-insensitive) at every level,
/// independent of any sort applied to the flat list.
pub fn flatten<'a>(roots: &'a [CategoryNode], expanded: &ExpandedSet) -> Vec<&'a CategoryNode> {
    let mut out = Vec::new();
    let mut stack = by_title(roots);
    while let Some(node) = stack.pop() {
        out.push(node);
        if node.has_children() && expanded.is_expanded(node.id()) {
            stack.extend(by_title(&node.children));
        }
    }
    out
}

/// Siblings in reverse title order, ready to be popped off a stack.
fn by_title(nodes: &[CategoryNode]) -> Vec<&CategoryNode> {
    let mut siblings: Vec<&CategoryNode> = nodes.iter().collect();
    siblings.sort_by(|a, b| compare_titles(a.title(), b.title()));
    siblings.reverse();
    siblings
}

/// [`flatten`] projected into owned rows for a renderer.
pub fn project_rows(roots: &[CategoryNode], expanded: &ExpandedSet) -> Vec<CategoryRow> {
    flatten(roots, expanded)
        .into_iter()
        .map(|node| CategoryRow {
            id: node.id().clone(),
            title: node.record.title.clone(),
            level: node.level,
            status: node.record.status.clone(),
            has_children: node.has_children(),
            is_expanded: node.has_children() && expanded.is_expanded(node.id()),
            thumbnail_ref: node.record.thumbnail_ref.clone(),
        })
        .collect()
}

/// Titles from the outermost ancestor down to the category itself.
///
/// Walks up by first-match title lookup and stops at an empty or unresolvable
/// parent reference. Revisiting a record, or more than `max_depth` hops,
/// fails with [`HierarchyError::CyclicHierarchy`].
pub fn breadcrumb(
    records: &[CategoryRecord],
    id: &CategoryId,
    max_depth: usize,
) -> Result<Vec<String>, HierarchyError> {
    breadcrumb_in(&TitleIndex::new(records), id, max_depth)
}

/// [`breadcrumb`] against a prebuilt index.
pub fn breadcrumb_in(
    index: &TitleIndex<'_>,
    id: &CategoryId,
    max_depth: usize,
) -> Result<Vec<String>, HierarchyError> {
    let records = index.records();
    let start = index
        .position(id)
        .ok_or_else(|| HierarchyError::UnknownCategory(id.clone()))?;

    let mut visited = HashSet::from([start]);
    let mut titles = vec![records[start].title.clone()];
    let mut cur = start;

    while let Some(parent_title) = records[cur].parent_title() {
        let Some(parent) = index.resolve(parent_title) else {
            break;
        };

        let hops = titles.len();
        if !visited.insert(parent) || hops > max_depth {
            tracing::warn!(
                id = %id,
                at = %records[parent].title,
                hops,
                "Breadcrumb walk aborted on cyclic hierarchy"
            );
            return Err(HierarchyError::CyclicHierarchy {
                title: records[parent].title.clone(),
                depth: hops,
            });
        }

        titles.push(records[parent].title.clone());
        cur = parent;
    }

    titles.reverse();
    Ok(titles)
}
