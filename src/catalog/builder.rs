//! Flat record list to forest.
//!
//! Parents are resolved by title. The first record in input order wins when
//! titles collide, dangling references are promoted to roots, and parent
//! cycles are broken so every input record lands in the forest exactly once.

use std::collections::HashMap;

use super::flatten::DEFAULT_MAX_PATH_DEPTH;
use super::types::{BuildDiagnostic, CategoryId, CategoryNode, CategoryRecord, HierarchyError};

// ============================================================================
// Title Index
// ============================================================================

/// Lookup tables over one snapshot: `title -> [positions]` and `id -> position`.
///
/// Positions are indices into the slice the index was built from, kept in
/// input order so `resolve` is deterministic.
pub struct TitleIndex<'a> {
    records: &'a [CategoryRecord],
    by_title: HashMap<&'a str, Vec<usize>>,
    by_id: HashMap<&'a CategoryId, usize>,
}

impl<'a> TitleIndex<'a> {
    pub fn new(records: &'a [CategoryRecord]) -> Self {
        let mut by_title: HashMap<&str, Vec<usize>> = HashMap::with_capacity(records.len());
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, rec) in records.iter().enumerate() {
            by_title.entry(rec.title.trim()).or_default().push(idx);
            by_id.entry(&rec.id).or_insert(idx);
        }
        Self {
            records,
            by_title,
            by_id,
        }
    }

    pub fn records(&self) -> &'a [CategoryRecord] {
        self.records
    }

    /// Every position whose title equals `title`, in input order.
    pub fn candidates(&self, title: &str) -> &[usize] {
        self.by_title
            .get(title.trim())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First position whose title equals `title`.
    pub fn resolve(&self, title: &str) -> Option<usize> {
        self.candidates(title).first().copied()
    }

    /// Position of the first record carrying `id`.
    pub fn position(&self, id: &CategoryId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    fn ids(&self, positions: &[usize]) -> Vec<CategoryId> {
        positions
            .iter()
            .map(|&p| self.records[p].id.clone())
            .collect()
    }
}

// ============================================================================
// Forest
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Fail with [`HierarchyError::AmbiguousParent`] instead of picking the
    /// first matching title.
    pub strict_titles: bool,
    /// Deepest level a node may sit at. Nodes below it are cut loose and
    /// start a new tree at level 0.
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            strict_titles: false,
            max_depth: DEFAULT_MAX_PATH_DEPTH,
        }
    }
}

/// Roots in input order plus everything noticed while linking them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    pub roots: Vec<CategoryNode>,
    pub diagnostics: Vec<BuildDiagnostic>,
}

impl Forest {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes across all trees.
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(CategoryNode::subtree_len).sum()
    }

    /// Pre-order walk over every node, ignoring expand state and display order.
    pub fn nodes(&self) -> Vec<&CategoryNode> {
        let mut out = Vec::with_capacity(self.node_count());
        let mut stack: Vec<&CategoryNode> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn find(&self, id: &CategoryId) -> Option<&CategoryNode> {
        self.nodes().into_iter().find(|n| n.id() == id)
    }

    /// Turn the first ambiguous-parent diagnostic into an error.
    pub fn ensure_unambiguous(&self) -> Result<(), HierarchyError> {
        for diag in &self.diagnostics {
            if let BuildDiagnostic::AmbiguousParent {
                title, candidates, ..
            } = diag
            {
                return Err(HierarchyError::AmbiguousParent {
                    title: title.clone(),
                    candidates: candidates.clone(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Build the forest and return its roots. Never fails; see [`build_forest`]
/// for diagnostics and strict title checking.
pub fn build(records: &[CategoryRecord]) -> Vec<CategoryNode> {
    assemble(records, DEFAULT_MAX_PATH_DEPTH).roots
}

/// Build the forest, honoring `options`.
pub fn build_forest(
    records: &[CategoryRecord],
    options: &BuildOptions,
) -> Result<Forest, HierarchyError> {
    let forest = assemble(records, options.max_depth);
    if options.strict_titles {
        forest.ensure_unambiguous()?;
    }
    Ok(forest)
}

fn assemble(records: &[CategoryRecord], max_depth: usize) -> Forest {
    let index = TitleIndex::new(records);
    let mut diagnostics = Vec::new();

    let mut parent = link_parents(&index, &mut diagnostics);
    break_cycles(records, &mut parent, &mut diagnostics);
    let levels = assign_levels(records, &mut parent, max_depth, &mut diagnostics);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots = Vec::new();
    for (idx, p) in parent.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(idx),
            None => roots.push(idx),
        }
    }

    let roots = materialize(records, &levels, &children, &roots);
    Forest { roots, diagnostics }
}

/// Resolve each record's parent position by title.
fn link_parents(
    index: &TitleIndex<'_>,
    diagnostics: &mut Vec<BuildDiagnostic>,
) -> Vec<Option<usize>> {
    index
        .records()
        .iter()
        .map(|rec| {
            let parent_title = rec.parent_title()?;
            let candidates = index.candidates(parent_title);

            let Some(&chosen) = candidates.first() else {
                tracing::warn!(
                    id = %rec.id,
                    parent_ref = %parent_title,
                    "Category parent not found, promoting to root"
                );
                diagnostics.push(BuildDiagnostic::OrphanRecovered {
                    id: rec.id.clone(),
                    parent_ref: parent_title.to_owned(),
                });
                return None;
            };

            if candidates.len() > 1 {
                let chosen_id = index.records()[chosen].id.clone();
                tracing::warn!(
                    child = %rec.id,
                    title = %parent_title,
                    chosen = %chosen_id,
                    matches = candidates.len(),
                    "Ambiguous parent title, using first match"
                );
                diagnostics.push(BuildDiagnostic::AmbiguousParent {
                    child: rec.id.clone(),
                    title: parent_title.to_owned(),
                    chosen: chosen_id,
                    candidates: index.ids(candidates),
                });
            }

            Some(chosen)
        })
        .collect()
}

const UNVISITED: u8 = 0;
const ON_PATH: u8 = 1;
const DONE: u8 = 2;

/// Detach one member of every parent cycle so the links form a forest.
///
/// Each record's ancestor chain is walked once. Reaching a record already on
/// the current walk means the walk closed a loop; the loop member with the
/// lowest input position becomes a root.
fn break_cycles(
    records: &[CategoryRecord],
    parent: &mut [Option<usize>],
    diagnostics: &mut Vec<BuildDiagnostic>,
) {
    let mut state = vec![UNVISITED; parent.len()];

    for start in 0..parent.len() {
        let mut path = Vec::new();
        let mut cur = start;

        let loop_entry = loop {
            match state[cur] {
                ON_PATH => break Some(cur),
                DONE => break None,
                _ => {}
            }
            state[cur] = ON_PATH;
            path.push(cur);
            match parent[cur] {
                Some(p) => cur = p,
                None => break None,
            }
        };

        if let Some(entry) = loop_entry {
            if let Some(pos) = path.iter().position(|&p| p == entry) {
                let members = &path[pos..];
                if let Some(&promoted) = members.iter().min() {
                    parent[promoted] = None;
                    let member_ids: Vec<CategoryId> =
                        members.iter().map(|&m| records[m].id.clone()).collect();
                    tracing::warn!(
                        promoted = %records[promoted].id,
                        members = member_ids.len(),
                        "Category parent cycle detected, promoting member to root"
                    );
                    diagnostics.push(BuildDiagnostic::CycleBroken {
                        promoted: records[promoted].id.clone(),
                        members: member_ids,
                    });
                }
            }
        }

        for p in path {
            state[p] = DONE;
        }
    }
}

/// Level of every record over the acyclic parent links.
///
/// Each ancestor chain is walked once and memoized. A record that would land
/// deeper than `max_depth` is detached and becomes a root, which keeps every
/// tree (and anything that walks it) bounded in depth.
fn assign_levels(
    records: &[CategoryRecord],
    parent: &mut [Option<usize>],
    max_depth: usize,
    diagnostics: &mut Vec<BuildDiagnostic>,
) -> Vec<usize> {
    let mut levels: Vec<Option<usize>> = vec![None; parent.len()];
    let mut chain = Vec::new();

    for start in 0..parent.len() {
        let mut cur = start;
        while levels[cur].is_none() {
            chain.push(cur);
            match parent[cur] {
                Some(p) => cur = p,
                None => break,
            }
        }

        while let Some(idx) = chain.pop() {
            let mut level = match parent[idx] {
                Some(p) => levels[p].map_or(0, |l| l + 1),
                None => 0,
            };
            if level > max_depth {
                tracing::warn!(
                    id = %records[idx].id,
                    depth = level,
                    max_depth,
                    "Category nested too deep, promoting to root"
                );
                diagnostics.push(BuildDiagnostic::DepthLimited {
                    id: records[idx].id.clone(),
                    depth: level,
                });
                parent[idx] = None;
                level = 0;
            }
            levels[idx] = Some(level);
        }
    }

    levels.into_iter().map(|l| l.unwrap_or(0)).collect()
}

/// Assemble owned nodes bottom-up so no step recurses per tree level.
fn materialize(
    records: &[CategoryRecord],
    levels: &[usize],
    children: &[Vec<usize>],
    roots: &[usize],
) -> Vec<CategoryNode> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|a, b| levels[*b].cmp(&levels[*a]));

    let mut built: Vec<Option<CategoryNode>> = vec![None; records.len()];
    for idx in order {
        let kids = children[idx]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[idx] = Some(CategoryNode {
            record: records[idx].clone(),
            level: levels[idx],
            children: kids,
        });
    }

    roots.iter().filter_map(|&root| built[root].take()).collect()
}
