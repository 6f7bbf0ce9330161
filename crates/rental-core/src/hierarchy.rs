//! # Category Hierarchy
//!
//! Pure functions over flat category lists: path previews for the create
//! form, `A > B > C` display paths, tree building and breadcrumbs.
//!
//! ## Path Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Parent                         New child "DSLR"                        │
//! │  ──────────────────────────     ─────────────────────────────────────   │
//! │  (none)                         path  = "DSLR"                          │
//! │                                 level = 0                               │
//! │                                                                         │
//! │  "Electronics/Cameras" (lvl 1)  path  = "Electronics/Cameras/DSLR"      │
//! │                                 level = 2                               │
//! │                                 parent.is_leaf: true ──► false          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The server stays authoritative; these previews let the form show the
//! result before submit and let tests check what came back.

use std::collections::{HashMap, HashSet};

use crate::error::{CoreError, CoreResult};
use crate::types::{Category, CategoryTree};

/// Separator inside a materialized path.
pub const PATH_SEPARATOR: char = '/';

/// Separator for human-readable display paths.
pub const DISPLAY_SEPARATOR: &str = " > ";

/// What a new category will look like once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPreview {
    pub path: String,
    pub level: u32,
    pub is_leaf: bool,
    /// Set when the parent was a leaf and stops being one.
    pub parent_becomes_branch: bool,
}

/// Predicts path and level for a new category named `name` under `parent`.
pub fn preview(parent: Option<&Category>, name: &str) -> CategoryPreview {
    let name = name.trim();
    match parent {
        None => CategoryPreview {
            path: name.to_string(),
            level: 0,
            is_leaf: true,
            parent_becomes_branch: false,
        },
        Some(parent) => CategoryPreview {
            path: join_path(&parent.category_path, name),
            level: parent.category_level + 1,
            is_leaf: true,
            parent_becomes_branch: parent.is_leaf,
        },
    }
}

/// Appends a segment to a materialized path.
pub fn join_path(parent_path: &str, name: &str) -> String {
    let parent_path = parent_path.trim_end_matches(PATH_SEPARATOR);
    if parent_path.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent_path, PATH_SEPARATOR, name)
    }
}

/// Splits a materialized path into its segments.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split(PATH_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Applies a freshly created category to a cached list: inserts it and
/// flips its parent's leaf flag.
pub fn apply_created(categories: &mut Vec<Category>, created: Category) {
    if let Some(parent_id) = created.parent_category_id.as_deref() {
        if let Some(parent) = categories.iter_mut().find(|c| c.id == parent_id) {
            parent.is_leaf = false;
        }
    }
    categories.retain(|c| c.id != created.id);
    categories.push(created);
}

// =============================================================================
// Lookups
// =============================================================================

/// Id-indexed view over a flat list.
pub struct CategoryIndex<'a> {
    by_id: HashMap<&'a str, &'a Category>,
}

impl<'a> CategoryIndex<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        CategoryIndex {
            by_id: categories.iter().map(|c| (c.id.as_str(), c)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a Category> {
        self.by_id.get(id).copied()
    }

    /// Ancestors from the root down to and including `id`.
    ///
    /// Fails on a cycle or when a parent is missing from the list.
    pub fn lineage(&self, id: &str) -> CoreResult<Vec<&'a Category>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(id);

        while let Some(current) = cursor {
            if !seen.insert(current) {
                return Err(CoreError::CategoryCycle(current.to_string()));
            }
            let category = self
                .get(current)
                .ok_or_else(|| CoreError::CategoryNotFound(current.to_string()))?;
            chain.push(category);
            cursor = category.parent_category_id.as_deref();
        }

        chain.reverse();
        Ok(chain)
    }

    /// `Electronics > Cameras > DSLR` for the category `id`.
    pub fn display_path(&self, id: &str) -> CoreResult<String> {
        let names: Vec<&str> = self
            .lineage(id)?
            .iter()
            .map(|c| c.category_name.as_str())
            .collect();
        Ok(names.join(DISPLAY_SEPARATOR))
    }

    /// Breadcrumb trail, root first.
    pub fn breadcrumb(&self, id: &str) -> CoreResult<Vec<Category>> {
        Ok(self.lineage(id)?.into_iter().cloned().collect())
    }
}

/// Candidate parents for the create form, ordered by path.
///
/// Every active category is eligible; picking a leaf turns it into a branch.
pub fn parent_options(categories: &[Category]) -> Vec<&Category> {
    let mut options: Vec<&Category> = categories.iter().filter(|c| c.is_active).collect();
    options.sort_by(|a, b| a.category_path.cmp(&b.category_path));
    options
}

// =============================================================================
// Tree Building
// =============================================================================

/// Builds a forest from a flat list.
///
/// Children are ordered by `display_order`, then name. Categories whose
/// parent is not in the list are treated as roots so nothing disappears.
pub fn build_tree(categories: &[Category]) -> Vec<CategoryTree> {
    let ids: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    let mut children: HashMap<Option<&str>, Vec<&Category>> = HashMap::new();

    for category in categories {
        let parent = category
            .parent_category_id
            .as_deref()
            .filter(|p| ids.contains(p) && *p != category.id);
        children.entry(parent).or_default().push(category);
    }
    for list in children.values_mut() {
        list.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.category_name.cmp(&b.category_name))
        });
    }

    let mut visited = HashSet::new();
    children
        .get(&None)
        .map(|roots| {
            roots
                .iter()
                .filter_map(|root| build_node(*root, &children, &mut visited))
                .collect()
        })
        .unwrap_or_default()
}

fn build_node<'a>(
    category: &'a Category,
    children: &HashMap<Option<&'a str>, Vec<&'a Category>>,
    visited: &mut HashSet<&'a str>,
) -> Option<CategoryTree> {
    if !visited.insert(category.id.as_str()) {
        return None;
    }
    let kids: Vec<CategoryTree> = children
        .get(&Some(category.id.as_str()))
        .map(|list| {
            list.iter()
                .filter_map(|child| build_node(*child, children, visited))
                .collect()
        })
        .unwrap_or_default();

    Some(CategoryTree {
        id: category.id.clone(),
        category_name: category.category_name.clone(),
        parent_category_id: category.parent_category_id.clone(),
        category_path: category.category_path.clone(),
        category_level: category.category_level,
        display_order: category.display_order,
        is_leaf: kids.is_empty(),
        is_active: category.is_active,
        children: kids,
    })
}

/// Flattens a tree depth-first, pairing each node with its depth.
pub fn flatten_tree(forest: &[CategoryTree]) -> Vec<(usize, &CategoryTree)> {
    fn walk<'a>(nodes: &'a [CategoryTree], depth: usize, out: &mut Vec<(usize, &'a CategoryTree)>) {
        for node in nodes {
            out.push((depth, node));
            walk(&node.children, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    walk(forest, 0, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Audit;
    use assert_matches::assert_matches;

    fn category(id: &str, name: &str, parent: Option<&str>, path: &str, level: u32, leaf: bool) -> Category {
        Category {
            id: id.into(),
            category_name: name.into(),
            parent_category_id: parent.map(String::from),
            category_path: path.into(),
            category_level: level,
            display_order: 0,
            is_leaf: leaf,
            audit: Audit::default(),
            is_active: true,
        }
    }

    fn sample() -> Vec<Category> {
        vec![
            category("e", "Electronics", None, "Electronics", 0, false),
            category("c", "Cameras", Some("e"), "Electronics/Cameras", 1, false),
            category("d", "DSLR", Some("c"), "Electronics/Cameras/DSLR", 2, true),
            category("a", "Audio", Some("e"), "Electronics/Audio", 1, true),
            category("f", "Furniture", None, "Furniture", 0, true),
        ]
    }

    #[test]
    fn test_preview_root() {
        let p = preview(None, "  Tools ");
        assert_eq!(p.path, "Tools");
        assert_eq!(p.level, 0);
        assert!(p.is_leaf);
        assert!(!p.parent_becomes_branch);
    }

    #[test]
    fn test_preview_under_leaf_parent() {
        let list = sample();
        let dslr = &list[2];
        let p = preview(Some(dslr), "Bodies");
        assert_eq!(p.path, "Electronics/Cameras/DSLR/Bodies");
        assert_eq!(p.level, 3);
        assert!(p.parent_becomes_branch);

        let cameras = &list[1];
        assert!(!preview(Some(cameras), "Mirrorless").parent_becomes_branch);
    }

    #[test]
    fn test_join_path_trims_trailing_separator() {
        assert_eq!(join_path("A/B/", "C"), "A/B/C");
        assert_eq!(join_path("", "C"), "C");
        assert_eq!(path_segments("A/ B //C"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_apply_created_flips_parent_leaf() {
        let mut list = sample();
        let created = category("b", "Bodies", Some("d"), "Electronics/Cameras/DSLR/Bodies", 3, true);
        apply_created(&mut list, created);
        assert!(!list.iter().find(|c| c.id == "d").unwrap().is_leaf);
        assert_eq!(list.len(), 6);
    }

    #[test]
    fn test_display_path_and_breadcrumb() {
        let list = sample();
        let index = CategoryIndex::new(&list);
        assert_eq!(index.display_path("d").unwrap(), "Electronics > Cameras > DSLR");
        let crumbs = index.breadcrumb("d").unwrap();
        assert_eq!(crumbs.first().map(|c| c.id.as_str()), Some("e"));
        assert_eq!(crumbs.len(), 3);
    }

    #[test]
    fn test_lineage_detects_cycles_and_gaps() {
        let list = vec![
            category("x", "X", Some("y"), "X", 0, true),
            category("y", "Y", Some("x"), "Y", 0, true),
            category("z", "Z", Some("missing"), "Z", 1, true),
        ];
        let index = CategoryIndex::new(&list);
        assert_matches!(index.display_path("x"), Err(CoreError::CategoryCycle(_)));
        assert_matches!(index.display_path("z"), Err(CoreError::CategoryNotFound(id)) if id == "missing");
    }

    #[test]
    fn test_build_tree_orders_and_derives_leaves() {
        let forest = build_tree(&sample());
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].category_name, "Electronics");
        let names: Vec<&str> = forest[0].children.iter().map(|c| c.category_name.as_str()).collect();
        assert_eq!(names, vec!["Audio", "Cameras"]);
        assert!(forest[1].is_leaf);
        assert_eq!(flatten_tree(&forest).len(), 5);
    }

    #[test]
    fn test_orphans_become_roots() {
        let list = vec![category("z", "Z", Some("gone"), "Gone/Z", 1, true)];
        let forest = build_tree(&list);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "z");
    }

    #[test]
    fn test_parent_options_sorted_and_active_only() {
        let mut list = sample();
        list[4].is_active = false;
        let options = parent_options(&list);
        let paths: Vec<&str> = options.iter().map(|c| c.category_path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["Electronics", "Electronics/Audio", "Electronics/Cameras", "Electronics/Cameras/DSLR"]
        );
    }
}
