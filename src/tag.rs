//! Tag hierarchy arena.
//!
//! Tags are organized in a parent/child hierarchy (`Plot > Character > Hero`).
//! Nodes live in a [`TagArena`] and refer to their parent by [`TagId`] index,
//! never by owning reference, so the shared hierarchy cannot turn into an
//! ownership cycle. Annotations store the `TagId` of their leaf tag and
//! resolve names and paths through the arena.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Separator used when rendering a tag's full path.
pub const PATH_SEPARATOR: &str = ">";

/// Index of a tag node within a [`TagArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagId(usize);

/// One node in the tag hierarchy.
#[derive(Debug, Clone)]
pub struct TagNode {
    /// The tag's name (one path segment).
    pub name: String,
    /// Parent node, if any. Root tags have no parent.
    pub parent: Option<TagId>,
}

/// Arena of tag nodes indexed by [`TagId`].
///
/// Interning is keyed by the full root-first path, so two annotations
/// tagged `Plot > Character > Hero` share the same three nodes.
#[derive(Debug, Clone, Default)]
pub struct TagArena {
    nodes: Vec<TagNode>,
    by_path: HashMap<String, TagId>,
}

impl TagArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct tag nodes interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Intern a root-first path of tag names, returning the id of the leaf.
    ///
    /// Every prefix of the path becomes (or reuses) its own node, so parent
    /// links are always resolvable. Empty segments are skipped.
    pub fn intern_path<S: AsRef<str>>(&mut self, path: &[S]) -> Option<TagId> {
        let mut key = String::new();
        let mut parent = None;
        let mut leaf = None;
        for segment in path {
            let segment = segment.as_ref();
            if segment.is_empty() {
                continue;
            }
            if !key.is_empty() {
                key.push_str(PATH_SEPARATOR);
            }
            key.push_str(segment);
            let id = match self.by_path.get(&key) {
                Some(&id) => id,
                None => {
                    let id = TagId(self.nodes.len());
                    self.nodes.push(TagNode {
                        name: segment.to_string(),
                        parent,
                    });
                    self.by_path.insert(key.clone(), id);
                    id
                }
            };
            parent = Some(id);
            leaf = Some(id);
        }
        leaf
    }

    /// The node behind `id`.
    #[must_use]
    pub fn get(&self, id: TagId) -> &TagNode {
        &self.nodes[id.0]
    }

    /// The tag's name.
    #[must_use]
    pub fn name(&self, id: TagId) -> &str {
        &self.nodes[id.0].name
    }

    /// The tag's parent, if any.
    #[must_use]
    pub fn parent(&self, id: TagId) -> Option<TagId> {
        self.nodes[id.0].parent
    }

    /// The name of the tag's parent, if any.
    #[must_use]
    pub fn parent_name(&self, id: TagId) -> Option<&str> {
        self.parent(id).map(|p| self.name(p))
    }

    /// The full root-first path, joined with [`PATH_SEPARATOR`].
    #[must_use]
    pub fn full_path(&self, id: TagId) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            segments.push(self.name(current));
            cursor = self.parent(current);
        }
        segments.reverse();
        segments.join(PATH_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_path_dedupes_shared_prefixes() {
        let mut arena = TagArena::new();
        let hero = arena.intern_path(&["Plot", "Character", "Hero"]).unwrap();
        let villain = arena.intern_path(&["Plot", "Character", "Villain"]).unwrap();

        // Plot, Character, Hero, Villain
        assert_eq!(arena.len(), 4);
        assert_eq!(arena.parent(hero), arena.parent(villain));
    }

    #[test]
    fn intern_same_path_twice_yields_same_leaf() {
        let mut arena = TagArena::new();
        let a = arena.intern_path(&["Plot", "Character", "Hero"]).unwrap();
        let b = arena.intern_path(&["Plot", "Character", "Hero"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn full_path_walks_parent_links() {
        let mut arena = TagArena::new();
        let hero = arena.intern_path(&["Plot", "Character", "Hero"]).unwrap();
        assert_eq!(arena.full_path(hero), "Plot>Character>Hero");
        assert_eq!(arena.name(hero), "Hero");
        assert_eq!(arena.parent_name(hero), Some("Character"));
    }

    #[test]
    fn root_tag_has_no_parent() {
        let mut arena = TagArena::new();
        let root = arena.intern_path(&["Setting"]).unwrap();
        assert_eq!(arena.parent(root), None);
        assert_eq!(arena.full_path(root), "Setting");
    }

    #[test]
    fn empty_path_yields_no_leaf() {
        let mut arena = TagArena::new();
        assert_eq!(arena.intern_path::<&str>(&[]), None);
        assert!(arena.is_empty());
    }
}
