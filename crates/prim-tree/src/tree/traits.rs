//! Read-only traversal over the materialised part of a tree

use stage::PrimPath;
use std::collections::{HashSet, VecDeque};

use crate::tree::{SceneNode, TreeIndex};

/// A hierarchy of [`SceneNode`] rows addressed by [`TreeIndex`]
///
/// Implementations only report what they hold: children that were never
/// fetched simply do not show up. Invalid or stale indices yield `None` or
/// empty results rather than errors.
///
/// # Example
///
/// ```ignore
/// fn print_tree<T: Tree>(tree: &T) {
///     for id in tree.walk(TraversalOrder::PreOrder) {
///         let node = tree.get(id).unwrap();
///         println!("{:indent$}{}", "", node.name, indent = tree.depth(id) * 2);
///     }
/// }
/// ```
pub trait Tree {
    /// The root row, `None` when nothing is loaded
    fn root(&self) -> Option<TreeIndex>;

    /// Get a node by its index
    fn get(&self, id: TreeIndex) -> Option<&SceneNode>;

    /// Get the parent of a node (`None` for the root)
    fn parent(&self, id: TreeIndex) -> Option<TreeIndex>;

    /// Iterate over the materialised children of a node
    fn children(&self, id: TreeIndex) -> Box<dyn Iterator<Item = TreeIndex> + '_>;

    /// Count live nodes
    fn node_count(&self) -> usize;

    /// Get the name of a node
    fn name(&self, id: TreeIndex) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    /// Get the prim path of a node
    fn path(&self, id: TreeIndex) -> Option<&PrimPath> {
        self.get(id).map(|n| &n.path)
    }

    /// Depth below the root (root = 0)
    fn depth(&self, id: TreeIndex) -> usize {
        self.ancestors(id).len()
    }

    /// Count materialised children of a node
    fn child_count(&self, id: TreeIndex) -> usize {
        self.children(id).count()
    }

    /// Ancestors from parent to root
    fn ancestors(&self, id: TreeIndex) -> Vec<TreeIndex> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent_id) = current {
            ancestors.push(parent_id);
            current = self.parent(parent_id);
        }
        ancestors
    }

    /// Check if a node is an ancestor of another
    fn is_ancestor_of(&self, ancestor: TreeIndex, descendant: TreeIndex) -> bool {
        let mut current = self.parent(descendant);
        while let Some(parent_id) = current {
            if parent_id == ancestor {
                return true;
            }
            current = self.parent(parent_id);
        }
        false
    }
}

/// Traversal order for walking the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalOrder {
    /// Visit parent before children (top-down)
    PreOrder,
    /// Visit children before parent (bottom-up)
    PostOrder,
    /// Visit level by level
    BreadthFirst,
}

/// Walking and searching, implemented for every [`Tree`]
pub trait TreeTraversal: Tree {
    /// Walk from the root in the specified order
    fn walk(&self, order: TraversalOrder) -> TreeWalker<'_, Self>
    where
        Self: Sized,
    {
        TreeWalker::new(self, self.root(), order)
    }

    /// Walk starting from a specific node (inclusive)
    fn walk_from(&self, start: TreeIndex, order: TraversalOrder) -> TreeWalker<'_, Self>
    where
        Self: Sized,
    {
        TreeWalker::new(self, Some(start), order)
    }

    /// Find nodes matching a predicate
    fn find<F>(&self, predicate: F) -> Vec<TreeIndex>
    where
        F: Fn(&SceneNode) -> bool,
        Self: Sized,
    {
        self.walk(TraversalOrder::PreOrder)
            .filter(|&id| self.get(id).map(&predicate).unwrap_or(false))
            .collect()
    }

    /// Find a materialised node by prim path, descending only along the path
    fn find_by_path(&self, path: &PrimPath) -> Option<TreeIndex> {
        let mut current = self.root()?;
        if !path.has_prefix(self.path(current)?) {
            return None;
        }
        while self.path(current)? != path {
            current = self
                .children(current)
                .find(|&id| self.path(id).map(|p| path.has_prefix(p)).unwrap_or(false))?;
        }
        Some(current)
    }
}

impl<T: Tree> TreeTraversal for T {}

/// Iterator for traversing a tree in different orders
pub struct TreeWalker<'a, T: Tree + ?Sized> {
    tree: &'a T,
    order: TraversalOrder,
    pending: VecDeque<TreeIndex>,
    visited: HashSet<TreeIndex>,
}

impl<'a, T: Tree + ?Sized> TreeWalker<'a, T> {
    /// Create a walker starting at `start` (empty when `None`)
    pub fn new(tree: &'a T, start: Option<TreeIndex>, order: TraversalOrder) -> Self {
        Self {
            tree,
            order,
            pending: start.into_iter().collect(),
            visited: HashSet::new(),
        }
    }

    fn next_preorder(&mut self) -> Option<TreeIndex> {
        let current = self.pending.pop_back()?;

        // Push children in reverse so they pop in order
        let children: Vec<_> = self.tree.children(current).collect();
        self.pending.extend(children.into_iter().rev());

        Some(current)
    }

    fn next_postorder(&mut self) -> Option<TreeIndex> {
        while let Some(&current) = self.pending.back() {
            if self.visited.contains(&current) {
                self.pending.pop_back();
                return Some(current);
            }

            self.visited.insert(current);

            let children: Vec<_> = self.tree.children(current).collect();
            self.pending.extend(children.into_iter().rev());
        }
        None
    }

    fn next_breadthfirst(&mut self) -> Option<TreeIndex> {
        let current = self.pending.pop_front()?;
        self.pending.extend(self.tree.children(current));
        Some(current)
    }
}

impl<'a, T: Tree + ?Sized> Iterator for TreeWalker<'a, T> {
    type Item = TreeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        match self.order {
            TraversalOrder::PreOrder => self.next_preorder(),
            TraversalOrder::PostOrder => self.next_postorder(),
            TraversalOrder::BreadthFirst => self.next_breadthfirst(),
        }
    }
}
