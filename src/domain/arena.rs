use generational_arena::{Arena, Index};
use tracing::instrument;

/// Tree node in the arena-based forest.
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    /// Record carried by this node
    pub data: T,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in input order
    pub children: Vec<Index>,
}

impl<T> TreeNode<T> {
    /// True iff the node has at least one child.
    pub fn is_branch(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena-based forest of independent trees.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Nodes own no pointers to each other, only indices, so the whole forest is
/// dropped at once.
#[derive(Debug, Clone)]
pub struct ForestArena<T> {
    arena: Arena<TreeNode<T>>,
    roots: Vec<Index>,
}

impl<T> Default for ForestArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ForestArena<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    /// Insert a node; `None` as parent makes it the next root.
    pub fn insert_node(&mut self, data: T, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode<T>> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes across all trees.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Pre-order traversal over every tree, roots in order.
    pub fn iter(&self) -> PreOrderIterator<'_, T> {
        PreOrderIterator::new(self, self.roots.iter().rev().copied().collect())
    }

    /// Pre-order traversal of the tree rooted at `root`.
    pub fn iter_from(&self, root: Index) -> PreOrderIterator<'_, T> {
        PreOrderIterator::new(self, vec![root])
    }

    /// Post-order traversal of the tree rooted at `root`.
    pub fn iter_postorder_from(&self, root: Index) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self, root)
    }

    /// Depth of the deepest tree; a lone root has depth 1.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(Index, usize)> = self.roots.iter().map(|&r| (r, 1)).collect();
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.get_node(idx) {
                stack.extend(node.children.iter().map(|&c| (c, depth + 1)));
            }
        }
        max_depth
    }
}

pub struct PreOrderIterator<'a, T> {
    arena: &'a ForestArena<T>,
    stack: Vec<Index>,
}

impl<'a, T> PreOrderIterator<'a, T> {
    fn new(arena: &'a ForestArena<T>, stack: Vec<Index>) -> Self {
        Self { arena, stack }
    }
}

impl<'a, T> Iterator for PreOrderIterator<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a, T> {
    arena: &'a ForestArena<T>,
    stack: Vec<(Index, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(arena: &'a ForestArena<T>, root: Index) -> Self {
        Self {
            arena,
            stack: vec![(root, false)],
        }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
