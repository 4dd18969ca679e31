//! Forest rendering as box-drawing text trees.

use std::collections::HashMap;
use std::fmt;

use generational_arena::Index;
use itertools::Itertools;
use serde::Serialize;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{ForestArena, TreeNode};
use crate::domain::entities::{Employee, Group, HierarchyRecord};

/// Label used when every display-name extractor comes up blank.
pub const UNNAMED: &str = "(Unnamed)";

/// Tag appended to nodes that have children in the reporting-line forest.
pub const MANAGER_TAG: &str = "[Manager]";

/// Extracts a candidate display name from a record.
pub type NameExtractor<T> = fn(&T) -> Option<String>;

/// Ordered display-name fallbacks; the first non-blank candidate wins.
#[derive(Clone)]
pub struct DisplayNameChain<T> {
    extractors: Vec<NameExtractor<T>>,
    placeholder: String,
}

impl<T> fmt::Debug for DisplayNameChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayNameChain")
            .field("extractors", &self.extractors.len())
            .field("placeholder", &self.placeholder)
            .finish()
    }
}

impl<T> Default for DisplayNameChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DisplayNameChain<T> {
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
            placeholder: UNNAMED.to_string(),
        }
    }

    /// Append the next fallback.
    pub fn then(mut self, extractor: NameExtractor<T>) -> Self {
        self.extractors.push(extractor);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn resolve(&self, record: &T) -> String {
        self.extractors
            .iter()
            .filter_map(|extract| extract(record))
            .map(|name| name.trim().to_string())
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| self.placeholder.clone())
    }
}

/// Group names: name, then remote id, then id.
pub fn group_name_chain() -> DisplayNameChain<Group> {
    DisplayNameChain::<Group>::new()
        .then(|g| g.name.clone())
        .then(|g| g.remote_id.clone())
        .then(|g| Some(g.id.clone()))
}

/// Employee names: full name, first + last, work email, personal email, id.
pub fn employee_name_chain() -> DisplayNameChain<Employee> {
    DisplayNameChain::<Employee>::new()
        .then(|e| e.display_full_name.clone())
        .then(|e| {
            let joined = [e.first_name.as_deref(), e.last_name.as_deref()]
                .into_iter()
                .flatten()
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .join(" ");
            Some(joined)
        })
        .then(|e| e.work_email.clone())
        .then(|e| e.personal_email.clone())
        .then(|e| Some(e.id.clone()))
}

/// Root and node counts of one forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ForestSummary {
    pub root_count: usize,
    pub node_count: usize,
}

impl ForestSummary {
    /// Counts every node reached by a pre-order walk from the roots.
    pub fn of<T>(forest: &ForestArena<T>) -> Self {
        Self {
            root_count: forest.roots().len(),
            node_count: forest.iter().count(),
        }
    }
}

/// Renders forests as `├──`/`└──` trees, one blank line between trees.
#[derive(Debug, Clone)]
pub struct ForestRenderer<T> {
    names: DisplayNameChain<T>,
    branch_tag: Option<String>,
    empty_placeholder: String,
}

impl<T: HierarchyRecord> ForestRenderer<T> {
    pub fn new(names: DisplayNameChain<T>, empty_placeholder: impl Into<String>) -> Self {
        Self {
            names,
            branch_tag: None,
            empty_placeholder: empty_placeholder.into(),
        }
    }

    /// Tag nodes with children, e.g. `[Manager]`.
    pub fn with_branch_tag(mut self, tag: impl Into<String>) -> Self {
        self.branch_tag = Some(tag.into());
        self
    }

    /// `<display-name> [<tag>] [<id>]`
    pub fn label(&self, node: &TreeNode<T>) -> String {
        let name = self.names.resolve(&node.data);
        match &self.branch_tag {
            Some(tag) if node.is_branch() => {
                format!("{} {} [{}]", name, tag, node.data.record_id())
            }
            _ => format!("{} [{}]", name, node.data.record_id()),
        }
    }

    #[instrument(level = "debug", skip_all, fields(nodes = forest.len()))]
    pub fn render(&self, forest: &ForestArena<T>) -> String {
        if forest.is_empty() {
            return format!("{}\n", self.empty_placeholder);
        }
        forest
            .roots()
            .iter()
            .map(|&root| self.to_tree(forest, root).to_string())
            .join("\n")
    }

    /// Assemble the termtree for one root bottom-up from a post-order walk.
    pub fn to_tree(&self, forest: &ForestArena<T>, root: Index) -> Tree<String> {
        let mut built: HashMap<Index, Tree<String>> = HashMap::new();
        for (idx, node) in forest.iter_postorder_from(root) {
            let leaves: Vec<Tree<String>> = node
                .children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(idx, Tree::new(self.label(node)).with_leaves(leaves));
        }
        built
            .remove(&root)
            .unwrap_or_else(|| Tree::new(self.empty_placeholder.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(id: &str, first: &str, last: &str, manager: Option<&str>) -> Employee {
        Employee {
            id: id.into(),
            first_name: Some(first.into()),
            last_name: Some(last.into()),
            manager: manager.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn given_blank_candidates_when_resolving_then_falls_through_chain() {
        let chain = employee_name_chain();

        let mut e = employee("e1", " ", "", None);
        e.display_full_name = Some("   ".into());
        e.personal_email = Some("me@home.example".into());
        assert_eq!(chain.resolve(&e), "me@home.example");

        let only_last = employee("e2", "", "Doe", None);
        assert_eq!(chain.resolve(&only_last), "Doe");

        let nothing = DisplayNameChain::<Employee>::new().then(|e| e.work_email.clone());
        assert_eq!(nothing.resolve(&only_last), UNNAMED);
    }

    #[test]
    fn given_group_without_name_when_resolving_then_uses_remote_id() {
        let group = Group {
            id: "g1".into(),
            remote_id: Some("R-17".into()),
            ..Default::default()
        };
        assert_eq!(group_name_chain().resolve(&group), "R-17");
    }

    #[test]
    fn given_manager_forest_when_rendering_then_tags_branches() {
        let mut forest = ForestArena::new();
        let boss = forest.insert_node(employee("b", "Ada", "Lovelace", None), None);
        let lead = forest.insert_node(employee("l", "Grace", "Hopper", Some("b")), Some(boss));
        forest.insert_node(employee("d1", "Alan", "Turing", Some("l")), Some(lead));
        forest.insert_node(employee("d2", "Edsger", "Dijkstra", Some("b")), Some(boss));

        let renderer = ForestRenderer::new(employee_name_chain(), "(No employees)")
            .with_branch_tag(MANAGER_TAG);

        let expected = "\
Ada Lovelace [Manager] [b]
├── Grace Hopper [Manager] [l]
│   └── Alan Turing [d1]
└── Edsger Dijkstra [d2]
";
        assert_eq!(renderer.render(&forest), expected);
    }

    #[test]
    fn given_empty_forest_when_rendering_then_prints_placeholder() {
        let forest: ForestArena<Group> = ForestArena::new();
        let renderer = ForestRenderer::new(group_name_chain(), "(No groups)");
        assert_eq!(renderer.render(&forest), "(No groups)\n");
        assert_eq!(ForestSummary::of(&forest), ForestSummary::default());
    }
}
