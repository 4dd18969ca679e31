//! Hierarchy service
//!
//! Builds group forests (one per group type) and the reporting-line forest,
//! and renders them as text trees with summary lines.

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::domain::arena::ForestArena;
use crate::domain::builder::{ForestBuilder, Partitions};
use crate::domain::entities::{Employee, Group, HierarchyRecord};
use crate::domain::render::{
    employee_name_chain, group_name_chain, ForestRenderer, ForestSummary, MANAGER_TAG,
};

const NO_GROUPS: &str = "(No groups)";
const NO_EMPLOYEES: &str = "(No employees)";

/// Service for reconstructing and rendering HRIS hierarchies.
pub struct HierarchyService {
    builder: ForestBuilder,
    groups: ForestRenderer<Group>,
    employees: ForestRenderer<Employee>,
}

impl Default for HierarchyService {
    fn default() -> Self {
        Self::new(ForestBuilder::new())
    }
}

impl HierarchyService {
    pub fn new(builder: ForestBuilder) -> Self {
        Self {
            builder,
            groups: ForestRenderer::new(group_name_chain(), NO_GROUPS),
            employees: ForestRenderer::new(employee_name_chain(), NO_EMPLOYEES)
                .with_branch_tag(MANAGER_TAG),
        }
    }

    /// One forest per group type.
    ///
    /// `types` restricts the result to the named partitions (case-insensitive).
    /// The restriction is applied after building, so a group whose parent has
    /// a filtered-out type is still a root of its own partition.
    #[instrument(level = "debug", skip_all, fields(group_count = groups.len()))]
    pub fn group_forests(
        &self,
        groups: &[Group],
        types: &[String],
    ) -> ApplicationResult<Partitions<Group>> {
        let mut partitions = self.builder.build_partitioned(groups)?;
        if !types.is_empty() {
            partitions.retain(|name, _| types.iter().any(|t| t.eq_ignore_ascii_case(name)));
        }
        info!(partitions = partitions.len(), "built group forests");
        Ok(partitions)
    }

    /// Reporting-line forest, rooted at employees without a known manager.
    #[instrument(level = "debug", skip_all, fields(employee_count = employees.len()))]
    pub fn employee_forest(
        &self,
        employees: &[Employee],
    ) -> ApplicationResult<ForestArena<Employee>> {
        let forest = self.builder.build_forest(employees)?;
        info!(roots = forest.roots().len(), "built reporting lines");
        Ok(forest)
    }

    /// Render every partition as `== TYPE ==`, its trees and a summary line.
    pub fn render_groups(&self, partitions: &Partitions<Group>) -> String {
        if partitions.is_empty() {
            let empty = ForestArena::new();
            return self.render_section(&self.groups, &empty, "groups");
        }
        partitions
            .iter()
            .map(|(name, forest)| {
                debug!(partition = %name, "rendering partition");
                format!(
                    "== {} ==\n{}",
                    name,
                    self.render_section(&self.groups, forest, "groups")
                )
            })
            .join("\n")
    }

    pub fn render_employees(&self, forest: &ForestArena<Employee>) -> String {
        self.render_section(&self.employees, forest, "employees")
    }

    fn render_section<T: HierarchyRecord>(
        &self,
        renderer: &ForestRenderer<T>,
        forest: &ForestArena<T>,
        noun: &str,
    ) -> String {
        let summary = ForestSummary::of(forest);
        format!(
            "{}Roots: {}, Total {}: {}\n",
            renderer.render(forest),
            summary.root_count,
            noun,
            summary.node_count
        )
    }
}
