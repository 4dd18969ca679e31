//! Forest builder: reconstructs hierarchies from flat, parent-referencing records.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, instrument, warn};

use crate::domain::arena::ForestArena;
use crate::domain::entities::{HierarchyRecord, UNKNOWN_PARTITION};
use crate::domain::error::DomainError;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Partition name to forest, ordered by partition name.
pub type Partitions<T> = BTreeMap<String, ForestArena<T>>;

/// Constructs forests from records implementing [`HierarchyRecord`].
///
/// Root rule within a partition P: a record is a root if it has no parent
/// reference, if the reference does not resolve to a known id, or if the
/// referenced record belongs to a partition other than P. Every input record
/// ends up in exactly one tree of exactly one partition.
///
/// Ids are expected to be unique. On duplicates the last occurrence wins the
/// parent lookup; earlier occurrences still appear as nodes, but never
/// receive children.
#[derive(Debug, Clone)]
pub struct ForestBuilder {
    unknown_partition: String,
}

impl Default for ForestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self {
            unknown_partition: UNKNOWN_PARTITION.to_string(),
        }
    }

    /// Partition name used for records without a partition key.
    pub fn with_unknown_partition(mut self, name: impl Into<String>) -> Self {
        self.unknown_partition = name.into();
        self
    }

    /// Build one forest per distinct partition key.
    pub fn build_partitioned<T>(&self, records: &[T]) -> TreeResult<Partitions<T>>
    where
        T: HierarchyRecord + Clone,
    {
        let partition_of: Vec<&str> = records
            .iter()
            .map(|r| r.partition_key().unwrap_or(self.unknown_partition.as_str()))
            .collect();
        self.build_with(records, &partition_of)
    }

    /// Build a single forest, ignoring partition keys.
    pub fn build_forest<T>(&self, records: &[T]) -> TreeResult<ForestArena<T>>
    where
        T: HierarchyRecord + Clone,
    {
        let partition_of = vec![""; records.len()];
        let mut partitions = self.build_with(records, &partition_of)?;
        Ok(partitions.remove("").unwrap_or_default())
    }

    #[instrument(level = "debug", skip_all, fields(record_count = records.len()))]
    fn build_with<T>(&self, records: &[T], partition_of: &[&str]) -> TreeResult<Partitions<T>>
    where
        T: HierarchyRecord + Clone,
    {
        let mut by_id: HashMap<&str, usize> = HashMap::with_capacity(records.len());
        let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut members: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

        for (pos, record) in records.iter().enumerate() {
            if let Some(previous) = by_id.insert(record.record_id(), pos) {
                warn!(
                    id = record.record_id(),
                    previous, pos, "duplicate record id, last occurrence wins"
                );
            }
            if let Some(parent) = record.parent_ref() {
                children.entry(parent).or_default().push(pos);
            }
            members.entry(partition_of[pos]).or_default().push(pos);
        }

        let resolve_parent = |pos: usize| -> Option<usize> {
            let parent = records[pos].parent_ref()?;
            by_id.get(parent).copied()
        };
        let is_root = |pos: usize| match resolve_parent(pos) {
            None => true,
            Some(parent_pos) => partition_of[parent_pos] != partition_of[pos],
        };

        let mut partitions = Partitions::new();
        for (partition, positions) in members {
            let mut forest = ForestArena::new();
            let mut visited: HashSet<usize> = HashSet::with_capacity(positions.len());

            for &root in positions.iter().filter(|&&pos| is_root(pos)) {
                let mut stack = vec![(root, None)];

                while let Some((pos, parent_idx)) = stack.pop() {
                    let record = &records[pos];
                    if !visited.insert(pos) {
                        return Err(DomainError::CycleDetected {
                            partition: partition.to_string(),
                            path: vec![record.record_id().to_string()],
                        });
                    }

                    let idx = forest.insert_node(record.clone(), parent_idx);

                    // Children hang off the record the id resolves to
                    if by_id.get(record.record_id()) != Some(&pos) {
                        continue;
                    }
                    if let Some(kids) = children.get(record.record_id()) {
                        // Reverse so siblings pop in input order
                        for &kid in kids.iter().rev() {
                            if partition_of[kid] == partition {
                                stack.push((kid, Some(idx)));
                            }
                        }
                    }
                }
            }

            if let Some(&stranded) = positions.iter().find(|&&pos| !visited.contains(&pos)) {
                let path = trace_cycle(records, stranded, &resolve_parent);
                return Err(DomainError::CycleDetected {
                    partition: partition.to_string(),
                    path,
                });
            }

            debug!(
                partition,
                roots = forest.roots().len(),
                nodes = forest.len(),
                "built forest"
            );
            partitions.insert(partition.to_string(), forest);
        }

        Ok(partitions)
    }
}

/// Follow parent references from `start` until an id repeats.
///
/// Returns the ids along the cycle with the first one repeated at the end.
fn trace_cycle<T, F>(records: &[T], start: usize, resolve_parent: F) -> Vec<String>
where
    T: HierarchyRecord,
    F: Fn(usize) -> Option<usize>,
{
    let mut chain: Vec<usize> = Vec::new();
    let mut seen: HashMap<usize, usize> = HashMap::new();
    let mut current = Some(start);

    while let Some(pos) = current {
        if let Some(&cycle_start) = seen.get(&pos) {
            let mut path: Vec<String> = chain[cycle_start..]
                .iter()
                .map(|&p| records[p].record_id().to_string())
                .collect();
            path.push(records[pos].record_id().to_string());
            return path;
        }
        seen.insert(pos, chain.len());
        chain.push(pos);
        current = resolve_parent(pos);
    }

    chain
        .iter()
        .map(|&p| records[p].record_id().to_string())
        .collect()
}
