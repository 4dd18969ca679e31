//! Record and mapping-table loading
//!
//! Input files hold records in the aggregator's wire shape: a bare JSON array,
//! a single page object `{ "next": ..., "results": [...] }`, or an array of
//! such pages (one per fetched page).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, InfraResult};

/// Subdirectory searched for mapping tables below the working directory.
pub const MAPPING_SUBDIR: &str = "payroll";

/// One fetched page; the `next` cursor is irrelevant once pages are on disk.
#[derive(Debug, Deserialize)]
struct Page<T> {
    results: Vec<T>,
}

fn is_page(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.contains_key("results"))
}

/// Decode records from any of the supported input shapes.
pub fn decode_records<T: DeserializeOwned>(content: &str, origin: &str) -> InfraResult<Vec<T>> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| InfraError::decode(origin.to_string(), e))?;

    let records = match value {
        Value::Array(items) if !items.is_empty() && items.iter().all(is_page) => {
            let pages: Vec<Page<T>> = serde_json::from_value(Value::Array(items))
                .map_err(|e| InfraError::decode(format!("{origin} (pages)"), e))?;
            debug!(pages = pages.len(), "decoded paginated input");
            pages.into_iter().flat_map(|page| page.results).collect()
        }
        value if is_page(&value) => {
            let page: Page<T> = serde_json::from_value(value)
                .map_err(|e| InfraError::decode(format!("{origin} (page)"), e))?;
            page.results
        }
        value => serde_json::from_value(value)
            .map_err(|e| InfraError::decode(origin.to_string(), e))?,
    };
    Ok(records)
}

/// Loads record files and code mapping tables through a [`FileSystem`].
pub struct RecordLoader {
    fs: Arc<dyn FileSystem>,
}

impl RecordLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read and decode a record file.
    #[instrument(level = "debug", skip(self))]
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> InfraResult<Vec<T>> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("read records {}", path.display()), e))?;
        let records: Vec<T> = decode_records(&content, &path.display().to_string())?;
        info!(path = %path.display(), count = records.len(), "loaded records");
        Ok(records)
    }

    /// Candidate locations of a mapping table, in search order.
    pub fn mapping_candidates(name: &Path, cwd: &Path) -> Vec<PathBuf> {
        let mut candidates = vec![name.to_path_buf()];
        if name.is_relative() {
            candidates.push(cwd.join(name));
            candidates.push(cwd.join(MAPPING_SUBDIR).join(name));
        }
        candidates.dedup();
        candidates
    }

    /// Load a `{ code: value }` table from the first existing candidate.
    ///
    /// A table found nowhere is empty: codes then fall back to themselves
    /// (labels) or to the fallback category.
    #[instrument(level = "debug", skip(self))]
    pub fn load_mapping(&self, name: &Path, cwd: &Path) -> InfraResult<HashMap<String, String>> {
        let Some(path) = Self::mapping_candidates(name, cwd)
            .into_iter()
            .find(|candidate| self.fs.is_file(candidate))
        else {
            warn!(name = %name.display(), "mapping table not found, using empty table");
            return Ok(HashMap::new());
        };

        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|e| InfraError::io(format!("read mapping {}", path.display()), e))?;
        let table: HashMap<String, String> = serde_json::from_str(&content)
            .map_err(|e| InfraError::decode(path.display().to_string(), e))?;
        debug!(path = %path.display(), entries = table.len(), "loaded mapping table");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Group;

    #[test]
    fn given_bare_array_when_decoding_then_returns_records() {
        let groups: Vec<Group> =
            decode_records(r#"[{"id": "a"}, {"id": "b", "parent_group": "a"}]"#, "inline")
                .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].parent_group.as_deref(), Some("a"));
    }

    #[test]
    fn given_page_array_when_decoding_then_concatenates_results() {
        let content = r#"[
            {"next": "cursor-2", "results": [{"id": "a"}]},
            {"next": null, "results": [{"id": "b"}, {"id": "c"}]}
        ]"#;
        let groups: Vec<Group> = decode_records(content, "inline").unwrap();
        let ids: Vec<_> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn given_malformed_json_when_decoding_then_reports_origin() {
        let err = decode_records::<Group>("{not json", "groups.json").unwrap_err();
        assert!(matches!(err, InfraError::Decode { .. }));
        assert!(err.to_string().contains("groups.json"), "{err}");
    }

    #[test]
    fn given_relative_name_when_listing_candidates_then_searches_cwd_and_payroll() {
        let cwd = Path::new("/work");
        let candidates = RecordLoader::mapping_candidates(Path::new("labels.json"), cwd);
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("labels.json"),
                PathBuf::from("/work/labels.json"),
                PathBuf::from("/work/payroll/labels.json"),
            ]
        );

        let absolute = RecordLoader::mapping_candidates(Path::new("/etc/labels.json"), cwd);
        assert_eq!(absolute, vec![PathBuf::from("/etc/labels.json")]);
    }
}
