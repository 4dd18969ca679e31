//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::{HierarchyService, PayrollService};
use crate::config::Settings;
use crate::domain::builder::ForestBuilder;
use crate::domain::earnings::{DateFilter, EarningsLookup};
use crate::infrastructure::records::RecordLoader;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraResult;

/// Container holding settings, I/O boundaries and service factories.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Record and mapping-table loader
    pub records: RecordLoader,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let records = RecordLoader::new(Arc::clone(&fs));

        Self {
            settings,
            fs,
            records,
        }
    }

    pub fn hierarchy_service(&self) -> HierarchyService {
        HierarchyService::new(
            ForestBuilder::new().with_unknown_partition(self.settings.unknown_partition.clone()),
        )
    }

    /// Build a payroll service; explicit table paths and filter override settings.
    pub fn payroll_service(
        &self,
        label_map: Option<&Path>,
        category_map: Option<&Path>,
        date_filter: Option<DateFilter>,
        cwd: &Path,
    ) -> InfraResult<PayrollService> {
        let labels = self
            .records
            .load_mapping(label_map.unwrap_or(&self.settings.label_map), cwd)?;
        let categories = self
            .records
            .load_mapping(category_map.unwrap_or(&self.settings.category_map), cwd)?;
        let lookup = EarningsLookup::new(labels, categories, &self.settings.fallback_category);

        Ok(PayrollService::new(
            lookup,
            date_filter.unwrap_or(self.settings.date_filter),
        ))
    }
}
