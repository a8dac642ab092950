//! Dataset configuration and load options.
//!
//! The dataset list is a compile-time constant: order matters, because
//! referential parents must be loaded before their children (categories
//! before products, types before type/product links).

use once_cell::sync::Lazy;
use std::path::PathBuf;

/// Default directory containing the source CSV fixtures.
pub const DATA_DIR: &str = "test-data";

/// Default directory for staged batch files, removed after the run.
pub const TEMP_DIR: &str = "temp-data-load";

/// Static descriptor of one dataset to load.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Human-readable name used in progress output.
    pub name: &'static str,
    /// Source file name, relative to the data directory.
    pub file: &'static str,
    /// Target Salesforce object API name.
    pub object: &'static str,
    /// External-id field used as the upsert match key.
    pub external_id_field: &'static str,
    /// Parent-reference field to hierarchy-sort on, if any.
    pub parent_field: Option<&'static str>,
}

impl DatasetConfig {
    /// Whether this dataset needs parents-before-children ordering.
    pub fn needs_hierarchy_sort(&self) -> bool {
        self.parent_field.is_some()
    }
}

/// The fixed load sequence. Asset categories are self-referential and go
/// first, hierarchy-sorted; the rest only reference earlier datasets.
pub static DATASETS: Lazy<Vec<DatasetConfig>> = Lazy::new(|| {
    vec![
        DatasetConfig {
            name: "Asset_Categories",
            file: "Asset_Categories.csv",
            object: "Asset_Category__c",
            external_id_field: "External_Id__c",
            parent_field: Some("Parent_Category__c"),
        },
        DatasetConfig {
            name: "Products",
            file: "Products.csv",
            object: "Product2",
            external_id_field: "External_Id__c",
            parent_field: None,
        },
        DatasetConfig {
            name: "Asset_Types",
            file: "Asset_Types.csv",
            object: "Asset_Type__c",
            external_id_field: "External_Id__c",
            parent_field: None,
        },
        DatasetConfig {
            name: "Asset_Type_Products",
            file: "Asset_Type_Products.csv",
            object: "Asset_Type_Product__c",
            external_id_field: "External_Id__c",
            parent_field: None,
        },
    ]
});

/// Options for one pipeline run.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Directory containing the source CSV files.
    pub data_dir: PathBuf,

    /// Directory for staged batch files.
    pub temp_dir: PathBuf,

    /// Org username/alias override. When `None`, the default org is
    /// discovered via `sf org list`.
    pub org: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DATA_DIR),
            temp_dir: PathBuf::from(TEMP_DIR),
            org: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_order() {
        // Categories must come first: products reference them.
        assert_eq!(DATASETS[0].name, "Asset_Categories");
        assert_eq!(DATASETS.len(), 4);
    }

    #[test]
    fn test_only_categories_sorted() {
        let sorted: Vec<&str> = DATASETS
            .iter()
            .filter(|d| d.needs_hierarchy_sort())
            .map(|d| d.name)
            .collect();
        assert_eq!(sorted, vec!["Asset_Categories"]);
    }

    #[test]
    fn test_default_options() {
        let opts = LoadOptions::default();
        assert_eq!(opts.data_dir, PathBuf::from("test-data"));
        assert_eq!(opts.temp_dir, PathBuf::from("temp-data-load"));
        assert!(opts.org.is_none());
    }
}
