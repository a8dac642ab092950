//! # sfload - CSV fixture loading for Salesforce orgs
//!
//! sfload stages CSV test fixtures and upserts them into a Salesforce org
//! through the sf CLI, ordering hierarchical records so parents land
//! before their children.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐    ┌──────────┐    ┌───────────┐    ┌────────────┐
//! │  CSV File  │───▶│  Codec   │───▶│ Hierarchy │───▶│  sf data   │
//! │ (fixtures) │    │ (parse)  │    │   sort    │    │   upsert   │
//! └────────────┘    └──────────┘    └───────────┘    └────────────┘
//!                                        staged via temp workspace
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sfload::{run, LoadOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let report = run(LoadOptions::default()).await;
//!     println!("All loaded: {}", report.all_successful());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Dataset descriptors and load options
//! - [`codec`] - CSV parsing and serialization
//! - [`hierarchy`] - Parents-before-children ordering
//! - [`writer`] - Batch staging and temp workspace guard
//! - [`upsert`] - sf CLI invocation and response classification
//! - [`pipeline`] - Load orchestration

// Core modules
pub mod config;
pub mod error;

// CSV
pub mod codec;
pub mod hierarchy;

// Staging
pub mod writer;

// sf CLI
pub mod upsert;

// Orchestration
pub mod pipeline;

// Narration
pub mod progress;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{CsvError, CsvResult, PipelineError, PipelineResult, UpsertError, UpsertResult};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::{DatasetConfig, LoadOptions, DATASETS, DATA_DIR, TEMP_DIR};

// =============================================================================
// Re-exports - Codec
// =============================================================================

pub use codec::{parse, parse_bytes, parse_file, serialize, Record, Table};

// =============================================================================
// Re-exports - Hierarchy
// =============================================================================

pub use hierarchy::sort_by_hierarchy;

// =============================================================================
// Re-exports - Staging
// =============================================================================

pub use writer::{write_batch, TempWorkspace};

// =============================================================================
// Re-exports - Upsert
// =============================================================================

pub use upsert::{
    classify_invocation_error, classify_raw_response, default_org_from_list,
    discover_default_org, interpret_response, run_upsert, UpsertOutcome,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    prepare_dataset, run, run_datasets, run_in, DatasetReport, LoadReport, SfCli, Upserter,
};
