//! Pipeline orchestration: drive every dataset through
//! read → parse → (sort) → stage → upsert, with failure isolation.
//!
//! Each dataset is attempted exactly once; any per-dataset error is
//! converted into a failed [`DatasetReport`] and the loop moves on, so a
//! missing fixture or a rejected upsert never blocks the datasets after
//! it. The aggregate verdict is a pure fold over the per-dataset reports.

use std::path::{Path, PathBuf};

use crate::codec;
use crate::config::{DatasetConfig, LoadOptions, DATASETS};
use crate::error::{PipelineError, PipelineResult, UpsertResult};
use crate::hierarchy::sort_by_hierarchy;
use crate::progress::{log_error, log_info};
use crate::upsert::{discover_default_org, report_outcome, run_upsert, UpsertOutcome};
use crate::writer::{write_batch, TempWorkspace};

/// Seam between the load loop and the sf CLI, so the loop is testable
/// without a Salesforce org.
#[allow(async_fn_in_trait)]
pub trait Upserter {
    async fn upsert(
        &self,
        config: &DatasetConfig,
        batch_file: &Path,
    ) -> UpsertResult<UpsertOutcome>;
}

/// The real executor: shells out to `sf data upsert`.
pub struct SfCli {
    /// Org username to target; `None` lets the CLI pick (and prompt).
    pub org: Option<String>,
}

impl Upserter for SfCli {
    async fn upsert(
        &self,
        config: &DatasetConfig,
        batch_file: &Path,
    ) -> UpsertResult<UpsertOutcome> {
        run_upsert(config, batch_file, self.org.as_deref()).await
    }
}

/// Outcome of one dataset's run.
#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub name: &'static str,
    pub success: bool,
    /// Error text for failed datasets.
    pub detail: Option<String>,
}

/// Aggregate outcome of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub datasets: Vec<DatasetReport>,
}

impl LoadReport {
    /// Overall success: every dataset's flag is true.
    pub fn all_successful(&self) -> bool {
        self.datasets.iter().all(|d| d.success)
    }

    pub fn failed_names(&self) -> Vec<&'static str> {
        self.datasets
            .iter()
            .filter(|d| !d.success)
            .map(|d| d.name)
            .collect()
    }
}

/// Stage one dataset: read its source CSV, hierarchy-sort if configured,
/// and write the batch file into the workspace.
///
/// Returns `Ok(None)` for a zero-record dataset: nothing staged, nothing
/// to upsert, the dataset still counts as handled.
pub fn prepare_dataset(
    config: &DatasetConfig,
    data_dir: &Path,
    workspace: &TempWorkspace,
) -> PipelineResult<Option<PathBuf>> {
    let source = data_dir.join(config.file);
    if !source.exists() {
        return Err(PipelineError::MissingSource(source));
    }

    log_info(format!("📖 Reading {}...", source.display()));
    let mut table = codec::parse_file(&source)?;
    log_info(format!("   Found {} records", table.len()));

    if let Some(parent_field) = config.parent_field {
        log_info("🔄 Sorting records by hierarchy...");
        table.records = sort_by_hierarchy(table.records, parent_field, config.external_id_field);
        log_info(format!("   Sorted {} records by hierarchy", table.len()));
    }

    let batch_file = workspace.batch_path(config.file);
    if write_batch(&table, &batch_file)? {
        Ok(Some(batch_file))
    } else {
        Ok(None)
    }
}

async fn load_dataset<U: Upserter>(
    config: &DatasetConfig,
    data_dir: &Path,
    workspace: &TempWorkspace,
    upserter: &U,
) -> PipelineResult<()> {
    let Some(batch_file) = prepare_dataset(config, data_dir, workspace)? else {
        return Ok(());
    };

    let outcome = upserter.upsert(config, &batch_file).await?;
    report_outcome(config, &outcome);
    Ok(())
}

/// Run a list of dataset configs in order, one attempt each.
pub async fn run_datasets<U: Upserter>(
    configs: &[DatasetConfig],
    options: &LoadOptions,
    workspace: &TempWorkspace,
    upserter: &U,
) -> LoadReport {
    let mut report = LoadReport::default();

    for config in configs {
        log_info(format!("\n📋 Processing {}...", config.name));

        let dataset = match load_dataset(config, &options.data_dir, workspace, upserter).await {
            Ok(()) => DatasetReport {
                name: config.name,
                success: true,
                detail: None,
            },
            Err(e) => {
                log_error(e.to_string());
                DatasetReport {
                    name: config.name,
                    success: false,
                    detail: Some(e.to_string()),
                }
            }
        };
        report.datasets.push(dataset);
    }

    report
}

/// Run the fixed dataset sequence against the org, resolving the target
/// org first (explicit override, else `sf org list` discovery). The
/// caller owns the workspace so cleanup also covers signal shutdown.
pub async fn run_in(options: &LoadOptions, workspace: &TempWorkspace) -> LoadReport {
    let org = match options.org.clone() {
        Some(org) => Some(org),
        None => discover_default_org().await,
    };
    let upserter = SfCli { org };
    run_datasets(&DATASETS, options, workspace, &upserter).await
}

/// Convenience entry point: owns the workspace and cleans it up before
/// returning.
pub async fn run(options: LoadOptions) -> LoadReport {
    let mut workspace = TempWorkspace::new(&options.temp_dir);
    let report = run_in(&options, &workspace).await;
    workspace.cleanup();
    report
}
