use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use creatorid_core::detection::infrastructure::manifest_annotator::ManifestAnnotator;
use creatorid_core::identification::domain::creator_estimate::IdentificationOutcome;
use creatorid_core::identification::domain::creator_identifier::CreatorIdentifier;
use creatorid_core::identification::infrastructure::dbscan_clusterer::DbscanClusterer;
use creatorid_core::identification::infrastructure::grayscale_feature_extractor::GrayscaleFeatureExtractor;
use creatorid_core::identification::infrastructure::pca_reducer::PcaReducer;
use creatorid_core::imaging::infrastructure::image_file_loader::{list_images, ImageFileLoader};
use creatorid_core::pipeline::account_executor::{
    AccountBatch, AccountExecutor, AccountReport, SendError, SequentialAccountExecutor,
    UseCaseFactory,
};
use creatorid_core::pipeline::identify_creator_use_case::IdentifyCreatorUseCase;
use creatorid_core::pipeline::infrastructure::threaded_account_executor::ThreadedAccountExecutor;
use creatorid_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use creatorid_core::shared::config::IdentificationConfig;
use creatorid_core::shared::constants::ANNOTATION_MANIFEST_NAME;

const PROGRESS_THROTTLE_IMAGES: usize = 10;

/// Estimate the age and gender of the person behind each account's images.
///
/// INPUT is either one account directory holding images, or a directory of
/// account directories. Detections and age/gender predictions are read from
/// an `annotations.json` file inside each account directory.
#[derive(Parser)]
#[command(name = "creatorid")]
struct Cli {
    /// Account directory, or a directory of account directories.
    input: PathBuf,

    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Clustering neighbourhood radius in feature-space units.
    #[arg(long)]
    eps: Option<f64>,

    /// Points needed within eps to seed a cluster (1 = no noise).
    #[arg(long)]
    min_samples: Option<usize>,

    /// Images sent to the detector per group.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Accounts processed in parallel.
    #[arg(long, default_value = "1")]
    jobs: usize,

    /// Write all reports to this file as a JSON array.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = load_config(&cli)?;
    let accounts = discover_accounts(&cli.input)?;
    if accounts.is_empty() {
        return Err(format!("No accounts found in {}", cli.input.display()).into());
    }
    log::info!("Found {} account(s) in {}", accounts.len(), cli.input.display());

    let mut batches = Vec::with_capacity(accounts.len());
    let mut dirs = HashMap::new();
    for (account_id, dir) in accounts {
        batches.push(AccountBatch::new(account_id.clone(), list_images(&dir)?));
        dirs.insert(account_id, dir);
    }

    let factory = build_factory(config, dirs);
    let executor: Box<dyn AccountExecutor> = if cli.jobs > 1 {
        Box::new(ThreadedAccountExecutor::new(factory, cli.jobs))
    } else {
        Box::new(SequentialAccountExecutor::new(factory))
    };

    let reports = executor.run(batches);
    for report in &reports {
        println!("{}", describe(report));
    }

    if let Some(path) = &cli.output {
        fs::write(path, serde_json::to_string_pretty(&reports)?)?;
        log::info!("Wrote {} report(s) to {}", reports.len(), path.display());
    }

    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.is_dir() {
        return Err(format!("Input directory not found: {}", cli.input.display()).into());
    }
    if cli.jobs == 0 {
        return Err("Jobs must be at least 1".into());
    }
    if let Some(path) = &cli.config {
        if !path.is_file() {
            return Err(format!("Config file not found: {}", path.display()).into());
        }
    }
    Ok(())
}

/// File values first, then flag overrides, validated together.
fn load_config(cli: &Cli) -> Result<IdentificationConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => IdentificationConfig::from_json_file(path)?,
        None => IdentificationConfig::default(),
    };
    if let Some(eps) = cli.eps {
        config.eps = eps;
    }
    if let Some(min_samples) = cli.min_samples {
        config.min_samples = min_samples;
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    config.validate()?;
    Ok(config)
}

/// Returns `(account_id, directory)` pairs sorted by id.
///
/// A directory that holds images directly is a single account named after
/// itself; otherwise each subdirectory is one account.
fn discover_accounts(input: &Path) -> Result<Vec<(String, PathBuf)>, Box<dyn std::error::Error>> {
    if !list_images(input)?.is_empty() {
        return Ok(vec![(dir_name(input), input.to_path_buf())]);
    }

    let mut accounts: Vec<(String, PathBuf)> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .map(|path| (dir_name(&path), path))
        .collect();
    accounts.sort();
    Ok(accounts)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn build_factory(config: IdentificationConfig, dirs: HashMap<String, PathBuf>) -> UseCaseFactory {
    Arc::new(move |batch: &AccountBatch| -> Result<IdentifyCreatorUseCase, SendError> {
        let annotator = match dirs.get(&batch.account_id) {
            Some(dir) if dir.join(ANNOTATION_MANIFEST_NAME).is_file() => {
                ManifestAnnotator::from_file(&dir.join(ANNOTATION_MANIFEST_NAME))?
            }
            _ => {
                log::warn!(
                    "{}: no {ANNOTATION_MANIFEST_NAME}, every image will have zero faces",
                    batch.account_id
                );
                ManifestAnnotator::empty()
            }
        };

        Ok(IdentifyCreatorUseCase::new(
            Box::new(ImageFileLoader::new()),
            Box::new(annotator.clone()),
            Box::new(annotator),
            Box::new(GrayscaleFeatureExtractor::new(config.crop_size)),
            CreatorIdentifier::new(
                Box::new(PcaReducer::new(
                    config.max_components,
                    config.reduction_threshold,
                )),
                Box::new(DbscanClusterer::new(config.eps, config.min_samples)),
            ),
            config.batch_size,
            Box::new(StdoutPipelineLogger::new(
                batch.account_id.clone(),
                PROGRESS_THROTTLE_IMAGES,
            )),
        ))
    })
}

fn describe(report: &AccountReport) -> String {
    match report {
        AccountReport::Finished(IdentificationOutcome::Identified(estimate)) => format!(
            "{}: age {:.1}, {} ({}/{} faces, {} identities)",
            estimate.account_id,
            estimate.age,
            estimate.gender,
            estimate.appearances,
            estimate.total_faces,
            estimate.identities
        ),
        AccountReport::Finished(IdentificationOutcome::NoResult { account_id, reason }) => {
            format!("{account_id}: no result ({reason:?})")
        }
        AccountReport::Failed { account_id, error } => format!("{account_id}: failed: {error}"),
    }
}
