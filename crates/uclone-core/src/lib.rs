use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod admission;
pub mod engine;
pub mod redirects;
pub mod renamer;
pub mod stats;

pub use admission::{Admission, AdmissionPolicy};
pub use engine::{CloneReport, FileClass, Progress, TreeCopyEngine, Whitelists};
pub use redirects::{RedirectRecord, RedirectSynthesizer, ENGINE_CONFIG_FILE};
pub use renamer::ProjectRenamer;
pub use stats::TreeStats;

/// Conditions that end a clone. Per-directory conflicts and per-file failures
/// never surface here; they are logged and counted in the [`CloneReport`].
#[derive(thiserror::Error, Debug)]
pub enum CloneError {
    #[error("Preflight check failed: {message}")]
    Preflight { message: String },
    #[error("Unable to prepare target directory {path:?}: {source}")]
    TargetRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Walk failed at {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl CloneError {
    fn preflight(message: impl Into<String>) -> Self {
        CloneError::Preflight {
            message: message.into(),
        }
    }
}

/// What to clone and how to rename it.
#[derive(Debug, Clone)]
pub struct CloneRequest {
    pub source_dir: PathBuf,
    pub source_name: String,
    pub target_dir: PathBuf,
    pub target_name: String,
    pub whitelists: Whitelists,
}

impl CloneRequest {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        source_name: &str,
        target_dir: impl Into<PathBuf>,
        target_name: &str,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            source_name: source_name.to_string(),
            target_dir: target_dir.into(),
            target_name: target_name.to_string(),
            whitelists: Whitelists::default(),
        }
    }

    pub fn with_whitelists(mut self, whitelists: Whitelists) -> Self {
        self.whitelists = whitelists;
        self
    }

    /// Checks everything that can be checked without touching the target.
    pub fn validate(&self) -> Result<(), CloneError> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(CloneError::preflight("Source directory cannot be empty"));
        }
        if self.source_name.is_empty() {
            return Err(CloneError::preflight("Source project name cannot be empty"));
        }
        if self.target_dir.as_os_str().is_empty() {
            return Err(CloneError::preflight("Target directory cannot be empty"));
        }
        if self.target_name.is_empty() {
            return Err(CloneError::preflight("Target project name cannot be empty"));
        }
        if !self.source_dir.is_dir() {
            return Err(CloneError::preflight(format!(
                "Source directory does not exist or is not a directory: {:?}",
                self.source_dir
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CloneOptions {
    /// Remove an existing target directory instead of refusing to run.
    pub force_delete: bool,
    pub dry_run: bool,
}

/// Clones `request.source_dir` into `request.target_dir`, renaming the project
/// along the way.
///
/// Only preflight failures, failures to prepare the target root and failures
/// of the walk itself are returned as errors.
pub fn clone_project(
    request: &CloneRequest,
    options: &CloneOptions,
    progress: &mut dyn Progress,
) -> Result<CloneReport, CloneError> {
    request.validate()?;

    let source_root = absolute(&request.source_dir)?;
    let target_root = absolute(&request.target_dir)?;
    if target_root.starts_with(&source_root) {
        return Err(CloneError::preflight(format!(
            "Target directory {:?} cannot be inside the source directory {:?}",
            target_root, source_root
        )));
    }
    if source_root.starts_with(&target_root) {
        return Err(CloneError::preflight(format!(
            "Source directory {:?} cannot be inside the target directory {:?}",
            source_root, target_root
        )));
    }

    prepare_target(&target_root, options)?;

    info!("Processing dir: {:?}", source_root);
    info!("Copying contents to dir: {:?}", target_root);
    info!("Renaming project: '{}' -> '{}'", request.source_name, request.target_name);
    if options.dry_run {
        warn!("Dry run mode - no changes will be made");
    }

    let engine = TreeCopyEngine::new(&source_root, &target_root, request, options.dry_run, progress)?;
    let report = engine.run()?;

    info!(
        "Clone complete: {} directories created, {} files copied, {} files rewritten, {} paths renamed, {} redirects added",
        report.directories_created,
        report.files_copied,
        report.files_rewritten,
        report.paths_renamed,
        report.redirects_added
    );
    if report.files_failed > 0 || report.directories_conflicted > 0 || report.directories_unreadable > 0 {
        warn!(
            "{} files failed, {} directories already existed and {} could not be read; see the log above",
            report.files_failed, report.directories_conflicted, report.directories_unreadable
        );
    }

    Ok(report)
}

fn absolute(dir: &Path) -> Result<PathBuf, CloneError> {
    std::path::absolute(dir)
        .map_err(|err| CloneError::preflight(format!("Unable to resolve {:?}: {}", dir, err)))
}

fn prepare_target(target_root: &Path, options: &CloneOptions) -> Result<(), CloneError> {
    if fs::symlink_metadata(target_root).is_err() {
        return Ok(());
    }

    if !options.force_delete {
        return Err(CloneError::preflight(format!(
            "Target directory {:?} already exists, delete it manually or enable force delete",
            target_root
        )));
    }

    if options.dry_run {
        warn!("Would delete existing target directory: {:?}", target_root);
        return Ok(());
    }

    info!("Force delete enabled, removing: {:?}", target_root);
    fs::remove_dir_all(target_root).map_err(|source| CloneError::TargetRoot {
        path: target_root.to_path_buf(),
        source,
    })
}
