use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::admission::{Admission, AdmissionPolicy};
use crate::redirects::{RedirectSynthesizer, ENGINE_CONFIG_FILE};
use crate::renamer::ProjectRenamer;
use crate::{CloneError, CloneRequest};

/// Processed even when it sits below an ignored directory.
const GIT_IGNORE_FILE: &str = ".gitignore";

pub const DEFAULT_DIR_WHITELIST: [&str; 3] = ["Config", "Content", "Source"];
pub const DEFAULT_BINARY_WHITELIST: [&str; 6] = ["uasset", "png", "jpg", "jpeg", "wav", "umap"];
pub const DEFAULT_TEXT_WHITELIST: [&str; 9] =
    ["ini", "cpp", "h", "uproject", "sln", "cs", "gitignore", "md", "txt"];

/// Receives one step per directory and per file the walk visits.
pub trait Progress {
    fn step(&mut self);
}

impl<F: FnMut()> Progress for F {
    fn step(&mut self) {
        self()
    }
}

/// Allow-lists for top-level directories and for file extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whitelists {
    pub dirs: Vec<String>,
    pub binary_extensions: Vec<String>,
    pub text_extensions: Vec<String>,
}

impl Whitelists {
    /// Builds the allow-lists, substituting the defaults for any empty list.
    pub fn new(dirs: Vec<String>, binary_extensions: Vec<String>, text_extensions: Vec<String>) -> Self {
        fn or_default(list: Vec<String>, default: &[&str]) -> Vec<String> {
            if list.is_empty() {
                default.iter().map(|s| s.to_string()).collect()
            } else {
                list
            }
        }

        Self {
            dirs: or_default(dirs, &DEFAULT_DIR_WHITELIST),
            binary_extensions: or_default(binary_extensions, &DEFAULT_BINARY_WHITELIST),
            text_extensions: or_default(text_extensions, &DEFAULT_TEXT_WHITELIST),
        }
    }

    pub fn classify(&self, file_name: &str) -> Option<FileClass> {
        let (_, extension) = file_name.rsplit_once('.')?;
        if extension.is_empty() {
            None
        } else if self.binary_extensions.iter().any(|ext| ext == extension) {
            Some(FileClass::Binary)
        } else if self.text_extensions.iter().any(|ext| ext == extension) {
            Some(FileClass::Text)
        } else {
            None
        }
    }
}

impl Default for Whitelists {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Copied byte for byte, never opened as text.
    Binary,
    /// Copied, then renamed in place.
    Text,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CloneReport {
    pub directories_created: usize,
    pub directories_ignored: usize,
    pub directories_conflicted: usize,
    pub directories_unreadable: usize,
    pub files_copied: usize,
    pub files_rewritten: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub paths_renamed: usize,
    pub redirects_added: usize,
}

#[derive(thiserror::Error, Debug)]
enum FileError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path:?} already exists, not overwriting it")]
    AlreadyExists { path: PathBuf },
    #[error("{path:?} is not valid UTF-8, kept as a verbatim copy")]
    NotUtf8 { path: PathBuf },
}

impl FileError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| FileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Continue,
    SkipSubtree,
}

/// Single-threaded, depth-first mirror of a source tree into a target tree.
///
/// The engine owns all state of one walk: the admission policy with its
/// admitted-subtree marker and ignored paths, and the report counters. Entries
/// of a directory are visited in file-name order. Symlinks are never descended;
/// they go through the file rules like any other leaf.
pub struct TreeCopyEngine<'a> {
    source_root: PathBuf,
    target_root: PathBuf,
    renamer: ProjectRenamer,
    whitelists: Whitelists,
    admission: AdmissionPolicy,
    synthesizer: RedirectSynthesizer,
    dry_run: bool,
    progress: &'a mut dyn Progress,
    report: CloneReport,
}

impl<'a> TreeCopyEngine<'a> {
    /// `source_root` and `target_root` must already be absolute.
    pub fn new(
        source_root: &Path,
        target_root: &Path,
        request: &CloneRequest,
        dry_run: bool,
        progress: &'a mut dyn Progress,
    ) -> Result<Self, CloneError> {
        Ok(Self {
            source_root: source_root.to_path_buf(),
            target_root: target_root.to_path_buf(),
            renamer: ProjectRenamer::new(&request.source_name, &request.target_name),
            whitelists: request.whitelists.clone(),
            admission: AdmissionPolicy::new(source_root, &request.whitelists.dirs),
            synthesizer: RedirectSynthesizer::new()?,
            dry_run,
            progress,
            report: CloneReport::default(),
        })
    }

    pub fn run(mut self) -> Result<CloneReport, CloneError> {
        let root = self.source_root.clone();
        self.walk_directory(&root)?;
        Ok(self.report)
    }

    fn walk_directory(&mut self, dir: &Path) -> Result<(), CloneError> {
        let visit = self.visit_directory(dir)?;
        self.progress.step();
        if visit == Visit::SkipSubtree {
            return Ok(());
        }

        let listing = fs::read_dir(dir).and_then(|entries| entries.collect::<Result<Vec<_>, _>>());
        let mut entries = match listing {
            Ok(entries) => entries,
            Err(source) if dir == self.source_root => {
                return Err(CloneError::Walk {
                    path: dir.to_path_buf(),
                    source,
                })
            }
            Err(err) => {
                warn!("Unable to read directory {:?}, skipping it: {}", dir, err);
                self.report.directories_unreadable += 1;
                return Ok(());
            }
        };
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    warn!("Unable to read file type of {:?}, skipping it: {}", path, err);
                    self.report.files_failed += 1;
                    self.progress.step();
                    continue;
                }
            };

            if file_type.is_dir() {
                self.walk_directory(&path)?;
            } else {
                self.visit_file(&path);
                self.progress.step();
            }
        }

        Ok(())
    }

    fn visit_directory(&mut self, dir: &Path) -> Result<Visit, CloneError> {
        if self.admission.decide(dir) == Admission::Reject {
            self.report.directories_ignored += 1;
            return Ok(Visit::Continue);
        }

        let target_dir = self.mirror_directory(dir);
        if self.dry_run {
            info!("Would create directory: {:?}", target_dir);
            self.report.directories_created += 1;
            return Ok(Visit::Continue);
        }

        match fs::create_dir(&target_dir) {
            Ok(()) => {
                debug!("Created directory: {:?}", target_dir);
                self.report.directories_created += 1;
                Ok(Visit::Continue)
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                warn!("Directory already exists, skipping its contents: {:?}", target_dir);
                self.report.directories_conflicted += 1;
                Ok(Visit::SkipSubtree)
            }
            Err(source) if dir == self.source_root => Err(CloneError::TargetRoot {
                path: target_dir,
                source,
            }),
            Err(source) => Err(CloneError::Walk {
                path: target_dir,
                source,
            }),
        }
    }

    /// Directories below the root are renamed only inside an admitted subtree.
    /// The whole relative path is rewritten so that children of a renamed
    /// directory land below the renamed copy.
    fn mirror_directory(&mut self, dir: &Path) -> PathBuf {
        let relative = self.relative(dir).to_path_buf();

        if self.admission.in_admitted_subtree() {
            if let Some(renamed) = self.renamer.process_relative_path(&relative) {
                info!("Renaming directory: {:?} -> {:?}", relative, renamed);
                self.report.paths_renamed += 1;
                return self.target_root.join(renamed);
            }
        }

        self.target_root.join(relative)
    }

    fn mirror_file(&mut self, file: &Path) -> PathBuf {
        let relative = self.relative(file).to_path_buf();

        match self.renamer.process_relative_path(&relative) {
            Some(renamed) => {
                info!("Renaming file: {:?} -> {:?}", relative, renamed);
                self.report.paths_renamed += 1;
                self.target_root.join(renamed)
            }
            None => self.target_root.join(relative),
        }
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.source_root).unwrap_or(path)
    }

    fn visit_file(&mut self, file: &Path) {
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if file_name != GIT_IGNORE_FILE && self.admission.is_ignored(file) {
            debug!("Skipping file in ignored directory: {:?}", file);
            self.report.files_skipped += 1;
            return;
        }

        let Some(class) = self.whitelists.classify(&file_name) else {
            debug!("Skipping unlisted file type: {:?}", file);
            self.report.files_skipped += 1;
            return;
        };

        let target_file = self.mirror_file(file);
        match self.copy_file(file, &target_file, class) {
            Ok(()) => self.report.files_copied += 1,
            Err(err) => {
                warn!("Unable to copy {:?}: {}", file, err);
                self.report.files_failed += 1;
            }
        }
    }

    fn copy_file(&mut self, source: &Path, target: &Path, class: FileClass) -> Result<(), FileError> {
        if self.dry_run {
            info!("Would copy file: {:?} -> {:?}", source, target);
        } else {
            debug!("Copying file: {:?} -> {:?}", source, target);
            copy_new(source, target)?;
        }

        if class == FileClass::Binary {
            return Ok(());
        }

        // The copy carries the same bytes as the source; a dry run has no copy.
        let copied = if self.dry_run { source } else { target };
        let bytes = fs::read(copied).map_err(FileError::io(copied))?;
        let content = String::from_utf8(bytes).map_err(|_| FileError::NotUtf8 {
            path: copied.to_path_buf(),
        })?;

        let mut updated = self.renamer.rewrite(&content);

        if target.file_name() == Some(OsStr::new(ENGINE_CONFIG_FILE)) {
            // Class names are only recognizable in the untouched source file.
            let original = fs::read_to_string(source).map_err(FileError::io(source))?;
            let synthesis = self.synthesizer.synthesize(&original, &updated, &self.renamer);
            debug!("Injected {} redirect records into {:?}", synthesis.records_injected, target);
            self.report.redirects_added += synthesis.records_injected;
            updated = synthesis.content;
        }

        if updated != content {
            if self.dry_run {
                info!("Would update contents of: {:?}", target);
            } else {
                debug!("Updating contents of: {:?}", target);
                fs::write(target, &updated).map_err(FileError::io(target))?;
            }
            self.report.files_rewritten += 1;
        }

        Ok(())
    }
}

/// Copies `source` into a newly created `target`; an existing target is a
/// failure, never overwritten.
fn copy_new(source: &Path, target: &Path) -> Result<(), FileError> {
    let mut reader = fs::File::open(source).map_err(FileError::io(source))?;
    let mut writer = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .map_err(|err| {
            if err.kind() == io::ErrorKind::AlreadyExists {
                FileError::AlreadyExists {
                    path: target.to_path_buf(),
                }
            } else {
                FileError::Io {
                    path: target.to_path_buf(),
                    source: err,
                }
            }
        })?;
    io::copy(&mut reader, &mut writer).map_err(FileError::io(target))?;
    Ok(())
}
