use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of the export macro the engine generates for every code module,
/// e.g. `MYPROJ_API`.
const EXPORT_MACRO_SUFFIX: &str = "_API";

/// Literal project-name substitution for path segments and text contents.
///
/// Every occurrence of the old name is replaced first, then every occurrence of
/// the upper-cased export macro (`OLDNAME_API` -> `NEWNAME_API`). Matching is a
/// plain, case-sensitive substring search with no regex involved.
#[derive(Debug, Clone)]
pub struct ProjectRenamer {
    old_name: String,
    new_name: String,
    old_export_macro: String,
    new_export_macro: String,
}

impl ProjectRenamer {
    pub fn new(old_name: &str, new_name: &str) -> Self {
        Self {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            old_export_macro: format!("{}{}", old_name.to_uppercase(), EXPORT_MACRO_SUFFIX),
            new_export_macro: format!("{}{}", new_name.to_uppercase(), EXPORT_MACRO_SUFFIX),
        }
    }

    pub fn old_name(&self) -> &str {
        &self.old_name
    }

    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    /// Total rewrite: returns the input unchanged when nothing matches.
    pub fn rewrite(&self, text: &str) -> String {
        text.replace(&self.old_name, &self.new_name)
            .replace(&self.old_export_macro, &self.new_export_macro)
    }

    /// Renames a path relative to the source root as one string, so a match is
    /// replaced in every segment it occurs in.
    pub fn process_relative_path(&self, relative: &Path) -> Option<PathBuf> {
        let Some(path_str) = relative.to_str() else {
            debug!("Skipping rename of non UTF-8 path: {:?}", relative);
            return None;
        };

        if path_str.contains(&self.old_name) {
            let new_path_str = path_str.replace(&self.old_name, &self.new_name);
            debug!("Relative path replacement: '{}' -> '{}'", path_str, new_path_str);
            return Some(PathBuf::from(new_path_str));
        }
        None
    }
}
