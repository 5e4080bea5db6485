use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admit,
    Reject,
}

/// Decides which directories take part in a clone.
///
/// Only the source root and whitelisted directories directly below it are
/// admitted on their own merit. Once a whitelisted child is admitted its name
/// becomes the admitted-subtree marker and every later directory whose absolute
/// path contains that marker is admitted as well. The containment test is a
/// plain substring match, so a sibling such as `ContentOld` visited while
/// `Content` is the marker is admitted too.
///
/// Rejected directories are remembered so files below them can be filtered.
#[derive(Debug)]
pub struct AdmissionPolicy {
    source_root: PathBuf,
    whitelist_dirs: Vec<String>,
    admitted_subtree: Option<String>,
    ignored_paths: Vec<String>,
}

impl AdmissionPolicy {
    pub fn new(source_root: &Path, whitelist_dirs: &[String]) -> Self {
        Self {
            source_root: source_root.to_path_buf(),
            whitelist_dirs: whitelist_dirs.to_vec(),
            admitted_subtree: None,
            ignored_paths: Vec::new(),
        }
    }

    pub fn decide(&mut self, dir: &Path) -> Admission {
        let dir_str = dir.to_string_lossy();

        if let Some(marker) = self.admitted_subtree.as_deref() {
            if dir_str.contains(marker) {
                debug!("Admitted inside '{}' subtree: {:?}", marker, dir);
                return Admission::Admit;
            }
        }

        if dir == self.source_root {
            self.admitted_subtree = None;
            return Admission::Admit;
        }

        let name = dir.file_name().and_then(|name| name.to_str());
        if let Some(name) = name {
            if self.whitelist_dirs.iter().any(|allowed| allowed == name)
                && dir.parent() == Some(self.source_root.as_path())
            {
                debug!("Admitted whitelisted directory: {:?}", dir);
                self.admitted_subtree = Some(name.to_string());
                return Admission::Admit;
            }
        }

        debug!("Ignoring directory: {:?}", dir);
        self.admitted_subtree = None;
        self.ignored_paths.push(dir_str.into_owned());
        Admission::Reject
    }

    /// True while the walk is below a whitelisted top-level directory.
    pub fn in_admitted_subtree(&self) -> bool {
        self.admitted_subtree.is_some()
    }

    #[cfg(test)]
    fn admitted_subtree(&self) -> Option<&str> {
        self.admitted_subtree.as_deref()
    }

    /// True when `path` starts with a previously rejected directory path.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.ignored_paths
            .iter()
            .any(|ignored| path_str.starts_with(ignored.as_str()))
    }

    #[cfg(test)]
    fn ignored_paths(&self) -> &[String] {
        &self.ignored_paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whitelist() -> Vec<String> {
        ["Config", "Content", "Source"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_root_is_always_admitted() {
        let root = Path::new("/projects/MyProj");
        let mut policy = AdmissionPolicy::new(root, &whitelist());

        assert_eq!(policy.decide(root), Admission::Admit);
        assert!(!policy.in_admitted_subtree());
        assert!(policy.ignored_paths().is_empty());
    }

    #[test]
    fn test_whitelisted_child_sets_marker() {
        let root = Path::new("/projects/MyProj");
        let mut policy = AdmissionPolicy::new(root, &whitelist());

        policy.decide(root);
        assert_eq!(policy.decide(&root.join("Content")), Admission::Admit);
        assert_eq!(policy.admitted_subtree(), Some("Content"));

        // descendants inherit the admission without a second whitelist check
        assert_eq!(policy.decide(&root.join("Content/Maps/Sub")), Admission::Admit);
        assert_eq!(policy.admitted_subtree(), Some("Content"));
    }

    #[test]
    fn test_unlisted_child_is_rejected_and_recorded() {
        let root = Path::new("/projects/MyProj");
        let mut policy = AdmissionPolicy::new(root, &whitelist());

        policy.decide(root);
        policy.decide(&root.join("Config"));
        assert_eq!(policy.decide(&root.join("Intermediate")), Admission::Reject);
        assert!(!policy.in_admitted_subtree());
        assert_eq!(policy.ignored_paths(), ["/projects/MyProj/Intermediate"]);

        assert!(policy.is_ignored(Path::new("/projects/MyProj/Intermediate/Build/x.ini")));
        assert!(!policy.is_ignored(Path::new("/projects/MyProj/Config/DefaultGame.ini")));
    }

    #[test]
    fn test_whitelisted_name_below_depth_one_is_rejected() {
        let root = Path::new("/projects/MyProj");
        let mut policy = AdmissionPolicy::new(root, &whitelist());

        policy.decide(root);
        policy.decide(&root.join("Plugins"));
        assert_eq!(policy.decide(&root.join("Plugins/Config")), Admission::Reject);
    }

    #[test]
    fn test_marker_is_substring_matched() {
        let root = Path::new("/projects/MyProj");
        let mut policy = AdmissionPolicy::new(root, &whitelist());

        policy.decide(root);
        policy.decide(&root.join("Content"));
        assert_eq!(policy.decide(&root.join("ContentOld")), Admission::Admit);
    }

    #[test]
    fn test_same_state_gives_same_decision() {
        let root = Path::new("/projects/MyProj");
        let mut first = AdmissionPolicy::new(root, &whitelist());
        let mut second = AdmissionPolicy::new(root, &whitelist());

        for dir in ["", "Source", "Source/MyProj", "Saved", "Config"] {
            let dir = root.join(dir);
            assert_eq!(first.decide(&dir), second.decide(&dir));
        }
        assert_eq!(first.ignored_paths(), second.ignored_paths());
    }
}
