//! Include/exclude path filtering over a directory walk.

use std::path::Path;

use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::{IndexError, Result};

/// Compiled include/exclude matchers with gitignore-style semantics.
///
/// Exclude takes precedence over include. An empty include list matches
/// nothing (fail-closed); an empty exclude list excludes nothing.
#[derive(Debug)]
pub struct PathFilter {
    include: Gitignore,
    exclude: Gitignore,
}

impl PathFilter {
    /// Compile comma-separated pattern lists into matchers.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern does not compile.
    pub fn new(includes: &str, excludes: &str) -> Result<Self> {
        Ok(Self {
            include: compile(includes)?,
            exclude: compile(excludes)?,
        })
    }

    /// Whether a relative path passes the filters.
    #[must_use]
    pub fn matches(&self, rel: &Path) -> bool {
        if self
            .exclude
            .matched_path_or_any_parents(rel, false)
            .is_ignore()
        {
            return false;
        }
        self.include
            .matched_path_or_any_parents(rel, false)
            .is_ignore()
    }

    /// Walk `root` and yield matching relative paths in directory-walk
    /// order. The sequence is finite and not restartable; each call starts
    /// a fresh walk.
    pub fn files<'a>(&'a self, root: &Path) -> impl Iterator<Item = String> + 'a {
        let root = root.to_path_buf();
        raw_walk(&root)
            .filter_map(move |entry| {
                let rel = entry.path().strip_prefix(&root).ok()?.to_path_buf();
                self.matches(&rel)
                    .then(|| rel.to_string_lossy().into_owned())
            })
    }
}

fn compile(patterns: &str) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new("");
    for pattern in patterns.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        builder
            .add_line(None, pattern)
            .map_err(|e| IndexError::Glob(format!("{pattern}: {e}")))?;
    }
    builder.build().map_err(|e| IndexError::Glob(e.to_string()))
}

/// Raw file walk with all VCS-aware filtering disabled; the pattern lists
/// are the single source of truth for what gets indexed.
fn raw_walk(root: &Path) -> impl Iterator<Item = ignore::DirEntry> + use<> {
    WalkBuilder::new(root)
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build()
        .flatten()
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
}

/// Total byte size of all regular files under `root`. Unreadable entries
/// contribute zero.
#[must_use]
pub fn tree_size_bytes(root: &Path) -> u64 {
    raw_walk(root)
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("target/debug")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("src/notes.md"), "# notes").unwrap();
        fs::write(dir.path().join("target/debug/out.rs"), "artifact").unwrap();
        fs::write(dir.path().join("README.md"), "# readme").unwrap();
        dir
    }

    fn collect(filter: &PathFilter, root: &Path) -> Vec<String> {
        let mut files: Vec<String> = filter.files(root).collect();
        files.sort();
        files
    }

    #[test]
    fn include_only_matching() {
        let dir = tree();
        let filter = PathFilter::new("*.md", "").unwrap();
        assert_eq!(
            collect(&filter, dir.path()),
            vec!["README.md", "src/notes.md"]
        );
    }

    #[test]
    fn exclude_takes_precedence() {
        let dir = tree();
        let filter = PathFilter::new("*.rs,*.md", "target/").unwrap();
        assert_eq!(
            collect(&filter, dir.path()),
            vec!["README.md", "src/main.rs", "src/notes.md"]
        );
    }

    #[test]
    fn empty_include_matches_nothing() {
        let dir = tree();
        let filter = PathFilter::new("", "").unwrap();
        assert!(collect(&filter, dir.path()).is_empty());
    }

    #[test]
    fn empty_exclude_excludes_nothing() {
        let dir = tree();
        let filter = PathFilter::new("*.rs", "").unwrap();
        assert_eq!(
            collect(&filter, dir.path()),
            vec!["src/main.rs", "target/debug/out.rs"]
        );
    }

    #[test]
    fn patterns_are_trimmed() {
        let dir = tree();
        let filter = PathFilter::new(" *.md , ", "").unwrap();
        assert_eq!(
            collect(&filter, dir.path()),
            vec!["README.md", "src/notes.md"]
        );
    }

    #[test]
    fn tree_size_sums_files() {
        let dir = tree();
        let size = tree_size_bytes(dir.path());
        let expected: u64 = ["fn main() {}", "# notes", "artifact", "# readme"]
            .iter()
            .map(|s| s.len() as u64)
            .sum();
        assert_eq!(size, expected);
    }
}
