//! Static file metadata: extension → language, path prefixes.

use std::path::Path;

/// Language tag for a file extension.
///
/// Unknown extensions pass through as their own tag so they remain
/// filterable rather than collapsing into an "unknown" bucket.
pub(crate) fn language_for(ext: &str) -> &str {
    match ext {
        "py" => "python",
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "java" => "java",
        "go" => "go",
        "rs" => "rust",
        "scala" => "scala",
        "rb" => "ruby",
        "php" => "php",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "sh" | "bash" => "shell",
        "sql" => "sql",
        "yaml" | "yml" => "yaml",
        "json" => "json",
        "toml" => "toml",
        "md" => "markdown",
        "txt" => "text",
        other => other,
    }
}

/// Lowercased extension of a relative path, or `no-ext`.
pub(crate) fn extension_of(rel: &str) -> String {
    Path::new(rel)
        .extension()
        .and_then(|e| e.to_str())
        .map_or_else(|| "no-ext".to_string(), str::to_lowercase)
}

/// Basename of a relative path.
pub(crate) fn title_of(rel: &str) -> String {
    Path::new(rel)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(rel)
        .to_string()
}

/// Coarse path prefix for pre-filtering: first two segments when the path
/// has more than two, else the first, else empty.
pub(crate) fn path_prefix(rel: &str) -> String {
    let parts: Vec<&str> = rel.split('/').collect();
    if parts.len() > 2 {
        parts[..2].join("/")
    } else if parts.len() > 1 {
        parts[0].to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(language_for("py"), "python");
        assert_eq!(language_for("rs"), "rust");
        assert_eq!(language_for("yml"), "yaml");
        assert_eq!(language_for("md"), "markdown");
    }

    #[test]
    fn unknown_extension_passes_through() {
        assert_eq!(language_for("zig"), "zig");
        assert_eq!(language_for("no-ext"), "no-ext");
    }

    #[test]
    fn extension_lowercased_or_no_ext() {
        assert_eq!(extension_of("src/Main.RS"), "rs");
        assert_eq!(extension_of("Makefile"), "no-ext");
    }

    #[test]
    fn title_is_basename() {
        assert_eq!(title_of("docs/guide/intro.md"), "intro.md");
        assert_eq!(title_of("README.md"), "README.md");
    }

    #[test]
    fn prefix_rules() {
        assert_eq!(path_prefix("a/b/c/d.rs"), "a/b");
        assert_eq!(path_prefix("a/b.rs"), "a");
        assert_eq!(path_prefix("top.rs"), "");
    }
}
