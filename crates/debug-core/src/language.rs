use std::path::Path;

/// Target language for a synthesized diagnostic statement.
///
/// Closed set on purpose: statement rendering is a total match over this
/// enum, not an extensible plugin surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Ruby,
    Java,
    Go,
    Rust,
}

impl Language {
    /// Classify a file by its extension. Total: unknown or missing
    /// extensions map to JavaScript.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "ts" | "tsx" => Language::TypeScript,
            "js" | "jsx" => Language::JavaScript,
            "py" => Language::Python,
            "rb" => Language::Ruby,
            "java" => Language::Java,
            "go" => Language::Go,
            "rs" => Language::Rust,
            _ => Language::JavaScript,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Ruby => "ruby",
            Language::Java => "java",
            Language::Go => "go",
            Language::Rust => "rust",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Language;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn maps_known_extensions() {
        assert_eq!(Language::from_path(Path::new("a.ts")), Language::TypeScript);
        assert_eq!(
            Language::from_path(Path::new("src/App.tsx")),
            Language::TypeScript
        );
        assert_eq!(Language::from_path(Path::new("a.js")), Language::JavaScript);
        assert_eq!(Language::from_path(Path::new("a.jsx")), Language::JavaScript);
        assert_eq!(Language::from_path(Path::new("a.py")), Language::Python);
        assert_eq!(Language::from_path(Path::new("a.rb")), Language::Ruby);
        assert_eq!(Language::from_path(Path::new("A.java")), Language::Java);
        assert_eq!(Language::from_path(Path::new("a.go")), Language::Go);
        assert_eq!(Language::from_path(Path::new("a.rs")), Language::Rust);
    }

    #[test]
    fn extension_casing_is_ignored() {
        assert_eq!(Language::from_path(Path::new("a.PY")), Language::Python);
        assert_eq!(Language::from_path(Path::new("a.Rs")), Language::Rust);
    }

    #[test]
    fn unknown_or_missing_extension_defaults_to_javascript() {
        assert_eq!(
            Language::from_path(Path::new("Makefile")),
            Language::JavaScript
        );
        assert_eq!(
            Language::from_path(Path::new("a.weird")),
            Language::JavaScript
        );
        assert_eq!(Language::from_path(Path::new("")), Language::JavaScript);
    }
}
