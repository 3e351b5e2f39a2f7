/// Languages the host knows how to name.
///
/// Snippets store the editor's language id as a plain string; this type only
/// maps file extensions to those ids and back to display names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SnippetLanguage {
    Rust,
    JavaScript,
    TypeScript,
    Python,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    PHP,
    Ruby,
    Swift,
    Kotlin,
    Dart,
    HTML,
    CSS,
    SQL,
    Bash,
    Yaml,
    Json,
    Markdown,
    Toml,
    Text,
    Other(String),
}

impl SnippetLanguage {
    /// Get language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => SnippetLanguage::Rust,
            "js" | "mjs" | "cjs" | "jsx" => SnippetLanguage::JavaScript,
            "ts" | "tsx" => SnippetLanguage::TypeScript,
            "py" => SnippetLanguage::Python,
            "go" => SnippetLanguage::Go,
            "java" => SnippetLanguage::Java,
            "c" | "h" => SnippetLanguage::C,
            "cpp" | "cc" | "cxx" | "hpp" => SnippetLanguage::Cpp,
            "cs" => SnippetLanguage::CSharp,
            "php" => SnippetLanguage::PHP,
            "rb" => SnippetLanguage::Ruby,
            "swift" => SnippetLanguage::Swift,
            "kt" => SnippetLanguage::Kotlin,
            "dart" => SnippetLanguage::Dart,
            "html" | "htm" => SnippetLanguage::HTML,
            "css" => SnippetLanguage::CSS,
            "sql" => SnippetLanguage::SQL,
            "sh" | "bash" => SnippetLanguage::Bash,
            "yml" | "yaml" => SnippetLanguage::Yaml,
            "json" => SnippetLanguage::Json,
            "md" => SnippetLanguage::Markdown,
            "toml" => SnippetLanguage::Toml,
            "txt" | "" => SnippetLanguage::Text,
            other => SnippetLanguage::Other(other.to_string()),
        }
    }

    /// Resolves an editor language id back to a known language
    pub fn from_language_id(id: &str) -> Self {
        match id {
            "rust" => SnippetLanguage::Rust,
            "javascript" => SnippetLanguage::JavaScript,
            "typescript" => SnippetLanguage::TypeScript,
            "python" => SnippetLanguage::Python,
            "go" => SnippetLanguage::Go,
            "java" => SnippetLanguage::Java,
            "c" => SnippetLanguage::C,
            "cpp" => SnippetLanguage::Cpp,
            "csharp" => SnippetLanguage::CSharp,
            "php" => SnippetLanguage::PHP,
            "ruby" => SnippetLanguage::Ruby,
            "swift" => SnippetLanguage::Swift,
            "kotlin" => SnippetLanguage::Kotlin,
            "dart" => SnippetLanguage::Dart,
            "html" => SnippetLanguage::HTML,
            "css" => SnippetLanguage::CSS,
            "sql" => SnippetLanguage::SQL,
            "shellscript" => SnippetLanguage::Bash,
            "yaml" => SnippetLanguage::Yaml,
            "json" => SnippetLanguage::Json,
            "markdown" => SnippetLanguage::Markdown,
            "toml" => SnippetLanguage::Toml,
            "plaintext" => SnippetLanguage::Text,
            other => SnippetLanguage::Other(other.to_string()),
        }
    }

    /// The editor's language id, which is what snippets are keyed by
    pub fn language_id(&self) -> &str {
        match self {
            SnippetLanguage::Rust => "rust",
            SnippetLanguage::JavaScript => "javascript",
            SnippetLanguage::TypeScript => "typescript",
            SnippetLanguage::Python => "python",
            SnippetLanguage::Go => "go",
            SnippetLanguage::Java => "java",
            SnippetLanguage::C => "c",
            SnippetLanguage::Cpp => "cpp",
            SnippetLanguage::CSharp => "csharp",
            SnippetLanguage::PHP => "php",
            SnippetLanguage::Ruby => "ruby",
            SnippetLanguage::Swift => "swift",
            SnippetLanguage::Kotlin => "kotlin",
            SnippetLanguage::Dart => "dart",
            SnippetLanguage::HTML => "html",
            SnippetLanguage::CSS => "css",
            SnippetLanguage::SQL => "sql",
            SnippetLanguage::Bash => "shellscript",
            SnippetLanguage::Yaml => "yaml",
            SnippetLanguage::Json => "json",
            SnippetLanguage::Markdown => "markdown",
            SnippetLanguage::Toml => "toml",
            SnippetLanguage::Text => "plaintext",
            SnippetLanguage::Other(id) => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            SnippetLanguage::Rust => "Rust",
            SnippetLanguage::JavaScript => "JavaScript",
            SnippetLanguage::TypeScript => "TypeScript",
            SnippetLanguage::Python => "Python",
            SnippetLanguage::Go => "Go",
            SnippetLanguage::Java => "Java",
            SnippetLanguage::C => "C",
            SnippetLanguage::Cpp => "C++",
            SnippetLanguage::CSharp => "C#",
            SnippetLanguage::PHP => "PHP",
            SnippetLanguage::Ruby => "Ruby",
            SnippetLanguage::Swift => "Swift",
            SnippetLanguage::Kotlin => "Kotlin",
            SnippetLanguage::Dart => "Dart",
            SnippetLanguage::HTML => "HTML",
            SnippetLanguage::CSS => "CSS",
            SnippetLanguage::SQL => "SQL",
            SnippetLanguage::Bash => "Bash",
            SnippetLanguage::Yaml => "YAML",
            SnippetLanguage::Json => "JSON",
            SnippetLanguage::Markdown => "Markdown",
            SnippetLanguage::Toml => "TOML",
            SnippetLanguage::Text => "Text",
            SnippetLanguage::Other(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_to_language_id() {
        assert_eq!(SnippetLanguage::from_extension("TS").language_id(), "typescript");
        assert_eq!(SnippetLanguage::from_extension("sh").language_id(), "shellscript");
        assert_eq!(SnippetLanguage::from_extension("zig").language_id(), "zig");
    }

    #[test]
    fn test_language_id_roundtrip() {
        for id in ["rust", "python", "cpp", "plaintext", "elixir"] {
            assert_eq!(SnippetLanguage::from_language_id(id).language_id(), id);
        }
        assert_eq!(SnippetLanguage::from_language_id("csharp").display_name(), "C#");
    }
}
