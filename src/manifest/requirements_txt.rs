//! requirements.txt document
//!
//! The file is kept as its raw lines (terminators included) so rendering an
//! unmodified document reproduces the input byte-for-byte. Blank lines,
//! comments and option lines (`-r`, `-e`, `--index-url`, ...) are carried
//! through untouched; only requirement lines of repinned packages change,
//! and those keep their `--hash` options, `\` continuations and inline comments.

use crate::domain::{normalize_name, Declaration, DependencyEntry, DirectDependencies};
use crate::error::ManifestError;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    /// Line content without terminator
    text: String,
    /// `\n`, `\r\n` or empty for the last line
    ending: String,
    /// Normalized package name for requirement lines
    package: Option<String>,
}

/// Parsed requirements file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementsTxt {
    lines: Vec<Line>,
}

/// Split `text` into (requirement, inline comment). The comment part keeps
/// its leading whitespace so it can be re-attached verbatim.
fn split_inline_comment(text: &str) -> (&str, &str) {
    let bytes = text.as_bytes();
    for (idx, byte) in bytes.iter().enumerate() {
        if *byte == b'#' && (idx == 0 || bytes[idx - 1].is_ascii_whitespace()) {
            let start = text[..idx].trim_end().len();
            return (&text[..start], &text[start..]);
        }
    }
    (text, "")
}

/// Split a requirement into (declaration, trailing options). The tail holds
/// per-requirement options such as `--hash=...` and a `\` line
/// continuation, with its leading whitespace, so it can be re-attached verbatim.
fn split_trailing_options(requirement: &str) -> (&str, &str) {
    let bytes = requirement.as_bytes();
    let options_at = requirement
        .match_indices("--")
        .map(|(idx, _)| idx)
        .find(|&idx| idx > 0 && bytes[idx - 1].is_ascii_whitespace())
        .unwrap_or(requirement.len());

    let head = &requirement[..options_at];
    let head = head.trim_end().strip_suffix('\\').unwrap_or(head);
    let end = head.trim_end().len();
    (&requirement[..end], &requirement[end..])
}

/// The declaration part of a line: inline comment and trailing options removed
fn declaration_text(text: &str) -> &str {
    let (requirement, _) = split_inline_comment(text);
    split_trailing_options(requirement).0.trim()
}

impl RequirementsTxt {
    /// Parse requirements content. `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let mut lines = Vec::new();

        for (idx, raw) in content.split_inclusive('\n').enumerate() {
            let (text, ending) = match raw.strip_suffix("\r\n") {
                Some(text) => (text, "\r\n"),
                None => match raw.strip_suffix('\n') {
                    Some(text) => (text, "\n"),
                    None => (raw, ""),
                },
            };

            let requirement = declaration_text(text);

            let package = if requirement.is_empty() || requirement.starts_with('-') {
                None
            } else {
                let declaration = Declaration::parse(requirement).ok_or_else(|| {
                    ManifestError::requirements_parse_error(
                        path,
                        idx + 1,
                        format!("expected a package name, found '{}'", requirement),
                    )
                })?;
                Some(declaration.normalized_name())
            };

            lines.push(Line {
                text: text.to_string(),
                ending: ending.to_string(),
                package,
            });
        }

        Ok(Self { lines })
    }

    /// Direct dependencies in file order
    pub fn dependencies(&self) -> DirectDependencies {
        self.lines
            .iter()
            .filter_map(|line| {
                let package = line.package.as_ref()?;
                Some(DependencyEntry::new(package, declaration_text(&line.text)))
            })
            .collect()
    }

    /// Replace the specifier of every line declaring `package` with `==version`.
    /// Returns the (old, new) declarations that changed.
    pub fn repin(&mut self, package: &str, version: &str) -> Vec<(String, String)> {
        let key = normalize_name(package);
        let mut changed = Vec::new();

        for line in self.lines.iter_mut() {
            if line.package.as_deref() != Some(key.as_str()) {
                continue;
            }

            let (requirement, comment) = split_inline_comment(&line.text);
            let (requirement, options) = split_trailing_options(requirement);
            let indent_len = requirement.len() - requirement.trim_start().len();
            let old = requirement.trim();
            let Some(declaration) = Declaration::parse(old) else {
                continue;
            };
            let new = declaration.pinned(version);
            if new == old {
                continue;
            }

            let text = format!("{}{}{}{}", &requirement[..indent_len], new, options, comment);
            changed.push((old.to_string(), new));
            line.text = text;
        }

        changed
    }

    /// Render the document back to text
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{}{}", line.text, line.ending))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> RequirementsTxt {
        RequirementsTxt::parse(content, Path::new("requirements.txt")).unwrap()
    }

    #[test]
    fn test_parse_skips_comments_blank_and_options() {
        let doc = parse("# top\n\nrequests==2.0.0\n-r base.txt\n--index-url https://x\nclick\n");
        let deps = doc.dependencies();
        let names: Vec<_> = deps.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["requests", "click"]);
    }

    #[test]
    fn test_parse_records_declaration_without_inline_comment() {
        let doc = parse("  Flask==2.0.0  # web framework\n");
        let deps = doc.dependencies();
        let flask = deps.get("flask").unwrap();
        assert_eq!(flask.declaration, "Flask==2.0.0");
    }

    #[test]
    fn test_parse_hash_inside_url_is_not_a_comment() {
        let (req, comment) = split_inline_comment("pkg @ https://host/p.whl#sha256=abc");
        assert_eq!(req, "pkg @ https://host/p.whl#sha256=abc");
        assert_eq!(comment, "");
    }

    #[test]
    fn test_parse_malformed_line() {
        let err = RequirementsTxt::parse("requests\n==1.0\n", Path::new("requirements.txt"))
            .unwrap_err();
        match err {
            ManifestError::RequirementsParseError { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_unchanged_is_identical() {
        let content = "# deps\r\nrequests==2.0.0\r\n\r\nclick==7.0  # cli\nno-newline";
        let doc = parse(content);
        assert_eq!(doc.render(), content);
    }

    #[test]
    fn test_parse_render_parse_is_idempotent() {
        let content = "requests==2.0.0\nclick==7.0\n# comment\n";
        let first = parse(content);
        let second = parse(&first.render());
        assert_eq!(first.dependencies(), second.dependencies());
    }

    #[test]
    fn test_repin_scenario() {
        let mut doc = parse("requests==2.0.0\nclick==7.0\n# comment");
        let changed = doc.repin("requests", "2.31.0");

        assert_eq!(
            changed,
            vec![("requests==2.0.0".to_string(), "requests==2.31.0".to_string())]
        );
        assert_eq!(doc.render(), "requests==2.31.0\nclick==7.0\n# comment");
    }

    #[test]
    fn test_repin_keeps_indent_comment_and_marker() {
        let mut doc = parse("  Django>=4.0; python_version>'3.8'   # pinned by ops\n");
        doc.repin("django", "5.0.6");
        assert_eq!(
            doc.render(),
            "  Django==5.0.6; python_version>'3.8'   # pinned by ops\n"
        );
    }

    #[test]
    fn test_split_trailing_options() {
        assert_eq!(split_trailing_options("requests==2.0.0 \\"), ("requests==2.0.0", " \\"));
        assert_eq!(
            split_trailing_options("click==7.0 --hash=sha256:bbbb"),
            ("click==7.0", " --hash=sha256:bbbb")
        );
        assert_eq!(
            split_trailing_options("click==7.0  --hash=sha256:bbbb \\"),
            ("click==7.0", "  --hash=sha256:bbbb \\")
        );
        assert_eq!(
            split_trailing_options("pkg @ https://h/a--b.whl"),
            ("pkg @ https://h/a--b.whl", "")
        );
        assert_eq!(split_trailing_options("requests>=2"), ("requests>=2", ""));
    }

    #[test]
    fn test_parse_hash_and_continuation_lines() {
        let doc =
            parse("requests==2.0.0 \\\n    --hash=sha256:aaaa\nclick==7.0 --hash=sha256:bbbb\n");
        let deps = doc.dependencies();
        let declarations: Vec<_> = deps.iter().map(|e| e.declaration.as_str()).collect();
        assert_eq!(declarations, vec!["requests==2.0.0", "click==7.0"]);
    }

    #[test]
    fn test_repin_keeps_hashes_and_continuation() {
        let content = "requests==2.0.0 \\\n    --hash=sha256:aaaa\nclick==7.0 --hash=sha256:bbbb  # cli\n";
        let mut doc = parse(content);

        let changed = doc.repin("requests", "2.31.0");
        assert_eq!(
            changed,
            vec![("requests==2.0.0".to_string(), "requests==2.31.0".to_string())]
        );
        doc.repin("click", "8.1.7");

        assert_eq!(
            doc.render(),
            "requests==2.31.0 \\\n    --hash=sha256:aaaa\nclick==8.1.7 --hash=sha256:bbbb  # cli\n"
        );
        let reparsed = parse(&doc.render());
        assert!(reparsed.dependencies().contains("requests"));
        assert_eq!(reparsed.dependencies().len(), 2);
    }

    #[test]
    fn test_repin_unknown_package_is_noop() {
        let content = "requests==2.0.0\n";
        let mut doc = parse(content);
        assert!(doc.repin("flask", "3.0.0").is_empty());
        assert_eq!(doc.render(), content);
    }

    #[test]
    fn test_repin_same_version_reports_nothing() {
        let mut doc = parse("click==7.0\n");
        assert!(doc.repin("click", "7.0").is_empty());
    }
}
