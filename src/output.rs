//! Human-readable workflow output
//!
//! This module provides:
//! - The candidate table with semantic version change labels
//! - Status lines for each way a run can end
//! - The repin summary

use crate::manifest::{ManifestKind, RepinReport};
use crate::update::CandidateSet;
use colored::Colorize;
use std::io::{self, Write};
use std::path::Path;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes)
    Patch,
    /// Unknown or unparseable
    Unknown,
}

impl VersionChangeType {
    /// Determine the change type between two versions
    pub fn from_versions(old: &str, new: &str) -> Self {
        // Leading numeric release segments; "2.0.0rc1" -> (2, 0)
        let parse = |v: &str| -> Option<(u64, u64)> {
            let v = v.strip_prefix('v').unwrap_or(v);
            let mut parts = v.split(['.', '-', '+']).map(|p| {
                let digits: String = p.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<u64>().ok()
            });
            let major = parts.next()??;
            let minor = parts.next().flatten().unwrap_or(0);
            Some((major, minor))
        };

        match (parse(old), parse(new)) {
            (Some((old_major, old_minor)), Some((new_major, new_minor))) => {
                if new_major != old_major {
                    VersionChangeType::Major
                } else if new_minor != old_minor {
                    VersionChangeType::Minor
                } else {
                    VersionChangeType::Patch
                }
            }
            _ => VersionChangeType::Unknown,
        }
    }

    /// Get the display label with color
    pub fn colored_label(&self) -> String {
        match self {
            VersionChangeType::Major => "major".red().bold().to_string(),
            VersionChangeType::Minor => "minor".yellow().to_string(),
            VersionChangeType::Patch => "patch".green().to_string(),
            VersionChangeType::Unknown => "?".dimmed().to_string(),
        }
    }

    /// Get the plain label
    pub fn label(&self) -> &'static str {
        match self {
            VersionChangeType::Major => "major",
            VersionChangeType::Minor => "minor",
            VersionChangeType::Patch => "patch",
            VersionChangeType::Unknown => "?",
        }
    }
}

/// Writes workflow messages to the user
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    fn success(&self, msg: &str) -> String {
        if self.color {
            msg.green().to_string()
        } else {
            msg.to_string()
        }
    }

    fn warning(&self, msg: &str) -> String {
        if self.color {
            msg.yellow().to_string()
        } else {
            msg.to_string()
        }
    }

    fn heading(&self, msg: &str) -> String {
        if self.color {
            msg.bold().to_string()
        } else {
            msg.to_string()
        }
    }

    /// Which file the dependencies were taken from
    pub fn using_manifest(&self, writer: &mut dyn Write, path: &Path, kind: ManifestKind) -> io::Result<()> {
        writeln!(
            writer,
            "Using {} for direct dependencies: {}",
            kind.display_name(),
            path.display()
        )
    }

    /// pyproject.toml lacks `[project].dependencies`
    pub fn missing_dependency_section(&self, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(
            writer,
            "{}",
            self.warning("No [project.dependencies] found in pyproject.toml.")
        )?;
        writeln!(
            writer,
            "  PEP 621 recommends using [project.dependencies]: https://peps.python.org/pep-0621/"
        )
    }

    pub fn no_dependencies(&self, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "No direct dependencies found to process.")
    }

    pub fn up_to_date(&self, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", self.success("All direct dependencies are up to date."))
    }

    /// Table of outdated direct dependencies
    pub fn candidates(&self, writer: &mut dyn Write, candidates: &CandidateSet) -> io::Result<()> {
        writeln!(writer)?;
        writeln!(writer, "{}", self.heading("Outdated direct dependencies:"))?;

        let max_name_len = candidates.iter().map(|p| p.name.len()).max().unwrap_or(0);
        for package in candidates.iter() {
            let change = VersionChangeType::from_versions(&package.version, &package.latest_version);
            let name = format!("{:width$}", package.name, width = max_name_len);
            if self.color {
                writeln!(
                    writer,
                    "  {} {} {} {} [{}]",
                    name,
                    package.version.dimmed(),
                    "→".dimmed(),
                    package.latest_version.bright_white().bold(),
                    change.colored_label()
                )?;
            } else {
                writeln!(
                    writer,
                    "  {} {} → {} [{}]",
                    name,
                    package.version,
                    package.latest_version,
                    change.label()
                )?;
            }
        }
        Ok(())
    }

    /// Reminder shown before the confirmation prompt
    pub fn review_notice(&self, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer)?;
        writeln!(
            writer,
            "{}",
            self.warning("Please review the package revisions listed above before upgrading.")
        )?;
        writeln!(
            writer,
            "  Check release notes on pypi.org for breaking changes or necessary code updates."
        )
    }

    pub fn dry_run(&self, writer: &mut dyn Write) -> io::Result<()> {
        let msg = "(dry-run) No packages were upgraded and the manifest was not modified.";
        if self.color {
            writeln!(writer, "\n{}", msg.cyan())
        } else {
            writeln!(writer, "\n{}", msg)
        }
    }

    pub fn cancelled(&self, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", self.warning("Upgrade cancelled."))
    }

    pub fn upgrading(&self, writer: &mut dyn Write, count: usize) -> io::Result<()> {
        let noun = if count == 1 { "package" } else { "packages" };
        writeln!(writer, "Upgrading {} {}...", count, noun)
    }

    pub fn repinning(&self, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "Repinning direct dependencies...")
    }

    /// Summary of what the repin wrote
    pub fn repinned(&self, writer: &mut dyn Write, report: &RepinReport) -> io::Result<()> {
        for change in &report.repinned {
            if self.color {
                writeln!(writer, "  {} {} {}", change.old.dimmed(), "→".dimmed(), change.new.green())?;
            } else {
                writeln!(writer, "  {} → {}", change.old, change.new)?;
            }
        }
        for package in &report.missing {
            writeln!(
                writer,
                "{}",
                self.warning(&format!(
                    "  {} is not in pip freeze output; its declaration was left unchanged",
                    package
                ))
            )?;
        }
        if report.file_modified {
            writeln!(
                writer,
                "{}",
                self.success(&format!("Updated {}", report.path.display()))
            )?;
        } else {
            writeln!(writer, "{} needed no changes", report.path.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyEntry, DirectDependencies, OutdatedPackage};
    use crate::manifest::Repinned;
    use crate::update::select_candidates;

    fn render(f: impl FnOnce(&Reporter, &mut Vec<u8>) -> io::Result<()>) -> String {
        let reporter = Reporter::new(false);
        let mut out = Vec::new();
        f(&reporter, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_version_change_type() {
        assert_eq!(VersionChangeType::from_versions("2.0.0", "3.0.0"), VersionChangeType::Major);
        assert_eq!(VersionChangeType::from_versions("2.0.0", "2.31.0"), VersionChangeType::Minor);
        assert_eq!(VersionChangeType::from_versions("7.0", "7.0.1"), VersionChangeType::Patch);
        assert_eq!(VersionChangeType::from_versions("23.1", "24.2"), VersionChangeType::Major);
        assert_eq!(
            VersionChangeType::from_versions("1.0.0", "1.1.0rc1"),
            VersionChangeType::Minor
        );
        assert_eq!(
            VersionChangeType::from_versions("abc", "1.0"),
            VersionChangeType::Unknown
        );
    }

    #[test]
    fn test_candidates_table() {
        let deps: DirectDependencies = vec![
            DependencyEntry::new("requests", "requests==2.0.0"),
            DependencyEntry::new("click", "click==7.0"),
        ]
        .into_iter()
        .collect();
        let candidates = select_candidates(
            vec![
                OutdatedPackage::new("requests", "2.0.0", "2.31.0"),
                OutdatedPackage::new("click", "7.0", "8.1.7"),
            ],
            &deps,
        );

        let out = render(|r, w| r.candidates(w, &candidates));
        assert!(out.contains("Outdated direct dependencies:"));
        assert!(out.contains("  requests 2.0.0 → 2.31.0 [minor]"));
        assert!(out.contains("  click    7.0 → 8.1.7 [major]"));
    }

    #[test]
    fn test_repinned_summary() {
        let mut report = RepinReport::new("requirements.txt");
        report.repinned.push(Repinned {
            package: "requests".to_string(),
            old: "requests==2.0.0".to_string(),
            new: "requests==2.31.0".to_string(),
        });
        report.missing.push("click".to_string());
        report.file_modified = true;

        let out = render(|r, w| r.repinned(w, &report));
        assert!(out.contains("requests==2.0.0 → requests==2.31.0"));
        assert!(out.contains("click is not in pip freeze output"));
        assert!(out.contains("Updated requirements.txt"));
    }

    #[test]
    fn test_upgrading_pluralization() {
        assert_eq!(render(|r, w| r.upgrading(w, 1)), "Upgrading 1 package...\n");
        assert_eq!(render(|r, w| r.upgrading(w, 3)), "Upgrading 3 packages...\n");
    }

    #[test]
    fn test_plain_output_has_no_ansi() {
        let out = render(|r, w| r.up_to_date(w));
        assert_eq!(out, "All direct dependencies are up to date.\n");
    }
}
