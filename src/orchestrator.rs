//! Upgrade orchestrator for coordinating the whole workflow
//!
//! Workflow: read manifest → conflict check → outdated query → candidate
//! selection → confirmation → upgrade → repin. Every step runs once, in
//! order; the first error ends the run.

use crate::domain::DirectDependencies;
use crate::error::{AppError, ManifestError};
use crate::interaction::confirm;
use crate::manifest::{
    check_conflicting_sources, detect_kind, Manifest, ManifestKind, RepinReport,
};
use crate::output::Reporter;
use crate::package_manager::PackageManager;
use crate::progress::Progress;
use crate::update::{select_candidates, CandidateSet};
use std::io::{BufRead, Write};
use std::path::Path;

/// Options that change how a run behaves
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after listing candidates
    pub dry_run: bool,
    /// Show a spinner during pip queries
    pub show_progress: bool,
    /// Colorize user-facing output
    pub color: bool,
}

/// How a run ended when no error occurred
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The manifest declares no direct dependencies
    NoDependencies,
    /// No direct dependency is outdated
    UpToDate,
    /// Dry run: candidates were listed and nothing else happened
    DryRun(CandidateSet),
    /// The user declined the upgrade
    Cancelled,
    /// Packages were upgraded and the manifest repinned
    Upgraded(RepinReport),
}

/// Orchestrator for the upgrade workflow
pub struct Orchestrator<P: PackageManager> {
    package_manager: P,
    options: RunOptions,
    reporter: Reporter,
}

impl<P: PackageManager> Orchestrator<P> {
    /// Create a new orchestrator around a package manager
    pub fn new(package_manager: P, options: RunOptions) -> Self {
        Self {
            package_manager,
            options,
            reporter: Reporter::new(options.color),
        }
    }

    /// Run the workflow for one manifest file
    ///
    /// `input` answers the confirmation prompt; all user-facing messages go to `output`.
    pub fn run<R: BufRead, W: Write>(
        &self,
        path: &Path,
        input: &mut R,
        output: &mut W,
    ) -> Result<Outcome, AppError> {
        let output: &mut dyn Write = output;
        let (mut manifest, deps) = match self.read_dependencies(path, output)? {
            Some(found) => found,
            None => return Ok(Outcome::NoDependencies),
        };

        let Some(candidates) = self.upgrade_candidates(&deps, output)? else {
            return Ok(Outcome::UpToDate);
        };

        if self.options.dry_run {
            self.reporter.dry_run(output)?;
            return Ok(Outcome::DryRun(candidates));
        }

        if !self.confirm_upgrade(input, output)? {
            return Ok(Outcome::Cancelled);
        }

        self.upgrade(&candidates, output)?;

        let report = self.repin(&mut manifest, &candidates, output)?;
        Ok(Outcome::Upgraded(report))
    }

    /// Validate the path, detect the format, check conflicts and parse.
    /// Returns None when there is nothing to upgrade.
    fn read_dependencies(
        &self,
        path: &Path,
        output: &mut dyn Write,
    ) -> Result<Option<(Manifest, DirectDependencies)>, AppError> {
        if !path.exists() {
            return Err(ManifestError::not_found(path).into());
        }
        if path.is_dir() {
            return Err(ManifestError::IsDirectory {
                path: path.to_path_buf(),
            }
            .into());
        }

        let kind = detect_kind(path)?;
        if kind == ManifestKind::Requirements {
            check_conflicting_sources(path)?;
        }

        let manifest = Manifest::load(path, kind)?;
        let deps = match manifest.dependencies()? {
            Some(deps) => deps,
            None => {
                self.reporter.missing_dependency_section(output)?;
                DirectDependencies::new()
            }
        };

        if deps.is_empty() {
            self.reporter.no_dependencies(output)?;
            return Ok(None);
        }

        self.reporter.using_manifest(output, path, kind)?;
        log::debug!("Found {} direct dependencies", deps.len());
        for entry in deps.iter() {
            log::debug!("Direct dependency {}", entry);
        }
        Ok(Some((manifest, deps)))
    }

    /// Query pip and intersect with the direct dependencies.
    /// Returns None when everything is up to date.
    fn upgrade_candidates(
        &self,
        deps: &DirectDependencies,
        output: &mut dyn Write,
    ) -> Result<Option<CandidateSet>, AppError> {
        let mut progress = Progress::new(self.options.show_progress);
        progress.spinner("Checking for outdated packages...");
        let outdated = self.package_manager.list_outdated();
        progress.finish_and_clear();

        let outdated = outdated?;
        log::debug!("pip reported {} outdated packages", outdated.len());

        let candidates = select_candidates(outdated, deps);
        if candidates.is_empty() {
            self.reporter.up_to_date(output)?;
            return Ok(None);
        }

        self.reporter.candidates(output, &candidates)?;
        Ok(Some(candidates))
    }

    fn confirm_upgrade<R: BufRead>(
        &self,
        input: &mut R,
        output: &mut dyn Write,
    ) -> Result<bool, AppError> {
        self.reporter.review_notice(output)?;

        let confirmed = confirm(input, output, self.reporter.color()).map_err(AppError::Prompt)?;
        if !confirmed {
            self.reporter.cancelled(output)?;
        }
        Ok(confirmed)
    }

    fn upgrade(&self, candidates: &CandidateSet, output: &mut dyn Write) -> Result<(), AppError> {
        self.reporter.upgrading(output, candidates.len())?;
        output.flush()?;

        self.package_manager.upgrade(&candidates.names())?;
        Ok(())
    }

    /// Freeze, repin and write. Any failure here leaves the environment
    /// upgraded but the manifest stale, so it is reported as a write error.
    fn repin(
        &self,
        manifest: &mut Manifest,
        candidates: &CandidateSet,
        output: &mut dyn Write,
    ) -> Result<RepinReport, AppError> {
        let path = manifest.path().to_path_buf();
        // The upgrade already happened; output failures must not abort the repin
        if let Err(e) = self.reporter.repinning(output) {
            log::warn!("Failed to write repin progress: {}", e);
        }

        let mut progress = Progress::new(self.options.show_progress);
        progress.spinner("Reading installed versions...");
        let frozen = self.package_manager.freeze();
        progress.finish_and_clear();

        let frozen = frozen.map_err(|e| AppError::write(&path, e.to_string()))?;
        if frozen.is_empty() {
            log::warn!("pip freeze reported no pinned packages");
        } else {
            log::debug!("pip freeze reported {} pinned packages", frozen.len());
        }

        let mut report = manifest.repin(candidates, &frozen);
        if report.has_changes() {
            manifest
                .save()
                .map_err(|e| AppError::write(&path, e.to_string()))?;
            report.file_modified = true;
        }

        if let Err(e) = self.reporter.repinned(output, &report) {
            log::warn!("Failed to write repin summary: {}", e);
        }
        Ok(report)
    }
}
