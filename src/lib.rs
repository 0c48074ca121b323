//! updr - upgrade only the direct dependencies of a Python project
//!
//! This library reads the direct dependencies declared in a
//! requirements file or pyproject.toml, upgrades the outdated ones with
//! pip and repins them in the manifest, leaving transitive dependencies
//! and every other manifest line alone.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod interaction;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod package_manager;
pub mod progress;
pub mod update;
