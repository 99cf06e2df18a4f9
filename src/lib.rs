#![warn(missing_docs)]
//! Library support for the techskills CLI.
//!
//! The core reconciles a field-service technician's skill assignments against
//! operator-defined skill groups: [`reconcile`] computes what to remove and
//! add, [`plan`] resolves technicians and executes the changes, and
//! [`remote::FieldService`] is the seam to the platform's REST API.

/// Skill catalog resolution against configured groups.
pub mod catalog;
/// Command-line interface wiring and dispatch.
mod cli;
/// Command implementations.
mod commands;
/// Configuration loading and validation.
pub mod config;
/// Error handling for the crate.
mod error;
/// Operator-supplied technician identifiers.
pub mod input;
/// Typed entities shared by the core and the remote client.
pub mod model;
/// Color palette and styling for CLI output.
mod palette;
/// Path expansion and normalization utilities.
mod paths;
/// Per-technician planning and execution.
pub mod plan;
/// Skill assignment diffing.
pub mod reconcile;
/// Remote field-service API access.
pub mod remote;
/// Technician identifier resolution.
pub mod resolve;
/// Choosing a subset of a group's skills.
pub mod selection;
/// In-memory field service for tests.
#[cfg(test)]
mod testutil;

pub use crate::error::{Error, Result};

/// Run the CLI, returning a structured error on failure.
pub async fn run() -> Result<()> {
    cli::run().await
}
