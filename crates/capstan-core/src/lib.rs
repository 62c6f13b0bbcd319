//! Core library for the capstan deployment client.
//!
//! This crate provides the pieces shared by capstan tooling:
//!
//! - **Manifest**: serde models for project and service descriptors
//! - **Client**: a thin HTTP client for the deploy endpoint
//!
//! The deploy endpoint speaks plain JSON-over-HTTP; this crate
//! deliberately interprets as little of it as possible.

pub mod client;
pub mod manifest;

pub use client::{ApiResponse, ClientError, DeployClient};
pub use manifest::{ManifestError, Project, ProjectV1, Service};
