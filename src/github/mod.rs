//! GitHub integration for release tracking

mod badge;
mod client;
mod operations;

pub use badge::{AnnotationOutcome, BadgeTemplate, DEFAULT_BADGE_BASE, ReleaseAnnotator};
pub use client::{DEFAULT_API_URL, GitHubReleaseConfig, GitHubReleaseManager};
pub use operations::{Release, ReleaseHost};
