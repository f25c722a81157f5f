//! Deployment badges inside the release body.
//!
//! Each deployment branch owns a badge of the form
//! `<label> ![](<base><suffix>)`. Deploying a branch swaps the "find" badge for
//! one stamped with the deployment time. The swap is a literal, global text
//! replacement; a body without the badge is written back unchanged.

use crate::error::{AnnotationError, Result};
use crate::github::{Release, ReleaseHost};
use chrono::{DateTime, Datelike, Local, Timelike};
use std::collections::BTreeMap;

/// Badge image prefix used when none is configured
pub const DEFAULT_BADGE_BASE: &str = "https://img.shields.io/badge/released";

/// Literal badge texts to look for and to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeTemplate {
    /// Badge image URL prefix
    pub base: String,
    /// Suffix of the badge to replace; empty disables annotation
    pub find_suffix: String,
    /// Suffix appended after the deployment timestamp
    pub replace_suffix: String,
}

impl BadgeTemplate {
    /// Template with the default badge base
    pub fn new(find_suffix: impl Into<String>, replace_suffix: impl Into<String>) -> Self {
        Self {
            base: DEFAULT_BADGE_BASE.to_string(),
            find_suffix: find_suffix.into(),
            replace_suffix: replace_suffix.into(),
        }
    }

    /// Whether a find suffix is configured
    pub fn is_enabled(&self) -> bool {
        !self.find_suffix.is_empty()
    }

    /// `<label> ![](<base><find_suffix>)`
    pub fn find_text(&self, label: &str) -> String {
        format!("{} ![]({}{})", label, self.base, self.find_suffix)
    }

    /// `<label> ![](<base>-<day>_<Month>_<year>_<HH>:<MM><replace_suffix>)`
    pub fn replace_text(&self, label: &str, at: DateTime<Local>) -> String {
        format!(
            "{} ![]({}-{}_{}_{}_{:02}:{:02}{})",
            label,
            self.base,
            at.day(),
            at.format("%B"),
            at.year(),
            at.hour(),
            at.minute(),
            self.replace_suffix
        )
    }

    /// Replace every occurrence of the label's find badge in `body`
    pub fn apply(&self, body: &str, label: &str, at: DateTime<Local>) -> String {
        body.replace(&self.find_text(label), &self.replace_text(label, at))
    }
}

/// Result of annotating the release after one stage
#[derive(Debug, Clone)]
pub struct AnnotationOutcome {
    /// Release as returned by the edit
    pub release: Release,
    /// Whether the body text actually changed
    pub changed: bool,
}

/// Rewrites the badge of a freshly deployed branch in the latest release
#[derive(Debug)]
pub struct ReleaseAnnotator<'a, H> {
    host: &'a H,
    template: BadgeTemplate,
    labels: BTreeMap<String, String>,
}

impl<'a, H: ReleaseHost> ReleaseAnnotator<'a, H> {
    /// Create an annotator over `host` with branch display labels
    pub fn new(host: &'a H, template: BadgeTemplate, labels: BTreeMap<String, String>) -> Self {
        Self {
            host,
            template,
            labels,
        }
    }

    /// Label to annotate for `branch`, if annotation applies to it
    pub fn label_for(&self, branch: &str) -> Option<&str> {
        if !self.template.is_enabled() {
            return None;
        }
        self.labels.get(branch).map(String::as_str)
    }

    /// Re-fetch the latest release, swap the branch badge and write it back.
    ///
    /// Returns `None` without touching the host when the branch has no label
    /// or no find suffix is configured.
    pub async fn annotate(
        &self,
        branch: &str,
        at: DateTime<Local>,
    ) -> Result<Option<AnnotationOutcome>> {
        let Some(label) = self.label_for(branch) else {
            return Ok(None);
        };

        let mut release =
            self.host
                .fetch_latest()
                .await
                .map_err(|source| AnnotationError::FetchFailed {
                    branch: branch.to_string(),
                    source,
                })?;

        let body = self.template.apply(release.body_text(), label, at);
        let changed = body != release.body_text();
        log::debug!("release {} body after {}:\n{}", release.id, branch, body);
        release.body = Some(body);

        let release_id = release.id;
        let release = self
            .host
            .edit_release(&release)
            .await
            .map_err(|source| AnnotationError::EditFailed {
                branch: branch.to_string(),
                release_id,
                source,
            })?;

        Ok(Some(AnnotationOutcome { release, changed }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap()
    }

    #[test]
    fn test_find_and_replace_text() {
        let template = BadgeTemplate::new("-No-red.svg", "-green.svg");
        assert_eq!(
            template.find_text("Production"),
            "Production ![](https://img.shields.io/badge/released-No-red.svg)"
        );
        assert_eq!(
            template.replace_text("Production", at()),
            "Production ![](https://img.shields.io/badge/released-7_March_2024_09:05-green.svg)"
        );
    }

    #[test]
    fn test_apply_matches_only_verbatim_label_and_suffix() {
        let template = BadgeTemplate {
            base: "badge".to_string(),
            find_suffix: "-A".to_string(),
            replace_suffix: String::new(),
        };
        let body = "X ![](badge-A)";
        assert_eq!(template.apply(body, "X", at()), "X ![](badge-7_March_2024_09:05)");

        assert_eq!(template.apply(body, "Y", at()), body);
        let other_suffix = BadgeTemplate {
            find_suffix: "-B".to_string(),
            ..template.clone()
        };
        assert_eq!(other_suffix.apply(body, "X", at()), body);
    }

    #[test]
    fn test_apply_replaces_every_occurrence() {
        let template = BadgeTemplate {
            base: "b".to_string(),
            find_suffix: "-no".to_string(),
            replace_suffix: "-yes".to_string(),
        };
        let body = "S ![](b-no)\r\nS ![](b-no)";
        let expected = "S ![](b-7_March_2024_09:05-yes)\r\nS ![](b-7_March_2024_09:05-yes)";
        assert_eq!(template.apply(body, "S", at()), expected);
    }

    #[test]
    fn test_empty_find_suffix_disables_template() {
        assert!(!BadgeTemplate::new("", "-green.svg").is_enabled());
        assert!(BadgeTemplate::new("-red.svg", "").is_enabled());
    }
}
