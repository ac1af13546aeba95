//! Similar-app matching
//!
//! Decides which installed app names resemble an entry of the watched
//! app-name list fetched from the server.
//!
//! # Overview
//!
//! - The reference list is lower-cased once and kept as the search index.
//! - Every installed name is lower-cased and searched against each reference
//!   entry with the bitap scorer in [`bitap`].
//! - A name is similar when its best score over all entries is at or below the
//!   threshold (0.0 exact, 1.0 worst; default 0.3).
//!
//! Matching is a pure function of its inputs: the same installed names,
//! reference list and options always give the same set, and raising the
//! threshold never removes a name from it.

pub mod bitap;

use crate::config::DetectionSettings;
use bitap::{Pattern, SearchParams};
use std::collections::BTreeSet;
use tracing::debug;

/// Default similarity threshold
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Tuning for [`SimilarityMatcher`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Highest score that still counts as similar, clamped to `[0.0, 1.0]`
    pub threshold: f64,
    /// Where in a reference name the installed name is expected to start
    pub location: usize,
    /// Offset from `location` that costs one full score point
    pub distance: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        let params = SearchParams::default();
        Self {
            threshold: DEFAULT_THRESHOLD,
            location: params.location,
            distance: params.distance,
        }
    }
}

impl MatchOptions {
    /// Default options with a different threshold
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Threshold with NaN and negatives treated as 0.0 and values above 1.0 as 1.0
    fn effective_threshold(&self) -> f64 {
        if self.threshold.is_nan() {
            0.0
        } else {
            self.threshold.clamp(0.0, 1.0)
        }
    }

    fn params(&self) -> SearchParams {
        SearchParams {
            location: self.location,
            distance: self.distance,
        }
    }
}

impl From<&DetectionSettings> for MatchOptions {
    fn from(settings: &DetectionSettings) -> Self {
        Self {
            threshold: settings.threshold,
            location: settings.location,
            distance: settings.distance,
        }
    }
}

/// Fuzzy index over the watched app names
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    reference: Vec<String>,
    options: MatchOptions,
}

impl SimilarityMatcher {
    /// Build the index; entries are lower-cased and blank entries dropped
    pub fn new<I, S>(reference: I, options: MatchOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let reference = reference
            .into_iter()
            .map(|name| name.as_ref().to_lowercase())
            .filter(|name| !name.trim().is_empty())
            .collect();
        Self { reference, options }
    }

    /// Number of indexed reference names
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    /// Whether the index has no reference names
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    /// Best score of `installed` against any reference name within the threshold
    pub fn best_score(&self, installed: &str) -> Option<f64> {
        if installed.trim().is_empty() {
            return None;
        }
        let pattern = Pattern::new(installed);
        let params = self.options.params();
        let cutoff = self.options.effective_threshold();

        self.reference
            .iter()
            .filter_map(|name| pattern.best_score(name, params, cutoff))
            .min_by(f64::total_cmp)
    }

    /// Whether `installed` resembles a reference name
    pub fn is_similar(&self, installed: &str) -> bool {
        self.best_score(installed).is_some()
    }

    /// The installed names that resemble a reference name, as given (original case)
    pub fn matches<I, S>(&self, installed: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matched: BTreeSet<String> = installed
            .into_iter()
            .filter(|name| self.is_similar(name.as_ref()))
            .map(|name| name.as_ref().to_string())
            .collect();
        debug!(
            "Matched {} installed app(s) against {} reference name(s)",
            matched.len(),
            self.reference.len()
        );
        matched
    }
}

/// Installed names that resemble any reference name at `threshold`
pub fn find_similar<S: AsRef<str>>(installed: &[S], reference: &[S], threshold: f64) -> BTreeSet<String> {
    SimilarityMatcher::new(reference, MatchOptions::with_threshold(threshold)).matches(installed)
}
