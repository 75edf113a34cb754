//! Detection output types.
//!
//! Everything here is plain owned data: suggestions survive the detection
//! pass and cross to the host (overlay UI, template persistence) as values,
//! never as live DOM references. All types serialize for transport.

use serde::{Deserialize, Serialize};

use crate::fields::FieldType;
use crate::signature::StructureSignature;
use crate::site_type::SiteType;

/// Where a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    PatternLibrary,
    DynamicDiscovery,
    LearnedCorrection,
}

/// A validated field suggestion within a container.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSuggestion {
    /// Semantic name, e.g. "price".
    pub label: String,
    /// Selector evaluated relative to a container instance.
    pub selector: String,
    pub field_type: FieldType,
    /// Combined semantic/reliability/consistency confidence in [0,1].
    pub confidence: f64,
    /// Fraction of container instances the selector matched; never below
    /// the reliability floor.
    pub reliability: f64,
    /// Up to a few sample texts collected during validation.
    pub samples: Vec<String>,
    pub provenance: Provenance,
    /// True when a stored correction rewrote this field's selector.
    pub learning_applied: bool,
    /// Alternative selector from a structurally similar (but not identical)
    /// correction; attached for user confirmation, never auto-applied.
    pub suggested_selector: Option<String>,
}

/// A ranked container suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerSuggestion {
    /// Display label: library container name, dominant class, or tag.
    pub label: String,
    /// Selector addressing every member of the group.
    pub selector: String,
    /// Composite quality score in [0,1].
    pub confidence: f64,
    /// Number of member instances.
    pub count: usize,
    /// Mean pairwise structural similarity across members.
    pub mean_similarity: f64,
    /// Signature of the first member, kept for correction matching.
    pub signature: StructureSignature,
    /// Validated fields, sorted by descending confidence.
    pub fields: Vec<FieldSuggestion>,
    /// True when a stored correction rewrote this container's selector.
    pub learning_applied: bool,
    /// Alternative selector from a structurally similar correction.
    pub suggested_selector: Option<String>,
}

/// Result of one detection pass.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    /// Vertical classification chosen for the pattern library.
    pub site_type: SiteType,
    /// Container suggestions, ranked by descending confidence.
    pub containers: Vec<ContainerSuggestion>,
}

impl DetectionReport {
    /// True when the pass found no qualifying groups. Not an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

/// Totals tracked by the correction store, for display only.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LearningStats {
    /// Number of domains with at least one stored correction.
    pub domains: usize,
    /// Total corrections stored across all domains.
    pub corrections: usize,
}
