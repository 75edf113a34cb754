//! Configuration options for pattern detection.
//!
//! The `Options` struct controls grouping, scoring, and learning behavior.
//! The visual-layout constants (ideal item spacing, fold height) are tuned
//! empirically and deliberately exposed as fields rather than hard-coded.

/// Configuration options for a detection pass.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use pattern_scout::Options;
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     similarity_threshold: 0.8,
///     min_container_count: 4,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Minimum structural similarity for two elements to land in one group.
    ///
    /// Default: `0.7`
    pub similarity_threshold: f64,

    /// Minimum number of members for a group to count as a container.
    ///
    /// Smaller clusters are silently dropped; repeating records need at
    /// least this many instances to be worth suggesting.
    ///
    /// Default: `3`
    pub min_container_count: usize,

    /// Composite quality floor below which a group is discarded before
    /// field discovery runs.
    ///
    /// Default: `0.5`
    pub min_quality: f64,

    /// Fraction of container instances a field selector must match.
    ///
    /// Candidates below this reliability are rejected outright and never
    /// surfaced.
    ///
    /// Default: `0.8`
    pub min_reliability: f64,

    /// Cap on dynamically discovered field candidates per container.
    ///
    /// Default: `10`
    pub max_fields: usize,

    /// Maximum text samples collected per validated field.
    ///
    /// Default: `3`
    pub max_samples: usize,

    /// Number of group members sampled when scoring sub-element richness.
    ///
    /// Default: `5`
    pub richness_sample: usize,

    /// Inter-item center distance (layout units) that the grouping-distance
    /// heuristic rewards.
    ///
    /// Default: `200.0`
    pub ideal_item_spacing: f64,

    /// Vertical position (layout units) below which the above-the-fold
    /// semantic bonus no longer applies.
    ///
    /// Default: `800.0`
    pub fold_height: f64,

    /// Member-count normalization cap for the count factor.
    ///
    /// Groups with this many members or more get the full count score.
    ///
    /// Default: `10`
    pub count_cap: usize,

    /// Base confidence for fields sourced from the pattern library.
    ///
    /// Default: `0.9`
    pub library_confidence_base: f64,

    /// Base confidence for dynamically discovered fields.
    ///
    /// Default: `0.7`
    pub discovery_confidence_base: f64,

    /// Most recent corrections retained per domain.
    ///
    /// Default: `50`
    pub max_corrections_per_domain: usize,

    /// Corrections older than this many days are excluded from application
    /// (but not physically deleted until an explicit clear).
    ///
    /// Default: `30`
    pub correction_retention_days: i64,

    /// Corrections below this confidence are excluded from application.
    ///
    /// Default: `0.7`
    pub correction_confidence_floor: f64,

    /// Structural similarity floor for suggesting (not auto-applying) a
    /// stored correction against a non-identical candidate.
    ///
    /// Default: `0.7`
    pub correction_similarity_threshold: f64,

    /// Attribute marking elements that belong to the host UI.
    ///
    /// Elements carrying this attribute (or inside one that does) are never
    /// grouped, so the engine does not detect its own overlay.
    ///
    /// Default: `"data-pattern-scout"`
    pub ui_marker_attr: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            min_container_count: 3,
            min_quality: 0.5,
            min_reliability: 0.8,
            max_fields: 10,
            max_samples: 3,
            richness_sample: 5,
            ideal_item_spacing: 200.0,
            fold_height: 800.0,
            count_cap: 10,
            library_confidence_base: 0.9,
            discovery_confidence_base: 0.7,
            max_corrections_per_domain: 50,
            correction_retention_days: 30,
            correction_confidence_floor: 0.7,
            correction_similarity_threshold: 0.7,
            ui_marker_attr: "data-pattern-scout".to_string(),
        }
    }
}
