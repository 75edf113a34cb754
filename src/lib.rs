//! # pattern-scout
//!
//! Pattern detection and adaptive selector synthesis for rendered web
//! documents.
//!
//! Given a document snapshot, the engine discovers groups of structurally
//! similar elements that represent repeating data records ("containers"),
//! infers which sub-elements correspond to semantic fields (title, price,
//! image, link, ...), synthesizes one stable selector per group and field,
//! and learns from user corrections to improve future detection on the same
//! site.
//!
//! The engine is a pure in-process library: it never renders pages, performs
//! network I/O, or stores scraped data. Rendering, overlay presentation, and
//! template persistence are external collaborators.
//!
//! ## Quick Start
//!
//! ```rust
//! use pattern_scout::{detect, NoLayout};
//! use pattern_scout::dom::Document;
//!
//! let doc = Document::from(r#"
//!     <div class="item"><h3>Alpha</h3><span class="price">$19.99</span></div>
//!     <div class="item"><h3>Beta</h3><span class="price">$24.99</span></div>
//!     <div class="item"><h3>Gamma</h3><span class="price">$14.99</span></div>
//! "#);
//!
//! let report = detect(&doc, &NoLayout)?;
//! for container in &report.containers {
//!     println!("{} x{}: {}", container.label, container.count, container.selector);
//! }
//! # Ok::<(), pattern_scout::Error>(())
//! ```
//!
//! ## Learning
//!
//! Construct a [`DetectionEngine`] with a persistent [`StorageBackend`] to
//! keep user corrections across sessions; corrections are keyed by site
//! domain and re-applied (exact repeats) or suggested (structural
//! near-matches) on later passes.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod engine;
mod error;
mod options;
mod synthesize;

/// DOM introspection helpers over `dom_query`.
pub mod dom;

/// Bounding-box access for visual layout scoring.
pub mod layout;

/// Compiled regex patterns for text classification.
pub mod patterns;

/// Structure signature builder.
pub mod signature;

/// Weighted signature similarity scoring.
pub mod similarity;

/// Container grouping (greedy structural clustering).
pub mod grouping;

/// Container quality scoring.
pub mod quality;

/// Site-type classification and pattern libraries.
pub mod site_type;

/// Field discovery and cross-instance validation.
pub mod fields;

/// Correction store and learning applier.
pub mod corrections;

/// Detection output types.
pub mod result;

// Public API - re-exports
pub use corrections::{
    Correction, CorrectionKind, CorrectionStore, MemoryBackend, StorageBackend,
};
pub use engine::{storage_domain, DetectionEngine};
pub use error::{Error, Result};
pub use fields::FieldType;
pub use layout::{AttrLayout, LayoutProvider, NoLayout, Rect};
pub use options::Options;
pub use result::{
    ContainerSuggestion, DetectionReport, FieldSuggestion, LearningStats, Provenance,
};
pub use signature::{StructureSignature, TextPattern};
pub use site_type::{PatternLibrary, SiteType};
pub use synthesize::synthesize;

use dom::Document;

/// Run one detection pass with default options, the built-in pattern
/// library, and no persistent learning.
///
/// For cross-session learning, construct a [`DetectionEngine`] with a real
/// storage backend instead.
pub fn detect(doc: &Document, layout: &dyn LayoutProvider) -> Result<DetectionReport> {
    DetectionEngine::new(MemoryBackend::default()).detect(doc, layout, None)
}

/// Run one detection pass with custom options.
///
/// # Example
///
/// ```rust
/// use pattern_scout::{detect_with_options, NoLayout, Options};
/// use pattern_scout::dom::Document;
///
/// let doc = Document::from("<ul><li>a</li><li>b</li><li>c</li></ul>");
/// let options = Options {
///     min_container_count: 4,
///     ..Options::default()
/// };
/// let report = detect_with_options(&doc, &NoLayout, options)?;
/// assert!(report.is_empty()); // only 3 items, minimum raised to 4
/// # Ok::<(), pattern_scout::Error>(())
/// ```
pub fn detect_with_options(
    doc: &Document,
    layout: &dyn LayoutProvider,
    options: Options,
) -> Result<DetectionReport> {
    DetectionEngine::with_options(
        MemoryBackend::default(),
        options,
        PatternLibrary::builtin(),
    )
    .detect(doc, layout, None)
}
