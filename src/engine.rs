//! Detection engine orchestration.
//!
//! One `detect` call is one pass: classify the site, group eligible elements,
//! score and filter the groups, synthesize selectors, discover and validate
//! fields, then apply learned corrections for the page's domain. Everything
//! is synchronous and single-threaded within the pass, and no transient
//! state survives it; the correction store is the only cross-pass resource.

use tracing::debug;
use url::Url;

use crate::corrections::{CorrectionStore, StorageBackend};
use crate::dom::Document;
use crate::fields::{self, FieldType};
use crate::grouping::{self, ContainerCandidate};
use crate::layout::LayoutProvider;
use crate::quality;
use crate::result::{
    ContainerSuggestion, DetectionReport, FieldSuggestion, LearningStats,
};
use crate::signature::StructureSignature;
use crate::site_type::{self, PatternLibrary, SiteType};
use crate::synthesize;
use crate::{Options, Result};

/// Normalize a page URL (or bare hostname) into the per-site storage domain.
#[must_use]
pub fn storage_domain(page_url: &str) -> String {
    if let Ok(url) = Url::parse(page_url) {
        if let Some(host) = url.host_str() {
            return host.to_ascii_lowercase();
        }
    }
    page_url
        .trim()
        .trim_start_matches("www.")
        .split('/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// The pattern detection and selector synthesis engine.
///
/// Holds configuration, the pattern library, and the correction store; the
/// document itself is supplied per pass.
pub struct DetectionEngine<S: StorageBackend> {
    options: Options,
    library: PatternLibrary,
    store: CorrectionStore<S>,
}

impl<S: StorageBackend> DetectionEngine<S> {
    /// Engine with default options and the built-in pattern library.
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self::with_options(backend, Options::default(), PatternLibrary::builtin())
    }

    /// Engine with custom options and library.
    #[must_use]
    pub fn with_options(backend: S, options: Options, library: PatternLibrary) -> Self {
        let store = CorrectionStore::new(backend, options.clone());
        Self { options, library, store }
    }

    /// Current configuration.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Run one detection pass over a rendered document snapshot.
    ///
    /// `page_url` keys the learned-correction lookup; without it the pass
    /// still runs, just without learning applied.
    ///
    /// A document with no qualifying groups yields an empty report, not an
    /// error.
    pub fn detect(
        &self,
        doc: &Document,
        layout: &dyn LayoutProvider,
        page_url: Option<&str>,
    ) -> Result<DetectionReport> {
        let site_type = site_type::classify(doc, &self.library);
        debug!(?site_type, "classified document");

        let candidates = grouping::collect_candidates(doc, layout, &self.options);
        debug!(count = candidates.len(), "candidate groups");

        let mut containers: Vec<ContainerSuggestion> = Vec::new();
        for candidate in &candidates {
            let breakdown = quality::score_candidate(candidate, layout, &self.options);
            if breakdown.composite < self.options.min_quality {
                continue;
            }

            let selector = synthesize::synthesize(&candidate.members);
            if selector.is_empty() {
                continue;
            }
            let fields = fields::discover_fields(
                candidate,
                site_type,
                &self.library,
                layout,
                &self.options,
            );

            containers.push(ContainerSuggestion {
                label: self.label_for(site_type, &selector, candidate),
                selector,
                confidence: breakdown.composite,
                count: candidate.count(),
                mean_similarity: candidate.mean_similarity,
                signature: candidate.signatures[0].clone(),
                fields: fields
                    .into_iter()
                    .map(|f| FieldSuggestion {
                        label: f.label,
                        selector: f.selector,
                        field_type: f.field_type,
                        confidence: f.confidence,
                        reliability: f.reliability,
                        samples: f.samples,
                        provenance: f.provenance,
                        learning_applied: false,
                        suggested_selector: None,
                    })
                    .collect(),
                learning_applied: false,
                suggested_selector: None,
            });
        }

        containers.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        if let Some(page_url) = page_url {
            self.store.apply(&storage_domain(page_url), &mut containers);
        }

        debug!(count = containers.len(), "detection pass complete");
        Ok(DetectionReport { site_type, containers })
    }

    /// Display label: library container name if one of its selectors is the
    /// synthesized selector, else the most distinctive shared class, else
    /// the tag.
    fn label_for(
        &self,
        site_type: SiteType,
        selector: &str,
        candidate: &ContainerCandidate,
    ) -> String {
        if let Some(vertical) = self.library.vertical(site_type) {
            for container in &vertical.containers {
                if container.selectors.iter().any(|s| s == selector) {
                    return container.name.clone();
                }
            }
        }

        let signature = &candidate.signatures[0];
        signature
            .classes
            .iter()
            .find(|c| !crate::patterns::is_generic_class(c))
            .cloned()
            .unwrap_or_else(|| signature.tag.clone())
    }

    // === Correction recording (invoked by the host UI) ===

    /// Record a user override of a container selector.
    pub fn record_container_correction(
        &self,
        page_url: &str,
        original_selector: &str,
        corrected_selector: &str,
        corrected_signature: Option<StructureSignature>,
    ) {
        self.store.record_container_correction(
            &storage_domain(page_url),
            original_selector,
            corrected_selector,
            corrected_signature,
        );
    }

    /// Record a user override of a field selector.
    pub fn record_field_correction(
        &self,
        page_url: &str,
        field_label: &str,
        field_type: Option<FieldType>,
        original_selector: &str,
        corrected_selector: &str,
    ) {
        self.store.record_field_correction(
            &storage_domain(page_url),
            field_label,
            field_type,
            original_selector,
            corrected_selector,
        );
    }

    /// Record a user refinement of an already-working selector.
    pub fn record_selector_improvement(
        &self,
        page_url: &str,
        original_selector: &str,
        corrected_selector: &str,
    ) {
        self.store
            .record_selector_improvement(&storage_domain(page_url), original_selector, corrected_selector);
    }

    /// Learning totals for display.
    #[must_use]
    pub fn learning_stats(&self) -> LearningStats {
        self.store.stats()
    }

    /// Physically delete everything learned for a domain.
    pub fn clear_learned(&self, page_url: &str) {
        self.store.clear(&storage_domain(page_url));
    }
}
