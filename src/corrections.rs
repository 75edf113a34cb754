//! Correction Store & Learning Applier
//!
//! Persists user-supplied corrections keyed by site domain and re-applies
//! them on later passes: exact selector matches are rewritten in place,
//! structurally similar candidates only get a suggested alternative the user
//! can confirm. The persistence backend is injected, never reached through
//! ambient global state, and every failure downgrades to "no learning" —
//! a detection pass must complete whether or not storage works.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::fields::FieldType;
use crate::result::{ContainerSuggestion, LearningStats, Provenance};
use crate::signature::StructureSignature;
use crate::similarity;
use crate::Options;

const KEY_PREFIX: &str = "pattern-scout::corrections::";
const DOMAIN_INDEX_KEY: &str = "pattern-scout::corrections::domains";

/// Per-domain key-value persistence, supplied by the host.
///
/// Implementations should use whatever atomic-write primitive the host
/// persistence layer provides; the store always does read-modify-write on
/// the whole per-domain list, not per-record updates.
pub trait StorageBackend {
    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Write `bytes` under `key`, replacing any previous value.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// In-memory backend for tests and hosts without persistence.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| Error::Storage(e.to_string()))?;
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// What a correction corrects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionKind {
    /// User replaced a detected container selector.
    Container,
    /// User replaced a detected field selector.
    Field,
    /// User refined a selector that was already working.
    SelectorImprovement,
}

/// A persisted user override of an automatically detected selector.
///
/// Corrections never reference live DOM elements: they outlive any single
/// page and are matched by structural signature, not identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correction {
    pub id: String,
    pub domain: String,
    pub timestamp: DateTime<Utc>,
    pub kind: CorrectionKind,
    pub original_selector: String,
    pub corrected_selector: String,
    /// Signature of the corrected element, for future similarity matching.
    pub signature: Option<StructureSignature>,
    pub field_label: Option<String>,
    pub field_type: Option<FieldType>,
    pub confidence: f64,
}

/// Confidence assigned to direct user corrections.
const USER_CORRECTION_CONFIDENCE: f64 = 1.0;
/// Confidence assigned to selector improvements.
const IMPROVEMENT_CONFIDENCE: f64 = 0.9;

/// Stores corrections per domain and applies them to fresh detection
/// results.
pub struct CorrectionStore<S: StorageBackend> {
    backend: S,
    options: Options,
}

impl<S: StorageBackend> CorrectionStore<S> {
    /// Create a store over the given backend.
    #[must_use]
    pub fn new(backend: S, options: Options) -> Self {
        Self { backend, options }
    }

    /// Storage key holding a domain's correction list. Part of the stable
    /// storage layout, so hosts can migrate or inspect their stores.
    #[must_use]
    pub fn domain_key(domain: &str) -> String {
        format!("{KEY_PREFIX}{domain}")
    }

    /// Record that the user replaced a container selector.
    pub fn record_container_correction(
        &self,
        domain: &str,
        original_selector: &str,
        corrected_selector: &str,
        signature: Option<StructureSignature>,
    ) {
        self.append(Correction {
            id: String::new(),
            domain: domain.to_string(),
            timestamp: Utc::now(),
            kind: CorrectionKind::Container,
            original_selector: original_selector.to_string(),
            corrected_selector: corrected_selector.to_string(),
            signature,
            field_label: None,
            field_type: None,
            confidence: USER_CORRECTION_CONFIDENCE,
        });
    }

    /// Record that the user replaced a field selector.
    pub fn record_field_correction(
        &self,
        domain: &str,
        field_label: &str,
        field_type: Option<FieldType>,
        original_selector: &str,
        corrected_selector: &str,
    ) {
        self.append(Correction {
            id: String::new(),
            domain: domain.to_string(),
            timestamp: Utc::now(),
            kind: CorrectionKind::Field,
            original_selector: original_selector.to_string(),
            corrected_selector: corrected_selector.to_string(),
            signature: None,
            field_label: Some(field_label.to_string()),
            field_type,
            confidence: USER_CORRECTION_CONFIDENCE,
        });
    }

    /// Record that the user refined an already-working selector.
    pub fn record_selector_improvement(
        &self,
        domain: &str,
        original_selector: &str,
        corrected_selector: &str,
    ) {
        self.append(Correction {
            id: String::new(),
            domain: domain.to_string(),
            timestamp: Utc::now(),
            kind: CorrectionKind::SelectorImprovement,
            original_selector: original_selector.to_string(),
            corrected_selector: corrected_selector.to_string(),
            signature: None,
            field_label: None,
            field_type: None,
            confidence: IMPROVEMENT_CONFIDENCE,
        });
    }

    /// Append a correction to its domain's list, bounded to the most recent
    /// `max_corrections_per_domain`. Best-effort: failures are logged and
    /// the correction is dropped.
    fn append(&self, mut correction: Correction) {
        let domain = correction.domain.clone();
        let mut list = self.load(&domain);

        correction.id = format!(
            "{domain}-{}-{}",
            correction.timestamp.timestamp_millis(),
            list.len()
        );
        list.push(correction);

        let excess = list.len().saturating_sub(self.options.max_corrections_per_domain);
        if excess > 0 {
            list.drain(..excess);
        }

        if let Err(err) = self.persist(&domain, &list) {
            warn!(%domain, error = %err, "correction not stored");
            return;
        }
        self.index_domain(&domain);
    }

    /// All corrections stored for a domain, unfiltered. Failures read as
    /// an empty list.
    fn load(&self, domain: &str) -> Vec<Correction> {
        let bytes = match self.backend.read(&Self::domain_key(domain)) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(%domain, error = %err, "correction read failed");
                return Vec::new();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            warn!(%domain, error = %err, "stored corrections unreadable");
            Vec::new()
        })
    }

    fn persist(&self, domain: &str, list: &[Correction]) -> Result<()> {
        let bytes =
            serde_json::to_vec(list).map_err(|e| Error::Storage(e.to_string()))?;
        self.backend.write(&Self::domain_key(domain), &bytes)
    }

    fn index_domain(&self, domain: &str) {
        let mut domains: Vec<String> = match self.backend.read(DOMAIN_INDEX_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_default(),
            _ => Vec::new(),
        };
        if !domains.iter().any(|d| d == domain) {
            domains.push(domain.to_string());
            if let Ok(bytes) = serde_json::to_vec(&domains) {
                if let Err(err) = self.backend.write(DOMAIN_INDEX_KEY, &bytes) {
                    warn!(%domain, error = %err, "domain index not updated");
                }
            }
        }
    }

    /// Corrections for a domain that are still applicable: younger than the
    /// retention window and at or above the confidence floor. Excluded
    /// records stay stored until an explicit [`clear`](Self::clear).
    #[must_use]
    pub fn learned_patterns(&self, domain: &str) -> Vec<Correction> {
        let cutoff = Utc::now() - Duration::days(self.options.correction_retention_days);
        self.load(domain)
            .into_iter()
            .filter(|c| c.timestamp >= cutoff)
            .filter(|c| c.confidence >= self.options.correction_confidence_floor)
            .collect()
    }

    /// Apply learned corrections to freshly computed suggestions.
    ///
    /// Exact original-selector matches are rewritten in place and flagged as
    /// learning-applied; structurally similar (but not identical) candidates
    /// only get a suggested alternative, so the user stays in the loop for
    /// anything short of a confirmed repeat.
    pub fn apply(&self, domain: &str, containers: &mut [ContainerSuggestion]) {
        let learned = self.learned_patterns(domain);
        if learned.is_empty() {
            return;
        }
        debug!(%domain, count = learned.len(), "applying learned corrections");

        for correction in &learned {
            match correction.kind {
                CorrectionKind::Container => {
                    apply_container_correction(correction, containers, &self.options);
                }
                CorrectionKind::Field => {
                    apply_field_correction(correction, containers);
                }
                CorrectionKind::SelectorImprovement => {
                    apply_selector_improvement(correction, containers);
                }
            }
        }
    }

    /// Physically delete all corrections stored for a domain.
    pub fn clear(&self, domain: &str) {
        if let Err(err) = self.persist(domain, &[]) {
            warn!(%domain, error = %err, "corrections not cleared");
        }
    }

    /// Totals across all tracked domains, for display only.
    #[must_use]
    pub fn stats(&self) -> LearningStats {
        let domains: Vec<String> = match self.backend.read(DOMAIN_INDEX_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_default(),
            _ => Vec::new(),
        };

        let mut stats = LearningStats::default();
        for domain in &domains {
            let count = self.load(domain).len();
            if count > 0 {
                stats.domains += 1;
                stats.corrections += count;
            }
        }
        stats
    }
}

fn apply_container_correction(
    correction: &Correction,
    containers: &mut [ContainerSuggestion],
    options: &Options,
) {
    for container in containers.iter_mut() {
        if container.selector == correction.original_selector {
            container.selector = correction.corrected_selector.clone();
            container.learning_applied = true;
            continue;
        }
        if container.suggested_selector.is_some()
            || container.selector == correction.corrected_selector
        {
            continue;
        }
        if let Some(signature) = &correction.signature {
            let score = similarity::correction_similarity(signature, &container.signature);
            if score >= options.correction_similarity_threshold {
                container.suggested_selector =
                    Some(correction.corrected_selector.clone());
            }
        }
    }
}

fn apply_field_correction(correction: &Correction, containers: &mut [ContainerSuggestion]) {
    let Some(label) = correction.field_label.as_deref() else {
        return;
    };
    for container in containers.iter_mut() {
        for field in container.fields.iter_mut() {
            if field.label != label {
                continue;
            }
            if field.selector == correction.original_selector {
                field.selector = correction.corrected_selector.clone();
                field.learning_applied = true;
                field.provenance = Provenance::LearnedCorrection;
            } else if field.selector != correction.corrected_selector
                && field.suggested_selector.is_none()
            {
                field.suggested_selector = Some(correction.corrected_selector.clone());
            }
        }
    }
}

fn apply_selector_improvement(
    correction: &Correction,
    containers: &mut [ContainerSuggestion],
) {
    for container in containers.iter_mut() {
        if container.selector == correction.original_selector {
            container.selector = correction.corrected_selector.clone();
            container.learning_applied = true;
        }
        for field in container.fields.iter_mut() {
            if field.selector == correction.original_selector {
                field.selector = correction.corrected_selector.clone();
                field.learning_applied = true;
            }
        }
    }
}
