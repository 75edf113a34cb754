//! Similarity Scorer
//!
//! Weighted comparison of two structure signatures, producing a score in
//! [0,1]. Three variants exist for three call sites: `similarity` drives
//! grouping, `pairwise_similarity` adds finer text/media agreement terms for
//! mean-pairwise consistency scoring, and `correction_similarity` extends the
//! base factors with child-count and text-length-tier comparison for matching
//! stored corrections against fresh candidates.
//!
//! All variants are symmetric and deterministic: the same signature pair
//! always yields the same score.

use crate::signature::StructureSignature;

/// Jaccard similarity of two string sets. Two empty sets count as identical.
#[must_use]
pub fn jaccard(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.iter().filter(|t| b.contains(t)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 1.0;
    }
    intersection as f64 / union as f64
}

/// Agreement of two scalar magnitudes: 1.0 for equal, falling towards 0 as
/// they diverge relative to the larger one.
fn magnitude_agreement(a: usize, b: usize) -> f64 {
    let max = a.max(b);
    if max == 0 {
        return 1.0;
    }
    1.0 - (a.abs_diff(b) as f64 / max as f64)
}

/// Structural similarity used for container grouping.
///
/// Weights: tag equality 0.3, class-set Jaccard 0.3, child-tag Jaccard 0.2,
/// attribute-name Jaccard 0.1, depth equality 0.1.
#[must_use]
pub fn similarity(a: &StructureSignature, b: &StructureSignature) -> f64 {
    let mut score = 0.0;
    if a.tag == b.tag {
        score += 0.3;
    }
    score += 0.3 * jaccard(&a.classes, &b.classes);
    score += 0.2 * jaccard(&a.child_tags, &b.child_tags);
    score += 0.1 * jaccard(&a.attr_names, &b.attr_names);
    if a.depth == b.depth {
        score += 0.1;
    }
    score.clamp(0.0, 1.0)
}

/// Finer pairwise similarity used for mean-pairwise consistency scoring.
///
/// Same structural factors with slightly reduced weights, plus text-length
/// agreement and link/image-presence agreement (0.1 combined).
#[must_use]
pub fn pairwise_similarity(a: &StructureSignature, b: &StructureSignature) -> f64 {
    let mut score = 0.0;
    if a.tag == b.tag {
        score += 0.25;
    }
    score += 0.25 * jaccard(&a.classes, &b.classes);
    score += 0.2 * jaccard(&a.child_tags, &b.child_tags);
    score += 0.1 * jaccard(&a.attr_names, &b.attr_names);
    if a.depth == b.depth {
        score += 0.1;
    }
    score += 0.05 * magnitude_agreement(a.text_len, b.text_len);
    if a.has_link == b.has_link {
        score += 0.025;
    }
    if a.has_image == b.has_image {
        score += 0.025;
    }
    score.clamp(0.0, 1.0)
}

/// Similarity used to match a stored correction's signature against a fresh
/// candidate. Extends the structural factors with child-count closeness and
/// text-length-tier equality, since those survive across page loads better
/// than exact text.
#[must_use]
pub fn correction_similarity(a: &StructureSignature, b: &StructureSignature) -> f64 {
    let mut score = 0.0;
    if a.tag == b.tag {
        score += 0.25;
    }
    score += 0.25 * jaccard(&a.classes, &b.classes);
    score += 0.15 * jaccard(&a.child_tags, &b.child_tags);
    score += 0.1 * jaccard(&a.attr_names, &b.attr_names);
    if a.depth == b.depth {
        score += 0.05;
    }
    score += 0.1 * magnitude_agreement(a.child_count, b.child_count);
    if a.text_len_tier() == b.text_len_tier() {
        score += 0.1;
    }
    score.clamp(0.0, 1.0)
}

/// Mean pairwise similarity over a slice of signatures.
///
/// Groups larger than `sample_cap` are sampled from the front; pairwise
/// comparison is quadratic and large groups are homogeneous anyway.
#[must_use]
pub fn mean_pairwise(signatures: &[StructureSignature], sample_cap: usize) -> f64 {
    let sample = &signatures[..signatures.len().min(sample_cap)];
    if sample.len() < 2 {
        return 1.0;
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..sample.len() {
        for j in (i + 1)..sample.len() {
            total += pairwise_similarity(&sample[i], &sample[j]);
            pairs += 1;
        }
    }
    total / pairs as f64
}
