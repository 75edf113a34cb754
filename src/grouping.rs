//! Container Grouper
//!
//! Partitions the document's eligible elements into candidate groups of
//! structurally similar elements. Greedy single-pass clustering: the first
//! group discovered consumes its members, so overlapping groups cannot form.
//! That is an accepted trade-off for near-linear behavior on large documents;
//! an optimal partition is not the goal.

use std::collections::HashSet;

use crate::dom::{self, Document, NodeRef};
use crate::layout::LayoutProvider;
use crate::signature::StructureSignature;
use crate::similarity;
use crate::Options;

/// Tags that never form data records.
const SKIP_TAGS: &[&str] = &[
    "html", "head", "body", "script", "style", "meta", "link", "title",
    "noscript", "template", "br", "hr", "base", "iframe",
];

/// A candidate group of structurally similar elements.
///
/// Member references are transient: they are only valid for the lifetime of
/// the detection pass that produced them.
pub struct ContainerCandidate<'a> {
    /// Member elements, in document order.
    pub members: Vec<NodeRef<'a>>,
    /// Precomputed signature per member, same order.
    pub signatures: Vec<StructureSignature>,
    /// Mean pairwise similarity across (a sample of) the members.
    pub mean_similarity: f64,
}

impl ContainerCandidate<'_> {
    /// Number of member elements.
    #[must_use]
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

/// Whether an element takes part in grouping at all.
///
/// Excluded: non-record tags, elements with zero rendered size (when the
/// layout provider knows their geometry), and the host UI's own elements.
fn is_eligible(node: &NodeRef, layout: &dyn LayoutProvider, options: &Options) -> bool {
    if !node.is_element() {
        return false;
    }
    let Some(tag) = dom::tag_name(node) else {
        return false;
    };
    if SKIP_TAGS.contains(&tag.as_str()) {
        return false;
    }
    if dom::self_or_ancestor_has_attr(node, &options.ui_marker_attr) {
        return false;
    }
    if let Some(rect) = layout.rect(node) {
        if rect.is_empty() {
            return false;
        }
    }
    true
}

/// Collect candidate groups from the document.
///
/// For each unvisited eligible element, gathers every other unvisited element
/// whose signature similarity exceeds `options.similarity_threshold`. Sets
/// reaching `options.min_container_count` become candidates and their members
/// are consumed; elements matching no large-enough set are silently dropped.
#[must_use]
pub fn collect_candidates<'a>(
    doc: &'a Document,
    layout: &dyn LayoutProvider,
    options: &Options,
) -> Vec<ContainerCandidate<'a>> {
    let elements: Vec<NodeRef<'a>> = doc
        .select("*")
        .nodes()
        .iter()
        .filter(|n| is_eligible(n, layout, options))
        .copied()
        .collect();

    let signatures: Vec<StructureSignature> =
        elements.iter().map(StructureSignature::from_node).collect();

    let mut visited: HashSet<usize> = HashSet::new();
    let mut candidates = Vec::new();

    for i in 0..elements.len() {
        if visited.contains(&i) {
            continue;
        }

        let mut group = vec![i];
        for j in (i + 1)..elements.len() {
            if visited.contains(&j) {
                continue;
            }
            if similarity::similarity(&signatures[i], &signatures[j])
                > options.similarity_threshold
            {
                group.push(j);
            }
        }

        if group.len() < options.min_container_count {
            continue;
        }

        visited.extend(group.iter().copied());

        let members: Vec<NodeRef<'a>> = group.iter().map(|&k| elements[k]).collect();
        let member_sigs: Vec<StructureSignature> =
            group.iter().map(|&k| signatures[k].clone()).collect();
        let mean_similarity = similarity::mean_pairwise(&member_sigs, 10);

        candidates.push(ContainerCandidate {
            members,
            signatures: member_sigs,
            mean_similarity,
        });
    }

    candidates
}
